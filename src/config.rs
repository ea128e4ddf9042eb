use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::generator::PracticeFilter;
use crate::lexicon::Lexicon;
use crate::session::quiz::QuizOptions;

pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "fr"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Chance that the next question re-asks the oldest mistake.
    #[serde(default = "default_review_bias")]
    pub review_bias: f64,
    #[serde(default = "default_review_capacity")]
    pub review_capacity: usize,
    #[serde(default = "default_sprint_seconds")]
    pub sprint_seconds: u32,
    #[serde(default = "default_correct_delay_ms")]
    pub correct_delay_ms: u64,
    #[serde(default = "default_incorrect_delay_ms")]
    pub incorrect_delay_ms: u64,
    #[serde(default = "default_skip_delay_ms")]
    pub skip_delay_ms: u64,
    /// Verb ids to practice; empty means all.
    #[serde(default)]
    pub verbs: Vec<String>,
    /// Tense ids to practice; empty means all.
    #[serde(default)]
    pub tenses: Vec<String>,
    #[serde(default)]
    pub lexicon_path: Option<String>,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_language() -> String {
    "en".to_string()
}
fn default_review_bias() -> f64 {
    0.35
}
fn default_review_capacity() -> usize {
    20
}
fn default_sprint_seconds() -> u32 {
    60
}
fn default_correct_delay_ms() -> u64 {
    800
}
fn default_incorrect_delay_ms() -> u64 {
    2000
}
fn default_skip_delay_ms() -> u64 {
    1500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            language: default_language(),
            review_bias: default_review_bias(),
            review_capacity: default_review_capacity(),
            sprint_seconds: default_sprint_seconds(),
            correct_delay_ms: default_correct_delay_ms(),
            incorrect_delay_ms: default_incorrect_delay_ms(),
            skip_delay_ms: default_skip_delay_ms(),
            verbs: Vec::new(),
            tenses: Vec::new(),
            lexicon_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("conjugr")
    }

    /// Clamp numeric fields into usable ranges and reset unknown languages.
    pub fn validate(&mut self) {
        if !self.review_bias.is_finite() {
            self.review_bias = default_review_bias();
        }
        self.review_bias = self.review_bias.clamp(0.0, 1.0);
        self.review_capacity = self.review_capacity.clamp(1, 100);
        self.sprint_seconds = self.sprint_seconds.clamp(10, 600);
        self.correct_delay_ms = self.correct_delay_ms.min(10_000);
        self.incorrect_delay_ms = self.incorrect_delay_ms.min(10_000);
        self.skip_delay_ms = self.skip_delay_ms.min(10_000);
        if !SUPPORTED_LANGUAGES.contains(&self.language.as_str()) {
            self.language = default_language();
        }
    }

    /// Drop verb/tense ids the lexicon does not know about.
    pub fn normalize_filters(&mut self, lexicon: &Lexicon) {
        self.verbs.retain(|id| {
            let known = lexicon.verb_index(id).is_some();
            if !known {
                tracing::warn!("unknown verb '{id}' in config, ignoring");
            }
            known
        });
        self.tenses.retain(|id| {
            let known = lexicon.tense_index(id).is_some();
            if !known {
                tracing::warn!("unknown tense '{id}' in config, ignoring");
            }
            known
        });
    }

    pub fn quiz_options(&self) -> QuizOptions {
        QuizOptions {
            review_bias: self.review_bias,
            review_capacity: self.review_capacity,
            sprint_secs: self.sprint_seconds,
            correct_delay: Duration::from_millis(self.correct_delay_ms),
            incorrect_delay: Duration::from_millis(self.incorrect_delay_ms),
            skip_delay: Duration::from_millis(self.skip_delay_ms),
            filter: PracticeFilter {
                verbs: self.verbs.clone(),
                tenses: self.tenses.clone(),
            },
        }
    }
}
