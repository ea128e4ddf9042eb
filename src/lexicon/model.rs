use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::matcher::starts_with_vowel_sound;

const BUILTIN_LEXICON: &str = include_str!("../../assets/lexicon.json");

/// Number of grammatical persons every conjugation table is indexed by.
pub const PRONOUN_SLOTS: usize = 6;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to parse lexicon: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read lexicon file: {0}")]
    Io(#[from] std::io::Error),
    #[error("expected {PRONOUN_SLOTS} pronouns, found {0}")]
    PronounCount(usize),
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
    #[error("lexicon has no {0}")]
    Empty(&'static str),
    #[error("no verb/tense pair has complete conjugation data")]
    NoQuestions,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pronoun {
    pub id: String,
    /// Display form, possibly several equivalent forms joined with '/'.
    pub fr: String,
    pub en: String,
    #[serde(default)]
    pub elided: Option<String>,
}

impl Pronoun {
    /// Individual surface forms, e.g. "il / elle / on" -> ["il", "elle", "on"].
    pub fn alternatives(&self) -> impl Iterator<Item = &str> {
        self.fr.split('/').map(str::trim).filter(|s| !s.is_empty())
    }

    /// The pronoun as it should be printed in front of `form`.
    pub fn display_before(&self, form: &str) -> &str {
        match &self.elided {
            Some(elided) if starts_with_vowel_sound(form) => elided,
            _ => &self.fr,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Example {
    pub fr: String,
    pub en: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TenseNotes {
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub formation: Option<String>,
    #[serde(default)]
    pub signal_words: Vec<String>,
    #[serde(default)]
    pub example: Option<Example>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tense {
    pub id: String,
    pub fr: String,
    pub en: String,
    #[serde(default)]
    pub notes: TenseNotes,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Verb {
    pub id: String,
    pub infinitive: String,
    pub english: String,
    #[serde(default)]
    pub group: String,
    /// tense id -> one form per pronoun slot
    pub conjugations: BTreeMap<String, Vec<String>>,
}

impl Verb {
    /// Forms for `tense_id`, only when all slots are filled in.
    pub fn forms(&self, tense_id: &str) -> Option<&[String]> {
        self.conjugations
            .get(tense_id)
            .filter(|forms| {
                forms.len() == PRONOUN_SLOTS && forms.iter().all(|f| !f.trim().is_empty())
            })
            .map(Vec::as_slice)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lexicon {
    pronouns: Vec<Pronoun>,
    tenses: Vec<Tense>,
    verbs: Vec<Verb>,
}

impl Lexicon {
    pub fn builtin() -> Result<Self, LexiconError> {
        Self::from_json(BUILTIN_LEXICON)
    }

    pub fn from_json(json: &str) -> Result<Self, LexiconError> {
        let lexicon: Lexicon = serde_json::from_str(json)?;
        lexicon.validate()?;
        Ok(lexicon)
    }

    pub fn from_path(path: &Path) -> Result<Self, LexiconError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load a user lexicon, falling back to the bundled one if it is unusable.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, LexiconError> {
        if let Some(path) = path {
            match Self::from_path(path) {
                Ok(lexicon) => {
                    tracing::info!("loaded lexicon from {}", path.display());
                    return Ok(lexicon);
                }
                Err(e) => {
                    tracing::warn!("ignoring lexicon {}: {e}", path.display());
                }
            }
        }
        Self::builtin()
    }

    fn validate(&self) -> Result<(), LexiconError> {
        if self.pronouns.len() != PRONOUN_SLOTS {
            return Err(LexiconError::PronounCount(self.pronouns.len()));
        }
        if self.verbs.is_empty() {
            return Err(LexiconError::Empty("verbs"));
        }
        if self.tenses.is_empty() {
            return Err(LexiconError::Empty("tenses"));
        }
        check_unique("pronoun", self.pronouns.iter().map(|p| p.id.as_str()))?;
        check_unique("tense", self.tenses.iter().map(|t| t.id.as_str()))?;
        check_unique("verb", self.verbs.iter().map(|v| v.id.as_str()))?;
        Ok(())
    }

    pub fn pronouns(&self) -> &[Pronoun] {
        &self.pronouns
    }

    pub fn tenses(&self) -> &[Tense] {
        &self.tenses
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    pub fn verb_index(&self, id: &str) -> Option<usize> {
        self.verbs.iter().position(|v| v.id == id)
    }

    pub fn tense_index(&self, id: &str) -> Option<usize> {
        self.tenses.iter().position(|t| t.id == id)
    }

    pub fn form(&self, verb: usize, tense: usize, slot: usize) -> Option<&str> {
        let verb = self.verbs.get(verb)?;
        let tense = self.tenses.get(tense)?;
        verb.forms(&tense.id)?.get(slot).map(String::as_str)
    }

    /// Every (verb, tense) index pair with a complete conjugation table.
    pub fn available_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (vi, verb) in self.verbs.iter().enumerate() {
            for (ti, tense) in self.tenses.iter().enumerate() {
                if verb.forms(&tense.id).is_some() {
                    pairs.push((vi, ti));
                }
            }
        }
        pairs
    }
}

fn check_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), LexiconError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(LexiconError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pronouns_json() -> &'static str {
        r#"[
            {"id": "je", "fr": "je", "en": "I", "elided": "j'"},
            {"id": "tu", "fr": "tu", "en": "you"},
            {"id": "il", "fr": "il / elle / on", "en": "he / she / one"},
            {"id": "nous", "fr": "nous", "en": "we"},
            {"id": "vous", "fr": "vous", "en": "you"},
            {"id": "ils", "fr": "ils / elles", "en": "they"}
        ]"#
    }

    #[test]
    fn test_builtin_lexicon_is_complete() {
        let lexicon = Lexicon::builtin().unwrap();
        assert_eq!(lexicon.pronouns().len(), PRONOUN_SLOTS);
        assert_eq!(lexicon.verbs().len(), 6);
        assert_eq!(lexicon.tenses().len(), 5);
        assert_eq!(lexicon.available_pairs().len(), 30);
    }

    #[test]
    fn test_form_lookup() {
        let lexicon = Lexicon::builtin().unwrap();
        let etre = lexicon.verb_index("etre").unwrap();
        let imparfait = lexicon.tense_index("imparfait").unwrap();
        assert_eq!(lexicon.form(etre, imparfait, 0), Some("étais"));
        assert_eq!(lexicon.form(etre, imparfait, PRONOUN_SLOTS), None);
        assert_eq!(lexicon.form(99, imparfait, 0), None);
    }

    #[test]
    fn test_incomplete_tables_are_not_available() {
        let json = format!(
            r#"{{
                "pronouns": {},
                "tenses": [
                    {{"id": "present", "fr": "Présent", "en": "Present"}},
                    {{"id": "imparfait", "fr": "Imparfait", "en": "Imperfect"}}
                ],
                "verbs": [{{
                    "id": "aller", "infinitive": "aller", "english": "to go",
                    "conjugations": {{
                        "present": ["vais", "vas", "va", "allons", "allez", "vont"],
                        "imparfait": ["allais", "allais", ""]
                    }}
                }}]
            }}"#,
            pronouns_json()
        );
        let lexicon = Lexicon::from_json(&json).unwrap();
        assert_eq!(lexicon.available_pairs(), vec![(0, 0)]);
        assert_eq!(lexicon.form(0, 1, 0), None);
    }

    #[test]
    fn test_wrong_pronoun_count_rejected() {
        let json = r#"{"pronouns": [{"id": "je", "fr": "je", "en": "I"}], "tenses": [], "verbs": []}"#;
        assert!(matches!(
            Lexicon::from_json(json),
            Err(LexiconError::PronounCount(1))
        ));
    }

    #[test]
    fn test_duplicate_verb_rejected() {
        let json = format!(
            r#"{{
                "pronouns": {},
                "tenses": [{{"id": "present", "fr": "Présent", "en": "Present"}}],
                "verbs": [
                    {{"id": "aller", "infinitive": "aller", "english": "to go", "conjugations": {{}}}},
                    {{"id": "aller", "infinitive": "aller", "english": "to go", "conjugations": {{}}}}
                ]
            }}"#,
            pronouns_json()
        );
        let err = Lexicon::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("duplicate verb id 'aller'"));
    }

    #[test]
    fn test_load_or_builtin_falls_back_on_bad_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let lexicon = Lexicon::load_or_builtin(Some(&path)).unwrap();
        assert!(lexicon.verb_index("parler").is_some());
    }

    #[test]
    fn test_pronoun_alternatives_and_elision() {
        let lexicon = Lexicon::builtin().unwrap();
        let il = &lexicon.pronouns()[2];
        assert_eq!(il.alternatives().collect::<Vec<_>>(), vec!["il", "elle", "on"]);

        let je = &lexicon.pronouns()[0];
        assert_eq!(je.display_before("ai parlé"), "j'");
        assert_eq!(je.display_before("étais"), "j'");
        assert_eq!(je.display_before("parle"), "je");
        assert_eq!(il.display_before("a"), "il / elle / on");
    }
}
