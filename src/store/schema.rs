use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::engine::review::ReviewItem;

pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

fn default_level() -> u32 {
    1
}

/// Progress carried across runs. Review items are stored oldest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub xp: u32,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default, alias = "maxStreak")]
    pub max_streak: u32,
    #[serde(default, alias = "reviewList")]
    pub review_list: Vec<ReviewItem>,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            xp: 0,
            level: 1,
            max_streak: 0,
            review_list: Vec::new(),
        }
    }
}

impl ProgressSnapshot {
    /// Snapshots written by a newer build are not trusted.
    pub fn is_supported(&self) -> bool {
        self.schema_version <= SCHEMA_VERSION
    }
}

pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub conjugr_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub config: Config,
    pub progress: ProgressSnapshot,
}
