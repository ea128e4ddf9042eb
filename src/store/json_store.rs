use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Result, bail};
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};

use crate::config::Config;
use crate::store::schema::{EXPORT_VERSION, ExportData, ProgressSnapshot};

const PROGRESS_FILE: &str = "progress.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(Self::default_dir())
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("conjugr")
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// `None` when the file is missing, unreadable or malformed.
    fn load<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.file_path(name);
        if !path.exists() {
            return None;
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("cannot read {}: {e}", path.display());
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!("ignoring malformed {}: {e}", path.display());
                None
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Never fails: anything unusable yields a fresh snapshot.
    pub fn load_progress(&self) -> ProgressSnapshot {
        match self.load::<ProgressSnapshot>(PROGRESS_FILE) {
            Some(snapshot) if snapshot.is_supported() => snapshot,
            Some(snapshot) => {
                tracing::warn!(
                    "progress schema {} is newer than supported, starting fresh",
                    snapshot.schema_version
                );
                ProgressSnapshot::default()
            }
            None => ProgressSnapshot::default(),
        }
    }

    pub fn save_progress(&self, snapshot: &ProgressSnapshot) -> Result<()> {
        self.save(PROGRESS_FILE, snapshot)
    }

    pub fn reset_progress(&self) -> Result<()> {
        let path = self.file_path(PROGRESS_FILE);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    pub fn export_all(&self, config: &Config) -> ExportData {
        ExportData {
            conjugr_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            config: config.clone(),
            progress: self.load_progress(),
        }
    }

    pub fn import_all(&self, data: &ExportData) -> Result<()> {
        if data.conjugr_export_version != EXPORT_VERSION {
            bail!(
                "Unsupported export version: {} (expected {})",
                data.conjugr_export_version,
                EXPORT_VERSION
            );
        }
        if !data.progress.is_supported() {
            bail!(
                "Unsupported progress schema: {}",
                data.progress.schema_version
            );
        }
        self.save_progress(&data.progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::review::ReviewItem;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    fn sample_progress() -> ProgressSnapshot {
        ProgressSnapshot {
            xp: 340,
            level: 4,
            max_streak: 12,
            review_list: vec![ReviewItem {
                verb: "être".to_string(),
                tense: "Imparfait".to_string(),
                pronoun: "je".to_string(),
                answer: "étais".to_string(),
                timestamp: Utc::now(),
                verb_id: "etre".to_string(),
                tense_id: "imparfait".to_string(),
                pronoun_index: 0,
            }],
            ..ProgressSnapshot::default()
        }
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let (_dir, store) = make_test_store();
        let progress = store.load_progress();
        assert_eq!(progress, ProgressSnapshot::default());
        assert_eq!(progress.level, 1);
    }

    #[test]
    fn test_save_then_load() {
        let (_dir, store) = make_test_store();
        let progress = sample_progress();
        store.save_progress(&progress).unwrap();
        assert_eq!(store.load_progress(), progress);
        assert!(!store.file_path("progress.tmp").exists());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(PROGRESS_FILE), "{\"xp\": \"lots\"").unwrap();
        assert_eq!(store.load_progress(), ProgressSnapshot::default());

        fs::write(store.file_path(PROGRESS_FILE), "\"not a snapshot\"").unwrap();
        assert_eq!(store.load_progress(), ProgressSnapshot::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(PROGRESS_FILE), r#"{"xp": 120, "maxStreak": 4}"#).unwrap();
        let progress = store.load_progress();
        assert_eq!(progress.xp, 120);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.max_streak, 4);
        assert!(progress.review_list.is_empty());
    }

    #[test]
    fn test_older_progress_format_loads() {
        let (_dir, store) = make_test_store();
        fs::write(
            store.file_path(PROGRESS_FILE),
            r#"{"xp": 340, "level": 4, "maxStreak": 7, "reviewList": [
                {"verb": "être", "tense": "Imparfait", "pronoun": "je",
                 "correct": "étais", "timestamp": 1700000000000}
            ]}"#,
        )
        .unwrap();
        let progress = store.load_progress();
        assert_eq!(progress.xp, 340);
        assert_eq!(progress.level, 4);
        assert_eq!(progress.max_streak, 7);
        assert_eq!(progress.review_list.len(), 1);
        assert_eq!(progress.review_list[0].answer, "étais");
        assert_eq!(progress.review_list[0].timestamp.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_future_schema_ignored() {
        let (_dir, store) = make_test_store();
        fs::write(
            store.file_path(PROGRESS_FILE),
            r#"{"schema_version": 99, "xp": 500}"#,
        )
        .unwrap();
        assert_eq!(store.load_progress().xp, 0);
    }

    #[test]
    fn test_reset_progress_removes_file() {
        let (_dir, store) = make_test_store();
        store.save_progress(&sample_progress()).unwrap();
        store.reset_progress().unwrap();
        assert!(!store.file_path(PROGRESS_FILE).exists());
        store.reset_progress().unwrap();
    }

    #[test]
    fn test_round_trip_export_import() {
        let (_dir, store) = make_test_store();
        store.save_progress(&sample_progress()).unwrap();
        let export = store.export_all(&Config::default());
        assert_eq!(export.conjugr_export_version, EXPORT_VERSION);

        let (_dir2, store2) = make_test_store();
        store2.import_all(&export).unwrap();
        assert_eq!(store2.load_progress(), export.progress);
        assert_eq!(store2.load_progress().xp, 340);
    }

    #[test]
    fn test_version_rejection() {
        let (_dir, store) = make_test_store();
        let mut export = store.export_all(&Config::default());
        export.conjugr_export_version = 99;

        let err_msg = store.import_all(&export).unwrap_err().to_string();
        assert!(err_msg.contains("Unsupported export version"));
        assert!(err_msg.contains("99"));
        assert!(!store.file_path(PROGRESS_FILE).exists());
    }
}
