//! Per-user metadata of saved takes.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// One saved take
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMeta {
    pub user: String,
    pub filename: String,
    pub duration_secs: f64,
    pub created_at: DateTime<Utc>,
}

/// Where take metadata is kept. `list` returns newest first.
pub trait MetadataStore: Send + Sync {
    fn record(&self, user: &str, filename: &str, duration_secs: f64) -> Result<(), StoreError>;

    fn list(&self, user: &str) -> Result<Vec<RecordingMeta>, StoreError>;
}

fn newest_first(rows: &[RecordingMeta], user: &str) -> Vec<RecordingMeta> {
    // Stable sort keeps insertion order for equal timestamps; reverse it too
    let mut rows: Vec<RecordingMeta> = rows
        .iter()
        .rev()
        .filter(|r| r.user == user)
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    rows
}

fn meta(user: &str, filename: &str, duration_secs: f64) -> RecordingMeta {
    RecordingMeta {
        user: user.to_string(),
        filename: filename.to_string(),
        duration_secs,
        created_at: Utc::now(),
    }
}

/// Session-only store
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<RecordingMeta>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetadataStore for MemoryStore {
    fn record(&self, user: &str, filename: &str, duration_secs: f64) -> Result<(), StoreError> {
        self.rows.lock().push(meta(user, filename, duration_secs));
        Ok(())
    }

    fn list(&self, user: &str) -> Result<Vec<RecordingMeta>, StoreError> {
        Ok(newest_first(&self.rows.lock(), user))
    }
}

/// Store kept as a JSON array in one file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<RecordingMeta>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl MetadataStore for JsonFileStore {
    fn record(&self, user: &str, filename: &str, duration_secs: f64) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut rows = self.read_all()?;
        rows.push(meta(user, filename, duration_secs));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&rows)?)?;
        log::debug!("Recorded take {} for {}", filename, user);
        Ok(())
    }

    fn list(&self, user: &str) -> Result<Vec<RecordingMeta>, StoreError> {
        let _guard = self.lock.lock();
        Ok(newest_first(&self.read_all()?, user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn MetadataStore) {
        store.record("awa", "rec_1.wav", 1.5).unwrap();
        store.record("kofi", "rec_2.wav", 2.0).unwrap();
        store.record("awa", "rec_3.wav", 3.25).unwrap();

        let rows = store.list("awa").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].filename, "rec_3.wav");
        assert_eq!(rows[1].filename, "rec_1.wav");
        assert!(rows[0].created_at >= rows[1].created_at);
        assert_eq!(rows[0].duration_secs, 3.25);

        assert!(store.list("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn test_json_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data").join("recordings.json"));

        assert!(store.list("awa").unwrap().is_empty());
        exercise(&store);

        // A second handle sees the same rows
        let reopened = JsonFileStore::new(store.path());
        assert_eq!(reopened.list("kofi").unwrap().len(), 1);
    }

    #[test]
    fn test_json_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recordings.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.list("awa"), Err(StoreError::Json(_))));
    }
}
