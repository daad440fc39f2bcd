use atomic_write_file::AtomicWriteFile;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::error::StoreError;
use super::types::{
    genre_index, ImportReport, Rating, Snapshot, StoreFile, META_IDX, SNAPSHOT_VERSION,
    STORE_VERSION,
};

/// Get the default store file path (~/.config/genre-rater/ratings.json)
pub fn get_data_path() -> PathBuf {
    crate::config::get_config_dir().join("ratings.json")
}

/// File name used for dated backups, e.g. `genre-rater-backup-2025-03-14.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("genre-rater-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Durable per-device store of ratings and settings.
///
/// Everything lives in memory and every mutation rewrites the backing JSON
/// file atomically. The in-memory state only changes once the write has
/// committed, so a failed write leaves the store as it was.
#[derive(Debug)]
pub struct RatingStore {
    path: PathBuf,
    data: StoreFile,
}

impl RatingStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self {
                path: path.to_path_buf(),
                data: StoreFile::default(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| {
            StoreError::storage(format!("Failed to read store at {}", path.display()), e)
        })?;
        let data: StoreFile =
            serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;

        if data.version != STORE_VERSION {
            return Err(StoreError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: data.version,
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            data,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_rating(&self, genre_id: usize) -> Option<&Rating> {
        self.data.ratings.get(&genre_id)
    }

    /// Insert or fully replace the rating stored under `rating.genre_id`
    pub fn set_rating(&mut self, rating: Rating) -> Result<(), StoreError> {
        let mut next = self.data.clone();
        next.ratings.insert(rating.genre_id, rating);
        self.commit(next)
    }

    /// Every stored rating. Consumers that need an order must sort.
    pub fn get_all_ratings(&self) -> Vec<Rating> {
        self.data.ratings.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.data.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.ratings.is_empty()
    }

    /// Remove every rating. Settings are kept.
    pub fn clear_all_ratings(&mut self) -> Result<(), StoreError> {
        let mut next = self.data.clone();
        next.ratings.clear();
        self.commit(next)
    }

    pub fn get_meta(&self, key: &str) -> Option<&Value> {
        self.data.meta.get(key)
    }

    pub fn set_meta(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut next = self.data.clone();
        next.meta.insert(key.to_string(), value);
        self.commit(next)
    }

    /// Last browsed genre position, if one was saved
    pub fn position(&self) -> Option<usize> {
        self.get_meta(META_IDX)
            .and_then(Value::as_u64)
            .and_then(|idx| usize::try_from(idx).ok())
    }

    pub fn set_position(&mut self, idx: usize) -> Result<(), StoreError> {
        self.set_meta(META_IDX, Value::from(idx))
    }

    /// Package all ratings and the browsing position into a backup snapshot
    pub fn export_data(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            exported_at: Utc::now(),
            idx: self.position().unwrap_or(0),
            ratings: self.get_all_ratings(),
        }
    }

    /// Write a pretty-printed snapshot to `path` and return it
    pub fn export_to_path(&self, path: &Path) -> Result<Snapshot, StoreError> {
        let snapshot = self.export_data();
        let json = snapshot_to_json(&snapshot)?;
        write_atomically(path, json.as_bytes())?;
        Ok(snapshot)
    }

    /// Replace all ratings with the contents of a snapshot.
    ///
    /// The payload must be an object with a `ratings` array, otherwise a
    /// validation error is returned and nothing changes. Entries without a
    /// non-negative integer `genreId` are skipped. Other fields decode
    /// leniently (see [`Rating`]).
    /// `idx` is restored only when it is a non-negative integer.
    pub fn import_data(&mut self, data: &Value) -> Result<ImportReport, StoreError> {
        let object = data
            .as_object()
            .ok_or_else(|| StoreError::Validation("expected a JSON object".to_string()))?;

        let entries = object
            .get("ratings")
            .and_then(Value::as_array)
            .ok_or_else(|| StoreError::Validation("missing \"ratings\" array".to_string()))?;

        if let Some(version) = object.get("version").and_then(Value::as_u64) {
            if version > u64::from(SNAPSHOT_VERSION) {
                return Err(StoreError::Validation(format!(
                    "backup version {} is newer than supported version {}",
                    version, SNAPSHOT_VERSION
                )));
            }
        }

        let mut report = ImportReport::default();
        let mut ratings = BTreeMap::new();
        for (i, entry) in entries.iter().enumerate() {
            if entry.get("genreId").and_then(genre_index).is_none() {
                crate::verbose_eprintln!("Skipping backup entry {}: no valid genreId", i);
                report.skipped += 1;
                continue;
            }
            match Rating::deserialize(entry) {
                Ok(rating) => {
                    ratings.insert(rating.genre_id, rating);
                }
                Err(e) => {
                    crate::verbose_eprintln!("Skipping backup entry {}: {}", i, e);
                    report.skipped += 1;
                }
            }
        }
        report.imported = ratings.len();

        let mut next = self.data.clone();
        next.ratings = ratings;
        if let Some(idx) = object.get("idx").and_then(Value::as_u64) {
            next.meta.insert(META_IDX.to_string(), Value::from(idx));
            report.idx_restored = true;
        }

        self.commit(next)?;
        Ok(report)
    }

    /// Parse `json` and import it. Malformed JSON is a parse error.
    pub fn import_str(&mut self, json: &str) -> Result<ImportReport, StoreError> {
        let data: Value = serde_json::from_str(json)?;
        self.import_data(&data)
    }

    pub fn import_from_path(&mut self, path: &Path) -> Result<ImportReport, StoreError> {
        let json = fs::read_to_string(path).map_err(|e| {
            StoreError::storage(format!("Failed to read backup at {}", path.display()), e)
        })?;
        self.import_str(&json)
    }

    fn commit(&mut self, next: StoreFile) -> Result<(), StoreError> {
        save_store_file(&self.path, &next)?;
        self.data = next;
        Ok(())
    }
}

fn save_store_file(path: &Path, data: &StoreFile) -> Result<(), StoreError> {
    let json = to_pretty_json(data)?;
    write_atomically(path, json.as_bytes())
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| StoreError::storage("Failed to serialize ratings", std::io::Error::other(e)))
}

/// Write `bytes` to `path` so readers see either the old or the new file
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            StoreError::storage(format!("Failed to create directory {}", parent.display()), e)
        })?;
    }

    let mut file = AtomicWriteFile::open(path).map_err(|e| {
        StoreError::storage(format!("Failed to open {} for writing", path.display()), e)
    })?;
    file.write_all(bytes)
        .map_err(|e| StoreError::storage(format!("Failed to write {}", path.display()), e))?;
    file.commit()
        .map_err(|e| StoreError::storage(format!("Failed to save {}", path.display()), e))?;
    Ok(())
}

/// Pretty JSON text of a snapshot, as written by [`RatingStore::export_to_path`]
pub fn snapshot_to_json(snapshot: &Snapshot) -> Result<String, StoreError> {
    to_pretty_json(snapshot)
}
