//! Persistent Store Module
//!
//! On-disk cache tier: one JSON file per entry plus a flat index mapping
//! each key to its storage timestamp.
//!
//! # Layout
//! ```text
//! <cache_dir>/
//!   cache_index.json        {"cloudsense_cache_<md5>": 1718000000.123, ...}
//!   <md5(key)>.json         payload
//! ```
//!
//! Every operation returns a [`StorageResult`]; nothing here panics on bad
//! disk state. A crash between writing an entry file and rewriting the index
//! leaves either an orphaned file (removed by [`PersistentStore::clear_all`])
//! or an index record without a file (dropped on the next [`PersistentStore::load`]).

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::entry::age_at;
use crate::cache::{CacheEntry, CacheKey};
use crate::error::{StorageError, StorageResult};

/// File name of the key -> timestamp index.
pub const INDEX_FILE: &str = "cache_index.json";

type Index = BTreeMap<String, f64>;

// == Persistent Store ==
/// Directory-backed cache tier.
#[derive(Debug, Clone)]
pub struct PersistentStore {
    dir: PathBuf,
}

impl PersistentStore {
    // == Constructor ==
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    /// Entry file for `key`, named by a second MD5 so it is filesystem-safe.
    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir
            .join(format!("{:x}.json", md5::compute(key.as_str().as_bytes())))
    }

    // == Index I/O ==
    fn read_index(&self) -> StorageResult<Index> {
        match fs::read_to_string(self.index_path()) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Index::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_index(&self, index: &Index) -> StorageResult<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.index_path(), serde_json::to_vec(index)?)?;
        Ok(())
    }

    // == Stored At ==
    /// Index-only lookup of when `key` was stored.
    pub fn stored_at(&self, key: &CacheKey) -> StorageResult<Option<f64>> {
        Ok(self.read_index()?.get(key.as_str()).copied())
    }

    // == Load ==
    /// Reads the entry for `key` if the index has it and it is younger than
    /// `ttl_seconds`.
    ///
    /// Stale entries are deleted on the way out. An index record whose file
    /// has vanished is dropped and reported as absent.
    pub fn load(&self, key: &CacheKey, ttl_seconds: u64, now: f64) -> StorageResult<Option<CacheEntry>> {
        let mut index = self.read_index()?;
        let Some(&stored_at) = index.get(key.as_str()) else {
            return Ok(None);
        };

        let age = age_at(stored_at, now);
        if age >= ttl_seconds as f64 {
            debug!(
                "Persistent cache EXPIRED for key: {}... (age: {:.1}s)",
                key.short(),
                age
            );
            remove_file_if_exists(&self.entry_path(key))?;
            index.remove(key.as_str());
            self.write_index(&index)?;
            return Ok(None);
        }

        let raw = match fs::read_to_string(self.entry_path(key)) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("Dropping index record without entry file: {}...", key.short());
                index.remove(key.as_str());
                self.write_index(&index)?;
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let payload: Value = serde_json::from_str(&raw)?;
        Ok(Some(CacheEntry::new(payload, stored_at)))
    }

    // == Save ==
    /// Writes the entry file, then records `stored_at` in the index.
    ///
    /// A corrupt index is replaced rather than blocking all future writes.
    pub fn save(&self, key: &CacheKey, payload: &Value, stored_at: f64) -> StorageResult<()> {
        let body = serde_json::to_vec(payload)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(self.entry_path(key), body)?;

        let mut index = match self.read_index() {
            Ok(index) => index,
            Err(StorageError::Json(err)) => {
                warn!("Replacing corrupt cache index: {}", err);
                Index::new()
            }
            Err(err) => return Err(err),
        };
        index.insert(key.as_str().to_string(), stored_at);
        self.write_index(&index)
    }

    // == Remove Expired ==
    /// Deletes every entry older than `ttl_seconds`, rewriting the index once.
    pub fn remove_expired(&self, ttl_seconds: u64, now: f64) -> StorageResult<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }

        let mut index = self.read_index()?;
        let expired: Vec<String> = index
            .iter()
            .filter(|(_, stored_at)| age_at(**stored_at, now) > ttl_seconds as f64)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            remove_file_if_exists(&self.entry_path(&CacheKey::from_raw(key.as_str())))?;
            index.remove(key);
        }

        if !expired.is_empty() {
            self.write_index(&index)?;
            debug!("Cleaned up {} expired persistent cache entries", expired.len());
        }
        Ok(expired.len())
    }

    // == Clear All ==
    /// Removes the whole cache directory.
    pub fn clear_all(&self) -> StorageResult<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Number of indexed entries.
    #[cfg(test)]
    fn len(&self) -> StorageResult<usize> {
        Ok(self.read_index()?.len())
    }
}

fn remove_file_if_exists(path: &Path) -> StorageResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, PersistentStore) {
        let dir = TempDir::new().unwrap();
        let store = PersistentStore::new(dir.path().join("cache"));
        (dir, store)
    }

    fn key(name: &str) -> CacheKey {
        CacheKey::from_raw(name)
    }

    #[test]
    fn test_save_and_load() {
        let (_dir, store) = store();

        store.save(&key("k1"), &json!({"totalCost": 12.34}), 1000.0).unwrap();
        let entry = store.load(&key("k1"), 3600, 1000.0 + 10.0).unwrap().unwrap();

        assert_eq!(entry.payload, json!({"totalCost": 12.34}));
        assert_eq!(entry.stored_at, 1000.0);
    }

    #[test]
    fn test_load_missing_directory() {
        let (_dir, store) = store();
        assert!(store.load(&key("k1"), 3600, 0.0).unwrap().is_none());
        assert_eq!(store.len().unwrap(), 0);
    }

    #[test]
    fn test_index_is_flat_key_to_timestamp_map() {
        let (_dir, store) = store();
        store.save(&key("k1"), &json!([1, 2]), 1000.5).unwrap();

        let raw = fs::read_to_string(store.dir().join(INDEX_FILE)).unwrap();
        let index: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(index, json!({"k1": 1000.5}));
    }

    #[test]
    fn test_load_expired_removes_entry() {
        let (_dir, store) = store();
        store.save(&key("k1"), &json!(1), 1000.0).unwrap();

        assert!(store.load(&key("k1"), 3600, 1000.0 + 3601.0).unwrap().is_none());
        assert_eq!(store.len().unwrap(), 0);
        assert!(!store.entry_path(&key("k1")).exists());
    }

    #[test]
    fn test_load_missing_file_drops_index_record() {
        let (_dir, store) = store();
        store.save(&key("k1"), &json!(1), 1000.0).unwrap();
        fs::remove_file(store.entry_path(&key("k1"))).unwrap();

        assert!(store.load(&key("k1"), 3600, 1000.0).unwrap().is_none());
        assert_eq!(store.stored_at(&key("k1")).unwrap(), None);
    }

    #[test]
    fn test_load_corrupt_entry_is_error() {
        let (_dir, store) = store();
        store.save(&key("k1"), &json!(1), 1000.0).unwrap();
        fs::write(store.entry_path(&key("k1")), "{oops").unwrap();

        let result = store.load(&key("k1"), 3600, 1000.0);
        assert!(matches!(result, Err(StorageError::Json(_))));
    }

    #[test]
    fn test_save_replaces_corrupt_index() {
        let (_dir, store) = store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.dir().join(INDEX_FILE), "not json").unwrap();

        store.save(&key("k1"), &json!("v"), 5.0).unwrap();
        assert_eq!(store.stored_at(&key("k1")).unwrap(), Some(5.0));
    }

    #[test]
    fn test_remove_expired() {
        let (_dir, store) = store();
        store.save(&key("old"), &json!(1), 0.0).unwrap();
        store.save(&key("new"), &json!(2), 90.0).unwrap();

        assert_eq!(store.remove_expired(50, 100.0).unwrap(), 1);
        assert_eq!(store.len().unwrap(), 1);
        assert!(store.load(&key("new"), 50, 100.0).unwrap().is_some());
        assert!(!store.entry_path(&key("old")).exists());
    }

    #[test]
    fn test_remove_expired_without_directory() {
        let (_dir, store) = store();
        assert_eq!(store.remove_expired(0, 100.0).unwrap(), 0);
    }

    #[test]
    fn test_clear_all() {
        let (_dir, store) = store();
        store.save(&key("k1"), &json!(1), 1.0).unwrap();

        store.clear_all().unwrap();
        assert!(!store.dir().exists());

        // Clearing twice is fine
        store.clear_all().unwrap();
    }

    #[test]
    fn test_entry_file_name_is_filesystem_safe() {
        let (_dir, store) = store();
        let path = store.entry_path(&key("weird/key with spaces?"));
        let name = path.file_name().unwrap().to_str().unwrap();

        assert_eq!(name.len(), 32 + ".json".len());
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '.'));
    }
}
