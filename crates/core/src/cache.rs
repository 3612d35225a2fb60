//! Persistent response cache.
//!
//! Entries are keyed by URL hash and expire after 24 hours. The cache is
//! capped; beyond the cap the oldest entries are evicted. Persistence is a
//! single JSON file; any load or save failure degrades to a cache miss
//! with a warning rather than an error.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Entries older than this are treated as absent.
pub const FRESHNESS_SECONDS: i64 = 24 * 60 * 60;

/// Maximum number of cached responses kept on disk.
pub const MAX_ENTRIES: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    content: String,
    timestamp: DateTime<Utc>,
}

/// A URL-hash-keyed response cache with JSON file persistence.
pub struct ResponseCache {
    path: PathBuf,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    /// Opens a cache backed by the given file.
    ///
    /// A missing or unreadable file yields an empty cache.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match load_entries(&path) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "cache load failed, starting empty");
                HashMap::new()
            }
        };
        Self { path, entries: Mutex::new(entries) }
    }

    /// The default cache file location under the platform cache directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("excerpo").join("responses.json"))
    }

    /// Looks up a fresh entry by URL hash.
    pub fn get(&self, url_hash: &str) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(url_hash)?;
        if Utc::now() - entry.timestamp > Duration::seconds(FRESHNESS_SECONDS) {
            return None;
        }
        Some(entry.content.clone())
    }

    /// Stores a response under a URL hash, evicting the oldest entries
    /// beyond the cap, and persists the cache. Persistence failures are
    /// logged and otherwise ignored.
    pub fn put(&self, url_hash: &str, content: &str, timestamp: DateTime<Utc>) {
        {
            let Ok(mut entries) = self.entries.lock() else {
                return;
            };
            entries.insert(
                url_hash.to_string(),
                CacheEntry { content: content.to_string(), timestamp },
            );

            while entries.len() > MAX_ENTRIES {
                let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.timestamp)
                    .map(|(key, _)| key.clone())
                else {
                    break;
                };
                entries.remove(&oldest);
            }
        }

        if let Err(err) = self.save() {
            tracing::warn!(path = %self.path.display(), %err, "cache save failed");
        }
    }

    /// Number of entries currently held, fresh or stale.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn save(&self) -> std::io::Result<()> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| std::io::Error::other("cache lock poisoned"))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(&*entries)?;
        std::fs::write(&self.path, json)
    }
}

fn load_entries(path: &Path) -> std::io::Result<HashMap<String, CacheEntry>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let data = std::fs::read_to_string(path)?;
    let entries = serde_json::from_str(&data)?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_put_and_get() {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::open(dir.path().join("cache.json"));

        cache.put("abc", "<html>cached</html>", Utc::now());
        assert_eq!(cache.get("abc").as_deref(), Some("<html>cached</html>"));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_stale_entries_miss() {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::open(dir.path().join("cache.json"));

        let stale = Utc::now() - Duration::seconds(FRESHNESS_SECONDS + 60);
        cache.put("old", "stale body", stale);
        assert_eq!(cache.get("old"), None);
    }

    #[test]
    fn test_persistence_across_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        {
            let cache = ResponseCache::open(&path);
            cache.put("key", "persisted", Utc::now());
        }

        let reopened = ResponseCache::open(&path);
        assert_eq!(reopened.get("key").as_deref(), Some("persisted"));
    }

    #[test]
    fn test_eviction_removes_oldest() {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::open(dir.path().join("cache.json"));

        let base = Utc::now();
        for i in 0..(MAX_ENTRIES + 5) {
            let ts = base - Duration::seconds((MAX_ENTRIES + 5 - i) as i64);
            cache.put(&format!("key-{i}"), "body", ts);
        }

        assert_eq!(cache.len(), MAX_ENTRIES);
        // The oldest keys were inserted first with the oldest timestamps.
        assert_eq!(cache.get("key-0"), None);
        assert!(cache.get(&format!("key-{}", MAX_ENTRIES + 4)).is_some());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "not json at all").unwrap();

        let cache = ResponseCache::open(&path);
        assert!(cache.is_empty());
    }
}
