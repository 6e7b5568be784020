//! Incremental scan cache.
//!
//! Maps absolute path to the last-observed (mtime, size), the asset
//! metadata snapshot and a lazily computed content hash. Validation is
//! mtime+size equality only; a matched entry skips re-extraction on
//! rescan. Content hashes are resolved on demand (duplicate detection)
//! rather than on every scan.
//!
//! The map is sharded so parallel extraction workers don't serialize
//! on a single lock. The in-memory contract holds regardless of the
//! optional JSON persistence.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::SystemTime;

use crate::cancel::CancelToken;
use crate::hashing::{self, ContentHash};
use crate::models::AssetRecord;

const SHARD_COUNT: usize = 16;
const CACHE_VERSION: u32 = 1;

/// Snapshot for a single file. Trustworthy only while (path, mtime,
/// size) still match the filesystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub modified: u64,
    pub size: u64,
    pub content_hash: Option<ContentHash>,
    pub asset: AssetRecord,
}

/// Persisted form: one flat map plus a version stamp so incompatible
/// layouts are discarded instead of misread.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedCache {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

/// Sharded path-keyed cache. Injectable: tests supply an empty or
/// pre-seeded instance, nothing here is process-global.
#[derive(Debug)]
pub struct ScanCache {
    shards: Vec<RwLock<HashMap<String, CacheEntry>>>,
}

impl Default for ScanCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanCache {
    pub fn new() -> Self {
        let shards = (0..SHARD_COUNT)
            .map(|_| RwLock::new(HashMap::new()))
            .collect();
        Self { shards }
    }

    fn shard(&self, path: &str) -> &RwLock<HashMap<String, CacheEntry>> {
        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % SHARD_COUNT]
    }

    pub fn lookup(&self, path: &str) -> Option<CacheEntry> {
        self.shard(path).read().ok()?.get(path).cloned()
    }

    /// An entry is valid only while mtime and size both match. A
    /// change with identical mtime+size is an accepted false-positive
    /// risk of the incremental model.
    pub fn validate(entry: &CacheEntry, modified: u64, size: u64) -> bool {
        entry.modified == modified && entry.size == size
    }

    pub fn needs_rescan(&self, path: &str, modified: u64, size: u64) -> bool {
        match self.lookup(path) {
            Some(entry) => !Self::validate(&entry, modified, size),
            None => true,
        }
    }

    /// Insert or replace the entry for a freshly extracted asset. The
    /// content hash starts unresolved; any previous hash belonged to
    /// different bytes.
    pub fn upsert(&self, asset: AssetRecord, modified: u64) {
        let entry = CacheEntry {
            modified,
            size: asset.size,
            content_hash: None,
            asset,
        };
        if let Ok(mut shard) = self.shard(&entry.asset.path).write() {
            shard.insert(entry.asset.path.clone(), entry);
        }
    }

    /// Resolve the content hash for a path, reusing a cached digest
    /// when the entry is still valid against the filesystem. The fresh
    /// digest is stored back only when the entry still matches, so a
    /// concurrent file change cannot poison the cache. Hashing checks
    /// the token between chunks; `Ok(None)` means cancellation was
    /// observed mid-file.
    pub fn ensure_content_hash(
        &self,
        path: &str,
        cancel: Option<&CancelToken>,
    ) -> std::io::Result<Option<ContentHash>> {
        let fs_meta = fs::metadata(path)?;
        let modified = modified_unix_secs(&fs_meta);
        let size = fs_meta.len();

        if let Some(entry) = self.lookup(path) {
            if Self::validate(&entry, modified, size) {
                if let Some(hash) = entry.content_hash {
                    return Ok(Some(hash));
                }
            }
        }

        let Some(hash) = hashing::hash_file(Path::new(path), cancel)? else {
            return Ok(None);
        };

        if let Ok(mut shard) = self.shard(path).write() {
            if let Some(entry) = shard.get_mut(path) {
                if Self::validate(entry, modified, size) {
                    entry.content_hash = Some(hash.clone());
                }
            }
        }

        Ok(Some(hash))
    }

    /// Drop the entry for a single path. Used when a re-read of a
    /// changed file fails: the invalidated snapshot must not survive
    /// into the next result.
    pub fn remove(&self, path: &str) {
        if let Ok(mut shard) = self.shard(path).write() {
            shard.remove(path);
        }
    }

    /// Drop entries for paths a rescan no longer observed.
    pub fn prune(&self, seen: &HashSet<String>) {
        for shard in &self.shards {
            if let Ok(mut shard) = shard.write() {
                shard.retain(|path, _| seen.contains(path));
            }
        }
    }

    /// Snapshot of every cached asset record.
    pub fn assets(&self) -> Vec<AssetRecord> {
        let mut out = Vec::new();
        for shard in &self.shards {
            if let Ok(shard) = shard.read() {
                out.extend(shard.values().map(|e| e.asset.clone()));
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .filter_map(|s| s.read().ok())
            .map(|s| s.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        for shard in &self.shards {
            if let Ok(mut shard) = shard.write() {
                shard.clear();
            }
        }
    }

    /// Load a persisted cache. Any read, parse or version mismatch
    /// yields `None`; a missing cache is never an error.
    pub fn load(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        let persisted: PersistedCache = serde_json::from_str(&content).ok()?;
        if persisted.version != CACHE_VERSION {
            log::info!("Discarding cache with unknown version {}", persisted.version);
            return None;
        }

        let cache = Self::new();
        for (path, entry) in persisted.entries {
            if let Ok(mut shard) = cache.shard(&path).write() {
                shard.insert(path, entry);
            }
        }
        Some(cache)
    }

    /// Persist the cache as JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let mut entries = HashMap::new();
        for shard in &self.shards {
            if let Ok(shard) = shard.read() {
                for (path, entry) in shard.iter() {
                    entries.insert(path.clone(), entry.clone());
                }
            }
        }

        let persisted = PersistedCache {
            version: CACHE_VERSION,
            entries,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(&persisted)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, content)
    }
}

/// Default persisted-cache location for a project root: one file per
/// project, named after a digest of the root path.
pub fn default_cache_path(root: &Path) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(root.to_string_lossy().as_bytes());
    let digest = hex::encode(hasher.finalize());

    std::env::temp_dir()
        .join("curator-cache")
        .join(format!("{}.json", &digest[..16]))
}

/// File modification time as unix seconds; zero when unavailable.
pub fn modified_unix_secs(metadata: &fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
