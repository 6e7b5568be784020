//! Content-level duplicate detection.
//!
//! Files are pre-grouped by size so only paths that could possibly
//! collide get hashed. Hashing runs in parallel and reuses digests
//! already resolved in the scan cache.

use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::cache::ScanCache;
use crate::cancel::CancelToken;
use crate::hashing::ContentHash;
use crate::models::AssetRecord;

/// One group of byte-identical files.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DuplicateGroup {
    pub hash: ContentHash,
    pub size: u64,
    pub paths: Vec<String>,
}

impl DuplicateGroup {
    /// Bytes that would be freed by keeping a single copy.
    pub fn wasted_bytes(&self) -> u64 {
        self.size * (self.paths.len() as u64 - 1)
    }
}

/// All duplicate groups found in one asset set, keyed by content hash
/// for rule lookups.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    groups: Vec<DuplicateGroup>,
    by_path: HashMap<String, usize>,
}

impl DuplicateIndex {
    /// Hash size-colliding assets and collect groups with two or more
    /// members. Group members and groups themselves come out in a
    /// deterministic order regardless of hashing parallelism.
    pub fn build(
        assets: &[AssetRecord],
        cache: &ScanCache,
        cancel: &CancelToken,
    ) -> std::io::Result<Self> {
        let mut by_size: HashMap<u64, Vec<&AssetRecord>> = HashMap::new();
        for asset in assets {
            by_size.entry(asset.size).or_default().push(asset);
        }

        let candidates: Vec<&AssetRecord> = by_size
            .into_values()
            .filter(|group| group.len() >= 2)
            .flatten()
            .collect();

        log::debug!(
            "{} of {} assets share a size and get hashed",
            candidates.len(),
            assets.len()
        );

        let hashed: Mutex<Vec<(ContentHash, u64, String)>> =
            Mutex::new(Vec::with_capacity(candidates.len()));

        candidates.par_iter().try_for_each(|asset| {
            if cancel.is_cancelled() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::Interrupted,
                    "cancelled",
                ));
            }
            // A file that vanished between scan and hashing simply
            // drops out of duplicate detection.
            match cache.ensure_content_hash(&asset.path, Some(cancel)) {
                Ok(Some(hash)) => {
                    if let Ok(mut hashed) = hashed.lock() {
                        hashed.push((hash, asset.size, asset.path.clone()));
                    }
                    Ok(())
                }
                // Cancellation observed mid-file.
                Ok(None) => Err(std::io::Error::new(
                    std::io::ErrorKind::Interrupted,
                    "cancelled",
                )),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    log::warn!("Skipping vanished file {}: {}", asset.path, e);
                    Ok(())
                }
                Err(e) => Err(e),
            }
        })?;

        let mut by_hash: HashMap<ContentHash, (u64, Vec<String>)> = HashMap::new();
        for (hash, size, path) in hashed.into_inner().unwrap_or_default() {
            let slot = by_hash.entry(hash).or_insert((size, Vec::new()));
            slot.1.push(path);
        }

        let mut groups: Vec<DuplicateGroup> = by_hash
            .into_iter()
            .filter(|(_, (_, paths))| paths.len() >= 2)
            .map(|(hash, (size, mut paths))| {
                paths.sort();
                DuplicateGroup { hash, size, paths }
            })
            .collect();
        groups.sort_by(|a, b| a.paths[0].cmp(&b.paths[0]));

        let mut by_path = HashMap::new();
        for (idx, group) in groups.iter().enumerate() {
            for path in &group.paths {
                by_path.insert(path.clone(), idx);
            }
        }

        Ok(Self { groups, by_path })
    }

    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    /// The group a path belongs to, if it has byte-identical siblings.
    pub fn group_for(&self, path: &str) -> Option<&DuplicateGroup> {
        self.by_path.get(path).map(|&idx| &self.groups[idx])
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_wasted_bytes(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::wasted_bytes).sum()
    }
}
