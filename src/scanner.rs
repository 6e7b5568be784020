//! Directory walker / incremental scanner.
//!
//! Phases: Discovering (deterministic walk, lexicographic per
//! directory), Extracting (parallel, cache-aware), Aggregating (tree
//! and counts from the flat list). Cancellation is cooperative and a
//! cancelled scan yields no partial result. Per-file I/O errors are
//! counted as skipped files; only an inaccessible root is fatal.

use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::mpsc;
use walkdir::WalkDir;

use crate::cache::{modified_unix_secs, ScanCache};
use crate::cancel::CancelToken;
use crate::extract::{self, ExtractError};
use crate::models::{
    AssetRecord, DirectoryNode, ExtractFailure, ProjectType, ScanPhase, ScanProgress, ScanResult,
    ScanStats,
};

/// Extraction failures recorded verbatim in stats, beyond this many
/// only the counter grows.
const MAX_RECORDED_FAILURES: usize = 100;

/// How often discovery emits a progress event.
const DISCOVERY_PROGRESS_INTERVAL: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Path not found: {0}")]
    RootNotFound(String),
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    #[error("Scan cancelled")]
    Cancelled,
}

/// Per-scan knobs. The project type is consumed from an external
/// detector and threaded through unchanged.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub project_type: Option<ProjectType>,
    pub follow_symlinks: bool,
    pub max_depth: Option<usize>,
    pub exclude: Vec<regex::Regex>,
}

/// A completed scan plus its bookkeeping.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub result: ScanResult,
    pub stats: ScanStats,
}

pub struct ProjectScanner {
    cache: Arc<ScanCache>,
    options: ScanOptions,
}

impl ProjectScanner {
    pub fn new(cache: Arc<ScanCache>, options: ScanOptions) -> Self {
        Self { cache, options }
    }

    pub fn cache(&self) -> &Arc<ScanCache> {
        &self.cache
    }

    /// Run one full incremental pass over `root`. Progress events are
    /// delivered through `progress` with `try_send`, so a slow
    /// consumer coalesces events instead of stalling workers.
    pub fn scan(
        &self,
        root: &Path,
        cancel: &CancelToken,
        progress: Option<&mpsc::Sender<ScanProgress>>,
    ) -> Result<ScanOutcome, ScanError> {
        let started = Instant::now();
        let started_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if !root.exists() {
            return Err(ScanError::RootNotFound(root.display().to_string()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.display().to_string()));
        }

        log::info!("Scanning {}", root.display());

        // Phase 1: discovery. Total is unknown until the walk finishes.
        send_progress(
            progress,
            ScanProgress {
                phase: ScanPhase::Discovering,
                current: 0,
                total: None,
                current_file: String::new(),
            },
        );

        let mut discovered: Vec<(PathBuf, u64, u64)> = Vec::new();
        let mut skipped_files = 0usize;

        let mut walker = WalkDir::new(root)
            .follow_links(self.options.follow_symlinks)
            .sort_by_file_name();
        if let Some(depth) = self.options.max_depth {
            walker = walker.max_depth(depth);
        }

        // Hidden entries are pruned at the walker so hidden trees
        // (.git, .import) are never descended into.
        let entries = walker.into_iter().filter_entry(|entry| {
            entry.depth() == 0 || !entry.file_name().to_string_lossy().starts_with('.')
        });

        for entry in entries {
            if cancel.is_cancelled() {
                return self.cancelled(progress);
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    skipped_files += 1;
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            // Unity .meta companions describe assets, they are not
            // assets themselves.
            if file_name.ends_with(".meta") {
                continue;
            }

            let extension = path
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();
            if extension.is_empty() {
                continue;
            }

            let path_str = path.to_string_lossy();
            if self.options.exclude.iter().any(|re| re.is_match(&path_str)) {
                log::trace!("Excluded by pattern: {}", path_str);
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    skipped_files += 1;
                    continue;
                }
            };

            discovered.push((
                path.to_path_buf(),
                modified_unix_secs(&metadata),
                metadata.len(),
            ));

            if discovered.len() % DISCOVERY_PROGRESS_INTERVAL == 0 {
                send_progress(
                    progress,
                    ScanProgress {
                        phase: ScanPhase::Discovering,
                        current: discovered.len(),
                        total: None,
                        current_file: path_str.to_string(),
                    },
                );
            }
        }

        // Drop cache entries for files no longer on disk.
        let seen: HashSet<String> = discovered
            .iter()
            .map(|(p, _, _)| p.to_string_lossy().to_string())
            .collect();
        self.cache.prune(&seen);

        let to_scan: Vec<&(PathBuf, u64, u64)> = discovered
            .iter()
            .filter(|(path, modified, size)| {
                self.cache
                    .needs_rescan(&path.to_string_lossy(), *modified, *size)
            })
            .collect();

        let total_files = discovered.len();
        let rescan_count = to_scan.len();
        let cached_files = total_files - rescan_count;
        log::debug!(
            "Discovered {} files ({} cached, {} to extract)",
            total_files,
            cached_files,
            rescan_count
        );

        // Phase 2: parallel extraction of files that failed validation.
        let counter = AtomicUsize::new(0);
        let skipped_in_flight = AtomicUsize::new(0);
        let failure_count = AtomicUsize::new(0);
        let failures: Mutex<Vec<ExtractFailure>> = Mutex::new(Vec::new());

        let extraction = to_scan.par_iter().try_for_each(|(path, modified, size)| {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }

            let current = counter.fetch_add(1, Ordering::SeqCst) + 1;
            send_progress(
                progress,
                ScanProgress {
                    phase: ScanPhase::Extracting,
                    current,
                    total: Some(rescan_count),
                    current_file: path.to_string_lossy().to_string(),
                },
            );

            match self.parse_asset(path, *size, &failure_count, &failures) {
                Some(record) => self.cache.upsert(record, *modified),
                None => {
                    skipped_in_flight.fetch_add(1, Ordering::Relaxed);
                }
            }
            Ok(())
        });

        if extraction.is_err() || cancel.is_cancelled() {
            return self.cancelled(progress);
        }

        // Phase 3: aggregation from the flat asset list.
        send_progress(
            progress,
            ScanProgress {
                phase: ScanPhase::Aggregating,
                current: rescan_count,
                total: Some(rescan_count),
                current_file: String::new(),
            },
        );

        let mut assets = self.cache.assets();
        assets.sort_by(|a, b| a.path.to_lowercase().cmp(&b.path.to_lowercase()));

        let mut type_counts: HashMap<String, usize> = HashMap::new();
        for asset in &assets {
            *type_counts
                .entry(asset.asset_type.as_str().to_string())
                .or_insert(0) += 1;
        }

        let directory_tree = build_directory_tree(root, &assets);
        let total_count = assets.len();
        let total_size = assets.iter().map(|a| a.size).sum();

        send_progress(
            progress,
            ScanProgress {
                phase: ScanPhase::Completed,
                current: rescan_count,
                total: Some(rescan_count),
                current_file: String::new(),
            },
        );

        let result = ScanResult {
            root_path: root.display().to_string(),
            directory_tree,
            assets,
            total_count,
            total_size,
            type_counts,
            project_type: self.options.project_type,
        };

        let stats = ScanStats {
            started_at,
            duration_seconds: started.elapsed().as_secs_f64(),
            total_files,
            cached_files,
            rescanned_files: rescan_count,
            skipped_files: skipped_files + skipped_in_flight.load(Ordering::Relaxed),
            extract_failure_count: failure_count.load(Ordering::Relaxed),
            extract_failures: failures.into_inner().unwrap_or_default(),
        };

        log::info!(
            "Scan completed in {:.2}s: {} assets, {} cached, {} skipped",
            stats.duration_seconds,
            total_count,
            stats.cached_files,
            stats.skipped_files
        );

        Ok(ScanOutcome { result, stats })
    }

    /// Parse one file into an asset record. Returns `None` when the
    /// file could not be read at all (vanished, permission denied);
    /// format-level failures degrade to a record without metadata.
    fn parse_asset(
        &self,
        path: &Path,
        size: u64,
        failure_count: &AtomicUsize,
        failures: &Mutex<Vec<ExtractFailure>>,
    ) -> Option<AssetRecord> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();

        let asset_type = extract::classify_extension(&extension);

        let metadata = match extract::extract_metadata(path, asset_type, &extension) {
            Ok(meta) => meta,
            Err(ExtractError::Io { path, source }) => {
                log::warn!("Skipping {}: {}", path, source);
                // An older snapshot for this path is already
                // invalidated (mtime/size changed); it must not leak
                // into the result through the cache.
                self.cache.remove(&path);
                return None;
            }
            Err(e) => {
                log::warn!("Metadata extraction failed for {}: {}", path.display(), e);
                failure_count.fetch_add(1, Ordering::Relaxed);
                if let Ok(mut failures) = failures.lock() {
                    if failures.len() < MAX_RECORDED_FAILURES {
                        failures.push(ExtractFailure {
                            path: path.display().to_string(),
                            reason: e.to_string(),
                        });
                    }
                }
                None
            }
        };

        let unity_guid = if matches!(self.options.project_type, Some(ProjectType::Unity)) {
            extract::unity::read_guid(path)
        } else {
            None
        };

        Some(AssetRecord {
            path: path.to_string_lossy().to_string(),
            name,
            extension,
            asset_type,
            size,
            metadata,
            unity_guid,
        })
    }

    fn cancelled(
        &self,
        progress: Option<&mpsc::Sender<ScanProgress>>,
    ) -> Result<ScanOutcome, ScanError> {
        send_progress(
            progress,
            ScanProgress {
                phase: ScanPhase::Cancelled,
                current: 0,
                total: None,
                current_file: String::new(),
            },
        );
        log::info!("Scan cancelled");
        Err(ScanError::Cancelled)
    }
}

fn send_progress(progress: Option<&mpsc::Sender<ScanProgress>>, event: ScanProgress) {
    if let Some(tx) = progress {
        // Non-blocking: a full channel drops the event rather than
        // stalling a worker.
        let _ = tx.try_send(event);
    }
}

/// Build the directory tree bottom-up from the flat asset list, with
/// no second filesystem pass. Aggregates satisfy the recursive-sum
/// invariant by construction.
fn build_directory_tree(root: &Path, assets: &[AssetRecord]) -> DirectoryNode {
    let mut direct: HashMap<PathBuf, (usize, u64)> = HashMap::new();
    let mut children_of: HashMap<PathBuf, BTreeSet<PathBuf>> = HashMap::new();

    for asset in assets {
        let path = Path::new(&asset.path);
        let Some(parent) = path.parent() else {
            continue;
        };

        let slot = direct.entry(parent.to_path_buf()).or_default();
        slot.0 += 1;
        slot.1 += asset.size;

        // Register the ancestor chain up to (exclusive) the root.
        let mut dir = parent.to_path_buf();
        while dir != root && dir.starts_with(root) {
            let Some(parent_dir) = dir.parent().map(Path::to_path_buf) else {
                break;
            };
            children_of.entry(parent_dir.clone()).or_default().insert(dir);
            dir = parent_dir;
        }
    }

    build_node(root, &direct, &children_of)
}

fn build_node(
    path: &Path,
    direct: &HashMap<PathBuf, (usize, u64)>,
    children_of: &HashMap<PathBuf, BTreeSet<PathBuf>>,
) -> DirectoryNode {
    let mut children: Vec<DirectoryNode> = children_of
        .get(path)
        .map(|set| set.iter().map(|c| build_node(c, direct, children_of)).collect())
        .unwrap_or_default();
    children.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    let (direct_count, direct_size) = direct.get(path).copied().unwrap_or((0, 0));
    let file_count = direct_count + children.iter().map(|c| c.file_count).sum::<usize>();
    let total_size = direct_size + children.iter().map(|c| c.total_size).sum::<u64>();

    DirectoryNode {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string()),
        path: path.display().to_string(),
        children,
        file_count,
        total_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetType;
    use tempfile::TempDir;

    fn scanner() -> ProjectScanner {
        ProjectScanner::new(Arc::new(ScanCache::new()), ScanOptions::default())
    }

    fn write(dir: &Path, rel: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Recursively check the aggregate invariant against the flat list.
    fn check_aggregates(node: &DirectoryNode, assets: &[AssetRecord]) {
        let under: Vec<&AssetRecord> = assets
            .iter()
            .filter(|a| Path::new(&a.path).starts_with(&node.path))
            .collect();
        assert_eq!(node.file_count, under.len(), "count at {}", node.path);
        assert_eq!(
            node.total_size,
            under.iter().map(|a| a.size).sum::<u64>(),
            "size at {}",
            node.path
        );
        for child in &node.children {
            check_aggregates(child, assets);
        }
    }

    #[test]
    fn test_scan_classifies_and_aggregates() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "data/config.json", b"{}");
        write(dir.path(), "scripts/Player.cs", b"class Player {}");
        write(dir.path(), "scripts/ai/Enemy.cs", b"class Enemy {}");

        let outcome = scanner()
            .scan(dir.path(), &CancelToken::new(), None)
            .unwrap();
        let result = outcome.result;

        assert_eq!(result.total_count, 3);
        assert_eq!(result.type_counts.get("script"), Some(&2));
        assert_eq!(result.type_counts.get("data"), Some(&1));
        check_aggregates(&result.directory_tree, &result.assets);
    }

    #[test]
    fn test_assets_sorted_by_path() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.json", b"{}");
        write(dir.path(), "a.json", b"{}");
        write(dir.path(), "sub/c.json", b"{}");

        let outcome = scanner()
            .scan(dir.path(), &CancelToken::new(), None)
            .unwrap();
        let paths: Vec<&String> = outcome.result.assets.iter().map(|a| &a.path).collect();
        let mut sorted = paths.clone();
        sorted.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()));
        assert_eq!(paths, sorted);
    }

    #[test]
    fn test_rescan_unchanged_hits_cache() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", b"{}");
        write(dir.path(), "b.json", b"[]");

        let scanner = scanner();
        let first = scanner
            .scan(dir.path(), &CancelToken::new(), None)
            .unwrap();
        assert_eq!(first.stats.rescanned_files, 2);

        let second = scanner
            .scan(dir.path(), &CancelToken::new(), None)
            .unwrap();
        assert_eq!(second.stats.rescanned_files, 0);
        assert_eq!(second.stats.cached_files, 2);
        assert_eq!(first.result.assets, second.result.assets);
    }

    #[test]
    fn test_mtime_touch_forces_rescan() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "a.json", b"{}");

        let scanner = scanner();
        scanner.scan(dir.path(), &CancelToken::new(), None).unwrap();

        // Same content, bumped mtime.
        let handle = std::fs::OpenOptions::new()
            .append(true)
            .open(&file)
            .unwrap();
        handle
            .set_modified(std::time::SystemTime::now() + std::time::Duration::from_secs(5))
            .unwrap();
        drop(handle);

        let outcome = scanner
            .scan(dir.path(), &CancelToken::new(), None)
            .unwrap();
        assert_eq!(outcome.stats.rescanned_files, 1);
    }

    #[test]
    fn test_deleted_file_pruned_on_rescan() {
        let dir = TempDir::new().unwrap();
        let doomed = write(dir.path(), "gone.json", b"{}");
        write(dir.path(), "stays.json", b"{}");

        let scanner = scanner();
        assert_eq!(
            scanner
                .scan(dir.path(), &CancelToken::new(), None)
                .unwrap()
                .result
                .total_count,
            2
        );

        std::fs::remove_file(&doomed).unwrap();
        let outcome = scanner
            .scan(dir.path(), &CancelToken::new(), None)
            .unwrap();
        assert_eq!(outcome.result.total_count, 1);
        assert_eq!(outcome.result.assets[0].name, "stays.json");
    }

    #[test]
    fn test_corrupt_texture_degrades_without_aborting() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "broken.png", b"not really a png");

        let outcome = scanner()
            .scan(dir.path(), &CancelToken::new(), None)
            .unwrap();
        assert_eq!(outcome.result.total_count, 1);

        let asset = &outcome.result.assets[0];
        assert_eq!(asset.asset_type, AssetType::Texture);
        assert!(asset.metadata.is_none());
        assert_eq!(outcome.stats.extract_failure_count, 1);
        assert_eq!(outcome.stats.extract_failures.len(), 1);
    }

    #[test]
    #[cfg(unix)]
    fn test_failed_reread_drops_stale_entry() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "tex.png", b"first contents");

        let scanner = scanner();
        let first = scanner
            .scan(dir.path(), &CancelToken::new(), None)
            .unwrap();
        assert_eq!(first.result.total_count, 1);

        // The file changes but the re-read fails: a dangling symlink
        // has fresh lstat metadata and an unreadable target.
        std::fs::remove_file(&file).unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing-target"), &file).unwrap();

        let second = scanner
            .scan(dir.path(), &CancelToken::new(), None)
            .unwrap();
        assert_eq!(second.stats.skipped_files, 1);
        // The invalidated first-scan snapshot is gone, not served.
        assert_eq!(second.result.total_count, 0);
        assert!(second.result.assets.is_empty());
    }

    #[test]
    fn test_hidden_and_meta_files_ignored() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".hidden.json", b"{}");
        write(dir.path(), ".git/objects/blob.json", b"{}");
        write(dir.path(), "asset.png.meta", b"guid: abc");
        write(dir.path(), "real.json", b"{}");

        let outcome = scanner()
            .scan(dir.path(), &CancelToken::new(), None)
            .unwrap();
        assert_eq!(outcome.result.total_count, 1);
    }

    #[test]
    fn test_unknown_extension_classified_other() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "strange.xyz", b"???");

        let outcome = scanner()
            .scan(dir.path(), &CancelToken::new(), None)
            .unwrap();
        assert_eq!(outcome.result.assets[0].asset_type, AssetType::Other);
        assert!(outcome.result.assets[0].metadata.is_none());
        assert_eq!(outcome.stats.extract_failure_count, 0);
    }

    #[test]
    fn test_cancelled_scan_returns_no_result() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", b"{}");

        let token = CancelToken::new();
        token.cancel();

        let scanner = scanner();
        let err = scanner.scan(dir.path(), &token, None).unwrap_err();
        assert!(matches!(err, ScanError::Cancelled));

        // A subsequent uncancelled scan succeeds normally.
        let outcome = scanner
            .scan(dir.path(), &CancelToken::new(), None)
            .unwrap();
        assert_eq!(outcome.result.total_count, 1);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = scanner()
            .scan(&missing, &CancelToken::new(), None)
            .unwrap_err();
        assert!(matches!(err, ScanError::RootNotFound(_)));
    }

    #[test]
    fn test_exclude_patterns() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "keep.json", b"{}");
        write(dir.path(), "Library/skip.json", b"{}");

        let options = ScanOptions {
            exclude: vec![regex::Regex::new("Library").unwrap()],
            ..Default::default()
        };
        let scanner = ProjectScanner::new(Arc::new(ScanCache::new()), options);
        let outcome = scanner
            .scan(dir.path(), &CancelToken::new(), None)
            .unwrap();
        assert_eq!(outcome.result.total_count, 1);
        assert_eq!(outcome.result.assets[0].name, "keep.json");
    }

    #[test]
    fn test_unity_guid_threaded_through() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Sprite.png", b"img");
        write(
            dir.path(),
            "Sprite.png.meta",
            b"fileFormatVersion: 2\nguid: feedbeeffeedbeeffeedbeeffeedbeef\n",
        );

        let options = ScanOptions {
            project_type: Some(ProjectType::Unity),
            ..Default::default()
        };
        let scanner = ProjectScanner::new(Arc::new(ScanCache::new()), options);
        let outcome = scanner
            .scan(dir.path(), &CancelToken::new(), None)
            .unwrap();

        assert_eq!(
            outcome.result.assets[0].unity_guid.as_deref(),
            Some("feedbeeffeedbeeffeedbeeffeedbeef")
        );
        assert_eq!(
            outcome.result.project_type,
            Some(ProjectType::Unity)
        );
    }
}
