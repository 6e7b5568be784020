//! Core data model shared by the scanner, the cache and the rule
//! engine. Everything here is serde-serializable so scan results can
//! be persisted and shipped to consumers as JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single inventoried file. Identity is the absolute path, unique
/// within one scan. Immutable once the scan that produced it finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub path: String,
    pub name: String,
    pub extension: String,
    pub asset_type: AssetType,
    pub size: u64,
    pub metadata: Option<AssetMetadata>,
    pub unity_guid: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Texture,
    Model,
    Audio,
    Animation,
    Material,
    Prefab,
    Scene,
    Script,
    Data,
    Other,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Texture => "texture",
            AssetType::Model => "model",
            AssetType::Audio => "audio",
            AssetType::Animation => "animation",
            AssetType::Material => "material",
            AssetType::Prefab => "prefab",
            AssetType::Scene => "scene",
            AssetType::Script => "script",
            AssetType::Data => "data",
            AssetType::Other => "other",
        }
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific metadata extracted from container headers. One flat
/// struct with optional fields per family, mirroring how the cache
/// snapshots it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    // Image metadata
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub has_alpha: Option<bool>,
    // Mesh metadata
    pub vertex_count: Option<u32>,
    pub face_count: Option<u32>,
    pub material_count: Option<u32>,
    // Audio metadata
    pub duration_secs: Option<f64>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u32>,
    pub bit_depth: Option<u32>,
}

/// Directory tree node. Aggregates are recursive: a node's counts
/// equal the sum of its children's plus its own direct files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryNode {
    pub name: String,
    pub path: String,
    pub children: Vec<DirectoryNode>,
    pub file_count: usize,
    pub total_size: u64,
}

/// Project classification consumed from the detector and threaded
/// through the scan unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Unity,
    Unreal,
    Godot,
    Generic,
}

/// Scanner state machine phases. `Cancelled` is terminal and reachable
/// from any non-terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPhase {
    Idle,
    Discovering,
    Extracting,
    Aggregating,
    Completed,
    Cancelled,
}

/// One progress event. `total` stays `None` while discovery is in
/// flight and becomes fixed once the file list is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    pub phase: ScanPhase,
    pub current: usize,
    pub total: Option<usize>,
    pub current_file: String,
}

/// A recorded per-file extraction failure. Retained for observability
/// only; failures degrade the asset to "typed, no metadata" and are
/// never surfaced as rule issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractFailure {
    pub path: String,
    pub reason: String,
}

/// Bookkeeping for one scan pass: cache effectiveness, skipped files
/// and extraction failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanStats {
    pub started_at: String,
    pub duration_seconds: f64,
    pub total_files: usize,
    pub cached_files: usize,
    pub rescanned_files: usize,
    pub skipped_files: usize,
    pub extract_failure_count: usize,
    pub extract_failures: Vec<ExtractFailure>,
}

/// The product of one completed scan. Superseded wholesale by the next
/// scan; never merged partially.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub root_path: String,
    pub directory_tree: DirectoryNode,
    pub assets: Vec<AssetRecord>,
    pub total_count: usize,
    pub total_size: u64,
    pub type_counts: HashMap<String, usize>,
    pub project_type: Option<ProjectType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_type_serializes_lowercase() {
        let json = serde_json::to_string(&AssetType::Texture).unwrap();
        assert_eq!(json, "\"texture\"");
    }

    #[test]
    fn test_metadata_defaults_empty() {
        let meta = AssetMetadata::default();
        assert!(meta.width.is_none());
        assert!(meta.duration_secs.is_none());
    }
}
