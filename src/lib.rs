//! Curator: incremental asset scanner and convention checker for game
//! projects.
//!
//! The pipeline: [`scanner::ProjectScanner`] walks a project tree,
//! consults the [`cache::ScanCache`] per file and runs the format
//! extractors in parallel for anything new or changed. The resulting
//! flat asset list feeds the directory-tree aggregation, the
//! [`dupes::DuplicateIndex`] and the [`analyzer::Analyzer`] rule
//! engine. Long-running operations take a [`cancel::CancelToken`] and
//! stop cooperatively.

pub mod analyzer;
pub mod cache;
pub mod cancel;
pub mod cli;
pub mod dupes;
pub mod errors;
pub mod extract;
pub mod hashing;
pub mod models;
pub mod project;
pub mod scanner;
pub mod ui;

pub use analyzer::{AnalysisResult, Analyzer, Issue, Severity};
pub use cancel::CancelToken;
pub use errors::{CuratorError, CuratorResult};
pub use models::{AssetRecord, AssetType, ScanPhase, ScanProgress, ScanResult};
pub use scanner::{ProjectScanner, ScanOptions, ScanOutcome};
