//! Top-level error types for Curator.
//!
//! The scanner and the extractors carry their own error enums
//! (`ScanError`, `ExtractError`); this module provides the umbrella
//! type the binary reports from, plus the shared result alias.

use std::path::PathBuf;

use crate::scanner::ScanError;

/// The main error type for Curator operations.
#[derive(Debug, thiserror::Error)]
pub enum CuratorError {
    /// I/O error (file read/write, permissions, etc.)
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// Scan failure (root inaccessible, cancelled, ...)
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Rule configuration file is not parseable TOML at all
    #[error("Invalid rule configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Rule configuration could not be rendered back to TOML
    #[error("Could not render configuration: {0}")]
    ConfigRender(#[from] toml::ser::Error),

    /// Regex compilation error for exclude patterns
    #[error("Invalid exclude pattern '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// JSON serialization error when writing reports
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Tokio task join error
    #[error("Async task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Result type alias using CuratorError
pub type CuratorResult<T> = Result<T, CuratorError>;

impl CuratorError {
    /// Create an I/O error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a regex error with pattern context
    pub fn regex(source: regex::Error, pattern: impl Into<String>) -> Self {
        Self::Regex {
            pattern: pattern.into(),
            source,
        }
    }
}

/// Convert from raw I/O errors (without path context)
impl From<std::io::Error> for CuratorError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { path: None, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = CuratorError::io(
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            Some(PathBuf::from("/test/path")),
        );
        assert!(err.to_string().contains("/test/path"));
    }

    #[test]
    fn test_scan_error_passthrough() {
        let err: CuratorError = ScanError::RootNotFound("/missing".to_string()).into();
        assert!(err.to_string().contains("/missing"));
    }
}
