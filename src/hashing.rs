//! Content-addressed hashing.
//!
//! A single SHA-256 digest identifies file content for duplicate
//! grouping and the persisted cache. Files are streamed in fixed
//! chunks so large assets never load wholly into memory.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::cancel::CancelToken;

const CHUNK_SIZE: usize = 64 * 1024;

/// Hex-encoded SHA-256 digest of a file's bytes. Deterministic across
/// platforms and runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash a file's full content, checking the cancellation token between
/// chunks. Returns `Ok(None)` when cancellation was observed mid-file;
/// with no token the result is always `Some`. I/O errors propagate so
/// the caller decides whether to skip the asset or abort.
pub fn hash_file(
    path: &Path,
    cancel: Option<&CancelToken>,
) -> std::io::Result<Option<ContentHash>> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(CHUNK_SIZE, file);
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Ok(None);
            }
        }
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(Some(ContentHash(hex::encode(hasher.finalize()))))
}
