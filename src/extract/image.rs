//! Image header extraction.
//!
//! Dimensions and alpha presence come from the container header via
//! the decoder, without decoding pixel data.

use image::{ImageDecoder, ImageReader};
use std::path::Path;

use super::ExtractError;
use crate::models::AssetMetadata;

pub fn read_image_header(path: &Path) -> Result<AssetMetadata, ExtractError> {
    let reader = ImageReader::open(path)
        .map_err(|e| ExtractError::io(e, path))?
        .with_guessed_format()
        .map_err(|e| ExtractError::io(e, path))?;

    let decoder = reader
        .into_decoder()
        .map_err(|e| ExtractError::Image(e.to_string()))?;

    let (width, height) = decoder.dimensions();
    let has_alpha = decoder.color_type().has_alpha();

    Ok(AssetMetadata {
        width: Some(width),
        height: Some(height),
        has_alpha: Some(has_alpha),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_truncated_file_is_image_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png at all").unwrap();

        let err = read_image_header(&path).unwrap_err();
        assert!(matches!(err, ExtractError::Image(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_image_header(&dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }
}
