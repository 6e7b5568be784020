//! Per-asset-type metadata extraction.
//!
//! Dispatch is a static lower-cased extension table: classification
//! never fails (unknown extensions are `Other` with no metadata), and
//! extraction failures degrade the asset instead of aborting the scan.

pub mod audio;
pub mod image;
pub mod mesh;
pub mod unity;

use std::path::Path;

use crate::models::{AssetMetadata, AssetType};

/// Typed extraction failure. Recorded in scan stats for observability,
/// never propagated through the scan's success path.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unreadable image header: {0}")]
    Image(String),

    #[error("unreadable mesh data: {0}")]
    Mesh(String),

    #[error("unreadable audio stream: {0}")]
    Audio(String),
}

impl ExtractError {
    pub fn io(source: std::io::Error, path: &Path) -> Self {
        Self::Io {
            path: path.to_string_lossy().to_string(),
            source,
        }
    }
}

/// Map a file extension to its asset type. Case-insensitive; anything
/// unrecognized is `Other`.
pub fn classify_extension(extension: &str) -> AssetType {
    match extension.to_lowercase().as_str() {
        // Textures
        "png" | "jpg" | "jpeg" | "tga" | "psd" | "tiff" | "tif" | "exr" | "hdr" | "webp"
        | "dds" | "bmp" | "gif" => AssetType::Texture,
        // Models
        "fbx" | "obj" | "gltf" | "glb" | "blend" | "dae" | "3ds" | "max" => AssetType::Model,
        // Audio
        "wav" | "mp3" | "ogg" | "flac" | "aiff" | "aac" | "wma" => AssetType::Audio,
        // Unity specific
        "prefab" => AssetType::Prefab,
        "unity" => AssetType::Scene,
        "mat" => AssetType::Material,
        "controller" | "anim" => AssetType::Animation,
        "cs" | "js" => AssetType::Script,
        "asset" | "json" | "xml" | "yaml" | "csv" => AssetType::Data,
        // Other
        _ => AssetType::Other,
    }
}

/// Run the extractor matching the asset type. `Ok(None)` means the
/// type carries no parseable metadata for this extension (e.g. a
/// proprietary model format we only classify).
pub fn extract_metadata(
    path: &Path,
    asset_type: AssetType,
    extension: &str,
) -> Result<Option<AssetMetadata>, ExtractError> {
    let ext = extension.to_lowercase();
    match asset_type {
        AssetType::Texture => match ext.as_str() {
            "png" | "jpg" | "jpeg" | "bmp" | "gif" | "tga" | "tiff" | "tif" | "webp" => {
                image::read_image_header(path).map(Some)
            }
            _ => Ok(None),
        },
        AssetType::Model => match ext.as_str() {
            "gltf" | "glb" => mesh::read_gltf(path).map(Some),
            "obj" => mesh::read_obj(path).map(Some),
            _ => Ok(None),
        },
        AssetType::Audio => match ext.as_str() {
            "wav" | "mp3" | "ogg" | "flac" | "aiff" => audio::probe_audio(path).map(Some),
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_extensions() {
        assert_eq!(classify_extension("png"), AssetType::Texture);
        assert_eq!(classify_extension("PNG"), AssetType::Texture);
        assert_eq!(classify_extension("fbx"), AssetType::Model);
        assert_eq!(classify_extension("ogg"), AssetType::Audio);
        assert_eq!(classify_extension("prefab"), AssetType::Prefab);
        assert_eq!(classify_extension("unity"), AssetType::Scene);
        assert_eq!(classify_extension("mat"), AssetType::Material);
        assert_eq!(classify_extension("anim"), AssetType::Animation);
        assert_eq!(classify_extension("cs"), AssetType::Script);
        assert_eq!(classify_extension("json"), AssetType::Data);
    }

    #[test]
    fn test_classify_unknown_is_other() {
        assert_eq!(classify_extension("zzz"), AssetType::Other);
        assert_eq!(classify_extension(""), AssetType::Other);
    }

    #[test]
    fn test_unparseable_extension_yields_no_metadata() {
        // A .psd is classified as a texture but has no header extractor.
        let meta =
            extract_metadata(Path::new("/nonexistent/file.psd"), AssetType::Texture, "psd")
                .unwrap();
        assert!(meta.is_none());
    }

    #[test]
    fn test_other_type_yields_no_metadata() {
        let meta =
            extract_metadata(Path::new("/nonexistent/file.zzz"), AssetType::Other, "zzz").unwrap();
        assert!(meta.is_none());
    }
}
