//! Audio metadata extraction via symphonia format probing.
//!
//! Duration comes from the track's time base when the container
//! provides one, falling back to frame count divided by sample rate.

use std::fs::File;
use std::path::Path;

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::ExtractError;
use crate::models::AssetMetadata;

pub fn probe_audio(path: &Path) -> Result<AssetMetadata, ExtractError> {
    let file = File::open(path).map_err(|e| ExtractError::io(e, path))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| ExtractError::Audio(e.to_string()))?;

    let format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| ExtractError::Audio("no default track".to_string()))?;
    let params = &track.codec_params;

    let sample_rate = params.sample_rate;
    let channels = params.channels.map(|c| c.count() as u32);
    let bit_depth = params.bits_per_sample;

    let duration_secs = match (params.time_base, params.n_frames) {
        (Some(time_base), Some(n_frames)) => {
            let time = time_base.calc_time(n_frames);
            Some(time.seconds as f64 + time.frac)
        }
        _ => match (params.n_frames, params.sample_rate) {
            (Some(n_frames), Some(rate)) if rate > 0 => Some(n_frames as f64 / rate as f64),
            _ => None,
        },
    };

    Ok(AssetMetadata {
        duration_secs,
        sample_rate,
        channels,
        bit_depth,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_garbage_is_audio_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("noise.wav");
        std::fs::write(&path, b"definitely not riff data").unwrap();

        let err = probe_audio(&path).unwrap_err();
        assert!(matches!(err, ExtractError::Audio(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = probe_audio(&dir.path().join("missing.wav")).unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }
}
