//! Audio format and duration checks.

use serde::{Deserialize, Serialize};

use super::{default_enabled, default_severity, Rule};
use crate::analyzer::{Issue, Severity};
use crate::models::{AssetRecord, AssetType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_severity")]
    pub severity: Severity,

    #[serde(default = "default_sample_rates")]
    pub allowed_sample_rates: Vec<u32>,

    /// Maximum duration for sound effects, in seconds.
    #[serde(default = "default_max_sfx_duration")]
    pub max_sfx_duration: f64,

    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    #[serde(default)]
    pub prefer_mono_for_sfx: bool,
}

fn default_sample_rates() -> Vec<u32> {
    vec![44100, 48000]
}

fn default_max_sfx_duration() -> f64 {
    30.0
}

fn default_max_file_size() -> u64 {
    20 * 1024 * 1024
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: Severity::Warning,
            allowed_sample_rates: vec![44100, 48000],
            max_sfx_duration: 30.0,
            max_file_size: 20 * 1024 * 1024,
            prefer_mono_for_sfx: false,
        }
    }
}

pub struct AudioRule {
    config: AudioConfig,
}

impl AudioRule {
    pub fn new(config: AudioConfig) -> Self {
        Self { config }
    }

    /// Name-based heuristic; there is no tag in the formats telling
    /// SFX apart from music.
    fn is_likely_sfx(asset: &AssetRecord) -> bool {
        let name = asset.name.to_lowercase();
        ["sfx", "sound", "effect", "hit", "click", "ui"]
            .iter()
            .any(|marker| name.contains(marker))
    }

    fn issue(&self, asset: &AssetRecord, id: &str, name: &str, message: String) -> Issue {
        Issue {
            rule_id: format!("audio.{}", id),
            rule_name: name.to_string(),
            severity: self.config.severity,
            message,
            asset_path: asset.path.clone(),
            suggestion: None,
            auto_fixable: false,
        }
    }
}

impl Rule for AudioRule {
    fn id(&self) -> &str {
        "audio"
    }

    fn name(&self) -> &str {
        "Audio Standards"
    }

    fn applies_to(&self, asset: &AssetRecord) -> bool {
        asset.asset_type == AssetType::Audio
    }

    fn check(&self, asset: &AssetRecord) -> Vec<Issue> {
        let mut issues = Vec::new();

        if let Some(metadata) = asset.metadata.as_ref() {
            if let Some(sample_rate) = metadata.sample_rate {
                if !self.config.allowed_sample_rates.contains(&sample_rate) {
                    let mut issue = self.issue(
                        asset,
                        "sample_rate",
                        "Non-Standard Sample Rate",
                        format!(
                            "Audio sample rate {} Hz is not in the allowed set {:?}",
                            sample_rate, self.config.allowed_sample_rates
                        ),
                    );
                    if let Some(preferred) = self.config.allowed_sample_rates.first() {
                        issue.suggestion = Some(format!("Consider resampling to {} Hz", preferred));
                    }
                    issues.push(issue);
                }
            }

            if let Some(duration) = metadata.duration_secs {
                if Self::is_likely_sfx(asset) && duration > self.config.max_sfx_duration {
                    issues.push(self.issue(
                        asset,
                        "sfx_duration",
                        "Long Sound Effect",
                        format!(
                            "Sound effect is {:.1}s long, maximum recommended is {:.0}s",
                            duration, self.config.max_sfx_duration
                        ),
                    ));
                }
            }

            if self.config.prefer_mono_for_sfx {
                if let Some(channels) = metadata.channels {
                    if Self::is_likely_sfx(asset) && channels > 1 {
                        let mut issue = self.issue(
                            asset,
                            "stereo_sfx",
                            "Stereo Sound Effect",
                            "Sound effect is stereo, mono is recommended for 3D audio".to_string(),
                        );
                        issue.suggestion =
                            Some("Convert to mono for better spatialization".to_string());
                        issues.push(issue);
                    }
                }
            }
        }

        if asset.size > self.config.max_file_size {
            let mut issue = self.issue(
                asset,
                "file_size",
                "Large Audio File",
                format!(
                    "Audio file size {:.2} MB exceeds maximum {:.2} MB",
                    asset.size as f64 / 1024.0 / 1024.0,
                    self.config.max_file_size as f64 / 1024.0 / 1024.0
                ),
            );
            issue.suggestion = Some("Consider a compressed format (OGG/MP3)".to_string());
            issues.push(issue);
        }

        issues
    }
}
