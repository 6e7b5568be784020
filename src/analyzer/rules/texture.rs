//! Texture dimension and size checks.

use serde::{Deserialize, Serialize};

use super::{default_enabled, default_severity, Rule};
use crate::analyzer::{Issue, Severity};
use crate::models::{AssetRecord, AssetType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_severity")]
    pub severity: Severity,

    /// Require power-of-two width and height.
    #[serde(default = "default_require_pot")]
    pub require_pot: bool,

    /// Maximum width or height in pixels.
    #[serde(default = "default_max_size")]
    pub max_size: u32,

    #[serde(default = "default_min_size")]
    pub min_size: u32,

    #[serde(default)]
    pub warn_non_square: bool,

    /// Maximum file size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_require_pot() -> bool {
    true
}

fn default_max_size() -> u32 {
    4096
}

fn default_min_size() -> u32 {
    4
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: Severity::Warning,
            require_pot: true,
            max_size: 4096,
            min_size: 4,
            warn_non_square: false,
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

pub struct TextureRule {
    config: TextureConfig,
}

impl TextureRule {
    pub fn new(config: TextureConfig) -> Self {
        Self { config }
    }

    fn is_power_of_two(n: u32) -> bool {
        n > 0 && (n & (n - 1)) == 0
    }

    fn issue(&self, asset: &AssetRecord, id: &str, name: &str, message: String) -> Issue {
        Issue {
            rule_id: format!("texture.{}", id),
            rule_name: name.to_string(),
            severity: self.config.severity,
            message,
            asset_path: asset.path.clone(),
            suggestion: None,
            auto_fixable: false,
        }
    }
}

impl Rule for TextureRule {
    fn id(&self) -> &str {
        "texture"
    }

    fn name(&self) -> &str {
        "Texture Standards"
    }

    fn applies_to(&self, asset: &AssetRecord) -> bool {
        asset.asset_type == AssetType::Texture
    }

    fn check(&self, asset: &AssetRecord) -> Vec<Issue> {
        let mut issues = Vec::new();

        // Dimension checks need decoded headers; without them the
        // asset is skipped, not flagged.
        if let Some(metadata) = asset.metadata.as_ref() {
            if let (Some(width), Some(height)) = (metadata.width, metadata.height) {
                if self.config.require_pot
                    && (!Self::is_power_of_two(width) || !Self::is_power_of_two(height))
                {
                    let mut issue = self.issue(
                        asset,
                        "pot",
                        "Non-POT Texture",
                        format!("Texture dimensions {}x{} are not power of two", width, height),
                    );
                    issue.suggestion = Some(format!(
                        "Resize to {}x{}",
                        width.next_power_of_two(),
                        height.next_power_of_two()
                    ));
                    issues.push(issue);
                }

                if width > self.config.max_size || height > self.config.max_size {
                    issues.push(self.issue(
                        asset,
                        "max_size",
                        "Texture Too Large",
                        format!(
                            "Texture {}x{} exceeds maximum size {}",
                            width, height, self.config.max_size
                        ),
                    ));
                }

                if width < self.config.min_size || height < self.config.min_size {
                    issues.push(self.issue(
                        asset,
                        "min_size",
                        "Texture Too Small",
                        format!(
                            "Texture {}x{} is smaller than minimum size {}",
                            width, height, self.config.min_size
                        ),
                    ));
                }

                if self.config.warn_non_square && width != height {
                    issues.push(self.issue(
                        asset,
                        "non_square",
                        "Non-Square Texture",
                        format!("Texture {}x{} is not square", width, height),
                    ));
                }
            }
        }

        if asset.size > self.config.max_file_size {
            let mut issue = self.issue(
                asset,
                "file_size",
                "Large File Size",
                format!(
                    "Texture file size {:.2} MB exceeds maximum {:.2} MB",
                    asset.size as f64 / 1024.0 / 1024.0,
                    self.config.max_file_size as f64 / 1024.0 / 1024.0
                ),
            );
            issue.suggestion = Some("Consider compressing or reducing resolution".to_string());
            issues.push(issue);
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetMetadata;

    fn texture(name: &str, width: u32, height: u32) -> AssetRecord {
        AssetRecord {
            path: format!("/proj/{}", name),
            name: name.to_string(),
            extension: "png".to_string(),
            asset_type: AssetType::Texture,
            size: 1024,
            metadata: Some(AssetMetadata {
                width: Some(width),
                height: Some(height),
                has_alpha: Some(false),
                ..Default::default()
            }),
            unity_guid: None,
        }
    }

    #[test]
    fn test_pot_passes_non_pot_flagged() {
        let rule = TextureRule::new(TextureConfig::default());
        assert!(rule.check(&texture("ok.png", 512, 512)).is_empty());

        let issues = rule.check(&texture("odd.png", 500, 500));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, "texture.pot");
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].suggestion.as_deref(), Some("Resize to 512x512"));
    }

    #[test]
    fn test_pot_check_disabled() {
        let config = TextureConfig {
            require_pot: false,
            ..Default::default()
        };
        let rule = TextureRule::new(config);
        assert!(rule.check(&texture("odd.png", 500, 500)).is_empty());
    }

    #[test]
    fn test_oversized_texture() {
        let rule = TextureRule::new(TextureConfig::default());
        let issues = rule.check(&texture("huge.png", 8192, 8192));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, "texture.max_size");
    }

    #[test]
    fn test_undersized_texture() {
        let rule = TextureRule::new(TextureConfig::default());
        let issues = rule.check(&texture("tiny.png", 2, 2));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, "texture.min_size");
    }

    #[test]
    fn test_non_square_only_when_enabled() {
        let rule = TextureRule::new(TextureConfig::default());
        assert!(rule.check(&texture("wide.png", 1024, 512)).is_empty());

        let config = TextureConfig {
            warn_non_square: true,
            ..Default::default()
        };
        let rule = TextureRule::new(config);
        let issues = rule.check(&texture("wide.png", 1024, 512));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, "texture.non_square");
    }

    #[test]
    fn test_missing_metadata_is_skipped() {
        let rule = TextureRule::new(TextureConfig::default());
        let mut asset = texture("broken.png", 1, 1);
        asset.metadata = None;
        assert!(rule.check(&asset).is_empty());
    }

    #[test]
    fn test_file_size_checked_without_dimensions() {
        let config = TextureConfig {
            max_file_size: 512,
            ..Default::default()
        };
        let rule = TextureRule::new(config);
        let mut asset = texture("fat.png", 1, 1);
        asset.metadata = None;
        asset.size = 1024;
        let issues = rule.check(&asset);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, "texture.file_size");
    }
}
