//! Rule trait and configuration.
//!
//! Every rule category carries its own `enabled` flag and severity.
//! Severity is never hard-coded in a rule; issues inherit the
//! category's configured level (warning unless overridden).

pub mod audio;
pub mod duplicate;
pub mod model;
pub mod naming;
pub mod texture;

use serde::{Deserialize, Serialize};

use crate::analyzer::{Issue, Severity};
use crate::models::AssetRecord;

/// A single rule category. `check` returns every finding for the
/// asset; an asset missing the metadata a check needs is skipped for
/// that check, never flagged.
pub trait Rule: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn applies_to(&self, asset: &AssetRecord) -> bool;

    fn check(&self, asset: &AssetRecord) -> Vec<Issue>;
}

pub(crate) fn default_enabled() -> bool {
    true
}

pub(crate) fn default_severity() -> Severity {
    Severity::Warning
}

/// Duplicate detection has no per-asset thresholds, just a toggle and
/// a severity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_severity")]
    pub severity: Severity,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: Severity::Warning,
        }
    }
}

/// Configuration for all rule categories, one section each.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default)]
    pub naming: naming::NamingConfig,
    #[serde(default)]
    pub texture: texture::TextureConfig,
    #[serde(default)]
    pub model: model::ModelConfig,
    #[serde(default)]
    pub audio: audio::AudioConfig,
    #[serde(default)]
    pub duplicate: DuplicateConfig,
}

impl RuleConfig {
    /// Parse a TOML config, falling back to defaults per section: a
    /// malformed `[texture]` block must not take `[naming]` down with
    /// it. Only syntactically invalid TOML is fatal. Returns the
    /// config plus one warning message per section that fell back.
    pub fn from_toml_lenient(content: &str) -> Result<(Self, Vec<String>), toml::de::Error> {
        let table: toml::Table = content.parse()?;
        let mut config = Self::default();
        let mut warnings = Vec::new();

        fn section<T: serde::de::DeserializeOwned + Default>(
            table: &toml::Table,
            key: &str,
            slot: &mut T,
            warnings: &mut Vec<String>,
        ) {
            if let Some(value) = table.get(key) {
                match value.clone().try_into() {
                    Ok(parsed) => *slot = parsed,
                    Err(e) => warnings.push(format!("ignoring invalid [{}] section: {}", key, e)),
                }
            }
        }

        section(&table, "naming", &mut config.naming, &mut warnings);
        section(&table, "texture", &mut config.texture, &mut warnings);
        section(&table, "model", &mut config.model, &mut warnings);
        section(&table, "audio", &mut config.audio, &mut warnings);
        section(&table, "duplicate", &mut config.duplicate, &mut warnings);

        Ok((config, warnings))
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
