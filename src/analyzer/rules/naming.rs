//! Filename convention checks.

use serde::{Deserialize, Serialize};

use super::{default_enabled, default_severity, Rule};
use crate::analyzer::{Issue, Severity};
use crate::models::{AssetRecord, AssetType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_severity")]
    pub severity: Severity,

    /// Characters not allowed anywhere in a file name.
    #[serde(default = "default_forbidden_chars")]
    pub forbidden_chars: Vec<char>,

    /// Flag CJK ideographs in file names.
    #[serde(default = "default_forbid_cjk")]
    pub forbid_cjk: bool,

    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Required prefixes per asset type, e.g. `T_` for textures.
    #[serde(default)]
    pub texture_prefix: Option<String>,
    #[serde(default)]
    pub model_prefix: Option<String>,
    #[serde(default)]
    pub audio_prefix: Option<String>,

    /// "PascalCase", "snake_case", "camelCase" or "any".
    #[serde(default = "default_case_style")]
    pub case_style: String,
}

fn default_forbidden_chars() -> Vec<char> {
    vec![' ', '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '+', '=']
}

fn default_forbid_cjk() -> bool {
    true
}

fn default_max_length() -> usize {
    64
}

fn default_case_style() -> String {
    "any".to_string()
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: Severity::Warning,
            forbidden_chars: default_forbidden_chars(),
            forbid_cjk: true,
            max_length: 64,
            texture_prefix: None,
            model_prefix: None,
            audio_prefix: None,
            case_style: "any".to_string(),
        }
    }
}

pub struct NamingRule {
    config: NamingConfig,
}

impl NamingRule {
    pub fn new(config: NamingConfig) -> Self {
        Self { config }
    }

    fn required_prefix(&self, asset_type: AssetType) -> Option<&String> {
        match asset_type {
            AssetType::Texture => self.config.texture_prefix.as_ref(),
            AssetType::Model => self.config.model_prefix.as_ref(),
            AssetType::Audio => self.config.audio_prefix.as_ref(),
            _ => None,
        }
    }

    fn matches_case_style(&self, stem: &str) -> bool {
        match self.config.case_style.as_str() {
            "PascalCase" => is_pascal_case(stem),
            "snake_case" => is_snake_case(stem),
            "camelCase" => is_camel_case(stem),
            _ => true,
        }
    }

    fn issue(&self, asset: &AssetRecord, id: &str, name: &str, message: String) -> Issue {
        Issue {
            rule_id: format!("naming.{}", id),
            rule_name: name.to_string(),
            severity: self.config.severity,
            message,
            asset_path: asset.path.clone(),
            suggestion: None,
            auto_fixable: false,
        }
    }
}

impl Rule for NamingRule {
    fn id(&self) -> &str {
        "naming"
    }

    fn name(&self) -> &str {
        "Naming Convention"
    }

    fn applies_to(&self, _asset: &AssetRecord) -> bool {
        true
    }

    fn check(&self, asset: &AssetRecord) -> Vec<Issue> {
        let name = &asset.name;
        let stem = name.rsplit_once('.').map(|(n, _)| n).unwrap_or(name);
        let mut issues = Vec::new();

        if name.chars().count() > self.config.max_length {
            issues.push(self.issue(
                asset,
                "length",
                "Name Too Long",
                format!(
                    "File name is {} characters, max allowed is {}",
                    name.chars().count(),
                    self.config.max_length
                ),
            ));
        }

        if let Some(c) = name
            .chars()
            .find(|c| self.config.forbidden_chars.contains(c))
        {
            let mut issue = self.issue(
                asset,
                "forbidden_char",
                "Forbidden Character",
                format!("File name contains forbidden character '{}'", c),
            );
            issue.suggestion = Some(format!("Remove '{}' from the file name", c));
            issue.auto_fixable = true;
            issues.push(issue);
        }

        if self.config.forbid_cjk && name.chars().any(is_cjk) {
            issues.push(self.issue(
                asset,
                "cjk",
                "CJK Characters",
                "File name contains CJK characters".to_string(),
            ));
        }

        if let Some(prefix) = self.required_prefix(asset.asset_type) {
            if !name.starts_with(prefix.as_str()) {
                let mut issue = self.issue(
                    asset,
                    "prefix",
                    "Missing Prefix",
                    format!("File name should start with '{}'", prefix),
                );
                issue.suggestion = Some(format!("Rename to {}{}", prefix, name));
                issue.auto_fixable = true;
                issues.push(issue);
            }
        }

        if !self.matches_case_style(stem) {
            issues.push(self.issue(
                asset,
                "case",
                "Naming Case",
                format!(
                    "File name does not follow {} convention",
                    self.config.case_style
                ),
            ));
        }

        issues
    }
}

fn is_cjk(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2A6DF).contains(&code)
}

fn is_pascal_case(s: &str) -> bool {
    match s.chars().next() {
        None => true,
        Some(first) => {
            first.is_uppercase() && !s.contains('_') && !s.chars().all(|c| c.is_uppercase())
        }
    }
}

fn is_snake_case(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_lowercase() || c.is_numeric() || c == '_')
}

fn is_camel_case(s: &str) -> bool {
    match s.chars().next() {
        None => true,
        Some(first) => first.is_lowercase() && !s.contains('_'),
    }
}
