//! Rule engine.
//!
//! Evaluation is parallel over assets but the output is deterministic:
//! issues are sorted by severity, then asset path, then rule id before
//! counts are taken, so repeated runs over the same inputs compare
//! equal regardless of worker scheduling.

pub mod rules;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::dupes::DuplicateIndex;
use crate::models::AssetRecord;
use rules::{Rule, RuleConfig};

/// Ordered most to least severe; the sort order of issue lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub rule_id: String,
    pub rule_name: String,
    pub severity: Severity,
    pub message: String,
    pub asset_path: String,
    pub suggestion: Option<String>,
    pub auto_fixable: bool,
}

/// Issues plus aggregate counts. Counts are derived exclusively via
/// `add_issue`, so they always match the list exactly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub issues: Vec<Issue>,
    pub issue_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub by_rule: HashMap<String, usize>,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issue(&mut self, issue: Issue) {
        match issue.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Info => self.info_count += 1,
        }
        *self.by_rule.entry(issue.rule_id.clone()).or_insert(0) += 1;
        self.issue_count += 1;
        self.issues.push(issue);
    }
}

pub struct Analyzer {
    rules: Vec<Box<dyn Rule>>,
    config: RuleConfig,
}

impl Analyzer {
    /// Build the rule set from config; disabled categories are not
    /// registered at all.
    pub fn with_config(config: RuleConfig) -> Self {
        let mut rules: Vec<Box<dyn Rule>> = Vec::new();

        if config.naming.enabled {
            rules.push(Box::new(rules::naming::NamingRule::new(
                config.naming.clone(),
            )));
        }
        if config.texture.enabled {
            rules.push(Box::new(rules::texture::TextureRule::new(
                config.texture.clone(),
            )));
        }
        if config.model.enabled {
            rules.push(Box::new(rules::model::ModelRule::new(config.model.clone())));
        }
        if config.audio.enabled {
            rules.push(Box::new(rules::audio::AudioRule::new(config.audio.clone())));
        }

        Self { rules, config }
    }

    /// Evaluate every registered rule against every asset. Duplicate
    /// issues come from the prebuilt index when one is supplied and
    /// the category is enabled.
    pub fn analyze(
        &self,
        assets: &[AssetRecord],
        duplicates: Option<&DuplicateIndex>,
    ) -> AnalysisResult {
        let mut issues: Vec<Issue> = assets
            .par_iter()
            .flat_map_iter(|asset| {
                self.rules
                    .iter()
                    .filter(|rule| rule.applies_to(asset))
                    .flat_map(|rule| rule.check(asset))
                    .collect::<Vec<_>>()
            })
            .collect();

        if self.config.duplicate.enabled {
            if let Some(index) = duplicates {
                issues.extend(rules::duplicate::check_duplicates(
                    index,
                    &self.config.duplicate,
                ));
            }
        }

        issues.sort_by(|a, b| {
            a.severity
                .cmp(&b.severity)
                .then_with(|| a.asset_path.cmp(&b.asset_path))
                .then_with(|| a.rule_id.cmp(&b.rule_id))
        });

        let mut result = AnalysisResult::new();
        for issue in issues {
            result.add_issue(issue);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetMetadata, AssetType};

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
                ..Default::default()
            }),
            unity_guid: None,
        }
    }

    #[test]
    fn test_pot_scenario_exactly_one_issue() {
        let assets = vec![texture("ok.png", 512, 512), texture("odd.png", 500, 500)];
        let analyzer = Analyzer::with_config(RuleConfig::default());
        let result = analyzer.analyze(&assets, None);

        assert_eq!(result.issue_count, 1);
        assert_eq!(result.warning_count, 1);
        assert_eq!(result.issues[0].rule_id, "texture.pot");
        assert_eq!(result.issues[0].asset_path, "/proj/odd.png");
    }

    #[test]
    fn test_counts_match_issue_list() {
        let mut config = RuleConfig::default();
        config.naming.severity = Severity::Error;
        let assets = vec![texture("bad name.png", 500, 500)];

        let result = Analyzer::with_config(config).analyze(&assets, None);
        assert_eq!(result.issue_count, result.issues.len());
        assert_eq!(
            result.error_count + result.warning_count + result.info_count,
            result.issue_count
        );
        assert_eq!(result.by_rule.values().sum::<usize>(), result.issue_count);
        // Errors sort before warnings.
        assert_eq!(result.issues[0].severity, Severity::Error);
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let assets: Vec<AssetRecord> = (0..50)
            .map(|i| texture(&format!("tex{:02}.png", i), 500, 500))
            .collect();

        let analyzer = Analyzer::with_config(RuleConfig::default());
        let first = analyzer.analyze(&assets, None);
        let second = analyzer.analyze(&assets, None);
        assert_eq!(first.issues, second.issues);
    }

    #[test]
    fn test_disabled_category_not_evaluated() {
        let mut config = RuleConfig::default();
        config.texture.enabled = false;
        let assets = vec![texture("odd.png", 500, 500)];

        let result = Analyzer::with_config(config).analyze(&assets, None);
        assert_eq!(result.issue_count, 0);
    }
}
