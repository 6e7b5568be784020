//! Issues from the duplicate index.
//!
//! Every member of a group gets its own issue naming the sibling
//! copies; there is no privileged "original", so no member is exempt.

use super::DuplicateConfig;
use crate::analyzer::Issue;
use crate::dupes::DuplicateIndex;

pub fn check_duplicates(index: &DuplicateIndex, config: &DuplicateConfig) -> Vec<Issue> {
    let mut issues = Vec::new();

    for group in index.groups() {
        for path in &group.paths {
            let siblings: Vec<&str> = group
                .paths
                .iter()
                .filter(|p| *p != path)
                .map(String::as_str)
                .collect();

            issues.push(Issue {
                rule_id: "duplicate".to_string(),
                rule_name: "Duplicate File".to_string(),
                severity: config.severity,
                message: format!(
                    "File content is identical to {} other file(s)",
                    siblings.len()
                ),
                asset_path: path.clone(),
                suggestion: Some(format!(
                    "Byte-identical copies: {}. Keep one and reference it instead.",
                    siblings.join(", ")
                )),
                auto_fixable: false,
            });
        }
    }

    issues
}
