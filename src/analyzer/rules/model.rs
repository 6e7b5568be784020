//! Mesh complexity checks.

use serde::{Deserialize, Serialize};

use super::{default_enabled, default_severity, Rule};
use crate::analyzer::{Issue, Severity};
use crate::models::{AssetRecord, AssetType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_severity")]
    pub severity: Severity,

    #[serde(default = "default_max_vertices")]
    pub max_vertices: u32,

    #[serde(default = "default_max_faces")]
    pub max_faces: u32,

    #[serde(default = "default_max_materials")]
    pub max_materials: u32,
}

fn default_max_vertices() -> u32 {
    100_000
}

fn default_max_faces() -> u32 {
    100_000
}

fn default_max_materials() -> u32 {
    10
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: Severity::Warning,
            max_vertices: 100_000,
            max_faces: 100_000,
            max_materials: 10,
        }
    }
}

pub struct ModelRule {
    config: ModelConfig,
}

impl ModelRule {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    fn issue(&self, asset: &AssetRecord, id: &str, name: &str, message: String) -> Issue {
        Issue {
            rule_id: format!("model.{}", id),
            rule_name: name.to_string(),
            severity: self.config.severity,
            message,
            asset_path: asset.path.clone(),
            suggestion: Some("Consider reducing complexity or using LODs".to_string()),
            auto_fixable: false,
        }
    }
}

impl Rule for ModelRule {
    fn id(&self) -> &str {
        "model"
    }

    fn name(&self) -> &str {
        "Model Standards"
    }

    fn applies_to(&self, asset: &AssetRecord) -> bool {
        asset.asset_type == AssetType::Model
    }

    fn check(&self, asset: &AssetRecord) -> Vec<Issue> {
        let Some(metadata) = asset.metadata.as_ref() else {
            return Vec::new();
        };
        let mut issues = Vec::new();

        if let Some(vertex_count) = metadata.vertex_count {
            if vertex_count > self.config.max_vertices {
                issues.push(self.issue(
                    asset,
                    "vertices",
                    "High Vertex Count",
                    format!(
                        "Model has {} vertices, maximum recommended is {}",
                        vertex_count, self.config.max_vertices
                    ),
                ));
            }
        }

        if let Some(face_count) = metadata.face_count {
            if face_count > self.config.max_faces {
                issues.push(self.issue(
                    asset,
                    "faces",
                    "High Face Count",
                    format!(
                        "Model has {} faces, maximum recommended is {}",
                        face_count, self.config.max_faces
                    ),
                ));
            }
        }

        if let Some(material_count) = metadata.material_count {
            if material_count > self.config.max_materials {
                let mut issue = self.issue(
                    asset,
                    "materials",
                    "Too Many Materials",
                    format!(
                        "Model has {} materials, maximum recommended is {}",
                        material_count, self.config.max_materials
                    ),
                );
                issue.suggestion =
                    Some("Consider combining materials to reduce draw calls".to_string());
                issues.push(issue);
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetMetadata;

    fn model(vertices: u32, faces: u32, materials: u32) -> AssetRecord {
        AssetRecord {
            path: "/proj/mesh.glb".to_string(),
            name: "mesh.glb".to_string(),
            extension: "glb".to_string(),
            asset_type: AssetType::Model,
            size: 4096,
            metadata: Some(AssetMetadata {
                vertex_count: Some(vertices),
                face_count: Some(faces),
                material_count: Some(materials),
                ..Default::default()
            }),
            unity_guid: None,
        }
    }

    #[test]
    fn test_within_budget_passes() {
        let rule = ModelRule::new(ModelConfig::default());
        assert!(rule.check(&model(5_000, 3_000, 2)).is_empty());
    }

    #[test]
    fn test_each_budget_flagged_independently() {
        let rule = ModelRule::new(ModelConfig::default());

        let issues = rule.check(&model(200_000, 3_000, 2));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, "model.vertices");

        let issues = rule.check(&model(5_000, 200_000, 2));
        assert_eq!(issues[0].rule_id, "model.faces");

        let issues = rule.check(&model(5_000, 3_000, 20));
        assert_eq!(issues[0].rule_id, "model.materials");
    }

    #[test]
    fn test_all_budgets_blown_gives_three_issues() {
        let rule = ModelRule::new(ModelConfig::default());
        assert_eq!(rule.check(&model(200_000, 200_000, 20)).len(), 3);
    }

    #[test]
    fn test_no_metadata_is_skipped() {
        let rule = ModelRule::new(ModelConfig::default());
        let mut asset = model(0, 0, 0);
        asset.metadata = None;
        assert!(rule.check(&asset).is_empty());
    }
}
