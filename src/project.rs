//! Project-type detection from marker files.
//!
//! The scan core only threads the classification through; this helper
//! exists for callers (the CLI) that have no other detector to ask.

use std::fs;
use std::path::Path;

use crate::models::ProjectType;

pub fn detect_project_type(root: &Path) -> Option<ProjectType> {
    // Unity: ProjectSettings folder, or an Assets folder with .meta companions
    if root.join("ProjectSettings").is_dir()
        || (root.join("Assets").is_dir() && root.join("Assets").join("Editor.meta").exists())
    {
        return Some(ProjectType::Unity);
    }

    // Unreal: any .uproject file at the root
    if fs::read_dir(root).ok()?.filter_map(|e| e.ok()).any(|e| {
        e.path()
            .extension()
            .map(|ext| ext == "uproject")
            .unwrap_or(false)
    }) {
        return Some(ProjectType::Unreal);
    }

    // Godot: project.godot file
    if root.join("project.godot").exists() {
        return Some(ProjectType::Godot);
    }

    Some(ProjectType::Generic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unity_marker() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("ProjectSettings")).unwrap();
        assert_eq!(detect_project_type(dir.path()), Some(ProjectType::Unity));
    }

    #[test]
    fn test_unreal_marker() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Game.uproject"), b"{}").unwrap();
        assert_eq!(detect_project_type(dir.path()), Some(ProjectType::Unreal));
    }

    #[test]
    fn test_godot_marker() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("project.godot"), b"").unwrap();
        assert_eq!(detect_project_type(dir.path()), Some(ProjectType::Godot));
    }

    #[test]
    fn test_plain_directory_is_generic() {
        let dir = TempDir::new().unwrap();
        assert_eq!(detect_project_type(dir.path()), Some(ProjectType::Generic));
    }
}
