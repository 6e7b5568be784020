//! Mesh metadata extraction for glTF/GLB and OBJ.
//!
//! Counts are exact topological counts (every primitive's vertices and
//! indexed triangles), not deduplicated-vertex counts.

use std::path::Path;

use super::ExtractError;
use crate::models::AssetMetadata;

pub fn read_gltf(path: &Path) -> Result<AssetMetadata, ExtractError> {
    let gltf = gltf::Gltf::open(path).map_err(|e| ExtractError::Mesh(e.to_string()))?;

    let mut vertex_count = 0u32;
    let mut face_count = 0u32;

    for mesh in gltf.meshes() {
        for primitive in mesh.primitives() {
            if let Some(accessor) = primitive.get(&gltf::Semantic::Positions) {
                vertex_count += accessor.count() as u32;
            }
            if let Some(indices) = primitive.indices() {
                face_count += (indices.count() / 3) as u32;
            }
        }
    }

    Ok(AssetMetadata {
        vertex_count: Some(vertex_count),
        face_count: Some(face_count),
        material_count: Some(gltf.materials().count() as u32),
        ..Default::default()
    })
}

pub fn read_obj(path: &Path) -> Result<AssetMetadata, ExtractError> {
    let (models, _materials) =
        tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|e| ExtractError::Mesh(e.to_string()))?;

    let mut vertex_count = 0u32;
    let mut face_count = 0u32;

    for model in &models {
        vertex_count += (model.mesh.positions.len() / 3) as u32;
        face_count += (model.mesh.indices.len() / 3) as u32;
    }

    Ok(AssetMetadata {
        vertex_count: Some(vertex_count),
        face_count: Some(face_count),
        material_count: Some(models.len() as u32),
        ..Default::default()
    })
}
