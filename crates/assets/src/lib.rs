//! Asset pipeline: glTF import and background loading.
//!
//! Models are identified by a content hash of the source file, so the
//! renderer can cache GPU buffers per model without tracking file paths.
//!
//! # Invariants
//! - Import never panics on malformed input; every failure is an [`AssetError`].
//! - The loader thread never touches scene or physics state; results are
//!   handed back over a channel and consumed on the frame thread.

mod gltf_import;
mod loader;

pub use gltf_import::import_gltf;
pub use loader::{AssetLoader, PendingAsset};

use glam::Vec3;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Content-addressed asset ID computed from the asset data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u64);

impl AssetId {
    /// First eight bytes of the SHA-256 digest of `data`.
    pub fn from_bytes(data: &[u8]) -> Self {
        let result = Sha256::digest(data);
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&result[..8]);
        AssetId(u64::from_le_bytes(bytes))
    }
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("glTF parse error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("{0} contains no scene")]
    NoScene(PathBuf),
    #[error("{0} contains no triangle geometry")]
    NoGeometry(PathBuf),
    #[error("mesh {mesh} is missing the {attribute} attribute")]
    MissingAttribute { mesh: String, attribute: &'static str },
    #[error("loader for {0} stopped without a result")]
    Disconnected(PathBuf),
}

/// One triangle mesh with its transform already baked into the vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub base_color: [f32; 4],
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A fully imported model: every triangle primitive of the default scene.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    pub id: AssetId,
    pub name: String,
    pub meshes: Vec<MeshData>,
}

impl ModelData {
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.positions.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }

    /// Axis-aligned bounds in model space, `None` for an empty model.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self
            .meshes
            .iter()
            .flat_map(|m| m.positions.iter())
            .map(|p| Vec3::from_array(*p));
        let first = points.next()?;
        Some(points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Flattened triangle list, three positions per triangle, scaled uniformly.
    ///
    /// Feeds triangle-mesh colliders built from the visual geometry.
    pub fn triangle_soup(&self, scale: f32) -> Vec<Vec3> {
        self.meshes
            .iter()
            .flat_map(|m| {
                m.indices
                    .chunks_exact(3)
                    .flat_map(move |tri| tri.iter().map(move |&i| m.positions[i as usize]))
            })
            .map(|p| Vec3::from_array(p) * scale)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> ModelData {
        ModelData {
            id: AssetId(1),
            name: "quad".into(),
            meshes: vec![MeshData {
                name: "quad".into(),
                positions: vec![
                    [0.0, 0.0, 0.0],
                    [1.0, 0.0, 0.0],
                    [1.0, 1.0, 0.0],
                    [0.0, 1.0, 0.0],
                ],
                normals: vec![[0.0, 0.0, 1.0]; 4],
                indices: vec![0, 1, 2, 2, 3, 0],
                base_color: [1.0; 4],
            }],
        }
    }

    #[test]
    fn asset_id_is_content_addressed() {
        assert_eq!(AssetId::from_bytes(b"abc"), AssetId::from_bytes(b"abc"));
        assert_ne!(AssetId::from_bytes(b"abc"), AssetId::from_bytes(b"abd"));
    }

    #[test]
    fn counts_and_bounds() {
        let m = quad();
        assert_eq!(m.vertex_count(), 4);
        assert_eq!(m.triangle_count(), 2);
        let (lo, hi) = m.bounds().unwrap();
        assert_eq!(lo, Vec3::ZERO);
        assert_eq!(hi, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn triangle_soup_expands_indices_and_scales() {
        let soup = quad().triangle_soup(2.0);
        assert_eq!(soup.len(), 6);
        assert_eq!(soup[2], Vec3::new(2.0, 2.0, 0.0));
        assert_eq!(soup[5], Vec3::ZERO);
    }

    #[test]
    fn empty_model_has_no_bounds() {
        let m = ModelData {
            id: AssetId(0),
            name: "empty".into(),
            meshes: Vec::new(),
        };
        assert!(m.bounds().is_none());
        assert!(m.triangle_soup(1.0).is_empty());
    }
}
