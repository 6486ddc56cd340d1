use crate::{AssetError, AssetId, MeshData, ModelData};
use glam::{Mat3, Mat4, Vec3};
use gltf::mesh::Mode;
use std::path::Path;

const DEFAULT_BASE_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

/// Import a `.gltf` or `.glb` file.
///
/// Walks the default scene (or the first one), bakes each node's world
/// transform into its vertices and keeps every triangle-list primitive.
/// Missing normals are generated from the triangles. Textures are not read;
/// only the base color factor of each material is kept.
pub fn import_gltf(path: impl AsRef<Path>) -> Result<ModelData, AssetError> {
    let path = path.as_ref();
    let _span = tracing::info_span!("import_gltf", path = %path.display()).entered();

    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let id = AssetId::from_bytes(&bytes);

    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(&bytes)?;
    let buffers = gltf::import_buffers(&document, path.parent(), blob)?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::NoScene(path.to_path_buf()))?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        visit_node(&node, Mat4::IDENTITY, &buffers, &mut meshes)?;
    }

    if meshes.is_empty() {
        return Err(AssetError::NoGeometry(path.to_path_buf()));
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".into());

    let model = ModelData { id, name, meshes };
    tracing::info!(
        id = model.id.0,
        meshes = model.meshes.len(),
        triangles = model.triangle_count(),
        "glTF imported"
    );
    Ok(model)
}

fn visit_node(
    node: &gltf::Node<'_>,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<MeshData>,
) -> Result<(), AssetError> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let mesh_name = mesh
            .name()
            .or(node.name())
            .unwrap_or("unnamed")
            .to_string();

        for (i, primitive) in mesh.primitives().enumerate() {
            if primitive.mode() != Mode::Triangles {
                tracing::debug!(
                    mesh = %mesh_name,
                    mode = ?primitive.mode(),
                    "skipping non-triangle primitive"
                );
                continue;
            }
            out.push(read_primitive(
                &primitive,
                format!("{mesh_name}_{i}"),
                world,
                buffers,
            )?);
        }
    }

    for child in node.children() {
        visit_node(&child, world, buffers, out)?;
    }
    Ok(())
}

fn read_primitive(
    primitive: &gltf::Primitive<'_>,
    name: String,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
) -> Result<MeshData, AssetError> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| AssetError::MissingAttribute {
            mesh: name.clone(),
            attribute: "POSITION",
        })?
        .map(|p| world.transform_point3(Vec3::from_array(p)).to_array())
        .collect();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    let vertex_count = positions.len();
    let indices: Vec<u32> = indices
        .chunks_exact(3)
        .filter(|tri| tri.iter().all(|&i| (i as usize) < vertex_count))
        .flatten()
        .copied()
        .collect();

    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
    let normals: Vec<[f32; 3]> = match reader.read_normals() {
        Some(normals) => normals
            .map(|n| {
                (normal_matrix * Vec3::from_array(n))
                    .normalize_or_zero()
                    .to_array()
            })
            .collect(),
        None => generate_normals(&positions, &indices),
    };

    let base_color = primitive
        .material()
        .pbr_metallic_roughness()
        .base_color_factor();

    Ok(MeshData {
        name,
        positions,
        normals,
        indices,
        base_color: if base_color.iter().all(|c| c.is_finite()) {
            base_color
        } else {
            DEFAULT_BASE_COLOR
        },
    })
}

/// Area-weighted smooth normals.
fn generate_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = Vec3::from_array(positions[a]);
        let pb = Vec3::from_array(positions[b]);
        let pc = Vec3::from_array(positions[c]);
        let n = (pb - pa).cross(pc - pa);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            let n = if n == Vec3::ZERO { Vec3::Y } else { n };
            n.to_array()
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// One triangle, lifted 2 units by its node, orange material.
    pub(crate) const TRIANGLE_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [ { "nodes": [0] } ],
  "nodes": [ { "name": "root", "mesh": 0, "translation": [0.0, 2.0, 0.0] } ],
  "meshes": [ { "name": "tri", "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 } ] } ],
  "materials": [ { "name": "orange", "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.5, 0.0, 1.0] } } ],
  "buffers": [ { "byteLength": 44, "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAA=" } ],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
    { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
  ]
}"#;

    pub(crate) fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".gltf").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn imports_triangle_with_baked_transform() {
        let file = write_fixture(TRIANGLE_GLTF);
        let model = import_gltf(file.path()).unwrap();

        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert_eq!(mesh.name, "tri_0");
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.positions[0], [0.0, 2.0, 0.0]);
        assert_eq!(mesh.positions[2], [0.0, 3.0, 0.0]);
        assert_eq!(mesh.base_color, [1.0, 0.5, 0.0, 1.0]);
        // Counter-clockwise in the XY plane faces +Z.
        for n in &mesh.normals {
            assert!((Vec3::from_array(*n) - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn same_file_same_id() {
        let a = write_fixture(TRIANGLE_GLTF);
        let b = write_fixture(TRIANGLE_GLTF);
        assert_eq!(import_gltf(a.path()).unwrap().id, import_gltf(b.path()).unwrap().id);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = import_gltf("definitely/not/here.glb").unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn garbage_is_parse_error() {
        let file = write_fixture("this is not gltf");
        assert!(matches!(
            import_gltf(file.path()),
            Err(AssetError::Gltf(_))
        ));
    }

    #[test]
    fn scene_without_meshes_has_no_geometry() {
        let file = write_fixture(
            r#"{ "asset": { "version": "2.0" }, "scenes": [ { "nodes": [0] } ], "nodes": [ { "name": "empty" } ] }"#,
        );
        assert!(matches!(
            import_gltf(file.path()),
            Err(AssetError::NoGeometry(_))
        ));
    }

    #[test]
    fn generated_normals_are_unit_length() {
        let normals = generate_normals(
            &[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
            &[0, 1, 2],
        );
        for n in normals {
            assert!((Vec3::from_array(n) - Vec3::Y).length() < 1e-5);
        }
    }
}
