use std::path::Path;

use crate::{
    data_structures::geometry::{Geometry, GeometryMaterial, SubMesh, Vertex},
    error::LoadError,
};

/// Produces a [`Geometry`] blob from an asset path.
pub trait GeometryLoader {
    fn load_geometry(&self, path: &Path) -> Result<Geometry, LoadError>;
}

/// Wavefront OBJ files (with their MTL libraries) through `tobj`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjLoader;

impl GeometryLoader for ObjLoader {
    fn load_geometry(&self, path: &Path) -> Result<Geometry, LoadError> {
        let (models, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| LoadError::Obj {
            path: path.to_path_buf(),
            source,
        })?;

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("Materials of {} could not be loaded: {}", path.display(), e);
            Vec::new()
        });

        Ok(to_geometry(&models, &materials))
    }
}

fn to_geometry(models: &[tobj::Model], materials: &[tobj::Material]) -> Geometry {
    let mut geometry = Geometry {
        materials: materials.iter().map(to_material).collect(),
        ..Default::default()
    };

    for m in models {
        let base = geometry.vertices.len() as u32;
        let vertex_count = m.mesh.positions.len() / 3;
        geometry.vertices.extend((0..vertex_count).map(|i| Vertex {
            position: [
                m.mesh.positions[i * 3],
                m.mesh.positions[i * 3 + 1],
                m.mesh.positions[i * 3 + 2],
            ],
            normal: [
                m.mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                m.mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                m.mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
            ],
            // OBJ has v pointing up, wgpu samples with v pointing down.
            tex_coords: [
                m.mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                1.0 - m.mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
            ],
        }));

        geometry.meshes.push(SubMesh {
            index_offset: geometry.indices.len() as u32,
            index_count: m.mesh.indices.len() as u32,
            material: m.mesh.material_id.filter(|&id| id < materials.len()),
        });
        geometry
            .indices
            .extend(m.mesh.indices.iter().map(|index| base + index));
    }

    geometry
}

fn to_material(m: &tobj::Material) -> GeometryMaterial {
    let fallback = [0.5, 0.5, 0.5];
    GeometryMaterial {
        ambient: m.ambient.unwrap_or(fallback),
        diffuse: m.diffuse.unwrap_or(fallback),
        specular: m.specular.unwrap_or(fallback),
        shininess: m.shininess.unwrap_or(1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUADS: &str = "\
mtllib quads.mtl
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 1
vn 0 0 1
o first
usemtl red
f 1/1/1 2/1/1 3/2/1 4/2/1
o second
f 1/1/1 3/2/1 4/2/1
";

    const MTL: &str = "\
newmtl red
Ka 0.1 0 0
Kd 1 0 0
Ks 0.2 0.2 0.2
Ns 8
";

    fn write_fixture() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("orrery-obj-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("quads.obj"), QUADS).unwrap();
        std::fs::write(dir.join("quads.mtl"), MTL).unwrap();
        dir
    }

    #[test]
    fn objects_become_sub_meshes_over_one_vertex_array() {
        let dir = write_fixture();
        let geometry = ObjLoader.load_geometry(&dir.join("quads.obj")).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(geometry.meshes.len(), 2);
        let (first, second) = (geometry.meshes[0], geometry.meshes[1]);
        assert_eq!(first.index_offset, 0);
        assert_eq!(first.index_count, 6);
        assert_eq!(second.index_offset, 6);
        assert_eq!(second.index_count, 3);
        assert_eq!(first.material, Some(0));

        let vertices = geometry.vertices.len() as u32;
        assert!(geometry.indices.iter().all(|&i| i < vertices));
        assert_eq!(geometry.materials[0].diffuse, [1.0, 0.0, 0.0]);
        assert_eq!(geometry.materials[0].shininess, 8.0);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let result = ObjLoader.load_geometry(Path::new("no/such/file.obj"));
        assert!(matches!(result, Err(LoadError::Obj { .. })));
    }
}
