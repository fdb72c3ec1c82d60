//! Binary STL export of stroke meshes.

use std::fs;
use std::path::Path;

use nalgebra::Vector3;
use vstroke_ribbon::{RibbonMesh, TriangleMesh};

use crate::error::Result;

const STL_HEADER: &[u8; 80] =
    b"vstroke STL export                                                              ";

/// Merge ribbons into one triangle mesh, front and back faces included.
pub fn combine<'a>(meshes: impl IntoIterator<Item = &'a RibbonMesh>) -> TriangleMesh {
    meshes.into_iter().collect()
}

/// Encode `mesh` as binary STL.
///
/// Facet normals come from the winding; degenerate triangles get `+Z`.
pub fn stl_bytes(mesh: &TriangleMesh) -> Vec<u8> {
    let num_triangles = mesh.triangle_count();
    let mut data = Vec::with_capacity(84 + num_triangles * 50);
    data.extend_from_slice(STL_HEADER);
    data.extend_from_slice(&(num_triangles as u32).to_le_bytes());

    let vertex = |i: u32| Vector3::from(mesh.positions[i as usize]);

    for &[a, b, c] in &mesh.triangles {
        let [v0, v1, v2] = [vertex(a), vertex(b), vertex(c)];
        let normal = (v1 - v0)
            .cross(&(v2 - v0))
            .try_normalize(1e-10)
            .unwrap_or_else(Vector3::z);

        for v in [normal, v0, v1, v2] {
            data.extend_from_slice(&v.x.to_le_bytes());
            data.extend_from_slice(&v.y.to_le_bytes());
            data.extend_from_slice(&v.z.to_le_bytes());
        }
        // attribute byte count
        data.extend_from_slice(&0u16.to_le_bytes());
    }

    data
}

/// Write ribbons to a binary STL file.
pub fn write_stl<'a>(path: impl AsRef<Path>, meshes: impl IntoIterator<Item = &'a RibbonMesh>) -> Result<()> {
    let path = path.as_ref();
    let mesh = combine(meshes);
    fs::write(path, stl_bytes(&mesh))?;
    log::info!("wrote {} triangles to {}", mesh.triangle_count(), path.display());
    Ok(())
}
