//! Ribbon mesh buffers.
//!
//! Each centerline point becomes one cross-section of four vertices:
//!
//! ```text
//! Front: 2  6    Back: 3  7
//!        x  x          x  x
//!        0  4          1  5
//! ```
//!
//! Even slots (top, bottom) belong to the front face, odd slots to the back
//! face. Both faces share positions but carry opposite normals and opposite
//! winding, so either side renders lit and outward facing.

use vstroke_math::{normalize_or_zero, Point3, Vec3};

/// A double-sided quad strip following a polyline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RibbonMesh {
    vertices: Vec<Point3>,
    normals: Vec<Vec3>,
    front: Vec<u32>,
    back: Vec<u32>,
}

impl RibbonMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Vertex positions, four per cross-section.
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Vertex normals, parallel to [`vertices`](Self::vertices).
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Triangle indices of the front submesh.
    pub fn front_indices(&self) -> &[u32] {
        &self.front
    }

    /// Triangle indices of the back submesh.
    pub fn back_indices(&self) -> &[u32] {
        &self.back
    }

    /// Number of cross-sections.
    pub fn cross_section_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Whether the mesh has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of triangles across both submeshes.
    pub fn num_triangles(&self) -> usize {
        (self.front.len() + self.back.len()) / 3
    }

    /// Append the cross-section for centerline point `pos`.
    ///
    /// `previous` is the centerline point of the cross-section before it,
    /// if any. Without one the direction falls back to `pos` itself; that
    /// guess is replaced as soon as the second cross-section arrives.
    pub(crate) fn append_section(
        &mut self,
        pos: &Point3,
        up: &Vec3,
        half_width: f64,
        previous: Option<&Point3>,
    ) {
        let normal = section_normal(pos, up, previous);
        let offset = up * half_width;
        self.vertices.extend_from_slice(&[pos + offset, pos + offset, pos - offset, pos - offset]);
        self.normals.extend_from_slice(&[normal, -normal, normal, -normal]);

        let count = self.cross_section_count();
        if count == 2 {
            self.set_normals(0, &normal);
        }
        if count > 1 {
            self.connect_last();
        }
    }

    /// Overwrite the positions and normals of cross-section `section`.
    pub(crate) fn set_section(&mut self, section: usize, pos: &Point3, up: &Vec3, half_width: f64, normal: &Vec3) {
        let offset = up * half_width;
        let base = section * 4;
        self.vertices[base] = pos + offset;
        self.vertices[base + 1] = pos + offset;
        self.vertices[base + 2] = pos - offset;
        self.vertices[base + 3] = pos - offset;
        self.set_normals(section, normal);
    }

    fn set_normals(&mut self, section: usize, normal: &Vec3) {
        let base = section * 4;
        self.normals[base] = *normal;
        self.normals[base + 1] = -normal;
        self.normals[base + 2] = *normal;
        self.normals[base + 3] = -normal;
    }

    /// Two front and two back triangles between the last two cross-sections.
    fn connect_last(&mut self) {
        let i = (self.cross_section_count() * 4) as u32;
        self.front.extend_from_slice(&[i - 8, i - 4, i - 6, i - 6, i - 4, i - 2]);
        self.back.extend_from_slice(&[i - 7, i - 5, i - 3, i - 5, i - 1, i - 3]);
    }

    /// Flatten into a single-precision triangle list (front triangles first).
    pub fn to_triangle_mesh(&self) -> TriangleMesh {
        let mut mesh = TriangleMesh::default();
        mesh.append(self);
        mesh
    }
}

/// Unit normal of the cross-section at `pos`: `up × direction`.
pub(crate) fn section_normal(pos: &Point3, up: &Vec3, previous: Option<&Point3>) -> Vec3 {
    let dir = match previous {
        Some(prev) => normalize_or_zero(&(pos - prev)),
        None => normalize_or_zero(&pos.coords),
    };
    normalize_or_zero(&up.cross(&dir))
}

/// Both faces of one or more ribbons as a single f32 triangle list.
///
/// Ribbons are appended whole, so every triangle of a stroke stays next to
/// the rest of that stroke and back faces follow their front faces.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals, parallel to `positions`.
    pub normals: Vec<[f32; 3]>,
    /// Counter-clockwise vertex triples.
    pub triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Number of triangles, both faces counted.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Append every cross-section and triangle of `ribbon`.
    pub fn append(&mut self, ribbon: &RibbonMesh) {
        let base = self.positions.len() as u32;
        self.positions
            .extend(ribbon.vertices.iter().map(|p| [p.x as f32, p.y as f32, p.z as f32]));
        self.normals
            .extend(ribbon.normals.iter().map(|n| [n.x as f32, n.y as f32, n.z as f32]));
        for face in [&ribbon.front, &ribbon.back] {
            self.triangles
                .extend(face.chunks_exact(3).map(|t| [t[0] + base, t[1] + base, t[2] + base]));
        }
    }
}

impl<'a> FromIterator<&'a RibbonMesh> for TriangleMesh {
    fn from_iter<I: IntoIterator<Item = &'a RibbonMesh>>(iter: I) -> Self {
        let mut mesh = Self::default();
        for ribbon in iter {
            mesh.append(ribbon);
        }
        mesh
    }
}
