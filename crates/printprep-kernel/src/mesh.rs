//! Triangle meshes for export.
//!
//! Boundary faces are convex, so each one is fan-triangulated from its
//! first vertex. Vertices are duplicated per face to keep flat normals.

use crate::solid::Solid;

/// Output triangle mesh for export.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]` (f32).
    pub vertices: Vec<f32>,
    /// Flat array of triangle indices: `[i0, i1, i2, ...]` (u32).
    pub indices: Vec<u32>,
    /// Flat array of vertex normals: `[nx0, ny0, nz0, ...]` (f32). Same length as vertices.
    pub normals: Vec<f32>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            normals: Vec::new(),
        }
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Merge another mesh into this one.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|&i| i + offset));
    }

    /// Triangle `i` as three vertex positions.
    pub fn triangle(&self, i: usize) -> [[f32; 3]; 3] {
        let corner = |k: usize| {
            let v = self.indices[3 * i + k] as usize;
            [self.vertices[3 * v], self.vertices[3 * v + 1], self.vertices[3 * v + 2]]
        };
        [corner(0), corner(1), corner(2)]
    }

    /// Normal stored at the first corner of triangle `i`.
    pub fn triangle_normal(&self, i: usize) -> [f32; 3] {
        let v = self.indices[3 * i] as usize;
        [self.normals[3 * v], self.normals[3 * v + 1], self.normals[3 * v + 2]]
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Solid {
    /// Triangulate the boundary of the solid.
    pub fn to_mesh(&self) -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        for face in self.face_fragments() {
            let base = mesh.num_vertices() as u32;
            let n = face.raw_normal();
            for p in face.vertices() {
                mesh.vertices.extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
                mesh.normals.extend_from_slice(&[n.x as f32, n.y as f32, n.z as f32]);
            }
            for k in 1..face.vertices().len() as u32 - 1 {
                mesh.indices.extend_from_slice(&[base, base + k, base + k + 1]);
            }
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printprep_math::{Point3, Vec3};

    #[test]
    fn test_cube_mesh_has_twelve_triangles() {
        let cube = Solid::cuboid(Point3::origin(), Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let mesh = cube.to_mesh();
        assert_eq!(mesh.num_triangles(), 12);
        assert_eq!(mesh.num_vertices(), 24);
        assert_eq!(mesh.normals.len(), mesh.vertices.len());
    }

    #[test]
    fn test_merge_offsets_indices() {
        let cube = Solid::cuboid(Point3::origin(), Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let mut a = cube.to_mesh();
        let b = cube.translated(2.0, 0.0, 0.0).to_mesh();
        a.merge(&b);
        assert_eq!(a.num_triangles(), 24);
        assert_eq!(a.indices[36], 24);
        let t = a.triangle(12);
        assert!(t.iter().all(|v| v[0] >= 2.0));
    }
}
