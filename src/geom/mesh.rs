use serde::{Deserialize, Serialize};

use super::{Point3, Vec3};

/// Triangle mesh handed to the presentation layer.
///
/// Every vertex has exactly one position, normal and texture coordinate, all
/// stored in the same order. Faces index into those buffers and wind
/// counter-clockwise when viewed from the side the normals point to.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TriangulatedMesh {
    pub positions: Vec<[f64; 3]>,
    pub normals: Vec<[f64; 3]>,
    pub tex_coords: Vec<[f64; 2]>,
    pub faces: Vec<[u32; 3]>,
}

impl TriangulatedMesh {
    /// Creates a mesh with room for `vertex_count` vertices and `face_count` faces.
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count),
            normals: Vec::with_capacity(vertex_count),
            tex_coords: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn position(&self, index: usize) -> Option<Point3> {
        self.positions.get(index).copied().map(Point3::from_array)
    }

    #[must_use]
    pub fn normal(&self, index: usize) -> Option<Vec3> {
        self.normals.get(index).copied().map(Vec3::from_array)
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions.iter().any(|p| {
            !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite()
        })
    }

    /// Returns true if all face indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len();
        self.faces
            .iter()
            .flatten()
            .all(|&i| usize::try_from(i).is_ok_and(|i| i < n))
    }

    /// Returns true if the normal and texture buffers match `positions.len()`.
    #[must_use]
    pub fn has_valid_attribute_lengths(&self) -> bool {
        let n = self.positions.len();
        self.normals.len() == n && self.tex_coords.len() == n
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.has_invalid_vertices() {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        if !self.has_valid_attribute_lengths() {
            return Err("mesh attribute buffers do not match vertex count".to_string());
        }
        Ok(())
    }

    /// Returns the position buffer as a flat slice: `[x0, y0, z0, x1, y1, z1, ...]`.
    ///
    /// This is a zero-copy view over `positions`, ready for buffer upload.
    #[must_use]
    pub fn positions_flat(&self) -> &[f64] {
        flatten_array_slice::<f64, 3>(&self.positions)
    }

    /// Returns the normal buffer as a flat slice: `[nx0, ny0, nz0, nx1, ny1, nz1, ...]`.
    #[must_use]
    pub fn normals_flat(&self) -> &[f64] {
        flatten_array_slice::<f64, 3>(&self.normals)
    }

    /// Returns the texture coordinate buffer as a flat slice: `[s0, t0, s1, t1, ...]`.
    #[must_use]
    pub fn tex_coords_flat(&self) -> &[f64] {
        flatten_array_slice::<f64, 2>(&self.tex_coords)
    }

    /// Returns the face list as a flat triangle index buffer.
    #[must_use]
    pub fn indices_flat(&self) -> &[u32] {
        flatten_array_slice::<u32, 3>(&self.faces)
    }
}

fn flatten_array_slice<T, const N: usize>(data: &[[T; N]]) -> &[T] {
    data.as_flattened()
}
