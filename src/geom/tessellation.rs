//! Uniform-grid tessellation of tensor-product surfaces.
//!
//! A `u_divisions x v_divisions` grid of parameters covering both domains
//! (ends included) becomes one vertex each; vertex `(i, j)` lands at mesh index
//! `i * v_divisions + j` with texture coordinate
//! `(i / (u_divisions - 1), j / (v_divisions - 1))`. Every grid cell yields two
//! triangles split along the diagonal from `(i, j)` to `(i + 1, j + 1)`, wound
//! so their face normals agree with `∂S/∂u × ∂S/∂v`.
//!
//! ```ignore
//! use cagd_engine::geom::{DegenerateNormalPolicy, TessellationOptions};
//!
//! let options = TessellationOptions::default()
//!     .with_degenerate_normals(DegenerateNormalPolicy::Fail);
//! let (mesh, _) = surface.tessellate_with_options(32, 32, &options)?;
//! ```

use super::basis::{BlendingBasis, uniform_parameters};
use super::core::Tolerance;
use super::diagnostics::MeshDiagnostics;
use super::mesh::TriangulatedMesh;
use super::surface::{SurfaceError, TensorProductSurface, unit_normal};

/// What to do with a grid vertex whose normal cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegenerateNormalPolicy {
    /// Store a zero normal and list the vertex in the diagnostics.
    #[default]
    Report,
    /// Abort with [`SurfaceError::DegenerateNormal`].
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessellationOptions {
    pub degenerate_normals: DegenerateNormalPolicy,
    /// Normals whose unnormalized length is within this tolerance count as degenerate.
    pub tolerance: Tolerance,
}

impl Default for TessellationOptions {
    fn default() -> Self {
        Self {
            degenerate_normals: DegenerateNormalPolicy::default(),
            tolerance: Tolerance::ZERO_LENGTH,
        }
    }
}

impl TessellationOptions {
    #[must_use]
    pub fn with_degenerate_normals(mut self, policy: DegenerateNormalPolicy) -> Self {
        self.degenerate_normals = policy;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl<U: BlendingBasis, V: BlendingBasis> TensorProductSurface<U, V> {
    pub fn tessellate(
        &self,
        u_divisions: usize,
        v_divisions: usize,
    ) -> Result<(TriangulatedMesh, MeshDiagnostics), SurfaceError> {
        self.tessellate_with_options(u_divisions, v_divisions, &TessellationOptions::default())
    }

    pub fn tessellate_with_options(
        &self,
        u_divisions: usize,
        v_divisions: usize,
        options: &TessellationOptions,
    ) -> Result<(TriangulatedMesh, MeshDiagnostics), SurfaceError> {
        for count in [u_divisions, v_divisions] {
            if count < 2 {
                return Err(SurfaceError::InvalidDivisionCount(count));
            }
        }
        let vertex_count = u_divisions.saturating_mul(v_divisions);
        if u32::try_from(vertex_count).is_err() {
            return Err(SurfaceError::MeshTooLarge { vertex_count });
        }
        let face_count = 2 * (u_divisions - 1) * (v_divisions - 1);

        let (u_min, u_max) = self.domain_u();
        let (v_min, v_max) = self.domain_v();
        let us = uniform_parameters(u_min, u_max, u_divisions);
        let vs = uniform_parameters(v_min, v_max, v_divisions);
        let s_scale = 1.0 / (u_divisions - 1) as f64;
        let t_scale = 1.0 / (v_divisions - 1) as f64;

        let mut mesh = TriangulatedMesh::with_capacity(vertex_count, face_count);
        let mut diagnostics = MeshDiagnostics::new();

        for (i, &u) in us.iter().enumerate() {
            for (j, &v) in vs.iter().enumerate() {
                let pd = self.partial_derivatives(1, u, v)?;
                let normal = match unit_normal(&pd, options.tolerance) {
                    Some(n) => n.to_array(),
                    None => match options.degenerate_normals {
                        DegenerateNormalPolicy::Fail => {
                            return Err(SurfaceError::DegenerateNormal {
                                u_index: i,
                                v_index: j,
                            });
                        }
                        DegenerateNormalPolicy::Report => {
                            diagnostics.record_degenerate_normal(i * v_divisions + j);
                            [0.0; 3]
                        }
                    },
                };
                mesh.positions.push(pd.point().to_array());
                mesh.normals.push(normal);
                mesh.tex_coords.push([i as f64 * s_scale, j as f64 * t_scale]);
            }
        }

        for i in 0..u_divisions - 1 {
            for j in 0..v_divisions - 1 {
                let bottom_left = (i * v_divisions + j) as u32;
                let bottom_right = ((i + 1) * v_divisions + j) as u32;
                let top_right = bottom_right + 1;
                let top_left = bottom_left + 1;
                mesh.faces.push([bottom_left, bottom_right, top_right]);
                mesh.faces.push([bottom_left, top_right, top_left]);
            }
        }

        diagnostics.vertex_count = mesh.vertex_count();
        diagnostics.triangle_count = mesh.face_count();
        if diagnostics.degenerate_normal_count > 0 {
            log::warn!(
                "tessellation: {} of {} vertices have a degenerate normal",
                diagnostics.degenerate_normal_count,
                vertex_count
            );
            diagnostics.add_warning(format!(
                "{} vertices have a degenerate normal",
                diagnostics.degenerate_normal_count
            ));
        }
        log::debug!("tessellation: {}", diagnostics.summary());

        Ok((mesh, diagnostics))
    }
}
