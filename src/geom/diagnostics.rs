//! Diagnostics collected while tessellating a surface.
//!
//! Every tessellation returns a [`MeshDiagnostics`] next to the mesh. A clean
//! run has no degenerate normals and no warnings:
//!
//! ```ignore
//! use cagd_engine::geom::TensorProductSurface;
//!
//! let (mesh, diagnostics) = patch.tessellate(16, 16)?;
//! if !diagnostics.is_clean() {
//!     for index in &diagnostics.degenerate_normal_vertices {
//!         eprintln!("no normal at vertex {index}");
//!     }
//! }
//! ```

use std::fmt;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshDiagnostics {
    /// Total number of vertices in the final mesh.
    pub vertex_count: usize,

    /// Total number of triangles in the final mesh.
    pub triangle_count: usize,

    /// Number of vertices whose `∂S/∂u × ∂S/∂v` vanished.
    ///
    /// These vertices carry a zero normal in the mesh.
    pub degenerate_normal_count: usize,

    /// Mesh indices of the vertices counted in `degenerate_normal_count`, ascending.
    pub degenerate_normal_vertices: Vec<usize>,

    /// Human-readable warnings about the run.
    pub warnings: Vec<String>,
}

impl MeshDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no degenerate normals and no warnings were recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.degenerate_normal_count == 0 && self.warnings.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn record_degenerate_normal(&mut self, vertex: usize) {
        self.degenerate_normal_count += 1;
        self.degenerate_normal_vertices.push(vertex);
    }

    /// Merges another diagnostics struct into this one.
    ///
    /// Counts are summed and warnings appended. Vertex indices from `other` are
    /// shifted by this struct's `vertex_count` so they stay valid for meshes
    /// appended in the same order.
    pub fn merge(&mut self, other: &MeshDiagnostics) {
        let offset = self.vertex_count;
        self.vertex_count += other.vertex_count;
        self.triangle_count += other.triangle_count;
        self.degenerate_normal_count += other.degenerate_normal_count;
        self.degenerate_normal_vertices
            .extend(other.degenerate_normal_vertices.iter().map(|i| i + offset));
        self.warnings.extend(other.warnings.iter().cloned());
    }

    /// Returns a short summary string suitable for logging.
    ///
    /// Format: `"V:{vertices} T:{triangles} [issues...]"`
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("V:{} T:{}", self.vertex_count, self.triangle_count)];
        if self.degenerate_normal_count > 0 {
            parts.push(format!("degenerate-normals:{}", self.degenerate_normal_count));
        }
        if !self.warnings.is_empty() {
            parts.push(format!("warnings:{}", self.warnings.len()));
        }
        parts.join(" ")
    }
}

impl fmt::Display for MeshDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mesh Diagnostics:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;

        if self.degenerate_normal_count > 0 {
            writeln!(f, "  Degenerate normals: {}", self.degenerate_normal_count)?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }

        let status = if self.is_clean() { "CLEAN" } else { "ISSUES DETECTED" };
        writeln!(f, "  Status: {status}")
    }
}
