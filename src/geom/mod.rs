mod basis;
mod core;
mod curve;
mod diagnostics;
mod interpolation;
mod linear_system;
mod matrix;
mod mesh;
mod surface;
mod tessellation;

pub use basis::{
    BlendingBasis, BlendingFamily, CubicBSplineBasis, CyclicBasis, EvaluationError,
};
pub use core::{LinearElement, Point3, Tolerance, Vec3};
pub use curve::{BlendingCurve, CurveError, Derivatives, SampledCurve};
pub use diagnostics::MeshDiagnostics;
pub use linear_system::{LuDecomposition, Orientation, RealSquareMatrix, SolveError};
pub use matrix::{ColumnMatrix, Matrix, MatrixError, RowMatrix, TriangularMatrix};
pub use mesh::TriangulatedMesh;
pub use surface::{Direction, PartialDerivatives, SurfaceError, TensorProductSurface};
pub use tessellation::{DegenerateNormalPolicy, TessellationOptions};

#[cfg(test)]
mod tests;
