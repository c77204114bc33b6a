//! Separable interpolation for tensor-product surfaces.
//!
//! With `Nu` the u collocation matrix (row `i` = u weights at `u_knots[i]`)
//! and `Nv` the v one, the surface through `data` at every knot pair has the
//! control grid `P` with `Nu · P · Nvᵗ = data`. That splits into two solves
//! with independent factorizations:
//!
//! 1. `Nu · A = data`, one system per column of `data`;
//! 2. `Nv · Pᵗ = Aᵗ`, one system per row of `A` ([`Orientation::Rows`]).

use super::basis::BlendingBasis;
use super::core::Point3;
use super::linear_system::{LuDecomposition, Orientation, RealSquareMatrix};
use super::matrix::{ColumnMatrix, Matrix, RowMatrix};
use super::surface::{Direction, SurfaceError, TensorProductSurface, check_shape};

/// Factors the collocation matrix of `basis` at `knots`.
fn factor_collocation<B: BlendingBasis>(
    basis: &B,
    direction: Direction,
    knots: impl Iterator<Item = f64>,
) -> Result<LuDecomposition, SurfaceError> {
    let mut collocation = RealSquareMatrix::try_new(basis.function_count())?;
    for (i, knot) in knots.enumerate() {
        let weights = basis
            .blending_weights(knot)
            .map_err(SurfaceError::in_direction(direction))?;
        collocation.set_row(i, &weights)?;
    }
    log::trace!("factoring {direction} collocation matrix");
    Ok(collocation.into_lu()?)
}

impl<U: BlendingBasis, V: BlendingBasis> TensorProductSurface<U, V> {
    /// Replaces the control grid so the surface passes through `data[i][j]`
    /// at `(u_knots[i], v_knots[j])`.
    ///
    /// Fails without touching the surface when a knot count or the data shape
    /// disagrees with the control grid, a knot lies outside its domain, or a
    /// collocation matrix is singular (for example, repeated knots).
    pub fn update_data_for_interpolation(
        &mut self,
        u_knots: &RowMatrix<f64>,
        v_knots: &ColumnMatrix<f64>,
        data: &Matrix<Point3>,
    ) -> Result<(), SurfaceError> {
        let rows = self.data.row_count();
        let columns = self.data.column_count();
        check_shape("u knot count", rows, u_knots.len())?;
        check_shape("v knot count", columns, v_knots.len())?;
        check_shape("data rows", rows, data.row_count())?;
        check_shape("data columns", columns, data.column_count())?;

        let u_lu = factor_collocation(&self.u_basis, Direction::U, u_knots.iter().copied())?;
        let v_lu = factor_collocation(&self.v_basis, Direction::V, v_knots.iter().copied())?;

        let intermediate = u_lu.solve(data, Orientation::Columns)?;
        log::debug!("interpolation: solved {columns} u systems");
        let control_points = v_lu.solve(&intermediate, Orientation::Rows)?;
        log::debug!("interpolation: solved {rows} v systems");

        self.data = control_points;
        Ok(())
    }
}
