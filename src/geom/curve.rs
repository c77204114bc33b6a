use serde::{Deserialize, Serialize};

use super::basis::{BlendingBasis, BlendingFamily, EvaluationError, uniform_parameters};
use super::core::{Point3, Vec3};
use super::linear_system::{Orientation, RealSquareMatrix, SolveError};
use super::matrix::{ColumnMatrix, Matrix, MatrixError, RowMatrix};

/// Errors raised by blending curves.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error("{what} has {found} entries, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("division point count must be at least 2, got {0}")]
    InvalidDivisionCount(usize),
    #[error(transparent)]
    Solve(#[from] SolveError),
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

impl CurveError {
    #[must_use]
    pub fn is_domain_violation(&self) -> bool {
        matches!(self, Self::Evaluation(EvaluationError::DomainViolation { .. }))
    }
}

/// Derivative vectors of a curve at one parameter, entry `r` being the `r`-th derivative.
///
/// Entry 0 is the curve point, stored as its position vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivatives(ColumnMatrix<Vec3>);

impl Derivatives {
    #[must_use]
    pub fn get(&self, order: usize) -> Option<Vec3> {
        self.0.get(order).ok().copied()
    }

    #[must_use]
    pub fn position(&self) -> Point3 {
        self.get(0).unwrap_or_default().to_point3()
    }

    #[must_use]
    pub fn max_order(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    #[must_use]
    pub fn as_column(&self) -> &ColumnMatrix<Vec3> {
        &self.0
    }
}

/// A curve sampled at uniformly spaced parameters.
///
/// `derivatives[r][s]` is the `r`-th derivative at `parameters[s]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SampledCurve {
    pub parameters: Vec<f64>,
    pub derivatives: Vec<Vec<Vec3>>,
}

impl SampledCurve {
    fn with_orders(parameters: Vec<f64>, max_order: usize) -> Result<Self, MatrixError> {
        let count = parameters.len();
        let order_count = max_order + 1;
        let mut derivatives = Vec::new();
        derivatives
            .try_reserve_exact(order_count)
            .map_err(|_| MatrixError::Allocation {
                row_count: order_count,
                column_count: count,
            })?;
        derivatives.resize_with(order_count, || Vec::with_capacity(count));
        Ok(Self {
            parameters,
            derivatives,
        })
    }

    fn push(&mut self, derivatives: &Derivatives) {
        for (r, samples) in self.derivatives.iter_mut().enumerate() {
            samples.push(derivatives.get(r).unwrap_or_default());
        }
    }

    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub fn max_order(&self) -> usize {
        self.derivatives.len().saturating_sub(1)
    }

    #[must_use]
    pub fn positions(&self) -> Vec<Point3> {
        self.derivative(0)
            .map(|d| d.iter().map(|v| v.to_point3()).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn derivative(&self, order: usize) -> Option<&[Vec3]> {
        self.derivatives.get(order).map(Vec::as_slice)
    }
}

/// A curve `C(u) = Σ w_i(u) P_i` over one blending family.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendingCurve<B: BlendingBasis = BlendingFamily> {
    basis: B,
    data: ColumnMatrix<Point3>,
}

impl BlendingCurve<BlendingFamily> {
    /// Cyclic curve of order `n`; needs `2n + 1` control points.
    pub fn cyclic(order: usize, control_points: Vec<Point3>) -> Result<Self, CurveError> {
        Self::new(BlendingFamily::cyclic(order)?, control_points)
    }

    /// Single uniform cubic B-spline arc over four control points.
    pub fn cubic_bspline_arc(control_points: [Point3; 4]) -> Result<Self, CurveError> {
        Self::new(BlendingFamily::cubic_bspline(), control_points.to_vec())
    }
}

impl<B: BlendingBasis> BlendingCurve<B> {
    pub fn new(basis: B, control_points: Vec<Point3>) -> Result<Self, CurveError> {
        check_len("control points", basis.function_count(), control_points.len())?;
        Ok(Self {
            basis,
            data: ColumnMatrix::from_vec(control_points),
        })
    }

    pub fn basis(&self) -> &B {
        &self.basis
    }

    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        self.basis.domain()
    }

    #[must_use]
    pub fn control_points(&self) -> &ColumnMatrix<Point3> {
        &self.data
    }

    pub fn set_control_point(&mut self, index: usize, point: Point3) -> Result<(), CurveError> {
        self.data.set(index, point)?;
        Ok(())
    }

    pub fn blending_weights(&self, u: f64) -> Result<RowMatrix<f64>, CurveError> {
        Ok(self.basis.blending_weights(u)?)
    }

    /// Derivatives of orders `0..=max_order` at `u`.
    pub fn derivatives(&self, max_order: usize, u: f64) -> Result<Derivatives, CurveError> {
        let weights = self.basis.derivative_weights(max_order, u)?;
        let table = weights
            .rows()
            .map(|row| combine(row, self.data.iter()))
            .collect();
        Ok(Derivatives(ColumnMatrix::from_vec(table)))
    }

    pub fn point_at(&self, u: f64) -> Result<Point3, CurveError> {
        let weights = self.basis.blending_weights(u)?;
        Ok(combine(weights.as_slice(), self.data.iter()).to_point3())
    }

    /// Samples `div_point_count` parameters uniformly across the whole domain.
    pub fn generate_image(
        &self,
        max_order: usize,
        div_point_count: usize,
    ) -> Result<SampledCurve, CurveError> {
        if div_point_count < 2 {
            return Err(CurveError::InvalidDivisionCount(div_point_count));
        }
        self.basis.check_order(max_order)?;

        let (min, max) = self.basis.domain();
        let mut image = SampledCurve::with_orders(
            uniform_parameters(min, max, div_point_count),
            max_order,
        )?;
        for i in 0..div_point_count {
            let derivatives = self.derivatives(max_order, image.parameters[i])?;
            image.push(&derivatives);
        }
        log::debug!(
            "curve image: {div_point_count} samples, orders 0..={max_order}"
        );
        Ok(image)
    }

    /// Replaces the control points so the curve passes through `data[i]` at `knots[i]`.
    ///
    /// The control points are left untouched when any step fails.
    pub fn update_data_for_interpolation(
        &mut self,
        knots: &ColumnMatrix<f64>,
        data: &ColumnMatrix<Point3>,
    ) -> Result<(), CurveError> {
        let n = self.basis.function_count();
        check_len("knot vector", n, knots.len())?;
        check_len("data points", n, data.len())?;

        let mut collocation = RealSquareMatrix::try_new(n)?;
        for (i, &knot) in knots.iter().enumerate() {
            collocation.set_row(i, &self.basis.blending_weights(knot)?)?;
        }

        let rhs: &Matrix<Point3> = data;
        let solved = collocation.into_lu()?.solve(rhs, Orientation::Columns)?;
        self.data = ColumnMatrix::try_from(solved)?;
        log::debug!("curve interpolation: solved for {n} control points");
        Ok(())
    }
}

/// `Σ w_i P_i` as a vector from the origin.
pub(crate) fn combine<'a>(weights: &[f64], points: impl Iterator<Item = &'a Point3>) -> Vec3 {
    weights
        .iter()
        .zip(points)
        .fold(Vec3::ZERO, |acc, (w, p)| acc + p.to_vec3() * *w)
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<(), CurveError> {
    if expected == found {
        Ok(())
    } else {
        Err(CurveError::ShapeMismatch {
            what,
            expected,
            found,
        })
    }
}
