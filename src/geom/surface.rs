//! Tensor-product surfaces over two independent blending families.
//!
//! A [`TensorProductSurface`] owns a `row_count x column_count` grid of control
//! points. Rows follow the u family and columns follow the v family, so the
//! grid shape must be `(u_basis.function_count(), v_basis.function_count())`.
//!
//! Mixed partials are computed by first contracting every control row against
//! the v weights, then contracting the resulting column against the u weights.

use std::fmt;

use super::basis::{BlendingBasis, BlendingFamily, EvaluationError, uniform_parameters};
use super::core::{Point3, Tolerance, Vec3};
use super::curve::{SampledCurve, combine};
use super::linear_system::SolveError;
use super::matrix::{Matrix, MatrixError, TriangularMatrix};

/// Parametric direction of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    U,
    V,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U => f.write_str("u"),
            Self::V => f.write_str("v"),
        }
    }
}

/// Errors raised by tensor-product surfaces.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SurfaceError {
    #[error("{direction} direction: {source}")]
    Evaluation {
        direction: Direction,
        #[source]
        source: EvaluationError,
    },
    #[error("{what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("division count must be at least 2, got {0}")]
    InvalidDivisionCount(usize),
    #[error("surface normal is degenerate at grid vertex ({u_index}, {v_index})")]
    DegenerateNormal { u_index: usize, v_index: usize },
    #[error("tessellation needs {vertex_count} vertices, more than a u32 index can address")]
    MeshTooLarge { vertex_count: usize },
    #[error(transparent)]
    Solve(#[from] SolveError),
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

impl SurfaceError {
    pub(crate) fn in_direction(direction: Direction) -> impl Fn(EvaluationError) -> Self {
        move |source| Self::Evaluation { direction, source }
    }

    #[must_use]
    pub fn is_domain_violation(&self) -> bool {
        matches!(
            self,
            Self::Evaluation {
                source: EvaluationError::DomainViolation { .. },
                ..
            }
        )
    }
}

/// Entry `(r, c)` holds the partial derivative of order `r - c` in u and `c` in v.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialDerivatives(TriangularMatrix<Vec3>);

impl PartialDerivatives {
    #[must_use]
    pub fn get(&self, total_order: usize, v_order: usize) -> Option<Vec3> {
        self.0.get(total_order, v_order).ok().copied()
    }

    #[must_use]
    pub fn point(&self) -> Point3 {
        self.get(0, 0).unwrap_or_default().to_point3()
    }

    /// `∂S/∂u`, zero when first order was not requested.
    #[must_use]
    pub fn u_derivative(&self) -> Vec3 {
        self.get(1, 0).unwrap_or_default()
    }

    /// `∂S/∂v`, zero when first order was not requested.
    #[must_use]
    pub fn v_derivative(&self) -> Vec3 {
        self.get(1, 1).unwrap_or_default()
    }

    #[must_use]
    pub fn max_order(&self) -> usize {
        self.0.row_count().saturating_sub(1)
    }

    #[must_use]
    pub fn as_triangular(&self) -> &TriangularMatrix<Vec3> {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TensorProductSurface<U: BlendingBasis = BlendingFamily, V: BlendingBasis = BlendingFamily> {
    pub(crate) u_basis: U,
    pub(crate) v_basis: V,
    pub(crate) data: Matrix<Point3>,
}

impl TensorProductSurface<BlendingFamily, BlendingFamily> {
    /// Bicubic uniform B-spline patch over a 4x4 control grid.
    pub fn bicubic_bspline_patch(control_points: [[Point3; 4]; 4]) -> Result<Self, SurfaceError> {
        let rows = control_points.iter().map(|row| row.to_vec()).collect();
        Self::new(
            BlendingFamily::cubic_bspline(),
            BlendingFamily::cubic_bspline(),
            Matrix::from_rows(rows)?,
        )
    }
}

impl<U: BlendingBasis, V: BlendingBasis> TensorProductSurface<U, V> {
    pub fn new(u_basis: U, v_basis: V, control_points: Matrix<Point3>) -> Result<Self, SurfaceError> {
        check_shape(
            "control grid rows",
            u_basis.function_count(),
            control_points.row_count(),
        )?;
        check_shape(
            "control grid columns",
            v_basis.function_count(),
            control_points.column_count(),
        )?;
        Ok(Self {
            u_basis,
            v_basis,
            data: control_points,
        })
    }

    pub fn u_basis(&self) -> &U {
        &self.u_basis
    }

    pub fn v_basis(&self) -> &V {
        &self.v_basis
    }

    #[must_use]
    pub fn domain_u(&self) -> (f64, f64) {
        self.u_basis.domain()
    }

    #[must_use]
    pub fn domain_v(&self) -> (f64, f64) {
        self.v_basis.domain()
    }

    #[must_use]
    pub fn control_points(&self) -> &Matrix<Point3> {
        &self.data
    }

    pub fn set_control_point(&mut self, row: usize, column: usize, point: Point3) -> Result<(), SurfaceError> {
        self.data.set(row, column, point)?;
        Ok(())
    }

    /// Mixed partial derivatives of total order `0..=max_order` at `(u, v)`.
    pub fn partial_derivatives(
        &self,
        max_order: usize,
        u: f64,
        v: f64,
    ) -> Result<PartialDerivatives, SurfaceError> {
        let du = self
            .u_basis
            .derivative_weights(max_order, u)
            .map_err(SurfaceError::in_direction(Direction::U))?;
        let dv = self
            .v_basis
            .derivative_weights(max_order, v)
            .map_err(SurfaceError::in_direction(Direction::V))?;

        // aux[c][i] = Σ_j dv[c][j] P(i, j)
        let aux: Vec<Vec<Vec3>> = dv
            .rows()
            .map(|weights| self.data.rows().map(|row| combine(weights, row.iter())).collect())
            .collect();

        let mut table = TriangularMatrix::try_new(max_order + 1)?;
        for (r, row) in table.rows_mut().iter_mut().enumerate() {
            for (c, slot) in row.iter_mut().enumerate() {
                let weights = du.row(r - c)?;
                *slot = weights
                    .iter()
                    .zip(&aux[c])
                    .fold(Vec3::ZERO, |acc, (w, a)| acc + *a * *w);
            }
        }

        Ok(PartialDerivatives(table))
    }

    pub fn point_at(&self, u: f64, v: f64) -> Result<Point3, SurfaceError> {
        Ok(self.partial_derivatives(0, u, v)?.point())
    }

    /// Unit normal `∂S/∂u × ∂S/∂v`, or `None` where the cross product vanishes.
    pub fn normal_at(&self, u: f64, v: f64) -> Result<Option<Vec3>, SurfaceError> {
        let pd = self.partial_derivatives(1, u, v)?;
        Ok(unit_normal(&pd, Tolerance::ZERO_LENGTH))
    }

    /// Curves of constant u, running along v.
    ///
    /// Each line carries positions and, for `max_order >= 1`, the v tangent.
    /// Orders above 1 are not sampled.
    pub fn generate_u_isoparametric_lines(
        &self,
        iso_line_count: usize,
        max_order: usize,
        div_point_count: usize,
    ) -> Result<Vec<SampledCurve>, SurfaceError> {
        self.isoparametric_lines(Direction::U, iso_line_count, max_order, div_point_count)
    }

    /// Curves of constant v, running along u.
    pub fn generate_v_isoparametric_lines(
        &self,
        iso_line_count: usize,
        max_order: usize,
        div_point_count: usize,
    ) -> Result<Vec<SampledCurve>, SurfaceError> {
        self.isoparametric_lines(Direction::V, iso_line_count, max_order, div_point_count)
    }

    fn isoparametric_lines(
        &self,
        fixed: Direction,
        iso_line_count: usize,
        max_order: usize,
        div_point_count: usize,
    ) -> Result<Vec<SampledCurve>, SurfaceError> {
        for count in [iso_line_count, div_point_count] {
            if count < 2 {
                return Err(SurfaceError::InvalidDivisionCount(count));
            }
        }
        let max_order = max_order.min(1);

        let ((u_min, u_max), (v_min, v_max)) = (self.domain_u(), self.domain_v());
        let (fixed_values, running_values) = match fixed {
            Direction::U => (
                uniform_parameters(u_min, u_max, iso_line_count),
                uniform_parameters(v_min, v_max, div_point_count),
            ),
            Direction::V => (
                uniform_parameters(v_min, v_max, iso_line_count),
                uniform_parameters(u_min, u_max, div_point_count),
            ),
        };

        let mut lines = Vec::with_capacity(iso_line_count);
        for &fixed_value in &fixed_values {
            let mut positions = Vec::with_capacity(div_point_count);
            let mut tangents = Vec::with_capacity(div_point_count);
            for &running in &running_values {
                let (u, v) = match fixed {
                    Direction::U => (fixed_value, running),
                    Direction::V => (running, fixed_value),
                };
                let pd = self.partial_derivatives(max_order, u, v)?;
                positions.push(pd.point().to_vec3());
                if max_order == 1 {
                    tangents.push(match fixed {
                        Direction::U => pd.v_derivative(),
                        Direction::V => pd.u_derivative(),
                    });
                }
            }

            let mut derivatives = vec![positions];
            if max_order == 1 {
                derivatives.push(tangents);
            }
            lines.push(SampledCurve {
                parameters: running_values.clone(),
                derivatives,
            });
        }

        log::debug!(
            "isoparametric lines: {iso_line_count} at constant {fixed}, {div_point_count} samples each"
        );
        Ok(lines)
    }
}

pub(crate) fn unit_normal(pd: &PartialDerivatives, tolerance: Tolerance) -> Option<Vec3> {
    let normal = pd.u_derivative().cross(pd.v_derivative());
    if tolerance.is_zero_vec3(normal) {
        None
    } else {
        normal.normalized()
    }
}

pub(crate) fn check_shape(what: &'static str, expected: usize, found: usize) -> Result<(), SurfaceError> {
    if expected == found {
        Ok(())
    } else {
        Err(SurfaceError::ShapeMismatch {
            what,
            expected,
            found,
        })
    }
}
