//! Blending-function families.
//!
//! A [`BlendingBasis`] maps a parameter to one weight per control point and can
//! differentiate those weights analytically up to some order. Curves and
//! surfaces are generic over the trait; [`BlendingFamily`] is the closed set of
//! families this crate ships and is what the convenience constructors use.
//!
//! # Families
//! - [`CyclicBasis`] of order `n`: `2n + 1` trigonometric weights on `[0, 2π]`,
//!   every derivative order available.
//! - [`CubicBSplineBasis`]: the four uniform cubic B-spline weights of one knot
//!   span on `[0, 1]`, orders 0 and 1.

use std::f64::consts::{FRAC_PI_2, TAU};

use super::matrix::{Matrix, MatrixError, RowMatrix, TriangularMatrix};

/// Errors raised while evaluating a blending family.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("parameter {value} lies outside the domain [{min}, {max}]")]
    DomainViolation { value: f64, min: f64, max: f64 },
    #[error("derivative order {requested} is not supported (maximum {supported})")]
    UnsupportedDerivativeOrder { requested: usize, supported: usize },
    #[error("blending family order {0} is out of range")]
    InvalidOrder(usize),
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

pub trait BlendingBasis {
    /// Closed parameter interval `(min, max)`.
    fn domain(&self) -> (f64, f64);

    /// Number of blending functions, i.e. control points in this direction.
    fn function_count(&self) -> usize;

    /// Highest derivative order available analytically, `None` when unbounded.
    fn max_derivative_order(&self) -> Option<usize>;

    /// Blending weights at `u`, one per function.
    fn blending_weights(&self, u: f64) -> Result<RowMatrix<f64>, EvaluationError>;

    /// Row `r` holds the `r`-th derivative of every blending function at `u`,
    /// for `r` in `0..=max_order`.
    fn derivative_weights(&self, max_order: usize, u: f64) -> Result<Matrix<f64>, EvaluationError>;

    fn check_parameter(&self, u: f64) -> Result<(), EvaluationError> {
        let (min, max) = self.domain();
        if u >= min && u <= max {
            Ok(())
        } else {
            Err(EvaluationError::DomainViolation { value: u, min, max })
        }
    }

    /// Accepts `max_order` when the family supports it; an unbounded family
    /// still needs `max_order + 1` rows to fit in `usize`.
    fn check_order(&self, max_order: usize) -> Result<(), EvaluationError> {
        let supported = self.max_derivative_order().unwrap_or(usize::MAX - 1);
        if max_order > supported {
            Err(EvaluationError::UnsupportedDerivativeOrder {
                requested: max_order,
                supported,
            })
        } else {
            Ok(())
        }
    }
}

/// `count` evenly spaced parameters covering `[min, max]`, both ends included.
///
/// The last sample is `max` itself so rounding can never push it outside the domain.
pub(crate) fn uniform_parameters(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count < 2 {
        return vec![min; count];
    }
    let last = count - 1;
    let step = (max - min) / last as f64;
    (0..count)
        .map(|i| if i == last { max } else { min + i as f64 * step })
        .collect()
}

fn powu(base: f64, exp: usize) -> f64 {
    (0..exp).fold(1.0, |acc, _| acc * base)
}

/// Cyclic trigonometric blending functions of order `n`:
/// `w_i(u) = c_n (1 + cos(u - i λ_n))^n` with `λ_n = 2π / (2n + 1)`.
///
/// Expanding the power into cosines of multiples of `u - i λ_n` gives a
/// constant term `1 / (2n + 1)` per function; the derivative formulas below
/// keep it only at order 0, which is why every curve point is offset by the
/// centroid of the control polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct CyclicBasis {
    order: usize,
    normalizing_constant: f64,
    phase_change: f64,
    binomials: TriangularMatrix<f64>,
}

impl CyclicBasis {
    pub fn new(order: usize) -> Result<Self, EvaluationError> {
        let twice_order = order
            .checked_mul(2)
            .filter(|m| order > 0 && *m < usize::MAX)
            .ok_or(EvaluationError::InvalidOrder(order))?;
        let binomials = binomial_coefficients(twice_order)?;
        Ok(Self {
            order,
            normalizing_constant: normalizing_constant(order),
            phase_change: TAU / (twice_order + 1) as f64,
            binomials,
        })
    }

    #[must_use]
    pub const fn order(&self) -> usize {
        self.order
    }

    /// `c_n`, chosen so the weights sum to one.
    #[must_use]
    pub const fn normalizing_constant(&self) -> f64 {
        self.normalizing_constant
    }

    /// `λ_n = 2π / (2n + 1)`.
    #[must_use]
    pub const fn phase_change(&self) -> f64 {
        self.phase_change
    }

    /// `C(m, k)` for `m <= 2n`, read from the cached table.
    #[must_use]
    pub fn binomial(&self, m: usize, k: usize) -> Option<f64> {
        self.binomials.get(m, k).ok().copied()
    }

    /// `C(m, k)` for `k <= m <= 2n`.
    fn coefficient(&self, m: usize, k: usize) -> f64 {
        self.binomials.rows()[m][k]
    }
}

/// `c_1 = 1/3`, `c_n = c_{n-1} · n / (2n + 1)`; zero for `n = 0`.
fn normalizing_constant(order: usize) -> f64 {
    if order == 0 {
        return 0.0;
    }
    (2..=order).fold(1.0 / 3.0, |c, i| c * i as f64 / (2 * i + 1) as f64)
}

/// Pascal's triangle up to row `m`.
fn binomial_coefficients(m: usize) -> Result<TriangularMatrix<f64>, MatrixError> {
    let mut bc = TriangularMatrix::try_new(m + 1)?;
    let rows = bc.rows_mut();
    for r in 0..=m {
        rows[r][0] = 1.0;
        rows[r][r] = 1.0;
        for i in 1..r {
            let value = rows[r - 1][i - 1] + rows[r - 1][i];
            rows[r][i] = value;
        }
    }
    Ok(bc)
}

impl BlendingBasis for CyclicBasis {
    fn domain(&self) -> (f64, f64) {
        (0.0, TAU)
    }

    fn function_count(&self) -> usize {
        2 * self.order + 1
    }

    fn max_derivative_order(&self) -> Option<usize> {
        None
    }

    fn blending_weights(&self, u: f64) -> Result<RowMatrix<f64>, EvaluationError> {
        self.check_parameter(u)?;
        let weights = (0..self.function_count())
            .map(|i| {
                let base = 1.0 + (u - i as f64 * self.phase_change).cos();
                self.normalizing_constant * powu(base, self.order)
            })
            .collect();
        Ok(RowMatrix::from_vec(weights))
    }

    fn derivative_weights(&self, max_order: usize, u: f64) -> Result<Matrix<f64>, EvaluationError> {
        self.check_parameter(u)?;
        self.check_order(max_order)?;

        let n = self.order;
        let count = self.function_count();
        let twice_n = 2 * n;
        let scale = 2.0 / (count as f64 * self.coefficient(twice_n, n));

        let mut result = Matrix::try_new(max_order + 1, count)?;
        for (r, row) in result.rows_mut().iter_mut().enumerate() {
            let shift = r as f64 * FRAC_PI_2;
            for (i, slot) in row.iter_mut().enumerate() {
                let angle = u - i as f64 * self.phase_change;
                let sum: f64 = (0..n)
                    .map(|k| {
                        let frequency = (n - k) as f64;
                        let bc = self.coefficient(twice_n, k);
                        powu(frequency, r) * bc * (frequency * angle + shift).cos()
                    })
                    .sum();
                *slot = if r == 0 {
                    scale * sum + 1.0 / count as f64
                } else {
                    scale * sum
                };
            }
        }

        Ok(result)
    }
}

/// Uniform cubic B-spline weights on a single knot span, parameter in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CubicBSplineBasis;

impl CubicBSplineBasis {
    #[must_use]
    pub fn weights_at(u: f64) -> [f64; 4] {
        let (u2, u3) = (u * u, u * u * u);
        let w = 1.0 - u;
        let (w2, w3) = (w * w, w * w * w);
        [
            w3 / 6.0,
            (3.0 * u * w2 + 3.0 * w + 1.0) / 6.0,
            (3.0 * u2 * w + 3.0 * u + 1.0) / 6.0,
            u3 / 6.0,
        ]
    }

    #[must_use]
    pub fn first_derivatives_at(u: f64) -> [f64; 4] {
        let u2 = u * u;
        let w = 1.0 - u;
        [
            -0.5 * w * w,
            0.5 * u * (3.0 * u - 4.0),
            -1.5 * u2 + u + 0.5,
            0.5 * u2,
        ]
    }
}

impl BlendingBasis for CubicBSplineBasis {
    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn function_count(&self) -> usize {
        4
    }

    fn max_derivative_order(&self) -> Option<usize> {
        Some(1)
    }

    fn blending_weights(&self, u: f64) -> Result<RowMatrix<f64>, EvaluationError> {
        self.check_parameter(u)?;
        Ok(RowMatrix::from_vec(Self::weights_at(u).to_vec()))
    }

    fn derivative_weights(&self, max_order: usize, u: f64) -> Result<Matrix<f64>, EvaluationError> {
        self.check_parameter(u)?;
        self.check_order(max_order)?;
        let mut result = Matrix::try_new(max_order + 1, 4)?;
        let rows = result.rows_mut();
        rows[0].copy_from_slice(&Self::weights_at(u));
        if max_order >= 1 {
            rows[1].copy_from_slice(&Self::first_derivatives_at(u));
        }
        Ok(result)
    }
}

/// The blending families available to curves and surfaces.
#[derive(Debug, Clone, PartialEq)]
pub enum BlendingFamily {
    Cyclic(CyclicBasis),
    CubicBSpline(CubicBSplineBasis),
}

impl BlendingFamily {
    pub fn cyclic(order: usize) -> Result<Self, EvaluationError> {
        CyclicBasis::new(order).map(Self::Cyclic)
    }

    #[must_use]
    pub const fn cubic_bspline() -> Self {
        Self::CubicBSpline(CubicBSplineBasis)
    }
}

impl From<CyclicBasis> for BlendingFamily {
    fn from(basis: CyclicBasis) -> Self {
        Self::Cyclic(basis)
    }
}

impl From<CubicBSplineBasis> for BlendingFamily {
    fn from(basis: CubicBSplineBasis) -> Self {
        Self::CubicBSpline(basis)
    }
}

impl BlendingBasis for BlendingFamily {
    fn domain(&self) -> (f64, f64) {
        match self {
            Self::Cyclic(b) => b.domain(),
            Self::CubicBSpline(b) => b.domain(),
        }
    }

    fn function_count(&self) -> usize {
        match self {
            Self::Cyclic(b) => b.function_count(),
            Self::CubicBSpline(b) => b.function_count(),
        }
    }

    fn max_derivative_order(&self) -> Option<usize> {
        match self {
            Self::Cyclic(b) => b.max_derivative_order(),
            Self::CubicBSpline(b) => b.max_derivative_order(),
        }
    }

    fn blending_weights(&self, u: f64) -> Result<RowMatrix<f64>, EvaluationError> {
        match self {
            Self::Cyclic(b) => b.blending_weights(u),
            Self::CubicBSpline(b) => b.blending_weights(u),
        }
    }

    fn derivative_weights(&self, max_order: usize, u: f64) -> Result<Matrix<f64>, EvaluationError> {
        match self {
            Self::Cyclic(b) => b.derivative_weights(max_order, u),
            Self::CubicBSpline(b) => b.derivative_weights(max_order, u),
        }
    }
}
