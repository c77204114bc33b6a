//! Square real matrices and LU-based linear solves.
//!
//! [`RealSquareMatrix::into_lu`] factors the matrix in place (`P·A = L·U`, with
//! partial pivoting) and hands back an [`LuDecomposition`]. Only a decomposition
//! can solve, so a system is always factored exactly once before it is used.
//! Callers that still need the unfactored matrix use [`RealSquareMatrix::lu`],
//! which factors a copy.
//!
//! Right-hand sides may hold any [`LinearElement`]: scalars, vectors or points.
//! Each component is solved independently by the same substitution.

use super::core::{LinearElement, Tolerance};
use super::matrix::{Matrix, MatrixError, RowMatrix};

/// Errors reported by the linear solver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolveError {
    #[error("matrix is not square: {row_count}x{column_count}")]
    NotSquare { row_count: usize, column_count: usize },
    #[error("matrix is singular: pivot {pivot_index} is numerically zero")]
    Singular { pivot_index: usize },
    #[error("right-hand side has {found} entries per system, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

/// How the right-hand side matrix `B` is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Every column of `B` is one system: solves `A·X = B`.
    #[default]
    Columns,
    /// Every row of `B` is one system: solves `A·Xᵗ = Bᵗ`, returning `X` row-wise.
    Rows,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RealSquareMatrix {
    matrix: Matrix<f64>,
}

impl RealSquareMatrix {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            matrix: Matrix::new(size, size),
        }
    }

    /// A zero `size` x `size` matrix, failing instead of aborting when storage runs out.
    pub fn try_new(size: usize) -> Result<Self, MatrixError> {
        Ok(Self {
            matrix: Matrix::try_new(size, size)?,
        })
    }

    pub fn from_matrix(matrix: Matrix<f64>) -> Result<Self, SolveError> {
        if !matrix.is_square() {
            return Err(SolveError::NotSquare {
                row_count: matrix.row_count(),
                column_count: matrix.column_count(),
            });
        }
        Ok(Self { matrix })
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, SolveError> {
        Self::from_matrix(Matrix::from_rows(rows)?)
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.matrix.row_count()
    }

    #[must_use]
    pub const fn as_matrix(&self) -> &Matrix<f64> {
        &self.matrix
    }

    pub fn get(&self, row: usize, column: usize) -> Result<f64, MatrixError> {
        self.matrix.get(row, column).copied()
    }

    pub fn set(&mut self, row: usize, column: usize, value: f64) -> Result<(), MatrixError> {
        self.matrix.set(row, column, value)
    }

    pub fn set_row(&mut self, index: usize, row: &RowMatrix<f64>) -> Result<(), MatrixError> {
        self.matrix.set_row(index, row)
    }

    /// Resizes both dimensions at once so the matrix stays square.
    pub fn resize(&mut self, size: usize) -> Result<(), MatrixError> {
        self.matrix.resize_rows(size)?;
        self.matrix.resize_columns(size)
    }

    /// Computes `A·X` for a right-hand side laid out as `orientation` describes.
    pub fn multiply<T>(&self, x: &Matrix<T>, orientation: Orientation) -> Result<Matrix<T>, SolveError>
    where
        T: LinearElement + Default,
    {
        let n = self.size();
        check_rhs_shape(n, x, orientation)?;
        let mut result = Matrix::try_new(x.row_count(), x.column_count())?;
        let systems = system_count(x, orientation);
        for s in 0..systems {
            for i in 0..n {
                let mut acc = T::zero();
                for (j, a) in self.matrix.row(i)?.iter().enumerate() {
                    acc = acc.plus(entry(x, s, j, orientation)?.scaled(*a));
                }
                set_entry(&mut result, s, i, orientation, acc)?;
            }
        }
        Ok(result)
    }

    /// Factors the matrix in place with the default pivot tolerance.
    pub fn into_lu(self) -> Result<LuDecomposition, SolveError> {
        self.into_lu_with_tolerance(Tolerance::PIVOT)
    }

    /// Factors a copy of the matrix, leaving `self` untouched.
    pub fn lu(&self) -> Result<LuDecomposition, SolveError> {
        self.clone().into_lu()
    }

    /// Doolittle factorization with partial pivoting.
    ///
    /// Fails with [`SolveError::Singular`] as soon as the largest remaining
    /// candidate in a pivot column has magnitude `<= tolerance.eps`.
    pub fn into_lu_with_tolerance(self, tolerance: Tolerance) -> Result<LuDecomposition, SolveError> {
        let n = self.size();
        let mut a = self.matrix;
        let mut permutation: Vec<usize> = (0..n).collect();
        let mut swap_count = 0usize;

        log::trace!("LU decomposition of a {n}x{n} matrix");

        let rows = a.rows_mut();
        for k in 0..n {
            let mut pivot_row = k;
            let mut pivot_value = rows[k][k].abs();
            for (i, row) in rows.iter().enumerate().skip(k + 1) {
                let value = row[k].abs();
                if value > pivot_value {
                    pivot_value = value;
                    pivot_row = i;
                }
            }

            if !pivot_value.is_finite() || pivot_value <= tolerance.eps {
                log::debug!("singular matrix: pivot {k} has magnitude {pivot_value:e}");
                return Err(SolveError::Singular { pivot_index: k });
            }

            if pivot_row != k {
                log::trace!("pivot swap: rows {k} <-> {pivot_row}");
                rows.swap(k, pivot_row);
                permutation.swap(k, pivot_row);
                swap_count += 1;
            }

            let (upper, lower) = rows.split_at_mut(k + 1);
            let pivot = &upper[k];
            for row in lower.iter_mut() {
                let factor = row[k] / pivot[k];
                row[k] = factor;
                for j in (k + 1)..n {
                    row[j] -= factor * pivot[j];
                }
            }
        }

        Ok(LuDecomposition {
            factors: a,
            permutation,
            swap_count,
        })
    }
}

impl TryFrom<Matrix<f64>> for RealSquareMatrix {
    type Error = SolveError;

    fn try_from(matrix: Matrix<f64>) -> Result<Self, Self::Error> {
        Self::from_matrix(matrix)
    }
}

/// Packed `L` (unit diagonal, strictly below) and `U` (on and above the diagonal)
/// factors plus the row permutation that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct LuDecomposition {
    factors: Matrix<f64>,
    permutation: Vec<usize>,
    swap_count: usize,
}

impl LuDecomposition {
    #[must_use]
    pub const fn size(&self) -> usize {
        self.factors.row_count()
    }

    /// Row `k` of `P·A` is row `permutation()[k]` of `A`.
    #[must_use]
    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    #[must_use]
    pub fn determinant(&self) -> f64 {
        let diagonal: f64 = self
            .factors
            .rows()
            .enumerate()
            .map(|(i, row)| row[i])
            .product();
        if self.swap_count % 2 == 0 { diagonal } else { -diagonal }
    }

    /// Solves the system(s) described by `rhs` and `orientation`.
    ///
    /// With [`Orientation::Columns`] `rhs` must have `size()` rows and the result
    /// has the shape of `rhs`; with [`Orientation::Rows`] `rhs` must have
    /// `size()` columns and each result row solves the matching `rhs` row.
    pub fn solve<T>(&self, rhs: &Matrix<T>, orientation: Orientation) -> Result<Matrix<T>, SolveError>
    where
        T: LinearElement + Default,
    {
        let n = self.size();
        check_rhs_shape(n, rhs, orientation)?;

        let mut result = Matrix::try_new(rhs.row_count(), rhs.column_count())?;
        let mut buffer = vec![T::zero(); n];
        for s in 0..system_count(rhs, orientation) {
            for (i, slot) in buffer.iter_mut().enumerate() {
                *slot = entry(rhs, s, self.permutation[i], orientation)?;
            }
            self.substitute(&mut buffer);
            for (i, value) in buffer.iter().enumerate() {
                set_entry(&mut result, s, i, orientation, *value)?;
            }
        }
        Ok(result)
    }

    /// Forward then back substitution on an already permuted right-hand side.
    fn substitute<T: LinearElement>(&self, x: &mut [T]) {
        let lu: Vec<&[f64]> = self.factors.rows().collect();
        let n = x.len();

        for i in 0..n {
            let mut acc = x[i];
            for j in 0..i {
                acc = acc.minus(x[j].scaled(lu[i][j]));
            }
            x[i] = acc;
        }

        for i in (0..n).rev() {
            let mut acc = x[i];
            for j in (i + 1)..n {
                acc = acc.minus(x[j].scaled(lu[i][j]));
            }
            x[i] = acc.scaled(1.0 / lu[i][i]);
        }
    }
}

fn check_rhs_shape<T>(n: usize, rhs: &Matrix<T>, orientation: Orientation) -> Result<(), SolveError> {
    let found = match orientation {
        Orientation::Columns => rhs.row_count(),
        Orientation::Rows => rhs.column_count(),
    };
    if found == n {
        Ok(())
    } else {
        Err(SolveError::DimensionMismatch { expected: n, found })
    }
}

const fn system_count<T>(rhs: &Matrix<T>, orientation: Orientation) -> usize {
    match orientation {
        Orientation::Columns => rhs.column_count(),
        Orientation::Rows => rhs.row_count(),
    }
}

fn entry<T: Copy>(
    m: &Matrix<T>,
    system: usize,
    index: usize,
    orientation: Orientation,
) -> Result<T, MatrixError> {
    match orientation {
        Orientation::Columns => m.get(index, system).copied(),
        Orientation::Rows => m.get(system, index).copied(),
    }
}

fn set_entry<T>(
    m: &mut Matrix<T>,
    system: usize,
    index: usize,
    orientation: Orientation,
    value: T,
) -> Result<(), MatrixError> {
    match orientation {
        Orientation::Columns => m.set(index, system, value),
        Orientation::Rows => m.set(system, index, value),
    }
}
