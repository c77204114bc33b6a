//! Dense matrices over an arbitrary element type.
//!
//! [`Matrix`] is a rectangular grid that keeps every row the same length.
//! [`RowMatrix`] and [`ColumnMatrix`] pin one dimension to a single entry and
//! refuse to resize it. [`TriangularMatrix`] stores only the lower triangle:
//! row `r` owns exactly `r + 1` entries.
//!
//! All element access is bounds-checked and reports [`MatrixError::IndexOutOfRange`]
//! instead of panicking.
//!
//! # Text form
//!
//! `Display` writes the dimensions on the first line and one row per line after
//! that; `FromStr` reads the same layout back for scalar element types.
//!
//! ```ignore
//! let m: Matrix<f64> = "2 3\n1 2 3\n4 5 6\n".parse()?;
//! assert_eq!(m.to_string(), "2 3\n1 2 3\n4 5 6\n");
//! ```

use std::fmt;
use std::ops::{Deref, Index};
use std::str::FromStr;

use serde::Serialize;

/// Errors reported by the matrix layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatrixError {
    #[error("index ({row}, {column}) is out of range for a {row_count}x{column_count} matrix")]
    IndexOutOfRange {
        row: usize,
        column: usize,
        row_count: usize,
        column_count: usize,
    },
    #[error("invalid matrix operation: {0}")]
    InvalidOperation(&'static str),
    #[error("cannot allocate storage for a {row_count}x{column_count} matrix")]
    Allocation { row_count: usize, column_count: usize },
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("malformed matrix text: {0}")]
    Parse(String),
}

fn allocate_row<T: Clone + Default>(
    column_count: usize,
    row_count: usize,
) -> Result<Vec<T>, MatrixError> {
    let mut row = Vec::new();
    row.try_reserve_exact(column_count)
        .map_err(|_| MatrixError::Allocation { row_count, column_count })?;
    row.resize(column_count, T::default());
    Ok(row)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matrix<T> {
    row_count: usize,
    column_count: usize,
    data: Vec<Vec<T>>,
}

impl<T: Clone + Default> Matrix<T> {
    /// Creates a `row_count` x `column_count` matrix filled with `T::default()`.
    ///
    /// Aborts like any `Vec` allocation when the storage cannot be obtained;
    /// use [`Matrix::try_new`] for sizes that come from outside.
    #[must_use]
    pub fn new(row_count: usize, column_count: usize) -> Self {
        Self {
            row_count,
            column_count,
            data: vec![vec![T::default(); column_count]; row_count],
        }
    }

    /// Like [`Matrix::new`], but reports exhausted storage as [`MatrixError::Allocation`].
    pub fn try_new(row_count: usize, column_count: usize) -> Result<Self, MatrixError> {
        let mut result = Self {
            row_count: 0,
            column_count,
            data: Vec::new(),
        };
        result.resize_rows(row_count)?;
        Ok(result)
    }

    /// Builds a matrix from explicit rows; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, MatrixError> {
        let column_count = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|row| row.len() != column_count) {
            return Err(MatrixError::DimensionMismatch {
                expected: column_count,
                found: bad.len(),
            });
        }
        Ok(Self {
            row_count: rows.len(),
            column_count,
            data: rows,
        })
    }

    /// Changes the number of rows, keeping existing entries and default-filling new ones.
    pub fn resize_rows(&mut self, row_count: usize) -> Result<(), MatrixError> {
        if row_count > self.row_count {
            let additional = row_count - self.row_count;
            self.data.try_reserve_exact(additional).map_err(|_| MatrixError::Allocation {
                row_count,
                column_count: self.column_count,
            })?;
            for _ in 0..additional {
                match allocate_row(self.column_count, row_count) {
                    Ok(row) => self.data.push(row),
                    Err(err) => {
                        self.data.truncate(self.row_count);
                        return Err(err);
                    }
                }
            }
        } else {
            self.data.truncate(row_count);
        }
        self.row_count = row_count;
        Ok(())
    }

    /// Changes the number of columns, keeping existing entries and default-filling new ones.
    ///
    /// Every row is reserved before any is grown, so a failed allocation leaves
    /// the matrix exactly as it was.
    pub fn resize_columns(&mut self, column_count: usize) -> Result<(), MatrixError> {
        if column_count > self.column_count {
            let additional = column_count - self.column_count;
            for row in &mut self.data {
                row.try_reserve_exact(additional).map_err(|_| MatrixError::Allocation {
                    row_count: self.row_count,
                    column_count,
                })?;
            }
        }
        for row in &mut self.data {
            row.resize(column_count, T::default());
        }
        self.column_count = column_count;
        Ok(())
    }

    #[must_use]
    pub fn transpose(&self) -> Self {
        let mut result = Self::new(self.column_count, self.row_count);
        for (i, row) in self.data.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                result.data[j][i] = value.clone();
            }
        }
        result
    }
}

impl<T> Matrix<T> {
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.row_count
    }

    #[must_use]
    pub const fn column_count(&self) -> usize {
        self.column_count
    }

    #[must_use]
    pub const fn is_square(&self) -> bool {
        self.row_count == self.column_count
    }

    const fn out_of_range(&self, row: usize, column: usize) -> MatrixError {
        MatrixError::IndexOutOfRange {
            row,
            column,
            row_count: self.row_count,
            column_count: self.column_count,
        }
    }

    pub fn get(&self, row: usize, column: usize) -> Result<&T, MatrixError> {
        self.data
            .get(row)
            .and_then(|r| r.get(column))
            .ok_or_else(|| self.out_of_range(row, column))
    }

    pub fn get_mut(&mut self, row: usize, column: usize) -> Result<&mut T, MatrixError> {
        let err = self.out_of_range(row, column);
        self.data
            .get_mut(row)
            .and_then(|r| r.get_mut(column))
            .ok_or(err)
    }

    pub fn set(&mut self, row: usize, column: usize, value: T) -> Result<(), MatrixError> {
        *self.get_mut(row, column)? = value;
        Ok(())
    }

    pub fn row(&self, index: usize) -> Result<&[T], MatrixError> {
        self.data
            .get(index)
            .map(Vec::as_slice)
            .ok_or_else(|| self.out_of_range(index, 0))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.data.iter().map(Vec::as_slice)
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Vec<T>] {
        &mut self.data
    }

    /// Iterates the entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter().flatten()
    }

    /// Replaces row `index` with the contents of `row`.
    pub fn set_row(&mut self, index: usize, row: &RowMatrix<T>) -> Result<(), MatrixError>
    where
        T: Clone,
    {
        if row.column_count() != self.column_count {
            return Err(MatrixError::DimensionMismatch {
                expected: self.column_count,
                found: row.column_count(),
            });
        }
        let err = self.out_of_range(index, 0);
        let target = self.data.get_mut(index).ok_or(err)?;
        target.clone_from_slice(row.as_slice());
        Ok(())
    }

    /// Replaces column `index` with the contents of `column`.
    pub fn set_column(&mut self, index: usize, column: &ColumnMatrix<T>) -> Result<(), MatrixError>
    where
        T: Clone,
    {
        if column.row_count() != self.row_count {
            return Err(MatrixError::DimensionMismatch {
                expected: self.row_count,
                found: column.row_count(),
            });
        }
        if index >= self.column_count {
            return Err(self.out_of_range(0, index));
        }
        for (row, value) in self.data.iter_mut().zip(column.iter()) {
            row[index] = value.clone();
        }
        Ok(())
    }

    /// Applies `f` to every entry, keeping the shape.
    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> Matrix<U> {
        Matrix {
            row_count: self.row_count,
            column_count: self.column_count,
            data: self
                .data
                .iter()
                .map(|row| row.iter().map(&mut f).collect())
                .collect(),
        }
    }
}

impl<T: Clone + Default> Default for Matrix<T> {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.row_count, self.column_count)?;
        for row in &self.data {
            write_row(f, row)?;
        }
        Ok(())
    }
}

fn write_row<T: fmt::Display>(f: &mut fmt::Formatter<'_>, row: &[T]) -> fmt::Result {
    for (j, value) in row.iter().enumerate() {
        if j > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{value}")?;
    }
    writeln!(f)
}

struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            inner: s.split_whitespace(),
        }
    }

    fn count(&mut self, what: &str) -> Result<usize, MatrixError> {
        let token = self
            .inner
            .next()
            .ok_or_else(|| MatrixError::Parse(format!("missing {what}")))?;
        token
            .parse()
            .map_err(|_| MatrixError::Parse(format!("invalid {what} `{token}`")))
    }

    fn element<T: FromStr>(&mut self) -> Result<T, MatrixError> {
        let token = self
            .inner
            .next()
            .ok_or_else(|| MatrixError::Parse("not enough elements".to_string()))?;
        token
            .parse()
            .map_err(|_| MatrixError::Parse(format!("invalid element `{token}`")))
    }

    fn finish(mut self) -> Result<(), MatrixError> {
        match self.inner.next() {
            Some(extra) => Err(MatrixError::Parse(format!("unexpected trailing token `{extra}`"))),
            None => Ok(()),
        }
    }
}

impl<T: FromStr + Clone + Default> FromStr for Matrix<T> {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = Tokens::new(s);
        let row_count = tokens.count("row count")?;
        let column_count = tokens.count("column count")?;
        let mut result = Self::try_new(row_count, column_count)?;
        for row in &mut result.data {
            for value in row.iter_mut() {
                *value = tokens.element()?;
            }
        }
        tokens.finish()?;
        Ok(result)
    }
}

/// A matrix with exactly one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RowMatrix<T>(Matrix<T>);

impl<T: Clone + Default> RowMatrix<T> {
    #[must_use]
    pub fn new(column_count: usize) -> Self {
        Self(Matrix::new(1, column_count))
    }

    #[must_use]
    pub fn from_vec(values: Vec<T>) -> Self {
        Self(Matrix {
            row_count: 1,
            column_count: values.len(),
            data: vec![values],
        })
    }

    pub fn resize_columns(&mut self, column_count: usize) -> Result<(), MatrixError> {
        self.0.resize_columns(column_count)
    }

    /// A row matrix always has a single row.
    pub fn resize_rows(&mut self, _row_count: usize) -> Result<(), MatrixError> {
        Err(MatrixError::InvalidOperation("cannot resize the rows of a row matrix"))
    }
}

impl<T> RowMatrix<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.column_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, column: usize) -> Result<&T, MatrixError> {
        self.0.get(0, column)
    }

    pub fn get_mut(&mut self, column: usize) -> Result<&mut T, MatrixError> {
        self.0.get_mut(0, column)
    }

    pub fn set(&mut self, column: usize, value: T) -> Result<(), MatrixError> {
        self.0.set(0, column, value)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.0.data[0]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.0.data.into_iter().next().unwrap_or_default()
    }
}

impl<T> Deref for RowMatrix<T> {
    type Target = Matrix<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> Index<usize> for RowMatrix<T> {
    type Output = T;

    fn index(&self, column: usize) -> &Self::Output {
        &self.as_slice()[column]
    }
}

impl<T: Clone + Default> Default for RowMatrix<T> {
    fn default() -> Self {
        Self::new(1)
    }
}

impl<T: Clone + Default> From<Vec<T>> for RowMatrix<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values)
    }
}

impl<T: fmt::Display> fmt::Display for RowMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A matrix with exactly one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColumnMatrix<T>(Matrix<T>);

impl<T: Clone + Default> ColumnMatrix<T> {
    #[must_use]
    pub fn new(row_count: usize) -> Self {
        Self(Matrix::new(row_count, 1))
    }

    #[must_use]
    pub fn from_vec(values: Vec<T>) -> Self {
        Self(Matrix {
            row_count: values.len(),
            column_count: 1,
            data: values.into_iter().map(|v| vec![v]).collect(),
        })
    }

    pub fn resize_rows(&mut self, row_count: usize) -> Result<(), MatrixError> {
        self.0.resize_rows(row_count)
    }

    /// A column matrix always has a single column.
    pub fn resize_columns(&mut self, _column_count: usize) -> Result<(), MatrixError> {
        Err(MatrixError::InvalidOperation("cannot resize the columns of a column matrix"))
    }
}

impl<T> ColumnMatrix<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.row_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, row: usize) -> Result<&T, MatrixError> {
        self.0.get(row, 0)
    }

    pub fn get_mut(&mut self, row: usize) -> Result<&mut T, MatrixError> {
        self.0.get_mut(row, 0)
    }

    pub fn set(&mut self, row: usize, value: T) -> Result<(), MatrixError> {
        self.0.set(row, 0, value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.0.data.iter().filter_map(|row| row.first())
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.0
            .data
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .collect()
    }
}

impl<T> Deref for ColumnMatrix<T> {
    type Target = Matrix<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> Index<usize> for ColumnMatrix<T> {
    type Output = T;

    fn index(&self, row: usize) -> &Self::Output {
        &self.0.data[row][0]
    }
}

impl<T: Clone + Default> Default for ColumnMatrix<T> {
    fn default() -> Self {
        Self::new(1)
    }
}

impl<T: Clone + Default> From<Vec<T>> for ColumnMatrix<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values)
    }
}

impl<T> TryFrom<Matrix<T>> for ColumnMatrix<T> {
    type Error = MatrixError;

    fn try_from(matrix: Matrix<T>) -> Result<Self, Self::Error> {
        if matrix.column_count != 1 {
            return Err(MatrixError::DimensionMismatch {
                expected: 1,
                found: matrix.column_count,
            });
        }
        Ok(Self(matrix))
    }
}

impl<T> TryFrom<Matrix<T>> for RowMatrix<T> {
    type Error = MatrixError;

    fn try_from(matrix: Matrix<T>) -> Result<Self, Self::Error> {
        if matrix.row_count != 1 {
            return Err(MatrixError::DimensionMismatch {
                expected: 1,
                found: matrix.row_count,
            });
        }
        Ok(Self(matrix))
    }
}

impl<T: fmt::Display> fmt::Display for ColumnMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lower-triangular storage; row `r` holds columns `0..=r`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriangularMatrix<T> {
    data: Vec<Vec<T>>,
}

impl<T: Clone + Default> TriangularMatrix<T> {
    #[must_use]
    pub fn new(row_count: usize) -> Self {
        Self {
            data: (0..row_count).map(|r| vec![T::default(); r + 1]).collect(),
        }
    }

    /// Like [`TriangularMatrix::new`], but reports exhausted storage as an error.
    pub fn try_new(row_count: usize) -> Result<Self, MatrixError> {
        let mut result = Self { data: Vec::new() };
        result.resize_rows(row_count)?;
        Ok(result)
    }

    /// Changes the number of rows, keeping the entries of surviving rows.
    pub fn resize_rows(&mut self, row_count: usize) -> Result<(), MatrixError> {
        let current = self.data.len();
        if row_count > current {
            self.data
                .try_reserve_exact(row_count - current)
                .map_err(|_| MatrixError::Allocation {
                    row_count,
                    column_count: row_count,
                })?;
            for r in current..row_count {
                match allocate_row(r + 1, row_count) {
                    Ok(row) => self.data.push(row),
                    Err(err) => {
                        self.data.truncate(current);
                        return Err(err);
                    }
                }
            }
        } else {
            self.data.truncate(row_count);
        }
        Ok(())
    }
}

impl<T> TriangularMatrix<T> {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    fn out_of_range(&self, row: usize, column: usize) -> MatrixError {
        MatrixError::IndexOutOfRange {
            row,
            column,
            row_count: self.data.len(),
            column_count: (row + 1).min(self.data.len()),
        }
    }

    pub fn get(&self, row: usize, column: usize) -> Result<&T, MatrixError> {
        self.data
            .get(row)
            .and_then(|r| r.get(column))
            .ok_or_else(|| self.out_of_range(row, column))
    }

    pub fn get_mut(&mut self, row: usize, column: usize) -> Result<&mut T, MatrixError> {
        let err = self.out_of_range(row, column);
        self.data
            .get_mut(row)
            .and_then(|r| r.get_mut(column))
            .ok_or(err)
    }

    pub fn set(&mut self, row: usize, column: usize, value: T) -> Result<(), MatrixError> {
        *self.get_mut(row, column)? = value;
        Ok(())
    }

    pub fn row(&self, index: usize) -> Result<&[T], MatrixError> {
        self.data
            .get(index)
            .map(Vec::as_slice)
            .ok_or_else(|| self.out_of_range(index, 0))
    }

    pub(crate) fn rows(&self) -> &[Vec<T>] {
        &self.data
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Vec<T>] {
        &mut self.data
    }
}

impl<T: Clone + Default> Default for TriangularMatrix<T> {
    fn default() -> Self {
        Self::new(1)
    }
}

impl<T: fmt::Display> fmt::Display for TriangularMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.data.len())?;
        for row in &self.data {
            write_row(f, row)?;
        }
        Ok(())
    }
}

impl<T: FromStr + Clone + Default> FromStr for TriangularMatrix<T> {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = Tokens::new(s);
        let row_count = tokens.count("row count")?;
        let mut result = Self::try_new(row_count)?;
        for row in &mut result.data {
            for value in row.iter_mut() {
                *value = tokens.element()?;
            }
        }
        tokens.finish()?;
        Ok(result)
    }
}
