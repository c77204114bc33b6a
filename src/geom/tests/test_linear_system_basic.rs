use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geom::{
    LinearElement, Matrix, MatrixError, Orientation, Point3, RealSquareMatrix, SolveError,
    Tolerance,
};

fn random_diagonally_dominant(rng: &mut StdRng, n: usize) -> RealSquareMatrix {
    let mut a = RealSquareMatrix::new(n);
    for i in 0..n {
        for j in 0..n {
            let value: f64 = rng.random_range(-1.0..1.0);
            let value = if i == j { value + 2.0 * n as f64 } else { value };
            a.set(i, j, value).unwrap();
        }
    }
    a
}

fn max_residual<T: LinearElement>(a: &Matrix<T>, b: &Matrix<T>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x.minus(*y).magnitude())
        .fold(0.0, f64::max)
}

#[test]
fn lu_solve_reproduces_random_right_hand_sides() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for n in [1, 2, 5, 12] {
        let a = random_diagonally_dominant(&mut rng, n);
        let mut b: Matrix<f64> = Matrix::new(n, 3);
        for i in 0..n {
            for j in 0..3 {
                b.set(i, j, rng.random_range(-10.0..10.0)).unwrap();
            }
        }

        let x = a.lu().unwrap().solve(&b, Orientation::Columns).unwrap();
        let ax = a.multiply(&x, Orientation::Columns).unwrap();
        assert!(max_residual(&ax, &b) < 1e-10, "n = {n}");
    }
}

#[test]
fn pivoting_handles_zero_leading_entry() {
    let a = RealSquareMatrix::from_rows(vec![
        vec![0.0, 1.0, 2.0],
        vec![1.0, 0.0, 3.0],
        vec![4.0, -3.0, 8.0],
    ])
    .unwrap();
    let b = Matrix::from_rows(vec![vec![5.0], vec![7.0], vec![14.0]]).unwrap();

    let lu = a.lu().unwrap();
    let x = lu.solve(&b, Orientation::Columns).unwrap();
    let ax = a.multiply(&x, Orientation::Columns).unwrap();

    assert!(max_residual(&ax, &b) < 1e-12);
    assert_ne!(lu.permutation()[0], 0);
}

#[test]
fn singular_matrix_is_reported() {
    let a = RealSquareMatrix::from_rows(vec![vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
    assert_eq!(a.into_lu(), Err(SolveError::Singular { pivot_index: 1 }));

    let tiny = RealSquareMatrix::from_rows(vec![vec![1e-15, 0.0], vec![0.0, 1.0]]).unwrap();
    assert_eq!(tiny.lu(), Err(SolveError::Singular { pivot_index: 0 }));
    assert!(tiny.into_lu_with_tolerance(Tolerance::new(1e-16)).is_ok());
}

#[test]
fn non_square_input_is_rejected() {
    let result = RealSquareMatrix::from_rows(vec![vec![1.0, 2.0]]);
    assert_eq!(
        result,
        Err(SolveError::NotSquare {
            row_count: 1,
            column_count: 2,
        })
    );
}

#[test]
fn right_hand_side_shape_is_checked() {
    let lu = RealSquareMatrix::from_rows(vec![vec![2.0, 1.0], vec![1.0, 3.0]])
        .unwrap()
        .into_lu()
        .unwrap();
    let b: Matrix<f64> = Matrix::new(3, 1);

    assert_eq!(
        lu.solve(&b, Orientation::Columns),
        Err(SolveError::DimensionMismatch { expected: 2, found: 3 })
    );
    assert_eq!(
        lu.solve(&b, Orientation::Rows),
        Err(SolveError::DimensionMismatch { expected: 2, found: 1 })
    );
}

#[test]
fn row_orientation_solves_each_row_as_a_system() {
    let a = RealSquareMatrix::from_rows(vec![vec![2.0, 1.0], vec![1.0, 3.0]]).unwrap();
    let lu = a.lu().unwrap();
    let tol = Tolerance::TIGHT;

    let rows = Matrix::from_rows(vec![vec![3.0, 5.0], vec![2.0, 1.0]]).unwrap();
    let x = lu.solve(&rows, Orientation::Rows).unwrap();
    assert!(tol.approx_eq_f64(*x.get(0, 0).unwrap(), 0.8));
    assert!(tol.approx_eq_f64(*x.get(0, 1).unwrap(), 1.4));
    assert!(tol.approx_eq_f64(*x.get(1, 0).unwrap(), 1.0));
    assert!(tol.approx_eq_f64(*x.get(1, 1).unwrap(), 0.0));

    let columns = lu.solve(&rows.transpose(), Orientation::Columns).unwrap();
    assert!(max_residual(&columns.transpose(), &x) < 1e-15);
}

#[test]
fn point_right_hand_sides_solve_per_component() {
    let a = RealSquareMatrix::from_rows(vec![vec![2.0, 1.0], vec![1.0, 3.0]]).unwrap();
    let b = Matrix::from_rows(vec![
        vec![Point3::new(3.0, 2.0, 0.0)],
        vec![Point3::new(5.0, 1.0, 0.0)],
    ])
    .unwrap();

    let x = a.into_lu().unwrap().solve(&b, Orientation::Columns).unwrap();

    let tol = Tolerance::TIGHT;
    assert!(tol.approx_eq_point3(*x.get(0, 0).unwrap(), Point3::new(0.8, 1.0, 0.0)));
    assert!(tol.approx_eq_point3(*x.get(1, 0).unwrap(), Point3::new(1.4, 0.0, 0.0)));
}

#[test]
fn determinant_tracks_row_swaps() {
    let a = RealSquareMatrix::from_rows(vec![vec![2.0, 1.0], vec![1.0, 3.0]]).unwrap();
    assert!(Tolerance::TIGHT.approx_eq_f64(a.lu().unwrap().determinant(), 5.0));

    let swap = RealSquareMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
    assert_eq!(swap.lu().unwrap().determinant(), -1.0);

    // lu() factors a copy
    assert_eq!(swap.get(0, 1), Ok(1.0));
}

#[test]
fn resize_keeps_matrix_square() {
    let mut a = RealSquareMatrix::new(2);
    a.set(1, 1, 4.0).unwrap();
    a.resize(3).unwrap();
    assert_eq!(a.size(), 3);
    assert!(a.as_matrix().is_square());
    assert_eq!(a.get(1, 1), Ok(4.0));
    assert_eq!(a.get(2, 2), Ok(0.0));
}

#[test]
fn oversized_system_reports_allocation_failure() {
    assert!(matches!(
        RealSquareMatrix::try_new(usize::MAX / 4),
        Err(MatrixError::Allocation { .. })
    ));
    assert_eq!(RealSquareMatrix::try_new(3), Ok(RealSquareMatrix::new(3)));
}
