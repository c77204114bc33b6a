use std::f64::consts::TAU;

use crate::geom::{
    BlendingBasis, BlendingCurve, BlendingFamily, ColumnMatrix, CubicBSplineBasis, CurveError,
    CyclicBasis, EvaluationError, MatrixError, Point3, SolveError, Tolerance, Vec3,
};

fn cyclic_control_points(count: usize) -> Vec<Point3> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            Point3::new(3.0 * (0.7 * t).cos(), 2.0 * (1.3 * t).sin(), 0.5 * t - 1.0)
        })
        .collect()
}

fn arc_control_points() -> [Point3; 4] {
    [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 2.0, 0.5),
        Point3::new(3.0, 2.5, -1.0),
        Point3::new(4.0, 0.0, 2.0),
    ]
}

fn sum(weights: &[f64]) -> f64 {
    weights.iter().sum()
}

#[test]
fn blending_weights_form_a_partition_of_unity() {
    let tol = Tolerance::new(1e-12);
    for order in 1..=6 {
        let basis = CyclicBasis::new(order).unwrap();
        assert_eq!(basis.function_count(), 2 * order + 1);
        for step in 0..=20 {
            let u = TAU * f64::from(step) / 20.0;
            let weights = basis.blending_weights(u).unwrap();
            assert!(tol.approx_eq_f64(sum(weights.as_slice()), 1.0), "order {order}, u {u}");
        }
    }

    let bspline = BlendingFamily::cubic_bspline();
    for step in 0..=10 {
        let u = f64::from(step) / 10.0;
        let weights = bspline.blending_weights(u).unwrap();
        assert!(tol.approx_eq_f64(sum(weights.as_slice()), 1.0), "u {u}");
    }
}

#[test]
fn cyclic_order_four_matches_closed_form() {
    let points = cyclic_control_points(9);
    let curve = BlendingCurve::cyclic(4, points.clone()).unwrap();
    let basis = CyclicBasis::new(4).unwrap();
    let c4 = 1.0 / 3.0 * 2.0 / 5.0 * 3.0 / 7.0 * 4.0 / 9.0;
    let lambda = TAU / 9.0;
    let tol = Tolerance::new(1e-12);

    assert!(tol.approx_eq_f64(basis.normalizing_constant(), c4));
    assert!(tol.approx_eq_f64(basis.phase_change(), lambda));
    assert_eq!(basis.binomial(8, 4), Some(70.0));

    for u in [0.0, 0.4, 2.5, TAU] {
        let expected = points
            .iter()
            .enumerate()
            .fold(Vec3::ZERO, |acc, (i, p)| {
                let w = c4 * (1.0 + (u - i as f64 * lambda).cos()).powi(4);
                acc + p.to_vec3() * w
            })
            .to_point3();

        let from_weights = curve.point_at(u).unwrap();
        let from_derivatives = curve.derivatives(0, u).unwrap().position();
        assert!(tol.approx_eq_point3(from_weights, expected), "u {u}");
        assert!(tol.approx_eq_point3(from_derivatives, expected), "u {u}");
    }
}

#[test]
fn cyclic_curve_averages_to_the_centroid() {
    let points = cyclic_control_points(7);
    let curve = BlendingCurve::cyclic(3, points.clone()).unwrap();
    let centroid = Point3::centroid(&points).unwrap();

    // Non-constant terms have frequency <= 3 and cancel over 7 equally spaced samples.
    let lambda = TAU / 7.0;
    for offset in [0.0, 0.3] {
        let mean = (0..7)
            .map(|k| curve.point_at(offset + f64::from(k) * lambda).unwrap().to_vec3())
            .fold(Vec3::ZERO, |acc, v| acc + v)
            / 7.0;
        assert!(Tolerance::new(1e-12).approx_eq_point3(mean.to_point3(), centroid));
    }
}

#[test]
fn bspline_boundary_weights_match_direct_substitution() {
    assert_eq!(
        CubicBSplineBasis::weights_at(0.0),
        [1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0, 0.0]
    );
    assert_eq!(
        CubicBSplineBasis::weights_at(1.0),
        [0.0, 1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0]
    );

    let curve = BlendingCurve::cubic_bspline_arc(arc_control_points()).unwrap();
    let weights = curve.blending_weights(0.0).unwrap();
    assert_eq!(weights.as_slice(), &CubicBSplineBasis::weights_at(0.0));
}

#[test]
fn bspline_rejects_second_order_derivatives() {
    let curve = BlendingCurve::cubic_bspline_arc(arc_control_points()).unwrap();

    assert!(curve.derivatives(1, 0.5).is_ok());
    assert_eq!(
        curve.derivatives(2, 0.5),
        Err(CurveError::Evaluation(EvaluationError::UnsupportedDerivativeOrder {
            requested: 2,
            supported: 1,
        }))
    );
    assert!(matches!(
        curve.generate_image(2, 5),
        Err(CurveError::Evaluation(EvaluationError::UnsupportedDerivativeOrder { .. }))
    ));
}

#[test]
fn parameters_outside_the_domain_fail_without_clamping() {
    let arc = BlendingCurve::cubic_bspline_arc(arc_control_points()).unwrap();
    for u in [-0.1, 1.1] {
        assert!(arc.point_at(u).unwrap_err().is_domain_violation());
        assert!(arc.derivatives(1, u).unwrap_err().is_domain_violation());
        assert!(arc.blending_weights(u).unwrap_err().is_domain_violation());
    }
    assert!(arc.point_at(0.0).is_ok());
    assert!(arc.point_at(1.0).is_ok());

    let cyclic = BlendingCurve::cyclic(2, cyclic_control_points(5)).unwrap();
    for u in [-0.1 * TAU, 1.1 * TAU] {
        assert!(matches!(
            cyclic.point_at(u),
            Err(CurveError::Evaluation(EvaluationError::DomainViolation { .. }))
        ));
    }
    assert!(cyclic.point_at(TAU).is_ok());
}

#[test]
fn analytic_derivatives_match_finite_differences() {
    let cyclic = BlendingCurve::cyclic(2, cyclic_control_points(5)).unwrap();
    let u = 1.0;
    let h = 1e-5;
    let d = cyclic.derivatives(3, u).unwrap();
    assert_eq!(d.max_order(), 3);

    let p = |t: f64| cyclic.point_at(t).unwrap();
    let first = (p(u + h) - p(u - h)) / (2.0 * h);
    assert!(Tolerance::new(1e-6).approx_eq_vec3(d.get(1).unwrap(), first));

    let h2 = 1e-4;
    let second = (p(u + h2).to_vec3() - p(u).to_vec3() * 2.0 + p(u - h2).to_vec3()) / (h2 * h2);
    assert!(Tolerance::new(1e-4).approx_eq_vec3(d.get(2).unwrap(), second));

    let d2 = |t: f64| cyclic.derivatives(2, t).unwrap().get(2).unwrap();
    let third = (d2(u + h) - d2(u - h)) / (2.0 * h);
    assert!(Tolerance::new(1e-5).approx_eq_vec3(d.get(3).unwrap(), third));

    let arc = BlendingCurve::cubic_bspline_arc(arc_control_points()).unwrap();
    for u in [0.1, 0.4, 0.9] {
        let q = |t: f64| arc.point_at(t).unwrap();
        let fd = (q(u + h) - q(u - h)) / (2.0 * h);
        let analytic = arc.derivatives(1, u).unwrap().get(1).unwrap();
        assert!(Tolerance::new(1e-6).approx_eq_vec3(analytic, fd), "u {u}");
    }
}

#[test]
fn generate_image_samples_the_whole_domain() {
    let curve = BlendingCurve::cyclic(1, cyclic_control_points(3)).unwrap();
    let image = curve.generate_image(1, 9).unwrap();

    assert_eq!(image.sample_count(), 9);
    assert_eq!(image.max_order(), 1);
    assert_eq!(image.parameters.first().copied(), Some(0.0));
    assert_eq!(image.parameters.last().copied(), Some(TAU));

    let positions = image.positions();
    let tangents = image.derivative(1).unwrap();
    assert_eq!(positions.len(), 9);
    assert_eq!(tangents.len(), 9);
    for (s, &u) in image.parameters.iter().enumerate() {
        assert!(Tolerance::new(1e-12).approx_eq_point3(positions[s], curve.point_at(u).unwrap()));
        assert_eq!(Some(tangents[s]), curve.derivatives(1, u).unwrap().get(1));
    }

    // closed curve
    assert!(Tolerance::new(1e-12).approx_eq_point3(positions[0], positions[8]));
    assert!(image.derivative(2).is_none());
}

#[test]
fn generate_image_needs_two_points() {
    let curve = BlendingCurve::cubic_bspline_arc(arc_control_points()).unwrap();
    assert_eq!(curve.generate_image(0, 1), Err(CurveError::InvalidDivisionCount(1)));
    assert_eq!(curve.generate_image(0, 0), Err(CurveError::InvalidDivisionCount(0)));

    let image = curve.generate_image(0, 2).unwrap();
    assert_eq!(image.parameters, vec![0.0, 1.0]);
}

#[test]
fn construction_checks_control_point_count_and_order() {
    assert_eq!(
        BlendingCurve::cyclic(2, cyclic_control_points(4)),
        Err(CurveError::ShapeMismatch {
            what: "control points",
            expected: 5,
            found: 4,
        })
    );
    assert_eq!(
        BlendingCurve::cyclic(0, Vec::new()),
        Err(CurveError::Evaluation(EvaluationError::InvalidOrder(0)))
    );
}

#[test]
fn interpolation_passes_through_data_at_knots() {
    let tol = Tolerance::new(1e-9);

    let mut cyclic = BlendingCurve::cyclic(4, cyclic_control_points(9)).unwrap();
    let lambda = TAU / 9.0;
    let knots = ColumnMatrix::from_vec((0..9).map(|i| f64::from(i) * lambda).collect());
    let data = ColumnMatrix::from_vec(
        (0..9)
            .map(|i| {
                let t = f64::from(i);
                Point3::new(t, (t * 0.5).sin(), t * t * 0.1)
            })
            .collect(),
    );
    cyclic.update_data_for_interpolation(&knots, &data).unwrap();
    for (knot, expected) in knots.iter().zip(data.iter()) {
        assert!(tol.approx_eq_point3(cyclic.point_at(*knot).unwrap(), *expected));
    }

    let mut arc = BlendingCurve::cubic_bspline_arc(arc_control_points()).unwrap();
    let knots = ColumnMatrix::from_vec(vec![0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0]);
    let data = ColumnMatrix::from_vec(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(2.0, 0.0, 1.0),
        Point3::new(3.0, -1.0, 0.0),
    ]);
    arc.update_data_for_interpolation(&knots, &data).unwrap();
    for (knot, expected) in knots.iter().zip(data.iter()) {
        assert!(tol.approx_eq_point3(arc.point_at(*knot).unwrap(), *expected));
    }
}

#[test]
fn failed_interpolation_keeps_control_points() {
    let mut arc = BlendingCurve::cubic_bspline_arc(arc_control_points()).unwrap();
    let before = arc.control_points().clone();
    let data = ColumnMatrix::from_vec(vec![Point3::ORIGIN; 4]);

    let repeated = ColumnMatrix::from_vec(vec![0.0, 0.5, 0.5, 1.0]);
    assert!(matches!(
        arc.update_data_for_interpolation(&repeated, &data),
        Err(CurveError::Solve(SolveError::Singular { .. }))
    ));

    let short = ColumnMatrix::from_vec(vec![0.0, 0.5, 1.0]);
    assert_eq!(
        arc.update_data_for_interpolation(&short, &data),
        Err(CurveError::ShapeMismatch {
            what: "knot vector",
            expected: 4,
            found: 3,
        })
    );

    let outside = ColumnMatrix::from_vec(vec![0.0, 0.5, 1.0, 1.5]);
    assert!(
        arc.update_data_for_interpolation(&outside, &data)
            .unwrap_err()
            .is_domain_violation()
    );

    assert_eq!(arc.control_points(), &before);
}

#[test]
fn unbounded_cyclic_orders_fail_instead_of_overflowing() {
    let curve = BlendingCurve::cyclic(2, cyclic_control_points(5)).unwrap();

    assert_eq!(
        curve.derivatives(usize::MAX, 0.5),
        Err(CurveError::Evaluation(EvaluationError::UnsupportedDerivativeOrder {
            requested: usize::MAX,
            supported: usize::MAX - 1,
        }))
    );
    assert!(matches!(
        curve.derivatives(usize::MAX / 2, 0.5),
        Err(CurveError::Evaluation(EvaluationError::Matrix(MatrixError::Allocation { .. })))
    ));
    assert!(matches!(
        curve.generate_image(usize::MAX / 2, 3),
        Err(CurveError::Matrix(MatrixError::Allocation { .. }))
    ));
}

#[test]
fn oversized_cyclic_order_is_rejected() {
    assert_eq!(
        CyclicBasis::new(usize::MAX).map(|_| ()),
        Err(EvaluationError::InvalidOrder(usize::MAX))
    );
    assert!(matches!(
        BlendingCurve::cyclic(usize::MAX / 4, Vec::new()),
        Err(CurveError::Evaluation(EvaluationError::Matrix(MatrixError::Allocation { .. })))
    ));
}
