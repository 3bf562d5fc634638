use cap_thermal::quadrature::univariate::gauss;
use cap_thermal::quadrature::{face_gauss, tensor_gauss, Quadrature};
use matrixcompare::assert_scalar_eq;
use nalgebra::{Point1, Point2, Point3};
use proptest::prelude::*;

/// Exact integral of `x^k` over `[-1, 1]`.
fn monomial_integral(k: i32) -> f64 {
    if k % 2 == 1 {
        0.0
    } else {
        2.0 / (k as f64 + 1.0)
    }
}

#[test]
fn gauss_small_rules_match_known_values() {
    let (weights, points) = gauss::<f64>(1);
    assert_eq!(weights, vec![2.0]);
    assert_scalar_eq!(points[0].x, 0.0, comp = abs, tol = 1e-15);

    let (weights, points) = gauss::<f64>(2);
    let x = 1.0 / 3.0f64.sqrt();
    assert_scalar_eq!(weights[0], 1.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(weights[1], 1.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(points[0].x.abs(), x, comp = abs, tol = 1e-14);
    assert_scalar_eq!(points[0].x + points[1].x, 0.0, comp = abs, tol = 1e-14);

    let (weights, points) = gauss::<f64>(3);
    let mut sorted: Vec<_> = weights.iter().copied().zip(points.iter().map(|p| p.x)).collect();
    sorted.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
    assert_scalar_eq!(sorted[0].0, 5.0 / 9.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(sorted[1].0, 8.0 / 9.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(sorted[0].1, -(0.6f64.sqrt()), comp = abs, tol = 1e-14);
    assert_scalar_eq!(sorted[1].1, 0.0, comp = abs, tol = 1e-14);
}

#[test]
fn rules_agree_with_fenris_quadrature() {
    let (weights, points) = gauss::<f64>(4);
    let (expected_weights, expected_points) = fenris_quadrature::univariate::gauss(4);
    assert_eq!(weights, expected_weights);
    let points: Vec<_> = points.iter().map(|p| [p.x]).collect();
    assert_eq!(points, expected_points);

    let (weights, points) = tensor_gauss::<f64, 2>(3);
    let (expected_weights, expected_points) = fenris_quadrature::tensor::quadrilateral_gauss(3);
    assert_eq!(weights, expected_weights);
    let points: Vec<_> = points.iter().map(|p| [p.x, p.y]).collect();
    assert_eq!(points, expected_points);

    let (weights, points) = tensor_gauss::<f64, 3>(2);
    let (expected_weights, expected_points) = fenris_quadrature::tensor::hexahedron_gauss(2);
    assert_eq!(weights, expected_weights);
    let points: Vec<_> = points.iter().map(|p| [p.x, p.y, p.z]).collect();
    assert_eq!(points, expected_points);

    let rule = face_gauss::<f64>(2, 2);
    let (expected_weights, expected_points) = fenris_quadrature::tensor::quadrilateral_gauss(2);
    assert_eq!(rule.weights(), expected_weights.as_slice());
    let points: Vec<_> = rule.points().iter().map(|p| [p[0], p[1]]).collect();
    assert_eq!(points, expected_points);
}

#[test]
#[should_panic]
fn tensor_gauss_rejects_unsupported_dimension() {
    let _ = tensor_gauss::<f64, 4>(2);
}

#[test]
#[should_panic]
fn face_gauss_rejects_unsupported_dimension() {
    let _ = face_gauss::<f64>(3, 2);
}

#[test]
#[should_panic]
fn gauss_rejects_zero_points() {
    let _ = gauss::<f64>(0);
}

proptest! {
    #[test]
    fn gauss_integrates_polynomials_exactly((n, k) in (1usize..20).prop_flat_map(|n| (Just(n), 0..2 * n as i32))) {
        let rule = gauss::<f64>(n);
        let integral = rule.integrate(|p: &Point1<f64>| p.x.powi(k));
        let expected = monomial_integral(k);
        prop_assert!((integral - expected).abs() <= 1e-12, "n = {}, k = {}: {} != {}", n, k, integral, expected);
    }
}

#[test]
fn tensor_gauss_2d_integrates_bivariate_polynomials() {
    let rule = tensor_gauss::<f64, 2>(3);
    assert_eq!(rule.len(), 9);
    for a in 0..6 {
        for b in 0..6 {
            let integral = rule.integrate(|p: &Point2<f64>| p.x.powi(a) * p.y.powi(b));
            let expected = monomial_integral(a) * monomial_integral(b);
            assert_scalar_eq!(integral, expected, comp = abs, tol = 1e-13);
        }
    }
}

#[test]
fn tensor_gauss_3d_integrates_trivariate_polynomials() {
    let rule = tensor_gauss::<f64, 3>(2);
    assert_eq!(rule.len(), 8);
    let volume: f64 = rule.weights().iter().sum();
    assert_scalar_eq!(volume, 8.0, comp = abs, tol = 1e-14);
    for a in 0..4 {
        for b in 0..4 {
            for c in 0..4 {
                let integral = rule.integrate(|p: &Point3<f64>| p.x.powi(a) * p.y.powi(b) * p.z.powi(c));
                let expected = monomial_integral(a) * monomial_integral(b) * monomial_integral(c);
                assert_scalar_eq!(integral, expected, comp = abs, tol = 1e-13);
            }
        }
    }
}

#[test]
fn tensor_gauss_varies_first_coordinate_slowest() {
    let (_, points) = tensor_gauss::<f64, 2>(2);
    assert_eq!(points[0].x, points[1].x);
    assert_ne!(points[0].y, points[1].y);
    assert_ne!(points[0].x, points[2].x);
}

#[test]
fn face_gauss_rules() {
    // Faces of 1D cells are points
    let rule = face_gauss::<f64>(0, 3);
    assert_eq!(rule.len(), 1);
    assert_eq!(rule.weights(), &[1.0]);
    assert!(rule.points()[0].is_empty());

    let rule = face_gauss::<f64>(1, 2);
    assert_eq!(rule.len(), 2);
    assert!(rule.points().iter().all(|p| p.len() == 1));
    assert_scalar_eq!(rule.weights().iter().sum::<f64>(), 2.0, comp = abs, tol = 1e-14);

    let rule = face_gauss::<f64>(2, 2);
    assert_eq!(rule.len(), 4);
    assert!(rule.points().iter().all(|p| p.len() == 2));
    assert_scalar_eq!(rule.weights().iter().sum::<f64>(), 4.0, comp = abs, tol = 1e-14);
    let integral: f64 = rule
        .weights()
        .iter()
        .zip(rule.points())
        .map(|(w, p)| w * p[0].powi(2) * p[1].powi(2))
        .sum();
    assert_scalar_eq!(integral, 4.0 / 9.0, comp = abs, tol = 1e-14);
}
