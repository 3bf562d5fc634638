//! Quadrature rules for the one-dimensional domain `[-1, 1]`.
use crate::quadrature::{convert_quadrature_rule_from_f64, QuadraturePair1d};
use crate::Real;
use fenris_quadrature::univariate;

/// Gauss quadrature for the reference interval `[-1, 1]`.
///
/// Given `n` points, the rule integrates polynomials of degree up to `2 n - 1` exactly.
///
/// # Panics
///
/// Panics if zero points are requested.
pub fn gauss<T: Real>(num_points: usize) -> QuadraturePair1d<T> {
    convert_quadrature_rule_from_f64(univariate::gauss(num_points))
}
