//! Quadrature rules formed as tensor products of 1D Gauss rules.
use crate::quadrature::{convert_quadrature_rule_from_f64, QuadraturePair};
use crate::Real;
use fenris_quadrature::{tensor, univariate};
use nalgebra::convert;

/// A quadrature rule whose dimension is only known at runtime.
///
/// Used for the faces of reference cells, which have one dimension less than the cell.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceQuadrature<T> {
    weights: Vec<T>,
    points: Vec<Vec<T>>,
}

impl<T: Real> FaceQuadrature<T> {
    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    /// Points in the reference face coordinates `[-1, 1]^(D - 1)`.
    pub fn points(&self) -> &[Vec<T>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    fn from_f64_rule<const K: usize>((weights, points): fenris_quadrature::Rule<K>) -> Self {
        Self {
            weights: weights.into_iter().map(convert).collect(),
            points: points
                .into_iter()
                .map(|p| p.iter().map(|&x| convert(x)).collect())
                .collect(),
        }
    }
}

/// A Gauss quadrature rule for the reference cell `[-1, 1]^D`.
///
/// The rule is constructed as a tensor product from 1D rules, with the provided number of
/// points per dimension. The first coordinate varies slowest.
///
/// # Panics
///
/// Panics if `D` is not 1, 2 or 3, or if zero points are requested.
pub fn tensor_gauss<T: Real, const D: usize>(num_points_per_dim: usize) -> QuadraturePair<T, D> {
    let n = num_points_per_dim;
    match D {
        1 => convert_quadrature_rule_from_f64(univariate::gauss(n)),
        2 => convert_quadrature_rule_from_f64(tensor::quadrilateral_gauss(n)),
        3 => convert_quadrature_rule_from_f64(tensor::hexahedron_gauss(n)),
        _ => panic!("tensor Gauss rules are only available in 1, 2 and 3 dimensions, not {}", D),
    }
}

/// A Gauss quadrature rule for the reference face `[-1, 1]^face_dim`.
///
/// A face of dimension zero is a single point with unit weight.
///
/// # Panics
///
/// Panics if `face_dim` is larger than 2, or if zero points are requested.
pub fn face_gauss<T: Real>(face_dim: usize, num_points_per_dim: usize) -> FaceQuadrature<T> {
    let n = num_points_per_dim;
    match face_dim {
        0 => FaceQuadrature::from_f64_rule::<0>((vec![1.0], vec![[]])),
        1 => FaceQuadrature::from_f64_rule(univariate::gauss(n)),
        2 => FaceQuadrature::from_f64_rule(tensor::quadrilateral_gauss(n)),
        _ => panic!("face Gauss rules are only available in up to 2 dimensions, not {}", face_dim),
    }
}
