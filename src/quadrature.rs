//! Quadrature rules on the reference domains of quadrilaterals and hexahedra.
use crate::Real;
use nalgebra::{convert, Point, SVector};
use num::Zero;
use std::ops::{AddAssign, Mul};

pub mod tensor;
pub mod univariate;

pub use tensor::{face_gauss, tensor_gauss, FaceQuadrature};

/// Weights and points of a quadrature rule in `D` dimensions.
pub type QuadraturePair<T, const D: usize> = (Vec<T>, Vec<Point<T, D>>);
pub type QuadraturePair1d<T> = QuadraturePair<T, 1>;
pub type QuadraturePair2d<T> = QuadraturePair<T, 2>;
pub type QuadraturePair3d<T> = QuadraturePair<T, 3>;

/// A quadrature rule consisting of weights and points.
pub trait Quadrature<T, const D: usize>
where
    T: Real,
{
    fn weights(&self) -> &[T];
    fn points(&self) -> &[Point<T, D>];

    fn len(&self) -> usize {
        self.weights().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Approximates the integral of the given function using this quadrature rule.
    fn integrate<U, Function>(&self, f: Function) -> U
    where
        Function: Fn(&Point<T, D>) -> U,
        U: Zero + Mul<T, Output = U> + AddAssign<U>,
    {
        let mut integral = U::zero();
        for (w, p) in self.weights().iter().zip(self.points()) {
            integral += f(p) * *w;
        }
        integral
    }
}

impl<T, A, B, const D: usize> Quadrature<T, D> for (A, B)
where
    T: Real,
    A: AsRef<[T]>,
    B: AsRef<[Point<T, D>]>,
{
    fn weights(&self) -> &[T] {
        self.0.as_ref()
    }

    fn points(&self) -> &[Point<T, D>] {
        self.1.as_ref()
    }
}

impl<T, X, const D: usize> Quadrature<T, D> for &X
where
    T: Real,
    X: Quadrature<T, D>,
{
    fn weights(&self) -> &[T] {
        X::weights(self)
    }

    fn points(&self) -> &[Point<T, D>] {
        X::points(self)
    }
}

/// Converts a double precision rule on `[-1, 1]^K` to a rule with points in `D` dimensions.
///
/// # Panics
///
/// Panics if `K` and `D` differ.
pub(crate) fn convert_quadrature_rule_from_f64<T, const K: usize, const D: usize>(
    quadrature: fenris_quadrature::Rule<K>,
) -> QuadraturePair<T, D>
where
    T: Real,
{
    assert_eq!(K, D, "quadrature rule dimension must match the point dimension");
    let (weights, points) = quadrature;
    let weights = weights.into_iter().map(convert).collect();
    let points = points
        .into_iter()
        .map(|p| Point::from(SVector::<T, D>::from_iterator(p.into_iter().map(convert))))
        .collect();
    (weights, points)
}
