//! Lagrange finite elements on quadrilaterals and hexahedra.
use crate::Real;
use nalgebra::{Const, DMatrix, DimMin, Point, SMatrix, SVector};
use numeric_literals::replace_float_literals;

mod hexahedron;
mod quadrilateral;

pub use hexahedron::Hex8Element;
pub use quadrilateral::Quad4Element;

/// A finite element mapped from the reference domain `[-1, 1]^D` to physical space.
pub trait FiniteElement<T: Real, const D: usize> {
    /// Returns the number of nodes in the element.
    fn num_nodes(&self) -> usize;

    /// Polynomial degree of the basis in each reference direction.
    fn degree(&self) -> usize;

    /// Evaluates each basis function at the given reference coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `basis_values` does not have exactly one entry per node.
    fn populate_basis(&self, basis_values: &mut [T], reference_coords: &Point<T, D>);

    /// Evaluates the gradient of each basis function with respect to the reference coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `basis_gradients` does not have exactly one entry per node.
    fn populate_basis_gradients(&self, basis_gradients: &mut [SVector<T, D>], reference_coords: &Point<T, D>);

    /// Jacobian of the map from reference to physical coordinates.
    fn reference_jacobian(&self, reference_coords: &Point<T, D>) -> SMatrix<T, D, D>;

    /// Maps reference coordinates to physical coordinates.
    fn map_reference_coords(&self, reference_coords: &Point<T, D>) -> Point<T, D>;
}

/// Access to the faces of the reference cell of an element.
///
/// Faces are parametrized by coordinates in `[-1, 1]^(D - 1)`. The face numbering agrees with
/// the face numbering of the corresponding cell connectivity.
pub trait ElementFaces<T: Real, const D: usize>: FiniteElement<T, D> {
    fn num_faces(&self) -> usize;

    /// Maps coordinates on the reference face to reference coordinates of the cell.
    ///
    /// # Panics
    ///
    /// Panics if the face index is out of bounds.
    fn map_face_reference_coords(&self, face: usize, face_coords: &[T]) -> Point<T, D>;

    /// Derivatives of the face map with respect to each face coordinate.
    fn face_reference_tangents(&self, face: usize) -> Vec<SVector<T, D>>;
}

/// Linear Lagrange basis on `[-1, 1]` associated with the node at `alpha = ±1`.
#[replace_float_literals(T::from_f64(literal).unwrap())]
pub(crate) fn phi_linear_1d<T: Real>(alpha: T, xi: T) -> T {
    (1.0 + alpha * xi) / 2.0
}

#[replace_float_literals(T::from_f64(literal).unwrap())]
pub(crate) fn phi_linear_1d_grad<T: Real>(alpha: T) -> T {
    alpha / 2.0
}

/// Determinant of a (small) Jacobian matrix.
pub fn jacobian_determinant<T: Real, const D: usize>(jacobian: &SMatrix<T, D, D>) -> T
where
    Const<D>: DimMin<Const<D>, Output = Const<D>>,
{
    jacobian.determinant()
}

/// Inverse of a Jacobian matrix, or `None` if the matrix is singular.
pub fn try_invert_jacobian<T: Real, const D: usize>(jacobian: &SMatrix<T, D, D>) -> Option<SMatrix<T, D, D>>
where
    Const<D>: DimMin<Const<D>, Output = Const<D>>,
{
    jacobian.try_inverse()
}

/// Area element `sqrt(det(G^T G))` of a face, where `G = J * [t_1, ..., t_{D-1}]`.
pub fn face_measure<T: Real, const D: usize>(jacobian: &SMatrix<T, D, D>, tangents: &[SVector<T, D>]) -> T {
    match tangents {
        [] => T::one(),
        [t] => (jacobian * t).norm(),
        [t1, t2] => {
            let (a, b) = (jacobian * t1, jacobian * t2);
            let ab = a.dot(&b);
            (a.norm_squared() * b.norm_squared() - ab * ab)
                .max(T::zero())
                .sqrt()
        }
        _ => {
            let mapped: Vec<_> = tangents.iter().map(|t| jacobian * t).collect();
            let g = DMatrix::from_fn(D, mapped.len(), |i, k| mapped[k][i]);
            (g.transpose() * g).determinant().abs().sqrt()
        }
    }
}
