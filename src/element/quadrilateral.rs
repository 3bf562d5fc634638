use crate::element::{phi_linear_1d, phi_linear_1d_grad, ElementFaces, FiniteElement};
use crate::Real;
use nalgebra::{Matrix2, Matrix2x4, Point2, Vector2};
use numeric_literals::replace_float_literals;

/// Bilinear Lagrange element on a quadrilateral in two dimensions.
///
/// Nodes are numbered counter-clockwise, matching the reference vertices
/// `(-1, -1), (1, -1), (1, 1), (-1, 1)`. Face `k` connects node `k` and node `k + 1 (mod 4)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Quad4Element<T: Real> {
    vertices: [Point2<T>; 4],
}

#[rustfmt::skip]
const NODE_SIGNS: [[f64; 2]; 4] = [
    [-1.0, -1.0],
    [ 1.0, -1.0],
    [ 1.0,  1.0],
    [-1.0,  1.0],
];

impl<T: Real> Quad4Element<T> {
    pub fn from_vertices(vertices: [Point2<T>; 4]) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point2<T>; 4] {
        &self.vertices
    }

    #[replace_float_literals(T::from_f64(literal).unwrap())]
    pub fn reference() -> Self {
        Self::from_vertices([
            Point2::new(-1.0, -1.0),
            Point2::new(1.0, -1.0),
            Point2::new(1.0, 1.0),
            Point2::new(-1.0, 1.0),
        ])
    }

    fn vertex_matrix(&self) -> Matrix2x4<T> {
        Matrix2x4::from_fn(|i, j| self.vertices[j][i])
    }
}

fn signs<T: Real>(node: usize) -> (T, T) {
    let [alpha, beta] = NODE_SIGNS[node];
    (nalgebra::convert(alpha), nalgebra::convert(beta))
}

impl<T: Real> FiniteElement<T, 2> for Quad4Element<T> {
    fn num_nodes(&self) -> usize {
        4
    }

    fn degree(&self) -> usize {
        1
    }

    fn populate_basis(&self, basis_values: &mut [T], xi: &Point2<T>) {
        assert_eq!(basis_values.len(), 4);
        for (node, phi) in basis_values.iter_mut().enumerate() {
            let (alpha, beta) = signs::<T>(node);
            *phi = phi_linear_1d(alpha, xi[0]) * phi_linear_1d(beta, xi[1]);
        }
    }

    fn populate_basis_gradients(&self, basis_gradients: &mut [Vector2<T>], xi: &Point2<T>) {
        assert_eq!(basis_gradients.len(), 4);
        for (node, grad) in basis_gradients.iter_mut().enumerate() {
            let (alpha, beta) = signs::<T>(node);
            *grad = Vector2::new(
                phi_linear_1d_grad(alpha) * phi_linear_1d(beta, xi[1]),
                phi_linear_1d(alpha, xi[0]) * phi_linear_1d_grad(beta),
            );
        }
    }

    #[allow(non_snake_case)]
    fn reference_jacobian(&self, xi: &Point2<T>) -> Matrix2<T> {
        let mut gradients = [Vector2::zeros(); 4];
        self.populate_basis_gradients(&mut gradients, xi);
        let X = self.vertex_matrix();
        let G = Matrix2x4::from_columns(&gradients);
        X * G.transpose()
    }

    fn map_reference_coords(&self, xi: &Point2<T>) -> Point2<T> {
        let mut basis = [T::zero(); 4];
        self.populate_basis(&mut basis, xi);
        Point2::from(self.vertex_matrix() * nalgebra::Vector4::from(basis))
    }
}

impl<T: Real> ElementFaces<T, 2> for Quad4Element<T> {
    fn num_faces(&self) -> usize {
        4
    }

    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn map_face_reference_coords(&self, face: usize, face_coords: &[T]) -> Point2<T> {
        let s = face_coords[0];
        match face {
            0 => Point2::new(s, -1.0),
            1 => Point2::new(1.0, s),
            2 => Point2::new(-s, 1.0),
            3 => Point2::new(-1.0, -s),
            _ => panic!("face index {} out of bounds for Quad4 element", face),
        }
    }

    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn face_reference_tangents(&self, face: usize) -> Vec<Vector2<T>> {
        let tangent = match face {
            0 => Vector2::new(1.0, 0.0),
            1 => Vector2::new(0.0, 1.0),
            2 => Vector2::new(-1.0, 0.0),
            3 => Vector2::new(0.0, -1.0),
            _ => panic!("face index {} out of bounds for Quad4 element", face),
        };
        vec![tangent]
    }
}
