use crate::element::{phi_linear_1d, phi_linear_1d_grad, ElementFaces, FiniteElement};
use crate::Real;
use nalgebra::{Matrix3, OMatrix, Point3, SVector, Vector3, U3, U8};
use numeric_literals::replace_float_literals;

/// Trilinear Lagrange element on a hexahedron.
///
/// The first four nodes are the counter-clockwise vertices of the bottom face `zeta = -1`, the
/// last four the corresponding vertices of the top face `zeta = 1`. Faces follow the numbering of
/// [`Hex8Connectivity`](crate::connectivity::Hex8Connectivity).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Hex8Element<T: Real> {
    vertices: [Point3<T>; 8],
}

#[rustfmt::skip]
const NODE_SIGNS: [[f64; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0],
    [ 1.0,  1.0, -1.0],
    [-1.0,  1.0, -1.0],
    [-1.0, -1.0,  1.0],
    [ 1.0, -1.0,  1.0],
    [ 1.0,  1.0,  1.0],
    [-1.0,  1.0,  1.0],
];

impl<T: Real> Hex8Element<T> {
    pub fn from_vertices(vertices: [Point3<T>; 8]) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point3<T>; 8] {
        &self.vertices
    }

    pub fn reference() -> Self {
        Self::from_vertices(NODE_SIGNS.map(|[x, y, z]| Point3::new(x, y, z).map(nalgebra::convert)))
    }

    fn vertex_matrix(&self) -> OMatrix<T, U3, U8> {
        OMatrix::<T, U3, U8>::from_fn(|i, j| self.vertices[j][i])
    }
}

fn signs<T: Real>(node: usize) -> [T; 3] {
    NODE_SIGNS[node].map(nalgebra::convert)
}

impl<T: Real> FiniteElement<T, 3> for Hex8Element<T> {
    fn num_nodes(&self) -> usize {
        8
    }

    fn degree(&self) -> usize {
        1
    }

    fn populate_basis(&self, basis_values: &mut [T], xi: &Point3<T>) {
        assert_eq!(basis_values.len(), 8);
        for (node, phi) in basis_values.iter_mut().enumerate() {
            let [alpha, beta, gamma] = signs::<T>(node);
            *phi = phi_linear_1d(alpha, xi[0]) * phi_linear_1d(beta, xi[1]) * phi_linear_1d(gamma, xi[2]);
        }
    }

    fn populate_basis_gradients(&self, basis_gradients: &mut [Vector3<T>], xi: &Point3<T>) {
        assert_eq!(basis_gradients.len(), 8);
        for (node, grad) in basis_gradients.iter_mut().enumerate() {
            let [alpha, beta, gamma] = signs::<T>(node);
            let (phi_x, phi_y, phi_z) = (
                phi_linear_1d(alpha, xi[0]),
                phi_linear_1d(beta, xi[1]),
                phi_linear_1d(gamma, xi[2]),
            );
            *grad = Vector3::new(
                phi_linear_1d_grad(alpha) * phi_y * phi_z,
                phi_x * phi_linear_1d_grad(beta) * phi_z,
                phi_x * phi_y * phi_linear_1d_grad(gamma),
            );
        }
    }

    #[allow(non_snake_case)]
    fn reference_jacobian(&self, xi: &Point3<T>) -> Matrix3<T> {
        let mut gradients = [Vector3::zeros(); 8];
        self.populate_basis_gradients(&mut gradients, xi);
        let X = self.vertex_matrix();
        let G = OMatrix::<T, U3, U8>::from_columns(&gradients);
        X * G.transpose()
    }

    fn map_reference_coords(&self, xi: &Point3<T>) -> Point3<T> {
        let mut basis = [T::zero(); 8];
        self.populate_basis(&mut basis, xi);
        Point3::from(self.vertex_matrix() * SVector::<T, 8>::from(basis))
    }
}

impl<T: Real> ElementFaces<T, 3> for Hex8Element<T> {
    fn num_faces(&self) -> usize {
        6
    }

    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn map_face_reference_coords(&self, face: usize, face_coords: &[T]) -> Point3<T> {
        let (s, t) = (face_coords[0], face_coords[1]);
        match face {
            0 => Point3::new(s, t, -1.0),
            1 => Point3::new(s, -1.0, t),
            2 => Point3::new(1.0, s, t),
            3 => Point3::new(s, 1.0, t),
            4 => Point3::new(-1.0, s, t),
            5 => Point3::new(s, t, 1.0),
            _ => panic!("face index {} out of bounds for Hex8 element", face),
        }
    }

    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn face_reference_tangents(&self, face: usize) -> Vec<Vector3<T>> {
        let (e_x, e_y, e_z) = (
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        );
        match face {
            0 | 5 => vec![e_x, e_y],
            1 | 3 => vec![e_x, e_z],
            2 | 4 => vec![e_y, e_z],
            _ => panic!("face index {} out of bounds for Hex8 element", face),
        }
    }
}
