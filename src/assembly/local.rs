//! Shape function evaluation and element matrices of the heat equation.
use crate::element::{face_measure, jacobian_determinant, try_invert_jacobian, ElementFaces, FiniteElement};
use crate::error::ThermalError;
use crate::quadrature::{FaceQuadrature, QuadraturePair};
use crate::Real;
use itertools::izip;
use nalgebra::{Const, DMatrix, DVector, DimMin, Point, SVector};

/// Values of the element basis at the quadrature points of a cell or a face.
pub trait ShapeValues<T: Real, const D: usize> {
    fn n_nodes(&self) -> usize;
    fn n_quadrature_points(&self) -> usize;
    fn shape_value(&self, node: usize, q: usize) -> T;
    /// Quadrature weight times the Jacobian determinant (or the face area element).
    fn jxw(&self, q: usize) -> T;
    /// Physical quadrature points.
    fn quadrature_points(&self) -> &[Point<T, D>];
}

/// Basis values, physical gradients and integration weights on a cell.
///
/// Created once for a quadrature rule, then re-initialized for every cell.
#[derive(Debug, Clone)]
pub struct CellValues<T: Real, const D: usize> {
    quadrature: QuadraturePair<T, D>,
    n_nodes: usize,
    // Point-major: entry `q * n_nodes + node`
    values: Vec<T>,
    gradients: Vec<SVector<T, D>>,
    jxw: Vec<T>,
    points: Vec<Point<T, D>>,
    reference_gradients: Vec<SVector<T, D>>,
}

impl<T: Real, const D: usize> CellValues<T, D> {
    pub fn new(quadrature: QuadraturePair<T, D>) -> Self {
        Self {
            quadrature,
            n_nodes: 0,
            values: Vec::new(),
            gradients: Vec::new(),
            jxw: Vec::new(),
            points: Vec::new(),
            reference_gradients: Vec::new(),
        }
    }

    /// Evaluates the basis of `element` at the quadrature points.
    ///
    /// Returns a topology error if the element's Jacobian is singular at a quadrature point.
    pub fn reinit<E>(&mut self, element: &E, cell_index: usize) -> Result<(), ThermalError>
    where
        E: FiniteElement<T, D>,
        Const<D>: DimMin<Const<D>, Output = Const<D>>,
    {
        let n = element.num_nodes();
        let (weights, points) = &self.quadrature;
        let n_q = weights.len();
        self.n_nodes = n;
        self.values.resize(n_q * n, T::zero());
        self.gradients.resize(n_q * n, SVector::zeros());
        self.reference_gradients.resize(n, SVector::zeros());
        self.jxw.clear();
        self.points.clear();

        for (q, (w, xi)) in weights.iter().zip(points).enumerate() {
            let jacobian = element.reference_jacobian(xi);
            let det = jacobian_determinant(&jacobian);
            let inverse = try_invert_jacobian(&jacobian)
                .filter(|_| det != T::zero())
                .ok_or_else(|| ThermalError::topology(format!("cell {} has a singular Jacobian", cell_index)))?;
            let inverse_transpose = inverse.transpose();

            element.populate_basis(&mut self.values[q * n..(q + 1) * n], xi);
            element.populate_basis_gradients(&mut self.reference_gradients, xi);
            for (grad, ref_grad) in self.gradients[q * n..(q + 1) * n]
                .iter_mut()
                .zip(&self.reference_gradients)
            {
                *grad = inverse_transpose * ref_grad;
            }

            self.jxw.push(det.abs() * *w);
            self.points.push(element.map_reference_coords(xi));
        }
        Ok(())
    }

    /// Gradient of the basis function of `node` with respect to physical coordinates.
    pub fn shape_gradient(&self, node: usize, q: usize) -> &SVector<T, D> {
        &self.gradients[q * self.n_nodes + node]
    }
}

impl<T: Real, const D: usize> ShapeValues<T, D> for CellValues<T, D> {
    fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    fn n_quadrature_points(&self) -> usize {
        self.jxw.len()
    }

    fn shape_value(&self, node: usize, q: usize) -> T {
        self.values[q * self.n_nodes + node]
    }

    fn jxw(&self, q: usize) -> T {
        self.jxw[q]
    }

    fn quadrature_points(&self) -> &[Point<T, D>] {
        &self.points
    }
}

/// Basis values and integration weights on a face of a cell.
#[derive(Debug, Clone)]
pub struct FaceValues<T: Real, const D: usize> {
    quadrature: FaceQuadrature<T>,
    n_nodes: usize,
    values: Vec<T>,
    jxw: Vec<T>,
    points: Vec<Point<T, D>>,
}

impl<T: Real, const D: usize> FaceValues<T, D> {
    pub fn new(quadrature: FaceQuadrature<T>) -> Self {
        Self {
            quadrature,
            n_nodes: 0,
            values: Vec::new(),
            jxw: Vec::new(),
            points: Vec::new(),
        }
    }

    /// Evaluates the cell basis of `element` at the quadrature points of face `face_index`.
    pub fn reinit<E>(&mut self, element: &E, face_index: usize) -> Result<(), ThermalError>
    where
        E: ElementFaces<T, D>,
    {
        if face_index >= element.num_faces() {
            return Err(ThermalError::topology(format!(
                "face {} is out of bounds for an element with {} faces",
                face_index,
                element.num_faces()
            )));
        }

        let n = element.num_nodes();
        let n_q = self.quadrature.len();
        let tangents = element.face_reference_tangents(face_index);
        self.n_nodes = n;
        self.values.resize(n_q * n, T::zero());
        self.jxw.clear();
        self.points.clear();

        for (q, (w, face_coords)) in self
            .quadrature
            .weights()
            .iter()
            .zip(self.quadrature.points())
            .enumerate()
        {
            let xi = element.map_face_reference_coords(face_index, face_coords);
            let jacobian = element.reference_jacobian(&xi);
            element.populate_basis(&mut self.values[q * n..(q + 1) * n], &xi);
            self.jxw.push(face_measure(&jacobian, &tangents) * *w);
            self.points.push(element.map_reference_coords(&xi));
        }
        Ok(())
    }
}

impl<T: Real, const D: usize> ShapeValues<T, D> for FaceValues<T, D> {
    fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    fn n_quadrature_points(&self) -> usize {
        self.jxw.len()
    }

    fn shape_value(&self, node: usize, q: usize) -> T {
        self.values[q * self.n_nodes + node]
    }

    fn jxw(&self, q: usize) -> T {
        self.jxw[q]
    }

    fn quadrature_points(&self) -> &[Point<T, D>] {
        &self.points
    }
}

/// View of a single scalar component of a multi-field cell space.
///
/// Cell-local DOF `i` belongs to component `i % n_components` at node `i / n_components`.
/// Shape functions of DOFs of other components are zero when seen through the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldView {
    component: usize,
    n_components: usize,
}

impl FieldView {
    pub fn new(component: usize, n_components: usize) -> Self {
        assert!(component < n_components, "component must be smaller than the number of components");
        Self {
            component,
            n_components,
        }
    }

    pub fn component(&self) -> usize {
        self.component
    }

    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Number of system DOFs on a cell with `n_nodes` nodes.
    pub fn dofs_per_cell(&self, n_nodes: usize) -> usize {
        n_nodes * self.n_components
    }

    fn node_of(&self, local_dof: usize) -> Option<usize> {
        (local_dof % self.n_components == self.component).then(|| local_dof / self.n_components)
    }

    pub fn value<V, T, const D: usize>(&self, values: &V, local_dof: usize, q: usize) -> T
    where
        T: Real,
        V: ShapeValues<T, D>,
    {
        self.node_of(local_dof)
            .map(|node| values.shape_value(node, q))
            .unwrap_or_else(T::zero)
    }

    pub fn gradient<T: Real, const D: usize>(
        &self,
        values: &CellValues<T, D>,
        local_dof: usize,
        q: usize,
    ) -> SVector<T, D> {
        self.node_of(local_dof)
            .map(|node| *values.shape_gradient(node, q))
            .unwrap_or_else(SVector::zeros)
    }
}

fn check_quadrature_data<T>(name: &str, data: &[T], n_q: usize) {
    assert_eq!(data.len(), n_q, "{} must have one value per quadrature point", name);
}

fn check_square<T: Real>(name: &str, matrix: &DMatrix<T>, n: usize) {
    assert_eq!(matrix.shape(), (n, n), "{} must be {}x{}", name, n, n);
}

/// Accumulates the diffusion and capacity element matrices over all system DOFs of a cell:
///
/// `stiffness[(i, j)] += k(q) * grad phi_i(q) . grad phi_j(q) * JxW(q)` and
/// `mass[(i, j)] += c(q) * phi_i(q) * phi_j(q) * JxW(q)`.
///
/// # Panics
///
/// Panics if the matrix sizes do not match the number of system DOFs, or the coefficients
/// do not have one value per quadrature point.
pub fn assemble_cell_diffusion_and_capacity<T: Real, const D: usize>(
    stiffness: &mut DMatrix<T>,
    mass: &mut DMatrix<T>,
    values: &CellValues<T, D>,
    field: &FieldView,
    conductivity: &[T],
    capacity: &[T],
) {
    let n_q = values.n_quadrature_points();
    let n_dofs = field.dofs_per_cell(values.n_nodes());
    check_square("stiffness matrix", stiffness, n_dofs);
    check_square("mass matrix", mass, n_dofs);
    check_quadrature_data("conductivity", conductivity, n_q);
    check_quadrature_data("capacity", capacity, n_q);

    for (q, &k, &c) in izip!(0..n_q, conductivity, capacity) {
        let jxw = values.jxw(q);
        for i in 0..n_dofs {
            let phi_i = field.value(values, i, q);
            let grad_i = field.gradient(values, i, q);
            for j in 0..n_dofs {
                let phi_j = field.value(values, j, q);
                let grad_j = field.gradient(values, j, q);
                stiffness[(i, j)] += k * grad_i.dot(&grad_j) * jxw;
                mass[(i, j)] += c * phi_i * phi_j * jxw;
            }
        }
    }
}

/// Accumulates the Robin boundary term of a face over all system DOFs of its cell:
///
/// `stiffness[(i, j)] += h(q) * phi_i(q) * phi_j(q) * JxW(q)` and
/// `load[i] += h(q) * T_amb(q) * phi_i(q) * JxW(q)`.
///
/// # Panics
///
/// Panics under the same conditions as [`assemble_cell_diffusion_and_capacity`].
pub fn assemble_face_robin<T: Real, const D: usize>(
    stiffness: &mut DMatrix<T>,
    load: &mut DVector<T>,
    values: &FaceValues<T, D>,
    field: &FieldView,
    heat_transfer_coefficient: &[T],
    ambient_temperature: &[T],
) {
    let n_q = values.n_quadrature_points();
    let n_dofs = field.dofs_per_cell(values.n_nodes());
    check_square("stiffness matrix", stiffness, n_dofs);
    assert_eq!(load.len(), n_dofs, "load vector must have {} entries", n_dofs);
    check_quadrature_data("heat transfer coefficient", heat_transfer_coefficient, n_q);
    check_quadrature_data("ambient temperature", ambient_temperature, n_q);

    for (q, &h, &t_amb) in izip!(0..n_q, heat_transfer_coefficient, ambient_temperature) {
        let jxw = values.jxw(q);
        for i in 0..n_dofs {
            let phi_i = field.value(values, i, q);
            for j in 0..n_dofs {
                let phi_j = field.value(values, j, q);
                stiffness[(i, j)] += h * phi_i * phi_j * jxw;
            }
            load[i] += h * t_amb * phi_i * jxw;
        }
    }
}
