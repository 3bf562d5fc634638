//! Assembly of the thermal operator of a multi-field problem.
use crate::assembly::constraints::ConstraintSet;
use crate::assembly::extract::{shift_indices, ComponentMask, DofExtractor};
use crate::assembly::global::{build_constrained_pattern, zeroed_csr, GlobalMatrix, GlobalVector};
use crate::assembly::local::{
    assemble_cell_diffusion_and_capacity, assemble_face_robin, CellValues, FaceValues, FieldView, ShapeValues,
};
use crate::connectivity::{CellConnectivity, Connectivity};
use crate::element::FiniteElement;
use crate::error::{ProviderErrorKind, ThermalError};
use crate::parameters::ThermalOperatorParameters;
use crate::properties::{
    BoundaryProperties, CellQuadratureContext, FaceQuadratureContext, PropertyError, VolumeProperties,
    AMBIENT_TEMPERATURE, DENSITY_TIMES_HEAT_CAPACITY, HEAT_TRANSFER_COEFFICIENT, THERMAL_CONDUCTIVITY,
};
use crate::quadrature::{face_gauss, tensor_gauss};
use crate::space::DofHandler;
use crate::Real;
use log::{debug, info, warn};
use nalgebra::{Const, DMatrix, DVector, DimMin};
use nalgebra_sparse::CsrMatrix;
use std::collections::BTreeMap;

/// Assembles the stiffness matrix, the mass matrix and the load vector of the temperature
/// field of a multi-field problem.
///
/// The outputs are indexed by the temperature DOFs alone: global DOF `g` of the temperature
/// block corresponds to row `g - dof_shift`, where `dof_shift` is the number of DOFs of all
/// components preceding the temperature. Element contributions are scattered through a
/// [`ConstraintSet`] expressed in this numbering.
///
/// Nothing is assembled on construction. The outputs become available after the first
/// successful [`reset`](Self::reset), and are withdrawn again when a reset fails.
pub struct ThermalOperator<'a, T: Real, const D: usize, C> {
    dof_handler: DofHandler<'a, T, D, C>,
    constraints: &'a ConstraintSet<T>,
    volume_properties: &'a dyn VolumeProperties<T, D>,
    boundary_properties: &'a dyn BoundaryProperties<T, D>,
    temperature_component: usize,
    dof_shift: usize,
    stiffness: CsrMatrix<T>,
    mass: CsrMatrix<T>,
    load: DVector<T>,
    boundary_values: BTreeMap<usize, T>,
    assembled: bool,
}

/// Temperature location and the containers sized for it.
struct TemperatureLayout<T: Real> {
    component: usize,
    dof_shift: usize,
    stiffness: CsrMatrix<T>,
    mass: CsrMatrix<T>,
    load: DVector<T>,
}

impl<'a, T, const D: usize, C> ThermalOperator<'a, T, D, C>
where
    T: Real,
    C: CellConnectivity<T, D>,
    Const<D>: DimMin<Const<D>, Output = Const<D>>,
{
    /// Binds the operator to a DOF space and locates the temperature field in it.
    ///
    /// Returns a configuration error if the parameters do not name a valid component, and a
    /// topology error if the constraints are not closed or do not fit the temperature field.
    pub fn new(
        dof_handler: DofHandler<'a, T, D, C>,
        constraints: &'a ConstraintSet<T>,
        volume_properties: &'a dyn VolumeProperties<T, D>,
        boundary_properties: &'a dyn BoundaryProperties<T, D>,
        parameters: &ThermalOperatorParameters,
    ) -> Result<Self, ThermalError> {
        let layout = locate_temperature(&dof_handler, constraints, parameters)?;
        info!(
            "Thermal operator: temperature component {} of {}, dof shift {}, {} temperature DOFs, {} non-zeros",
            layout.component,
            dof_handler.n_components(),
            layout.dof_shift,
            layout.load.len(),
            layout.stiffness.nnz()
        );

        Ok(Self {
            dof_handler,
            constraints,
            volume_properties,
            boundary_properties,
            temperature_component: layout.component,
            dof_shift: layout.dof_shift,
            stiffness: layout.stiffness,
            mass: layout.mass,
            load: layout.load,
            boundary_values: BTreeMap::new(),
            assembled: false,
        })
    }

    pub fn temperature_component(&self) -> usize {
        self.temperature_component
    }

    /// Index of the first temperature DOF in the numbering of the multi-field space.
    pub fn dof_shift(&self) -> usize {
        self.dof_shift
    }

    pub fn dof_handler(&self) -> &DofHandler<'a, T, D, C> {
        &self.dof_handler
    }

    pub fn stiffness_matrix(&self) -> Option<&CsrMatrix<T>> {
        self.assembled.then(|| &self.stiffness)
    }

    pub fn mass_matrix(&self) -> Option<&CsrMatrix<T>> {
        self.assembled.then(|| &self.mass)
    }

    pub fn load_vector(&self) -> Option<&DVector<T>> {
        self.assembled.then(|| &self.load)
    }

    /// Prescribed temperature values, keyed by temperature DOF. Cleared on every reset.
    pub fn boundary_values(&self) -> &BTreeMap<usize, T> {
        &self.boundary_values
    }

    pub fn set_boundary_values(&mut self, boundary_values: BTreeMap<usize, T>) {
        self.boundary_values = boundary_values;
    }

    /// Recomputes all outputs from the current state of the property providers.
    ///
    /// If new parameters are given, the temperature field is located anew first. The outputs
    /// are zeroed and the cached boundary values cleared, then the volume contributions and
    /// the Robin boundary contributions are accumulated. On error, the outputs are
    /// invalidated until the next successful reset.
    pub fn reset(&mut self, new_parameters: Option<&ThermalOperatorParameters>) -> Result<(), ThermalError> {
        self.assembled = false;

        if let Some(parameters) = new_parameters {
            let layout = locate_temperature(&self.dof_handler, self.constraints, parameters)?;
            self.temperature_component = layout.component;
            self.dof_shift = layout.dof_shift;
            self.stiffness = layout.stiffness;
            self.mass = layout.mass;
            self.load = layout.load;
        }

        self.stiffness.fill_zero();
        self.mass.fill_zero();
        GlobalVector::fill_zero(&mut self.load);
        self.boundary_values.clear();

        self.compute_thermal_operator_contribution()?;
        self.compute_robin_boundary_contribution()?;

        self.assembled = true;
        debug!(
            "Thermal operator reset: stiffness l1 norm {}, mass l1 norm {}, load l2 norm {}",
            l1_norm(&self.stiffness),
            l1_norm(&self.mass),
            self.load.norm()
        );
        Ok(())
    }

    fn extractor(&self) -> Result<DofExtractor, ThermalError> {
        let n_components = self.dof_handler.n_components();
        let mask = ComponentMask::single(n_components, self.temperature_component);
        DofExtractor::symmetric(&mask, self.dof_handler.dofs_per_cell(), n_components)
    }

    fn temperature_indices(
        &self,
        extractor: &DofExtractor,
        cell_dofs: &mut Vec<usize>,
        cell_index: usize,
    ) -> Result<Vec<usize>, ThermalError> {
        self.dof_handler
            .populate_cell_dofs(cell_dofs, cell_index)?;
        let mut indices = extractor.extract_row_indices(cell_dofs)?;
        shift_indices(&mut indices, self.dof_shift)?;
        Ok(indices)
    }

    /// Accumulates `∫ k ∇T·∇v` into the stiffness matrix and `∫ ρc T v` into the mass matrix.
    fn compute_thermal_operator_contribution(&mut self) -> Result<(), ThermalError> {
        let mesh = self.dof_handler.mesh();
        let n_components = self.dof_handler.n_components();
        let dofs_per_cell = self.dof_handler.dofs_per_cell();
        let field = FieldView::new(self.temperature_component, n_components);
        let extractor = self.extractor()?;

        let mut cell_values: Option<CellValues<T, D>> = None;
        let mut cell_stiffness = DMatrix::zeros(dofs_per_cell, dofs_per_cell);
        let mut cell_mass = DMatrix::zeros(dofs_per_cell, dofs_per_cell);
        let mut cell_dofs = Vec::with_capacity(dofs_per_cell);

        for (cell_index, connectivity) in mesh.connectivity().iter().enumerate() {
            let element = build_element(connectivity, mesh.vertices(), cell_index, n_components, dofs_per_cell)?;
            let values =
                cell_values.get_or_insert_with(|| CellValues::new(tensor_gauss(element.degree() + 1)));
            values.reinit(&element, cell_index)?;

            let context = CellQuadratureContext {
                cell_index,
                material_id: mesh.material_id(cell_index),
                points: values.quadrature_points(),
            };
            let n_q = values.n_quadrature_points();
            let volume = self.volume_properties;
            let conductivity = checked_values(THERMAL_CONDUCTIVITY, cell_index, n_q, || {
                volume.get_values(THERMAL_CONDUCTIVITY, &context)
            })?;
            let capacity = checked_values(DENSITY_TIMES_HEAT_CAPACITY, cell_index, n_q, || {
                volume.get_values(DENSITY_TIMES_HEAT_CAPACITY, &context)
            })?;

            cell_stiffness.fill(T::zero());
            cell_mass.fill(T::zero());
            assemble_cell_diffusion_and_capacity(
                &mut cell_stiffness,
                &mut cell_mass,
                values,
                &field,
                &conductivity,
                &capacity,
            );

            let indices = self.temperature_indices(&extractor, &mut cell_dofs, cell_index)?;
            let local_stiffness = extractor.extract_matrix(&cell_stiffness)?;
            let local_mass = extractor.extract_matrix(&cell_mass)?;
            self.constraints
                .distribute_local_to_global_matrix(&local_stiffness, &indices, &mut self.stiffness)?;
            self.constraints
                .distribute_local_to_global_matrix(&local_mass, &indices, &mut self.mass)?;
        }
        Ok(())
    }

    /// Accumulates `∮ h T v` into the stiffness matrix and `∮ h T_amb v` into the load vector.
    fn compute_robin_boundary_contribution(&mut self) -> Result<(), ThermalError> {
        let mesh = self.dof_handler.mesh();
        let n_components = self.dof_handler.n_components();
        let dofs_per_cell = self.dof_handler.dofs_per_cell();
        let field = FieldView::new(self.temperature_component, n_components);
        let extractor = self.extractor()?;

        let mut face_values: Option<FaceValues<T, D>> = None;
        let mut cell_stiffness = DMatrix::zeros(dofs_per_cell, dofs_per_cell);
        let mut cell_load = DVector::zeros(dofs_per_cell);
        let mut cell_dofs = Vec::with_capacity(dofs_per_cell);

        for (cell_index, connectivity) in mesh.connectivity().iter().enumerate() {
            if !mesh.cell_at_boundary(cell_index) {
                continue;
            }

            let element = build_element(connectivity, mesh.vertices(), cell_index, n_components, dofs_per_cell)?;
            let values =
                face_values.get_or_insert_with(|| FaceValues::new(face_gauss(D - 1, element.degree() + 1)));

            cell_stiffness.fill(T::zero());
            cell_load.fill(T::zero());
            for face_index in 0..connectivity.num_faces() {
                let boundary_id = match mesh.boundary_id(cell_index, face_index) {
                    Some(id) => id,
                    None => continue,
                };
                values.reinit(&element, face_index)?;

                let context = FaceQuadratureContext {
                    cell_index,
                    face_index,
                    boundary_id,
                    points: values.quadrature_points(),
                };
                let n_q = values.n_quadrature_points();
                let boundary = self.boundary_properties;
                let heat_transfer_coefficient = checked_values(HEAT_TRANSFER_COEFFICIENT, cell_index, n_q, || {
                    boundary.get_values(HEAT_TRANSFER_COEFFICIENT, &context)
                })?;
                let ambient_temperature = checked_values(AMBIENT_TEMPERATURE, cell_index, n_q, || {
                    boundary.get_values(AMBIENT_TEMPERATURE, &context)
                })?;

                assemble_face_robin(
                    &mut cell_stiffness,
                    &mut cell_load,
                    values,
                    &field,
                    &heat_transfer_coefficient,
                    &ambient_temperature,
                );
            }

            let indices = self.temperature_indices(&extractor, &mut cell_dofs, cell_index)?;
            let local_stiffness = extractor.extract_matrix(&cell_stiffness)?;
            let local_load = extractor.extract_vector(&cell_load)?;
            self.constraints
                .distribute_local_to_global_matrix(&local_stiffness, &indices, &mut self.stiffness)?;
            self.constraints
                .distribute_local_to_global_vector(&local_load, &indices, &mut self.load)?;
        }
        Ok(())
    }
}

fn locate_temperature<T, const D: usize, C>(
    dof_handler: &DofHandler<T, D, C>,
    constraints: &ConstraintSet<T>,
    parameters: &ThermalOperatorParameters,
) -> Result<TemperatureLayout<T>, ThermalError>
where
    T: Real,
    C: CellConnectivity<T, D>,
{
    let n_components = dof_handler.n_components();
    let component = parameters.validated_temperature_component(n_components)?;
    if !constraints.is_closed() {
        return Err(ThermalError::topology("constraint set must be closed before assembly"));
    }

    let dofs_per_component = dof_handler.count_dofs_per_component();
    let dof_shift = dofs_per_component[..component].iter().sum();
    let n_temperature_dofs = dofs_per_component[component];

    let mask = ComponentMask::single(n_components, component);
    let extractor = DofExtractor::symmetric(&mask, dof_handler.dofs_per_cell(), n_components)?;
    let mut cell_dofs = Vec::new();
    let mut cell_indices = Vec::with_capacity(dof_handler.mesh().num_cells());
    for cell_index in 0..dof_handler.mesh().num_cells() {
        dof_handler.populate_cell_dofs(&mut cell_dofs, cell_index)?;
        let mut indices = extractor.extract_row_indices(&cell_dofs)?;
        shift_indices(&mut indices, dof_shift)?;
        cell_indices.push(indices);
    }

    if let Some(dof) = constraints
        .constrained_dofs()
        .find(|&dof| dof >= n_temperature_dofs)
    {
        return Err(ThermalError::topology(format!(
            "constrained DOF {} is out of bounds for {} temperature DOFs",
            dof, n_temperature_dofs
        )));
    }

    let pattern = build_constrained_pattern(n_temperature_dofs, &cell_indices, constraints)?;
    Ok(TemperatureLayout {
        component,
        dof_shift,
        stiffness: zeroed_csr(pattern.clone())?,
        mass: zeroed_csr(pattern)?,
        load: DVector::zeros(n_temperature_dofs),
    })
}

fn build_element<T, const D: usize, C>(
    connectivity: &C,
    vertices: &[nalgebra::Point<T, D>],
    cell_index: usize,
    n_components: usize,
    dofs_per_cell: usize,
) -> Result<C::Element, ThermalError>
where
    T: Real,
    C: CellConnectivity<T, D>,
{
    let element = connectivity.element(vertices).ok_or_else(|| {
        ThermalError::topology(format!("cell {} refers to a vertex that does not exist", cell_index))
    })?;
    if element.num_nodes() * n_components != dofs_per_cell {
        return Err(ThermalError::topology(format!(
            "cell {} has {} DOFs, expected {}",
            cell_index,
            element.num_nodes() * n_components,
            dofs_per_cell
        )));
    }
    Ok(element)
}

/// Queries a provider and checks the result against the number of quadrature points.
fn checked_values<T, F>(field: &str, cell: usize, n_quadrature_points: usize, query: F) -> Result<Vec<T>, ThermalError>
where
    T: Real,
    F: FnOnce() -> Result<Vec<T>, PropertyError>,
{
    let provider_error = |kind| ThermalError::Provider {
        field: field.to_string(),
        cell,
        kind,
    };
    let values = query().map_err(|err| provider_error(ProviderErrorKind::Lookup(err)))?;
    if values.len() != n_quadrature_points {
        return Err(provider_error(ProviderErrorKind::CountMismatch {
            expected: n_quadrature_points,
            actual: values.len(),
        }));
    }
    if values.iter().any(|v| !v.is_finite()) {
        warn!("Field \"{}\" has non-finite values on cell {}", field, cell);
    }
    Ok(values)
}

/// Maximum absolute column sum.
fn l1_norm<T: Real>(matrix: &CsrMatrix<T>) -> T {
    let mut column_sums = vec![T::zero(); matrix.ncols()];
    for (_, j, v) in matrix.triplet_iter() {
        column_sums[j] += v.abs();
    }
    column_sums
        .into_iter()
        .fold(T::zero(), |max, sum| max.max(sum))
}
