//! Multi-field degree-of-freedom spaces.
use crate::connectivity::Connectivity;
use crate::error::ThermalError;
use crate::mesh::Mesh;
use crate::Real;

/// Enumerates the degrees of freedom of `n_components` scalar fields on a mesh.
///
/// Every component is discretized with the same nodal (degree one) Lagrange element, so each
/// component has one DOF per mesh vertex.
///
/// Global numbering is blocked by component: the DOF of component `c` at vertex `v` is
/// `c * n_vertices + v`. Components are therefore contiguous blocks, and the first DOF of
/// component `c` is the number of DOFs in all preceding components. Cell-local numbering is
/// node-major: local DOF `node * n_components + c` belongs to component `c` at the
/// `node`-th vertex of the cell.
#[derive(Debug, Clone)]
pub struct DofHandler<'a, T: Real, const D: usize, C> {
    mesh: &'a Mesh<T, D, C>,
    n_components: usize,
}

impl<'a, T: Real, const D: usize, C: Connectivity> DofHandler<'a, T, D, C> {
    pub fn new(mesh: &'a Mesh<T, D, C>, n_components: usize) -> Result<Self, ThermalError> {
        if n_components == 0 {
            return Err(ThermalError::configuration("a DOF space needs at least one component"));
        }
        Ok(Self { mesh, n_components })
    }

    pub fn mesh(&self) -> &'a Mesh<T, D, C> {
        self.mesh
    }

    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Number of system DOFs on each cell.
    ///
    /// Cells of a mesh share a connectivity type, so the first cell is representative.
    pub fn dofs_per_cell(&self) -> usize {
        self.mesh
            .connectivity()
            .first()
            .map(|conn| conn.vertex_indices().len() * self.n_components)
            .unwrap_or(0)
    }

    pub fn n_dofs(&self) -> usize {
        self.mesh.num_vertices() * self.n_components
    }

    /// Number of DOFs of each component, in component order.
    pub fn count_dofs_per_component(&self) -> Vec<usize> {
        vec![self.mesh.num_vertices(); self.n_components]
    }

    /// Global index of the first DOF of the given component.
    pub fn component_offset(&self, component: usize) -> usize {
        self.count_dofs_per_component()
            .iter()
            .take(component)
            .sum()
    }

    /// Splits a cell-local DOF index into `(component, node)`.
    pub fn system_to_component_index(&self, local_dof: usize) -> (usize, usize) {
        (local_dof % self.n_components, local_dof / self.n_components)
    }

    /// Writes the global DOF indices of the given cell into `dofs`, in cell-local order.
    pub fn populate_cell_dofs(&self, dofs: &mut Vec<usize>, cell_index: usize) -> Result<(), ThermalError> {
        let cell = self
            .mesh
            .connectivity()
            .get(cell_index)
            .ok_or_else(|| ThermalError::topology(format!("cell {} is out of bounds", cell_index)))?;

        let n_vertices = self.mesh.num_vertices();
        dofs.clear();
        for &vertex in cell.vertex_indices() {
            if vertex >= n_vertices {
                return Err(ThermalError::topology(format!(
                    "cell {} refers to vertex {}, but the mesh has {} vertices",
                    cell_index, vertex, n_vertices
                )));
            }
            for component in 0..self.n_components {
                dofs.push(component * n_vertices + vertex);
            }
        }
        Ok(())
    }
}
