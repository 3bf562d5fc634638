//! Conforming meshes with material and boundary identifiers.
use crate::connectivity::{Connectivity, Hex8Connectivity, Quad4Connectivity};
use crate::error::ThermalError;
use crate::Real;
use nalgebra::Point;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;

pub mod procedural;

/// Identifies the material of a cell. Cells carry material `0` unless assigned otherwise.
pub type MaterialId = u32;

/// Identifies the boundary part a face belongs to. Boundary faces carry id `0` unless assigned
/// otherwise.
pub type BoundaryId = u32;

/// Index-based data structure for conforming meshes (i.e. no hanging nodes).
///
/// Boundary faces, i.e. faces that belong to exactly one cell, are detected once on
/// construction. A face is addressed by the pair `(cell index, local face index)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh<T: Real, const D: usize, C> {
    vertices: Vec<Point<T, D>>,
    connectivity: Vec<C>,
    material_ids: Vec<MaterialId>,
    boundary_faces: FxHashSet<(usize, usize)>,
    boundary_ids: FxHashMap<(usize, usize), BoundaryId>,
    cells_at_boundary: Vec<bool>,
}

pub type QuadMesh2d<T> = Mesh<T, 2, Quad4Connectivity>;
pub type HexMesh<T> = Mesh<T, 3, Hex8Connectivity>;

impl<T: Real, const D: usize, C> Mesh<T, D, C> {
    pub fn vertices(&self) -> &[Point<T, D>] {
        &self.vertices
    }

    pub fn connectivity(&self) -> &[C] {
        &self.connectivity
    }

    pub fn num_cells(&self) -> usize {
        self.connectivity.len()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn material_ids(&self) -> &[MaterialId] {
        &self.material_ids
    }

    /// Returns the material id of the given cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell index is out of bounds.
    pub fn material_id(&self, cell_index: usize) -> MaterialId {
        self.material_ids[cell_index]
    }

    /// Returns the boundary id of the given face, or `None` if it is not a boundary face.
    pub fn boundary_id(&self, cell_index: usize, face_index: usize) -> Option<BoundaryId> {
        if self.face_at_boundary(cell_index, face_index) {
            Some(
                self.boundary_ids
                    .get(&(cell_index, face_index))
                    .copied()
                    .unwrap_or(0),
            )
        } else {
            None
        }
    }

    pub fn cell_at_boundary(&self, cell_index: usize) -> bool {
        self.cells_at_boundary
            .get(cell_index)
            .copied()
            .unwrap_or(false)
    }

    pub fn face_at_boundary(&self, cell_index: usize, face_index: usize) -> bool {
        self.boundary_faces.contains(&(cell_index, face_index))
    }

    pub fn num_boundary_faces(&self) -> usize {
        self.boundary_faces.len()
    }
}

impl<T: Real, const D: usize, C: Connectivity> Mesh<T, D, C> {
    /// Construct a mesh from vertices and connectivity.
    ///
    /// The provided connectivity is expected only to return valid (i.e. in-bounds) indices.
    /// Invalid indices are reported as topology errors when cells are assembled.
    pub fn from_vertices_and_connectivity(vertices: Vec<Point<T, D>>, connectivity: Vec<C>) -> Self {
        let mut mesh = Self {
            material_ids: vec![0; connectivity.len()],
            cells_at_boundary: vec![false; connectivity.len()],
            vertices,
            connectivity,
            boundary_faces: FxHashSet::default(),
            boundary_ids: FxHashMap::default(),
        };

        for (_, cell_index, face_index) in mesh.find_boundary_faces() {
            mesh.boundary_faces.insert((cell_index, face_index));
            mesh.cells_at_boundary[cell_index] = true;
        }
        mesh
    }

    /// Replaces the material ids of all cells.
    pub fn with_material_ids(mut self, material_ids: Vec<MaterialId>) -> Result<Self, ThermalError> {
        if material_ids.len() != self.connectivity.len() {
            return Err(ThermalError::topology(format!(
                "{} material ids given for a mesh with {} cells",
                material_ids.len(),
                self.connectivity.len()
            )));
        }
        self.material_ids = material_ids;
        Ok(self)
    }

    pub fn set_material_id(&mut self, cell_index: usize, material_id: MaterialId) -> Result<(), ThermalError> {
        let id = self
            .material_ids
            .get_mut(cell_index)
            .ok_or_else(|| ThermalError::topology(format!("cell {} is out of bounds", cell_index)))?;
        *id = material_id;
        Ok(())
    }

    /// Assigns a boundary id to a boundary face.
    ///
    /// Returns a topology error if the face is not on the boundary.
    pub fn set_boundary_id(
        &mut self,
        cell_index: usize,
        face_index: usize,
        boundary_id: BoundaryId,
    ) -> Result<(), ThermalError> {
        if !self.face_at_boundary(cell_index, face_index) {
            return Err(ThermalError::topology(format!(
                "face {} of cell {} is not a boundary face",
                face_index, cell_index
            )));
        }
        self.boundary_ids
            .insert((cell_index, face_index), boundary_id);
        Ok(())
    }

    /// Assigns boundary ids to every boundary face for which `classify` returns an id.
    ///
    /// The classifier receives the vertices of the face.
    pub fn set_boundary_ids_by<F>(&mut self, mut classify: F)
    where
        F: FnMut(&[Point<T, D>]) -> Option<BoundaryId>,
    {
        let mut face_vertices = Vec::new();
        let mut faces: Vec<_> = self.boundary_faces.iter().copied().collect();
        faces.sort_unstable();
        for (cell_index, face_index) in faces {
            let face = self.connectivity[cell_index].get_face_connectivity(face_index);
            face_vertices.clear();
            let in_bounds = face.map(|face| {
                face.vertex_indices()
                    .iter()
                    .all(|&v| match self.vertices.get(v) {
                        Some(vertex) => {
                            face_vertices.push(*vertex);
                            true
                        }
                        None => false,
                    })
            });
            if in_bounds == Some(true) {
                if let Some(id) = classify(&face_vertices) {
                    self.boundary_ids
                        .insert((cell_index, face_index), id);
                }
            }
        }
    }

    /// Finds the faces that belong to exactly one cell.
    ///
    /// Returns the face connectivity, the index of the owning cell and the local face index
    /// in the cell, ordered by the sorted vertex indices of the face.
    pub fn find_boundary_faces(&self) -> Vec<(C::FaceConnectivity, usize, usize)> {
        let mut face_info = Vec::new();

        // Count the number of occurrences of "equivalent" faces (in the sense that they refer
        // to the same vertex indices). A BTreeMap keeps the result deterministic.
        let mut face_counts = BTreeMap::new();
        for (cell_index, cell_conn) in self.connectivity.iter().enumerate() {
            for face_index in 0..cell_conn.num_faces() {
                if let Some(face_conn) = cell_conn.get_face_connectivity(face_index) {
                    let mut key = face_conn.vertex_indices().to_vec();
                    key.sort_unstable();
                    face_counts
                        .entry(key)
                        .and_modify(|(_, count)| *count += 1)
                        .or_insert((face_info.len(), 1));
                    face_info.push((face_conn, cell_index, face_index));
                }
            }
        }

        face_counts
            .into_values()
            .filter(|&(_, count)| count == 1)
            .map(|(i, _)| face_info[i].clone())
            .collect()
    }

    /// Returns a sorted list of vertices that belong to a boundary face.
    pub fn find_boundary_vertices(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        for (connectivity, _, _) in self.find_boundary_faces() {
            indices.extend(connectivity.vertex_indices());
        }
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}
