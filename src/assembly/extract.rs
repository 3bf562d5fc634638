//! Extraction of a single field from the DOFs of a multi-field cell.
use crate::error::ThermalError;
use crate::Real;
use nalgebra::{DMatrix, DVector};

/// Selects a subset of the components of a multi-field space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMask {
    selected: Vec<bool>,
}

impl ComponentMask {
    pub fn new(selected: Vec<bool>) -> Self {
        Self { selected }
    }

    /// A mask selecting only `component` out of `n_components`.
    pub fn single(n_components: usize, component: usize) -> Self {
        Self {
            selected: (0..n_components).map(|c| c == component).collect(),
        }
    }

    pub fn all(n_components: usize) -> Self {
        Self {
            selected: vec![true; n_components],
        }
    }

    pub fn n_components(&self) -> usize {
        self.selected.len()
    }

    pub fn contains(&self, component: usize) -> bool {
        self.selected
            .get(component)
            .copied()
            .unwrap_or(false)
    }

    pub fn n_selected(&self) -> usize {
        self.selected.iter().filter(|&&s| s).count()
    }
}

/// Extracts the rows and columns belonging to masked components from cell-local data.
///
/// The cell-local DOF `i` belongs to component `i % n_components`. The selected local
/// positions depend only on the masks, so an extractor is built once per assembly pass and
/// reused for every cell. Extraction preserves the local order of the selected DOFs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DofExtractor {
    dofs_per_cell: usize,
    rows: Vec<usize>,
    columns: Vec<usize>,
}

fn check_mask(mask: &ComponentMask, n_components: usize) -> Result<(), ThermalError> {
    if mask.n_components() == n_components {
        Ok(())
    } else {
        Err(ThermalError::topology(format!(
            "component mask has {} entries, but the space has {} components",
            mask.n_components(),
            n_components
        )))
    }
}

impl DofExtractor {
    pub fn new(
        row_mask: &ComponentMask,
        column_mask: &ComponentMask,
        dofs_per_cell: usize,
        n_components: usize,
    ) -> Result<Self, ThermalError> {
        check_mask(row_mask, n_components)?;
        check_mask(column_mask, n_components)?;
        if n_components == 0 || dofs_per_cell % n_components != 0 {
            return Err(ThermalError::topology(format!(
                "{} DOFs per cell cannot be split evenly into {} components",
                dofs_per_cell, n_components
            )));
        }

        let select = |mask: &ComponentMask| {
            (0..dofs_per_cell)
                .filter(|i| mask.contains(i % n_components))
                .collect()
        };
        Ok(Self {
            dofs_per_cell,
            rows: select(row_mask),
            columns: select(column_mask),
        })
    }

    /// An extractor using the same mask for rows and columns.
    pub fn symmetric(mask: &ComponentMask, dofs_per_cell: usize, n_components: usize) -> Result<Self, ThermalError> {
        Self::new(mask, mask, dofs_per_cell, n_components)
    }

    pub fn dofs_per_cell(&self) -> usize {
        self.dofs_per_cell
    }

    /// Local positions of the selected rows.
    pub fn row_positions(&self) -> &[usize] {
        &self.rows
    }

    /// Local positions of the selected columns.
    pub fn column_positions(&self) -> &[usize] {
        &self.columns
    }

    fn check_len(&self, len: usize, what: &str) -> Result<(), ThermalError> {
        if len == self.dofs_per_cell {
            Ok(())
        } else {
            Err(ThermalError::topology(format!(
                "{} has {} entries, expected {} DOFs per cell",
                what, len, self.dofs_per_cell
            )))
        }
    }

    pub fn extract_row_indices(&self, local_indices: &[usize]) -> Result<Vec<usize>, ThermalError> {
        self.check_len(local_indices.len(), "index list")?;
        Ok(self.rows.iter().map(|&i| local_indices[i]).collect())
    }

    pub fn extract_column_indices(&self, local_indices: &[usize]) -> Result<Vec<usize>, ThermalError> {
        self.check_len(local_indices.len(), "index list")?;
        Ok(self.columns.iter().map(|&j| local_indices[j]).collect())
    }

    pub fn extract_matrix<T: Real>(&self, full_matrix: &DMatrix<T>) -> Result<DMatrix<T>, ThermalError> {
        self.check_len(full_matrix.nrows(), "matrix row count")?;
        self.check_len(full_matrix.ncols(), "matrix column count")?;
        Ok(DMatrix::from_fn(self.rows.len(), self.columns.len(), |i, j| {
            full_matrix[(self.rows[i], self.columns[j])]
        }))
    }

    pub fn extract_vector<T: Real>(&self, full_vector: &DVector<T>) -> Result<DVector<T>, ThermalError> {
        self.check_len(full_vector.len(), "vector")?;
        Ok(DVector::from_fn(self.rows.len(), |i, _| full_vector[self.rows[i]]))
    }
}

/// Maps global indices of a multi-field space to the numbering of a single field whose
/// block starts at `dof_shift`, by subtracting the shift from every index.
pub fn shift_indices(indices: &mut [usize], dof_shift: usize) -> Result<(), ThermalError> {
    if dof_shift == 0 {
        return Ok(());
    }
    for index in indices.iter_mut() {
        let global = *index;
        *index = global.checked_sub(dof_shift).ok_or_else(|| {
            ThermalError::topology(format!("index {} lies before the field offset {}", global, dof_shift))
        })?;
    }
    Ok(())
}
