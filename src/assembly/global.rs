//! Global matrices and vectors that element contributions are scattered into.
use crate::assembly::constraints::ConstraintSet;
use crate::error::ThermalError;
use crate::Real;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::pattern::SparsityPattern;
use nalgebra_sparse::CsrMatrix;
use std::collections::{BTreeMap, BTreeSet};

/// A global matrix that supports additive updates of individual entries.
pub trait GlobalMatrix<T> {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;

    /// Adds `value` to entry `(row, col)`.
    fn add_to_entry(&mut self, row: usize, col: usize, value: T) -> Result<(), ThermalError>;

    /// Sets all stored entries to zero, keeping the structure.
    fn fill_zero(&mut self);
}

/// A global vector that supports additive updates of individual entries.
pub trait GlobalVector<T> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn add_to_entry(&mut self, index: usize, value: T) -> Result<(), ThermalError>;

    fn fill_zero(&mut self);
}

fn out_of_bounds(row: usize, col: usize, nrows: usize, ncols: usize) -> ThermalError {
    ThermalError::topology(format!(
        "entry ({}, {}) is out of bounds for a {}x{} matrix",
        row, col, nrows, ncols
    ))
}

impl<T: Real> GlobalMatrix<T> for CsrMatrix<T> {
    fn nrows(&self) -> usize {
        CsrMatrix::nrows(self)
    }

    fn ncols(&self) -> usize {
        CsrMatrix::ncols(self)
    }

    fn add_to_entry(&mut self, row: usize, col: usize, value: T) -> Result<(), ThermalError> {
        let (nrows, ncols) = (CsrMatrix::nrows(self), CsrMatrix::ncols(self));
        if row >= nrows || col >= ncols {
            return Err(out_of_bounds(row, col, nrows, ncols));
        }
        let mut csr_row = self.row_mut(row);
        let (cols, values) = csr_row.cols_and_values_mut();
        // Column indices within a CSR row are sorted
        let local_idx = cols.binary_search(&col).map_err(|_| {
            ThermalError::topology(format!("entry ({}, {}) is not part of the sparsity pattern", row, col))
        })?;
        values[local_idx] += value;
        Ok(())
    }

    fn fill_zero(&mut self) {
        self.values_mut().fill(T::zero());
    }
}

impl<T: Real> GlobalMatrix<T> for DMatrix<T> {
    fn nrows(&self) -> usize {
        self.shape().0
    }

    fn ncols(&self) -> usize {
        self.shape().1
    }

    fn add_to_entry(&mut self, row: usize, col: usize, value: T) -> Result<(), ThermalError> {
        let (nrows, ncols) = self.shape();
        let entry = self
            .get_mut((row, col))
            .ok_or_else(|| out_of_bounds(row, col, nrows, ncols))?;
        *entry += value;
        Ok(())
    }

    fn fill_zero(&mut self) {
        self.fill(T::zero());
    }
}

impl<T: Real> GlobalVector<T> for DVector<T> {
    fn len(&self) -> usize {
        self.nrows()
    }

    fn add_to_entry(&mut self, index: usize, value: T) -> Result<(), ThermalError> {
        let n = self.nrows();
        let entry = self.get_mut(index).ok_or_else(|| {
            ThermalError::topology(format!("index {} is out of bounds for a vector of length {}", index, n))
        })?;
        *entry += value;
        Ok(())
    }

    fn fill_zero(&mut self) {
        self.fill(T::zero());
    }
}

/// Builds a square sparsity pattern that covers every coupling produced when scattering
/// cell contributions through the given constraints.
///
/// `cell_indices` contains the global DOF indices of each cell. The diagonal is always
/// part of the pattern.
pub fn build_constrained_pattern<T, I>(
    num_rows: usize,
    cell_indices: I,
    constraints: &ConstraintSet<T>,
) -> Result<SparsityPattern, ThermalError>
where
    T: Real,
    I: IntoIterator,
    I::Item: AsRef<[usize]>,
{
    // Collecting into a BTreeSet stores each entry exactly once, in CSR order
    let mut matrix_entries = BTreeSet::new();
    for i in 0..num_rows {
        matrix_entries.insert((i, i));
    }

    for indices in cell_indices {
        let indices = indices.as_ref();
        if let Some(&index) = indices.iter().find(|&&index| index >= num_rows) {
            return Err(ThermalError::topology(format!(
                "index {} is out of bounds for a pattern with {} rows",
                index, num_rows
            )));
        }

        let expansions: Vec<Vec<usize>> = indices
            .iter()
            .map(|&g| constraints.expand(g).into_iter().map(|(dof, _)| dof).collect())
            .collect();
        for row_expansion in &expansions {
            for col_expansion in &expansions {
                for &row in row_expansion {
                    for &col in col_expansion {
                        matrix_entries.insert((row, col));
                    }
                }
            }
        }
    }

    let mut offsets = Vec::with_capacity(num_rows + 1);
    let mut column_indices = Vec::with_capacity(matrix_entries.len());
    offsets.push(0);
    for (i, j) in matrix_entries {
        if i >= num_rows || j >= num_rows {
            return Err(out_of_bounds(i, j, num_rows, num_rows));
        }
        while i + 1 > offsets.len() {
            offsets.push(column_indices.len());
        }
        column_indices.push(j);
    }
    while offsets.len() < num_rows + 1 {
        offsets.push(column_indices.len());
    }

    SparsityPattern::try_from_offsets_and_indices(num_rows, num_rows, offsets, column_indices)
        .map_err(|err| ThermalError::topology(format!("invalid sparsity pattern: {}", err)))
}

/// A CSR matrix with the given pattern and all values zero.
pub fn zeroed_csr<T: Real>(pattern: SparsityPattern) -> Result<CsrMatrix<T>, ThermalError> {
    let values = vec![T::zero(); pattern.nnz()];
    CsrMatrix::try_from_pattern_and_values(pattern, values)
        .map_err(|err| ThermalError::topology(format!("invalid CSR matrix: {}", err)))
}

/// Applies prescribed values to the linear system `matrix * x = rhs`.
///
/// Rows and columns of prescribed DOFs are eliminated, keeping the matrix symmetric: the
/// column entries are moved to the right-hand side, and the diagonal is replaced by a value
/// with the same scale as the rest of the matrix. Assumes a structurally symmetric pattern.
pub fn apply_dirichlet_values_csr<T: Real>(
    matrix: &mut CsrMatrix<T>,
    rhs: &mut DVector<T>,
    values: &BTreeMap<usize, T>,
) -> Result<(), ThermalError> {
    let n = matrix.nrows();
    if rhs.len() != n {
        return Err(ThermalError::topology(format!(
            "right-hand side has {} entries, but the matrix has {} rows",
            rhs.len(),
            n
        )));
    }
    if let Some((&dof, _)) = values.iter().find(|&(&dof, _)| dof >= n) {
        return Err(ThermalError::topology(format!(
            "prescribed DOF {} is out of bounds for a matrix with {} rows",
            dof, n
        )));
    }

    // Take the first non-zero diagonal entry as a representative scale, so that the
    // conditioning of the matrix is not ruined by simply putting 1 on the diagonal
    let scale = (0..n)
        .filter_map(|i| matrix.get_entry(i, i).map(|entry| entry.into_value()))
        .find(|&x| x != T::zero())
        .map(|x| x.abs())
        .unwrap_or_else(T::one);

    let mut prescribed = vec![None; n];
    for (&dof, &value) in values {
        prescribed[dof] = Some(value);
    }

    // If (r, c) must be eliminated for a prescribed r, then so must (c, r). Record the rows
    // to visit instead of sweeping the whole matrix.
    let mut rows_to_visit = vec![false; n];
    for (&dof, &value) in values {
        let mut row = matrix.row_mut(dof);
        let (cols, row_values) = row.cols_and_values_mut();
        for (&col, entry) in cols.iter().zip(row_values) {
            if col == dof {
                *entry = scale;
            } else {
                *entry = T::zero();
                rows_to_visit[col] = true;
            }
        }
        rhs[dof] = scale * value;
    }

    for row_index in (0..n).filter(|&i| rows_to_visit[i] && prescribed[i].is_none()) {
        let mut row = matrix.row_mut(row_index);
        let (cols, row_values) = row.cols_and_values_mut();
        for (&col, entry) in cols.iter().zip(row_values) {
            if let Some(value) = prescribed[col] {
                rhs[row_index] -= *entry * value;
                *entry = T::zero();
            }
        }
    }
    Ok(())
}
