//! Linear constraints between degrees of freedom.
use crate::assembly::global::{GlobalMatrix, GlobalVector};
use crate::error::ThermalError;
use crate::Real;
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;

/// A single constraint `x_dof = sum_k a_k x_{t_k} + b`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintLine<T> {
    entries: Vec<(usize, T)>,
    inhomogeneity: T,
}

impl<T: Real> ConstraintLine<T> {
    /// Pairs `(target DOF, coefficient)`.
    pub fn entries(&self) -> &[(usize, T)] {
        &self.entries
    }

    pub fn inhomogeneity(&self) -> T {
        self.inhomogeneity
    }
}

/// A set of linear constraints on the DOFs of a single field.
///
/// Constrained DOFs are eliminated during scatter: a local contribution associated with a
/// constrained DOF is redistributed to the DOFs it depends on. Before use, the set must be
/// [closed](ConstraintSet::close), which resolves constraints referring to other
/// constrained DOFs.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSet<T> {
    lines: BTreeMap<usize, ConstraintLine<T>>,
    closed: bool,
}

impl<T: Real> Default for ConstraintSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Real> ConstraintSet<T> {
    /// An empty, closed constraint set.
    pub fn new() -> Self {
        Self {
            lines: BTreeMap::new(),
            closed: true,
        }
    }

    /// Constrains `dof` to zero. Entries and an inhomogeneity can be added afterwards.
    pub fn add_line(&mut self, dof: usize) {
        self.lines.entry(dof).or_insert(ConstraintLine {
            entries: Vec::new(),
            inhomogeneity: T::zero(),
        });
        self.closed = false;
    }

    /// Adds `coefficient * x_target` to the right-hand side of the constraint on `dof`.
    pub fn add_entry(&mut self, dof: usize, target: usize, coefficient: T) -> Result<(), ThermalError> {
        let line = self.line_mut(dof)?;
        line.entries.push((target, coefficient));
        self.closed = false;
        Ok(())
    }

    pub fn set_inhomogeneity(&mut self, dof: usize, inhomogeneity: T) -> Result<(), ThermalError> {
        self.line_mut(dof)?.inhomogeneity = inhomogeneity;
        Ok(())
    }

    /// Adds (or replaces) the complete constraint on `dof`.
    pub fn add_constraint(&mut self, dof: usize, entries: &[(usize, T)], inhomogeneity: T) {
        self.lines.insert(
            dof,
            ConstraintLine {
                entries: entries.to_vec(),
                inhomogeneity,
            },
        );
        self.closed = false;
    }

    fn line_mut(&mut self, dof: usize) -> Result<&mut ConstraintLine<T>, ThermalError> {
        self.lines
            .get_mut(&dof)
            .ok_or_else(|| ThermalError::topology(format!("DOF {} has no constraint line", dof)))
    }

    pub fn is_constrained(&self, dof: usize) -> bool {
        self.lines.contains_key(&dof)
    }

    pub fn n_constraints(&self) -> usize {
        self.lines.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn line(&self, dof: usize) -> Option<&ConstraintLine<T>> {
        self.lines.get(&dof)
    }

    /// Constrained DOFs in increasing order.
    pub fn constrained_dofs(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines.keys().copied()
    }

    /// Resolves chains of constraints so that every constraint refers to unconstrained
    /// DOFs only.
    ///
    /// Entries referring to the same target are merged, and entries whose coefficient
    /// vanishes are removed. A constraint that (indirectly) refers to itself is a
    /// topology error, and leaves the set unchanged.
    pub fn close(&mut self) -> Result<(), ThermalError> {
        let mut resolved = BTreeMap::new();
        let mut stack = Vec::new();
        for &dof in self.lines.keys() {
            self.resolve(dof, &mut resolved, &mut stack)?;
        }
        self.lines = resolved;
        self.closed = true;
        Ok(())
    }

    fn resolve(
        &self,
        dof: usize,
        resolved: &mut BTreeMap<usize, ConstraintLine<T>>,
        stack: &mut Vec<usize>,
    ) -> Result<ConstraintLine<T>, ThermalError> {
        if let Some(line) = resolved.get(&dof) {
            return Ok(line.clone());
        }
        if stack.contains(&dof) {
            return Err(ThermalError::topology(format!(
                "constraints form a cycle through DOF {}",
                dof
            )));
        }

        stack.push(dof);
        let line = &self.lines[&dof];
        let mut entries = BTreeMap::new();
        let mut inhomogeneity = line.inhomogeneity;
        for &(target, coefficient) in &line.entries {
            if self.lines.contains_key(&target) {
                let target_line = self.resolve(target, resolved, stack)?;
                for (t, c) in target_line.entries {
                    *entries.entry(t).or_insert_with(T::zero) += coefficient * c;
                }
                inhomogeneity += coefficient * target_line.inhomogeneity;
            } else {
                *entries.entry(target).or_insert_with(T::zero) += coefficient;
            }
        }
        stack.pop();

        let line = ConstraintLine {
            entries: entries
                .into_iter()
                .filter(|(_, c)| *c != T::zero())
                .collect(),
            inhomogeneity,
        };
        resolved.insert(dof, line.clone());
        Ok(line)
    }

    /// The linear combination of unconstrained DOFs that `dof` stands for.
    ///
    /// A free DOF expands to itself with coefficient one.
    pub fn expand(&self, dof: usize) -> Vec<(usize, T)> {
        match self.lines.get(&dof) {
            Some(line) => line.entries.clone(),
            None => vec![(dof, T::one())],
        }
    }

    fn check_closed(&self) -> Result<(), ThermalError> {
        if self.closed {
            Ok(())
        } else {
            Err(ThermalError::topology("constraint set must be closed before use"))
        }
    }

    /// Adds the element matrix `local` with global indices `indices` to `global`.
    ///
    /// Entry `(i, j)` of the element matrix is distributed as `a * b * local[(i, j)]` to every
    /// `(r, s)` with `(r, a)` in the expansion of `indices[i]` and `(s, b)` in the expansion of
    /// `indices[j]`. For a constrained DOF `g`, the local diagonal entry (or the mean absolute
    /// local diagonal if that entry is zero) is added to `global[(g, g)]`, which keeps the
    /// global matrix invertible.
    pub fn distribute_local_to_global_matrix<M>(
        &self,
        local: &DMatrix<T>,
        indices: &[usize],
        global: &mut M,
    ) -> Result<(), ThermalError>
    where
        M: GlobalMatrix<T> + ?Sized,
    {
        self.check_closed()?;
        if local.nrows() != indices.len() || local.ncols() != indices.len() {
            return Err(ThermalError::topology(format!(
                "element matrix is {}x{}, but {} indices were given",
                local.nrows(),
                local.ncols(),
                indices.len()
            )));
        }

        if self.lines.is_empty() {
            for (i, &row) in indices.iter().enumerate() {
                for (j, &col) in indices.iter().enumerate() {
                    global.add_to_entry(row, col, local[(i, j)])?;
                }
            }
            return Ok(());
        }

        let expansions: Vec<_> = indices.iter().map(|&g| self.expand(g)).collect();
        for (i, row_expansion) in expansions.iter().enumerate() {
            for (j, col_expansion) in expansions.iter().enumerate() {
                let value = local[(i, j)];
                for &(row, a) in row_expansion {
                    for &(col, b) in col_expansion {
                        global.add_to_entry(row, col, a * b * value)?;
                    }
                }
            }
        }

        let n = indices.len();
        let mean_abs_diagonal = if n > 0 {
            local.diagonal().iter().map(|d| d.abs()).fold(T::zero(), |a, b| a + b) / nalgebra::convert(n as f64)
        } else {
            T::zero()
        };
        for (i, &g) in indices.iter().enumerate() {
            if self.is_constrained(g) {
                let diagonal = local[(i, i)];
                let diagonal = if diagonal != T::zero() {
                    diagonal
                } else {
                    mean_abs_diagonal
                };
                global.add_to_entry(g, g, diagonal)?;
            }
        }
        Ok(())
    }

    /// Adds the element vector `local` with global indices `indices` to `global`, expanding
    /// constrained entries. Inhomogeneities are not applied.
    pub fn distribute_local_to_global_vector<V>(
        &self,
        local: &DVector<T>,
        indices: &[usize],
        global: &mut V,
    ) -> Result<(), ThermalError>
    where
        V: GlobalVector<T> + ?Sized,
    {
        self.check_closed()?;
        if local.len() != indices.len() {
            return Err(ThermalError::topology(format!(
                "element vector has {} entries, but {} indices were given",
                local.len(),
                indices.len()
            )));
        }

        for (&value, &g) in local.iter().zip(indices) {
            match self.lines.get(&g) {
                Some(line) => {
                    for &(target, a) in &line.entries {
                        global.add_to_entry(target, a * value)?;
                    }
                }
                None => global.add_to_entry(g, value)?,
            }
        }
        Ok(())
    }

    /// Sets every constrained entry of `solution` to the value implied by its constraint.
    pub fn distribute(&self, solution: &mut DVector<T>) -> Result<(), ThermalError> {
        self.check_closed()?;
        let n = solution.len();
        let out_of_bounds = |dof: usize| ThermalError::topology(format!("DOF {} is out of bounds for a vector of length {}", dof, n));
        for (&dof, line) in &self.lines {
            let mut value = line.inhomogeneity;
            for &(target, a) in &line.entries {
                value += a * *solution.get(target).ok_or_else(|| out_of_bounds(target))?;
            }
            *solution.get_mut(dof).ok_or_else(|| out_of_bounds(dof))? = value;
        }
        Ok(())
    }
}
