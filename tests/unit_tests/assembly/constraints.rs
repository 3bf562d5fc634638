use cap_thermal::assembly::constraints::ConstraintSet;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::{DMatrix, DVector};
use proptest::prelude::*;

/// Matrix `P` with `x_local = P * x_global` for the given constraints.
fn expansion_matrix(constraints: &ConstraintSet<f64>, indices: &[usize], n: usize) -> DMatrix<f64> {
    let mut p = DMatrix::zeros(indices.len(), n);
    for (i, &g) in indices.iter().enumerate() {
        for (dof, coefficient) in constraints.expand(g) {
            p[(i, dof)] += coefficient;
        }
    }
    p
}

fn hanging_node_constraints() -> ConstraintSet<f64> {
    let mut constraints = ConstraintSet::new();
    constraints.add_constraint(3, &[(0, 0.5), (2, 0.5)], 0.0);
    constraints.close().unwrap();
    constraints
}

#[test]
fn empty_constraints_scatter_directly() {
    let constraints = ConstraintSet::<f64>::new();
    assert!(constraints.is_closed());
    assert_eq!(constraints.n_constraints(), 0);

    let local = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    let mut global = DMatrix::zeros(3, 3);
    constraints
        .distribute_local_to_global_matrix(&local, &[2, 0], &mut global)
        .unwrap();
    #[rustfmt::skip]
    let expected = DMatrix::from_row_slice(3, 3, &[
        4.0, 0.0, 3.0,
        0.0, 0.0, 0.0,
        2.0, 0.0, 1.0,
    ]);
    assert_matrix_eq!(global, expected);
}

#[test]
fn matrix_distribution_matches_explicit_expansion() {
    let constraints = hanging_node_constraints();
    let indices = [0, 1, 3, 2];
    #[rustfmt::skip]
    let local = DMatrix::from_row_slice(4, 4, &[
        4.0, -1.0, -2.0, -1.0,
        -1.0, 5.0, -1.0, -2.0,
        -2.0, -1.0, 6.0, -1.0,
        -1.0, -2.0, -1.0, 7.0,
    ]);

    let mut global = DMatrix::zeros(4, 4);
    constraints
        .distribute_local_to_global_matrix(&local, &indices, &mut global)
        .unwrap();

    let p = expansion_matrix(&constraints, &indices, 4);
    let mut expected = p.transpose() * &local * &p;
    // Local position 2 holds constrained DOF 3
    expected[(3, 3)] += local[(2, 2)];
    assert_matrix_eq!(global, expected, comp = abs, tol = 1e-14);
}

#[test]
fn zero_local_diagonal_is_replaced_by_mean_absolute_diagonal() {
    let mut constraints = ConstraintSet::new();
    constraints.add_line(1);
    constraints.close().unwrap();

    let local = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 0.0]);
    let mut global = DMatrix::zeros(2, 2);
    constraints
        .distribute_local_to_global_matrix(&local, &[0, 1], &mut global)
        .unwrap();
    assert_matrix_eq!(global, DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 1.0]));
}

#[test]
fn vector_distribution_ignores_inhomogeneities() {
    let mut constraints = ConstraintSet::new();
    constraints.add_constraint(2, &[(0, 0.25), (1, 0.75)], 10.0);
    constraints.close().unwrap();

    let mut global = DVector::zeros(3);
    constraints
        .distribute_local_to_global_vector(&DVector::from_column_slice(&[1.0, 4.0]), &[1, 2], &mut global)
        .unwrap();
    assert_matrix_eq!(global, DVector::from_column_slice(&[1.0, 4.0, 0.0]), comp = abs, tol = 1e-14);
}

#[test]
fn distribute_sets_constrained_values() {
    let mut constraints = ConstraintSet::new();
    constraints.add_constraint(3, &[(0, 0.5), (2, 0.5)], 1.0);
    constraints.close().unwrap();

    let mut solution = DVector::from_column_slice(&[1.0, 2.0, 3.0, 0.0]);
    constraints.distribute(&mut solution).unwrap();
    assert_scalar_eq!(solution[3], 3.0, comp = abs, tol = 1e-14);

    let mut short = DVector::from_column_slice(&[1.0, 2.0]);
    assert!(constraints.distribute(&mut short).unwrap_err().is_topology());
}

#[test]
fn close_resolves_chains_and_merges_entries() {
    let mut constraints = ConstraintSet::new();
    constraints.add_line(2);
    constraints.add_entry(2, 1, 1.0).unwrap();
    constraints.add_entry(2, 0, 1.0).unwrap();
    constraints.add_constraint(1, &[(0, 2.0)], 1.0);
    assert!(!constraints.is_closed());

    // Using an open constraint set is an error
    let mut global = DVector::zeros(3);
    assert!(constraints
        .distribute_local_to_global_vector(&DVector::from_column_slice(&[1.0]), &[2], &mut global)
        .unwrap_err()
        .is_topology());

    constraints.close().unwrap();
    assert!(constraints.is_closed());
    let line = constraints.line(2).unwrap();
    assert_eq!(line.entries(), &[(0, 3.0)]);
    assert_scalar_eq!(line.inhomogeneity(), 1.0, comp = abs, tol = 1e-14);
    assert_eq!(constraints.expand(0), vec![(0, 1.0)]);
    assert_eq!(constraints.constrained_dofs().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn close_removes_cancelling_entries() {
    let mut constraints = ConstraintSet::new();
    constraints.add_constraint(0, &[(1, 1.0), (2, 1.0), (1, -1.0)], 0.0);
    constraints.close().unwrap();
    assert_eq!(constraints.expand(0), vec![(2, 1.0)]);
}

#[test]
fn cycles_are_topology_errors() {
    let mut constraints = ConstraintSet::<f64>::new();
    constraints.add_constraint(0, &[(1, 1.0)], 0.0);
    constraints.add_constraint(1, &[(0, 1.0)], 0.0);
    assert!(constraints.close().unwrap_err().is_topology());
    assert!(!constraints.is_closed());

    let mut constraints = ConstraintSet::<f64>::new();
    constraints.add_constraint(4, &[(4, 0.5)], 0.0);
    assert!(constraints.close().unwrap_err().is_topology());
}

#[test]
fn entries_require_an_existing_line() {
    let mut constraints = ConstraintSet::<f64>::new();
    assert!(constraints.add_entry(0, 1, 1.0).unwrap_err().is_topology());
    assert!(constraints
        .set_inhomogeneity(0, 1.0)
        .unwrap_err()
        .is_topology());
    constraints.add_line(0);
    constraints.set_inhomogeneity(0, 2.0).unwrap();
    assert!(constraints.is_constrained(0));
    assert!(!constraints.is_constrained(1));
}

proptest! {
    #[test]
    fn constrained_scatter_is_congruence_transform(
        values in proptest::collection::vec(-10.0..10.0, 16),
        a in -2.0..2.0,
        b in -2.0..2.0,
    ) {
        let mut constraints = ConstraintSet::new();
        constraints.add_constraint(1, &[(0, a), (3, b)], 0.0);
        constraints.close().unwrap();

        let local = DMatrix::from_row_slice(4, 4, &values);
        let local = &local + local.transpose();
        let indices = [2, 1, 0, 3];

        let mut global = DMatrix::zeros(4, 4);
        constraints.distribute_local_to_global_matrix(&local, &indices, &mut global).unwrap();

        let p = expansion_matrix(&constraints, &indices, 4);
        let mut expected = p.transpose() * &local * &p;
        let diagonal = if local[(1, 1)] != 0.0 {
            local[(1, 1)]
        } else {
            local.diagonal().abs().sum() / 4.0
        };
        expected[(1, 1)] += diagonal;
        prop_assert!((&global - &expected).amax() < 1e-10);
        prop_assert!((&global - global.transpose()).amax() < 1e-10);
    }
}
