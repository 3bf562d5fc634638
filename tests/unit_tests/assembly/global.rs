use cap_thermal::assembly::constraints::ConstraintSet;
use cap_thermal::assembly::global::{
    apply_dirichlet_values_csr, build_constrained_pattern, zeroed_csr, GlobalMatrix, GlobalVector,
};
use matrixcompare::assert_matrix_eq;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;
use std::collections::BTreeMap;

fn tridiagonal_csr() -> CsrMatrix<f64> {
    CsrMatrix::try_from_csr_data(
        3,
        3,
        vec![0, 2, 5, 7],
        vec![0, 1, 0, 1, 2, 1, 2],
        vec![2.0, -1.0, -1.0, 2.0, -1.0, -1.0, 2.0],
    )
    .unwrap()
}

#[test]
fn pattern_covers_cell_couplings() {
    let constraints = ConstraintSet::<f64>::new();
    let cells = vec![vec![0, 1], vec![1, 2]];
    let pattern = build_constrained_pattern(4, &cells, &constraints).unwrap();

    assert_eq!(pattern.major_dim(), 4);
    assert_eq!(pattern.lane(0), &[0, 1]);
    assert_eq!(pattern.lane(1), &[0, 1, 2]);
    assert_eq!(pattern.lane(2), &[1, 2]);
    // The diagonal is always present, even for DOFs not in any cell
    assert_eq!(pattern.lane(3), &[3]);
}

#[test]
fn pattern_accounts_for_constraints() {
    let mut constraints = ConstraintSet::new();
    constraints.add_constraint(2, &[(0, 0.5), (3, 0.5)], 0.0);
    constraints.close().unwrap();

    let cells = vec![vec![1, 2]];
    let pattern = build_constrained_pattern(4, &cells, &constraints).unwrap();
    assert_eq!(pattern.lane(0), &[0, 1, 3]);
    assert_eq!(pattern.lane(1), &[0, 1, 3]);
    assert_eq!(pattern.lane(2), &[2]);
    assert_eq!(pattern.lane(3), &[0, 1, 3]);
}

#[test]
fn pattern_rejects_out_of_bounds_indices() {
    let constraints = ConstraintSet::<f64>::new();
    let cells = vec![vec![0, 4]];
    assert!(build_constrained_pattern(4, &cells, &constraints)
        .unwrap_err()
        .is_topology());
}

#[test]
fn csr_entries_outside_pattern_are_topology_errors() {
    let constraints = ConstraintSet::<f64>::new();
    let cells = vec![vec![0, 1]];
    let pattern = build_constrained_pattern(3, &cells, &constraints).unwrap();
    let mut matrix = zeroed_csr::<f64>(pattern).unwrap();

    matrix.add_to_entry(0, 1, 2.5).unwrap();
    matrix.add_to_entry(0, 1, 0.5).unwrap();
    assert_eq!(matrix.get_entry(0, 1).unwrap().into_value(), 3.0);

    assert!(matrix.add_to_entry(0, 2, 1.0).unwrap_err().is_topology());
    assert!(matrix.add_to_entry(3, 0, 1.0).unwrap_err().is_topology());

    matrix.fill_zero();
    assert!(matrix.values().iter().all(|&v| v == 0.0));
}

#[test]
fn dense_containers() {
    let mut matrix = DMatrix::<f64>::zeros(2, 2);
    GlobalMatrix::add_to_entry(&mut matrix, 1, 0, 4.0).unwrap();
    assert_eq!(matrix[(1, 0)], 4.0);
    assert!(GlobalMatrix::add_to_entry(&mut matrix, 2, 0, 1.0)
        .unwrap_err()
        .is_topology());
    GlobalMatrix::fill_zero(&mut matrix);
    assert_eq!(matrix, DMatrix::zeros(2, 2));

    let mut vector = DVector::<f64>::zeros(2);
    GlobalVector::add_to_entry(&mut vector, 1, 3.0).unwrap();
    assert_eq!(vector[1], 3.0);
    assert!(GlobalVector::add_to_entry(&mut vector, 2, 1.0)
        .unwrap_err()
        .is_topology());
}

#[test]
fn dirichlet_values_are_eliminated_symmetrically() {
    let mut matrix = tridiagonal_csr();
    let mut rhs = DVector::zeros(3);
    let values: BTreeMap<_, _> = [(0, 1.0)].into_iter().collect();
    apply_dirichlet_values_csr(&mut matrix, &mut rhs, &values).unwrap();

    #[rustfmt::skip]
    let expected_matrix = DMatrix::from_row_slice(3, 3, &[
        2.0,  0.0,  0.0,
        0.0,  2.0, -1.0,
        0.0, -1.0,  2.0,
    ]);
    assert_matrix_eq!(DMatrix::from(&matrix), expected_matrix);
    assert_matrix_eq!(rhs, DVector::from_column_slice(&[2.0, 1.0, 0.0]));

    // Same solution as the unreduced system with x_0 = 1 substituted
    let solution = DMatrix::from(&matrix)
        .lu()
        .solve(&rhs)
        .unwrap();
    assert_matrix_eq!(solution, DVector::from_column_slice(&[1.0, 2.0 / 3.0, 1.0 / 3.0]), comp = abs, tol = 1e-12);
}

#[test]
fn dirichlet_values_out_of_bounds() {
    let mut matrix = tridiagonal_csr();
    let mut rhs = DVector::zeros(3);
    let values: BTreeMap<_, _> = [(3, 1.0)].into_iter().collect();
    assert!(apply_dirichlet_values_csr(&mut matrix, &mut rhs, &values)
        .unwrap_err()
        .is_topology());

    let mut short_rhs = DVector::zeros(2);
    assert!(apply_dirichlet_values_csr(&mut matrix, &mut short_rhs, &BTreeMap::new())
        .unwrap_err()
        .is_topology());
}
