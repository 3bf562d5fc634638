//! Building blocks for finite element assembly.
//!
//! - [`local`] evaluates shape functions on cells and faces and computes element matrices.
//! - [`extract`] selects the DOFs of a single field from multi-field element data.
//! - [`constraints`] scatters element data into global containers while honoring
//!   linear DOF constraints.
//! - [`global`] contains the global container abstractions and sparsity pattern construction.
pub mod constraints;
pub mod extract;
pub mod global;
pub mod local;
