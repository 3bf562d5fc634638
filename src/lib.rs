//! Finite element assembly of the transient heat conduction operator.
//!
//! The central type is [`ThermalOperator`](operator::ThermalOperator), which assembles
//! the stiffness matrix, the mass matrix and the load vector of the temperature field
//! embedded in a multi-field degree-of-freedom space:
//!
//! $$
//! K_{ij} = \int_\Omega k \\, \nabla \phi_i \cdot \nabla \phi_j \\, \mathrm{d}V
//!     + \int_{\partial \Omega} h \\, \phi_i \phi_j \\, \mathrm{d}S, \qquad
//! M_{ij} = \int_\Omega \rho c \\, \phi_i \phi_j \\, \mathrm{d}V, \qquad
//! F_i = \int_{\partial \Omega} h \\, T_\infty \\, \phi_i \\, \mathrm{d}S.
//! $$
use nalgebra::RealField;

pub mod assembly;
pub mod connectivity;
pub mod element;
pub mod error;
pub mod mesh;
pub mod operator;
pub mod parameters;
pub mod properties;
pub mod quadrature;
pub mod space;

pub extern crate nalgebra;
pub extern crate nalgebra_sparse;

pub use error::ThermalError;
pub use operator::ThermalOperator;
pub use parameters::ThermalOperatorParameters;

/// Real scalar types supported by the assembly routines.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}
