//! Errors produced while setting up or assembling the thermal operator.
use crate::properties::PropertyError;
use std::error::Error;
use std::fmt;
use std::fmt::Display;

/// Library-wide error type.
///
/// Every variant is fatal: assembly is deterministic, so a failure always points to
/// a misconfiguration or a violated contract of one of the collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum ThermalError {
    /// The parameters do not identify a valid temperature component.
    Configuration(String),
    /// A property provider could not deliver the requested field.
    Provider {
        field: String,
        cell: usize,
        kind: ProviderErrorKind,
    },
    /// Mesh, DOF or constraint data are inconsistent.
    Topology(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderErrorKind {
    /// The provider rejected the lookup.
    Lookup(PropertyError),
    /// The provider returned a different number of values than there are quadrature points.
    CountMismatch { expected: usize, actual: usize },
}

impl ThermalError {
    pub(crate) fn topology(message: impl Into<String>) -> Self {
        Self::Topology(message.into())
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }

    pub fn is_topology(&self) -> bool {
        matches!(self, Self::Topology(_))
    }
}

impl Display for ThermalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(message) => write!(f, "Configuration error: {}", message),
            Self::Provider { field, cell, kind } => match kind {
                ProviderErrorKind::Lookup(err) => {
                    write!(f, "Failed to look up field \"{}\" on cell {}: {}", field, cell, err)
                }
                ProviderErrorKind::CountMismatch { expected, actual } => write!(
                    f,
                    "Field \"{}\" on cell {} has {} values, but there are {} quadrature points",
                    field, cell, actual, expected
                ),
            },
            Self::Topology(message) => write!(f, "Topology error: {}", message),
        }
    }
}

impl Error for ThermalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Provider {
                kind: ProviderErrorKind::Lookup(err),
                ..
            } => Some(err),
            _ => None,
        }
    }
}
