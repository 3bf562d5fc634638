//! Configuration of the thermal operator.
use crate::error::ThermalError;
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters of a [`ThermalOperator`](crate::operator::ThermalOperator).
///
/// A JSON document of the form `{ "temperature_component": 1 }` is accepted. A missing key
/// is only rejected when the parameters are bound to a DOF space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThermalOperatorParameters {
    /// Index of the temperature field among the components of the DOF space.
    #[serde(default)]
    pub temperature_component: Option<usize>,
}

impl ThermalOperatorParameters {
    pub fn new(temperature_component: usize) -> Self {
        Self {
            temperature_component: Some(temperature_component),
        }
    }

    pub fn from_json_str(json: &str) -> eyre::Result<Self> {
        serde_json::from_str(json).wrap_err("failed to parse thermal operator parameters")
    }

    pub fn from_json_file(file_path: impl AsRef<Path>) -> eyre::Result<Self> {
        let file_path = file_path.as_ref();
        let json = std::fs::read_to_string(file_path)
            .wrap_err_with(|| format!("failed to read parameter file {}", file_path.display()))?;
        Self::from_json_str(&json)
    }

    /// Returns the temperature component, checked against the number of components of the
    /// DOF space.
    pub fn validated_temperature_component(&self, n_components: usize) -> Result<usize, ThermalError> {
        let component = self
            .temperature_component
            .ok_or_else(|| ThermalError::configuration("missing parameter temperature_component"))?;
        if component >= n_components {
            return Err(ThermalError::configuration(format!(
                "temperature_component {} is out of range for a space with {} components",
                component, n_components
            )));
        }
        Ok(component)
    }
}
