//! Material and boundary property providers.
//!
//! Assembly queries properties by field name at the physical quadrature points of a cell or a
//! boundary face. The volume pass asks for `thermal_conductivity` and
//! `density_times_heat_capacity`; the boundary pass asks for `heat_transfer_coefficient` and
//! `ambient_temperature`.
use crate::mesh::{BoundaryId, MaterialId};
use crate::Real;
use nalgebra::Point;
use rustc_hash::FxHashMap;
use std::error::Error;
use std::fmt;
use std::fmt::Display;

pub const THERMAL_CONDUCTIVITY: &str = "thermal_conductivity";
pub const DENSITY_TIMES_HEAT_CAPACITY: &str = "density_times_heat_capacity";
pub const HEAT_TRANSFER_COEFFICIENT: &str = "heat_transfer_coefficient";
pub const AMBIENT_TEMPERATURE: &str = "ambient_temperature";

/// Where a volume property is evaluated.
#[derive(Debug, Clone, Copy)]
pub struct CellQuadratureContext<'a, T: Real, const D: usize> {
    pub cell_index: usize,
    pub material_id: MaterialId,
    /// Physical quadrature points.
    pub points: &'a [Point<T, D>],
}

/// Where a boundary property is evaluated.
#[derive(Debug, Clone, Copy)]
pub struct FaceQuadratureContext<'a, T: Real, const D: usize> {
    pub cell_index: usize,
    pub face_index: usize,
    pub boundary_id: BoundaryId,
    /// Physical quadrature points on the face.
    pub points: &'a [Point<T, D>],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    UnknownField(String),
    UnknownMaterial(MaterialId),
    UnknownBoundary(BoundaryId),
}

impl Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField(name) => write!(f, "unknown field \"{}\"", name),
            Self::UnknownMaterial(id) => write!(f, "unknown material id {}", id),
            Self::UnknownBoundary(id) => write!(f, "unknown boundary id {}", id),
        }
    }
}

impl Error for PropertyError {}

/// Provides material properties inside cells.
pub trait VolumeProperties<T: Real, const D: usize> {
    /// Returns one value of the named field per quadrature point of the context.
    fn get_values(&self, field: &str, context: &CellQuadratureContext<T, D>) -> Result<Vec<T>, PropertyError>;
}

/// Provides properties on boundary faces.
pub trait BoundaryProperties<T: Real, const D: usize> {
    /// Returns one value of the named field per quadrature point of the context.
    fn get_values(&self, field: &str, context: &FaceQuadratureContext<T, D>) -> Result<Vec<T>, PropertyError>;
}

/// Named properties with a constant value everywhere.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformProperties<T> {
    values: FxHashMap<String, T>,
}

impl<T: Real> UniformProperties<T> {
    pub fn new() -> Self {
        Self {
            values: FxHashMap::default(),
        }
    }

    pub fn with_value(mut self, field: impl Into<String>, value: T) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: T) {
        self.values.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Result<T, PropertyError> {
        self.values
            .get(field)
            .copied()
            .ok_or_else(|| PropertyError::UnknownField(field.to_string()))
    }
}

impl<T: Real, const D: usize> VolumeProperties<T, D> for UniformProperties<T> {
    fn get_values(&self, field: &str, context: &CellQuadratureContext<T, D>) -> Result<Vec<T>, PropertyError> {
        Ok(vec![self.get(field)?; context.points.len()])
    }
}

impl<T: Real, const D: usize> BoundaryProperties<T, D> for UniformProperties<T> {
    fn get_values(&self, field: &str, context: &FaceQuadratureContext<T, D>) -> Result<Vec<T>, PropertyError> {
        Ok(vec![self.get(field)?; context.points.len()])
    }
}

/// Piecewise constant properties, selected by material id in cells and by boundary id on faces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialProperties<T> {
    materials: FxHashMap<MaterialId, UniformProperties<T>>,
    boundaries: FxHashMap<BoundaryId, UniformProperties<T>>,
}

impl<T: Real> MaterialProperties<T> {
    pub fn new() -> Self {
        Self {
            materials: FxHashMap::default(),
            boundaries: FxHashMap::default(),
        }
    }

    pub fn with_material(mut self, material_id: MaterialId, properties: UniformProperties<T>) -> Self {
        self.materials.insert(material_id, properties);
        self
    }

    pub fn with_boundary(mut self, boundary_id: BoundaryId, properties: UniformProperties<T>) -> Self {
        self.boundaries.insert(boundary_id, properties);
        self
    }
}

impl<T: Real, const D: usize> VolumeProperties<T, D> for MaterialProperties<T> {
    fn get_values(&self, field: &str, context: &CellQuadratureContext<T, D>) -> Result<Vec<T>, PropertyError> {
        let material = self
            .materials
            .get(&context.material_id)
            .ok_or(PropertyError::UnknownMaterial(context.material_id))?;
        VolumeProperties::get_values(material, field, context)
    }
}

impl<T: Real, const D: usize> BoundaryProperties<T, D> for MaterialProperties<T> {
    fn get_values(&self, field: &str, context: &FaceQuadratureContext<T, D>) -> Result<Vec<T>, PropertyError> {
        let boundary = self
            .boundaries
            .get(&context.boundary_id)
            .ok_or(PropertyError::UnknownBoundary(context.boundary_id))?;
        BoundaryProperties::get_values(boundary, field, context)
    }
}

/// Properties given as functions of the physical position.
pub struct SpatialProperties<T: Real, const D: usize> {
    fields: FxHashMap<String, Box<dyn Fn(&Point<T, D>) -> T>>,
}

impl<T: Real, const D: usize> Default for SpatialProperties<T, D> {
    fn default() -> Self {
        Self {
            fields: FxHashMap::default(),
        }
    }
}

impl<T: Real, const D: usize> fmt::Debug for SpatialProperties<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.fields.keys().collect();
        names.sort_unstable();
        f.debug_struct("SpatialProperties")
            .field("fields", &names)
            .finish()
    }
}

impl<T: Real, const D: usize> SpatialProperties<T, D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field<F>(mut self, field: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Point<T, D>) -> T + 'static,
    {
        self.fields.insert(field.into(), Box::new(f));
        self
    }

    fn evaluate(&self, field: &str, points: &[Point<T, D>]) -> Result<Vec<T>, PropertyError> {
        let f = self
            .fields
            .get(field)
            .ok_or_else(|| PropertyError::UnknownField(field.to_string()))?;
        Ok(points.iter().map(|p| f(p)).collect())
    }
}

impl<T: Real, const D: usize> VolumeProperties<T, D> for SpatialProperties<T, D> {
    fn get_values(&self, field: &str, context: &CellQuadratureContext<T, D>) -> Result<Vec<T>, PropertyError> {
        self.evaluate(field, context.points)
    }
}

impl<T: Real, const D: usize> BoundaryProperties<T, D> for SpatialProperties<T, D> {
    fn get_values(&self, field: &str, context: &FaceQuadratureContext<T, D>) -> Result<Vec<T>, PropertyError> {
        self.evaluate(field, context.points)
    }
}
