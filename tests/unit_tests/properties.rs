use cap_thermal::properties::{
    BoundaryProperties, CellQuadratureContext, FaceQuadratureContext, MaterialProperties, PropertyError,
    SpatialProperties, UniformProperties, VolumeProperties, AMBIENT_TEMPERATURE, HEAT_TRANSFER_COEFFICIENT,
    THERMAL_CONDUCTIVITY,
};
use nalgebra::Point2;

fn points() -> Vec<Point2<f64>> {
    vec![Point2::new(0.0, 0.0), Point2::new(0.5, 1.0), Point2::new(2.0, 3.0)]
}

fn cell_context(points: &[Point2<f64>], material_id: u32) -> CellQuadratureContext<f64, 2> {
    CellQuadratureContext {
        cell_index: 7,
        material_id,
        points,
    }
}

fn face_context(points: &[Point2<f64>], boundary_id: u32) -> FaceQuadratureContext<f64, 2> {
    FaceQuadratureContext {
        cell_index: 7,
        face_index: 2,
        boundary_id,
        points,
    }
}

#[test]
fn uniform_properties_repeat_value_per_point() {
    let properties = UniformProperties::new().with_value(THERMAL_CONDUCTIVITY, 2.5);
    let points = points();

    let values = VolumeProperties::get_values(&properties, THERMAL_CONDUCTIVITY, &cell_context(&points, 0)).unwrap();
    assert_eq!(values, vec![2.5; 3]);
    let values = BoundaryProperties::get_values(&properties, THERMAL_CONDUCTIVITY, &face_context(&points[..2], 0)).unwrap();
    assert_eq!(values, vec![2.5; 2]);

    assert_eq!(
        VolumeProperties::get_values(&properties, "density", &cell_context(&points, 0)),
        Err(PropertyError::UnknownField("density".to_string()))
    );
}

#[test]
fn uniform_properties_insert_overwrites() {
    let mut properties = UniformProperties::new();
    properties.insert(AMBIENT_TEMPERATURE, 290.0);
    properties.insert(AMBIENT_TEMPERATURE, 300.0);
    assert_eq!(properties.get(AMBIENT_TEMPERATURE), Ok(300.0));
}

#[test]
fn material_properties_select_by_id() {
    let properties = MaterialProperties::new()
        .with_material(0, UniformProperties::new().with_value(THERMAL_CONDUCTIVITY, 1.0))
        .with_material(3, UniformProperties::new().with_value(THERMAL_CONDUCTIVITY, 4.0))
        .with_boundary(1, UniformProperties::new().with_value(HEAT_TRANSFER_COEFFICIENT, 10.0));
    let points = points();

    assert_eq!(
        VolumeProperties::get_values(&properties, THERMAL_CONDUCTIVITY, &cell_context(&points, 3)).unwrap(),
        vec![4.0; 3]
    );
    assert_eq!(
        VolumeProperties::get_values(&properties, THERMAL_CONDUCTIVITY, &cell_context(&points, 1)),
        Err(PropertyError::UnknownMaterial(1))
    );
    assert_eq!(
        BoundaryProperties::get_values(&properties, HEAT_TRANSFER_COEFFICIENT, &face_context(&points, 1)).unwrap(),
        vec![10.0; 3]
    );
    assert_eq!(
        BoundaryProperties::get_values(&properties, HEAT_TRANSFER_COEFFICIENT, &face_context(&points, 0)),
        Err(PropertyError::UnknownBoundary(0))
    );
}

#[test]
fn spatial_properties_evaluate_at_points() {
    let properties = SpatialProperties::new().with_field(AMBIENT_TEMPERATURE, |p: &Point2<f64>| 300.0 + p.x + 2.0 * p.y);
    let points = points();

    let values = BoundaryProperties::get_values(&properties, AMBIENT_TEMPERATURE, &face_context(&points, 0)).unwrap();
    assert_eq!(values, vec![300.0, 302.5, 308.0]);
    assert!(VolumeProperties::get_values(&properties, THERMAL_CONDUCTIVITY, &cell_context(&points, 0)).is_err());
    assert!(format!("{:?}", properties).contains(AMBIENT_TEMPERATURE));
}

#[test]
fn property_error_display() {
    assert_eq!(PropertyError::UnknownField("k".to_string()).to_string(), "unknown field \"k\"");
    assert_eq!(PropertyError::UnknownMaterial(2).to_string(), "unknown material id 2");
    assert_eq!(PropertyError::UnknownBoundary(5).to_string(), "unknown boundary id 5");
}
