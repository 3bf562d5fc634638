//! Basic procedural mesh generation routines.
use crate::connectivity::{Hex8Connectivity, Quad4Connectivity};
use crate::mesh::{HexMesh, QuadMesh2d};
use crate::Real;
use nalgebra::{convert, Point2, Point3, Vector2};

pub fn create_unit_square_uniform_quad_mesh_2d<T: Real>(cells_per_dim: usize) -> QuadMesh2d<T> {
    create_rectangular_uniform_quad_mesh_2d(T::one(), 1, 1, cells_per_dim, &Vector2::zeros())
}

pub fn create_unit_box_uniform_hex_mesh_3d<T: Real>(cells_per_dim: usize) -> HexMesh<T> {
    create_rectangular_uniform_hex_mesh(T::one(), 1, 1, 1, cells_per_dim)
}

fn as_real<T: Real>(i: usize) -> T {
    convert(i as f64)
}

/// Generates an axis-aligned rectangular uniform mesh given a unit length,
/// dimensions as multipliers of the unit length and the number of cells per unit length.
///
/// Vertices are numbered row by row starting at `bottom_left`, and cells are oriented
/// counter-clockwise, so that face 0 of every cell points in the negative y direction.
pub fn create_rectangular_uniform_quad_mesh_2d<T: Real>(
    unit_length: T,
    units_x: usize,
    units_y: usize,
    cells_per_unit: usize,
    bottom_left: &Vector2<T>,
) -> QuadMesh2d<T> {
    if cells_per_unit == 0 || units_x == 0 || units_y == 0 {
        return QuadMesh2d::from_vertices_and_connectivity(Vec::new(), Vec::new());
    }

    let cell_size = unit_length / as_real(cells_per_unit);
    let num_cells_x = units_x * cells_per_unit;
    let num_cells_y = units_y * cells_per_unit;
    let num_vertices_x = num_cells_x + 1;
    let num_vertices_y = num_cells_y + 1;

    let idx = |i: usize, j: usize| num_vertices_x * j + i;

    let mut vertices = Vec::with_capacity(num_vertices_x * num_vertices_y);
    for j in 0..num_vertices_y {
        for i in 0..num_vertices_x {
            let offset = Vector2::new(as_real::<T>(i), as_real(j)) * cell_size;
            vertices.push(Point2::from(bottom_left + offset));
        }
    }

    let mut cells = Vec::with_capacity(num_cells_x * num_cells_y);
    for j in 0..num_cells_y {
        for i in 0..num_cells_x {
            cells.push(Quad4Connectivity([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1), idx(i, j + 1)]));
        }
    }

    QuadMesh2d::from_vertices_and_connectivity(vertices, cells)
}

/// Generates an axis-aligned box mesh of trilinear hexahedra with its corner at the origin.
pub fn create_rectangular_uniform_hex_mesh<T: Real>(
    unit_length: T,
    units_x: usize,
    units_y: usize,
    units_z: usize,
    cells_per_unit: usize,
) -> HexMesh<T> {
    if cells_per_unit == 0 || units_x == 0 || units_y == 0 || units_z == 0 {
        return HexMesh::from_vertices_and_connectivity(Vec::new(), Vec::new());
    }

    let cell_size = unit_length / as_real(cells_per_unit);
    let num_cells_x = units_x * cells_per_unit;
    let num_cells_y = units_y * cells_per_unit;
    let num_cells_z = units_z * cells_per_unit;
    let num_vertices_x = num_cells_x + 1;
    let num_vertices_y = num_cells_y + 1;
    let num_vertices_z = num_cells_z + 1;

    let idx = |i: usize, j: usize, k: usize| (num_vertices_x * num_vertices_y) * k + num_vertices_x * j + i;

    let mut vertices = Vec::with_capacity(num_vertices_x * num_vertices_y * num_vertices_z);
    for k in 0..num_vertices_z {
        for j in 0..num_vertices_y {
            for i in 0..num_vertices_x {
                vertices.push(Point3::new(
                    as_real::<T>(i) * cell_size,
                    as_real::<T>(j) * cell_size,
                    as_real::<T>(k) * cell_size,
                ));
            }
        }
    }

    let mut cells = Vec::with_capacity(num_cells_x * num_cells_y * num_cells_z);
    for k in 0..num_cells_z {
        for j in 0..num_cells_y {
            for i in 0..num_cells_x {
                cells.push(Hex8Connectivity([
                    idx(i, j, k),
                    idx(i + 1, j, k),
                    idx(i + 1, j + 1, k),
                    idx(i, j + 1, k),
                    idx(i, j, k + 1),
                    idx(i + 1, j, k + 1),
                    idx(i + 1, j + 1, k + 1),
                    idx(i, j + 1, k + 1),
                ]));
            }
        }
    }

    HexMesh::from_vertices_and_connectivity(vertices, cells)
}
