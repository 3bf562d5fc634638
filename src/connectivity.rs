//! Cell connectivity: which mesh vertices make up a cell, and how the cell's faces are formed.
use crate::element::{ElementFaces, Hex8Element, Quad4Element};
use crate::Real;
use nalgebra::{Point, Point2, Point3};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

pub trait Connectivity: Clone {
    type FaceConnectivity: Connectivity;

    fn num_faces(&self) -> usize;
    fn get_face_connectivity(&self, index: usize) -> Option<Self::FaceConnectivity>;

    fn vertex_indices(&self) -> &[usize];
}

impl Connectivity for () {
    type FaceConnectivity = ();

    fn num_faces(&self) -> usize {
        0
    }

    fn get_face_connectivity(&self, _index: usize) -> Option<Self::FaceConnectivity> {
        None
    }

    fn vertex_indices(&self) -> &[usize] {
        &[]
    }
}

/// Connectivity of a volumetric cell that can be turned into a finite element.
pub trait CellConnectivity<T: Real, const D: usize>: Connectivity {
    type Element: ElementFaces<T, D>;

    /// Builds the element from the mesh vertices, or returns `None` if a vertex index is out of
    /// bounds.
    fn element(&self, vertices: &[Point<T, D>]) -> Option<Self::Element>;
}

/// A line segment between two vertices. Used for the faces of quadrilaterals.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentConnectivity(pub [usize; 2]);

impl Connectivity for SegmentConnectivity {
    type FaceConnectivity = ();

    fn num_faces(&self) -> usize {
        0
    }

    fn get_face_connectivity(&self, _index: usize) -> Option<Self::FaceConnectivity> {
        None
    }

    fn vertex_indices(&self) -> &[usize] {
        &self.0
    }
}

/// Connectivity of a bilinear quadrilateral in two dimensions.
///
/// ```text
/// 3_________2
/// |         |
/// |         |
/// |         |
/// 0_________1
/// ```
/// Face `k` is the segment from vertex `k` to vertex `k + 1 (mod 4)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quad4Connectivity(pub [usize; 4]);

impl Deref for Quad4Connectivity {
    type Target = [usize; 4];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Connectivity for Quad4Connectivity {
    type FaceConnectivity = SegmentConnectivity;

    fn num_faces(&self) -> usize {
        4
    }

    fn get_face_connectivity(&self, index: usize) -> Option<Self::FaceConnectivity> {
        let idx = &self.0;
        if index < 4 {
            Some(SegmentConnectivity([idx[index], idx[(index + 1) % 4]]))
        } else {
            None
        }
    }

    fn vertex_indices(&self) -> &[usize] {
        &self.0
    }
}

impl<T: Real> CellConnectivity<T, 2> for Quad4Connectivity {
    type Element = Quad4Element<T>;

    fn element(&self, vertices: &[Point2<T>]) -> Option<Self::Element> {
        Some(Quad4Element::from_vertices([
            *vertices.get(self.0[0])?,
            *vertices.get(self.0[1])?,
            *vertices.get(self.0[2])?,
            *vertices.get(self.0[3])?,
        ]))
    }
}

/// Connectivity of a trilinear hexahedron.
///
/// Vertices 0 to 3 form the bottom face counter-clockwise, vertices 4 to 7 the top face,
/// with vertex `i + 4` above vertex `i`. Faces are numbered
/// `-z, -y, +x, +y, -x, +z` in terms of the reference coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hex8Connectivity(pub [usize; 8]);

impl Deref for Hex8Connectivity {
    type Target = [usize; 8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Connectivity for Hex8Connectivity {
    type FaceConnectivity = Quad4Connectivity;

    fn num_faces(&self) -> usize {
        6
    }

    fn get_face_connectivity(&self, index: usize) -> Option<Self::FaceConnectivity> {
        let v = &self.0;
        let quad = |a: usize, b: usize, c: usize, d: usize| Some(Quad4Connectivity([v[a], v[b], v[c], v[d]]));
        match index {
            0 => quad(3, 2, 1, 0),
            1 => quad(0, 1, 5, 4),
            2 => quad(1, 2, 6, 5),
            3 => quad(2, 3, 7, 6),
            4 => quad(4, 7, 3, 0),
            5 => quad(5, 6, 7, 4),
            _ => None,
        }
    }

    fn vertex_indices(&self) -> &[usize] {
        &self.0
    }
}

impl<T: Real> CellConnectivity<T, 3> for Hex8Connectivity {
    type Element = Hex8Element<T>;

    fn element(&self, vertices: &[Point3<T>]) -> Option<Self::Element> {
        let mut element_vertices = [Point3::origin(); 8];
        for (vertex, &index) in element_vertices.iter_mut().zip(&self.0) {
            *vertex = *vertices.get(index)?;
        }
        Some(Hex8Element::from_vertices(element_vertices))
    }
}
