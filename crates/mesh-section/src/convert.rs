//! Conversion of numpy-style arrays into [`PolyData`].
//!
//! Vertices arrive as an `N x 3` float array and topology as an `M x K`
//! index array, where `K = 2` for graph edges and `K = 3` for triangles.
//!
//! # Example
//!
//! ```
//! use mesh_section::convert::{graph_to_polydata, trimesh_to_polydata};
//! use ndarray::array;
//!
//! let vertices = array![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
//!
//! let graph = graph_to_polydata(vertices.view(), array![[0usize, 1], [1, 2]].view()).unwrap();
//! assert_eq!(graph.line_count(), 2);
//!
//! let mesh = trimesh_to_polydata(vertices.view(), array![[0usize, 1, 2]].view()).unwrap();
//! assert_eq!(mesh.poly_count(), 1);
//!
//! // Wrong column count is rejected
//! assert!(graph_to_polydata(vertices.view(), array![[0usize, 1, 2]].view()).is_err());
//! ```

use nalgebra::Point3;
use ndarray::ArrayView2;
use tracing::debug;

use crate::error::{SectionError, SectionResult};
use crate::types::{CellArray, PolyData};

/// Build the point set and a cell array from a vertex array and an `M x K`
/// connectivity array.
///
/// The cells are not attached to the returned polydata; callers decide
/// whether they are lines or polygons.
pub fn numpy_rep_to_polydata(
    vertices: ArrayView2<'_, f64>,
    shapes: ArrayView2<'_, usize>,
) -> SectionResult<(PolyData, CellArray)> {
    let points = points_from_array(vertices)?;

    let arity = shapes.ncols();
    let mut cells = CellArray::with_capacity(shapes.nrows(), shapes.len());
    let mut row_ids = Vec::with_capacity(arity);
    for row in shapes.rows() {
        row_ids.clear();
        row_ids.extend(row.iter().copied());
        cells.push_cell(&row_ids);
    }

    debug!(
        points = points.len(),
        cells = cells.len(),
        arity,
        "Converted array representation"
    );

    Ok((PolyData::with_points(points), cells))
}

/// Convert vertices and an `M x 2` edge array into polydata with line cells.
///
/// # Errors
///
/// - [`SectionError::InvalidShape`] if `edges` does not have two columns
/// - [`SectionError::InvalidVertexIndex`] if an edge refers past the vertex array
/// - [`SectionError::EmptyInput`] if there are no edges
pub fn graph_to_polydata(
    vertices: ArrayView2<'_, f64>,
    edges: ArrayView2<'_, usize>,
) -> SectionResult<PolyData> {
    check_indices("edges", 2, vertices.nrows(), edges)?;
    let (mut polydata, cells) = numpy_rep_to_polydata(vertices, edges)?;
    polydata.set_lines(cells);
    Ok(polydata)
}

/// Convert vertices and an `M x 3` triangle array into polydata with polygon cells.
///
/// # Errors
///
/// - [`SectionError::InvalidShape`] if `tris` does not have three columns
/// - [`SectionError::InvalidVertexIndex`] if a triangle refers past the vertex array
/// - [`SectionError::EmptyInput`] if there are no triangles
pub fn trimesh_to_polydata(
    vertices: ArrayView2<'_, f64>,
    tris: ArrayView2<'_, usize>,
) -> SectionResult<PolyData> {
    check_indices("triangles", 3, vertices.nrows(), tris)?;
    let (mut polydata, cells) = numpy_rep_to_polydata(vertices, tris)?;
    polydata.set_polys(cells);
    Ok(polydata)
}

/// Build triangle polydata from already-typed slices (the file loaders' path).
pub fn polydata_from_faces(
    vertices: &[[f64; 3]],
    faces: &[[u32; 3]],
) -> SectionResult<PolyData> {
    if faces.is_empty() {
        return Err(SectionError::empty_input("mesh has no triangles"));
    }

    let points: Vec<Point3<f64>> = vertices
        .iter()
        .map(|&[x, y, z]| Point3::new(x, y, z))
        .collect();
    check_coordinates(&points)?;

    let mut polys = CellArray::with_capacity(faces.len(), faces.len() * 3);
    let mut max_index = 0usize;
    for &[a, b, c] in faces {
        let ids = [a as usize, b as usize, c as usize];
        max_index = max_index.max(ids[0]).max(ids[1]).max(ids[2]);
        polys.push_cell(&ids);
    }
    if max_index >= points.len() {
        return Err(SectionError::invalid_vertex_index(
            "triangles",
            max_index,
            points.len(),
        ));
    }

    let mut polydata = PolyData::with_points(points);
    polydata.set_polys(polys);
    Ok(polydata)
}

fn check_indices(
    what: &'static str,
    arity: usize,
    vertex_count: usize,
    indices: ArrayView2<'_, usize>,
) -> SectionResult<()> {
    if indices.ncols() != arity {
        return Err(SectionError::invalid_shape(what, arity, indices.ncols()));
    }

    let max_index = indices
        .iter()
        .copied()
        .max()
        .ok_or_else(|| SectionError::empty_input(format!("{} array has no rows", what)))?;

    if max_index >= vertex_count {
        return Err(SectionError::invalid_vertex_index(
            what,
            max_index,
            vertex_count,
        ));
    }

    Ok(())
}

fn points_from_array(vertices: ArrayView2<'_, f64>) -> SectionResult<Vec<Point3<f64>>> {
    if vertices.ncols() != 3 {
        return Err(SectionError::invalid_shape("vertices", 3, vertices.ncols()));
    }

    let points: Vec<Point3<f64>> = vertices
        .rows()
        .into_iter()
        .map(|row| Point3::new(row[0], row[1], row[2]))
        .collect();
    check_coordinates(&points)?;
    Ok(points)
}

fn check_coordinates(points: &[Point3<f64>]) -> SectionResult<()> {
    for (vertex_index, p) in points.iter().enumerate() {
        for (coordinate, value) in [("x", p.x), ("y", p.y), ("z", p.z)] {
            if !value.is_finite() {
                return Err(SectionError::InvalidCoordinate {
                    vertex_index,
                    coordinate,
                    value,
                });
            }
        }
    }
    Ok(())
}
