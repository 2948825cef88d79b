//! Property-based tests for cross-section measurement.
//!
//! Run with: cargo test -p mesh-section -- proptest

use mesh_section::{
    CrossSectionCalculator, SectionError, SectionParams, calculate_cross_sections,
    graph_to_polydata, trimesh_to_polydata,
};
use nalgebra::{Point3, Rotation3, Vector3};
use ndarray::Array2;
use proptest::prelude::*;

// =============================================================================
// Strategies and fixtures
// =============================================================================

/// Box side lengths.
fn arb_dims() -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(0.5..5.0f64)
}

/// A translation offset, up to a million units from the origin.
fn arb_offset() -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(-1.0e6..1.0e6f64)
}

/// Euler angles for a rigid rotation.
fn arb_angles() -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(-3.1..3.1f64)
}

/// Box `[0, sx] x [0, sy] x [0, sz]` moved by `transform`.
fn box_arrays(
    [sx, sy, sz]: [f64; 3],
    transform: impl Fn(Point3<f64>) -> Point3<f64>,
) -> (Array2<f64>, Array2<usize>) {
    let corners = [
        [0.0, 0.0, 0.0],
        [sx, 0.0, 0.0],
        [sx, sy, 0.0],
        [0.0, sy, 0.0],
        [0.0, 0.0, sz],
        [sx, 0.0, sz],
        [sx, sy, sz],
        [0.0, sy, sz],
    ];
    let mut vertices = Array2::zeros((8, 3));
    for (i, [x, y, z]) in corners.into_iter().enumerate() {
        let p = transform(Point3::new(x, y, z));
        vertices[[i, 0]] = p.x;
        vertices[[i, 1]] = p.y;
        vertices[[i, 2]] = p.z;
    }

    let faces = [
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [3, 7, 6],
        [3, 6, 2],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];
    let faces = Array2::from_shape_vec((12, 3), faces.into_iter().flatten().collect())
        .expect("12 x 3 faces");
    (vertices, faces)
}

fn graph_array(points: &[Point3<f64>]) -> Array2<f64> {
    Array2::from_shape_fn((points.len(), 3), |(i, c)| points[i][c])
}

// =============================================================================
// Invariants
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Translating the mesh and graph together leaves areas unchanged.
    #[test]
    fn proptest_translation_invariant(
        dims in arb_dims(),
        offset in arb_offset(),
        t in 0.1..0.9f64,
    ) {
        let shift = Vector3::from(offset);
        let (vertices, faces) = box_arrays(dims, |p| p + shift);

        let [sx, sy, sz] = dims;
        let start = Point3::new(sx / 2.0, sy / 2.0, t * sz) + shift;
        let end = start + Vector3::new(0.0, 0.0, sz);
        let graph = graph_array(&[start, end]);
        let edges = Array2::from_shape_vec((1, 2), vec![0usize, 1]).unwrap();

        let areas = calculate_cross_sections(
            vertices.view(), faces.view(), graph.view(), edges.view()
        ).unwrap();
        prop_assert!((areas[0] - sx * sy).abs() < 1e-7 * sx * sy);
    }

    /// Rotating the mesh and graph together leaves areas unchanged.
    #[test]
    fn proptest_rotation_invariant(
        dims in arb_dims(),
        angles in arb_angles(),
        t in 0.1..0.9f64,
    ) {
        let [roll, pitch, yaw] = angles;
        let rotation = Rotation3::from_euler_angles(roll, pitch, yaw);
        let (vertices, faces) = box_arrays(dims, |p| rotation * p);

        let [sx, sy, sz] = dims;
        let start = rotation * Point3::new(sx / 2.0, sy / 2.0, t * sz);
        let end = rotation * Point3::new(sx / 2.0, sy / 2.0, t * sz - 1.0);
        let graph = graph_array(&[start, end]);
        let edges = Array2::from_shape_vec((1, 2), vec![0usize, 1]).unwrap();

        let areas = calculate_cross_sections(
            vertices.view(), faces.view(), graph.view(), edges.view()
        ).unwrap();
        prop_assert!((areas[0] - sx * sy).abs() < 1e-8);
    }

    /// One finite, non-negative area per edge, whatever the edges are.
    #[test]
    fn proptest_one_area_per_edge(
        dims in arb_dims(),
        points in prop::collection::vec(prop::array::uniform3(-2.0..7.0f64), 2..12),
        raw_edges in prop::collection::vec((0usize..64, 0usize..64), 1..20),
    ) {
        let (vertices, faces) = box_arrays(dims, |p| p);
        let graph = Array2::from_shape_fn((points.len(), 3), |(i, c)| points[i][c]);
        let n = points.len();
        let flat: Vec<usize> = raw_edges.iter().flat_map(|&(a, b)| [a % n, b % n]).collect();
        let edges = Array2::from_shape_vec((raw_edges.len(), 2), flat).unwrap();

        let calc = CrossSectionCalculator::from_arrays(
            vertices.view(), faces.view(), SectionParams::default()
        ).unwrap();
        match calc.areas(graph.view(), edges.view()) {
            Ok(areas) => {
                prop_assert_eq!(areas.len(), raw_edges.len());
                for area in areas {
                    prop_assert!(area.is_finite() && area >= 0.0);
                }
            }
            Err(SectionError::DegenerateEdge { edge_index, vertex_a, vertex_b }) => {
                prop_assert!(edge_index < raw_edges.len());
                prop_assert_eq!(points[vertex_a], points[vertex_b]);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    /// Graph validation accepts exactly the in-range index arrays.
    #[test]
    fn proptest_graph_validation(
        vertex_count in 1usize..10,
        cols in 1usize..4,
        ids in prop::collection::vec(0usize..16, 1..30),
    ) {
        let rows = ids.len() / cols;
        prop_assume!(rows > 0);
        let edges = Array2::from_shape_vec((rows, cols), ids[..rows * cols].to_vec()).unwrap();
        let vertices = Array2::<f64>::zeros((vertex_count, 3));
        let max = edges.iter().copied().max().unwrap_or(0);

        let result = graph_to_polydata(vertices.view(), edges.view());
        if cols != 2 {
            let is_shape_error = matches!(result, Err(SectionError::InvalidShape { .. }));
            prop_assert!(is_shape_error);
        } else if max >= vertex_count {
            let is_index_error = matches!(
                result,
                Err(SectionError::InvalidVertexIndex { index, .. }) if index == max
            );
            prop_assert!(is_index_error);
        } else {
            let polydata = result.unwrap();
            prop_assert_eq!(polydata.line_count(), rows);
            prop_assert_eq!(polydata.point_count(), vertex_count);
        }

        let tris = trimesh_to_polydata(vertices.view(), edges.view());
        prop_assert_eq!(tris.is_ok(), cols == 3 && max < vertex_count);
    }
}
