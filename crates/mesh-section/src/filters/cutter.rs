//! Plane / triangle-mesh intersection.

use hashbrown::{HashMap, HashSet};
use nalgebra::Point3;
use tracing::trace;

use super::PolyDataFilter;
use crate::plane::Plane;
use crate::types::{CellArray, PolyData};

/// Default distance below which a mesh vertex counts as lying on the plane.
pub const DEFAULT_PLANE_TOLERANCE: f64 = 1e-12;

/// Cuts polygon cells with a plane, producing 2-point line cells.
///
/// Intersection points are shared between neighbouring cells: a crossing on
/// mesh edge `(a, b)` is created once and reused by both triangles that own
/// the edge, and a mesh vertex lying on the plane becomes a single point.
/// The resulting segments are therefore connected wherever the mesh is.
///
/// A mesh edge lying in the plane is emitted once, whichever side its
/// triangles are on, so a cut along the open boundary of a surface does
/// not depend on the sign of the normal.
#[derive(Debug, Clone, Copy)]
pub struct PlaneCutter {
    plane: Plane,
    tolerance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CutPoint {
    Vertex(usize),
    Edge(usize, usize),
}

impl PlaneCutter {
    /// Create a cutter for `plane` with the default tolerance.
    pub fn new(plane: Plane) -> Self {
        Self {
            plane,
            tolerance: DEFAULT_PLANE_TOLERANCE,
        }
    }

    /// Set the vertex-on-plane tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.max(0.0);
        self
    }

    /// The cutting plane.
    pub fn plane(&self) -> &Plane {
        &self.plane
    }
}

struct CutBuilder<'a> {
    input: &'a PolyData,
    distances: &'a [f64],
    lookup: HashMap<CutPoint, usize>,
    in_plane: HashSet<CutPoint>,
    points: Vec<Point3<f64>>,
    lines: CellArray,
}

impl CutBuilder<'_> {
    fn point(&mut self, key: CutPoint) -> usize {
        if let Some(&id) = self.lookup.get(&key) {
            return id;
        }

        let position = match key {
            CutPoint::Vertex(v) => self.input.points[v],
            CutPoint::Edge(lo, hi) => {
                let d_lo = self.distances[lo];
                let d_hi = self.distances[hi];
                let t = d_lo / (d_lo - d_hi);
                let a = self.input.points[lo];
                let b = self.input.points[hi];
                Point3::from(a.coords + (b - a) * t)
            }
        };

        let id = self.points.len();
        self.points.push(position);
        self.lookup.insert(key, id);
        id
    }

    fn segment(&mut self, a: CutPoint, b: CutPoint) {
        let ia = self.point(a);
        let ib = self.point(b);
        self.lines.push_cell(&[ia, ib]);
    }
}

fn edge_key(a: usize, b: usize) -> CutPoint {
    if a < b {
        CutPoint::Edge(a, b)
    } else {
        CutPoint::Edge(b, a)
    }
}

impl PolyDataFilter for PlaneCutter {
    fn apply(&self, input: &PolyData) -> PolyData {
        let distances: Vec<f64> = input
            .points
            .iter()
            .map(|p| self.plane.signed_distance(p))
            .collect();
        let side: Vec<i8> = distances
            .iter()
            .map(|&d| {
                if d > self.tolerance {
                    1
                } else if d < -self.tolerance {
                    -1
                } else {
                    0
                }
            })
            .collect();

        // Every vertex on one side: the plane misses the mesh.
        if side.iter().all(|&s| s > 0) || side.iter().all(|&s| s < 0) {
            return PolyData::new();
        }

        let mut builder = CutBuilder {
            input,
            distances: &distances,
            lookup: HashMap::new(),
            in_plane: HashSet::new(),
            points: Vec::new(),
            lines: CellArray::new(),
        };

        for cell in input.polys.iter() {
            if cell.len() < 3 {
                continue;
            }
            // Polygons beyond triangles are fanned from their first point.
            for i in 1..cell.len() - 1 {
                cut_triangle(&mut builder, &side, [cell[0], cell[i], cell[i + 1]]);
            }
        }

        trace!(
            points = builder.points.len(),
            segments = builder.lines.len(),
            "Plane cut complete"
        );

        let mut output = PolyData::with_points(builder.points);
        output.set_lines(builder.lines);
        output
    }
}

fn cut_triangle(builder: &mut CutBuilder<'_>, side: &[i8], tri: [usize; 3]) {
    let s = [side[tri[0]], side[tri[1]], side[tri[2]]];
    let zeros = s.iter().filter(|&&x| x == 0).count();

    match zeros {
        // Coplanar triangles contribute nothing; their boundary edges are
        // picked up from the neighbouring triangles.
        3 => {}
        2 => {
            let Some(off) = s.iter().position(|&x| x != 0) else {
                return;
            };
            let a = tri[(off + 1) % 3];
            let b = tri[(off + 2) % 3];
            if builder.in_plane.insert(edge_key(a, b)) {
                builder.segment(CutPoint::Vertex(a), CutPoint::Vertex(b));
            }
        }
        1 => {
            let Some(on) = s.iter().position(|&x| x == 0) else {
                return;
            };
            let a = tri[(on + 1) % 3];
            let b = tri[(on + 2) % 3];
            let sa = s[(on + 1) % 3];
            let sb = s[(on + 2) % 3];
            if sa != sb {
                builder.segment(CutPoint::Vertex(tri[on]), edge_key(a, b));
            }
        }
        _ => {
            if s[0] == s[1] && s[1] == s[2] {
                return;
            }
            // Exactly one vertex sits alone on its side.
            let lone = if s[0] == s[1] {
                2
            } else if s[0] == s[2] {
                1
            } else {
                0
            };
            let apex = tri[lone];
            let a = tri[(lone + 1) % 3];
            let b = tri[(lone + 2) % 3];
            builder.segment(edge_key(apex, a), edge_key(apex, b));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn cube(size: f64) -> PolyData {
        let h = size / 2.0;
        let points = vec![
            Point3::new(-h, -h, -h),
            Point3::new(h, -h, -h),
            Point3::new(h, h, -h),
            Point3::new(-h, h, -h),
            Point3::new(-h, -h, h),
            Point3::new(h, -h, h),
            Point3::new(h, h, h),
            Point3::new(-h, h, h),
        ];
        let faces = [
            0, 2, 1, 0, 3, 2, // bottom
            4, 5, 6, 4, 6, 7, // top
            0, 1, 5, 0, 5, 4, // front
            3, 7, 6, 3, 6, 2, // back
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        let mut pd = PolyData::with_points(points);
        pd.set_polys(CellArray::from_uniform(3, &faces));
        pd
    }

    fn cut(pd: &PolyData, origin: Point3<f64>, normal: Vector3<f64>) -> PolyData {
        PlaneCutter::new(Plane::new(origin, normal).unwrap()).apply(pd)
    }

    #[test]
    fn test_cut_through_middle() {
        let out = cut(&cube(2.0), Point3::origin(), Vector3::z());

        // Eight side triangles crossed, crossings shared along the eight side edges
        assert_eq!(out.line_count(), 8);
        assert_eq!(out.point_count(), 8);
        for p in &out.points {
            assert!(p.z.abs() < 1e-12);
        }
    }

    #[test]
    fn test_plane_misses_mesh() {
        let out = cut(&cube(2.0), Point3::new(0.0, 0.0, 5.0), Vector3::z());
        assert!(out.is_empty());
        assert_eq!(out.point_count(), 0);
    }

    #[test]
    fn test_plane_through_face_plane_uses_vertices() {
        // Plane flush with the top face: the side triangles touching it
        // contribute the top edges once each, for either normal.
        for normal in [Vector3::z(), -Vector3::z()] {
            let out = cut(&cube(2.0), Point3::new(0.0, 0.0, 1.0), normal);
            assert_eq!(out.point_count(), 4);
            assert_eq!(out.line_count(), 4);
        }
    }

    #[test]
    fn test_plane_through_vertex() {
        // Diagonal plane through two opposite vertical edges
        let out = cut(&cube(2.0), Point3::origin(), Vector3::new(1.0, -1.0, 0.0));
        assert!(out.line_count() >= 4);
        for p in &out.points {
            assert!((p.x - p.y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_quad_is_fanned() {
        let mut pd = PolyData::with_points(vec![
            Point3::new(-1.0, 0.0, -1.0),
            Point3::new(1.0, 0.0, -1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(-1.0, 0.0, 1.0),
        ]);
        let mut polys = CellArray::new();
        polys.push_cell(&[0, 1, 2, 3]);
        pd.set_polys(polys);

        // Both fan triangles straddle x = 0.3 and share the crossing on
        // the 0-2 diagonal.
        let out = cut(&pd, Point3::new(0.3, 0.0, 0.0), Vector3::x());
        assert_eq!(out.line_count(), 2);
        assert_eq!(out.point_count(), 3);
    }

    #[test]
    fn test_open_boundary_independent_of_normal_sign() {
        // Open square tube whose bottom rim lies in z = 0
        let mut pd = PolyData::with_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ]);
        let mut polys = CellArray::new();
        for i in 0..4 {
            let j = (i + 1) % 4;
            polys.push_cell(&[i, j, j + 4]);
            polys.push_cell(&[i, j + 4, i + 4]);
        }
        pd.set_polys(polys);

        for normal in [Vector3::z(), -Vector3::z()] {
            let out = cut(&pd, Point3::origin(), normal);
            assert_eq!(out.line_count(), 4);
            assert_eq!(out.point_count(), 4);
        }
    }
}
