//! Polygon triangulation by ear clipping.

use nalgebra::{Point3, Vector3};
use tracing::{trace, warn};

use super::PolyDataFilter;
use crate::plane::orthonormal_basis;
use crate::types::{CellArray, PolyData};

/// Converts polygon cells of any size into triangles.
///
/// Each polygon is projected into its own best-fit plane (Newell normal)
/// and ear clipped. Polygons that are not simple fall back to a fan once
/// clipping stops making progress. Line cells are not carried over.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriangleFilter;

impl TriangleFilter {
    /// Create a triangle filter.
    pub fn new() -> Self {
        Self
    }
}

impl PolyDataFilter for TriangleFilter {
    fn apply(&self, input: &PolyData) -> PolyData {
        let mut polys = CellArray::with_capacity(input.poly_count(), input.poly_count() * 3);
        let mut ring = Vec::new();

        for cell in input.polys.iter() {
            ring.clear();
            for &id in cell {
                if ring.last() != Some(&id) {
                    ring.push(id);
                }
            }
            // Closed strips repeat their first point at the end.
            while ring.len() > 1 && ring.first() == ring.last() {
                ring.pop();
            }

            match ring.len() {
                0..=2 => {}
                3 => polys.push_cell(&ring),
                _ => {
                    for tri in ear_clip(&input.points, &ring) {
                        polys.push_cell(&tri);
                    }
                }
            }
        }

        trace!(
            polygons = input.poly_count(),
            triangles = polys.len(),
            "Triangulated polygons"
        );

        let mut output = PolyData::with_points(input.points.clone());
        output.set_polys(polys);
        output
    }
}

/// Newell's method: a normal whose length is twice the polygon's vector area.
///
/// Coordinates are taken relative to `center` so that rings far from the
/// origin keep their precision.
fn newell_normal(points: &[Point3<f64>], ring: &[usize], center: &Point3<f64>) -> Vector3<f64> {
    let mut normal = Vector3::zeros();
    for i in 0..ring.len() {
        let a = points[ring[i]] - center;
        let b = points[ring[(i + 1) % ring.len()]] - center;
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

fn ring_centroid(points: &[Point3<f64>], ring: &[usize]) -> Point3<f64> {
    let sum = ring
        .iter()
        .fold(Vector3::zeros(), |acc, &id| acc + points[id].coords);
    Point3::from(sum / ring.len() as f64)
}

/// Triangulate one polygon ring, returning triangles of original point ids.
fn ear_clip(points: &[Point3<f64>], ring: &[usize]) -> Vec<[usize; 3]> {
    let center = ring_centroid(points, ring);
    let normal = newell_normal(points, ring, &center);
    let length = normal.norm();
    if length <= f64::EPSILON * f64::EPSILON {
        // No enclosed area to triangulate
        return Vec::new();
    }
    let (u, v) = orthonormal_basis(&(normal / length));

    let flat: Vec<(f64, f64)> = ring
        .iter()
        .map(|&id| {
            let d = points[id] - center;
            (d.dot(&u), d.dot(&v))
        })
        .collect();

    // Scale for the collinearity test, taken in the ring's own frame so it
    // follows the polygon's size rather than its position.
    let extent = flat
        .iter()
        .fold(0.0f64, |m, &(x, y)| m.max(x.abs()).max(y.abs()))
        .max(f64::MIN_POSITIVE);
    let collinear_eps = extent * extent * 1e-14;

    let mut remaining: Vec<usize> = (0..ring.len()).collect();
    let mut triangles = Vec::with_capacity(ring.len() - 2);

    while remaining.len() > 3 {
        let n = remaining.len();
        let mut clipped = false;

        for i in 0..n {
            let prev = remaining[(i + n - 1) % n];
            let curr = remaining[i];
            let next = remaining[(i + 1) % n];

            let turn = cross(flat[prev], flat[curr], flat[next]);
            if turn.abs() <= collinear_eps {
                // Collinear vertex: removing it changes no area
                remaining.remove(i);
                clipped = true;
                break;
            }

            if turn > 0.0 && is_ear(&flat, &remaining, prev, curr, next) {
                triangles.push([ring[prev], ring[curr], ring[next]]);
                remaining.remove(i);
                clipped = true;
                break;
            }
        }

        if !clipped {
            warn!(
                "Ear clipping stuck with {} vertices remaining, using fan triangulation",
                remaining.len()
            );
            break;
        }
    }

    if remaining.len() >= 3 {
        let hub = remaining[0];
        for i in 1..remaining.len() - 1 {
            triangles.push([ring[hub], ring[remaining[i]], ring[remaining[i + 1]]]);
        }
    }

    triangles
}

fn cross(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

/// No other remaining vertex may lie inside the candidate ear.
fn is_ear(flat: &[(f64, f64)], remaining: &[usize], prev: usize, curr: usize, next: usize) -> bool {
    let (a, b, c) = (flat[prev], flat[curr], flat[next]);
    for &idx in remaining {
        if idx == prev || idx == curr || idx == next {
            continue;
        }
        let p = flat[idx];
        if p == a || p == b || p == c {
            continue;
        }
        if point_in_triangle(p, a, b, c) {
            return false;
        }
    }
    true
}

fn point_in_triangle(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;

    !(has_neg && has_pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(coords: &[(f64, f64)], closed_repeat: bool) -> PolyData {
        let points: Vec<Point3<f64>> = coords.iter().map(|&(x, y)| Point3::new(x, y, 0.0)).collect();
        let mut ids: Vec<usize> = (0..points.len()).collect();
        if closed_repeat {
            ids.push(0);
        }
        let mut pd = PolyData::with_points(points);
        let mut polys = CellArray::new();
        polys.push_cell(&ids);
        pd.set_polys(polys);
        pd
    }

    fn area(pd: &PolyData) -> f64 {
        pd.triangles().map(|t| t.area()).sum()
    }

    #[test]
    fn test_square() {
        let pd = polygon(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)], false);
        let out = TriangleFilter::new().apply(&pd);
        assert_eq!(out.poly_count(), 2);
        assert!((area(&out) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_closed_strip_with_repeat() {
        let pd = polygon(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], true);
        let out = TriangleFilter::new().apply(&pd);
        assert_eq!(out.poly_count(), 2);
        assert!((area(&out) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_concave_l_shape() {
        // L-shape: 2x2 square missing its upper right 1x1 quadrant
        let pd = polygon(
            &[
                (0.0, 0.0),
                (2.0, 0.0),
                (2.0, 1.0),
                (1.0, 1.0),
                (1.0, 2.0),
                (0.0, 2.0),
            ],
            false,
        );
        let out = TriangleFilter::new().apply(&pd);
        assert!((area(&out) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_clockwise_ring() {
        let pd = polygon(&[(0.0, 0.0), (0.0, 3.0), (3.0, 3.0), (3.0, 0.0)], false);
        let out = TriangleFilter::new().apply(&pd);
        assert!((area(&out) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_collinear_points_are_skipped() {
        // Square with a point in the middle of each side
        let pd = polygon(
            &[
                (0.0, 0.0),
                (1.0, 0.0),
                (2.0, 0.0),
                (2.0, 1.0),
                (2.0, 2.0),
                (1.0, 2.0),
                (0.0, 2.0),
                (0.0, 1.0),
            ],
            false,
        );
        let out = TriangleFilter::new().apply(&pd);
        assert!((area(&out) - 4.0).abs() < 1e-12);
        assert!(out.triangles().all(|t| t.area() > 0.0));
    }

    #[test]
    fn test_degenerate_polygons_dropped() {
        let pd = polygon(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)], false);
        assert_eq!(TriangleFilter::new().apply(&pd).poly_count(), 0);

        let pd = polygon(&[(0.0, 0.0), (1.0, 0.0)], true);
        assert_eq!(TriangleFilter::new().apply(&pd).poly_count(), 0);
    }

    #[test]
    fn test_tilted_polygon() {
        // Unit square in the plane x = z
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let mut pd = PolyData::with_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(s, 0.0, s),
            Point3::new(s, 1.0, s),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        let mut polys = CellArray::new();
        polys.push_cell(&[0, 1, 2, 3]);
        pd.set_polys(polys);
        let out = TriangleFilter::new().apply(&pd);
        assert!((area(&out) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_polygon_far_from_origin() {
        // Regular 64-gon of radius 1 centred a million units away
        let n = 64;
        let offset = 1.0e6;
        let points: Vec<Point3<f64>> = (0..n)
            .map(|i| {
                let angle = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
                Point3::new(offset + angle.cos(), offset + angle.sin(), 3.0)
            })
            .collect();
        let mut pd = PolyData::with_points(points);
        let mut polys = CellArray::new();
        polys.push_cell(&(0..n).collect::<Vec<_>>());
        pd.set_polys(polys);

        let out = TriangleFilter::new().apply(&pd);
        let expected = 0.5 * n as f64 * (2.0 * std::f64::consts::PI / n as f64).sin();
        assert_eq!(out.poly_count(), n - 2);
        assert!((area(&out) - expected).abs() < 1e-6);
    }
}
