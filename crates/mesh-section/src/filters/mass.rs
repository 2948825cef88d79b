//! Area and volume of triangulated polydata.

use serde::Serialize;

use crate::types::PolyData;

/// Integral properties of the triangle cells of a polydata.
///
/// Polygon cells with other than three points are ignored, so run
/// [`TriangleFilter`](super::TriangleFilter) first when the input may hold
/// general polygons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MassProperties {
    /// Sum of triangle areas.
    pub surface_area: f64,

    /// Smallest triangle area (zero when there are no triangles).
    pub min_cell_area: f64,

    /// Largest triangle area (zero when there are no triangles).
    pub max_cell_area: f64,

    /// Number of triangles measured.
    pub triangle_count: usize,

    /// Signed volume from the divergence theorem.
    /// Only meaningful for closed, consistently wound surfaces.
    pub signed_volume: f64,

    /// Absolute value of `signed_volume`.
    pub volume: f64,
}

impl MassProperties {
    /// Measure the triangles of `input`.
    pub fn compute(input: &PolyData) -> Self {
        let mut surface_area = 0.0;
        let mut min_cell_area = f64::INFINITY;
        let mut max_cell_area = 0.0f64;
        let mut triangle_count = 0;
        let mut signed_volume = 0.0;

        for tri in input.triangles() {
            let area = tri.area();
            surface_area += area;
            min_cell_area = min_cell_area.min(area);
            max_cell_area = max_cell_area.max(area);
            triangle_count += 1;

            // Tetrahedron against the origin
            signed_volume += tri.v0.coords.dot(&tri.v1.coords.cross(&tri.v2.coords)) / 6.0;
        }

        if triangle_count == 0 {
            min_cell_area = 0.0;
        }

        Self {
            surface_area,
            min_cell_area,
            max_cell_area,
            triangle_count,
            signed_volume,
            volume: signed_volume.abs(),
        }
    }

    /// True when there was nothing to measure.
    pub fn is_empty(&self) -> bool {
        self.triangle_count == 0
    }
}

impl std::fmt::Display for MassProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Mass Properties:")?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(f, "  Surface Area: {:.6}", self.surface_area)?;
        writeln!(
            f,
            "  Cell Area: {:.6} .. {:.6}",
            self.min_cell_area, self.max_cell_area
        )?;
        writeln!(
            f,
            "  Volume: {:.6} (signed: {:.6})",
            self.volume, self.signed_volume
        )
    }
}
