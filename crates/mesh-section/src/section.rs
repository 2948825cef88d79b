//! Cross-sectional areas of a triangle mesh along the edges of a graph.
//!
//! Every graph edge `(a, b)` defines a cutting plane through `a`, normal to
//! the edge. The mesh is cut with that plane, the resulting segments are
//! cleaned, reduced to the contour nearest `a`, joined into closed strips,
//! triangulated, and the area of the triangles is the cross-section.
//!
//! This is the usual way to measure vessel or airway calibre along a
//! centreline skeleton: the skeleton graph sits inside the surface, so the
//! contour closest to each edge start is the lumen that edge runs through.
//!
//! # Example
//!
//! ```
//! use mesh_section::section::calculate_cross_sections;
//! use ndarray::array;
//!
//! // A unit square tube along z, open at both ends
//! let vertices = array![
//!     [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0],
//!     [0.0, 0.0, 4.0], [1.0, 0.0, 4.0], [1.0, 1.0, 4.0], [0.0, 1.0, 4.0],
//! ];
//! let faces = array![
//!     [0usize, 1, 5], [0, 5, 4], [1, 2, 6], [1, 6, 5],
//!     [2, 3, 7], [2, 7, 6], [3, 0, 4], [3, 4, 7],
//! ];
//! let skeleton = array![[0.5, 0.5, 1.0], [0.5, 0.5, 3.0]];
//! let edges = array![[0usize, 1]];
//!
//! let areas = calculate_cross_sections(
//!     vertices.view(),
//!     faces.view(),
//!     skeleton.view(),
//!     edges.view(),
//! )
//! .unwrap();
//! assert!((areas[0] - 1.0).abs() < 1e-9);
//! ```

use nalgebra::{Point3, Vector3};
use ndarray::ArrayView2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::convert::{graph_to_polydata, trimesh_to_polydata};
use crate::error::{SectionError, SectionResult};
use crate::filters::{
    CleanPolyData, ConnectivityFilter, ExtractionMode, MassProperties, PlaneCutter,
    PolyDataFilter, Stripper, TriangleFilter,
};
use crate::plane::Plane;
use crate::tracing_ext::{OperationTimer, log_polydata_stats, log_progress};
use crate::types::PolyData;

/// Which contours of a cut count towards the measured area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionSelection {
    /// The contour passing closest to the edge start.
    #[default]
    Closest,
    /// The contour made of the most segments.
    Largest,
    /// Every contour; areas of separate contours are summed.
    All,
}

impl std::fmt::Display for RegionSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionSelection::Closest => write!(f, "closest"),
            RegionSelection::Largest => write!(f, "largest"),
            RegionSelection::All => write!(f, "all"),
        }
    }
}

/// Tuning for cross-section measurement.
///
/// Deserializes from partial JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionParams {
    /// Contour selection.
    pub region: RegionSelection,

    /// Distance below which cut points are merged.
    pub merge_tolerance: f64,

    /// Distance below which a mesh vertex is taken to lie on the plane.
    pub plane_tolerance: f64,

    /// Measure edges on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SectionParams {
    fn default() -> Self {
        Self {
            region: RegionSelection::Closest,
            merge_tolerance: 1e-9,
            plane_tolerance: crate::filters::DEFAULT_PLANE_TOLERANCE,
            parallel: true,
        }
    }
}

impl SectionParams {
    /// Set the contour selection.
    pub fn with_region(mut self, region: RegionSelection) -> Self {
        self.region = region;
        self
    }

    /// Set the point merge tolerance.
    pub fn with_merge_tolerance(mut self, tolerance: f64) -> Self {
        self.merge_tolerance = tolerance;
        self
    }

    /// Set the vertex-on-plane tolerance.
    pub fn with_plane_tolerance(mut self, tolerance: f64) -> Self {
        self.plane_tolerance = tolerance;
        self
    }

    /// Enable or disable parallel measurement.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Parse from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize to a pretty JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Measurements of one plane cut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionProfile {
    /// Enclosed area of the selected contours.
    pub area: f64,

    /// Total length of the selected contours.
    pub perimeter: f64,

    /// Number of strips the selected contours were joined into.
    pub contour_count: usize,

    /// True when every strip is a closed loop.
    pub closed: bool,

    /// Number of distinct contour points.
    pub point_count: usize,

    /// Area-weighted centroid of the section, if it has any area.
    pub centroid: Option<Point3<f64>>,

    /// The cutting plane.
    pub plane: Plane,
}

impl SectionProfile {
    /// Profile of a plane that does not meet the mesh.
    pub fn empty(plane: Plane) -> Self {
        Self {
            area: 0.0,
            perimeter: 0.0,
            contour_count: 0,
            closed: false,
            point_count: 0,
            centroid: None,
            plane,
        }
    }

    /// True when the plane missed the mesh or the selected contour.
    pub fn is_empty(&self) -> bool {
        self.contour_count == 0
    }
}

impl std::fmt::Display for SectionProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Section Profile:")?;
        writeln!(
            f,
            "  Plane: origin [{:.3}, {:.3}, {:.3}] normal [{:.3}, {:.3}, {:.3}]",
            self.plane.origin.x,
            self.plane.origin.y,
            self.plane.origin.z,
            self.plane.normal.x,
            self.plane.normal.y,
            self.plane.normal.z
        )?;
        writeln!(f, "  Area: {:.6}", self.area)?;
        writeln!(f, "  Perimeter: {:.6}", self.perimeter)?;
        writeln!(
            f,
            "  Contours: {} ({})",
            self.contour_count,
            if self.closed { "closed" } else { "OPEN" }
        )?;
        writeln!(f, "  Points: {}", self.point_count)?;
        if let Some(c) = &self.centroid {
            writeln!(f, "  Centroid: [{:.3}, {:.3}, {:.3}]", c.x, c.y, c.z)?;
        }
        Ok(())
    }
}

/// Measures plane sections of one triangle mesh.
///
/// The calculator owns the mesh and is immutable once built; filters are
/// created per cut, so profiles are independent of each other and of the
/// order edges are processed in.
#[derive(Debug, Clone)]
pub struct CrossSectionCalculator {
    mesh: PolyData,
    params: SectionParams,
}

impl CrossSectionCalculator {
    /// Create a calculator for a triangle mesh.
    ///
    /// # Errors
    ///
    /// - [`SectionError::EmptyInput`] if the mesh has no polygon cells
    /// - [`SectionError::InvalidVertexIndex`] if a cell refers past the point set
    pub fn new(mesh: PolyData, params: SectionParams) -> SectionResult<Self> {
        if mesh.poly_count() == 0 {
            return Err(SectionError::empty_input("mesh has no triangles"));
        }
        match mesh.polys.max_id() {
            Some(max) if max >= mesh.point_count() => {
                return Err(SectionError::invalid_vertex_index(
                    "triangles",
                    max,
                    mesh.point_count(),
                ));
            }
            _ => {}
        }

        debug!(
            points = mesh.point_count(),
            polys = mesh.poly_count(),
            region = %params.region,
            "Created cross-section calculator"
        );

        Ok(Self { mesh, params })
    }

    /// Create a calculator from `N x 3` vertices and `M x 3` triangle indices.
    pub fn from_arrays(
        vertices: ArrayView2<'_, f64>,
        faces: ArrayView2<'_, usize>,
        params: SectionParams,
    ) -> SectionResult<Self> {
        Self::new(trimesh_to_polydata(vertices, faces)?, params)
    }

    /// The mesh being measured.
    pub fn mesh(&self) -> &PolyData {
        &self.mesh
    }

    /// The measurement parameters.
    pub fn params(&self) -> &SectionParams {
        &self.params
    }

    fn region_filter(&self, seed: Point3<f64>) -> ConnectivityFilter {
        let mode = match self.params.region {
            RegionSelection::Closest => ExtractionMode::ClosestPointRegion(seed),
            RegionSelection::Largest => ExtractionMode::LargestRegion,
            RegionSelection::All => ExtractionMode::AllRegions,
        };
        ConnectivityFilter::new(mode)
    }

    /// Cut the mesh with `plane` and measure the contour selected by `seed`.
    pub fn profile(&self, plane: &Plane, seed: Point3<f64>) -> SectionProfile {
        let cut = PlaneCutter::new(*plane)
            .with_tolerance(self.params.plane_tolerance)
            .apply(&self.mesh);
        log_polydata_stats(&cut, "cut");
        if cut.is_empty() {
            return SectionProfile::empty(*plane);
        }

        let cleaned = CleanPolyData::new(self.params.merge_tolerance).apply(&cut);
        log_polydata_stats(&cleaned, "clean");

        let region = self.region_filter(seed).apply(&cleaned);
        log_polydata_stats(&region, "connectivity");

        let strips = Stripper::new().apply(&region);
        log_polydata_stats(&strips, "strip");
        if strips.line_count() == 0 {
            return SectionProfile::empty(*plane);
        }

        let triangles = TriangleFilter::new().apply(&strips.lines_as_polys());
        log_polydata_stats(&triangles, "triangulate");
        let mass = MassProperties::compute(&triangles);

        let mut perimeter = 0.0;
        let mut closed = true;
        for strip in strips.lines.iter() {
            let positions: Vec<Point3<f64>> = strips.cell_points(strip).collect();
            perimeter += positions
                .windows(2)
                .map(|w| (w[1] - w[0]).norm())
                .sum::<f64>();
            closed &= strip.len() > 3 && strip.first() == strip.last();
        }

        SectionProfile {
            area: mass.surface_area,
            perimeter,
            contour_count: strips.line_count(),
            closed,
            point_count: strips.point_count(),
            centroid: area_centroid(&triangles),
            plane: *plane,
        }
    }

    /// Measure one profile per graph edge, in edge order.
    ///
    /// Edge `k = (a, b)` is cut by the plane through vertex `a` with normal
    /// along `a - b`, and the contour nearest `a` is kept (with the default
    /// region selection). A plane that misses the mesh gives an empty
    /// profile with zero area.
    ///
    /// # Errors
    ///
    /// - Any error of [`graph_to_polydata`] for a malformed graph
    /// - [`SectionError::DegenerateEdge`] for an edge whose endpoints coincide
    pub fn profiles(
        &self,
        graph_vertices: ArrayView2<'_, f64>,
        graph_edges: ArrayView2<'_, usize>,
    ) -> SectionResult<Vec<SectionProfile>> {
        let graph = graph_to_polydata(graph_vertices, graph_edges)?;
        self.graph_profiles(&graph)
    }

    /// Measure one profile per line cell of an already converted graph.
    pub fn graph_profiles(&self, graph: &PolyData) -> SectionResult<Vec<SectionProfile>> {
        let cuts = edge_planes(graph)?;
        let timer =
            OperationTimer::with_context("cross_sections", self.mesh.point_count(), cuts.len());
        // Worker threads log filter stages under the operation's span.
        let span = timer.span();

        let profiles: Vec<SectionProfile> = if self.params.parallel {
            cuts.par_iter()
                .map(|(plane, seed)| span.in_scope(|| self.profile(plane, *seed)))
                .collect()
        } else {
            let total = cuts.len();
            cuts.iter()
                .enumerate()
                .map(|(k, (plane, seed))| {
                    let profile = span.in_scope(|| self.profile(plane, *seed));
                    if (k + 1) % 256 == 0 {
                        log_progress("cross_sections", k + 1, total);
                    }
                    profile
                })
                .collect()
        };

        let misses = profiles.iter().filter(|p| p.is_empty()).count();
        info!(
            edges = profiles.len(),
            misses = misses,
            "Measured cross sections"
        );

        Ok(profiles)
    }

    /// Cross-sectional area per graph edge, in edge order.
    pub fn areas(
        &self,
        graph_vertices: ArrayView2<'_, f64>,
        graph_edges: ArrayView2<'_, usize>,
    ) -> SectionResult<Vec<f64>> {
        Ok(self
            .profiles(graph_vertices, graph_edges)?
            .into_iter()
            .map(|p| p.area)
            .collect())
    }
}

/// Cutting plane and region seed for every line cell of `graph`.
fn edge_planes(graph: &PolyData) -> SectionResult<Vec<(Plane, Point3<f64>)>> {
    graph
        .lines
        .iter()
        .enumerate()
        .map(|(edge_index, cell)| {
            let (vertex_a, vertex_b) = (cell[0], cell[cell.len() - 1]);
            let a = graph.points[vertex_a];
            let b = graph.points[vertex_b];
            let plane = Plane::from_edge(a, b).map_err(|_| SectionError::DegenerateEdge {
                edge_index,
                vertex_a,
                vertex_b,
            })?;
            Ok((plane, a))
        })
        .collect()
}

fn area_centroid(triangles: &PolyData) -> Option<Point3<f64>> {
    let mut weighted = Vector3::zeros();
    let mut total = 0.0;
    for tri in triangles.triangles() {
        let area = tri.area();
        weighted += tri.centroid().coords * area;
        total += area;
    }
    (total > 0.0).then(|| Point3::from(weighted / total))
}

/// Cross-sectional area of a triangle mesh at every edge of a graph.
///
/// Convenience wrapper over [`CrossSectionCalculator`] with default
/// parameters: the result has one entry per row of `graph_edges`, in order.
///
/// # Errors
///
/// Validation errors for either array pair, and
/// [`SectionError::DegenerateEdge`] for zero-length edges.
pub fn calculate_cross_sections(
    vertices: ArrayView2<'_, f64>,
    faces: ArrayView2<'_, usize>,
    graph_vertices: ArrayView2<'_, f64>,
    graph_edges: ArrayView2<'_, usize>,
) -> SectionResult<Vec<f64>> {
    CrossSectionCalculator::from_arrays(vertices, faces, SectionParams::default())?
        .areas(graph_vertices, graph_edges)
}
