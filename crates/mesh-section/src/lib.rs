//! Cross-sectional area of triangle meshes along skeleton graphs.
//!
//! Given a closed triangle surface (a vessel, an airway, a bone) and a graph
//! whose edges run through it, this crate cuts the surface with the plane
//! perpendicular to each edge at the edge's start vertex and reports the
//! area enclosed by the nearest contour.
//!
//! The pieces are usable on their own:
//!
//! - **Conversion**: numpy-style `N x 3` / `M x K` arrays into [`PolyData`]
//! - **Filters**: plane cutting, point merging, connected regions, strip
//!   joining, triangulation and mass properties, each a [`PolyDataFilter`]
//! - **Sections**: [`CrossSectionCalculator`] chains the filters per edge
//! - **File I/O**: STL and OBJ meshes, JSON graphs, CSV results
//!
//! # Units
//!
//! No unit is assumed. Areas come out in the square of the input unit, and
//! the merge and plane tolerances in [`SectionParams`] are absolute
//! distances in the input unit.
//!
//! # Quick Start
//!
//! ```no_run
//! use mesh_section::{CrossSectionCalculator, PolyData, SectionParams};
//! use mesh_section::io::load_graph;
//! use std::path::Path;
//!
//! let mesh = PolyData::load("vessel.stl").unwrap();
//! let graph = load_graph(Path::new("centreline.json")).unwrap();
//!
//! let calc = CrossSectionCalculator::new(mesh, SectionParams::default()).unwrap();
//! let areas = calc.areas(graph.vertices.view(), graph.edges.view()).unwrap();
//! for (edge, area) in areas.iter().enumerate() {
//!     println!("edge {edge}: {area:.3}");
//! }
//! ```
//!
//! # Array Entry Point
//!
//! ```
//! use mesh_section::calculate_cross_sections;
//! use ndarray::array;
//!
//! // Triangular prism along z with a right-triangle section of area 0.5
//! let vertices = array![
//!     [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0],
//!     [0.0, 0.0, 2.0], [1.0, 0.0, 2.0], [0.0, 1.0, 2.0],
//! ];
//! let faces = array![
//!     [0usize, 2, 1], [3, 4, 5],
//!     [0, 1, 4], [0, 4, 3],
//!     [1, 2, 5], [1, 5, 4],
//!     [2, 0, 3], [2, 3, 5],
//! ];
//! let graph = array![[0.25, 0.25, 0.5], [0.25, 0.25, 1.5]];
//! let edges = array![[0usize, 1], [1, 0]];
//!
//! let areas =
//!     calculate_cross_sections(vertices.view(), faces.view(), graph.view(), edges.view())
//!         .unwrap();
//! assert_eq!(areas.len(), 2);
//! assert!(areas.iter().all(|a| (a - 0.5).abs() < 1e-9));
//! ```
//!
//! # Logging
//!
//! Filters emit `tracing` events; nothing is printed unless the application
//! installs a subscriber. See [`tracing_ext`] for the targets used.

mod error;
mod types;

pub mod convert;
pub mod filters;
pub mod io;
pub mod plane;
pub mod section;
pub mod tracing_ext;

pub use error::{ErrorCode, RecoverySuggestion, SectionError, SectionResult};
pub use types::{CellArray, PolyData, Triangle};

pub use convert::{
    graph_to_polydata, numpy_rep_to_polydata, polydata_from_faces, trimesh_to_polydata,
};
pub use filters::{
    CleanPolyData, ConnectivityFilter, ExtractionMode, MassProperties, PlaneCutter,
    PolyDataFilter, RegionAnalysis, Stripper, TriangleFilter,
};
pub use io::{EdgeGraph, MeshFormat, load_graph, load_mesh, save_graph, save_sections_csv};
pub use plane::Plane;
pub use section::{
    CrossSectionCalculator, RegionSelection, SectionParams, SectionProfile,
    calculate_cross_sections,
};
pub use tracing_ext::OperationTimer;

use std::path::Path;

use nalgebra::Point3;

impl PolyData {
    /// Load a triangle mesh from STL or OBJ.
    pub fn load<P: AsRef<Path>>(path: P) -> SectionResult<Self> {
        io::load_mesh(path.as_ref())
    }

    /// Area, volume and triangle statistics of the polygon cells.
    ///
    /// Non-triangular polygons are triangulated first.
    pub fn mass_properties(&self) -> MassProperties {
        if self.polys.iter().all(|cell| cell.len() == 3) {
            MassProperties::compute(self)
        } else {
            MassProperties::compute(&TriangleFilter::new().apply(self))
        }
    }

    /// Connected regions of line and polygon cells.
    pub fn regions(&self) -> RegionAnalysis {
        ConnectivityFilter::new(ExtractionMode::AllRegions).regions(self)
    }

    /// Cut with `plane` and measure the contour nearest `seed`, using
    /// default parameters.
    pub fn cross_section(&self, plane: &Plane, seed: Point3<f64>) -> SectionResult<SectionProfile> {
        let calc = CrossSectionCalculator::new(self.clone(), SectionParams::default())?;
        Ok(calc.profile(plane, seed))
    }
}
