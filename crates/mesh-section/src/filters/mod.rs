//! Polydata filters used to turn a plane cut into a measured polygon.
//!
//! Each filter is plain configuration plus a pure [`PolyDataFilter::apply`];
//! nothing is cached between calls, so one filter value can be reused for
//! any number of inputs, from any number of threads.

mod clean;
mod connectivity;
mod cutter;
mod mass;
mod stripper;
mod triangulate;

pub use clean::CleanPolyData;
pub use connectivity::{ConnectivityFilter, ExtractionMode, RegionAnalysis};
pub use cutter::{DEFAULT_PLANE_TOLERANCE, PlaneCutter};
pub use mass::MassProperties;
pub use stripper::Stripper;
pub use triangulate::TriangleFilter;

use crate::types::PolyData;

/// A transformation from one polydata to another.
pub trait PolyDataFilter {
    /// Run the filter on `input`, producing a new polydata.
    fn apply(&self, input: &PolyData) -> PolyData;
}
