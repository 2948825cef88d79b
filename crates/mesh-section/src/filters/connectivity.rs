//! Connected region extraction.
//!
//! Two cells belong to the same region when they share a point. Regions are
//! numbered in the order their first cell appears (lines before polygons).

use nalgebra::Point3;
use tracing::{debug, trace};

use super::PolyDataFilter;
use crate::types::{CellArray, PolyData};

/// Which regions a [`ConnectivityFilter`] keeps.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionMode {
    /// Keep every cell.
    AllRegions,
    /// Keep the region with the most cells.
    LargestRegion,
    /// Keep the listed region ids.
    SpecifiedRegions(Vec<usize>),
    /// Keep the region owning the cell point nearest to the given location.
    ClosestPointRegion(Point3<f64>),
}

/// Result of region analysis.
#[derive(Debug, Clone)]
pub struct RegionAnalysis {
    /// Number of connected regions found.
    pub region_count: usize,
    /// Number of cells in each region, indexed by region id.
    pub region_sizes: Vec<usize>,
    /// Region id of every cell, lines first, then polygons.
    pub cell_regions: Vec<usize>,
}

impl RegionAnalysis {
    /// Check if everything is one region.
    pub fn is_connected(&self) -> bool {
        self.region_count == 1
    }

    /// Id of the region with the most cells (lowest id on ties).
    pub fn largest_region(&self) -> Option<usize> {
        self.region_sizes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
            .map(|(id, _)| id)
    }
}

impl std::fmt::Display for RegionAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Region Analysis:")?;
        writeln!(f, "  Connected regions: {}", self.region_count)?;
        for (i, size) in self.region_sizes.iter().enumerate() {
            writeln!(f, "    Region {}: {} cells", i, size)?;
        }
        Ok(())
    }
}

/// Extracts connected regions of line and polygon cells.
#[derive(Debug, Clone)]
pub struct ConnectivityFilter {
    mode: ExtractionMode,
}

impl ConnectivityFilter {
    /// Create a filter with the given extraction mode.
    pub fn new(mode: ExtractionMode) -> Self {
        Self { mode }
    }

    /// Keep only the region closest to `point`.
    pub fn closest_point(point: Point3<f64>) -> Self {
        Self::new(ExtractionMode::ClosestPointRegion(point))
    }

    /// The extraction mode.
    pub fn mode(&self) -> &ExtractionMode {
        &self.mode
    }

    /// Label every cell with its region.
    pub fn regions(&self, input: &PolyData) -> RegionAnalysis {
        let mut sets = DisjointSets::new(input.point_count());
        for cell in input.lines.iter().chain(input.polys.iter()) {
            for pair in cell.windows(2) {
                sets.union(pair[0], pair[1]);
            }
        }

        let mut root_to_region = vec![usize::MAX; input.point_count()];
        let mut region_sizes: Vec<usize> = Vec::new();
        let mut cell_regions = Vec::with_capacity(input.line_count() + input.poly_count());

        for cell in input.lines.iter().chain(input.polys.iter()) {
            let Some(&first) = cell.first() else {
                cell_regions.push(usize::MAX);
                continue;
            };
            let root = sets.find(first);
            if root_to_region[root] == usize::MAX {
                root_to_region[root] = region_sizes.len();
                region_sizes.push(0);
            }
            let region = root_to_region[root];
            region_sizes[region] += 1;
            cell_regions.push(region);
        }

        RegionAnalysis {
            region_count: region_sizes.len(),
            region_sizes,
            cell_regions,
        }
    }

    fn selected_regions(&self, input: &PolyData, analysis: &RegionAnalysis) -> Vec<bool> {
        let mut keep = vec![false; analysis.region_count];
        match &self.mode {
            ExtractionMode::AllRegions => keep.iter_mut().for_each(|k| *k = true),
            ExtractionMode::LargestRegion => {
                if let Some(id) = analysis.largest_region() {
                    keep[id] = true;
                }
            }
            ExtractionMode::SpecifiedRegions(ids) => {
                for &id in ids {
                    if let Some(k) = keep.get_mut(id) {
                        *k = true;
                    }
                }
            }
            ExtractionMode::ClosestPointRegion(seed) => {
                if let Some(id) = closest_region(input, analysis, seed) {
                    keep[id] = true;
                }
            }
        }
        keep
    }
}

/// Region of the cell owning the used point nearest to `seed`.
fn closest_region(
    input: &PolyData,
    analysis: &RegionAnalysis,
    seed: &Point3<f64>,
) -> Option<usize> {
    let mut best: Option<(f64, usize)> = None;
    let cells = input.lines.iter().chain(input.polys.iter());
    for (cell, &region) in cells.zip(&analysis.cell_regions) {
        for &id in cell {
            let dist_sq = (input.points[id] - seed).norm_squared();
            if best.is_none_or(|(d, _)| dist_sq < d) {
                best = Some((dist_sq, region));
            }
        }
    }
    best.map(|(_, region)| region)
}

impl PolyDataFilter for ConnectivityFilter {
    fn apply(&self, input: &PolyData) -> PolyData {
        let analysis = self.regions(input);
        if analysis.region_count == 0 {
            return PolyData::new();
        }
        let keep = self.selected_regions(input, &analysis);

        let mut lines = CellArray::new();
        let mut polys = CellArray::new();
        let line_count = input.line_count();
        for (index, cell) in input.lines.iter().chain(input.polys.iter()).enumerate() {
            let region = analysis.cell_regions[index];
            if region == usize::MAX || !keep[region] {
                continue;
            }
            if index < line_count {
                lines.push_cell(cell);
            } else {
                polys.push_cell(cell);
            }
        }

        let mut output = PolyData::with_points(input.points.clone());
        output.set_lines(lines);
        output.set_polys(polys);
        output.compact();

        debug!(
            regions = analysis.region_count,
            kept = keep.iter().filter(|&&k| k).count(),
            "Extracted connected regions"
        );
        trace!(cells = output.line_count() + output.poly_count(), "Region cells");

        output
    }
}

/// Union-find over point ids.
struct DisjointSets {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}
