//! Point merging and removal of degenerate or duplicate cells.

use hashbrown::{HashMap, HashSet};
use nalgebra::Point3;
use tracing::trace;

use super::PolyDataFilter;
use crate::types::{CellArray, PolyData};

/// Merges coincident points and drops cells that collapse as a result.
///
/// With a tolerance of `0.0` only bit-identical coordinates are merged.
/// Otherwise points closer than the tolerance are merged into the first
/// point seen in their neighbourhood.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanPolyData {
    tolerance: f64,
}

impl CleanPolyData {
    /// Create a cleaner with an absolute merge tolerance.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
        }
    }

    /// The merge tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn merge_map(&self, points: &[Point3<f64>]) -> (Vec<usize>, Vec<Point3<f64>>) {
        let mut map = Vec::with_capacity(points.len());
        let mut merged: Vec<Point3<f64>> = Vec::with_capacity(points.len());

        if self.tolerance == 0.0 {
            let mut exact: HashMap<[u64; 3], usize> = HashMap::new();
            for p in points {
                // +0.0 + -0.0 normalizes the sign of zero
                let key = [
                    (p.x + 0.0).to_bits(),
                    (p.y + 0.0).to_bits(),
                    (p.z + 0.0).to_bits(),
                ];
                let id = *exact.entry(key).or_insert_with(|| {
                    merged.push(*p);
                    merged.len() - 1
                });
                map.push(id);
            }
            return (map, merged);
        }

        let inv = 1.0 / self.tolerance;
        let tol_sq = self.tolerance * self.tolerance;
        let mut grid: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();

        for p in points {
            let cell = (
                (p.x * inv).floor() as i64,
                (p.y * inv).floor() as i64,
                (p.z * inv).floor() as i64,
            );

            let mut found = None;
            'search: for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let Some(candidates) = grid.get(&(cell.0 + dx, cell.1 + dy, cell.2 + dz))
                        else {
                            continue;
                        };
                        for &candidate in candidates {
                            if (merged[candidate] - p).norm_squared() <= tol_sq {
                                found = Some(candidate);
                                break 'search;
                            }
                        }
                    }
                }
            }

            let id = match found {
                Some(id) => id,
                None => {
                    merged.push(*p);
                    let id = merged.len() - 1;
                    grid.entry(cell).or_default().push(id);
                    id
                }
            };
            map.push(id);
        }

        (map, merged)
    }
}

/// Remap a cell and drop consecutive repeats (including wrap-around for polygons).
fn collapse(cell: &[usize], map: &[usize], closed: bool, out: &mut Vec<usize>) {
    out.clear();
    for &id in cell {
        let mapped = map[id];
        if out.last() != Some(&mapped) {
            out.push(mapped);
        }
    }
    if closed {
        while out.len() > 1 && out.first() == out.last() {
            out.pop();
        }
    }
}

impl PolyDataFilter for CleanPolyData {
    fn apply(&self, input: &PolyData) -> PolyData {
        let (map, points) = self.merge_map(&input.points);

        let mut scratch = Vec::new();

        let mut lines = CellArray::with_capacity(input.lines.len(), input.lines.connectivity_len());
        let mut seen_segments: HashSet<(usize, usize)> = HashSet::new();
        let mut dropped = 0usize;
        for cell in input.lines.iter() {
            collapse(cell, &map, false, &mut scratch);
            if scratch.len() < 2 {
                dropped += 1;
                continue;
            }
            if scratch.len() == 2 {
                let key = (scratch[0].min(scratch[1]), scratch[0].max(scratch[1]));
                if !seen_segments.insert(key) {
                    dropped += 1;
                    continue;
                }
            }
            lines.push_cell(&scratch);
        }

        let mut polys = CellArray::with_capacity(input.polys.len(), input.polys.connectivity_len());
        for cell in input.polys.iter() {
            collapse(cell, &map, true, &mut scratch);
            if scratch.len() < 3 {
                dropped += 1;
                continue;
            }
            polys.push_cell(&scratch);
        }

        let mut output = PolyData::with_points(points);
        output.set_lines(lines);
        output.set_polys(polys);
        output.compact();

        trace!(
            points_in = input.point_count(),
            points_out = output.point_count(),
            dropped_cells = dropped,
            "Cleaned polydata"
        );

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(points: Vec<Point3<f64>>, ids: &[usize]) -> PolyData {
        let mut pd = PolyData::with_points(points);
        pd.set_lines(CellArray::from_uniform(2, ids));
        pd
    }

    #[test]
    fn test_exact_merge() {
        let pd = segments(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            &[0, 1, 2, 3],
        );
        let out = CleanPolyData::default().apply(&pd);
        assert_eq!(out.point_count(), 3);
        assert_eq!(out.line_count(), 2);
        assert_eq!(out.lines.cell(0).unwrap()[1], out.lines.cell(1).unwrap()[0]);
    }

    #[test]
    fn test_negative_zero_merges() {
        let pd = segments(
            vec![
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(-0.0, 1.0, 0.0),
                Point3::new(2.0, 2.0, 2.0),
            ],
            &[0, 2, 1, 2],
        );
        let out = CleanPolyData::default().apply(&pd);
        assert_eq!(out.point_count(), 2);
        // The second segment duplicates the first after merging
        assert_eq!(out.line_count(), 1);
    }

    #[test]
    fn test_tolerance_merge_and_degenerate_removal() {
        let pd = segments(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1e-7, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
            ],
            &[0, 1, 1, 2],
        );
        let out = CleanPolyData::new(1e-6).apply(&pd);
        assert_eq!(out.point_count(), 2);
        assert_eq!(out.line_count(), 1);
    }

    #[test]
    fn test_reversed_duplicate_removed() {
        let pd = segments(
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)],
            &[0, 1, 1, 0],
        );
        let out = CleanPolyData::default().apply(&pd);
        assert_eq!(out.line_count(), 1);
    }

    #[test]
    fn test_unused_points_dropped() {
        let pd = segments(
            vec![
                Point3::new(5.0, 5.0, 5.0),
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
            ],
            &[1, 2],
        );
        let out = CleanPolyData::default().apply(&pd);
        assert_eq!(out.point_count(), 2);
        assert_eq!(out.lines.cell(0), Some(&[0, 1][..]));
    }

    #[test]
    fn test_polygon_collapse() {
        let mut pd = PolyData::with_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ]);
        pd.set_polys(CellArray::from_uniform(3, &[0, 1, 2]));
        let out = CleanPolyData::default().apply(&pd);
        assert_eq!(out.poly_count(), 0);
        assert_eq!(out.point_count(), 0);
    }
}
