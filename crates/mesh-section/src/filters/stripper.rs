//! Joining line segments into polylines.

use tracing::trace;

use super::PolyDataFilter;
use crate::types::{CellArray, PolyData};

/// Joins contiguous line segments into maximal polylines.
///
/// A closed chain repeats its first point id at the end. Chains stop at
/// points where the number of incident segments is not two, so a branching
/// contour is split into several strips rather than guessed through.
#[derive(Debug, Clone, Copy)]
pub struct Stripper {
    join_contiguous_segments: bool,
    maximum_length: usize,
}

impl Default for Stripper {
    fn default() -> Self {
        Self {
            join_contiguous_segments: true,
            maximum_length: usize::MAX,
        }
    }
}

impl Stripper {
    /// Create a stripper that joins contiguous segments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable joining (disabled copies the segments through).
    pub fn join_contiguous_segments(mut self, join: bool) -> Self {
        self.join_contiguous_segments = join;
        self
    }

    /// Limit the number of points in one strip. Values below 2 are raised to 2.
    pub fn maximum_length(mut self, points: usize) -> Self {
        self.maximum_length = points.max(2);
        self
    }

    fn emit(&self, chain: &[usize], out: &mut CellArray) {
        if chain.len() <= self.maximum_length {
            out.push_cell(chain);
            return;
        }
        let mut start = 0;
        while start + 1 < chain.len() {
            let end = (start + self.maximum_length).min(chain.len());
            out.push_cell(&chain[start..end]);
            start = end - 1;
        }
    }
}

impl PolyDataFilter for Stripper {
    fn apply(&self, input: &PolyData) -> PolyData {
        let segments: Vec<[usize; 2]> = input
            .lines
            .iter()
            .flat_map(|cell| cell.windows(2).map(|w| [w[0], w[1]]))
            .filter(|[a, b]| a != b)
            .collect();

        let mut lines = CellArray::new();

        if !self.join_contiguous_segments {
            for seg in &segments {
                lines.push_cell(seg);
            }
        } else {
            let mut incident: Vec<Vec<usize>> = vec![Vec::new(); input.point_count()];
            for (i, &[a, b]) in segments.iter().enumerate() {
                incident[a].push(i);
                incident[b].push(i);
            }

            let mut used = vec![false; segments.len()];
            let mut chain = Vec::new();

            // Open chains start at points that are not simple pass-throughs.
            for start in 0..input.point_count() {
                if incident[start].len() == 2 {
                    continue;
                }
                loop {
                    let Some(seg) = incident[start].iter().copied().find(|&s| !used[s]) else {
                        break;
                    };
                    chain.clear();
                    chain.push(start);
                    walk(start, seg, &segments, &incident, &mut used, &mut chain, true);
                    self.emit(&chain, &mut lines);
                }
            }

            // Everything left is a closed loop through degree-two points.
            for seg in 0..segments.len() {
                if used[seg] {
                    continue;
                }
                let start = segments[seg][0];
                chain.clear();
                chain.push(start);
                walk(start, seg, &segments, &incident, &mut used, &mut chain, false);
                self.emit(&chain, &mut lines);
            }
        }

        trace!(
            segments = segments.len(),
            strips = lines.len(),
            "Stripped line segments"
        );

        let mut output = PolyData::with_points(input.points.clone());
        output.set_lines(lines);
        output
    }
}

/// Follow unused segments from `from` through `first`, appending point ids.
///
/// With `stop_at_branch` the walk ends at any point whose degree is not two;
/// loops always end when they run out of unused segments (back at the start).
fn walk(
    from: usize,
    first: usize,
    segments: &[[usize; 2]],
    incident: &[Vec<usize>],
    used: &mut [bool],
    chain: &mut Vec<usize>,
    stop_at_branch: bool,
) {
    let mut current = from;
    let mut seg = first;
    loop {
        used[seg] = true;
        let [a, b] = segments[seg];
        let next = if a == current { b } else { a };
        chain.push(next);
        current = next;

        if stop_at_branch && incident[current].len() != 2 {
            break;
        }
        match incident[current].iter().find(|&&s| !used[s]) {
            Some(&s) => seg = s,
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn square_segments(ids: &[usize]) -> PolyData {
        let mut pd = PolyData::with_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        pd.set_lines(CellArray::from_uniform(2, ids));
        pd
    }

    #[test]
    fn test_closed_loop_from_shuffled_segments() {
        let pd = square_segments(&[2, 3, 0, 1, 3, 0, 1, 2]);
        let out = Stripper::new().apply(&pd);

        assert_eq!(out.line_count(), 1);
        let strip = out.lines.cell(0).unwrap();
        assert_eq!(strip.len(), 5);
        assert_eq!(strip.first(), strip.last());
    }

    #[test]
    fn test_open_chain() {
        let pd = square_segments(&[1, 2, 0, 1, 2, 3]);
        let out = Stripper::new().apply(&pd);

        assert_eq!(out.line_count(), 1);
        let strip = out.lines.cell(0).unwrap();
        assert_eq!(strip, &[0, 1, 2, 3]);
    }

    #[test]
    fn test_join_disabled() {
        let pd = square_segments(&[0, 1, 1, 2, 2, 3, 3, 0]);
        let out = Stripper::new().join_contiguous_segments(false).apply(&pd);
        assert_eq!(out.line_count(), 4);
    }

    #[test]
    fn test_maximum_length_splits_with_overlap() {
        let pd = square_segments(&[0, 1, 1, 2, 2, 3]);
        let out = Stripper::new().maximum_length(3).apply(&pd);

        assert_eq!(out.line_count(), 2);
        assert_eq!(out.lines.cell(0), Some(&[0, 1, 2][..]));
        assert_eq!(out.lines.cell(1), Some(&[2, 3][..]));
    }

    #[test]
    fn test_branch_splits_strips() {
        let mut pd = PolyData::with_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ]);
        // A "T": three segments meeting at point 1
        pd.set_lines(CellArray::from_uniform(2, &[0, 1, 1, 2, 1, 3]));
        let out = Stripper::new().apply(&pd);

        assert_eq!(out.line_count(), 3);
        let total: usize = out.lines.iter().map(|c| c.len() - 1).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_polyline_input_is_split_and_rejoined() {
        let mut pd = square_segments(&[]);
        let mut lines = CellArray::new();
        lines.push_cell(&[0, 1, 2]);
        lines.push_cell(&[2, 3, 0]);
        pd.set_lines(lines);

        let out = Stripper::new().apply(&pd);
        assert_eq!(out.line_count(), 1);
        assert_eq!(out.lines.cell(0).unwrap().len(), 5);
    }
}
