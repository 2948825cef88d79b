//! Core polydata types.

use nalgebra::{Point3, Vector3};

use crate::error::{SectionError, SectionResult};

/// Packed storage for variable-arity cells (lines, polylines, polygons).
///
/// Cell `i` owns `connectivity[offsets[i]..offsets[i + 1]]`. The offsets
/// array always starts with `0` and has one more entry than there are cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellArray {
    offsets: Vec<usize>,
    connectivity: Vec<usize>,
}

impl CellArray {
    /// Create an empty cell array.
    pub fn new() -> Self {
        Self {
            offsets: vec![0],
            connectivity: Vec::new(),
        }
    }

    /// Create an empty cell array with room for `cells` cells holding `ids` point ids.
    pub fn with_capacity(cells: usize, ids: usize) -> Self {
        let mut offsets = Vec::with_capacity(cells + 1);
        offsets.push(0);
        Self {
            offsets,
            connectivity: Vec::with_capacity(ids),
        }
    }

    /// Build cells of a fixed arity from a flat id list.
    ///
    /// Trailing ids that do not fill a whole cell are ignored.
    pub fn from_uniform(arity: usize, ids: &[usize]) -> Self {
        if arity == 0 {
            return Self::new();
        }
        let count = ids.len() / arity;
        let mut cells = Self::with_capacity(count, count * arity);
        for chunk in ids.chunks_exact(arity) {
            cells.push_cell(chunk);
        }
        cells
    }

    /// Decode the legacy `[n, id0, .., id(n-1), n, ..]` layout.
    pub fn from_legacy(packed: &[usize]) -> SectionResult<Self> {
        let mut cells = Self::new();
        let mut cursor = 0;
        while cursor < packed.len() {
            let n = packed[cursor];
            let start = cursor + 1;
            let end = start + n;
            if end > packed.len() {
                return Err(SectionError::malformed_cells(format!(
                    "cell {} declares {} ids but only {} remain",
                    cells.len(),
                    n,
                    packed.len() - start
                )));
            }
            cells.push_cell(&packed[start..end]);
            cursor = end;
        }
        Ok(cells)
    }

    /// Encode into the legacy `[n, id0, .., id(n-1), n, ..]` layout.
    pub fn to_legacy(&self) -> Vec<usize> {
        let mut packed = Vec::with_capacity(self.len() + self.connectivity.len());
        for cell in self.iter() {
            packed.push(cell.len());
            packed.extend_from_slice(cell);
        }
        packed
    }

    /// Append a cell.
    pub fn push_cell(&mut self, ids: &[usize]) {
        self.connectivity.extend_from_slice(ids);
        self.offsets.push(self.connectivity.len());
    }

    /// Point ids of cell `index`.
    pub fn cell(&self, index: usize) -> Option<&[usize]> {
        let start = *self.offsets.get(index)?;
        let end = *self.offsets.get(index + 1)?;
        Some(&self.connectivity[start..end])
    }

    /// Iterate over the cells in order.
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.offsets
            .windows(2)
            .map(move |w| &self.connectivity[w[0]..w[1]])
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// True when there are no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of point ids across all cells.
    #[inline]
    pub fn connectivity_len(&self) -> usize {
        self.connectivity.len()
    }

    /// Largest referenced point id, if any.
    pub fn max_id(&self) -> Option<usize> {
        self.connectivity.iter().copied().max()
    }

    /// The flat id list.
    pub fn connectivity(&self) -> &[usize] {
        &self.connectivity
    }

    /// Rewrite every id through `map`.
    pub(crate) fn remap(&mut self, map: &[usize]) {
        for id in &mut self.connectivity {
            *id = map[*id];
        }
    }
}

impl Default for CellArray {
    fn default() -> Self {
        Self::new()
    }
}

/// Points plus line and polygon topology.
#[derive(Debug, Clone, Default)]
pub struct PolyData {
    /// Point coordinates.
    pub points: Vec<Point3<f64>>,

    /// Line and polyline cells.
    pub lines: CellArray,

    /// Polygon cells (triangles for meshes).
    pub polys: CellArray,
}

impl PolyData {
    /// Create an empty polydata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a polydata holding only a point set.
    pub fn with_points(points: Vec<Point3<f64>>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    /// Replace the line cells.
    pub fn set_lines(&mut self, lines: CellArray) {
        self.lines = lines;
    }

    /// Replace the polygon cells.
    pub fn set_polys(&mut self, polys: CellArray) {
        self.polys = polys;
    }

    /// Number of points.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of line cells.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of polygon cells.
    #[inline]
    pub fn poly_count(&self) -> usize {
        self.polys.len()
    }

    /// True when there are no cells of any kind.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.polys.is_empty()
    }

    /// Axis-aligned bounding box of the point set.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.points.first()?;
        let mut min = first;
        let mut max = first;

        for p in &self.points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some((min, max))
    }

    /// Positions of the points referenced by one cell.
    pub fn cell_points<'a>(
        &'a self,
        cell: &'a [usize],
    ) -> impl Iterator<Item = Point3<f64>> + 'a {
        cell.iter().map(move |&id| self.points[id])
    }

    /// Iterate over the three-point polygon cells as concrete triangles.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.polys
            .iter()
            .filter(|cell| cell.len() == 3)
            .map(move |cell| {
                Triangle::new(
                    self.points[cell[0]],
                    self.points[cell[1]],
                    self.points[cell[2]],
                )
            })
    }

    /// Copy with the line cells reinterpreted as polygons.
    ///
    /// Stripped contours come out of the stripper as polylines; measuring the
    /// enclosed area needs them as polygon boundaries.
    pub fn lines_as_polys(&self) -> PolyData {
        PolyData {
            points: self.points.clone(),
            lines: CellArray::new(),
            polys: self.lines.clone(),
        }
    }

    /// Drop points that no cell references and renumber the cells.
    pub fn compact(&mut self) {
        let mut used = vec![false; self.points.len()];
        for &id in self.lines.connectivity().iter().chain(self.polys.connectivity()) {
            used[id] = true;
        }

        let mut map = vec![usize::MAX; self.points.len()];
        let mut points = Vec::with_capacity(self.points.len());
        for (old, keep) in used.iter().enumerate() {
            if *keep {
                map[old] = points.len();
                points.push(self.points[old]);
            }
        }

        self.lines.remap(&map);
        self.polys.remap(&map);
        self.points = points;
    }

}

/// A triangle with concrete vertex positions.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Compute the (unnormalized) face normal via cross product.
    #[inline]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(&e2)
    }

    /// Compute the unit face normal.
    /// Returns None for degenerate triangles (zero area).
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_unnormalized();
        let len_sq = n.norm_squared();
        if len_sq > f64::EPSILON * f64::EPSILON {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }

    /// Compute the area of the triangle.
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Compute the centroid (center of mass).
    #[inline]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }
}
