//! File I/O: STL and OBJ meshes, JSON skeleton graphs, CSV section tables.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::convert::{graph_to_polydata, polydata_from_faces};
use crate::error::{SectionError, SectionResult};
use crate::section::SectionProfile;
use crate::tracing_ext::log_io_operation;
use crate::types::PolyData;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Stl,
    Obj,
}

impl MeshFormat {
    /// Detect format from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .and_then(|ext| match ext.as_str() {
                "stl" => Some(MeshFormat::Stl),
                "obj" => Some(MeshFormat::Obj),
                _ => None,
            })
    }

    /// Lowercase name, as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            MeshFormat::Stl => "stl",
            MeshFormat::Obj => "obj",
        }
    }
}

/// Load a triangle mesh, detecting the format from the extension.
///
/// # Errors
///
/// - [`SectionError::UnsupportedFormat`] for an unknown extension
/// - [`SectionError::IoRead`] / [`SectionError::ParseError`] for unreadable files
/// - [`SectionError::EmptyInput`] if the file holds no triangles
/// - Validation errors for non-finite coordinates or bad indices
pub fn load_mesh(path: &Path) -> SectionResult<PolyData> {
    let format = MeshFormat::from_path(path).ok_or_else(|| SectionError::UnsupportedFormat {
        extension: path.extension().and_then(|e| e.to_str()).map(String::from),
    })?;

    info!("Loading mesh from {:?} (format: {:?})", path, format);

    let (vertices, faces) = match format {
        MeshFormat::Stl => read_stl(path)?,
        MeshFormat::Obj => read_obj(path)?,
    };

    let mesh = polydata_from_faces(&vertices, &faces);
    log_io_operation("load_mesh", path, Some(format.name()), mesh.is_ok());
    let mesh = mesh?;

    if let Some((min, max)) = mesh.bounds() {
        let dims = max - min;
        info!(
            "Loaded mesh: {} points, {} triangles",
            mesh.point_count(),
            mesh.poly_count()
        );
        debug!(
            "Bounding box: [{:.3}, {:.3}, {:.3}] to [{:.3}, {:.3}, {:.3}]",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        if dims.x.max(dims.y).max(dims.z) <= 0.0 {
            warn!("Mesh has zero extent");
        }
    }

    Ok(mesh)
}

type FaceData = (Vec<[f64; 3]>, Vec<[u32; 3]>);

fn read_stl(path: &Path) -> SectionResult<FaceData> {
    let file = File::open(path).map_err(|e| SectionError::io_read(path, e))?;
    let mut reader = BufReader::new(file);

    // Indexed mesh: stl_io already merges identical corner positions
    let stl = stl_io::read_stl(&mut reader)
        .map_err(|e| SectionError::parse_error(path, e.to_string()))?;

    debug!(
        "STL contains {} vertices, {} triangles",
        stl.vertices.len(),
        stl.faces.len()
    );

    let vertices = stl
        .vertices
        .iter()
        .map(|v| [v.0[0] as f64, v.0[1] as f64, v.0[2] as f64])
        .collect();

    let faces = stl
        .faces
        .iter()
        .map(|f| {
            [
                f.vertices[0] as u32,
                f.vertices[1] as u32,
                f.vertices[2] as u32,
            ]
        })
        .collect();

    Ok((vertices, faces))
}

fn read_obj(path: &Path) -> SectionResult<FaceData> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| SectionError::parse_error(path, e.to_string()))?;

    if models.is_empty() {
        return Err(SectionError::empty_input("OBJ file contains no models"));
    }

    // Merge all models into one point set
    let mut vertices = Vec::new();
    let mut faces = Vec::new();
    for model in &models {
        debug!("OBJ model '{}': loading", model.name);
        let offset = vertices.len() as u32;

        vertices.extend(
            model
                .mesh
                .positions
                .chunks_exact(3)
                .map(|c| [c[0] as f64, c[1] as f64, c[2] as f64]),
        );
        faces.extend(
            model
                .mesh
                .indices
                .chunks_exact(3)
                .map(|c| [c[0] + offset, c[1] + offset, c[2] + offset]),
        );
    }

    Ok((vertices, faces))
}

/// A skeleton graph: `N x 3` vertex positions and `M x K` edge indices.
///
/// Edges are expected to have two columns; other widths are kept as read
/// and rejected by [`EdgeGraph::to_polydata`].
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGraph {
    pub vertices: Array2<f64>,
    pub edges: Array2<usize>,
}

#[derive(Deserialize, Serialize)]
struct GraphFile {
    vertices: Vec<Vec<f64>>,
    edges: Vec<Vec<usize>>,
}

impl EdgeGraph {
    /// Number of graph vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.nrows()
    }

    /// Number of graph edges.
    pub fn edge_count(&self) -> usize {
        self.edges.nrows()
    }

    /// Validate and convert into line polydata.
    pub fn to_polydata(&self) -> SectionResult<PolyData> {
        graph_to_polydata(self.vertices.view(), self.edges.view())
    }
}

/// Pack JSON rows into a 2-D array. With `fixed` every row must have
/// `width` entries; otherwise the first row sets the width.
fn rows_to_array<T: Copy>(
    rows: &[Vec<T>],
    what: &'static str,
    width: usize,
    fixed: bool,
) -> SectionResult<Array2<T>> {
    let ncols = if fixed {
        width
    } else {
        rows.first().map_or(width, Vec::len)
    };
    if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
        return Err(SectionError::invalid_shape(what, ncols, bad.len()));
    }
    let flat: Vec<T> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), ncols), flat)
        .map_err(|e| SectionError::malformed_cells(e.to_string()))
}

/// Load a graph from JSON of the form
/// `{"vertices": [[x, y, z], ...], "edges": [[a, b], ...]}`.
pub fn load_graph(path: &Path) -> SectionResult<EdgeGraph> {
    info!("Loading graph from {:?}", path);

    let file = File::open(path).map_err(|e| SectionError::io_read(path, e))?;
    let parsed: GraphFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| SectionError::parse_error(path, e.to_string()))?;

    let vertices = rows_to_array(&parsed.vertices, "vertices", 3, true)?;
    let edges = rows_to_array(&parsed.edges, "edges", 2, false)?;
    let graph = EdgeGraph { vertices, edges };

    log_io_operation("load_graph", path, Some("json"), true);
    debug!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        "Loaded graph"
    );

    Ok(graph)
}

/// Write a graph in the JSON layout read by [`load_graph`].
pub fn save_graph(graph: &EdgeGraph, path: &Path) -> SectionResult<()> {
    let out = GraphFile {
        vertices: graph.vertices.rows().into_iter().map(|r| r.to_vec()).collect(),
        edges: graph.edges.rows().into_iter().map(|r| r.to_vec()).collect(),
    };

    let file = File::create(path).map_err(|e| SectionError::io_write(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &out)
        .map_err(|e| SectionError::io_write(path, std::io::Error::other(e)))?;
    writer.flush().map_err(|e| SectionError::io_write(path, e))?;

    log_io_operation("save_graph", path, Some("json"), true);
    Ok(())
}

/// Write one CSV row per profile: edge index, area, perimeter, contour
/// count, closed flag, and centroid (blank when the section is empty).
pub fn save_sections_csv(path: &Path, profiles: &[SectionProfile]) -> SectionResult<()> {
    let file = File::create(path).map_err(|e| SectionError::io_write(path, e))?;
    let mut writer = BufWriter::new(file);

    write_sections_csv(&mut writer, profiles).map_err(|e| SectionError::io_write(path, e))?;
    writer.flush().map_err(|e| SectionError::io_write(path, e))?;

    info!("Saved {} sections to {:?}", profiles.len(), path);
    Ok(())
}

fn write_sections_csv(out: &mut impl Write, profiles: &[SectionProfile]) -> std::io::Result<()> {
    writeln!(
        out,
        "edge,area,perimeter,contours,closed,centroid_x,centroid_y,centroid_z"
    )?;
    for (edge, p) in profiles.iter().enumerate() {
        write!(
            out,
            "{},{},{},{},{}",
            edge, p.area, p.perimeter, p.contour_count, p.closed
        )?;
        match &p.centroid {
            Some(c) => writeln!(out, ",{},{},{}", c.x, c.y, c.z)?,
            None => writeln!(out, ",,,")?,
        }
    }
    Ok(())
}
