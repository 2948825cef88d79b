//! mesh-section info command - display mesh and graph statistics.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use mesh_section::{PolyData, load_graph};
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct MeshInfo {
    path: String,
    points: usize,
    triangles: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<BoundsInfo>,
    surface_area: f64,
    volume: f64,
    regions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    graph: Option<GraphInfo>,
}

#[derive(Serialize)]
struct BoundsInfo {
    min: [f64; 3],
    max: [f64; 3],
    dimensions: [f64; 3],
}

#[derive(Serialize)]
struct GraphInfo {
    path: String,
    vertices: usize,
    edges: usize,
    total_length: f64,
}

pub fn run(input: &Path, graph_path: Option<&Path>, cli: &Cli) -> Result<()> {
    let mesh =
        PolyData::load(input).with_context(|| format!("Failed to load mesh from {:?}", input))?;

    let mass = mesh.mass_properties();
    let regions = mesh.regions();
    let bounds = mesh.bounds().map(|(min, max)| {
        let dims = max - min;
        BoundsInfo {
            min: [min.x, min.y, min.z],
            max: [max.x, max.y, max.z],
            dimensions: [dims.x, dims.y, dims.z],
        }
    });

    let graph = match graph_path {
        Some(path) => {
            let graph = load_graph(path)
                .with_context(|| format!("Failed to load graph from {:?}", path))?;
            let lines = graph.to_polydata()?;
            let total_length = lines
                .lines
                .iter()
                .map(|cell| (lines.points[cell[1]] - lines.points[cell[0]]).norm())
                .sum();
            Some(GraphInfo {
                path: path.display().to_string(),
                vertices: graph.vertex_count(),
                edges: graph.edge_count(),
                total_length,
            })
        }
        None => None,
    };

    let info = MeshInfo {
        path: input.display().to_string(),
        points: mesh.point_count(),
        triangles: mesh.poly_count(),
        bounds,
        surface_area: mass.surface_area,
        volume: mass.volume,
        regions: regions.region_count,
        graph,
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&info, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Mesh Information".bold().underline());
                println!("  {}: {}", "File".cyan(), input.display());
                println!("  {}: {}", "Points".cyan(), info.points);
                println!("  {}: {}", "Triangles".cyan(), info.triangles);
                println!("  {}: {}", "Regions".cyan(), info.regions);

                if let Some(ref b) = info.bounds {
                    println!(
                        "  {}: {:.3} x {:.3} x {:.3}",
                        "Dimensions".cyan(),
                        b.dimensions[0],
                        b.dimensions[1],
                        b.dimensions[2]
                    );
                    println!(
                        "  {}: ({:.3}, {:.3}, {:.3})",
                        "Min bounds".cyan(),
                        b.min[0],
                        b.min[1],
                        b.min[2]
                    );
                    println!(
                        "  {}: ({:.3}, {:.3}, {:.3})",
                        "Max bounds".cyan(),
                        b.max[0],
                        b.max[1],
                        b.max[2]
                    );
                }

                println!("  {}: {:.4}", "Surface area".cyan(), info.surface_area);
                println!("  {}: {:.4}", "Volume".cyan(), info.volume);
                if info.regions > 1 {
                    output::warning(
                        "mesh has several disconnected regions; volume sums all of them",
                        cli.quiet,
                    );
                }

                if let Some(ref g) = info.graph {
                    println!();
                    println!("{}", "Graph Information".bold().underline());
                    println!("  {}: {}", "File".cyan(), g.path);
                    println!("  {}: {}", "Vertices".cyan(), g.vertices);
                    println!("  {}: {}", "Edges".cyan(), g.edges);
                    println!("  {}: {:.4}", "Total length".cyan(), g.total_length);
                }
            }
        }
    }

    Ok(())
}
