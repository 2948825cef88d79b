//! mesh-section sections command - areas along a skeleton graph.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use mesh_section::{
    CrossSectionCalculator, PolyData, SectionParams, SectionProfile, load_graph, save_sections_csv,
};
use serde::Serialize;
use tracing::debug;

use crate::{Cli, OutputFormat, RegionArg, output};

/// Options of the sections command.
pub struct SectionsArgs<'a> {
    pub input: &'a Path,
    pub graph: &'a Path,
    pub config: Option<&'a Path>,
    pub region: Option<RegionArg>,
    pub merge_tolerance: Option<f64>,
    pub serial: bool,
    pub csv: Option<&'a Path>,
}

#[derive(Serialize)]
struct SectionsResult {
    mesh: String,
    graph: String,
    params: SectionParams,
    edges: usize,
    misses: usize,
    open_sections: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    csv: Option<String>,
    areas: Vec<f64>,
    profiles: Vec<SectionProfile>,
}

fn load_params(args: &SectionsArgs<'_>) -> Result<SectionParams> {
    let mut params = match args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            SectionParams::from_json(&text)
                .with_context(|| format!("Invalid section config in {:?}", path))?
        }
        None => SectionParams::default(),
    };

    if let Some(region) = args.region {
        params.region = region.into();
    }
    if let Some(tolerance) = args.merge_tolerance {
        params.merge_tolerance = tolerance;
    }
    if args.serial {
        params.parallel = false;
    }
    Ok(params)
}

pub fn run(args: &SectionsArgs<'_>, cli: &Cli) -> Result<()> {
    let params = load_params(args)?;
    debug!(?params, "Section parameters");

    let mesh = PolyData::load(args.input)
        .with_context(|| format!("Failed to load mesh from {:?}", args.input))?;
    let graph = load_graph(args.graph)
        .with_context(|| format!("Failed to load graph from {:?}", args.graph))?;

    output::info(
        &format!("Measuring {} edges...", graph.edge_count()),
        cli.format,
        cli.quiet,
    );

    let calc = CrossSectionCalculator::new(mesh, params.clone())?;
    let profiles = calc.profiles(graph.vertices.view(), graph.edges.view())?;

    if let Some(path) = args.csv {
        save_sections_csv(path, &profiles)?;
    }

    let result = SectionsResult {
        mesh: args.input.display().to_string(),
        graph: args.graph.display().to_string(),
        params,
        edges: profiles.len(),
        misses: profiles.iter().filter(|p| p.is_empty()).count(),
        open_sections: profiles
            .iter()
            .filter(|p| !p.is_empty() && !p.closed)
            .count(),
        csv: args.csv.map(|p| p.display().to_string()),
        areas: profiles.iter().map(|p| p.area).collect(),
        profiles,
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&result, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Cross Sections".bold().underline());
                println!("  {}: {}", "Region".cyan(), result.params.region);
                for (edge, p) in result.profiles.iter().enumerate() {
                    let note = if p.is_empty() {
                        " (no section)".yellow().to_string()
                    } else if !p.closed {
                        " (open contour)".red().to_string()
                    } else {
                        String::new()
                    };
                    println!("  {:>6}  {:>14.6}{}", edge, p.area, note);
                }

                if result.misses > 0 {
                    output::warning(
                        &format!("{} edge planes did not meet the mesh", result.misses),
                        cli.quiet,
                    );
                }
                if result.open_sections > 0 {
                    output::warning(
                        &format!(
                            "{} sections have open contours; their areas are approximate",
                            result.open_sections
                        ),
                        cli.quiet,
                    );
                }
                if let Some(ref csv) = result.csv {
                    output::success(&format!("Sections written to {}", csv), cli.format, cli.quiet);
                }
            }
        }
    }

    Ok(())
}
