//! mesh-section cut command - measure one plane section.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use mesh_section::{CrossSectionCalculator, Plane, PolyData, SectionParams};
use nalgebra::{Point3, Vector3};

use crate::{Cli, OutputFormat, RegionArg, output};

pub fn run(
    input: &Path,
    origin: [f64; 3],
    normal: [f64; 3],
    seed: Option<[f64; 3]>,
    region: Option<RegionArg>,
    cli: &Cli,
) -> Result<()> {
    let mesh =
        PolyData::load(input).with_context(|| format!("Failed to load mesh from {:?}", input))?;

    let origin = Point3::from(origin);
    let plane = Plane::new(origin, Vector3::from(normal))?;
    let seed = seed.map(Point3::from).unwrap_or(origin);

    let mut params = SectionParams::default();
    if let Some(region) = region {
        params.region = region.into();
    }

    output::info("Cutting mesh...", cli.format, cli.quiet);

    let calc = CrossSectionCalculator::new(mesh, params)?;
    let profile = calc.profile(&plane, seed);

    match cli.format {
        OutputFormat::Json => {
            output::print(&profile, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                if profile.is_empty() {
                    output::warning("plane does not intersect the mesh", cli.quiet);
                    return Ok(());
                }
                println!("{}", "Section".bold().underline());
                println!("  {}: {:.6}", "Area".cyan(), profile.area);
                println!("  {}: {:.6}", "Perimeter".cyan(), profile.perimeter);
                println!(
                    "  {}: {} ({})",
                    "Contours".cyan(),
                    profile.contour_count,
                    if profile.closed {
                        "closed".green()
                    } else {
                        "OPEN".red()
                    }
                );
                println!("  {}: {}", "Points".cyan(), profile.point_count);
                if let Some(c) = profile.centroid {
                    println!(
                        "  {}: ({:.4}, {:.4}, {:.4})",
                        "Centroid".cyan(),
                        c.x,
                        c.y,
                        c.z
                    );
                }
            }
        }
    }

    Ok(())
}
