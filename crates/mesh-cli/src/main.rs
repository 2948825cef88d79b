//! mesh-section: command-line cross-section measurement.
//!
//! Measures the cross-sectional area of a triangle mesh at every edge of a
//! skeleton graph, or at a single plane, from the command line.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=mesh_section=info` - Basic operation logging
//! - `RUST_LOG=mesh_section=debug` - Per-stage filter logging
//! - `RUST_LOG=mesh_section::timing=info` - Performance timing
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! # Areas along a centreline, written to CSV
//! mesh-section sections vessel.stl centreline.json --csv areas.csv
//!
//! # One cut, JSON output
//! mesh-section --format json cut vessel.stl --origin 0,0,10 --normal 0,0,1
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use mesh_section::RegionSelection;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{cut, info, sections};

/// mesh-section - Cross-sectional areas of triangle meshes.
///
/// Cut a surface mesh with planes perpendicular to the edges of a skeleton
/// graph and measure the enclosed area at each edge.
#[derive(Parser)]
#[command(name = "mesh-section")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh (and optionally graph) statistics
    Info {
        /// Input mesh file (STL or OBJ)
        input: PathBuf,

        /// Skeleton graph JSON to summarize alongside the mesh
        #[arg(long)]
        graph: Option<PathBuf>,
    },

    /// Measure a single plane section
    Cut {
        /// Input mesh file (STL or OBJ)
        input: PathBuf,

        /// A point on the cutting plane, as x,y,z
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        origin: [f64; 3],

        /// Plane normal, as x,y,z
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        normal: [f64; 3],

        /// Point selecting the contour to measure (defaults to the origin)
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        seed: Option<[f64; 3]>,

        /// Contour selection
        #[arg(long)]
        region: Option<RegionArg>,
    },

    /// Measure the section at every edge of a skeleton graph
    Sections {
        /// Input mesh file (STL or OBJ)
        input: PathBuf,

        /// Skeleton graph JSON: {"vertices": [[x,y,z],..], "edges": [[a,b],..]}
        graph: PathBuf,

        /// Section parameters JSON (flags below override it)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Contour selection
        #[arg(long)]
        region: Option<RegionArg>,

        /// Point merge tolerance
        #[arg(long)]
        merge_tolerance: Option<f64>,

        /// Measure edges on a single thread
        #[arg(long)]
        serial: bool,

        /// Write per-edge results to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

/// Which contours of a cut are measured.
#[derive(Clone, Copy, ValueEnum)]
pub enum RegionArg {
    /// The contour nearest the seed point
    Closest,
    /// The contour with the most segments
    Largest,
    /// All contours, areas summed
    All,
}

impl From<RegionArg> for RegionSelection {
    fn from(arg: RegionArg) -> Self {
        match arg {
            RegionArg::Closest => RegionSelection::Closest,
            RegionArg::Largest => RegionSelection::Largest,
            RegionArg::All => RegionSelection::All,
        }
    }
}

/// Parse `x,y,z` into three floats.
fn parse_vector(s: &str) -> std::result::Result<[f64; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected x,y,z but got {} values", parts.len()));
    }
    let mut out = [0.0; 3];
    for (slot, part) in out.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|e| format!("invalid number {:?}: {}", part, e))?;
    }
    Ok(out)
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "mesh_section=info",
            2 => "mesh_section=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Info { input, graph } => info::run(input, graph.as_deref(), &cli),
        Commands::Cut {
            input,
            origin,
            normal,
            seed,
            region,
        } => cut::run(input, *origin, *normal, *seed, *region, &cli),
        Commands::Sections {
            input,
            graph,
            config,
            region,
            merge_tolerance,
            serial,
            csv,
        } => sections::run(
            &sections::SectionsArgs {
                input,
                graph,
                config: config.as_deref(),
                region: *region,
                merge_tolerance: *merge_tolerance,
                serial: *serial,
                csv: csv.as_deref(),
            },
            &cli,
        ),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            if let Some(section_err) = e.downcast_ref::<mesh_section::SectionError>() {
                eprintln!("{}: {}", "Error".red().bold(), section_err);
                eprintln!("  {}: {}", "Code".cyan(), section_err.code());
                eprintln!(
                    "  {}: {}",
                    "Suggestion".green(),
                    section_err.recovery_suggestion()
                );
            } else {
                eprintln!("{}: {}", "Error".red().bold(), e);
                for cause in e.chain().skip(1) {
                    eprintln!("  {}: {}", "Caused by".yellow(), cause);
                }
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
