//! Shared output helpers for text and JSON modes.

use colored::Colorize;
use serde::Serialize;

use crate::OutputFormat;

/// Print a result value. JSON mode writes it to stdout as pretty JSON;
/// text mode prints nothing (commands format their own text).
pub fn print<T: Serialize>(value: &T, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    if let OutputFormat::Json = format {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{}: failed to serialize output: {}", "Error".red().bold(), e),
        }
    }
}

/// Progress note, text mode only. Goes to stderr so stdout stays parseable.
pub fn info(message: &str, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    if let OutputFormat::Text = format {
        eprintln!("{} {}", "→".blue().bold(), message);
    }
}

/// Completion message, text mode only.
pub fn success(message: &str, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    if let OutputFormat::Text = format {
        println!("{} {}", "✓".green().bold(), message);
    }
}

/// Warning, shown in both modes on stderr.
pub fn warning(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}: {}", "Warning".yellow().bold(), message);
    }
}
