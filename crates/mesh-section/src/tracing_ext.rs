//! Tracing helpers for section measurement.
//!
//! Events are emitted under `mesh_section::*` targets:
//!
//! - `mesh_section::timing`: operation start and elapsed time
//! - `mesh_section::state`: polydata sizes at pipeline stages
//! - `mesh_section::io`: file loads and saves
//! - `mesh_section::progress`: batch progress
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // RUST_LOG=mesh_section=debug for per-stage output
//! ```

use std::path::Path;
use std::time::Instant;

use tracing::{Span, debug, info, trace, warn};

use crate::types::PolyData;

/// A performance timer that logs its duration on drop.
///
/// ```rust,ignore
/// use mesh_section::tracing_ext::OperationTimer;
///
/// fn expensive_operation() {
///     let _timer = OperationTimer::new("expensive_operation");
///     // ... do work ...
/// } // logs elapsed_ms here
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Create a new operation timer.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("section_operation", operation = name);
        debug!(target: "mesh_section::timing", operation = name, "Starting operation");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Create a timer that also records the size of the work.
    pub fn with_context(name: &'static str, points: usize, items: usize) -> Self {
        let span = tracing::info_span!(
            "section_operation",
            operation = name,
            points = points,
            items = items
        );
        debug!(
            target: "mesh_section::timing",
            operation = name,
            points = points,
            items = items,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// The span opened for this operation.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        info!(
            target: "mesh_section::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            "Operation completed"
        );
    }
}

/// Log polydata sizes at trace level.
pub fn log_polydata_stats(data: &PolyData, stage: &str) {
    trace!(
        target: "mesh_section::state",
        stage = stage,
        points = data.point_count(),
        lines = data.line_count(),
        polys = data.poly_count(),
        "Polydata state"
    );
}

/// Log a file I/O operation.
pub fn log_io_operation(operation: &str, path: &Path, format: Option<&str>, success: bool) {
    if success {
        info!(
            target: "mesh_section::io",
            operation = operation,
            path = path.display().to_string(),
            format = format.unwrap_or("auto"),
            "I/O operation completed"
        );
    } else {
        warn!(
            target: "mesh_section::io",
            operation = operation,
            path = path.display().to_string(),
            format = format.unwrap_or("auto"),
            "I/O operation failed"
        );
    }
}

/// Log progress of a batch operation.
pub fn log_progress(operation: &str, current: usize, total: usize) {
    let percent = if total > 0 {
        (current as f64 / total as f64 * 100.0) as u32
    } else {
        0
    };

    debug!(
        target: "mesh_section::progress",
        operation = operation,
        current = current,
        total = total,
        percent = percent,
        "Progress update"
    );
}
