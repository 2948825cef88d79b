//! Error types for cross-section operations with rich diagnostics.
//!
//! This module provides error handling with:
//! - Machine-readable error codes for programmatic handling
//! - Context (which array, which index, which edge)
//! - Recovery suggestions for common issues
//! - Terminal display via miette
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `XSEC-XXXX`:
//! - `XSEC-1xxx`: I/O errors (file reading, writing, parsing)
//! - `XSEC-2xxx`: Validation errors (array shapes, indices, coordinates)
//! - `XSEC-3xxx`: Geometry errors (degenerate planes and edges)
//! - `XSEC-4xxx`: Format errors (unsupported or malformed data)
//!
//! # Example
//!
//! ```
//! use mesh_section::{ErrorCode, SectionError};
//!
//! let err = SectionError::invalid_shape("edges", 2, 3);
//! assert_eq!(err.code(), ErrorCode::InvalidShape);
//! assert_eq!(err.code().as_str(), "XSEC-2001");
//! ```

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cross-section operations.
pub type SectionResult<T> = Result<T, SectionError>;

/// Machine-readable error codes.
///
/// Codes follow the pattern `XSEC-XXXX` where:
/// - 1xxx = I/O errors
/// - 2xxx = Validation errors
/// - 3xxx = Geometry errors
/// - 4xxx = Format errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // I/O errors (1xxx)
    /// XSEC-1001: Failed to read file
    IoRead = 1001,
    /// XSEC-1002: Failed to write file
    IoWrite = 1002,
    /// XSEC-1003: Failed to parse file contents
    ParseError = 1003,

    // Validation errors (2xxx)
    /// XSEC-2001: Array has the wrong number of columns
    InvalidShape = 2001,
    /// XSEC-2002: Index array refers to a vertex that does not exist
    InvalidVertexIndex = 2002,
    /// XSEC-2003: Vertex has NaN or Infinity coordinate
    InvalidCoordinate = 2003,
    /// XSEC-2004: Input has no rows
    EmptyInput = 2004,

    // Geometry errors (3xxx)
    /// XSEC-3001: Graph edge has zero length
    DegenerateEdge = 3001,
    /// XSEC-3002: Plane normal is zero or not finite
    DegeneratePlane = 3002,

    // Format errors (4xxx)
    /// XSEC-4001: Unsupported file format
    UnsupportedFormat = 4001,
    /// XSEC-4002: Packed cell array is truncated or inconsistent
    MalformedCells = 4002,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `XSEC-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::IoRead => "XSEC-1001",
            ErrorCode::IoWrite => "XSEC-1002",
            ErrorCode::ParseError => "XSEC-1003",
            ErrorCode::InvalidShape => "XSEC-2001",
            ErrorCode::InvalidVertexIndex => "XSEC-2002",
            ErrorCode::InvalidCoordinate => "XSEC-2003",
            ErrorCode::EmptyInput => "XSEC-2004",
            ErrorCode::DegenerateEdge => "XSEC-3001",
            ErrorCode::DegeneratePlane => "XSEC-3002",
            ErrorCode::UnsupportedFormat => "XSEC-4001",
            ErrorCode::MalformedCells => "XSEC-4002",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for section errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Reshape or re-export the input arrays.
    FixInput { checks: Vec<String> },
    /// Use a different file format.
    UseDifferentFormat { suggested: Vec<String> },
    /// Clean up the skeleton graph before measuring.
    CleanGraph { operations: Vec<String> },
    /// Check the file on disk.
    CheckFile { checks: Vec<String> },
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoverySuggestion::FixInput { checks } => {
                write!(f, "Check the input arrays for: {}", checks.join(", "))
            }
            RecoverySuggestion::UseDifferentFormat { suggested } => {
                write!(f, "Try using a different format: {}", suggested.join(", "))
            }
            RecoverySuggestion::CleanGraph { operations } => {
                write!(f, "Clean the graph first: {}", operations.join(", "))
            }
            RecoverySuggestion::CheckFile { checks } => {
                write!(f, "Check the file for: {}", checks.join(", "))
            }
        }
    }
}

/// Errors that can occur while building polydata or measuring sections.
#[derive(Debug, Error, Diagnostic)]
pub enum SectionError {
    /// Error reading from a file.
    #[error("failed to read {path}")]
    #[diagnostic(
        code(section::io::read),
        help("Check that the file exists and is readable. Try: ls -la {}", path.display())
    )]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing to a file.
    #[error("failed to write {path}")]
    #[diagnostic(
        code(section::io::write),
        help("Check that the directory exists and is writable")
    )]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing file contents.
    #[error("failed to parse {path}: {details}")]
    #[diagnostic(code(section::parse::error))]
    ParseError { path: PathBuf, details: String },

    /// Unsupported file format.
    #[error("unsupported file format: {extension:?}")]
    #[diagnostic(
        code(section::format::unsupported),
        help("Supported mesh formats: STL, OBJ. Graphs are read from JSON.")
    )]
    UnsupportedFormat { extension: Option<String> },

    /// An index or vertex array has the wrong number of columns.
    #[error("{what} must have {expected} columns, got {found}")]
    #[diagnostic(
        code(section::validate::shape),
        help("Edges are Mx2 index arrays, triangles Mx3, vertices Nx3")
    )]
    InvalidShape {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// An index array refers to a vertex that does not exist.
    #[error("{what} refer to non existent vertex {index} (vertex count: {vertex_count})")]
    #[diagnostic(code(section::validate::vertex_index))]
    InvalidVertexIndex {
        what: &'static str,
        index: usize,
        vertex_count: usize,
    },

    /// A vertex has a NaN or infinite coordinate.
    #[error("vertex {vertex_index} has invalid {coordinate} coordinate: {value}")]
    #[diagnostic(code(section::validate::coordinate))]
    InvalidCoordinate {
        vertex_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    /// The input has no rows to work with.
    #[error("empty input: {details}")]
    #[diagnostic(code(section::validate::empty))]
    EmptyInput { details: String },

    /// A graph edge whose endpoints coincide, so it defines no plane.
    #[error("edge {edge_index} ({vertex_a} -> {vertex_b}) has zero length")]
    #[diagnostic(
        code(section::geometry::degenerate_edge),
        help("Collapse duplicate skeleton vertices before measuring")
    )]
    DegenerateEdge {
        edge_index: usize,
        vertex_a: usize,
        vertex_b: usize,
    },

    /// A plane was requested with a zero or non-finite normal.
    #[error("plane normal {normal:?} is degenerate")]
    #[diagnostic(code(section::geometry::degenerate_plane))]
    DegeneratePlane { normal: [f64; 3] },

    /// A packed cell array could not be decoded.
    #[error("malformed cell array: {details}")]
    #[diagnostic(code(section::format::cells))]
    MalformedCells { details: String },
}

impl SectionError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            SectionError::IoRead { .. } => ErrorCode::IoRead,
            SectionError::IoWrite { .. } => ErrorCode::IoWrite,
            SectionError::ParseError { .. } => ErrorCode::ParseError,
            SectionError::UnsupportedFormat { .. } => ErrorCode::UnsupportedFormat,
            SectionError::InvalidShape { .. } => ErrorCode::InvalidShape,
            SectionError::InvalidVertexIndex { .. } => ErrorCode::InvalidVertexIndex,
            SectionError::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
            SectionError::EmptyInput { .. } => ErrorCode::EmptyInput,
            SectionError::DegenerateEdge { .. } => ErrorCode::DegenerateEdge,
            SectionError::DegeneratePlane { .. } => ErrorCode::DegeneratePlane,
            SectionError::MalformedCells { .. } => ErrorCode::MalformedCells,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            SectionError::IoRead { .. } => RecoverySuggestion::CheckFile {
                checks: vec!["file exists".into(), "file permissions".into()],
            },
            SectionError::IoWrite { .. } => RecoverySuggestion::CheckFile {
                checks: vec!["directory exists".into(), "write permissions".into()],
            },
            SectionError::ParseError { .. } => RecoverySuggestion::CheckFile {
                checks: vec!["file is complete".into(), "expected layout".into()],
            },
            SectionError::UnsupportedFormat { .. } => RecoverySuggestion::UseDifferentFormat {
                suggested: vec!["STL".into(), "OBJ".into()],
            },
            SectionError::InvalidShape { .. } => RecoverySuggestion::FixInput {
                checks: vec!["column count".into(), "array orientation".into()],
            },
            SectionError::InvalidVertexIndex { .. } => RecoverySuggestion::FixInput {
                checks: vec!["index base (0 vs 1)".into(), "matching vertex array".into()],
            },
            SectionError::InvalidCoordinate { .. } => RecoverySuggestion::FixInput {
                checks: vec!["NaN values".into(), "export precision".into()],
            },
            SectionError::EmptyInput { .. } => RecoverySuggestion::FixInput {
                checks: vec!["array has rows".into()],
            },
            SectionError::DegenerateEdge { .. } => RecoverySuggestion::CleanGraph {
                operations: vec!["merge duplicate vertices".into(), "drop self loops".into()],
            },
            SectionError::DegeneratePlane { .. } => RecoverySuggestion::FixInput {
                checks: vec!["non-zero normal".into()],
            },
            SectionError::MalformedCells { .. } => RecoverySuggestion::FixInput {
                checks: vec!["cell sizes match id count".into()],
            },
        }
    }

    // Constructor helpers for common error patterns

    /// Create an IoRead error.
    pub fn io_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SectionError::IoRead {
            path: path.into(),
            source,
        }
    }

    /// Create an IoWrite error.
    pub fn io_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SectionError::IoWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a ParseError.
    pub fn parse_error(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        SectionError::ParseError {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Create an InvalidShape error.
    pub fn invalid_shape(what: &'static str, expected: usize, found: usize) -> Self {
        SectionError::InvalidShape {
            what,
            expected,
            found,
        }
    }

    /// Create an InvalidVertexIndex error.
    pub fn invalid_vertex_index(what: &'static str, index: usize, vertex_count: usize) -> Self {
        SectionError::InvalidVertexIndex {
            what,
            index,
            vertex_count,
        }
    }

    /// Create an EmptyInput error.
    pub fn empty_input(details: impl Into<String>) -> Self {
        SectionError::EmptyInput {
            details: details.into(),
        }
    }

    /// Create a MalformedCells error.
    pub fn malformed_cells(details: impl Into<String>) -> Self {
        SectionError::MalformedCells {
            details: details.into(),
        }
    }
}
