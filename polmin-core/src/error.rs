//! Error types for the polarization pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading a problem instance from disk.
#[derive(Debug, Error)]
pub enum InstanceError {
    /// Input file does not exist
    #[error("Input file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed content or violated invariant
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A violated invariant or malformed field in instance text.
///
/// Validation is fail-fast: the first violation aborts the parse, so a
/// single variant describes everything the caller gets to see.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Expected at least {expected} non-blank lines, found {found}")]
    TooFewLines { expected: usize, found: usize },

    #[error("Invalid {field}: must be a positive integer, got {value:?}")]
    InvalidCount { field: &'static str, value: String },

    #[error("Expected {expected} values for {field}, found {found}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Sum of {field} ({actual}) does not match expected {expected}")]
    SumMismatch {
        field: String,
        expected: u64,
        actual: u64,
    },

    #[error("Opinion value {index} ({value}) must lie in [0, 1]")]
    RangeViolation { index: usize, value: f64 },

    #[error("Resistance line {index} has {found} fields, expected 3")]
    FieldCountMismatch { index: usize, found: usize },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Errors produced while extracting result fields from solver output.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The one mandatory field is absent
    #[error("Solver output contains no polarization value")]
    MissingPolarization,

    /// A located field failed numeric conversion
    #[error("Invalid number for {field}: {token:?}")]
    InvalidNumber { field: &'static str, token: String },
}

/// Errors produced while writing or reading a report file.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report file is empty")]
    Empty,

    #[error("Invalid polarization line: {token:?}")]
    InvalidPolarization { token: String },

    #[error("Invalid resistance level marker: {line:?}")]
    InvalidTierMarker { line: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
