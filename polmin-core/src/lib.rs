//! Polmin Core - Data pipeline around the polarization minimization solver.
//!
//! This crate provides:
//! - Problem instance parsing and cross-field invariant validation
//! - MiniZinc data-file emission
//! - Extraction of tagged result fields from solver output
//! - Final-report generation and its inverse reader
//!
//! Every operation is synchronous and side-effect-free apart from file I/O
//! at the boundaries, so the whole pipeline is safe to call from any thread
//! without coordination. Invoking the solver itself lives in the CLI crate.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod datafile;
pub mod error;
pub mod extract;
pub mod instance;
pub mod report;

pub use datafile::{emit_data_file, write_data_file};
pub use error::{ExtractError, InstanceError, ParseError, ReportError};
pub use extract::{extract_result, MovementMatrix, OptimizationResult};
pub use instance::{parse_instance, ProblemInstance, ResistanceSplit, ResistanceTier};
pub use report::{parse_report, read_report, render_report, write_report, ReportFile};
