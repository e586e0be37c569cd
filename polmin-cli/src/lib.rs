#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::cast_precision_loss
)]

//! Command-line pipeline around the polarization minimization model.
//!
//! The heavy lifting (instance parsing, data-file emission, result
//! extraction, report rendering) lives in `polmin-core`; this crate adds the
//! solver subprocess, the subcommand surface and the batch test harness.

pub mod batch;
pub mod commands;
pub mod config;
pub mod solver;
pub mod summary;

pub use config::SolverConfig;
pub use solver::{SolverError, SolverRunner};
