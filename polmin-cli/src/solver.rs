//! External solver invocation.
//!
//! The solver is a black box: a model file and a data file go in, tagged
//! text comes out. The process runs under a wall-clock watchdog slightly
//! above the solver's own time limit, so a hung solver cannot stall the
//! pipeline; a timed-out run is abandoned, never retried.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::process::Command;

use crate::config::SolverConfig;

/// Wall-clock allowance on top of the solver's own time limit.
const WATCHDOG_GRACE: Duration = Duration::from_secs(20);

/// Timeout for the availability probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum SolverError {
    #[error(
        "{binary} is not installed or not on the PATH ({reason}). \
         Download it from https://www.minizinc.org/ and check the \
         installation with `{binary} --version`"
    )]
    NotAvailable { binary: String, reason: String },

    #[error("Model file not found: {0}")]
    ModelMissing(PathBuf),

    #[error("Solver exited with code {code}: {stderr}")]
    Failed { code: i32, stderr: String },

    #[error("Solver timed out after {limit_secs} seconds")]
    Timeout { limit_secs: u64 },

    #[error("Failed to run solver: {0}")]
    Io(#[from] std::io::Error),
}

/// A successful solver run: raw stdout plus wall-clock duration.
#[derive(Debug)]
pub struct SolverRun {
    pub stdout: String,
    pub elapsed: Duration,
}

/// Spawns the configured solver over a model/data file pair.
pub struct SolverRunner {
    config: SolverConfig,
    grace: Duration,
}

impl SolverRunner {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            grace: WATCHDOG_GRACE,
        }
    }

    /// Override the watchdog grace period.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Probe the solver binary with `--version`.
    pub async fn ensure_available(&self) -> Result<(), SolverError> {
        let mut cmd = Command::new(&self.config.binary);
        cmd.arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match tokio::time::timeout(PROBE_TIMEOUT, cmd.output()).await {
            Ok(Ok(output)) if output.status.success() => Ok(()),
            Ok(Ok(output)) => Err(SolverError::NotAvailable {
                binary: self.config.binary.clone(),
                reason: format!("`--version` exited with {}", output.status),
            }),
            Ok(Err(e)) => Err(SolverError::NotAvailable {
                binary: self.config.binary.clone(),
                reason: e.to_string(),
            }),
            Err(_) => Err(SolverError::NotAvailable {
                binary: self.config.binary.clone(),
                reason: format!(
                    "`--version` did not answer within {} seconds",
                    PROBE_TIMEOUT.as_secs()
                ),
            }),
        }
    }

    /// Run the solver over `data_file` and return its stdout.
    ///
    /// Exit status 0 yields stdout; a non-zero exit yields the stderr
    /// payload (`"unknown error"` when the solver printed nothing there).
    pub async fn solve(&self, data_file: &Path) -> Result<SolverRun, SolverError> {
        if !self.config.model.exists() {
            return Err(SolverError::ModelMissing(self.config.model.clone()));
        }

        let watchdog = Duration::from_millis(self.config.time_limit_ms) + self.grace;

        let mut cmd = Command::new(&self.config.binary);
        cmd.arg("--solver")
            .arg(&self.config.backend)
            .arg("--time-limit")
            .arg(self.config.time_limit_ms.to_string())
            .arg(&self.config.model)
            .arg(data_file)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::info!(
            binary = %self.config.binary,
            backend = %self.config.backend,
            model = %self.config.model.display(),
            data_file = %data_file.display(),
            time_limit_ms = self.config.time_limit_ms,
            "Starting solver"
        );

        let start = Instant::now();
        let result = tokio::time::timeout(watchdog, cmd.output()).await;
        let elapsed = start.elapsed();

        match result {
            Ok(Ok(output)) => {
                if output.status.success() {
                    tracing::info!(elapsed_secs = elapsed.as_secs_f64(), "Solver finished");
                    Ok(SolverRun {
                        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                        elapsed,
                    })
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                    let stderr = if stderr.is_empty() {
                        "unknown error".to_string()
                    } else {
                        stderr
                    };
                    Err(SolverError::Failed {
                        code: output.status.code().unwrap_or(-1),
                        stderr,
                    })
                }
            }
            Ok(Err(e)) => Err(SolverError::Io(e)),
            Err(_) => {
                tracing::warn!(
                    limit_secs = watchdog.as_secs(),
                    "Solver timed out, abandoning run"
                );
                Err(SolverError::Timeout {
                    limit_secs: watchdog.as_secs(),
                })
            }
        }
    }
}
