//! Solver configuration.
//!
//! Defaults match the original project layout: a `minizinc` binary on the
//! PATH, the Gecode backend, the model under `model/` and a five minute
//! solver time limit. A `polmin.json` file in the working directory
//! overrides the defaults; command-line flags override both.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "polmin.json";

fn default_binary() -> String {
    "minizinc".to_string()
}

fn default_backend() -> String {
    "Gecode".to_string()
}

fn default_model() -> PathBuf {
    PathBuf::from("model/polarization.mzn")
}

fn default_time_limit_ms() -> u64 {
    300_000
}

/// External solver invocation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Solver executable name or path.
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Backend handed to the executable via `--solver`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Model file passed to the solver together with the data file.
    #[serde(default = "default_model")]
    pub model: PathBuf,
    /// Solver-side time limit in milliseconds.
    #[serde(default = "default_time_limit_ms")]
    pub time_limit_ms: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            backend: default_backend(),
            model: default_model(),
            time_limit_ms: default_time_limit_ms(),
        }
    }
}

impl SolverConfig {
    /// Load `polmin.json` from the working directory, or the defaults when
    /// no such file exists.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load configuration from a specific path. A missing file yields the
    /// defaults; a file that exists but does not parse is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded solver config");
        Ok(config)
    }
}
