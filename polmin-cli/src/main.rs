#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use polmin_cli::config::SolverConfig;
use polmin_cli::{batch, commands};

/// `polmin` - data pipeline around the polarization minimization solver.
#[derive(Parser, Debug)]
#[command(name = "polmin")]
#[command(version = "0.1.0")]
#[command(about = "Convert, solve and report polarization instances.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert an instance file into a MiniZinc data file
    Convert {
        /// Instance file (plain text, one field per line)
        instance: PathBuf,

        /// Output data file (default: instance path with a .dzn extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse an instance and print its parameters
    Inspect {
        /// Instance file
        instance: PathBuf,

        /// Print the instance as JSON instead of the readable layout
        #[arg(long)]
        json: bool,
    },

    /// Run the full pipeline: convert, solve, extract, write the report
    Solve {
        /// Instance file
        instance: PathBuf,

        /// Report file (default: instance path with an .out.txt extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Where to write the intermediate data file (default: next to the instance)
        #[arg(long)]
        data_file: Option<PathBuf>,

        #[command(flatten)]
        solver: SolverArgs,
    },

    /// Read a report file back and print what it contains
    Report {
        /// Report file written by a previous solve
        report: PathBuf,
    },

    /// Run the numbered test battery against expected results
    Batch {
        /// Directory containing the numbered instance files
        #[arg(long, default_value = "tests")]
        tests_dir: PathBuf,

        /// Expected-results file (tab-separated)
        #[arg(long, default_value = "tests/resultados.txt")]
        expected: PathBuf,

        /// Instance file name prefix (files are <prefix><number>.txt)
        #[arg(long, default_value = "Prueba")]
        prefix: String,

        #[command(flatten)]
        solver: SolverArgs,
    },
}

/// Solver flags shared by `solve` and `batch`. Unset flags fall back to
/// `polmin.json`, then to the built-in defaults.
#[derive(Args, Debug)]
struct SolverArgs {
    /// Solver executable
    #[arg(long)]
    solver_bin: Option<String>,

    /// Backend passed to the executable via --solver
    #[arg(long)]
    backend: Option<String>,

    /// MiniZinc model file
    #[arg(long)]
    model: Option<PathBuf>,

    /// Solver-side time limit in milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,
}

impl SolverArgs {
    fn into_config(self) -> Result<SolverConfig> {
        let mut config = SolverConfig::load()?;
        if let Some(binary) = self.solver_bin {
            config.binary = binary;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(limit) = self.time_limit_ms {
            config.time_limit_ms = limit;
        }
        Ok(config)
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(true)
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::Convert { instance, output } => commands::convert(&instance, output.as_deref()),

        Commands::Inspect { instance, json } => commands::inspect(&instance, json),

        Commands::Solve {
            instance,
            output,
            data_file,
            solver,
        } => {
            commands::solve(
                &instance,
                output.as_deref(),
                data_file.as_deref(),
                solver.into_config()?,
            )
            .await
        }

        Commands::Report { report } => commands::report(&report),

        Commands::Batch {
            tests_dir,
            expected,
            prefix,
            solver,
        } => batch::run(&tests_dir, &expected, &prefix, solver.into_config()?).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_has_no_flag_conflicts() {
        Cli::command().debug_assert();
    }
}
