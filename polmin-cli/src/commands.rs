//! Subcommand entry points: each function owns one `polmin` subcommand
//! end to end, from loading files to printing the outcome.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use polmin_core::{extract_result, read_report, write_data_file, write_report, ProblemInstance};

use crate::config::SolverConfig;
use crate::solver::SolverRunner;
use crate::summary::format_summary;

/// Data file written next to the instance unless the caller says otherwise.
fn default_data_path(instance: &Path) -> PathBuf {
    instance.with_extension("dzn")
}

/// Report file written next to the instance unless the caller says otherwise.
fn default_report_path(instance: &Path) -> PathBuf {
    instance.with_extension("out.txt")
}

fn load_instance(path: &Path) -> Result<ProblemInstance> {
    ProblemInstance::from_path(path)
        .with_context(|| format!("Failed to load instance {}", path.display()))
}

/// `polmin convert`: instance text in, MiniZinc data file out.
pub fn convert(instance_path: &Path, output: Option<&Path>) -> Result<()> {
    let instance = load_instance(instance_path)?;

    let data_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_data_path(instance_path));
    write_data_file(&instance, &data_path)
        .with_context(|| format!("Failed to write data file {}", data_path.display()))?;

    println!(
        "✓ Wrote {} ({} people, {} opinions)",
        data_path.display(),
        instance.n,
        instance.m
    );
    Ok(())
}

/// `polmin inspect`: parse an instance and print its parameters.
pub fn inspect(instance_path: &Path, json: bool) -> Result<()> {
    let instance = load_instance(instance_path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&instance)?);
        return Ok(());
    }

    println!("Instance: {}", instance_path.display());
    println!("  Population (n):     {}", instance.n);
    println!("  Opinions (m):       {}", instance.m);
    println!("  People per opinion: {}", join_counts(&instance.p));
    println!("  Opinion values:     {}", join_values(&instance.v));
    println!("  Resistance splits:");
    for (i, split) in instance.s.iter().enumerate() {
        println!(
            "    Opinion {}: low {}, medium {}, high {}",
            i + 1,
            split.low,
            split.medium,
            split.high
        );
    }
    println!("  Cost budget (ct):   {}", instance.ct);
    println!("  Max movements:      {}", instance.max_movs);
    Ok(())
}

/// `polmin solve`: the full pipeline. Converts the instance, runs the
/// solver, extracts the tagged result and writes the report file.
pub async fn solve(
    instance_path: &Path,
    output: Option<&Path>,
    data_file: Option<&Path>,
    config: SolverConfig,
) -> Result<()> {
    let instance = load_instance(instance_path)?;

    let data_path = data_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_data_path(instance_path));
    write_data_file(&instance, &data_path)
        .with_context(|| format!("Failed to write data file {}", data_path.display()))?;
    println!("ℹ Data file: {}", data_path.display());

    let runner = SolverRunner::new(config);
    runner.ensure_available().await?;

    let run = runner.solve(&data_path).await?;
    let result = extract_result(&run.stdout)
        .context("Solver finished but its output carried no usable result")?;

    let report_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_report_path(instance_path));
    write_report(&report_path, &result, instance.m)
        .with_context(|| format!("Failed to write report {}", report_path.display()))?;

    print!("{}", format_summary(&result, run.elapsed));
    println!("✓ Report written to {}", report_path.display());
    Ok(())
}

/// `polmin report`: read a report file back and summarize it.
pub fn report(report_path: &Path) -> Result<()> {
    let file = read_report(report_path)
        .with_context(|| format!("Failed to read report {}", report_path.display()))?;

    println!("Report: {}", report_path.display());
    println!("Polarization: {:.3}", file.polarization);
    for (tier, matrix) in &file.movements {
        let moved: u64 = matrix.iter().flatten().sum();
        println!("Tier {tier}: {} rows, {moved} people moved", matrix.len());
    }
    Ok(())
}

fn join_counts(values: &[u64]) -> String {
    values
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:.3}"))
        .collect::<Vec<_>>()
        .join(", ")
}
