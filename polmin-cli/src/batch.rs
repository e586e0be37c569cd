//! Numbered test battery: solve every `<prefix><n>.txt` instance listed in
//! the expected-results table and compare polarization values within a
//! fixed tolerance.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};

use polmin_core::{extract_result, write_data_file, ProblemInstance};

use crate::config::SolverConfig;
use crate::solver::{SolverError, SolverRunner};

/// Obtained and expected polarization may differ by at most this much.
const TOLERANCE: f64 = 0.001;

/// What happened to one numbered test.
enum TestOutcome {
    Passed { polarization: f64, elapsed: Duration },
    Failed { expected: f64, obtained: f64, elapsed: Duration },
    NotFound { path: PathBuf },
    ParseFailed { message: String },
    Timeout { elapsed: Duration },
    SolverFailed { message: String, elapsed: Duration },
    OutputUnusable { message: String, elapsed: Duration },
}

impl TestOutcome {
    /// Solver wall time, absent when the test never reached the solver.
    fn elapsed(&self) -> Option<Duration> {
        match self {
            TestOutcome::Passed { elapsed, .. }
            | TestOutcome::Failed { elapsed, .. }
            | TestOutcome::Timeout { elapsed }
            | TestOutcome::SolverFailed { elapsed, .. }
            | TestOutcome::OutputUnusable { elapsed, .. } => Some(*elapsed),
            TestOutcome::NotFound { .. } | TestOutcome::ParseFailed { .. } => None,
        }
    }
}

struct TestResult {
    number: u32,
    outcome: TestOutcome,
}

/// Run the whole battery. Fails when any test does not pass, so the exit
/// code is usable from CI.
pub async fn run(
    tests_dir: &Path,
    expected_file: &Path,
    prefix: &str,
    config: SolverConfig,
) -> Result<()> {
    println!("{}", "=".repeat(80));
    println!("{:^80}", "POLARIZATION TEST BATTERY");
    println!("{}", "=".repeat(80));

    let runner = SolverRunner::new(config);
    if !runner.config().model.exists() {
        bail!("model file {} not found", runner.config().model.display());
    }
    if !expected_file.exists() {
        bail!(
            "expected-results file {} not found",
            expected_file.display()
        );
    }
    runner.ensure_available().await?;

    println!("ℹ Loading expected results from {}", expected_file.display());
    let text = fs::read_to_string(expected_file)
        .with_context(|| format!("Failed to read {}", expected_file.display()))?;
    let expected = parse_expected_results(&text);
    if expected.is_empty() {
        bail!("no usable rows in {}", expected_file.display());
    }
    println!("✓ Loaded {} expected results", expected.len());
    println!();

    let scratch = tempfile::tempdir().context("Failed to create scratch directory")?;

    let mut results = Vec::with_capacity(expected.len());
    for (&number, &value) in &expected {
        let outcome = run_test(&runner, scratch.path(), tests_dir, prefix, number, value).await;
        let result = TestResult { number, outcome };
        print_test_line(prefix, &result);
        results.push(result);
    }

    print_summary(&results);

    let not_passed = results
        .iter()
        .filter(|r| !matches!(r.outcome, TestOutcome::Passed { .. }))
        .count();
    if not_passed > 0 {
        bail!("{not_passed} of {} tests did not pass", results.len());
    }
    Ok(())
}

/// Parse the tab-separated expected-results table. The first two lines are
/// headers; rows that do not parse are skipped.
fn parse_expected_results(text: &str) -> BTreeMap<u32, f64> {
    let mut expected = BTreeMap::new();
    for line in text.lines().skip(2) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let (Some(number), Some(value)) = (fields.next(), fields.next()) else {
            continue;
        };
        let Ok(number) = number.trim().parse::<u32>() else {
            continue;
        };
        // Tables exported from spreadsheets use a decimal comma.
        let Ok(value) = value.trim().replace(',', ".").parse::<f64>() else {
            continue;
        };
        expected.insert(number, value);
    }
    expected
}

async fn run_test(
    runner: &SolverRunner,
    scratch: &Path,
    tests_dir: &Path,
    prefix: &str,
    number: u32,
    expected: f64,
) -> TestOutcome {
    let instance_path = tests_dir.join(format!("{prefix}{number}.txt"));
    if !instance_path.exists() {
        return TestOutcome::NotFound {
            path: instance_path,
        };
    }

    let instance = match ProblemInstance::from_path(&instance_path) {
        Ok(instance) => instance,
        Err(err) => {
            return TestOutcome::ParseFailed {
                message: err.to_string(),
            }
        }
    };

    let data_path = scratch.join(format!("{prefix}{number}.dzn"));
    if let Err(err) = write_data_file(&instance, &data_path) {
        return TestOutcome::ParseFailed {
            message: err.to_string(),
        };
    }

    let start = Instant::now();
    let run = match runner.solve(&data_path).await {
        Ok(run) => run,
        Err(SolverError::Timeout { .. }) => {
            return TestOutcome::Timeout {
                elapsed: start.elapsed(),
            }
        }
        Err(err) => {
            return TestOutcome::SolverFailed {
                message: err.to_string(),
                elapsed: start.elapsed(),
            }
        }
    };

    let result = match extract_result(&run.stdout) {
        Ok(result) => result,
        Err(err) => {
            return TestOutcome::OutputUnusable {
                message: err.to_string(),
                elapsed: run.elapsed,
            }
        }
    };

    if within_tolerance(result.polarization, expected) {
        TestOutcome::Passed {
            polarization: result.polarization,
            elapsed: run.elapsed,
        }
    } else {
        TestOutcome::Failed {
            expected,
            obtained: result.polarization,
            elapsed: run.elapsed,
        }
    }
}

fn within_tolerance(obtained: f64, expected: f64) -> bool {
    (obtained - expected).abs() <= TOLERANCE
}

fn print_test_line(prefix: &str, result: &TestResult) {
    let label = format!("{prefix} {:2}", result.number);
    match &result.outcome {
        TestOutcome::Passed {
            polarization,
            elapsed,
        } => println!(
            "✓ {label}: polarization = {polarization:.3} | time = {:.3}s",
            elapsed.as_secs_f64()
        ),
        TestOutcome::Failed {
            expected, obtained, ..
        } => println!(
            "✗ {label}: expected = {expected:.3}, obtained = {obtained:.3}, diff = {:.6}",
            (obtained - expected).abs()
        ),
        TestOutcome::NotFound { path } => {
            println!("⚠ {label}: file {} not found", path.display());
        }
        TestOutcome::ParseFailed { message } => {
            println!("✗ {label}: failed to parse input: {message}");
        }
        TestOutcome::Timeout { elapsed } => {
            println!("✗ {label}: TIMEOUT (>{:.1}s)", elapsed.as_secs_f64());
        }
        TestOutcome::SolverFailed { message, .. } => {
            println!("✗ {label}: solver run failed: {message}");
        }
        TestOutcome::OutputUnusable { message, .. } => {
            println!("✗ {label}: {message}");
        }
    }
}

fn print_summary(results: &[TestResult]) {
    let total = results.len();
    let passed = results
        .iter()
        .filter(|r| matches!(r.outcome, TestOutcome::Passed { .. }))
        .count();
    let failed = results
        .iter()
        .filter(|r| matches!(r.outcome, TestOutcome::Failed { .. }))
        .count();
    let errors = total - passed - failed;

    println!();
    println!("{}", "=".repeat(80));
    println!("{:^80}", "RESULTS SUMMARY");
    println!("{}", "=".repeat(80));
    println!("Total tests:  {total}");
    println!("Passed:       {passed} ({:.1}%)", percentage(passed, total));
    println!("Failed:       {failed} ({:.1}%)", percentage(failed, total));
    println!("Errors:       {errors} ({:.1}%)", percentage(errors, total));

    let times: Vec<f64> = results
        .iter()
        .filter_map(|r| r.outcome.elapsed())
        .map(|d| d.as_secs_f64())
        .filter(|t| *t > 0.0)
        .collect();
    if !times.is_empty() {
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        println!();
        println!("Execution time:");
        println!("  Average: {avg:.3}s");
        println!("  Minimum: {min:.3}s");
        println!("  Maximum: {max:.3}s");
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * part as f64 / total as f64
}
