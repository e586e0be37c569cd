//! Human-readable result summary, printed after a successful solve.

use std::time::Duration;

use polmin_core::{OptimizationResult, ResistanceTier};

/// Render the results panel: polarization, elapsed time, then the optional
/// distribution, median and per-tier movement matrices. Tier headings are
/// always present; a matrix body appears only when the solver reported one.
pub fn format_summary(result: &OptimizationResult, elapsed: Duration) -> String {
    let mut out = String::new();
    let banner = "═".repeat(80);

    out.push_str(&banner);
    out.push('\n');
    out.push_str("OPTIMIZATION RESULTS\n");
    out.push_str(&banner);
    out.push_str("\n\n");

    out.push_str(&format!(
        "✓ Final polarization: {:.3}\n\n",
        result.polarization
    ));
    out.push_str(&format!(
        "Execution time: {:.2} seconds\n\n",
        elapsed.as_secs_f64()
    ));

    if let Some(distribution) = &result.final_distribution {
        out.push_str("Final distribution of people:\n");
        for (i, count) in distribution.iter().enumerate() {
            out.push_str(&format!("  Opinion {}: {count} people\n", i + 1));
        }
        out.push('\n');
    }

    if let Some(median) = result.median_value {
        out.push_str(&format!("Median value: {median:.3}\n\n"));
    }

    for tier in ResistanceTier::ALL {
        out.push_str(&format!("Movements ({} resistance):\n", tier.name()));
        let Some(matrix) = result.movements_for(tier) else {
            continue;
        };
        if matrix.is_empty() {
            continue;
        }

        out.push_str("      ");
        for j in 0..matrix.len() {
            out.push_str(&format!("Op{:2} ", j + 1));
        }
        out.push('\n');

        for (i, row) in matrix.iter().enumerate() {
            out.push_str(&format!("  Op{:2} ", i + 1));
            for val in row {
                out.push_str(&format!("{val:3} "));
            }
            out.push('\n');
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use polmin_core::MovementMatrix;

    fn result_with(movements: [Option<MovementMatrix>; 3]) -> OptimizationResult {
        OptimizationResult {
            polarization: 0.312,
            final_distribution: Some(vec![12, 8]),
            median_value: Some(0.5),
            movements,
        }
    }

    #[test]
    fn renders_all_sections() {
        let matrix = vec![vec![1, 0], vec![0, 2]];
        let summary = format_summary(
            &result_with([Some(matrix), None, None]),
            Duration::from_millis(1_250),
        );

        assert!(summary.contains("OPTIMIZATION RESULTS"));
        assert!(summary.contains("✓ Final polarization: 0.312"));
        assert!(summary.contains("Execution time: 1.25 seconds"));
        assert!(summary.contains("  Opinion 1: 12 people"));
        assert!(summary.contains("  Opinion 2: 8 people"));
        assert!(summary.contains("Median value: 0.500"));
        assert!(summary.contains("Movements (low resistance):\n      Op 1 Op 2 \n"));
        assert!(summary.contains("  Op 1   1   0 \n  Op 2   0   2 \n"));
    }

    #[test]
    fn tier_headings_appear_without_matrices() {
        let summary = format_summary(&result_with([None, None, None]), Duration::from_secs(2));
        assert!(summary.contains("Movements (low resistance):"));
        assert!(summary.contains("Movements (medium resistance):"));
        assert!(summary.contains("Movements (high resistance):"));
        assert!(!summary.contains("Op 1"));
    }

    #[test]
    fn skips_optional_sections_when_absent() {
        let result = OptimizationResult {
            polarization: 1.0,
            final_distribution: None,
            median_value: None,
            movements: [None, None, None],
        };
        let summary = format_summary(&result, Duration::from_secs(1));
        assert!(!summary.contains("Final distribution"));
        assert!(!summary.contains("Median value"));
        assert!(summary.contains("✓ Final polarization: 1.000"));
    }
}
