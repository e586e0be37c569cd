//! Solver output extraction.
//!
//! MiniZinc output mixes free text (status lines, statistics) with the
//! `key=value` tagged fields emitted by the model's output item. Extraction
//! is pattern-based, one expression per field, since no enclosing grammar
//! governs the surrounding text. Only `polarization` is mandatory; every
//! other field is optional and its absence is not an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ExtractError;
use crate::instance::ResistanceTier;

/// Pre-compiled patterns for the tagged result fields
static POLARIZATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"polarization=(-?[\d.]+(?:[eE][+-]?\d+)?)").unwrap());
static DISTRIBUTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"final_distribution=\[([\d, ]+)\]").unwrap());
static MEDIAN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"median_value=([\d.]+)").unwrap());
static MOVEMENTS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"movements_k([123])=\[([\d,\s]+)\]").unwrap());

/// Per-tier movement counts; row = source opinion, column = target opinion.
pub type MovementMatrix = Vec<Vec<u64>>;

/// Result fields extracted from a successful solver run.
///
/// Movement matrices are kept exactly as the solver printed them; shape
/// repair against the instance size happens in the report emitter, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    /// Objective value, the only mandatory field.
    pub polarization: f64,
    /// People per opinion after the movements, when reported.
    pub final_distribution: Option<Vec<u64>>,
    /// Median opinion value, when reported.
    pub median_value: Option<f64>,
    /// Movement matrices in tier order (low, medium, high).
    pub movements: [Option<MovementMatrix>; 3],
}

impl OptimizationResult {
    /// Movement matrix for one resistance tier, if the solver reported it.
    pub fn movements_for(&self, tier: ResistanceTier) -> Option<&MovementMatrix> {
        self.movements[tier.level() as usize - 1].as_ref()
    }
}

/// Extract the tagged result fields from solver stdout.
///
/// Fails only when `polarization` cannot be located, or when a located
/// field fails numeric conversion. The first occurrence of each field wins.
pub fn extract_result(stdout: &str) -> Result<OptimizationResult, ExtractError> {
    let polarization = match POLARIZATION_PATTERN.captures(stdout) {
        Some(caps) => parse_f64("polarization", &caps[1])?,
        None => return Err(ExtractError::MissingPolarization),
    };

    let final_distribution = DISTRIBUTION_PATTERN
        .captures(stdout)
        .map(|caps| {
            caps[1]
                .split(',')
                .map(|tok| parse_u64("final_distribution", tok))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    let median_value = MEDIAN_PATTERN
        .captures(stdout)
        .map(|caps| parse_f64("median_value", &caps[1]))
        .transpose()?;

    let mut movements: [Option<MovementMatrix>; 3] = [None, None, None];
    for caps in MOVEMENTS_PATTERN.captures_iter(stdout) {
        let slot = match &caps[1] {
            "1" => 0,
            "2" => 1,
            _ => 2,
        };
        if movements[slot].is_none() {
            movements[slot] = Some(parse_matrix(&caps[2])?);
        }
    }

    Ok(OptimizationResult {
        polarization,
        final_distribution,
        median_value,
        movements,
    })
}

/// Split a bracketed movements block into rows: one physical line per row,
/// blank lines and empty tokens skipped.
fn parse_matrix(block: &str) -> Result<MovementMatrix, ExtractError> {
    let mut matrix = MovementMatrix::new();
    for line in block.trim().lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row = line
            .split(',')
            .filter(|tok| !tok.trim().is_empty())
            .map(|tok| parse_u64("movements", tok))
            .collect::<Result<Vec<_>, _>>()?;
        matrix.push(row);
    }
    Ok(matrix)
}

fn parse_u64(field: &'static str, token: &str) -> Result<u64, ExtractError> {
    token.trim().parse().map_err(|_| ExtractError::InvalidNumber {
        field,
        token: token.trim().to_string(),
    })
}

fn parse_f64(field: &'static str, token: &str) -> Result<f64, ExtractError> {
    token.trim().parse().map_err(|_| ExtractError::InvalidNumber {
        field,
        token: token.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_OUTPUT: &str = "\
Compiling model...
polarization=0.312
final_distribution=[12, 8, 10, 10, 10]
median_value=0.5
movements_k1=[1,0,0
0,2,0
0,0,1]
movements_k2=[0,1,0
1,0,0
0,0,0]
movements_k3=[0,0,0
0,0,0
0,0,2]
----------
==========
";

    #[test]
    fn extracts_all_fields() {
        let result = extract_result(FULL_OUTPUT).unwrap();
        assert_eq!(result.polarization, 0.312);
        assert_eq!(result.final_distribution, Some(vec![12, 8, 10, 10, 10]));
        assert_eq!(result.median_value, Some(0.5));
        assert_eq!(
            result.movements_for(ResistanceTier::Low),
            Some(&vec![vec![1, 0, 0], vec![0, 2, 0], vec![0, 0, 1]])
        );
        assert_eq!(
            result.movements_for(ResistanceTier::High),
            Some(&vec![vec![0, 0, 0], vec![0, 0, 0], vec![0, 0, 2]])
        );
    }

    #[test]
    fn polarization_alone_is_enough() {
        let result = extract_result("polarization=1.25\n----------\n").unwrap();
        assert_eq!(result.polarization, 1.25);
        assert_eq!(result.final_distribution, None);
        assert_eq!(result.median_value, None);
        assert!(result.movements.iter().all(Option::is_none));
    }

    #[test]
    fn missing_polarization_fails() {
        let output = "final_distribution=[1, 2]\nmedian_value=0.5\n";
        let err = extract_result(output).unwrap_err();
        assert!(matches!(err, ExtractError::MissingPolarization));
    }

    #[test]
    fn parses_negative_and_scientific_notation() {
        let result = extract_result("polarization=-3.25e-2\n").unwrap();
        assert_eq!(result.polarization, -0.0325);

        let result = extract_result("polarization=1E3\n").unwrap();
        assert_eq!(result.polarization, 1000.0);
    }

    #[test]
    fn first_polarization_wins() {
        let result = extract_result("polarization=0.5\npolarization=0.9\n").unwrap();
        assert_eq!(result.polarization, 0.5);
    }

    #[test]
    fn absent_tier_stays_absent() {
        let output = "polarization=0.1\nmovements_k1=[1,2\n3,4]\nmovements_k3=[0,0\n0,0]\n";
        let result = extract_result(output).unwrap();
        assert!(result.movements_for(ResistanceTier::Low).is_some());
        assert!(result.movements_for(ResistanceTier::Medium).is_none());
        assert!(result.movements_for(ResistanceTier::High).is_some());
    }

    #[test]
    fn matrix_rows_skip_blanks_and_empty_tokens() {
        let output = "polarization=0.1\nmovements_k1=[1,2,\n\n ,3,4\n]\n";
        let result = extract_result(output).unwrap();
        assert_eq!(
            result.movements_for(ResistanceTier::Low),
            Some(&vec![vec![1, 2], vec![3, 4]])
        );
    }

    #[test]
    fn malformed_distribution_fails() {
        let output = "polarization=0.1\nfinal_distribution=[1, , 2]\n";
        let err = extract_result(output).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::InvalidNumber {
                field: "final_distribution",
                ..
            }
        ));
    }

    #[test]
    fn unparseable_polarization_fails() {
        let err = extract_result("polarization=1.2.3\n").unwrap_err();
        assert!(matches!(
            err,
            ExtractError::InvalidNumber {
                field: "polarization",
                ..
            }
        ));
    }
}
