//! Result report rendering and parsing.
//!
//! A report file carries the objective value on the first line, followed by
//! three movement blocks. Each block starts with a tier marker line (`1`,
//! `2` or `3`) and continues with comma-separated rows, one per source
//! opinion. Missing or misshapen solver matrices are written as zero blocks
//! so the file always has the same structure regardless of solver verbosity.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::ReportError;
use crate::extract::{MovementMatrix, OptimizationResult};

/// Magnitudes below this threshold lose their sign when rendered, so a tiny
/// negative objective cannot print as `-0.000`.
const SIGN_CLAMP: f64 = 1e-4;

/// Parsed contents of a report file.
///
/// Movement blocks are keyed by the marker value read from the file, so a
/// report with unusual markers parses without loss.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportFile {
    pub polarization: f64,
    pub movements: BTreeMap<u32, MovementMatrix>,
}

/// Render a report for an instance with `m` opinions.
///
/// Every tier block is emitted with exactly `m` rows of `m` entries. A
/// matrix whose row count disagrees with `m` is replaced by zeros; rows of
/// the wrong width are padded with zeros or truncated.
pub fn render_report(result: &OptimizationResult, m: usize) -> String {
    let mut out = String::new();

    let mut polarization = result.polarization;
    if polarization.abs() < SIGN_CLAMP {
        polarization = polarization.abs();
    }
    out.push_str(&format!("{polarization:.3}\n"));

    let zero_row = vec!["0"; m].join(",");
    for tier in 1..=3usize {
        out.push_str(&format!("{tier}\n"));
        match &result.movements[tier - 1] {
            Some(matrix) if matrix.len() == m => {
                for row in matrix {
                    let cells: Vec<String> = row
                        .iter()
                        .copied()
                        .chain(std::iter::repeat(0))
                        .take(m)
                        .map(|v| v.to_string())
                        .collect();
                    out.push_str(&cells.join(","));
                    out.push('\n');
                }
            }
            _ => {
                for _ in 0..m {
                    out.push_str(&zero_row);
                    out.push('\n');
                }
            }
        }
    }

    out
}

/// Render a report and write it to `path`.
pub fn write_report(
    path: impl AsRef<Path>,
    result: &OptimizationResult,
    m: usize,
) -> std::io::Result<()> {
    let path = path.as_ref();
    fs::write(path, render_report(result, m))?;
    tracing::debug!(path = %path.display(), "Wrote report file");
    Ok(())
}

/// Read and parse a report file.
pub fn read_report(path: impl AsRef<Path>) -> Result<ReportFile, ReportError> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_report(&text)
}

/// Parse report text.
///
/// Blank lines are ignored throughout. The first line is the objective
/// (a decimal comma is accepted), then up to three movement blocks follow.
/// Rows are read until the next tier marker appears; the line directly
/// after a marker is always a row, so single-column matrices whose cells
/// happen to be `1`, `2` or `3` still parse. An unreadable row ends its
/// block and must be followed by a valid marker unless all three blocks
/// have already been read.
pub fn parse_report(text: &str) -> Result<ReportFile, ReportError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        return Err(ReportError::Empty);
    }

    let polarization: f64 = lines[0]
        .replace(',', ".")
        .parse()
        .map_err(|_| ReportError::InvalidPolarization {
            token: lines[0].to_string(),
        })?;

    let mut movements = BTreeMap::new();
    let mut idx = 1;
    for _ in 0..3 {
        if idx >= lines.len() {
            break;
        }
        let marker: u32 = lines[idx]
            .parse()
            .map_err(|_| ReportError::InvalidTierMarker {
                line: lines[idx].to_string(),
            })?;
        idx += 1;

        let start_idx = idx;
        let mut rows = MovementMatrix::new();
        while idx < lines.len() {
            let line = lines[idx];
            if matches!(line, "1" | "2" | "3") && idx > start_idx {
                break;
            }
            match parse_report_row(line) {
                Some(row) => {
                    rows.push(row);
                    idx += 1;
                }
                None => break,
            }
        }
        movements.insert(marker, rows);
    }

    Ok(ReportFile {
        polarization,
        movements,
    })
}

fn parse_report_row(line: &str) -> Option<Vec<u64>> {
    line.split(',').map(|tok| tok.trim().parse().ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(
        polarization: f64,
        movements: [Option<MovementMatrix>; 3],
    ) -> OptimizationResult {
        OptimizationResult {
            polarization,
            final_distribution: None,
            median_value: None,
            movements,
        }
    }

    #[test]
    fn renders_zero_blocks_when_no_matrices() {
        let result = result_with(0.5, [None, None, None]);
        let report = render_report(&result, 2);
        assert_eq!(report, "0.500\n1\n0,0\n0,0\n2\n0,0\n0,0\n3\n0,0\n0,0\n");
    }

    #[test]
    fn clamps_sign_of_tiny_negative_objective() {
        let result = result_with(-0.00003, [None, None, None]);
        let report = render_report(&result, 1);
        assert!(report.starts_with("0.000\n"));
    }

    #[test]
    fn keeps_sign_above_the_clamp() {
        let result = result_with(-0.25, [None, None, None]);
        let report = render_report(&result, 1);
        assert!(report.starts_with("-0.250\n"));
    }

    #[test]
    fn pads_and_truncates_rows_to_width() {
        let matrix = vec![vec![1], vec![2, 2, 2, 2], vec![3, 3, 3]];
        let result = result_with(0.1, [Some(matrix), None, None]);
        let report = render_report(&result, 3);
        assert!(report.contains("1\n1,0,0\n2,2,2\n3,3,3\n2\n"));
    }

    #[test]
    fn wrong_row_count_falls_back_to_zeros() {
        let matrix = vec![vec![1, 1], vec![1, 1], vec![1, 1]];
        let result = result_with(0.1, [None, Some(matrix), None]);
        let report = render_report(&result, 2);
        assert_eq!(report, "0.100\n1\n0,0\n0,0\n2\n0,0\n0,0\n3\n0,0\n0,0\n");
    }

    #[test]
    fn parses_full_report() {
        let text = "0.312\n1\n1,0\n0,2\n2\n0,0\n0,0\n3\n0,1\n1,0\n";
        let report = parse_report(text).unwrap();
        assert_eq!(report.polarization, 0.312);
        assert_eq!(report.movements.len(), 3);
        assert_eq!(report.movements[&1], vec![vec![1, 0], vec![0, 2]]);
        assert_eq!(report.movements[&3], vec![vec![0, 1], vec![1, 0]]);
    }

    #[test]
    fn accepts_decimal_comma_objective() {
        let report = parse_report("0,312\n").unwrap();
        assert_eq!(report.polarization, 0.312);
        assert!(report.movements.is_empty());
    }

    #[test]
    fn empty_report_fails() {
        assert!(matches!(parse_report(""), Err(ReportError::Empty)));
        assert!(matches!(parse_report("\n  \n"), Err(ReportError::Empty)));
    }

    #[test]
    fn unreadable_objective_fails() {
        let err = parse_report("abc\n1\n0\n").unwrap_err();
        assert!(matches!(err, ReportError::InvalidPolarization { .. }));
    }

    #[test]
    fn line_after_marker_is_always_a_row() {
        let text = "0.1\n1\n3\n2\n4\n3\n5\n";
        let report = parse_report(text).unwrap();
        assert_eq!(report.movements[&1], vec![vec![3]]);
        assert_eq!(report.movements[&2], vec![vec![4]]);
        assert_eq!(report.movements[&3], vec![vec![5]]);
    }

    #[test]
    fn unreadable_row_before_last_block_fails() {
        let err = parse_report("0.5\n1\n1,2\nxyz\n").unwrap_err();
        assert!(matches!(err, ReportError::InvalidTierMarker { .. }));
    }

    #[test]
    fn negative_entries_are_rejected() {
        let err = parse_report("0.5\n1\n-1,2\n").unwrap_err();
        assert!(matches!(err, ReportError::InvalidTierMarker { .. }));
    }

    #[test]
    fn trailing_text_after_third_block_is_ignored() {
        let text = "0.5\n1\n0,0\n2\n0,0\n3\n0,0\nsolver notes\n";
        let report = parse_report(text).unwrap();
        assert_eq!(report.movements[&3], vec![vec![0, 0]]);
    }

    #[test]
    fn fewer_than_three_blocks_is_tolerated() {
        let report = parse_report("0.5\n1\n0,0\n0,0\n").unwrap();
        assert_eq!(report.movements.len(), 1);
        assert_eq!(report.movements[&1], vec![vec![0, 0], vec![0, 0]]);
    }

    #[test]
    fn blocks_are_keyed_by_marker_value() {
        let report = parse_report("0.5\n7\n4,4\n").unwrap();
        assert_eq!(report.movements[&7], vec![vec![4, 4]]);
    }

    #[test]
    fn written_report_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.out.txt");
        let matrix = vec![vec![1, 0], vec![0, 1]];
        let result = result_with(0.25, [Some(matrix.clone()), None, None]);

        write_report(&path, &result, 2).unwrap();
        let report = read_report(&path).unwrap();
        assert_eq!(report.polarization, 0.25);
        assert_eq!(report.movements[&1], matrix);
        assert_eq!(report.movements[&2], vec![vec![0, 0], vec![0, 0]]);
    }
}
