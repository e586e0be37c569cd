//! Problem instance parsing and validation.
//!
//! An instance file is plain UTF-8 text, one field per line, blank lines
//! ignored, no comment syntax:
//!
//! ```text
//! n                    total population
//! m                    number of opinions
//! p1,p2,...,pm         people per opinion
//! v1,v2,...,vm         opinion values in [0,1]
//! low,medium,high      resistance split, one line per opinion
//! ct                   cost budget
//! maxMovs              movement budget
//! ```
//!
//! Validation is fail-fast: the first violated invariant aborts the parse.
//! Lines beyond the last expected field are ignored.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{InstanceError, ParseError};

/// Resistance tier of a population subgroup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResistanceTier {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl ResistanceTier {
    /// All tiers, in the order they appear in data files and reports.
    pub const ALL: [ResistanceTier; 3] = [Self::Low, Self::Medium, Self::High];

    /// Numeric level used on the wire (1 = low, 2 = medium, 3 = high).
    pub fn level(self) -> u32 {
        self as u32
    }

    /// Human-readable tier name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Per-opinion breakdown of the population by resistance tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResistanceSplit {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

impl ResistanceSplit {
    /// Total population covered by this split, or `None` when the sum
    /// overflows `u64`.
    pub fn total(&self) -> Option<u64> {
        self.low
            .checked_add(self.medium)
            .and_then(|sum| sum.checked_add(self.high))
    }
}

/// A validated polarization problem instance.
///
/// Immutable once parsed. All cross-field invariants hold: `p`, `v` and `s`
/// have exactly `m` entries, `sum(p) == n`, and `sum(s[i]) == p[i]` for
/// every opinion `i`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemInstance {
    /// Total population.
    pub n: u64,
    /// Number of distinct opinions.
    pub m: usize,
    /// People per opinion.
    pub p: Vec<u64>,
    /// Opinion values in [0, 1].
    pub v: Vec<f64>,
    /// Resistance split per opinion.
    pub s: Vec<ResistanceSplit>,
    /// Maximum total cost budget.
    pub ct: f64,
    /// Maximum number of allowed movements.
    pub max_movs: f64,
}

impl ProblemInstance {
    /// Load and validate an instance from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InstanceError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InstanceError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)?;
        let instance = parse_instance(&text)?;
        tracing::debug!(
            path = %path.display(),
            n = instance.n,
            m = instance.m,
            "Instance loaded"
        );
        Ok(instance)
    }
}

/// Parse and validate instance text.
pub fn parse_instance(text: &str) -> Result<ProblemInstance, ParseError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < 7 {
        return Err(ParseError::TooFewLines {
            expected: 7,
            found: lines.len(),
        });
    }

    let n = parse_count("n", lines[0])?;
    let m = parse_count("m", lines[1])? as usize;

    let p: Vec<u64> = lines[2]
        .split(',')
        .map(|tok| parse_u64("p", tok))
        .collect::<Result<_, _>>()?;
    if p.len() != m {
        return Err(ParseError::LengthMismatch {
            field: "p",
            expected: m,
            found: p.len(),
        });
    }
    let p_sum = p
        .iter()
        .try_fold(0u64, |acc, &count| acc.checked_add(count))
        .ok_or_else(|| ParseError::InvalidValue {
            field: "p".into(),
            reason: "sum of entries overflows a 64-bit integer".into(),
        })?;
    if p_sum != n {
        return Err(ParseError::SumMismatch {
            field: "p".into(),
            expected: n,
            actual: p_sum,
        });
    }

    let v: Vec<f64> = lines[3]
        .split(',')
        .map(|tok| parse_f64("v", tok))
        .collect::<Result<_, _>>()?;
    if v.len() != m {
        return Err(ParseError::LengthMismatch {
            field: "v",
            expected: m,
            found: v.len(),
        });
    }
    for (index, &value) in v.iter().enumerate() {
        if !(0.0..=1.0).contains(&value) {
            return Err(ParseError::RangeViolation { index, value });
        }
    }

    // One resistance line per opinion plus the two budget lines.
    if lines.len() < 6 + m {
        return Err(ParseError::TooFewLines {
            expected: 6 + m,
            found: lines.len(),
        });
    }

    let mut s = Vec::with_capacity(m);
    for index in 0..m {
        let fields: Vec<&str> = lines[4 + index].split(',').collect();
        if fields.len() != 3 {
            return Err(ParseError::FieldCountMismatch {
                index,
                found: fields.len(),
            });
        }
        let field = format!("s[{index}]");
        let split = ResistanceSplit {
            low: parse_u64(&field, fields[0])?,
            medium: parse_u64(&field, fields[1])?,
            high: parse_u64(&field, fields[2])?,
        };
        let total = split.total().ok_or_else(|| ParseError::InvalidValue {
            field: field.clone(),
            reason: "sum of fields overflows a 64-bit integer".into(),
        })?;
        if total != p[index] {
            return Err(ParseError::SumMismatch {
                field,
                expected: p[index],
                actual: total,
            });
        }
        s.push(split);
    }

    let ct = parse_f64("ct", lines[4 + m])?;
    if ct < 0.0 {
        return Err(ParseError::InvalidValue {
            field: "ct".into(),
            reason: "must be non-negative".into(),
        });
    }

    let max_movs = parse_f64("maxMovs", lines[5 + m])?;
    if max_movs < 0.0 {
        return Err(ParseError::InvalidValue {
            field: "maxMovs".into(),
            reason: "must be non-negative".into(),
        });
    }

    Ok(ProblemInstance {
        n,
        m,
        p,
        v,
        s,
        ct,
        max_movs,
    })
}

fn parse_count(field: &'static str, line: &str) -> Result<u64, ParseError> {
    let value: i64 = line.parse().map_err(|_| ParseError::InvalidCount {
        field,
        value: line.to_string(),
    })?;
    if value <= 0 {
        return Err(ParseError::InvalidCount {
            field,
            value: line.to_string(),
        });
    }
    Ok(value as u64)
}

fn parse_u64(field: &str, token: &str) -> Result<u64, ParseError> {
    token.trim().parse().map_err(|_| ParseError::InvalidValue {
        field: field.to_string(),
        reason: format!("{:?} is not a non-negative integer", token.trim()),
    })
}

fn parse_f64(field: &str, token: &str) -> Result<f64, ParseError> {
    token.trim().parse().map_err(|_| ParseError::InvalidValue {
        field: field.to_string(),
        reason: format!("{:?} is not a number", token.trim()),
    })
}
