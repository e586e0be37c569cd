//! MiniZinc data-file emission.
//!
//! Serializes a validated instance into `.dzn` assignments. The field names
//! `n`, `m`, `p`, `v`, `s`, `ct` and `maxMovs` match the model's parameter
//! declarations and must not change.

use std::fs;
use std::io;
use std::path::Path;

use crate::instance::ProblemInstance;

/// Render an instance as MiniZinc data-file text.
///
/// Output is deterministic: scalar assignments, then `p` and `v` array
/// literals in original order (`v` to exactly 3 decimal places), the `s`
/// matrix with `|` row separators, then the two budget scalars in their
/// native float representation.
pub fn emit_data_file(instance: &ProblemInstance) -> String {
    let mut out = String::new();

    out.push_str("% Data file generated automatically\n");
    out.push_str("% Polarization minimization problem\n\n");

    out.push_str(&format!("n = {};\n", instance.n));
    out.push_str(&format!("m = {};\n\n", instance.m));

    let p: Vec<String> = instance.p.iter().map(ToString::to_string).collect();
    out.push_str(&format!("p = [{}];\n\n", p.join(", ")));

    let v: Vec<String> = instance.v.iter().map(|val| format!("{val:.3}")).collect();
    out.push_str(&format!("v = [{}];\n\n", v.join(", ")));

    out.push_str("s = [|\n");
    for (i, split) in instance.s.iter().enumerate() {
        out.push_str(&format!("  {}, {}, {}", split.low, split.medium, split.high));
        if i < instance.s.len() - 1 {
            out.push_str(" |\n");
        } else {
            out.push('\n');
        }
    }
    out.push_str("|];\n\n");

    out.push_str(&format!("ct = {};\n", instance.ct));
    out.push_str(&format!("maxMovs = {};\n", instance.max_movs));

    out
}

/// Render an instance and write it to a file.
pub fn write_data_file(instance: &ProblemInstance, path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    fs::write(path, emit_data_file(instance))?;
    tracing::debug!(path = %path.display(), "Data file written");
    Ok(())
}
