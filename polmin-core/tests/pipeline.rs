//! End-to-end tests for the conversion pipeline:
//! Instance text → MiniZinc data file → solver output → report file
//!
//! Solver output is simulated with realistic MiniZinc stdout so the whole
//! chain runs without an installed solver.

use polmin_core::{
    emit_data_file, extract_result, parse_instance, read_report, render_report, write_data_file,
    write_report, ProblemInstance, ResistanceTier,
};

// ============================================================================
// Fixtures
// ============================================================================

/// 50 people, 5 opinions, uniform distribution, matching resistance rows.
const SCENARIO: &str = "\
50
5
10,10,10,10,10
0.0,0.25,0.5,0.75,1.0
3,4,3
3,4,3
3,4,3
3,4,3
3,4,3
100
50
";

/// Simulated solver stdout: tier 2 is deliberately absent.
const SOLVER_STDOUT: &str = "\
polarization=0.42
final_distribution=[8, 12, 10, 9, 11]
median_value=0.5
movements_k1=[0,2,0,0,0
0,0,0,0,0
0,0,0,1,0
0,0,0,0,0
0,0,0,0,0]
movements_k3=[0,0,0,0,0
0,0,0,0,0
0,0,0,0,0
0,0,0,0,1
0,0,0,0,0]
----------
==========
";

// ============================================================================
// Instance → Data File
// ============================================================================

#[test]
fn test_instance_converts_to_data_file() {
    let instance = parse_instance(SCENARIO).unwrap();
    assert_eq!(instance.n, 50);
    assert_eq!(instance.m, 5);

    let data = emit_data_file(&instance);
    assert!(data.contains("n = 50;"));
    assert!(data.contains("m = 5;"));
    assert!(data.contains("p = [10, 10, 10, 10, 10];"));
    assert!(data.contains("v = [0.000, 0.250, 0.500, 0.750, 1.000];"));
    assert!(data.contains("  3, 4, 3 |"));
    assert!(data.contains("ct = 100;"));
    assert!(data.contains("maxMovs = 50;"));
}

// ============================================================================
// Solver Output → Report
// ============================================================================

#[test]
fn test_solver_output_renders_full_report() {
    let instance = parse_instance(SCENARIO).unwrap();
    let result = extract_result(SOLVER_STDOUT).unwrap();

    assert_eq!(result.polarization, 0.42);
    assert_eq!(result.final_distribution, Some(vec![8, 12, 10, 9, 11]));
    assert!(result.movements_for(ResistanceTier::Low).is_some());
    assert!(result.movements_for(ResistanceTier::Medium).is_none());

    let report = render_report(&result, instance.m);
    let expected = "\
0.420
1
0,2,0,0,0
0,0,0,0,0
0,0,0,1,0
0,0,0,0,0
0,0,0,0,0
2
0,0,0,0,0
0,0,0,0,0
0,0,0,0,0
0,0,0,0,0
0,0,0,0,0
3
0,0,0,0,0
0,0,0,0,0
0,0,0,0,0
0,0,0,0,1
0,0,0,0,0
";
    assert_eq!(report, expected);
}

// ============================================================================
// Full Pipeline Through Disk
// ============================================================================

#[test]
fn test_complete_pipeline() {
    let dir = tempfile::tempdir().unwrap();

    // Step 1: Instance file on disk
    let instance_path = dir.path().join("Prueba50.txt");
    std::fs::write(&instance_path, SCENARIO).unwrap();
    let instance = ProblemInstance::from_path(&instance_path).unwrap();

    // Step 2: Data file for the solver
    let data_path = dir.path().join("Prueba50.dzn");
    write_data_file(&instance, &data_path).unwrap();
    let data = std::fs::read_to_string(&data_path).unwrap();
    assert!(data.contains("maxMovs = 50;"));

    // Step 3: Extract from (simulated) solver stdout and write the report
    let result = extract_result(SOLVER_STDOUT).unwrap();
    let report_path = dir.path().join("Prueba50.out.txt");
    write_report(&report_path, &result, instance.m).unwrap();

    // Step 4: The report reads back with the structure intact
    let report = read_report(&report_path).unwrap();
    assert_eq!(report.polarization, 0.42);
    assert_eq!(report.movements.len(), 3);
    assert_eq!(report.movements[&1].len(), instance.m);
    assert_eq!(report.movements[&1][0], vec![0, 2, 0, 0, 0]);
    assert!(report.movements[&2]
        .iter()
        .all(|row| row.iter().all(|&v| v == 0)));
    assert_eq!(report.movements[&3][3], vec![0, 0, 0, 0, 1]);
}
