//! Integration tests for command mode (-c/--command flag)

use std::io::Write;
use std::process::Command;

fn run_command(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_gridsheet"))
        // Tests must be deterministic and not depend on a user's default.rhai.
        .arg("--no-default-functions")
        .args(args)
        .env_remove("GRIDSHEET_LOG")
        .output()
        .expect("Failed to execute gridsheet");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

#[test]
fn test_basic_arithmetic() {
    let (stdout, _, code) = run_command(&["-c", "5 + 3"]);
    assert_eq!(stdout.trim(), "8");
    assert_eq!(code, 0);
}

#[test]
fn test_auto_strip_equals() {
    let (stdout1, _, _) = run_command(&["-c", "10 + 5"]);
    let (stdout2, _, _) = run_command(&["-c", "=10 + 5"]);
    assert_eq!(stdout1, stdout2);
}

#[test]
fn test_aggregates_over_literals() {
    let cases = [
        ("SUM([1, 2, [3, 4], (), \"x\", 5])", "15"),
        ("AVERAGE([1, 2, [3, 4], (), \"x\", 5])", "3"),
        ("MAX([1, 2, [3, 4], (), \"x\", 5])", "5"),
        ("MIN([[-3.5], 7])", "-3.50"),
        ("COUNT([1, 2, [3, 4], (), \"x\", 5])", "5"),
        ("SUM([])", "0"),
        ("MAX([\"a\", ()])", "0"),
    ];
    for (formula, expected) in cases {
        let (stdout, stderr, code) = run_command(&["-c", formula]);
        assert_eq!(stdout.trim(), expected, "{formula}: {stderr}");
        assert_eq!(code, 0);
    }
}

#[test]
fn test_aggregates_over_cells() {
    let (stdout, _, code) = run_command(&[
        "-s",
        "A1=10",
        "-s",
        "A2=20",
        "-s",
        "A3=hello",
        "-s",
        "B1==SUM(A1:A3)",
        "-c",
        "AVERAGE(A1:A3) + B1",
    ]);
    assert_eq!(stdout.trim(), "45");
    assert_eq!(code, 0);
}

#[test]
fn test_range_output_one_row_per_line() {
    let (stdout, _, code) = run_command(&["-s", "A1=1", "-s", "B2=4", "-c", "A1:B2"]);
    assert_eq!(stdout.trim(), "[1, ]\n[, 4]");
    assert_eq!(code, 0);
}

#[test]
fn test_notation_builtins() {
    let (stdout, _, code) = run_command(&["-c", "FORMAT_RANGE(4, 27, 0, 0)"]);
    assert_eq!(stdout.trim(), "A1:AB5");
    assert_eq!(code, 0);

    let (stdout, _, code) = run_command(&["-c", "COLUMN_LABEL(701)"]);
    assert_eq!(stdout.trim(), "ZZ");
    assert_eq!(code, 0);
}

#[test]
fn test_headers() {
    let (stdout, _, code) = run_command(&["--headers", "28"]);
    assert!(stdout.trim().ends_with("Y Z AA AB"));
    assert_eq!(code, 0);
}

#[test]
fn test_sheet_dump_without_command() {
    let (stdout, _, code) = run_command(&["-s", "B1==A1 + 1", "-s", "A1=41"]);
    assert_eq!(stdout.trim(), "A1\t41\nB1\t42");
    assert_eq!(code, 0);
}

#[test]
fn test_sample_data_is_summable() {
    let (stdout, _, code) = run_command(&["--sample", "-c", "COUNT(A1:E5)"]);
    assert_eq!(stdout.trim(), "25");
    assert_eq!(code, 0);
}

#[test]
fn test_error_exit_code() {
    let (stdout, _, code) = run_command(&["-c", "undefined_function()"]);
    assert!(stdout.starts_with("#ERR"));
    assert_eq!(code, 1);
}

#[test]
fn test_division_by_zero() {
    let (stdout, _, code) = run_command(&["-c", "1/0"]);
    assert!(stdout.starts_with("#ERR"));
    assert_eq!(code, 1);
}

#[test]
fn test_circular_assignment_fails() {
    let (_, stderr, code) = run_command(&["-s", "A1==B1", "-s", "B1==A1"]);
    assert!(stderr.contains("Circular dependency"));
    assert_eq!(code, 1);
}

#[test]
fn test_bad_address_fails() {
    let (_, stderr, code) = run_command(&["-s", "A01=3"]);
    assert!(stderr.contains("Invalid address"));
    assert_eq!(code, 1);
}

#[test]
fn test_bad_arguments_exit_code() {
    let (_, stderr, code) = run_command(&["--frobnicate"]);
    assert!(stderr.contains("Unknown option"));
    assert_eq!(code, 2);
}

#[test]
fn test_boolean_output() {
    let (stdout, _, code) = run_command(&["-c", "COUNT([1]) == 1.0"]);
    assert_eq!(stdout.trim(), "TRUE");
    assert_eq!(code, 0);
}

#[test]
fn test_custom_functions() {
    let mut file = tempfile::Builder::new().suffix(".rhai").tempfile().unwrap();
    writeln!(file, "fn double(x) {{ x * 2 }}").unwrap();
    let path = file.path().to_str().unwrap();

    let (stdout, _, code) = run_command(&["-c", "double(SUM([20, 1]))", "-f", path]);
    assert_eq!(stdout.trim(), "42");
    assert_eq!(code, 0);
}

#[test]
fn test_broken_functions_file_fails() {
    let mut file = tempfile::Builder::new().suffix(".rhai").tempfile().unwrap();
    writeln!(file, "fn broken(x) {{ x + }}").unwrap();
    let path = file.path().to_str().unwrap();

    let (_, stderr, code) = run_command(&["-f", path, "-c", "1"]);
    assert!(stderr.contains("compile"));
    assert_eq!(code, 1);
}
