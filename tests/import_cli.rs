//! End-to-end runs of the `import_scores` binary against the in-memory store.

use std::fs;
use std::process::{Command, Output};

const INPUT: &str = "First name,Second name,Score
Mark,Jobs,38
Sarah,Pieterson,86
Themba,Mahlala,86
";

fn run_importer(args: &[&std::ffi::OsStr]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_import_scores"))
        .args(args)
        .env("STORE_BACKEND", "memory")
        .env("RUST_LOG", "error")
        .output()
        .expect("failed to run import_scores")
}

#[test]
fn test_prints_top_scorers_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.csv");
    fs::write(&input, INPUT).unwrap();

    let output = run_importer(&[input.as_os_str()]);

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Sarah Pieterson Themba Mahlala\nScore: 86\n"
    );
}

#[test]
fn test_writes_report_to_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.csv");
    let report = dir.path().join("output.txt");
    fs::write(&input, INPUT).unwrap();

    let output = run_importer(&[input.as_os_str(), report.as_os_str()]);

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(
        fs::read_to_string(&report).unwrap(),
        "Sarah Pieterson Themba Mahlala\nScore: 86"
    );
}

#[test]
fn test_fails_without_input_argument() {
    let output = run_importer(&[]);
    assert!(!output.status.success());
}

#[test]
fn test_fails_on_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.csv");

    let output = run_importer(&[missing.as_os_str()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid Arguments"));
}
