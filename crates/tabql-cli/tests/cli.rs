//! Exercises the built `tabql` binary end to end.
//!
//! The binary only ships [`tabql_cli_lib::UnimplementedCollaborators`]
//! for the parser/operators, so every
//! script fails to parse; these tests cover the CLI plumbing around
//! that boundary, not query execution.

use assert_cmd::Command;

#[test]
fn missing_source_file_exits_nonzero_with_a_clean_message() {
    let mut cmd = Command::cargo_bin("tabql").unwrap();
    let output = cmd.arg("/no/such/file.tabql").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no such file or directory"), "stderr was: {stderr}");
}

#[test]
fn a_real_script_file_reaches_the_unimplemented_parser() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.tabql");
    std::fs::write(&script, "SELECT 1;").unwrap();

    let mut cmd = Command::cargo_bin("tabql").unwrap();
    let output = cmd.arg(&script).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no parser is linked into this build"), "stderr was: {stderr}");
}
