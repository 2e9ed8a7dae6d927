// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the `provenance_verifier` binary.

#![allow(deprecated)] // Command::cargo_bin

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn provenance_verifier() -> Command {
    Command::cargo_bin("provenance_verifier").expect("provenance_verifier binary not found")
}

fn testdata(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(name)
        .display()
        .to_string()
}

#[test]
fn verify_succeeds_with_matching_reference_values() {
    provenance_verifier()
        .args(["verify", "--provenance"])
        .arg(testdata("generic_slsa_v02.json"))
        .arg("--reference-values")
        .arg(testdata("reference_values.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Verification succeeded"));
}

#[test]
fn verify_accepts_file_uris() {
    provenance_verifier()
        .arg("verify")
        .arg("--provenance")
        .arg(format!("file://{}", testdata("generic_slsa_v02.json")))
        .arg("--reference-values")
        .arg(testdata("reference_values.json"))
        .assert()
        .success();
}

#[test]
fn verify_prints_every_justification_on_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let reference = dir.path().join("reference.json");
    std::fs::write(
        &reference,
        r#"{"repo_uri": "github.com/project-oak/transparent-release", "want_build_cmds": true}"#,
    )
    .unwrap();

    provenance_verifier()
        .args(["verify", "--provenance"])
        .arg(testdata("generic_slsa_v02.json"))
        .arg("--reference-values")
        .arg(&reference)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Verification failed"))
        .stdout(predicate::str::contains("does not contain repo URI"))
        .stdout(predicate::str::contains("no build cmd found"));
}

#[test]
fn verify_checks_batch_consistency() {
    provenance_verifier()
        .args(["verify", "--provenance"])
        .arg(testdata("container_based_v02.json"))
        .arg("--provenance")
        .arg(testdata("generic_slsa_v02.json"))
        .arg("--reference-values")
        .arg(testdata("reference_values.json"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("provenance #1 has binary digest"));
}

#[test]
fn rust_log_overrides_default_verbosity() {
    provenance_verifier()
        .env("RUST_LOG", "provenance_verifier=debug")
        .args(["verify", "--provenance"])
        .arg(testdata("generic_slsa_v02.json"))
        .arg("--reference-values")
        .arg(testdata("reference_values.json"))
        .assert()
        .success()
        .stderr(predicate::str::contains("reading provenance file"));
}

#[test]
fn verify_without_rust_log_is_quiet() {
    provenance_verifier()
        .env_remove("RUST_LOG")
        .args(["verify", "--provenance"])
        .arg(testdata("generic_slsa_v02.json"))
        .arg("--reference-values")
        .arg(testdata("reference_values.json"))
        .assert()
        .success()
        .stderr(predicate::str::contains("reading provenance file").not());
}

#[test]
fn verify_reports_errors_with_context() {
    provenance_verifier()
        .args(["verify", "--provenance", "/nonexistent/provenance.json"])
        .arg("--reference-values")
        .arg(testdata("reference_values.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to fetch provenance"));
}

#[test]
fn verify_rejects_malformed_reference_values() {
    let dir = tempfile::tempdir().unwrap();
    let reference = dir.path().join("reference.json");
    std::fs::write(&reference, "{").unwrap();

    provenance_verifier()
        .args(["verify", "--provenance"])
        .arg(testdata("generic_slsa_v02.json"))
        .arg("--reference-values")
        .arg(&reference)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load reference values"));
}

#[test]
fn reproduce_rejects_provenance_without_build_config() {
    provenance_verifier()
        .args(["reproduce", "--provenance"])
        .arg(testdata("generic_slsa_v02.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to reproduce the build"));
}
