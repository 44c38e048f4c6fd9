//! Integration tests for the launcher binary's argument handling.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn stray_token_fails_before_any_work() {
    let mut cmd = Command::new(cargo_bin("inkcast"));
    cmd.arg("stray");
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unknown option: stray"));
}

#[test]
fn stray_token_after_value_names_itself() {
    let mut cmd = Command::new(cargo_bin("inkcast"));
    cmd.args(["--ebook", "a.epub", "oops"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown option: oops"));
}
