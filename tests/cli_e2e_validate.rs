//! End-to-end tests for the `validate` command.
//!
//! These tests invoke the actual CLI binary against temporary config
//! directories.

mod common;

use common::prelude::*;

/// Test that validate --help shows help information
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_validate_help() {
    let mut cmd = cargo_bin_cmd!("git-promotion");

    cmd.arg("validate")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Validate the promotion config of a service",
        ));
}

/// Test that a valid layered config passes and is printed resolved
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_validate_valid_config() {
    let fixture = TestFixture::new().with_project_config(configs::FLAT_PR);
    let mut cmd = cargo_bin_cmd!("git-promotion");

    cmd.arg("validate")
        .arg("--config-dir")
        .arg(fixture.path())
        .args(["--project", "shop", "--stage", "dev", "--service", "cart"])
        .args(["--stages", "dev,staging,production"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://github.com/acme/shop-config"))
        .stdout(predicate::str::contains("target: staging"))
        .stdout(predicate::str::contains("configuration is valid"));
}

/// Test that every violation is printed and the command fails
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_validate_invalid_config() {
    let fixture = TestFixture::new().with_project_config(configs::INVALID);
    let mut cmd = cargo_bin_cmd!("git-promotion");

    cmd.arg("validate")
        .arg("--quiet")
        .arg("--config-dir")
        .arg(fixture.path())
        .args(["--project", "shop", "--stage", "dev", "--service", "cart"])
        .args(["--next-stage", "staging"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#"error: "target.secret" missing"#))
        .stdout(predicate::str::contains(
            r#"error: "target.provider" gitlab not supported"#,
        ))
        .stdout(predicate::str::contains(
            r#"error: no "paths" supported for branch strategy"#,
        ))
        .stderr(predicate::str::contains("4 validation errors"));
}

/// Test that an empty config directory yields the missing-field violations
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_validate_without_fragments() {
    let fixture = TestFixture::new();
    let mut cmd = cargo_bin_cmd!("git-promotion");

    cmd.arg("validate")
        .arg("--quiet")
        .arg("--config-dir")
        .arg(fixture.path())
        .args(["--project", "shop", "--stage", "dev", "--service", "cart"])
        .args(["--next-stage", "staging"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#"error: "spec.strategy" missing"#));
}

/// Test that a next stage must be known
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_validate_requires_next_stage() {
    let fixture = TestFixture::new().with_project_config(configs::BRANCH);
    let mut cmd = cargo_bin_cmd!("git-promotion");

    cmd.env_remove("GIT_PROMOTION_STAGES")
        .arg("validate")
        .arg("--config-dir")
        .arg(fixture.path())
        .args(["--project", "shop", "--stage", "dev", "--service", "cart"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--stages or --next-stage"));
}
