use std::net::TcpListener;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn gitcopy() -> Command {
    let mut cmd = Command::cargo_bin("gitcopy").expect("gitcopy binary");
    cmd.env_clear();
    cmd
}

/// A localhost URL nothing listens on.
fn closed_api_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

#[test]
fn help_lists_environment_variables() {
    gitcopy()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("INPUT_OWNER"))
        .stdout(predicate::str::contains("INPUT_DESTINATION_DIRECTORY"));
}

#[test]
fn missing_owner_fails_before_any_request() {
    gitcopy()
        .env("INPUT_REPO", "docs")
        .env("GITHUB_TOKEN", "t")
        .env("INPUT_FILE_PATH", "README.md")
        .env("INPUT_DESTINATION_FILE_PATH", "README.md")
        .env("GITHUB_API_URL", closed_api_url())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"))
        .stderr(predicate::str::contains("missing input 'owner'"));
}

#[test]
fn blank_boolean_inputs_read_as_false() {
    gitcopy()
        .env("INPUT_DRY_RUN", "")
        .env("INPUT_JSON_REPORT", "")
        .env("INPUT_REPO", "docs")
        .env("GITHUB_TOKEN", "t")
        .env("INPUT_FILE_PATH", "README.md")
        .env("INPUT_DESTINATION_FILE_PATH", "README.md")
        .env("GITHUB_API_URL", closed_api_url())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing input 'owner'"));
}

#[test]
fn unpaired_directory_is_rejected() {
    gitcopy()
        .args(["--owner", "acme", "--repo", "docs", "--token", "t"])
        .args(["--directory", "site"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("destination_directory"));
}

#[test]
fn nothing_to_sync_is_a_configuration_error() {
    gitcopy()
        .args(["--owner", "acme", "--repo", "docs"])
        .env("INPUT_TOKEN", "fallback")
        .assert()
        .failure()
        .stderr(predicate::str::contains("file or directory is required"));
}

#[test]
fn invalid_api_url_is_reported() {
    gitcopy()
        .args(["--owner", "acme", "--repo", "docs", "--token", "t"])
        .args(["--file-path", "a.txt", "--destination-file-path", "a.txt"])
        .args(["--api-url", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid API URL"));
}

#[test]
fn unreachable_host_names_the_failing_operation() {
    let tmp = TempDir::new().expect("tempdir");
    std::fs::write(tmp.path().join("a.txt"), "hello").expect("write");

    gitcopy()
        .current_dir(tmp.path())
        .env("INPUT_OWNER", "acme")
        .env("INPUT_REPO", "docs")
        .env("GITHUB_TOKEN", "t")
        .env("GITHUB_API_URL", closed_api_url())
        .env("INPUT_REF_BRANCH", "main")
        .env("INPUT_FILE_PATH", "a.txt")
        .env("INPUT_DESTINATION_FILE_PATH", "out/a.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("sync to acme/docs failed"))
        .stderr(predicate::str::contains("get branch 'main' failed"));
}
