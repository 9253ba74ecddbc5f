//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Binary with config isolated in a temporary home
fn bin(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("interview-capture").expect("binary");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("INTERVIEW_BACKEND_URL")
        .env_remove("INTERVIEW_ACCESS_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn home() -> TempDir {
    TempDir::new().expect("temp dir")
}

#[test]
fn help_output() {
    let home = home();
    bin(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn run_help_lists_options() {
    let home = home();
    bin(&home)
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--job"))
        .stdout(predicate::str::contains("--candidature"))
        .stdout(predicate::str::contains("--max-duration"))
        .stdout(predicate::str::contains("--allow-skip"))
        .stdout(predicate::str::contains("--notify"));
}

#[test]
fn version_output() {
    let home = home();
    bin(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("interview-capture"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_path_command() {
    let home = home();
    bin(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("interview-capture"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_set_then_get() {
    let home = home();
    bin(&home)
        .args(["config", "set", "max_duration", "90s"])
        .assert()
        .success();

    bin(&home)
        .args(["config", "get", "max_duration"])
        .assert()
        .success()
        .stdout(predicate::str::contains("90s"));
}

#[test]
fn config_list_masks_token() {
    let home = home();
    bin(&home)
        .args(["config", "set", "user.token", "very-secret-token-9876"])
        .assert()
        .success()
        .stderr(predicate::str::contains("9876"))
        .stderr(predicate::str::contains("very-secret").not());

    bin(&home)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("user.token"))
        .stdout(predicate::str::contains("9876"))
        .stdout(predicate::str::contains("very-secret").not());
}

#[test]
fn config_init_twice_fails() {
    let home = home();
    bin(&home).args(["config", "init"]).assert().success();
    bin(&home)
        .args(["config", "init"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[tokio::test]
async fn check_reports_missing_requirements() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/interviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/api/users/u1/curriculo"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tests/psychological/user/u1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"tests": [{"id": 1}]})),
        )
        .mount(&server)
        .await;

    let home = home();
    let uri = server.uri();
    let assert = tokio::task::spawn_blocking(move || {
        bin(&home)
            .args(["config", "set", "user.id", "u1"])
            .assert()
            .success();
        bin(&home)
            .args(["check", "--backend-url", &uri])
            .assert()
    })
    .await
    .expect("check task");

    assert
        .code(1)
        .stderr(predicate::str::contains("Backend reachable"))
        .stderr(predicate::str::contains("résumé"))
        .stderr(predicate::str::contains("LinkedIn"));
}
