//! Integration tests for the `mealplan` binary.
//!
//! Each test runs the compiled binary in a scratch directory with a
//! scrubbed environment so a developer's `.env` or config file cannot leak
//! in. Gemini is replaced by a wiremock server via `GEMINI_BASE_URL`.

use std::path::Path;
use std::process::Output;

use serde_json::json;
use tempfile::TempDir;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mealplan_test_utils::{plan_json_without, sample_plan_json};
use mealplan_core::plan::Weekday;

const SCRUBBED_VARS: &[&str] = &[
    "GEMINI_API_KEY",
    "GEMINI_MODEL",
    "GEMINI_BASE_URL",
    "GEMINI_TIMEOUT_SECS",
    "SMTP_SERVER",
    "SMTP_PORT",
    "SMTP_SECURITY",
    "EMAIL_ADDRESS",
    "EMAIL_PASSWORD",
    "RECIPIENT_EMAIL",
    "FAMILY_SIZE",
];

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

fn mealplan(workdir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mealplan"));
    cmd.current_dir(workdir)
        .env("HOME", workdir)
        .env("XDG_CONFIG_HOME", workdir.join("config"))
        .env("RUST_LOG", "warn");
    for var in SCRUBBED_VARS {
        cmd.env_remove(var);
    }
    cmd
}

async fn gemini_returning(text: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        })))
        .mount(&server)
        .await;
    server
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn missing_api_key_fails_before_any_request() {
    let tmp = TempDir::new().unwrap();
    let output = mealplan(tmp.path())
        .args(["--no-email", "--preferences", "anything"])
        .output()
        .await
        .unwrap();

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(
        stderr.contains("GEMINI_API_KEY"),
        "expected missing key message, got: {stderr}"
    );
}

#[tokio::test]
async fn explicit_config_path_must_exist() {
    let tmp = TempDir::new().unwrap();
    let output = mealplan(tmp.path())
        .args(["--no-email", "--preferences", "anything", "--config"])
        .arg(tmp.path().join("missing.toml"))
        .env("GEMINI_API_KEY", "test-key")
        .output()
        .await
        .unwrap();

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(
        stderr.contains("missing.toml"),
        "expected config path in error, got: {stderr}"
    );
}

#[tokio::test]
async fn prints_plan_and_list_without_email() {
    let tmp = TempDir::new().unwrap();
    let server = gemini_returning(&sample_plan_json()).await;

    let output = mealplan(tmp.path())
        .args(["--no-email", "--family-size", "4", "--preferences", "no nuts"])
        .env("GEMINI_API_KEY", "test-key")
        .env("GEMINI_BASE_URL", server.uri())
        .output()
        .await
        .unwrap();

    let stdout = stdout_of(&output);
    assert!(
        output.status.success(),
        "mealplan failed: {}",
        stderr_of(&output)
    );
    assert!(stdout.contains("Weekly Meal Plan (family of 4)"));
    assert!(stdout.contains("Sunday:"));
    assert!(stdout.contains("Congee (x2) ingredients:"));
    assert!(stdout.contains("Email disabled"));
}

#[tokio::test]
async fn config_file_supplies_settings() {
    let tmp = TempDir::new().unwrap();
    let server = gemini_returning(&sample_plan_json()).await;

    let config_dir = tmp.path().join("config").join("mealplan");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!(
            "[gemini]\napi_key = \"file-key\"\nbase_url = \"{}\"\n\n[household]\nfamily_size = 3\n",
            server.uri()
        ),
    )
    .unwrap();

    let output = mealplan(tmp.path())
        .args(["--no-email", "--preferences", "high protein"])
        .output()
        .await
        .unwrap();

    assert!(
        output.status.success(),
        "mealplan failed: {}",
        stderr_of(&output)
    );
    assert!(stdout_of(&output).contains("Weekly Meal Plan (family of 3)"));
}

#[tokio::test]
async fn incomplete_week_exits_non_zero() {
    let tmp = TempDir::new().unwrap();
    let server = gemini_returning(&plan_json_without(Weekday::Thursday)).await;

    let output = mealplan(tmp.path())
        .args(["--no-email", "--preferences", "anything"])
        .env("GEMINI_API_KEY", "test-key")
        .env("GEMINI_BASE_URL", server.uri())
        .output()
        .await
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("Thursday"));
    assert!(!stdout_of(&output).contains("Shopping List"));
}
