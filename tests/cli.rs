//! Runs the `run_pipeline` binary against the axum mock backend.

mod common;

use std::process::{Command, Output};

async fn run_cli(args: Vec<String>) -> Output {
  tokio::task::spawn_blocking(move || {
    Command::new(env!("CARGO_BIN_EXE_run_pipeline"))
      .args(&args)
      .env_remove("PIPELINE_BACKEND_URL")
      .env_remove("PIPELINE_SUBMIT_TIMEOUT_SECS")
      .output()
      .expect("run_pipeline")
  })
  .await
  .unwrap()
}

fn args(list: &[&str]) -> Vec<String> {
  list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn run_prints_statuses_and_saves_log() {
  let (url, state) = common::spawn_mock().await;
  let dir = tempfile::tempdir().unwrap();
  let log_path = dir.path().join("events.json");

  let out = run_cli(args(&[
    "--backend",
    &url,
    "run",
    "--input",
    "hello",
    "--node",
    "Text Transform:suffix=!",
    "--show-log",
    "--log-file",
    log_path.to_str().unwrap(),
  ]))
  .await;

  let stdout = String::from_utf8_lossy(&out.stdout);
  assert!(out.status.success(), "stdout: {stdout}");
  assert!(stdout.contains("Pipeline completed."));
  assert!(stdout.contains("HELLO"));
  assert!(stdout.contains("Event log:"));
  assert!(log_path.exists());

  let s = state.lock().unwrap();
  let transform = &s.requests[1].nodes[0];
  assert_eq!(transform.options["mode"], serde_json::json!("upper"));
  assert_eq!(transform.options["suffix"], serde_json::json!("!"));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_exits_nonzero_on_node_error() {
  let (url, _) = common::spawn_mock().await;
  let out = run_cli(args(&[
    "--backend",
    &url,
    "run",
    "--input",
    "boom",
    "--node",
    "Text Transform",
  ]))
  .await;

  assert!(!out.status.success());
  assert!(String::from_utf8_lossy(&out.stdout).contains("Pipeline aborted."));
  assert!(String::from_utf8_lossy(&out.stderr).contains("Pipeline error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn node_types_prints_catalog() {
  let (url, _) = common::spawn_mock().await;
  let out = run_cli(args(&["--backend", &url, "node-types"])).await;
  assert!(out.status.success());
  let catalog: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert!(catalog.get("Text Transform").is_some());
}

#[test]
fn invalid_backend_url_is_rejected() {
  let out = Command::new(env!("CARGO_BIN_EXE_run_pipeline"))
    .args(["--backend", "localhost:5000", "node-types"])
    .env_remove("PIPELINE_BACKEND_URL")
    .output()
    .expect("run_pipeline");
  assert!(!out.status.success());
  assert!(String::from_utf8_lossy(&out.stderr).contains("Invalid configuration"));
}
