use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn write(&self, name: &str, lines: &[&str]) -> String {
        let path = self.dir.path().join(name);
        fs::write(&path, lines.join("\n")).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("markersense").unwrap();
        // Keep the user's own config file out of the way
        cmd.env("XDG_CONFIG_HOME", self.dir.path().join("xdg"));
        cmd.env("NO_COLOR", "1");
        cmd
    }
}

#[test]
fn replay_creates_and_destroys_with_immediate_policy() {
    let fx = Fixture::new();
    let input = fx.write(
        "batches.jsonl",
        &[
            r#"{"time": 0.0, "detections": [{"type": "qr", "payload": "ABC", "timestamp": 0.0}]}"#,
            r#"{"time": 0.2, "detections": []}"#,
        ],
    );

    fx.cmd()
        .args(["replay", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains("+ QR ABC #1 (created)"))
        .stdout(predicate::str::contains("- QR ABC #1 (destroyed)"))
        .stdout(predicate::str::contains("Marker Settings:"))
        .stdout(predicate::str::contains("Markers: 0"));
}

#[test]
fn replay_json_with_timeout_policy() {
    let fx = Fixture::new();
    let input = fx.write(
        "batches.jsonl",
        &[
            r#"{"time": 0.0, "detections": [{"type": "aruco", "tag_id": 7, "timestamp": 0.0}]}"#,
            r#"{"time": 0.4}"#,
            r#"{"time": 0.6}"#,
        ],
    );

    let output = fx
        .cmd()
        .args(["replay", &input, "--policy", "timeout", "--timeout", "0.5", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["ticks"], 3);
    let events = report["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["event"], "created");
    assert_eq!(events[0]["tick"], 1);
    assert_eq!(events[0]["type"], "aruco_april");
    assert_eq!(events[0]["id"], "7");
    assert_eq!(events[1]["event"], "destroyed");
    assert_eq!(events[1]["tick"], 3);
    assert!(report["records"].as_array().unwrap().is_empty());
}

#[test]
fn replay_filters_disabled_types() {
    let fx = Fixture::new();
    let input = fx.write(
        "batches.jsonl",
        &[concat!(
            r#"{"time": 0.0, "detections": ["#,
            r#"{"type": "aruco", "tag_id": 1, "timestamp": 0.0},"#,
            r#"{"type": "qr", "payload": "only-me", "timestamp": 0.0}]}"#
        )],
    );

    let output = fx
        .cmd()
        .args(["replay", &input, "--types", "qr", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = report["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["type"], "qr");
    assert_eq!(records[0]["id"], "only-me");
}

#[test]
fn replay_reports_skipped_detections() {
    let fx = Fixture::new();
    let input = fx.write(
        "batches.jsonl",
        &[concat!(
            r#"{"time": 0.0, "detections": ["#,
            r#"{"type": "upc_a", "payload": [255, 254], "timestamp": 0.0},"#,
            r#"{"type": "qr", "payload": "fine", "timestamp": 0.0}]}"#
        )],
    );

    fx.cmd()
        .args(["replay", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains("! detection 0 skipped: UPC_A payload is not valid text"))
        .stdout(predicate::str::contains("+ QR fine #1 (created)"))
        .stdout(predicate::str::contains("Markers: 1"));
}

#[test]
fn replay_quiet_prints_only_status() {
    let fx = Fixture::new();
    let input = fx.write(
        "batches.jsonl",
        &[r#"{"time": 0.0, "detections": [{"type": "qr", "payload": "Q", "timestamp": 0.0}]}"#],
    );

    fx.cmd()
        .args(["replay", &input, "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(created)").not())
        .stdout(predicate::str::contains("QR Q"));
}

#[test]
fn replay_uses_config_file() {
    let fx = Fixture::new();
    let config = fx.write(
        "config.toml",
        &["[tracking]", "eviction = \"timeout\"", "", "[output]", "show_settings = false"],
    );
    let input = fx.write(
        "batches.jsonl",
        &[
            r#"{"time": 0.0, "detections": [{"type": "qr", "payload": "stay", "timestamp": 0.0}]}"#,
            r#"{"time": 0.1}"#,
        ],
    );

    fx.cmd()
        .args(["replay", &input, "--config", &config])
        .assert()
        .success()
        .stdout(predicate::str::contains("destroyed").not())
        .stdout(predicate::str::contains("Marker Settings:").not())
        .stdout(predicate::str::contains("Markers: 1"));
}

#[test]
fn replay_rejects_malformed_batch() {
    let fx = Fixture::new();
    let input = fx.write("batches.jsonl", &[r#"{"time": 0.0}"#, r#"{"time": "later"}"#]);

    fx.cmd()
        .args(["replay", &input])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("batch 2"));
}

#[test]
fn replay_rejects_unknown_policy() {
    let fx = Fixture::new();
    let input = fx.write("batches.jsonl", &[r#"{"time": 0.0}"#]);

    fx.cmd()
        .args(["replay", &input, "--policy", "sometimes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown eviction policy 'sometimes'"));
}

#[test]
fn replay_rejects_oversized_timeout() {
    let fx = Fixture::new();
    let input = fx.write("batches.jsonl", &[r#"{"time": 0.0}"#]);

    fx.cmd()
        .args(["replay", &input, "--policy", "timeout", "--timeout", "1e30"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("timeout"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn replay_rejects_missing_file() {
    let fx = Fixture::new();
    let missing = fx.dir.path().join("nope.jsonl");

    fx.cmd()
        .args(["replay", missing.to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to open"));
}

#[test]
fn replay_reads_stdin() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["replay", "-", "--json"])
        .write_stdin(r#"{"time": 0.0, "detections": [{"type": "ean13", "payload": "4006381333931", "timestamp": 0.0}]}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"4006381333931\""));
}

#[test]
fn schema_command_prints_schema() {
    Command::cargo_bin("markersense")
        .unwrap()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("DetectionBatch"))
        .stdout(predicate::str::contains("tag_id"));
}

#[test]
fn config_command_prints_defaults() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[tracking]"))
        .stdout(predicate::str::contains("eviction = \"immediate\""));
}

#[cfg(target_os = "linux")]
#[test]
fn config_path_follows_xdg() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["config", "--path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("xdg"))
        .stdout(predicate::str::contains("markersense/config.toml"));
}

#[test]
fn no_args_prints_help() {
    Command::cargo_bin("markersense")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
