use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::Value;

// Isolate from the developer's home and env so only the test config applies
fn hkanalytics(temp: &assert_fs::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hkanalytics").unwrap();
    cmd.current_dir(temp.path())
        .env("HOME", temp.path())
        .env_remove("HKANALYTICS_DISABLED")
        .env_remove("DO_NOT_TRACK")
        .env_remove("HKANALYTICS_DEBUG")
        .env_remove("HKANALYTICS_MAX_PARAMETERS")
        .env_remove("HKANALYTICS_MAX_VALUE_LENGTH")
        .env_remove("RUST_LOG");
    cmd
}

fn records(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_replay_prints_backend_calls() {
    let temp = assert_fs::TempDir::new().unwrap();
    let script = temp.child("session.jsonl");
    script
        .write_str(
            r#"# checkout flow
{"op":"set_user_id","id":"u-1"}
{"op":"add_breadcrumb","message":"tapped","data":{"btn":"ok"}}
{"op":"track","event":"purchase","parameters":{"item":"sku1","price":9.999999}}
{"op":"record_error","message":"payment declined"}
"#,
        )
        .unwrap();

    let output = hkanalytics(&temp)
        .args(["replay", "session.jsonl"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let records = records(&output.stdout);
    let calls: Vec<&str> = records
        .iter()
        .map(|r| r["call"].as_str().unwrap())
        .collect();
    assert_eq!(
        calls,
        vec![
            "initialize",
            "initialize",
            "set_collection_enabled",
            "set_collection_enabled",
            "set_user_id",
            "set_user_id",
            "log",
            "log_event",
            "record_error",
        ]
    );

    let log = &records[6];
    assert_eq!(log["line"], "tapped | btn=ok");

    let event = &records[7];
    assert_eq!(event["name"], "purchase");
    assert_eq!(event["parameters"]["price"], 9.999999);

    let error = &records[8];
    assert_eq!(error["error"], "payment declined");
    assert_eq!(error["context"]["user_id"], "u-1");
    let trail = error["context"]["breadcrumbs"].as_array().unwrap();
    assert!(trail[0].as_str().unwrap().ends_with("tapped | btn=ok"));
}

#[test]
fn test_replay_uses_config_limits() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child(".hkanalytics/config.toml")
        .write_str("[analytics]\nmax_parameter_value_length = 5\n")
        .unwrap();
    temp.child("s.jsonl")
        .write_str(r#"{"op":"track","event":"purchase","parameters":{"item":"sku1","price":9.999999}}"#)
        .unwrap();

    let output = hkanalytics(&temp).args(["replay", "s.jsonl"]).output().unwrap();
    assert!(output.status.success());

    let records = records(&output.stdout);
    let event = records.iter().find(|r| r["call"] == "log_event").unwrap();
    assert_eq!(event["parameters"]["item"], "sku1");
    assert_eq!(event["parameters"]["price"], "9.999");
}

#[test]
fn test_replay_disabled_crash_channel_drops_errors() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("s.jsonl")
        .write_str(
            r#"{"op":"set_crash_reporting_enabled","enabled":false}
{"op":"record_error","message":"lost"}
{"op":"set_crash_reporting_enabled","enabled":true}
"#,
        )
        .unwrap();

    hkanalytics(&temp)
        .args(["replay", "s.jsonl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("record_error").not());
}

#[test]
fn test_replay_rejects_malformed_line() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("bad.jsonl")
        .write_str("{\"op\":\"track\",\"event\":\"ok\"}\nnot json\n")
        .unwrap();

    hkanalytics(&temp)
        .args(["replay", "bad.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_replay_missing_script() {
    let temp = assert_fs::TempDir::new().unwrap();

    hkanalytics(&temp)
        .args(["replay", "nope.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read script"));
}
