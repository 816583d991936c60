//! End-to-end CLI tests for the `tally` binary.
//!
//! Each test initializes a project in its own temporary directory and runs
//! `tally` as a subprocess with `TZ=UTC` unless a test picks another zone.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn tally(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.current_dir(tmp.path())
        .env("TZ", "UTC")
        .env("NO_COLOR", "1")
        .env_remove("TALLY_DIR")
        .env_remove("TALLY_USER")
        .env_remove("TALLY_DATABASE")
        .env_remove("TALLY_LOG_TRACKING");
    cmd
}

fn init_project(extra: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let mut args = vec!["init", "--quiet", "--default-user", "tester"];
    args.extend_from_slice(extra);
    tally(&tmp).args(&args).assert().success();
    tmp
}

/// Runs with `--json` and parses stdout.
fn json(tmp: &TempDir, args: &[&str]) -> Value {
    let output = tally(tmp).args(args).arg("--json").output().unwrap();
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn add_task(tmp: &TempDir, title: &str, task_type: &str) -> i64 {
    json(tmp, &["task", "add", title, "--type", task_type])["id"]
        .as_i64()
        .unwrap()
}

fn today() -> String {
    chrono::Utc::now().date_naive().to_string()
}

// ---------------------------------------------------------------------------
// Init and configuration
// ---------------------------------------------------------------------------

#[test]
fn init_creates_project() {
    let tmp = init_project(&[]);
    let dir = tmp.path().join(".tally");
    assert!(dir.join("config.yaml").is_file());
    assert!(dir.join("tally.db").is_file());
    assert!(dir.join(".gitignore").is_file());

    tally(&tmp)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
    tally(&tmp).args(["init", "--force", "--quiet"]).assert().success();
}

#[test]
fn commands_outside_a_project_fail() {
    let tmp = TempDir::new().unwrap();
    tally(&tmp)
        .arg("today")
        .assert()
        .failure()
        .stderr(predicate::str::contains("tally init"));
}

#[test]
fn config_set_and_get() {
    let tmp = init_project(&[]);
    tally(&tmp)
        .args(["config", "get", "user"])
        .assert()
        .success()
        .stdout("tester\n");
    tally(&tmp).args(["config", "set", "log_tracking", "false"]).assert().success();
    tally(&tmp)
        .args(["config", "get", "log_tracking"])
        .assert()
        .success()
        .stdout("false\n");
    tally(&tmp)
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown key"));
}

// ---------------------------------------------------------------------------
// Tasks and completions
// ---------------------------------------------------------------------------

#[test]
fn task_lifecycle() {
    let tmp = init_project(&[]);
    let walk = add_task(&tmp, "Walk", "daily");
    let book = add_task(&tmp, "Buy book", "once");

    let list = json(&tmp, &["task", "list"]);
    assert_eq!(list.as_array().unwrap().len(), 2);
    assert_eq!(list[1]["type"], "once");

    let renamed = json(&tmp, &["task", "rename", &walk.to_string(), "Long walk"]);
    assert_eq!(renamed["title"], "Long walk");

    json(&tmp, &["task", "archive", &book.to_string()]);
    assert_eq!(json(&tmp, &["task", "list"]).as_array().unwrap().len(), 1);
    assert_eq!(json(&tmp, &["task", "list", "--all"]).as_array().unwrap().len(), 2);

    tally(&tmp)
        .args(["task", "add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("title"));
}

#[test]
fn tasks_count_from_their_local_creation_day() {
    // POSIX zones 12 hours west and 14 hours east of UTC. At any hour, at
    // least one of them is on a different calendar day than UTC.
    for zone in ["WEST+12", "EAST-14"] {
        let tmp = init_project(&[]);
        let in_zone = |args: &[&str]| -> Value {
            let output = tally(&tmp)
                .env("TZ", zone)
                .args(args)
                .arg("--json")
                .output()
                .unwrap();
            assert!(
                output.status.success(),
                "{zone} {args:?} failed: {}",
                String::from_utf8_lossy(&output.stderr)
            );
            serde_json::from_slice(&output.stdout).unwrap()
        };

        let task = in_zone(&["task", "add", "Stretch"]);
        let today = in_zone(&["today"]);
        assert_eq!(task["created_on"], today["date"], "{zone}");

        let id = task["id"].as_i64().unwrap().to_string();
        in_zone(&["done", &id]);
        let today = in_zone(&["today"]);
        assert_eq!(today["tasks"][0]["completed"], true, "{zone}");
        assert_eq!(in_zone(&["streaks"])["current"], 1, "{zone}");
    }
}

#[test]
fn done_fail_undo_drive_today_and_streaks() {
    let tmp = init_project(&[]);
    let walk = add_task(&tmp, "Walk", "daily").to_string();
    let read = add_task(&tmp, "Read", "once").to_string();

    json(&tmp, &["done", &walk]);
    json(&tmp, &["done", &read]);
    let today = json(&tmp, &["today"]);
    let tasks = today["tasks"].as_array().unwrap();
    assert!(tasks.iter().all(|t| t["completed"] == true));

    let streaks = json(&tmp, &["streaks"]);
    assert_eq!(streaks["current"], 1);
    assert_eq!(streaks["longest"], 1);

    tally(&tmp).args(["fail", &walk]).assert().failure();
    tally(&tmp)
        .args(["fail", &walk, "--note", " "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("note"));
    let failed = json(&tmp, &["fail", &walk, "--note", "rained all day"]);
    assert_eq!(failed["is_completed"], false);
    assert_eq!(failed["failure_note"], "rained all day");
    assert_eq!(json(&tmp, &["streaks"])["current"], 0);

    let undone = json(&tmp, &["undo", &walk]);
    assert_eq!(undone["failure_note"], Value::Null);

    let dash = json(&tmp, &["dashboard"]);
    let history = dash["history"].as_array().unwrap();
    assert_eq!(history.len(), 28);
    assert_eq!(history[27]["date"], today_str());
    assert_eq!(history[27]["total"], 1);
}

fn today_str() -> Value {
    Value::String(today())
}

#[test]
fn users_are_isolated() {
    let tmp = init_project(&[]);
    add_task(&tmp, "Walk", "daily");
    let other = tally(&tmp)
        .args(["task", "list", "--json", "--user", "someone-else"])
        .output()
        .unwrap();
    let list: Value = serde_json::from_slice(&other.stdout).unwrap();
    assert!(list.as_array().unwrap().is_empty());
}

#[test]
fn errors_are_json_with_flag() {
    let tmp = init_project(&[]);
    tally(&tmp)
        .args(["done", "999", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"error\""));
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[test]
fn history_week_view() {
    let tmp = init_project(&[]);
    let walk = add_task(&tmp, "Walk", "daily").to_string();
    json(&tmp, &["done", &walk]);

    let week = json(&tmp, &["history"]);
    let days = week["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(week["can_go_forward"], false);
    assert_eq!(week["can_go_back"], true);
    let today = days.iter().find(|d| d["date"] == today_str()).unwrap();
    assert_eq!(today["completed_daily"], 1);
    assert_eq!(today["completion_percentage"], 100);

    let back = json(&tmp, &["history", "--week", "11"]);
    assert_eq!(back["can_go_back"], false);

    tally(&tmp)
        .args(["history", "--week", "12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 0 and 11"));
}

// ---------------------------------------------------------------------------
// Daily log
// ---------------------------------------------------------------------------

#[test]
fn daily_log_round_trip() {
    let tmp = init_project(&[]);
    json(&tmp, &["field", "add", "Sleep", "--type", "time"]);
    json(&tmp, &["field", "add", "Steps", "--type", "number"]);

    json(&tmp, &["log", "mood", "4"]);
    json(&tmp, &["log", "notes", "  slow morning  "]);
    json(&tmp, &["log", "set", "sleep", "07:45"]);
    tally(&tmp)
        .args(["log", "set", "Steps", "lots"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("lots"));
    tally(&tmp).args(["log", "mood", "6"]).assert().failure();

    let shown = json(&tmp, &["log", "show"]);
    let log = &shown["log"];
    assert_eq!(log["mood"], 4);
    assert_eq!(log["notes"], "slow morning");
    assert_eq!(log["fields"]["Sleep"], "07:45");
    assert!(log["fields"].get("Steps").is_none());

    json(&tmp, &["log", "mood", "--clear"]);
    assert_eq!(json(&tmp, &["log", "show"])["log"]["mood"], Value::Null);
}

#[test]
fn fields_reorder_and_remove() {
    let tmp = init_project(&[]);
    let a = json(&tmp, &["field", "add", "A"])["id"].as_i64().unwrap();
    let b = json(&tmp, &["field", "add", "B"])["id"].as_i64().unwrap();

    let moved = json(&tmp, &["field", "move", &b.to_string(), "up"]);
    assert_eq!(moved["moved"], true);
    let edge = json(&tmp, &["field", "move", &b.to_string(), "up"]);
    assert_eq!(edge["moved"], false);

    let names: Vec<Value> = json(&tmp, &["field", "list"])
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].clone())
        .collect();
    assert_eq!(names, vec![Value::from("B"), Value::from("A")]);

    json(&tmp, &["field", "remove", &a.to_string()]);
    assert_eq!(json(&tmp, &["field", "list"]).as_array().unwrap().len(), 1);
}

#[test]
fn log_disabled_project() {
    let tmp = init_project(&["--no-log"]);
    tally(&tmp)
        .args(["log", "mood", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("disabled"));

    let export = json(&tmp, &["export"]);
    assert_eq!(export["daily_log"], Value::Null);
    assert_eq!(export["daily_log_history"], Value::Null);
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn export_to_file() {
    let tmp = init_project(&[]);
    let walk = add_task(&tmp, "Walk", "daily").to_string();
    json(&tmp, &["done", &walk]);
    json(&tmp, &["log", "mood", "5"]);

    tally(&tmp)
        .args(["export", "--output", "report.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported to"));

    let content = std::fs::read_to_string(tmp.path().join("report.json")).unwrap();
    let export: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(export["export_metadata"]["purpose"], "AI Assistant Context");
    assert_eq!(export["today"]["summary"]["completion_rate"], 100);
    assert_eq!(export["streaks"]["current_streak"], 1);
    assert_eq!(export["monthly_overview"]["week_summaries"].as_array().unwrap().len(), 4);
    assert_eq!(export["daily_log"]["mood_label"], "Great");
    assert_eq!(export["daily_log_history"]["patterns"]["mood_trend"], "stable");
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

#[test]
fn completion_scripts() {
    let tmp = TempDir::new().unwrap();
    tally(&tmp)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tally"));
}
