//! End-to-end tests for the `ct` binary.
//!
//! Each test gets an isolated home, database, and state directory, and runs
//! the real binary the way a user would.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;

fn ct_binary() -> String {
    env!("CARGO_BIN_EXE_ct").to_string()
}

fn ct_command(temp: &Path) -> Command {
    let mut command = Command::new(ct_binary());
    command
        .env("HOME", temp)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("XDG_DATA_HOME")
        .env_remove("XDG_STATE_HOME")
        .env_remove("CT_PASSWORD")
        .env("CT_DATABASE_PATH", temp.join("data").join("ct.db"))
        .env("CT_STATE_DIR", temp.join("state"))
        .env("NO_COLOR", "1")
        .env("TZ", "UTC");
    command
}

fn ct(temp: &Path, args: &[&str]) -> Output {
    ct_command(temp)
        .args(args)
        .output()
        .expect("failed to run ct")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{what} should succeed: {}",
        stderr(output)
    );
}

fn json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn signup(temp: &Path) {
    let output = ct_command(temp)
        .env("CT_PASSWORD", "secret1")
        .args(["signup", "ada@example.com"])
        .output()
        .unwrap();
    assert_success(&output, "ct signup");
}

/// Creates a tracker and returns its short ID from the confirmation line.
fn add(temp: &Path, title: &str, target: &str) -> String {
    let output = ct(temp, &["add", title, "--target", target]);
    assert_success(&output, "ct add");
    let text = stdout(&output);
    let first = text.lines().next().unwrap();
    first
        .strip_prefix("Created tracker ")
        .expect("confirmation line")
        .to_string()
}

#[test]
fn test_commands_require_login() {
    let temp = TempDir::new().unwrap();
    for args in [&["list"][..], &["stats"], &["add", "Rent", "--target", "in 1 hour"]] {
        let output = ct(temp.path(), args);
        assert!(!output.status.success(), "{args:?} should fail");
        assert!(
            stderr(&output).contains("Not signed in. Run 'ct login' first."),
            "{args:?}: {}",
            stderr(&output)
        );
    }
}

#[test]
fn test_tracker_lifecycle() {
    let temp = TempDir::new().unwrap();
    signup(temp.path());

    let id = add(temp.path(), "Rent", "in 2 hours");
    add(temp.path(), "Gym pass", "2020-01-01T00:00:00Z");

    let list = json(&ct(temp.path(), &["list", "--json"]));
    assert_eq!(list["total"], 2);
    assert_eq!(list["trackers"][0]["title"], "Gym pass");
    assert_eq!(list["trackers"][0]["available"], true);
    assert_eq!(list["trackers"][1]["countdown"]["display_status"], "Progress");

    let available = json(&ct(temp.path(), &["list", "--tab", "available", "--json"]));
    assert_eq!(available["total"], 1);

    let output = ct(temp.path(), &["pause", &id]);
    assert_success(&output, "ct pause");
    let shown = json(&ct(temp.path(), &["show", &id, "--json"]));
    assert_eq!(shown["paused"], true);
    assert!(shown["paused_at"].is_string());
    assert!(shown["accumulated_time_ms"].is_number());

    let output = ct(temp.path(), &["pause", &id]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("already paused"));

    assert_success(&ct(temp.path(), &["toggle", &id]), "ct toggle");
    let shown = json(&ct(temp.path(), &["show", &id, "--json"]));
    assert_eq!(shown["paused"], false);

    let output = ct(temp.path(), &["edit", &id, "--title", "Rent (March)", "--status", "available"]);
    assert_success(&output, "ct edit");
    let shown = json(&ct(temp.path(), &["show", &id, "--json"]));
    assert_eq!(shown["title"], "Rent (March)");
    assert_eq!(shown["countdown"]["display_status"], "Completed");

    assert_success(&ct(temp.path(), &["copy", &id]), "ct copy");
    let stats = json(&ct(temp.path(), &["stats", "--json"]));
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["buckets"]["overdue"], 1);

    let output = ct(temp.path(), &["delete", &id, "--yes"]);
    assert_success(&output, "ct delete");
    assert_eq!(stdout(&output), format!("Deleted tracker {id}\n"));
    let list = json(&ct(temp.path(), &["list", "--json"]));
    assert_eq!(list["total"], 2);
}

#[test]
fn test_delete_prompt_reads_stdin() {
    let temp = TempDir::new().unwrap();
    signup(temp.path());
    let id = add(temp.path(), "Rent", "in 2 hours");

    let mut child = ct_command(temp.path())
        .args(["delete", id.as_str()])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"n\n").unwrap();
    let output = child.wait_with_output().unwrap();
    assert_success(&output, "ct delete");
    assert!(stdout(&output).ends_with("Cancelled.\n"));

    let list = json(&ct(temp.path(), &["list", "--json"]));
    assert_eq!(list["total"], 1);
}

#[test]
fn test_login_logout() {
    let temp = TempDir::new().unwrap();
    signup(temp.path());

    let output = ct(temp.path(), &["logout"]);
    assert_eq!(stdout(&output), "Signed out.\n");
    assert!(!ct(temp.path(), &["list"]).status.success());

    let output = ct(temp.path(), &["login", "ada@example.com", "--password", "nope-nope"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid email or password"));

    let output = ct(temp.path(), &["login", "ADA@example.com", "--password", "secret1"]);
    assert_success(&output, "ct login");
    assert_eq!(stdout(&output), "Signed in as ada@example.com\n");

    let output = ct(temp.path(), &["profile", "--name", "Ada"]);
    assert_success(&output, "ct profile");
    assert!(stdout(&output).contains("Display name: Ada"));
}

#[test]
fn test_theme_and_watch() {
    let temp = TempDir::new().unwrap();
    assert_eq!(stdout(&ct(temp.path(), &["theme"])), "Theme: dark\n");
    assert_eq!(
        stdout(&ct(temp.path(), &["theme", "--toggle"])),
        "Theme set to light\n"
    );
    let prefs = std::fs::read_to_string(temp.path().join("state").join("preferences.json")).unwrap();
    assert!(prefs.contains("light"));

    signup(temp.path());
    add(temp.path(), "Rent", "in 2 hours");
    let output = ct(temp.path(), &["watch", "--ticks", "1"]);
    assert_success(&output, "ct watch");
    let text = stdout(&output);
    assert!(text.starts_with("Live at "));
    assert!(text.contains("[Progress] Rent"));
}
