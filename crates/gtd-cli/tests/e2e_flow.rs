//! End-to-end tests driving the `gtd` binary against a throwaway database.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, ExitStatus, Output, Stdio};
use std::time::{Duration, Instant};

use gtd_db::Database;
use tempfile::TempDir;

fn gtd_binary() -> String {
    env!("CARGO_BIN_EXE_gtd").to_string()
}

/// Writes a config pointing at a database inside `temp`.
fn write_config(temp: &Path) -> PathBuf {
    write_config_with_countdown(temp, 0)
}

fn write_config_with_countdown(temp: &Path, countdown_secs: u64) -> PathBuf {
    let config = temp.join("config.toml");
    let database = temp.join("data").join("gtd.db");
    std::fs::write(
        &config,
        format!(
            r#"clipboard_command = ["printf", "%s", "clip text"]
countdown_secs = {}

[remote]
database_path = "{}"
"#,
            countdown_secs,
            database.display()
        ),
    )
    .unwrap();
    config
}

fn spawn_gtd(temp: &Path, args: &[&str]) -> Child {
    let config = temp.join("config.toml");
    Command::new(gtd_binary())
        .env("HOME", temp)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(&config)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run gtd")
}

fn gtd(temp: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = spawn_gtd(temp, args);
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

/// Reads stdout until `needle` has been printed; returns everything read.
fn read_until(stdout: &mut ChildStdout, needle: &str) -> String {
    let mut seen = String::new();
    let mut buf = [0_u8; 256];
    while !seen.contains(needle) {
        let n = stdout.read(&mut buf).unwrap();
        assert!(n > 0, "gtd closed stdout before printing {needle:?}: {seen}");
        seen.push_str(&String::from_utf8_lossy(&buf[..n]));
    }
    seen
}

fn send_sigint(child: &Child) {
    let status = Command::new("kill")
        .arg("-INT")
        .arg(child.id().to_string())
        .status()
        .unwrap();
    assert!(status.success());
}

/// Waits up to ten seconds for the child to exit.
fn wait_for_exit(child: &mut Child) -> Option<ExitStatus> {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait().unwrap() {
            return Some(status);
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    let _ = child.kill();
    None
}

fn gtd_ok(temp: &Path, args: &[&str], stdin: &str) -> String {
    let output = gtd(temp, args, stdin);
    assert!(
        output.status.success(),
        "gtd {args:?} should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

/// Texts of one stored collection, in id order.
fn stored_texts(temp: &Path, collection: &str) -> Vec<String> {
    let db = Database::open(&temp.join("data").join("gtd.db")).unwrap();
    let snapshot = db.collections().unwrap();
    snapshot
        .get(collection)
        .map(|records| {
            records
                .values()
                .map(|record| record["text"].as_str().unwrap().to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_add_then_overview() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());

    let added = gtd_ok(temp.path(), &["add", "Buy", "milk"], "");
    assert_eq!(added.trim_end(), "\"Buy milk\" added to inbox.");

    let overview = gtd_ok(temp.path(), &["overview"], "");
    let lines: Vec<&str> = overview.lines().collect();
    assert_eq!(
        lines[0],
        "*************************************INBOX**************************************"
    );
    assert_eq!(lines[1], "Buy milk");
    assert!(overview.contains("NEXT ACTIONS"));
}

#[test]
fn test_process_files_next_action() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());
    gtd_ok(temp.path(), &["add", "groceries"], "");

    let output = gtd_ok(temp.path(), &["process"], "a\nCall the store\n");
    assert!(output.contains("Process Item (1 item left)"));
    assert!(output.contains("NEXT ACTION> "));

    assert!(stored_texts(temp.path(), "inbox").is_empty());
    assert_eq!(stored_texts(temp.path(), "next_actions"), ["Call the store"]);
}

#[test]
fn test_process_do_now_with_zero_countdown() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());
    gtd_ok(temp.path(), &["add", "reply to email"], "");

    let output = gtd_ok(temp.path(), &["process"], "d\n\ny\n");
    assert!(output.contains("Do it now!"));
    assert!(output.contains("Time's up!"));
    assert!(stored_texts(temp.path(), "inbox").is_empty());
}

#[test]
fn test_process_aborts_on_end_of_input() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());
    gtd_ok(temp.path(), &["add", "groceries"], "");

    let output = gtd(temp.path(), &["process"], "");
    assert!(!output.status.success());
    assert_eq!(stored_texts(temp.path(), "inbox"), ["groceries"]);
}

#[test]
fn test_update_marks_done() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());
    gtd_ok(temp.path(), &["add", "groceries"], "");
    gtd_ok(temp.path(), &["process"], "a\nCall the store\n");

    let output = gtd_ok(temp.path(), &["update", "next"], "0d\nq\n");
    assert!(output.contains("  0 Call the store"));
    assert!(output.contains("Goodbye!"));

    assert!(stored_texts(temp.path(), "next_actions").is_empty());
    assert_eq!(
        stored_texts(temp.path(), "completed_items"),
        ["Call the store"]
    );
}

#[test]
fn test_update_rejects_unknown_list() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());

    let output = gtd(temp.path(), &["update", "zebra"], "");
    assert!(!output.status.success());
}

#[test]
fn test_paste_uses_clipboard_command() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());

    let output = gtd_ok(temp.path(), &["paste"], "");
    assert_eq!(output.trim_end(), "\"clip text\" added to inbox.");
    assert_eq!(stored_texts(temp.path(), "inbox"), ["clip text"]);
}

#[test]
fn test_quick_reads_one_line() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());

    let output = gtd_ok(temp.path(), &["quick"], "Call mom\n");
    assert!(output.starts_with("INBOX> "));
    assert_eq!(stored_texts(temp.path(), "inbox"), ["Call mom"]);
}

#[test]
fn test_no_subcommand_prints_help() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());

    let output = gtd_ok(temp.path(), &[], "");
    assert!(output.contains("Usage:"));
}

#[test]
fn test_interrupt_ends_countdown_early() {
    let temp = TempDir::new().unwrap();
    write_config_with_countdown(temp.path(), 60);
    gtd_ok(temp.path(), &["add", "reply to email"], "");

    let mut child = spawn_gtd(temp.path(), &["process"]);
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = child.stdout.take().unwrap();
    stdin.write_all(b"d\n\n").unwrap();
    read_until(&mut stdout, "   60");
    std::thread::sleep(Duration::from_millis(200));

    send_sigint(&child);
    read_until(&mut stdout, "Done? (y/n): ");
    stdin.write_all(b"y\n").unwrap();
    drop(stdin);

    let status = wait_for_exit(&mut child).expect("gtd should finish after the countdown");
    assert!(status.success());
    assert!(stored_texts(temp.path(), "inbox").is_empty());
    assert_eq!(stored_texts(temp.path(), "completed_items"), ["reply to email"]);
}

#[test]
fn test_interrupt_after_countdown_aborts() {
    let temp = TempDir::new().unwrap();
    write_config_with_countdown(temp.path(), 1);
    gtd_ok(temp.path(), &["add", "reply to email"], "");

    let mut child = spawn_gtd(temp.path(), &["process"]);
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = child.stdout.take().unwrap();
    stdin.write_all(b"d\n\n").unwrap();
    read_until(&mut stdout, "Done? (y/n): ");

    send_sigint(&child);
    let status = wait_for_exit(&mut child).expect("Ctrl-C at a prompt should end gtd");
    assert_eq!(status.code(), Some(130));
    drop(stdin);
    assert_eq!(stored_texts(temp.path(), "inbox"), ["reply to email"]);
}
