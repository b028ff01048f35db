#![allow(clippy::unwrap_used, clippy::expect_used)]

//! The required-lookup failures end the process, so each one runs in a child
//! copy of this test binary and the parent inspects its exit status and output.

use std::process::{Command, ExitStatus, Output};

const CHILD_ENV: &str = "TYPEMETA_FATAL_CHILD";
const LOGGED_LINE: &str = r#"typemeta: missing metadata key "missing" for type User"#;
const MISSING_KEY_MESSAGE: &str = r#"typemeta: key "missing" not found for type User"#;
const SURVIVED_MARKER: &str = "child process kept running";

struct User;

fn is_child() -> bool {
    std::env::var_os(CHILD_ENV).is_some()
}

fn run_child(test_name: &str) -> Output {
    Command::new(std::env::current_exe().expect("test binary path"))
        .args(["--exact", test_name, "--nocapture"])
        .env(CHILD_ENV, "1")
        .output()
        .expect("child test process runs")
}

/// Diagnostic lines printed by the child, with any test-harness prefix removed.
fn typemeta_lines(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter_map(|line| line.find("typemeta: ").map(|i| line[i..].to_owned()))
        .collect()
}

#[cfg(unix)]
fn assert_aborted(status: ExitStatus) {
    use std::os::unix::process::ExitStatusExt;
    assert_eq!(
        status.signal(),
        Some(6),
        "child must die from SIGABRT, got: {status}"
    );
}

#[cfg(not(unix))]
fn assert_aborted(status: ExitStatus) {
    assert!(!status.success(), "child must not exit cleanly, got: {status}");
}

fn assert_terminated(output: &Output) {
    assert_aborted(output.status);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        !stdout.contains(SURVIVED_MARKER),
        "process outlived the fatal lookup: {stdout}"
    );
}

#[test]
fn child_require_lookup_missing() {
    if !is_child() {
        return;
    }
    typemeta::register::<User>("table", "user");
    let _value = typemeta::require_lookup::<User>("missing");
    println!("{SURVIVED_MARKER}");
}

#[test]
fn child_require_lookup_logged_missing() {
    if !is_child() {
        return;
    }
    typemeta::register::<User>("table", "user");
    let _value = typemeta::require_lookup_logged::<User>("missing");
    println!("{SURVIVED_MARKER}");
}

#[test]
fn child_require_lookup_missing_on_worker_thread() {
    if !is_child() {
        return;
    }
    let worker = std::thread::spawn(|| typemeta::require_lookup::<User>("missing"));
    let _joined = worker.join();
    println!("{SURVIVED_MARKER}");
}

#[test]
fn child_require_lookup_logged_missing_under_catch_unwind() {
    if !is_child() {
        return;
    }
    let _caught = std::panic::catch_unwind(|| typemeta::require_lookup_logged::<User>("missing"));
    println!("{SURVIVED_MARKER}");
}

#[test]
fn child_require_lookup_logged_present() {
    if !is_child() {
        return;
    }
    typemeta::register::<User>("table", "user");
    assert_eq!(typemeta::require_lookup_logged::<User>("table"), "user");
}

#[test]
fn require_lookup_terminates_the_process() {
    if is_child() {
        return;
    }
    let output = run_child("child_require_lookup_missing");

    assert_terminated(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains(MISSING_KEY_MESSAGE),
        "expected missing-key message, got: {stderr}"
    );
    assert!(
        typemeta_lines(&output.stdout).is_empty(),
        "plain require_lookup must not print to stdout"
    );
}

#[test]
fn require_lookup_logged_prints_then_terminates() {
    if is_child() {
        return;
    }
    let output = run_child("child_require_lookup_logged_missing");

    assert_terminated(&output);
    assert_eq!(typemeta_lines(&output.stdout), vec![LOGGED_LINE.to_owned()]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains(typemeta::LOGGED_EXIT_MESSAGE),
        "expected exit message, got: {stderr}"
    );
}

#[test]
fn require_lookup_on_worker_thread_terminates_the_process() {
    if is_child() {
        return;
    }
    let output = run_child("child_require_lookup_missing_on_worker_thread");

    assert_terminated(&output);
    assert!(String::from_utf8_lossy(&output.stderr).contains(MISSING_KEY_MESSAGE));
}

#[test]
fn require_lookup_logged_cannot_be_caught() {
    if is_child() {
        return;
    }
    let output = run_child("child_require_lookup_logged_missing_under_catch_unwind");

    assert_terminated(&output);
    assert_eq!(typemeta_lines(&output.stdout), vec![LOGGED_LINE.to_owned()]);
}

#[test]
fn require_lookup_logged_is_silent_when_present() {
    if is_child() {
        return;
    }
    let output = run_child("child_require_lookup_logged_present");

    assert!(output.status.success());
    assert!(typemeta_lines(&output.stdout).is_empty());
}
