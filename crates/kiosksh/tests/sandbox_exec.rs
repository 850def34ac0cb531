//! Integration tests for sandboxed process execution.
//!
//! These spawn real processes (echo, pwd, env, sleep, seq) and therefore
//! assume a Unix userland; the library's own unit tests stay
//! process-free.

#![cfg(unix)]

use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use kiosksh::{CommandSandbox, ExecLimits, TIMEOUT_EXIT_CODE};
use serial_test::serial;

/// Serializes tests that mutate the process environment via set_var.
/// Process env is global state; concurrent mutation is UB.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn sandbox_in(dir: &Path) -> CommandSandbox {
    CommandSandbox::new(dir, ExecLimits::default()).expect("sandbox root")
}

fn argv(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_captures_stdout_and_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_in(dir.path());

    let out = sandbox.run(&argv(&["echo", "hello"])).await;
    assert_eq!(out.exit_code, 0);
    assert_eq!(out.stdout, "hello\n");
    assert_eq!(out.stderr, "");
}

#[tokio::test]
async fn test_metacharacters_reach_child_as_literal_argv() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_in(dir.path());

    // No shell is involved, so nothing interprets these
    let out = sandbox.run(&argv(&["echo", "a;b | c > d $(rm)"])).await;
    assert_eq!(out.exit_code, 0);
    assert_eq!(out.stdout, "a;b | c > d $(rm)\n");
}

#[tokio::test]
async fn test_child_runs_in_session_working_dir() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_in(dir.path());

    let out = sandbox.run(&argv(&["pwd"])).await;
    assert_eq!(out.exit_code, 0);
    assert_eq!(
        out.stdout.trim_end(),
        sandbox.working_dir().to_string_lossy()
    );
}

#[tokio::test]
async fn test_spawn_failure_is_reported_not_thrown() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_in(dir.path());

    let out = sandbox.run(&argv(&["kiosksh-no-such-binary"])).await;
    assert_eq!(out.exit_code, 1);
    assert!(out.stdout.is_empty());
    assert!(out.stderr.contains("failed to start kiosksh-no-such-binary"));
}

#[tokio::test]
async fn test_empty_argv_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_in(dir.path());

    let out = sandbox.run(&[]).await;
    assert_eq!(out.exit_code, 1);
    assert_eq!(out.stderr, "empty command");
}

#[tokio::test]
async fn test_timeout_kills_child_and_reports_124() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_in(dir.path());

    let started = Instant::now();
    let out = sandbox
        .execute(&argv(&["sleep", "30"]), Duration::from_secs(1))
        .await;
    let elapsed = started.elapsed();

    assert_eq!(out.exit_code, TIMEOUT_EXIT_CODE);
    assert!(out.stderr.contains("timed out after 1s"), "{}", out.stderr);
    // Hard deadline: well under the child's sleep, just past the timeout
    assert!(elapsed < Duration::from_secs(5), "hung for {elapsed:?}");
}

#[tokio::test]
async fn test_output_is_capped_at_limit() {
    let dir = tempfile::tempdir().unwrap();
    let limits = ExecLimits::new().max_output_bytes(128);
    let sandbox = CommandSandbox::new(dir.path(), limits).unwrap();

    let out = sandbox.run(&argv(&["seq", "1", "10000"])).await;
    assert_eq!(out.exit_code, 0);
    assert!(out.stdout.contains("[output truncated"), "not truncated");
    assert!(out.stdout.len() < 1024);
}

#[tokio::test]
#[serial]
async fn test_parent_secrets_never_reach_children() {
    let _guard = ENV_LOCK.lock().unwrap();

    // SAFETY: ENV_LOCK plus #[serial] keep env mutation single-threaded,
    // and no other test touches this key.
    unsafe {
        std::env::set_var("KIOSK_TEST_SECRET", "hunter2");
    }

    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_in(dir.path());
    let out = sandbox.run(&argv(&["env"])).await;

    unsafe {
        std::env::remove_var("KIOSK_TEST_SECRET");
    }

    assert_eq!(out.exit_code, 0);
    assert!(
        !out.stdout.contains("hunter2"),
        "secret leaked into child environment"
    );
}

#[tokio::test]
#[serial]
async fn test_restricted_env_reaches_children() {
    let _guard = ENV_LOCK.lock().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_in(dir.path());
    let out = sandbox.run(&argv(&["env"])).await;

    assert_eq!(out.exit_code, 0);
    assert!(out.stdout.contains("KIOSK_SHELL=1"), "marker missing");
    assert!(
        out.stdout
            .contains("PATH=/usr/local/bin:/usr/bin:/bin"),
        "restricted PATH missing"
    );
    let home = format!("HOME={}", sandbox.root().display());
    assert!(out.stdout.contains(&home), "HOME not pinned to session root");
}
