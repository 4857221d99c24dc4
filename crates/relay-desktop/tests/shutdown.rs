//! Process-level shutdown: the daemon must exit on SIGINT even while its
//! console is still waiting for a line on an open stdin.

#![cfg(unix)]

use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

fn spawn_daemon() -> Child {
    let config = std::env::temp_dir().join(format!(
        "relay-desktop-shutdown-{}.toml",
        std::process::id()
    ));
    Command::new(env!("CARGO_BIN_EXE_relay-desktop"))
        .args([
            "--config",
            config.to_str().unwrap(),
            "--dry-run",
            "--bind",
            "127.0.0.1",
            "--session-port",
            "0",
            "--discovery-port",
            "0",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("daemon binary starts")
}

fn wait_with_deadline(child: &mut Child, limit: Duration) -> Option<ExitStatus> {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait().expect("try_wait") {
            return Some(status);
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    None
}

#[test]
fn test_sigint_stops_daemon_while_stdin_stays_open() {
    // Arrange – keep the write end of stdin open for the whole test
    let mut child = spawn_daemon();
    let _stdin = child.stdin.take();
    std::thread::sleep(Duration::from_millis(800));

    // Act
    let sent = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("kill runs");
    let status = wait_with_deadline(&mut child, Duration::from_secs(5));
    if status.is_none() {
        let _ = child.kill();
        let _ = child.wait();
    }

    // Assert
    assert!(sent.success());
    let status = status.expect("daemon must exit within 5s of SIGINT");
    assert!(status.success(), "daemon exited with {status}");
}

#[test]
fn test_closed_stdin_does_not_stop_daemon() {
    // Arrange
    let mut child = spawn_daemon();

    // Act – EOF on stdin only ends the console
    drop(child.stdin.take());
    let early = wait_with_deadline(&mut child, Duration::from_millis(800));
    let _ = child.kill();
    let _ = child.wait();

    // Assert
    assert!(early.is_none(), "daemon exited on stdin EOF: {early:?}");
}
