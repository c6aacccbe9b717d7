//! End-to-end tests for the meshlaunchd binary
//!
//! Each test puts a stand-in `node` script first on PATH, so the binary runs
//! its real Inherit-mode path without a MeshCentral install.

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::fs;
use std::io::{BufRead, BufReader};
use std::os::unix::fs::PermissionsExt;
use std::process::{Command, Stdio};
use tempfile::TempDir;

const LAUNCHER: &str = env!("CARGO_BIN_EXE_meshlaunchd");

/// A directory holding an executable `node` that runs `script`
fn fake_node(script: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("node");
    fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    dir
}

fn launcher(path: &str) -> Command {
    let mut cmd = Command::new(LAUNCHER);
    cmd.env("PATH", path)
        .env_remove("RUST_LOG")
        .env_remove("MESHLAUNCH_LOG_LEVEL");
    cmd
}

#[test]
fn test_child_output_passes_through_and_code_is_mirrored() {
    let dir = fake_node(r#"echo "node ran with $1"; echo "to stderr" >&2; exit 3"#);

    let output = launcher(&dir.path().to_string_lossy()).output().unwrap();

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.first(), Some(&"Starting MeshCentral server..."));
    assert_eq!(lines.last(), Some(&"MeshCentral process exited with code 3"));

    let child_line = lines
        .iter()
        .position(|l| *l == "node ran with node_modules/meshcentral")
        .expect("child output missing from stdout");
    assert!(child_line > 0 && child_line < lines.len() - 1);
    assert!(lines.contains(&"MeshCentral server is running."));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.lines().any(|l| l == "to stderr"));

    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_missing_node_fails_launch() {
    let empty = tempfile::tempdir().unwrap();

    let output = launcher(&empty.path().to_string_lossy()).output().unwrap();

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout, "Starting MeshCentral server...\n");
    assert!(!stdout.contains("exited with code"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to start MeshCentral server"));
    assert!(stderr.contains("node"));
}

#[test]
fn test_sigterm_is_forwarded_to_child() {
    let dir = fake_node("exec sleep 30");
    let path = format!("{}:/usr/bin:/bin", dir.path().display());

    let mut child = launcher(&path)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let stdout = child.stdout.take().unwrap();
    let mut lines = BufReader::new(stdout).lines();

    let mut seen = Vec::new();
    for line in lines.by_ref() {
        let line = line.unwrap();
        let running = line == "MeshCentral server is running.";
        seen.push(line);
        if running {
            break;
        }
    }
    assert_eq!(seen.last().map(String::as_str), Some("MeshCentral server is running."));

    let pid = Pid::from_raw(i32::try_from(child.id()).unwrap());
    kill(pid, Signal::SIGTERM).unwrap();

    seen.extend(lines.map(Result::unwrap));
    let status = child.wait().unwrap();

    assert_eq!(
        seen.last().map(String::as_str),
        Some("MeshCentral process exited with code null (signal 15)")
    );
    assert_eq!(
        seen.iter().filter(|l| l.contains("exited with code")).count(),
        1
    );
    assert_eq!(status.code(), Some(143));
}
