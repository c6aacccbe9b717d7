//! Process spawning and exit observation

use async_trait::async_trait;
use meshlaunch_api::{IoMode, TerminationResult};
use meshlaunch_host_api::{HostError, HostResult, ProcessSpawner, SpawnRequest, SpawnedProcess};
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Spawns real operating-system processes
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixSpawner;

impl UnixSpawner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessSpawner for UnixSpawner {
    async fn spawn(&self, request: &SpawnRequest) -> HostResult<Box<dyn SpawnedProcess>> {
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args);
        configure_stdio(&mut cmd, request.io_mode);

        let mut child = cmd
            .spawn()
            .map_err(|e| classify_spawn_error(&request.program, e))?;

        let pid = child.id();

        let mut relays = Vec::new();
        if request.io_mode == IoMode::Pipe {
            if let Some(stdout) = child.stdout.take() {
                relays.push(relay_lines(stdout, pid, "stdout"));
            }
            if let Some(stderr) = child.stderr.take() {
                relays.push(relay_lines(stderr, pid, "stderr"));
            }
        }

        debug!(
            pid = ?pid,
            program = %request.program,
            io_mode = %request.io_mode,
            "Process spawned"
        );

        Ok(Box::new(UnixProcess {
            child,
            pid,
            program: request.program.clone(),
            relays,
        }))
    }
}

/// A child created by [`UnixSpawner`]
pub struct UnixProcess {
    child: Child,
    pid: Option<u32>,
    program: String,
    relays: Vec<JoinHandle<u64>>,
}

#[async_trait]
impl SpawnedProcess for UnixProcess {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    async fn wait(&mut self) -> HostResult<TerminationResult> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| HostError::WaitFailed(format!("{}: {}", self.program, e)))?;

        // Piped output is fully relayed before the exit is reported
        for relay in self.relays.drain(..) {
            match relay.await {
                Ok(lines) => debug!(pid = ?self.pid, lines = lines, "Output relay finished"),
                Err(e) => warn!(pid = ?self.pid, error = %e, "Output relay task failed"),
            }
        }

        let result = termination_from_status(status);
        debug!(pid = ?self.pid, status = ?result, "Process exited");

        Ok(result)
    }
}

/// Convert a raw exit status into a [`TerminationResult`]
pub fn termination_from_status(status: std::process::ExitStatus) -> TerminationResult {
    if let Some(code) = status.code() {
        TerminationResult::with_code(code)
    } else if let Some(sig) = status.signal() {
        TerminationResult::signaled(sig)
    } else {
        TerminationResult::abnormal()
    }
}

fn configure_stdio(cmd: &mut Command, io_mode: IoMode) {
    match io_mode {
        IoMode::Inherit => {
            cmd.stdin(Stdio::inherit());
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        }
        IoMode::Pipe => {
            cmd.stdin(Stdio::null());
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        }
        IoMode::Discard => {
            cmd.stdin(Stdio::null());
            cmd.stdout(Stdio::null());
            cmd.stderr(Stdio::null());
        }
    }
}

fn classify_spawn_error(program: &str, err: io::Error) -> HostError {
    match err.kind() {
        io::ErrorKind::NotFound => HostError::NotFound(program.to_string()),
        io::ErrorKind::PermissionDenied => HostError::PermissionDenied(program.to_string()),
        _ => HostError::SpawnFailed(format!("{}: {}", program, err)),
    }
}

/// Log each line of `reader` until EOF; returns the number of lines relayed
///
/// Lines need not be UTF-8. The read end is held open until EOF even after a
/// read error, so the child never writes into a closed pipe.
fn relay_lines<R>(reader: R, pid: Option<u32>, stream: &'static str) -> JoinHandle<u64>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        let mut relayed = 0;
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\n', '\r']);
                    info!(pid = ?pid, stream, "{}", line);
                    relayed += 1;
                }
                Err(e) => {
                    warn!(pid = ?pid, stream, error = %e, "Failed to read child output, discarding the rest");
                    if let Err(e) = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await {
                        warn!(pid = ?pid, stream, error = %e, "Failed to drain child output");
                    }
                    break;
                }
            }
        }
        relayed
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    fn sh(script: &str, io_mode: IoMode) -> SpawnRequest {
        SpawnRequest::new("sh", vec!["-c".into(), script.into()], io_mode)
    }

    #[tokio::test]
    async fn spawn_simple_process() {
        let request = SpawnRequest::new("true", vec![], IoMode::Discard);

        let mut proc = UnixSpawner::new().spawn(&request).await.unwrap();
        assert!(proc.pid().is_some());

        let status = proc.wait().await.unwrap();
        assert!(status.is_success());
    }

    #[tokio::test]
    async fn exit_codes_are_reported_verbatim() {
        for code in [0, 1, 2, 255] {
            let request = sh(&format!("exit {}", code), IoMode::Discard);
            let mut proc = UnixSpawner::new().spawn(&request).await.unwrap();

            let status = proc.wait().await.unwrap();
            assert_eq!(status, TerminationResult::with_code(code));
        }
    }

    #[tokio::test]
    async fn arguments_are_passed_verbatim() {
        let request = SpawnRequest::new(
            "sh",
            vec![
                "-c".into(),
                r#"[ "$1" = "two words" ] && [ "$2" = "*" ]"#.into(),
                "sh".into(),
                "two words".into(),
                "*".into(),
            ],
            IoMode::Discard,
        );

        let mut proc = UnixSpawner::new().spawn(&request).await.unwrap();
        assert!(proc.wait().await.unwrap().is_success());
    }

    #[tokio::test]
    async fn piped_output_is_drained_before_exit() {
        let request = sh("echo out; echo err >&2; exit 4", IoMode::Pipe);

        let mut proc = UnixSpawner::new().spawn(&request).await.unwrap();
        let status = proc.wait().await.unwrap();

        assert_eq!(status, TerminationResult::with_code(4));
    }

    #[tokio::test]
    async fn non_utf8_output_does_not_kill_piped_child() {
        let script = r#"printf '\377\n'; sleep 0.3; i=0; while [ $i -lt 20000 ]; do echo "line $i"; i=$((i+1)); done; exit 0"#;
        let request = sh(script, IoMode::Pipe);

        let mut proc = UnixSpawner::new().spawn(&request).await.unwrap();
        let status = proc.wait().await.unwrap();

        assert_eq!(status, TerminationResult::with_code(0));
    }

    #[tokio::test]
    async fn relay_counts_every_line() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let relay = relay_lines(reader, None, "stdout");

        writer.write_all(b"first\n\xff\xfe\nno newline at end").await.unwrap();
        drop(writer);

        assert_eq!(relay.await.unwrap(), 3);
    }

    #[tokio::test]
    async fn missing_executable_is_not_found() {
        let request = SpawnRequest::new(
            "meshlaunch-definitely-missing-binary",
            vec![],
            IoMode::Discard,
        );

        let result = UnixSpawner::new().spawn(&request).await;
        assert!(matches!(result, Err(HostError::NotFound(_))));
    }

    #[tokio::test]
    async fn non_executable_file_is_permission_denied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-executable");
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();

        let request = SpawnRequest::new(path.to_string_lossy(), vec![], IoMode::Discard);

        let result = UnixSpawner::new().spawn(&request).await;
        assert!(matches!(result, Err(HostError::PermissionDenied(_))));
    }

    #[test]
    fn status_conversion() {
        let exited = std::process::ExitStatus::from_raw(3 << 8);
        assert_eq!(termination_from_status(exited), TerminationResult::with_code(3));

        let killed = std::process::ExitStatus::from_raw(9);
        assert_eq!(termination_from_status(killed), TerminationResult::signaled(9));
    }
}
