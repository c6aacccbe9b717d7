//! Spawner traits

use async_trait::async_trait;
use meshlaunch_api::{IoMode, LaunchTarget, TerminationResult};
use thiserror::Error;

/// Errors from spawning or observing a process
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Executable not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Wait failed: {0}")]
    WaitFailed(String),

    #[error("Signal delivery failed: {0}")]
    SignalFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type HostResult<T> = Result<T, HostError>;

/// Everything a spawner needs to create one process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    pub program: String,
    pub args: Vec<String>,
    pub io_mode: IoMode,
}

impl SpawnRequest {
    pub fn new(program: impl Into<String>, args: Vec<String>, io_mode: IoMode) -> Self {
        Self {
            program: program.into(),
            args,
            io_mode,
        }
    }
}

impl From<&LaunchTarget> for SpawnRequest {
    fn from(target: &LaunchTarget) -> Self {
        Self::new(target.command.clone(), target.args.clone(), target.io_mode)
    }
}

/// A process that has been created and not yet reaped
#[async_trait]
pub trait SpawnedProcess: Send {
    /// OS process ID, if the platform has one
    fn pid(&self) -> Option<u32>;

    /// Wait until the operating system reports the process has exited
    async fn wait(&mut self) -> HostResult<TerminationResult>;
}

/// Creates processes - implemented by platform-specific spawners
#[async_trait]
pub trait ProcessSpawner: Send + Sync {
    async fn spawn(&self, request: &SpawnRequest) -> HostResult<Box<dyn SpawnedProcess>>;
}
