//! Mock spawner for testing

use async_trait::async_trait;
use meshlaunch_api::TerminationResult;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{HostError, HostResult, ProcessSpawner, SpawnRequest, SpawnedProcess};

/// Kinds of spawn failure the mock can be told to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    NotFound,
    PermissionDenied,
    Other,
}

impl MockFailure {
    fn into_error(self, program: &str) -> HostError {
        match self {
            MockFailure::NotFound => HostError::NotFound(program.to_string()),
            MockFailure::PermissionDenied => HostError::PermissionDenied(program.to_string()),
            MockFailure::Other => HostError::SpawnFailed(format!("Mock spawn failure: {}", program)),
        }
    }
}

/// Scripted spawner for unit/integration testing
pub struct MockSpawner {
    next_pid: AtomicU32,
    requests: Arc<Mutex<Vec<SpawnRequest>>>,

    /// Configure spawn to fail
    pub fail_spawn: Arc<Mutex<Option<MockFailure>>>,

    /// Status every spawned process reports on exit
    pub exit_status: Arc<Mutex<TerminationResult>>,

    /// How long a spawned process "runs" before exiting
    pub exit_delay: Arc<Mutex<Option<Duration>>>,

    /// Configure wait to fail
    pub fail_wait: Arc<Mutex<bool>>,
}

impl MockSpawner {
    pub fn new() -> Self {
        Self {
            next_pid: AtomicU32::new(1000),
            requests: Arc::new(Mutex::new(Vec::new())),
            fail_spawn: Arc::new(Mutex::new(None)),
            exit_status: Arc::new(Mutex::new(TerminationResult::success())),
            exit_delay: Arc::new(Mutex::new(None)),
            fail_wait: Arc::new(Mutex::new(false)),
        }
    }

    /// Every spawned process exits with `status`
    pub fn exiting_with(status: TerminationResult) -> Self {
        let spawner = Self::new();
        *spawner.exit_status.lock().unwrap() = status;
        spawner
    }

    /// Every spawn attempt fails
    pub fn failing(failure: MockFailure) -> Self {
        let spawner = Self::new();
        *spawner.fail_spawn.lock().unwrap() = Some(failure);
        spawner
    }

    pub fn set_exit_delay(&self, delay: Option<Duration>) {
        *self.exit_delay.lock().unwrap() = delay;
    }

    /// Requests seen so far, including failed ones
    pub fn requests(&self) -> Vec<SpawnRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockSpawner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessSpawner for MockSpawner {
    async fn spawn(&self, request: &SpawnRequest) -> HostResult<Box<dyn SpawnedProcess>> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(failure) = *self.fail_spawn.lock().unwrap() {
            return Err(failure.into_error(&request.program));
        }

        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MockProcess {
            pid,
            status: *self.exit_status.lock().unwrap(),
            delay: *self.exit_delay.lock().unwrap(),
            fail_wait: *self.fail_wait.lock().unwrap(),
            reaped: false,
        }))
    }
}

/// Process produced by [`MockSpawner`]
#[derive(Debug)]
pub struct MockProcess {
    pid: u32,
    status: TerminationResult,
    delay: Option<Duration>,
    fail_wait: bool,
    reaped: bool,
}

#[async_trait]
impl SpawnedProcess for MockProcess {
    fn pid(&self) -> Option<u32> {
        Some(self.pid)
    }

    async fn wait(&mut self) -> HostResult<TerminationResult> {
        if self.reaped {
            return Err(HostError::WaitFailed(format!("pid {} already reaped", self.pid)));
        }

        if self.fail_wait {
            return Err(HostError::WaitFailed(format!("Mock wait failure for pid {}", self.pid)));
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.reaped = true;
        Ok(self.status)
    }
}
