//! Child process lifecycle

use meshlaunch_api::{LaunchTarget, LauncherState, TerminationResult};
use meshlaunch_host_api::{ProcessSpawner, SpawnRequest, SpawnedProcess};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{Console, LaunchError, LaunchResult};

/// A child started by [`Launcher::launch`]
///
/// Handing it to [`Launcher::await_completion`] consumes it, so the
/// termination of a given child is observed exactly once.
pub struct ChildProcessHandle {
    name: String,
    program: String,
    pid: Option<u32>,
    process: Box<dyn SpawnedProcess>,
}

impl ChildProcessHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }
}

impl fmt::Debug for ChildProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildProcessHandle")
            .field("name", &self.name)
            .field("program", &self.program)
            .field("pid", &self.pid)
            .finish_non_exhaustive()
    }
}

/// Starts one child, waits for it, and reports the outcome on its console
pub struct Launcher {
    spawner: Arc<dyn ProcessSpawner>,
    console: Console,
    state: LauncherState,
}

impl Launcher {
    pub fn new(spawner: Arc<dyn ProcessSpawner>, console: Console) -> Self {
        Self {
            spawner,
            console,
            state: LauncherState::NotStarted,
        }
    }

    pub fn state(&self) -> LauncherState {
        self.state
    }

    /// Start `target`
    ///
    /// Only the first call on a launcher may spawn; later calls fail with
    /// [`LaunchError::AlreadyLaunched`].
    pub async fn launch(&mut self, target: &LaunchTarget) -> LaunchResult<ChildProcessHandle> {
        if self.state != LauncherState::NotStarted {
            return Err(LaunchError::AlreadyLaunched);
        }

        self.announce(format_args!("Starting {} server...", target.name));

        let request = SpawnRequest::from(target);
        let process = match self.spawner.spawn(&request).await {
            Ok(process) => process,
            Err(source) => {
                self.state = LauncherState::LaunchFailed;
                error!(
                    name = %target.name,
                    program = %request.program,
                    error = %source,
                    "Launch failed"
                );
                return Err(LaunchError::LaunchFailure {
                    program: request.program,
                    source,
                });
            }
        };

        self.state = LauncherState::Running;
        let pid = process.pid();

        info!(
            name = %target.name,
            program = %request.program,
            pid = ?pid,
            io_mode = %request.io_mode,
            "Child process running"
        );
        self.announce(format_args!("{} server is running.", target.name));

        Ok(ChildProcessHandle {
            name: target.name.clone(),
            program: request.program,
            pid,
            process,
        })
    }

    /// Wait for the child to terminate and report how it ended
    ///
    /// A non-zero exit code or a terminating signal is a normal outcome, not
    /// an error. If the exit cannot be observed the launcher ends in
    /// [`LauncherState::WaitFailed`] and no exit line is written.
    pub async fn await_completion(
        &mut self,
        handle: ChildProcessHandle,
    ) -> LaunchResult<TerminationResult> {
        let ChildProcessHandle {
            name,
            program,
            pid,
            mut process,
        } = handle;

        let result = match process.wait().await {
            Ok(result) => result,
            Err(source) => {
                self.state = LauncherState::WaitFailed;
                error!(name = %name, pid = ?pid, error = %source, "Lost track of child process");
                return Err(LaunchError::WaitFailed { program, source });
            }
        };

        self.state = LauncherState::Terminated;

        info!(
            name = %name,
            pid = ?pid,
            code = ?result.code,
            signal = ?result.signal,
            "Child process terminated"
        );
        self.announce(format_args!("{} process exited with code {}", name, result));

        Ok(result)
    }

    /// Console failures never interrupt the child's lifecycle
    fn announce(&mut self, message: fmt::Arguments<'_>) {
        if let Err(e) = self.console.line(message) {
            warn!(error = %e, "Failed to write console line");
        }
    }
}
