//! Core value types

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a child's standard streams are connected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IoMode {
    /// Child shares the parent's stdin, stdout and stderr
    #[default]
    Inherit,
    /// stdout/stderr are captured and relayed into the log, stdin is closed
    Pipe,
    /// All three streams go to the null device
    Discard,
}

impl IoMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IoMode::Inherit => "inherit",
            IoMode::Pipe => "pipe",
            IoMode::Discard => "discard",
        }
    }
}

impl fmt::Display for IoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a child process ended
///
/// Produced once, when the operating system reports the exit. A normal exit
/// carries a code; a signal-terminated child carries the signal instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationResult {
    /// Exit code if the process exited normally
    pub code: Option<i32>,

    /// Signal number if the process was killed by one (Unix)
    pub signal: Option<i32>,
}

impl TerminationResult {
    pub fn success() -> Self {
        Self::with_code(0)
    }

    pub fn with_code(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn signaled(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    /// Terminated with neither an exit code nor a known signal
    pub fn abnormal() -> Self {
        Self {
            code: None,
            signal: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// True when there is no numeric exit code
    pub fn is_abnormal(&self) -> bool {
        self.code.is_none()
    }
}

impl fmt::Display for TerminationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "{}", code),
            (None, Some(signal)) => write!(f, "null (signal {})", signal),
            (None, None) => f.write_str("null"),
        }
    }
}

/// Lifecycle of the launcher's single child
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LauncherState {
    #[default]
    NotStarted,
    Running,
    Terminated,
    LaunchFailed,
    /// The child was started but its exit could not be observed
    WaitFailed,
}

impl LauncherState {
    /// No further transitions are possible
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            LauncherState::Terminated | LauncherState::LaunchFailed | LauncherState::WaitFailed
        )
    }
}
