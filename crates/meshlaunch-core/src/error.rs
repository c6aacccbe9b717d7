//! Error types for the launcher

use meshlaunch_host_api::HostError;
use thiserror::Error;

/// Failures of the launcher itself
///
/// A child exiting non-zero or being killed is not one of these.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Failed to launch {program}")]
    LaunchFailure {
        program: String,
        #[source]
        source: HostError,
    },

    #[error("A child process was already launched")]
    AlreadyLaunched,

    #[error("Failed to observe termination of {program}")]
    WaitFailed {
        program: String,
        #[source]
        source: HostError,
    },
}

pub type LaunchResult<T> = Result<T, LaunchError>;
