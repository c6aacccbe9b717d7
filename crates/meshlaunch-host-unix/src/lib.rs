//! Unix process spawner for meshlaunch
//!
//! Provides:
//! - Process spawning with inherited, piped or discarded stdio
//! - Exit observation driven by the OS child notification
//! - Exit status conversion (exit code or terminating signal)
//! - Signal delivery to a running child

mod process;
mod signal;

pub use process::*;
pub use signal::*;
