//! Signal delivery to a running child

use meshlaunch_host_api::{HostError, HostResult};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::debug;

/// Send `signal` to a single process
///
/// A process that is already gone is not an error.
pub fn send_signal(pid: u32, signal: Signal) -> HostResult<()> {
    let raw = i32::try_from(pid)
        .map_err(|_| HostError::SignalFailed(format!("pid {} out of range", pid)))?;

    match signal::kill(Pid::from_raw(raw), signal) {
        Ok(()) => {
            debug!(pid = pid, signal = signal.as_str(), "Sent signal to child");
            Ok(())
        }
        Err(Errno::ESRCH) => {
            // Process already gone
            Ok(())
        }
        Err(e) => Err(HostError::SignalFailed(format!(
            "Failed to send {} to {}: {}",
            signal.as_str(),
            pid,
            e
        ))),
    }
}

/// Symbolic name for a raw signal number, e.g. `SIGTERM` for 15
pub fn signal_name(signal: i32) -> Option<&'static str> {
    Signal::try_from(signal).ok().map(Signal::as_str)
}
