//! Parent signal handling while the child runs

use anyhow::{Context, Result};
use meshlaunch_host_unix::send_signal;
use nix::sys::signal::Signal;
use tokio::signal::unix::{Signal as SignalStream, SignalKind, signal};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Keeps the parent alive through SIGTERM/SIGINT so it can report the exit
///
/// SIGTERM is forwarded to the child. SIGINT is not: the terminal already
/// delivers it to the whole foreground process group, child included.
pub struct SignalForwarder {
    sigterm: SignalStream,
    sigint: SignalStream,
}

impl SignalForwarder {
    pub fn install() -> Result<Self> {
        let sigterm =
            signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
        let sigint =
            signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;

        Ok(Self { sigterm, sigint })
    }

    /// Start relaying to `pid`; abort the task once the child is reaped
    pub fn spawn(self, pid: u32) -> JoinHandle<()> {
        let Self {
            mut sigterm,
            mut sigint,
        } = self;

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(()) = sigterm.recv() => {
                        info!(pid = pid, "SIGTERM received, forwarding to child");
                        if let Err(e) = send_signal(pid, Signal::SIGTERM) {
                            warn!(pid = pid, error = %e, "Failed to forward SIGTERM");
                        }
                    }
                    Some(()) = sigint.recv() => {
                        info!(pid = pid, "Interrupt received, waiting for child to exit");
                    }
                    else => break,
                }
            }
        })
    }
}
