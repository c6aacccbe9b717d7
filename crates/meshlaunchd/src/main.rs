//! meshlaunchd - runs the MeshCentral server
//!
//! Starts the server as a child process sharing this process's stdio, waits
//! for it to exit, reports the exit code, and exits with the same code.

mod exit;
mod signals;

use anyhow::{Context, Result};
use clap::Parser;
use meshlaunch_api::LaunchTarget;
use meshlaunch_core::{Console, Launcher};
use meshlaunch_host_unix::{UnixSpawner, signal_name};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::signals::SignalForwarder;

/// meshlaunchd - MeshCentral process launcher
#[derive(Parser, Debug)]
#[command(name = "meshlaunchd", version)]
#[command(about = "Runs the MeshCentral server and reports how it exited", long_about = None)]
struct Args {
    /// Diagnostic log level on stderr (RUST_LOG takes precedence)
    #[arg(short, long, env = "MESHLAUNCH_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging; stdout belongs to the console lines and the child
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "meshlaunchd starting");

    // Installed before the child exists so an early signal can't kill us
    let forwarder = SignalForwarder::install()?;

    let target = LaunchTarget::meshcentral();
    let mut launcher = Launcher::new(Arc::new(UnixSpawner::new()), Console::stdout());

    let handle = launcher
        .launch(&target)
        .await
        .with_context(|| format!("Failed to start {} server", target.name))?;

    let forwarding = handle.pid().map(|pid| forwarder.spawn(pid));

    let result = launcher
        .await_completion(handle)
        .await
        .with_context(|| format!("Lost track of {} server", target.name))?;

    if let Some(task) = forwarding {
        task.abort();
    }

    if let Some(sig) = result.signal {
        warn!(
            signal = sig,
            name = signal_name(sig).unwrap_or("unknown"),
            "{} terminated by signal",
            target.name
        );
    }

    Ok(ExitCode::from(exit::status_byte(&result)))
}
