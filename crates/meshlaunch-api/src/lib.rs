//! Shared types for meshlaunch
//!
//! This crate defines the values passed between the launcher core and the
//! host spawners:
//! - Launch targets and stdio modes
//! - Termination results
//! - Launcher lifecycle state

mod target;
mod types;

pub use target::*;
pub use types::*;
