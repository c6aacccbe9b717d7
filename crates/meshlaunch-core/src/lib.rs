//! Process launcher core for meshlaunch
//!
//! This crate owns the lifecycle of the single wrapped child:
//! - Launch state machine (NotStarted -> Running -> Terminated)
//! - Console reporting through an injected output sink
//! - Launch and observation errors

mod console;
mod error;
mod launcher;

pub use console::*;
pub use error::*;
pub use launcher::*;
