//! Process spawning interfaces for meshlaunch
//!
//! This crate defines the seam between the launcher core and the
//! platform that actually creates processes. It contains no platform code
//! itself, plus a scripted mock for tests.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;
