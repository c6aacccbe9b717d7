//! Launch target definitions

use serde::{Deserialize, Serialize};

use crate::IoMode;

/// Display name of the wrapped server
pub const MESHCENTRAL_NAME: &str = "MeshCentral";

/// Interpreter used to run the wrapped server
pub const MESHCENTRAL_COMMAND: &str = "node";

/// Module path handed to the interpreter
pub const MESHCENTRAL_MODULE: &str = "node_modules/meshcentral";

/// A program the launcher knows how to start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchTarget {
    /// Human-readable name used in console lines
    pub name: String,

    /// Executable name or path, resolved through PATH when bare
    pub command: String,

    /// Arguments passed verbatim to the child
    #[serde(default)]
    pub args: Vec<String>,

    /// How the child's stdio is wired
    #[serde(default)]
    pub io_mode: IoMode,
}

impl LaunchTarget {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            io_mode: IoMode::Inherit,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn io_mode(mut self, io_mode: IoMode) -> Self {
        self.io_mode = io_mode;
        self
    }

    /// The MeshCentral server run through node with the parent's stdio
    pub fn meshcentral() -> Self {
        Self::new(MESHCENTRAL_NAME, MESHCENTRAL_COMMAND).arg(MESHCENTRAL_MODULE)
    }
}

impl Default for LaunchTarget {
    fn default() -> Self {
        Self::meshcentral()
    }
}
