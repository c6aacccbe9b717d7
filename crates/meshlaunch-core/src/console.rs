//! Console output sink

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Where the launcher writes its human-readable lines
///
/// Every line is flushed as soon as it is written so it lands in order with
/// whatever the child writes to the same stream.
pub struct Console {
    out: Box<dyn Write + Send>,
}

impl Console {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self { out: Box::new(out) }
    }

    /// The parent's standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// An in-memory console plus a reader for its contents
    pub fn capture() -> (Self, CapturedConsole) {
        let captured = CapturedConsole::default();
        let console = Self::new(SharedWriter(captured.buf.clone()));
        (console, captured)
    }

    /// Write one line and flush
    pub fn line(&mut self, message: impl fmt::Display) -> io::Result<()> {
        writeln!(self.out, "{}", message)?;
        self.out.flush()
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

/// Read side of [`Console::capture`]
#[derive(Debug, Clone, Default)]
pub struct CapturedConsole {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CapturedConsole {
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl Write for SharedWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self
            .0
            .lock()
            .map_err(|_| io::Error::other("console buffer poisoned"))?;
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
