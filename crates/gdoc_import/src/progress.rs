use std::io::{self, Stdout, Write};
use std::sync::Mutex;

use gdoc_engine::{ImportEvent, ProgressSink};
use import_logging::import_warn;

/// Writes progress notices one line per event, to stdout by default.
///
/// Logs go to stderr, so each notice appears once on stdout.
#[derive(Debug)]
pub struct ConsoleProgress<W = Stdout> {
    out: Mutex<W>,
}

impl ConsoleProgress<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> ProgressSink for ConsoleProgress<W> {
    fn emit(&self, event: ImportEvent) {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(err) = writeln!(out, "{event}").and_then(|()| out.flush()) {
            import_warn!("Could not write progress notice: {}", err);
        }
    }
}
