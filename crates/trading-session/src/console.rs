//! Operator-facing output.

use std::fmt::Display;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Shared, line-atomic writer for prompts and answers.
///
/// Clones write to the same sink, so output from background tasks never
/// tears a line written by the control loop.
#[derive(Clone)]
pub struct Console {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Console {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Write one line.
    pub fn println(&self, line: impl Display) {
        let mut out = self.out.lock().unwrap();
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            debug!(error = %e, "console write failed");
        }
    }

    /// Write a prompt without a line break.
    pub fn prompt(&self, text: &str) {
        let mut out = self.out.lock().unwrap();
        if let Err(e) = write!(out, "{text}").and_then(|_| out.flush()) {
            debug!(error = %e, "console write failed");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// In-memory sink for inspecting console output.
    #[derive(Clone, Default)]
    pub(crate) struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    pub(crate) fn capture() -> (Console, Capture) {
        let capture = Capture::default();
        (Console::new(capture.clone()), capture)
    }

    #[test]
    fn test_clones_share_sink() {
        let (console, capture) = capture();
        let other = console.clone();

        console.prompt("> ");
        other.println("hello");
        console.println(42);

        assert_eq!(capture.contents(), "> hello\n42\n");
    }
}
