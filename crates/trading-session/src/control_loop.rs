//! Foreground read-eval loop.

use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::command::{CommandRegistry, Dispatch};
use crate::error::RegistryError;
use crate::session::{session_commands, Session, MAIN_PROMPT};

/// Termination request delivered from outside the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl std::fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownSignal::Interrupt => write!(f, "SIGINT"),
            ShutdownSignal::Terminate => write!(f, "SIGTERM"),
        }
    }
}

enum Input {
    Line(String),
    Closed,
    Signalled,
}

/// Line reader that tolerates bytes which are not UTF-8.
///
/// Partial lines survive a cancelled read, so it is safe inside `select!`.
struct LineReader<R> {
    input: R,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    fn new(input: R) -> Self {
        Self {
            input,
            buf: Vec::new(),
        }
    }

    async fn next_line(&mut self) -> io::Result<Option<String>> {
        let read = self.input.read_until(b'\n', &mut self.buf).await?;
        if read == 0 && self.buf.is_empty() {
            return Ok(None);
        }

        let mut line = std::mem::take(&mut self.buf);
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }
}

/// Reads commands and dispatches them until the session terminates.
pub struct ControlLoop {
    session: Session,
    registry: CommandRegistry<Session>,
}

impl ControlLoop {
    pub fn new(mut session: Session) -> Result<Self, RegistryError> {
        let registry = session_commands()?;
        session.set_help(registry.help());
        Ok(Self { session, registry })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Run until `terminate`, a shutdown signal or end of input.
    ///
    /// Signals are observed while waiting for input; a command already being
    /// dispatched always completes first.
    pub async fn run<R>(&mut self, input: R, mut shutdown: mpsc::Receiver<ShutdownSignal>)
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = LineReader::new(input);

        while !self.session.is_terminating() {
            self.session.console().prompt(MAIN_PROMPT);
            match self.read_input(&mut lines, &mut shutdown).await {
                Input::Line(line) => self.handle_line(&line, &mut lines, &mut shutdown).await,
                Input::Closed => self.session.end_of_input(),
                Input::Signalled => {}
            }
        }

        debug!("control loop exited");
    }

    async fn handle_line<R>(
        &mut self,
        line: &str,
        lines: &mut LineReader<R>,
        shutdown: &mut mpsc::Receiver<ShutdownSignal>,
    ) where
        R: AsyncBufRead + Unpin,
    {
        let token = line.trim();
        match self.registry.dispatch(&mut self.session, token, None) {
            Dispatch::Done => {}
            Dispatch::Unknown => self.session.console().println("invalid command"),
            Dispatch::NeedsValue(prompt) => {
                self.session.console().prompt(prompt);
                match self.read_input(lines, shutdown).await {
                    Input::Line(value) => {
                        self.registry
                            .dispatch(&mut self.session, token, Some(&value));
                    }
                    Input::Closed => self.session.end_of_input(),
                    Input::Signalled => {}
                }
            }
        }
    }

    async fn read_input<R>(
        &mut self,
        lines: &mut LineReader<R>,
        shutdown: &mut mpsc::Receiver<ShutdownSignal>,
    ) -> Input
    where
        R: AsyncBufRead + Unpin,
    {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => Input::Line(line),
                Ok(None) => Input::Closed,
                Err(e) => {
                    warn!(error = %e, "failed to read input");
                    Input::Closed
                }
            },
            Some(signal) = shutdown.recv() => {
                self.session.on_signal(signal);
                Input::Signalled
            }
        }
    }
}
