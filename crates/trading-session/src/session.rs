//! Session state and the command table acting on it.

use tracing::{info, warn};

use crate::command::{CommandRegistry, CommandSpec};
use crate::config::ConfigField;
use crate::console::Console;
use crate::control_loop::ShutdownSignal;
use crate::controller::{LifecycleController, QueryOutcome, QueryTarget, ScoreHandle};
use crate::error::{LifecycleError, RegistryError};

/// Main command prompt.
pub const MAIN_PROMPT: &str = "input command (h:help): ";

/// Everything a command handler may touch.
pub struct Session {
    controller: LifecycleController,
    console: Console,
    terminating: bool,
    help: String,
}

impl Session {
    pub fn new(controller: LifecycleController, console: Console) -> Self {
        Self {
            controller,
            console,
            terminating: false,
            help: String::new(),
        }
    }

    pub fn controller(&self) -> &LifecycleController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut LifecycleController {
        &mut self.controller
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Set once the session should end; the loop exits on its next turn.
    pub fn is_terminating(&self) -> bool {
        self.terminating
    }

    pub(crate) fn set_help(&mut self, help: String) {
        self.help = help;
    }

    /// React to a caught shutdown signal.
    pub fn on_signal(&mut self, signal: ShutdownSignal) {
        info!(%signal, "shutdown signal received");
        self.controller.stop();
        self.terminating = true;
        self.console.println(format!("Receive signal {signal}, stopping"));
    }

    /// Input closed: terminate without the farewell.
    pub fn end_of_input(&mut self) {
        info!("input closed");
        self.controller.terminate();
        self.terminating = true;
    }

    fn print_help(&mut self) {
        self.console.println(&self.help);
    }

    fn run(&mut self) {
        match self.controller.start() {
            Ok(()) => {}
            Err(LifecycleError::NotInitialized) => self.console.println("Not initialized"),
            Err(e) => {
                warn!(error = %e, "start refused");
                self.console.println(format!("Fail operator start: {e}"));
            }
        }
    }

    fn stop(&mut self) {
        self.controller.stop();
    }

    fn terminate(&mut self) {
        self.console.println("Terminating......");
        self.controller.terminate();
        self.terminating = true;
        self.console.println("Good Bye~");
    }

    fn initialize(&mut self) {
        match self.controller.initialize() {
            Ok(()) => {
                self.console.println("##### simulation is initialized #####");
                self.console.println(self.controller.config());
                self.console.println("====================================");
            }
            Err(e) => {
                warn!(error = %e, "initialize refused");
                self.console.println(format!("Fail initialize: {e}"));
            }
        }
    }

    fn query(&mut self, raw: &str) {
        let Some(target) = QueryTarget::parse(raw) else {
            self.console
                .println(format!("invalid query target: {}", raw.trim()));
            return;
        };

        match self.controller.query(target) {
            Ok(QueryOutcome::State { engine, last_error }) => {
                self.console.println(engine);
                if let Some(error) = last_error {
                    self.console.println(format!("last error: {error}"));
                }
            }
            Ok(QueryOutcome::Score(handle)) => self.print_score_later(handle),
            Ok(QueryOutcome::Results(results)) => {
                if results.is_empty() {
                    self.console.println("no trading results");
                }
                for result in results {
                    self.console.println(result);
                }
            }
            Err(LifecycleError::NotInitialized) => self.console.println("Not initialized"),
            Err(e) => self.console.println(e),
        }
    }

    fn print_score_later(&self, handle: ScoreHandle) {
        let console = self.console.clone();
        tokio::spawn(async move {
            if let Some(report) = handle.wait().await {
                console.println("current score ==========");
                console.println(report);
                console.prompt(MAIN_PROMPT);
            }
        });
    }

    fn configure(&mut self, field: ConfigField, raw: &str) {
        if let Err(e) = self.controller.configure(field, raw) {
            warn!(error = %e, "config value rejected");
            self.console.println(e);
        }
    }
}

/// The interactive command table.
pub fn session_commands() -> Result<CommandRegistry<Session>, RegistryError> {
    CommandRegistry::new(vec![
        CommandSpec::plain(
            "help",
            "h",
            "h, help          print command info",
            Session::print_help,
        ),
        CommandSpec::plain(
            "run",
            "r",
            "r, run           start running simulation",
            Session::run,
        ),
        CommandSpec::plain(
            "stop",
            "s",
            "s, stop          stop running simulation",
            Session::stop,
        ),
        CommandSpec::plain(
            "terminate",
            "t",
            "t, terminate     terminate simulator",
            Session::terminate,
        ),
        CommandSpec::with_value(
            "query",
            "q",
            "q, query         query and print current state or return score",
            "input query target (ex. state, score, result) :",
            Session::query,
        ),
        CommandSpec::with_value(
            "end",
            "e",
            "e, end           set simulation period end datetime",
            "input simulation period end datetime(ex. 2020-12-20T18:00:00Z) :",
            |s: &mut Session, v: &str| s.configure(ConfigField::PeriodEnd, v),
        ),
        CommandSpec::with_value(
            "count",
            "c",
            "c, count         set simulation count",
            "input simulation count (ex. 100) :",
            |s: &mut Session, v: &str| s.configure(ConfigField::SampleCount, v),
        ),
        CommandSpec::with_value(
            "interval",
            "int",
            "int, interval    set simulation interval",
            "input simulation interval in seconds (ex. 0.5) :",
            |s: &mut Session, v: &str| s.configure(ConfigField::Interval, v),
        ),
        CommandSpec::with_value(
            "budget",
            "b",
            "b, budget        set simulation budget",
            "input starting budget (ex. 70000) :",
            |s: &mut Session, v: &str| s.configure(ConfigField::Budget, v),
        ),
        CommandSpec::with_value(
            "strategy",
            "st",
            "st, strategy     set strategy",
            "input strategy number 0: buy and hold, 1: SMA crossover :",
            |s: &mut Session, v: &str| s.configure(ConfigField::Strategy, v),
        ),
        CommandSpec::with_value(
            "log",
            "l",
            "l, log           set stream log level",
            "set level (CRITICAL=50, ERROR=40, WARN=30, INFO=20, DEBUG=10) :",
            |s: &mut Session, v: &str| s.configure(ConfigField::LogLevel, v),
        ),
        CommandSpec::plain(
            "initialize",
            "i",
            "i, initialize    initialize simulation",
            Session::initialize,
        ),
    ])
}
