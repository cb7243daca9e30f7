//! Command registry.
//!
//! A static table mapping command names and aliases to handlers. Lookup is
//! case-insensitive. Handlers take the context they act on explicitly, so the
//! table itself holds no state.

use std::collections::HashSet;

use crate::error::RegistryError;

/// What a command does when dispatched.
pub enum Handler<C> {
    /// Runs without a value.
    Plain(fn(&mut C)),
    /// Runs with one raw value, read after showing `prompt`.
    WithValue {
        prompt: &'static str,
        run: fn(&mut C, &str),
    },
}

/// Immutable description of one command.
pub struct CommandSpec<C> {
    pub name: &'static str,
    pub alias: &'static str,
    /// Line shown by `help`
    pub guide: &'static str,
    pub handler: Handler<C>,
}

impl<C> CommandSpec<C> {
    pub fn plain(
        name: &'static str,
        alias: &'static str,
        guide: &'static str,
        run: fn(&mut C),
    ) -> Self {
        Self {
            name,
            alias,
            guide,
            handler: Handler::Plain(run),
        }
    }

    pub fn with_value(
        name: &'static str,
        alias: &'static str,
        guide: &'static str,
        prompt: &'static str,
        run: fn(&mut C, &str),
    ) -> Self {
        Self {
            name,
            alias,
            guide,
            handler: Handler::WithValue { prompt, run },
        }
    }

    /// Whether a value must be read before dispatch.
    pub fn needs_value(&self) -> bool {
        matches!(self.handler, Handler::WithValue { .. })
    }

    /// Prompt for the value, if the command takes one.
    pub fn value_prompt(&self) -> Option<&'static str> {
        match self.handler {
            Handler::Plain(_) => None,
            Handler::WithValue { prompt, .. } => Some(prompt),
        }
    }

    fn matches(&self, token: &str) -> bool {
        self.name.eq_ignore_ascii_case(token) || self.alias.eq_ignore_ascii_case(token)
    }
}

/// Outcome of a dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The handler ran.
    Done,
    /// No command matches the token.
    Unknown,
    /// The command takes a value and none was supplied.
    NeedsValue(&'static str),
}

/// Table of commands, built once.
pub struct CommandRegistry<C> {
    commands: Vec<CommandSpec<C>>,
}

impl<C> CommandRegistry<C> {
    /// Build a registry, checking that every name and alias is unique
    /// (ignoring case) and that value-taking commands have a prompt.
    pub fn new(commands: Vec<CommandSpec<C>>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for spec in &commands {
            for key in [spec.name, spec.alias] {
                if key.trim().is_empty() {
                    return Err(RegistryError::EmptyName);
                }
                if !seen.insert(key.to_ascii_lowercase()) {
                    return Err(RegistryError::Duplicate(key.to_string()));
                }
            }
            if let Some(prompt) = spec.value_prompt() {
                if prompt.trim().is_empty() {
                    return Err(RegistryError::MissingPrompt(spec.name.to_string()));
                }
            }
        }
        Ok(Self { commands })
    }

    /// Find the command matching `token` by name or alias.
    pub fn resolve(&self, token: &str) -> Option<&CommandSpec<C>> {
        let token = token.trim();
        self.commands.iter().find(|spec| spec.matches(token))
    }

    /// Resolve `token` and run its handler.
    pub fn dispatch(&self, ctx: &mut C, token: &str, value: Option<&str>) -> Dispatch {
        let Some(spec) = self.resolve(token) else {
            return Dispatch::Unknown;
        };
        match (&spec.handler, value) {
            (Handler::Plain(run), _) => run(ctx),
            (Handler::WithValue { run, .. }, Some(value)) => run(ctx, value),
            (Handler::WithValue { prompt, .. }, None) => return Dispatch::NeedsValue(*prompt),
        }
        Dispatch::Done
    }

    /// All commands, in table order.
    pub fn commands(&self) -> &[CommandSpec<C>] {
        &self.commands
    }

    /// Help text, one guide line per command.
    pub fn help(&self) -> String {
        let mut s = String::from("command list =================");
        for spec in &self.commands {
            s.push('\n');
            s.push_str(spec.guide);
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    fn registry() -> CommandRegistry<Recorder> {
        CommandRegistry::<Recorder>::new(vec![
            CommandSpec::plain("run", "r", "r, run   start", |r: &mut Recorder| {
                r.calls.push("run".into())
            }),
            CommandSpec::with_value(
                "count",
                "c",
                "c, count   set count",
                "count :",
                |r: &mut Recorder, v: &str| r.calls.push(format!("count={v}")),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_resolve_ignores_case() {
        let registry = registry();
        for token in ["run", "RUN", "Run", "r", "R", " r "] {
            assert_eq!(registry.resolve(token).map(|s| s.name), Some("run"));
        }
        assert!(registry.resolve("ru").is_none());
        assert!(registry.resolve("").is_none());
    }

    #[test]
    fn test_dispatch() {
        let registry = registry();
        let mut recorder = Recorder::default();

        assert_eq!(registry.dispatch(&mut recorder, "r", None), Dispatch::Done);
        assert_eq!(
            registry.dispatch(&mut recorder, "c", None),
            Dispatch::NeedsValue("count :")
        );
        assert_eq!(
            registry.dispatch(&mut recorder, "COUNT", Some("7")),
            Dispatch::Done
        );
        assert_eq!(registry.dispatch(&mut recorder, "x", None), Dispatch::Unknown);

        assert_eq!(recorder.calls, vec!["run", "count=7"]);
    }

    #[test]
    fn test_rejects_duplicates() {
        let result = CommandRegistry::<Recorder>::new(vec![
            CommandSpec::plain("stop", "s", "", |_| {}),
            CommandSpec::plain("start", "S", "", |_| {}),
        ]);
        assert_eq!(result.err(), Some(RegistryError::Duplicate("S".to_string())));
    }

    #[test]
    fn test_rejects_missing_prompt() {
        let result = CommandRegistry::<Recorder>::new(vec![CommandSpec::with_value(
            "end",
            "e",
            "",
            " ",
            |_, _| {},
        )]);
        assert_eq!(
            result.err(),
            Some(RegistryError::MissingPrompt("end".to_string()))
        );
    }

    #[test]
    fn test_help_lists_guides() {
        let help = registry().help();
        assert!(help.starts_with("command list"));
        assert!(help.contains("r, run"));
        assert!(help.contains("c, count"));
    }
}
