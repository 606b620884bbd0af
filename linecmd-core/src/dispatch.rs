//! Line-level entry point.
//!
//! A line is split on single spaces (no quoting, empty tokens are kept), the
//! first token is resolved by exact alias lookup, the argument count is
//! checked against the command's arity and the command is run. Every failure
//! along the way becomes a [`CommandResult`]; nothing escapes as an error.

use tracing::debug;

use crate::command::invoke;
use crate::config::ParserConfig;
use crate::registry::{CommandRegistry, SharedCommand};
use crate::result::CommandResult;
use crate::style::Role;

/// Split `line` into a command name and its arguments.
///
/// Consecutive spaces produce empty tokens.
pub fn split_line(line: &str) -> (&str, Vec<String>) {
    let mut parts = line.split(' ');
    let name = parts.next().unwrap_or_default();
    (name, parts.map(str::to_string).collect())
}

/// Hints shown after an unknown command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommandTips {
    /// Longest alias of the most similar command, if any.
    pub suggestion: Option<String>,
    /// Longest alias of the help command.
    pub help_alias: String,
}

/// Resolves input lines against a [`CommandRegistry`] and runs them.
pub struct Dispatcher<C> {
    registry: CommandRegistry<C>,
    config: ParserConfig,
}

impl<C: 'static> Dispatcher<C> {
    /// Dispatcher over `commands` plus the default help command, themed by `config`.
    pub fn new<I>(commands: I, config: ParserConfig) -> Self
    where
        I: IntoIterator<Item = SharedCommand<C>>,
    {
        let registry = CommandRegistry::builder()
            .commands(commands)
            .theme(config.theme.clone())
            .build();
        Self { registry, config }
    }

    /// Dispatcher over a registry built elsewhere, e.g. with a custom help command.
    pub fn with_registry(registry: CommandRegistry<C>, config: ParserConfig) -> Self {
        Self { registry, config }
    }

    /// Dispatch one input line.
    ///
    /// Returns `None` when there is nothing to do (no input or an empty line),
    /// otherwise exactly one result.
    pub fn dispatch(&self, line: Option<&str>, context: Option<&mut C>) -> Option<CommandResult<C>> {
        let line = line.filter(|l| !l.is_empty())?;
        let (name, args) = split_line(line);

        let Some(command) = self.registry.get(name) else {
            debug!(command = %name, "Unknown command");
            return Some(CommandResult::unknown_command(name));
        };

        debug!(command = %name, title = %command.spec().title(), args = args.len(), "Dispatching");
        Some(invoke(command.as_ref(), &args, context))
    }

    pub fn command(&self, name: &str) -> Option<SharedCommand<C>> {
        self.registry.get(name)
    }

    pub fn commands(&self) -> Vec<SharedCommand<C>> {
        self.registry.commands()
    }

    /// Commands with an alias containing `fragment`, ignoring case.
    pub fn find_similar(&self, fragment: &str) -> Vec<SharedCommand<C>> {
        self.registry.find_containing(fragment)
    }

    /// Most similar command: exact, then prefix, then substring match.
    pub fn find_most_similar(&self, query: &str) -> Option<SharedCommand<C>> {
        self.registry.find_best_match(query)
    }

    pub fn tips_for(&self, name: &str) -> UnknownCommandTips {
        UnknownCommandTips {
            suggestion: self
                .find_most_similar(name)
                .map(|command| command.spec().longest_alias().to_string()),
            help_alias: self
                .registry
                .help_command()
                .spec()
                .longest_alias()
                .to_string(),
        }
    }

    /// Error line plus tips for an unknown command, one per line.
    pub fn render_unknown_command(&self, name: &str) -> String {
        let theme = &self.config.theme;
        let tips = self.tips_for(name);

        let mut lines = vec![theme.paint(&format!("Unknown command: {name}"), Role::Error)];
        if let Some(suggestion) = tips.suggestion {
            lines.push(theme.paint(
                &format!("[TIP]: Did you mean '{suggestion}'?"),
                Role::Tip,
            ));
        }
        lines.push(theme.paint(
            &format!("[TIP]: Use '{}' for more information.", tips.help_alias),
            Role::Tip,
        ));
        lines.join("\n")
    }

    pub fn registry(&self) -> &CommandRegistry<C> {
        &self.registry
    }

    /// Mutable access for incremental registration.
    pub fn registry_mut(&mut self) -> &mut CommandRegistry<C> {
        &mut self.registry
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Arity, CommandSpec, FnCommand};
    use crate::error::CommandError;
    use crate::result::ResultKind;
    use crate::style::Theme;
    use std::sync::Arc;

    fn plain() -> ParserConfig {
        ParserConfig {
            theme: Theme::plain(),
            ..ParserConfig::default()
        }
    }

    fn echo() -> SharedCommand<Vec<String>> {
        let spec = CommandSpec::builder("Echo")
            .description("Echo arguments")
            .aliases(["echo", "e"])
            .usage("echo <a> [b]")
            .min_args(1)
            .max_args(2)
            .build()
            .unwrap();
        Arc::new(FnCommand::new(
            spec,
            |args: &[String], ctx: Option<&mut Vec<String>>| {
                if let Some(log) = ctx {
                    log.push(args.join("|"));
                }
                Ok(CommandResult::success("echoed"))
            },
        ))
    }

    #[test]
    fn test_split_keeps_empty_tokens() {
        assert_eq!(split_line("a b"), ("a", vec!["b".to_string()]));
        assert_eq!(
            split_line("a  b"),
            ("a", vec![String::new(), "b".to_string()])
        );
        assert_eq!(split_line("solo"), ("solo", vec![]));
    }

    #[test]
    fn test_empty_or_absent_input_yields_nothing() {
        let dispatcher = Dispatcher::new([echo()], plain());
        assert!(dispatcher.dispatch(None, None).is_none());
        assert!(dispatcher.dispatch(Some(""), None).is_none());
    }

    #[test]
    fn test_dispatch_invokes_with_context() {
        let dispatcher = Dispatcher::new([echo()], plain());
        let mut log = Vec::new();
        let result = dispatcher.dispatch(Some("e x y"), Some(&mut log)).unwrap();
        assert_eq!(result.kind(), &ResultKind::Success);
        assert_eq!(log, vec!["x|y".to_string()]);
    }

    #[test]
    fn test_arity_is_checked_before_execution() {
        let dispatcher = Dispatcher::new([echo()], plain());
        let mut log = Vec::new();
        for (line, got) in [("echo", 0), ("echo a b c", 3)] {
            let result = dispatcher.dispatch(Some(line), Some(&mut log)).unwrap();
            assert_eq!(
                result.kind(),
                &ResultKind::InvalidArgumentCount {
                    arity: Arity::between(1, 2),
                    got
                }
            );
            assert!(result.message().contains("between 1 and 2"));
        }
        assert!(log.is_empty());
    }

    #[test]
    fn test_trailing_space_counts_as_empty_argument() {
        let dispatcher = Dispatcher::new([echo()], plain());
        let mut log = Vec::new();
        let result = dispatcher.dispatch(Some("echo "), Some(&mut log)).unwrap();
        assert!(!result.is_error());
        assert_eq!(log, vec![String::new()]);
    }

    #[test]
    fn test_unknown_command() {
        let dispatcher = Dispatcher::<Vec<String>>::new([], plain());
        let result = dispatcher.dispatch(Some("frobnicate now"), None).unwrap();
        assert_eq!(
            result.kind(),
            &ResultKind::UnknownCommand {
                name: "frobnicate".into()
            }
        );
    }

    #[test]
    fn test_command_failure_becomes_error_result() {
        let spec = CommandSpec::builder("Fail")
            .description("Always fails")
            .alias("fail")
            .usage("fail")
            .build()
            .unwrap();
        let failing: SharedCommand<()> = Arc::new(FnCommand::new(
            spec,
            |_args: &[String], _ctx: Option<&mut ()>| Err(CommandError::failed("nope")),
        ));
        let dispatcher = Dispatcher::new([failing], plain());
        let result = dispatcher.dispatch(Some("fail"), None).unwrap();
        assert_eq!(result.kind(), &ResultKind::Error);
        assert!(result.message().contains("nope"));
    }

    struct Explosive {
        spec: CommandSpec,
    }

    impl crate::command::Command<()> for Explosive {
        fn spec(&self) -> &CommandSpec {
            &self.spec
        }

        fn execute(
            &self,
            args: &[String],
            _ctx: Option<&mut ()>,
        ) -> crate::command::CommandOutcome<()> {
            panic!("exploded with {} args", args.len())
        }
    }

    #[test]
    fn test_hand_written_command_is_still_checked_and_shielded() {
        let spec = CommandSpec::builder("Boom")
            .description("Always panics")
            .alias("boom")
            .usage("boom <x>")
            .arity(Arity::exactly(1))
            .build()
            .unwrap();
        let boom: SharedCommand<()> = Arc::new(Explosive { spec });
        let dispatcher = Dispatcher::new([boom], plain());

        let result = dispatcher.dispatch(Some("boom"), None).unwrap();
        assert!(matches!(
            result.kind(),
            ResultKind::InvalidArgumentCount { got: 0, .. }
        ));

        let result = dispatcher.dispatch(Some("boom x"), None).unwrap();
        assert_eq!(result.kind(), &ResultKind::Error);
        assert_eq!(
            result.message(),
            "Command 'Boom' panicked: exploded with 1 args"
        );
    }

    #[test]
    fn test_tips_for_unknown_command() {
        let dispatcher = Dispatcher::new([echo()], plain());
        let tips = dispatcher.tips_for("ech");
        assert_eq!(tips.suggestion.as_deref(), Some("echo"));
        assert_eq!(tips.help_alias, "help");

        let tips = dispatcher.tips_for("zzz");
        assert_eq!(tips.suggestion, None);
    }

    #[test]
    fn test_render_unknown_command() {
        let dispatcher = Dispatcher::new([echo()], plain());
        assert_eq!(
            dispatcher.render_unknown_command("ECH"),
            "Unknown command: ECH\n[TIP]: Did you mean 'echo'?\n[TIP]: Use 'help' for more information."
        );
        assert_eq!(
            dispatcher.render_unknown_command("qqq"),
            "Unknown command: qqq\n[TIP]: Use 'help' for more information."
        );
    }

    #[test]
    fn test_incremental_registration_through_dispatcher() {
        let mut dispatcher = Dispatcher::<Vec<String>>::new([], plain());
        assert!(dispatcher.command("echo").is_none());
        dispatcher.registry_mut().register(echo());
        assert!(dispatcher.command("e").is_some());
        assert_eq!(dispatcher.commands().len(), 2);
        assert_eq!(dispatcher.find_similar("ch").len(), 1);
    }
}
