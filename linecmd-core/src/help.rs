//! Built-in help command.
//!
//! Lists every registered command, or prints the details of one. Reads the
//! registry through a [`RegistryView`], so commands registered after the help
//! command was built still show up.

use std::fmt::Write as _;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use crate::command::{Arity, Command, CommandOutcome, CommandSpec};
use crate::error::CommandError;
use crate::registry::{RegistryView, SharedCommand};
use crate::result::CommandResult;
use crate::style::{Role, Style, Theme};

/// Shared writer the help command prints to.
pub type Output = Arc<Mutex<dyn Write + Send>>;

/// An [`Output`] that writes to stdout.
pub fn stdout_output() -> Output {
    Arc::new(Mutex::new(std::io::stdout()))
}

/// Default help command, bound to the aliases `h`, `help` and `?`.
pub struct HelpCommand<C> {
    spec: CommandSpec,
    registry: RegistryView<C>,
    theme: Theme,
    output: Output,
}

impl<C> HelpCommand<C> {
    pub fn new(registry: RegistryView<C>, theme: Theme, output: Output) -> Self {
        Self {
            spec: Self::default_spec(),
            registry,
            theme,
            output,
        }
    }

    /// Metadata of the default help command.
    pub fn default_spec() -> CommandSpec {
        CommandSpec::from_parts(
            "Help",
            "Displays help information about available commands.",
            &["h", "help", "?"],
            "help [<command>]",
            Arity::between(0, 1),
        )
    }

    fn preamble(&self) -> String {
        let t = &self.theme;
        format!(
            "{}{} - {} - {}\n\n",
            t.paint("Format: ", Role::Heading),
            t.paint("usage", Role::Usage),
            t.paint("aliases", Role::Alias),
            t.paint("description", Role::Description),
        )
    }

    fn listing(&self, commands: &[SharedCommand<C>]) -> String {
        let t = &self.theme;
        let mut out = String::new();
        for command in commands {
            let spec = command.spec();
            let _ = writeln!(
                out,
                "{} - {} - {}",
                t.paint_with(spec.usage(), Role::Usage, &[Style::Bold]),
                t.paint(&spec.aliases().join(", "), Role::Alias),
                t.paint(spec.description(), Role::Description),
            );
        }
        out
    }

    fn details(&self, spec: &CommandSpec) -> String {
        let t = &self.theme;
        format!(
            "{}{}\n{}{}\n{}{}\n",
            t.paint_with("Usage: ", Role::Usage, &[Style::Bold]),
            t.paint_with(spec.usage(), Role::Usage, &[Style::Bold]),
            t.paint_with("Aliases: ", Role::Alias, &[Style::Bold]),
            t.paint(&spec.aliases().join(", "), Role::Alias),
            t.paint_with("Description: ", Role::Description, &[Style::Bold]),
            t.paint(spec.long_description(), Role::Description),
        )
    }

    fn emit(&self, text: &str) -> Result<(), CommandError> {
        let mut out = self.output.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

impl<C> Command<C> for HelpCommand<C> {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn execute(&self, args: &[String], _context: Option<&mut C>) -> CommandOutcome<C> {
        if !self.accepts_arg_count(args.len()) {
            return Ok(CommandResult::invalid_arg_count(self.spec.arity(), args.len()));
        }

        let commands = self
            .registry
            .commands()
            .ok_or_else(|| CommandError::failed("command registry is no longer available"))?;

        let mut text = self.preamble();
        let result = match args.first() {
            None => {
                text.push_str(&self.listing(&commands));
                CommandResult::success("Printed all commands")
            }
            Some(name) => match self.registry.get(name) {
                Some(command) => {
                    text.push_str(&self.details(command.spec()));
                    CommandResult::success(format!("Printed help for command '{name}'"))
                }
                None => CommandResult::error(format!("Command '{name}' not found")),
            },
        };

        self.emit(&text)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{FnCommand, invoke};
    use crate::registry::CommandRegistry;
    use crate::result::ResultKind;
    use crate::style::strip_ansi;

    fn capture() -> (Arc<Mutex<Vec<u8>>>, Output) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let output: Output = buf.clone();
        (buf, output)
    }

    fn text(buf: &Arc<Mutex<Vec<u8>>>) -> String {
        strip_ansi(&String::from_utf8(buf.lock().unwrap().clone()).unwrap())
    }

    fn dummy() -> SharedCommand<()> {
        let spec = CommandSpec::builder("Dummy")
            .description("Does dummy things")
            .long_description("Long dummy description")
            .aliases(["d", "dummy"])
            .usage("dummy [x]")
            .max_args(1)
            .build()
            .unwrap();
        Arc::new(FnCommand::new(spec, |_args: &[String], _ctx: Option<&mut ()>| {
            Ok(CommandResult::success("Executed"))
        }))
    }

    fn registry(commands: Vec<SharedCommand<()>>, output: Output) -> CommandRegistry<()> {
        CommandRegistry::builder()
            .commands(commands)
            .output(output)
            .build()
    }

    #[test]
    fn test_help_without_args_lists_all_commands() {
        let (buf, output) = capture();
        let reg = registry(vec![dummy()], output);
        let help = reg.get("help").unwrap();

        let result = invoke(&*help, &[], None);
        assert_eq!(result.kind(), &ResultKind::Success);

        let s = text(&buf);
        assert!(s.contains("Format: usage - aliases - description"));
        assert!(s.contains("dummy [x] - d, dummy - Does dummy things"));
        assert!(s.contains("help [<command>] - h, help, ? - Displays help information"));
        assert_eq!(s.matches("dummy [x] - ").count(), 1);
    }

    #[test]
    fn test_help_plain_theme_has_no_escape_codes() {
        let (buf, output) = capture();
        let reg = CommandRegistry::builder()
            .command(dummy())
            .theme(Theme::plain())
            .output(output)
            .build();
        invoke(&*reg.get("h").unwrap(), &[], None);
        let raw = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        assert!(!raw.contains('\x1b'));
        assert!(raw.starts_with("Format: usage - aliases - description\n\n"));
    }

    #[test]
    fn test_help_with_known_command_prints_details() {
        let (buf, output) = capture();
        let reg = registry(vec![dummy()], output);
        let result = invoke(&*reg.get("?").unwrap(), &["dummy".to_string()], None);
        assert!(!result.is_error());

        let s = text(&buf);
        assert!(s.contains("Usage: dummy [x]"));
        assert!(s.contains("Aliases: d, dummy"));
        assert!(s.contains("Description: Long dummy description"));
    }

    #[test]
    fn test_help_with_too_many_args_prints_nothing() {
        let (buf, output) = capture();
        let reg = registry(vec![], output);
        let help = reg.get("help").unwrap();

        let result = help.execute(&["one".to_string(), "two".to_string()], None).unwrap();
        assert!(matches!(
            result.kind(),
            ResultKind::InvalidArgumentCount { got: 2, .. }
        ));
        assert!(text(&buf).is_empty());
    }

    #[test]
    fn test_help_with_unknown_command_returns_error() {
        let (buf, output) = capture();
        let reg = registry(vec![], output);
        let result = invoke(&*reg.get("help").unwrap(), &["nope".to_string()], None);

        assert_eq!(result.kind(), &ResultKind::Error);
        assert!(result.message().contains("Command 'nope' not found"));
        assert!(text(&buf).contains("Format: usage - aliases - description"));
    }

    #[test]
    fn test_help_sees_commands_registered_later() {
        let (buf, output) = capture();
        let mut reg = registry(vec![], output);
        reg.register(dummy());
        invoke(&*reg.get("help").unwrap(), &[], None);
        assert!(text(&buf).contains("dummy [x] - d, dummy - Does dummy things"));
    }

    #[test]
    fn test_detached_help_fails() {
        let (_buf, output) = capture();
        let reg = registry(vec![], output);
        let help = Arc::clone(reg.help_command());
        drop(reg);
        let result = invoke(&*help, &[], None);
        assert_eq!(result.kind(), &ResultKind::Error);
        assert!(result.message().contains("no longer available"));
    }
}
