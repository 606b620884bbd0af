//! Demo commands and the session context they share.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{Arc, PoisonError};

use linecmd_core::{
    Arity, Command, CommandError, CommandOutcome, CommandResult, CommandSpec, FlagParser,
    FlagSpec, Output, SharedCommand, SpecError, StubCommand,
};

/// State threaded through every command of the demo shell.
pub struct Session {
    vars: BTreeMap<String, String>,
    running: bool,
    out: Output,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("vars", &self.vars)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(out: Output) -> Self {
        Self {
            vars: BTreeMap::new(),
            running: true,
            out,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    fn print(&self, text: &str) -> Result<(), CommandError> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "{text}")?;
        out.flush()?;
        Ok(())
    }
}

fn session(ctx: Option<&mut Session>) -> Result<&mut Session, CommandError> {
    ctx.ok_or_else(|| CommandError::failed("this command needs a session"))
}

/// All demo commands, in listing order.
pub fn builtin_commands() -> Result<Vec<SharedCommand<Session>>, SpecError> {
    let commands: Vec<SharedCommand<Session>> = vec![
        Arc::new(EchoCommand::new()?),
        Arc::new(SumCommand::new()?),
        Arc::new(SetCommand::new()?),
        Arc::new(GetCommand::new()?),
        Arc::new(VarsCommand::new()?),
        Arc::new(GreetCommand::new()?),
        Arc::new(StubCommand::new(
            CommandSpec::builder("Todo")
                .description("Manage a todo list")
                .aliases(["todo", "plan"])
                .usage("todo <add|list|done> [item]")
                .unbounded()
                .build()?,
        )),
        Arc::new(QuitCommand::new()?),
    ];
    Ok(commands)
}

/// Echo command - prints its arguments, expanding `$var` references.
pub struct EchoCommand {
    spec: CommandSpec,
}

impl EchoCommand {
    pub fn new() -> Result<Self, SpecError> {
        Ok(Self {
            spec: CommandSpec::builder("Echo")
                .description("Print the arguments")
                .long_description(
                    "Print the arguments separated by single spaces. \
                     Words starting with '$' are replaced by the session variable of that name.",
                )
                .aliases(["echo", "say"])
                .usage("echo [text...]")
                .arity(Arity::at_least(0))
                .build()?,
        })
    }
}

/// Expand `$name` references from the session variables; unknown names expand to nothing.
fn expand_variables(input: &str, session: &Session) -> String {
    let mut result = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }
        let mut name = String::new();
        while let Some(&nc) = chars.peek() {
            if nc.is_alphanumeric() || nc == '_' {
                name.push(nc);
                chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            result.push('$');
        } else if let Some(value) = session.var(&name) {
            result.push_str(value);
        }
    }

    result
}

impl Command<Session> for EchoCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn execute(&self, args: &[String], ctx: Option<&mut Session>) -> CommandOutcome<Session> {
        let session = session(ctx)?;
        let text = expand_variables(&args.join(" "), session);
        session.print(&text)?;
        Ok(CommandResult::success(text))
    }
}

/// Sum command - adds numbers.
pub struct SumCommand {
    spec: CommandSpec,
}

impl SumCommand {
    pub fn new() -> Result<Self, SpecError> {
        Ok(Self {
            spec: CommandSpec::builder("Sum")
                .description("Add numbers together")
                .aliases(["sum", "add"])
                .usage("sum <n> [n...]")
                .arity(Arity::at_least(1))
                .build()?,
        })
    }
}

impl Command<Session> for SumCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn execute(&self, args: &[String], ctx: Option<&mut Session>) -> CommandOutcome<Session> {
        let mut total = 0f64;
        for arg in args {
            let n: f64 = arg
                .parse()
                .map_err(|_| CommandError::failed(format!("not a number: '{arg}'")))?;
            total += n;
        }
        let text = total.to_string();
        session(ctx)?.print(&text)?;
        Ok(CommandResult::success(text))
    }
}

/// Set command - stores a session variable, flag-driven.
pub struct SetCommand {
    spec: CommandSpec,
    flags: FlagParser,
}

impl SetCommand {
    pub fn new() -> Result<Self, SpecError> {
        Ok(Self {
            spec: CommandSpec::builder("Set")
                .description("Set a session variable")
                .long_description(
                    "Set a session variable.\n  --key, -k <name>    variable name (required)\n  \
                     --value, -v <text>  value to store (required)",
                )
                .aliases(["set", "let"])
                .usage("set --key <name> --value <text>")
                .arity(Arity::at_least(0))
                .build()?,
            flags: FlagParser::new([
                FlagSpec::value("key", ["--key", "-k"])?
                    .required()
                    .describe("Variable name"),
                FlagSpec::value("value", ["--value", "-v"])?
                    .required()
                    .describe("Value to store"),
            ]),
        })
    }
}

impl Command<Session> for SetCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn execute(&self, args: &[String], ctx: Option<&mut Session>) -> CommandOutcome<Session> {
        let flags = self.flags.parse(args)?;
        let key = flags.get("key").unwrap_or_default().to_string();
        let value = flags.get("value").unwrap_or_default().to_string();
        let session = session(ctx)?;
        let message = format!("{key} = {value}");
        session.vars.insert(key, value);
        Ok(CommandResult::success(message))
    }
}

/// Get command - prints one session variable.
pub struct GetCommand {
    spec: CommandSpec,
}

impl GetCommand {
    pub fn new() -> Result<Self, SpecError> {
        Ok(Self {
            spec: CommandSpec::builder("Get")
                .description("Print a session variable")
                .alias("get")
                .usage("get <name>")
                .arity(Arity::exactly(1))
                .build()?,
        })
    }
}

impl Command<Session> for GetCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn execute(&self, args: &[String], ctx: Option<&mut Session>) -> CommandOutcome<Session> {
        let name = args
            .first()
            .ok_or_else(|| CommandError::failed("a variable name is required"))?;
        let session = session(ctx)?;
        let Some(value) = session.var(name).map(str::to_string) else {
            return Ok(CommandResult::error(format!("Variable '{name}' is not set")));
        };
        session.print(&value)?;
        Ok(CommandResult::success(value))
    }
}

/// Vars command - lists every session variable.
pub struct VarsCommand {
    spec: CommandSpec,
}

impl VarsCommand {
    pub fn new() -> Result<Self, SpecError> {
        Ok(Self {
            spec: CommandSpec::builder("Vars")
                .description("List session variables")
                .aliases(["vars", "env"])
                .usage("vars")
                .arity(Arity::none())
                .build()?,
        })
    }
}

impl Command<Session> for VarsCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn execute(&self, _args: &[String], ctx: Option<&mut Session>) -> CommandOutcome<Session> {
        let session = session(ctx)?;
        if session.vars.is_empty() {
            session.print("(no variables)")?;
        }
        for (key, value) in &session.vars {
            session.print(&format!("{key}={value}"))?;
        }
        Ok(CommandResult::success(format!(
            "{} variable(s)",
            session.vars.len()
        )))
    }
}

/// Greet command - `--name` is required, `--shout` upper-cases the greeting.
pub struct GreetCommand {
    spec: CommandSpec,
    flags: FlagParser,
}

impl GreetCommand {
    pub fn new() -> Result<Self, SpecError> {
        let flags = FlagParser::new([
            FlagSpec::value("name", ["--name", "-n"])?
                .required()
                .describe("Who to greet"),
            FlagSpec::switch("shout", ["--shout", "-s"])?.describe("Upper-case the greeting"),
        ]);
        Ok(Self {
            spec: CommandSpec::builder("Greet")
                .description("Greet someone")
                .long_description(format!("Greet someone.\n{}", flags.usage().trim_end()))
                .alias("greet")
                .usage("greet --name <name> [--shout]")
                .arity(Arity::between(2, 3))
                .build()?,
            flags,
        })
    }
}

impl Command<Session> for GreetCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn execute(&self, args: &[String], ctx: Option<&mut Session>) -> CommandOutcome<Session> {
        let flags = self.flags.parse(args)?;
        let mut greeting = format!("Hello, {}!", flags.get("name").unwrap_or_default());
        if flags.contains("shout") {
            greeting = greeting.to_uppercase();
        }
        session(ctx)?.print(&greeting)?;
        Ok(CommandResult::success(greeting))
    }
}

/// Quit command - ends the interactive loop.
pub struct QuitCommand {
    spec: CommandSpec,
}

impl QuitCommand {
    pub fn new() -> Result<Self, SpecError> {
        Ok(Self {
            spec: CommandSpec::builder("Quit")
                .description("Exit the shell")
                .aliases(["quit", "exit", "q"])
                .usage("quit")
                .arity(Arity::none())
                .build()?,
        })
    }
}

impl Command<Session> for QuitCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn execute(&self, _args: &[String], ctx: Option<&mut Session>) -> CommandOutcome<Session> {
        session(ctx)?.running = false;
        Ok(CommandResult::success("Goodbye!"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linecmd_core::{Dispatcher, ParserConfig, ResultKind, Theme};
    use std::sync::Mutex;

    fn setup() -> (Dispatcher<Session>, Session, Arc<Mutex<Vec<u8>>>) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let out: Output = buf.clone();
        let config = ParserConfig {
            theme: Theme::plain(),
            ..ParserConfig::default()
        };
        let dispatcher = Dispatcher::new(builtin_commands().unwrap(), config);
        (dispatcher, Session::new(out), buf)
    }

    fn printed(buf: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8(buf.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn test_echo_expands_variables() {
        let (dispatcher, mut session, buf) = setup();
        dispatcher.dispatch(Some("set -k who -v world"), Some(&mut session));
        let result = dispatcher
            .dispatch(Some("echo hello $who $nope $"), Some(&mut session))
            .unwrap();
        assert_eq!(result.message(), "hello world  $");
        assert_eq!(printed(&buf), "hello world  $\n");
    }

    #[test]
    fn test_sum_adds_and_rejects_garbage() {
        let (dispatcher, mut session, _buf) = setup();
        let result = dispatcher.dispatch(Some("add 1 2 3.5"), Some(&mut session)).unwrap();
        assert_eq!(result.message(), "6.5");

        let result = dispatcher.dispatch(Some("sum 1 x"), Some(&mut session)).unwrap();
        assert_eq!(result.kind(), &ResultKind::Error);
        assert!(result.message().contains("not a number: 'x'"));

        let result = dispatcher.dispatch(Some("sum"), Some(&mut session)).unwrap();
        assert!(matches!(result.kind(), ResultKind::InvalidArgumentCount { .. }));
    }

    #[test]
    fn test_set_get_vars() {
        let (dispatcher, mut session, buf) = setup();
        let result = dispatcher
            .dispatch(Some("set --key lang --value rust"), Some(&mut session))
            .unwrap();
        assert!(!result.is_error());
        assert_eq!(session.var("lang"), Some("rust"));

        let result = dispatcher.dispatch(Some("get lang"), Some(&mut session)).unwrap();
        assert_eq!(result.message(), "rust");

        let result = dispatcher.dispatch(Some("get missing"), Some(&mut session)).unwrap();
        assert_eq!(result.kind(), &ResultKind::Error);

        dispatcher.dispatch(Some("vars"), Some(&mut session));
        assert!(printed(&buf).ends_with("lang=rust\n"));
    }

    #[test]
    fn test_get_without_name_fails_instead_of_panicking() {
        let (_dispatcher, mut session, _buf) = setup();
        let get = GetCommand::new().unwrap();
        let err = get.execute(&[], Some(&mut session)).unwrap_err();
        assert_eq!(err.to_string(), "a variable name is required");
    }

    #[test]
    fn test_set_requires_both_flags() {
        let (dispatcher, mut session, _buf) = setup();
        let result = dispatcher.dispatch(Some("set -k only"), Some(&mut session)).unwrap();
        assert_eq!(result.kind(), &ResultKind::Error);
        assert!(result.message().contains("Missing required arguments: --value"));
    }

    #[test]
    fn test_greet_flags() {
        let (dispatcher, mut session, _buf) = setup();
        let result = dispatcher
            .dispatch(Some("greet --name ana"), Some(&mut session))
            .unwrap();
        assert_eq!(result.message(), "Hello, ana!");

        let result = dispatcher
            .dispatch(Some("greet -s -n ana"), Some(&mut session))
            .unwrap();
        assert_eq!(result.message(), "HELLO, ANA!");

        let result = dispatcher
            .dispatch(Some("greet --bogus x"), Some(&mut session))
            .unwrap();
        assert!(result.message().contains("Unknown argument: --bogus"));
    }

    #[test]
    fn test_todo_is_stubbed() {
        let (dispatcher, mut session, _buf) = setup();
        let result = dispatcher.dispatch(Some("plan"), Some(&mut session)).unwrap();
        assert_eq!(result.kind(), &ResultKind::NotImplemented);
    }

    #[test]
    fn test_quit_stops_session() {
        let (dispatcher, mut session, _buf) = setup();
        assert!(session.is_running());
        dispatcher.dispatch(Some("q"), Some(&mut session));
        assert!(!session.is_running());
    }

    #[test]
    fn test_commands_without_session_fail_cleanly() {
        let (dispatcher, _session, _buf) = setup();
        let result = dispatcher.dispatch(Some("vars"), None).unwrap();
        assert_eq!(result.kind(), &ResultKind::Error);
        assert!(result.message().contains("needs a session"));
    }

    #[test]
    fn test_no_builtin_alias_collides() {
        let commands = builtin_commands().unwrap();
        let mut seen = std::collections::HashSet::new();
        for cmd in &commands {
            for alias in cmd.spec().aliases() {
                assert!(seen.insert(alias.clone()), "duplicate alias {alias}");
            }
        }
        for help_alias in ["h", "help", "?"] {
            assert!(!seen.contains(help_alias));
        }
    }
}
