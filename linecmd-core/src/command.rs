//! Command metadata and the [`Command`] capability trait.
//!
//! A [`CommandSpec`] is validated once at construction and is immutable
//! afterwards. The registry and dispatcher only ever see `dyn Command<C>`.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::error::{CommandError, SpecError};
use crate::result::CommandResult;

/// Inclusive range of positional arguments a command accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arity {
    min: usize,
    /// `None` means unbounded.
    max: Option<usize>,
}

impl Arity {
    pub fn new(min: usize, max: Option<usize>) -> Result<Self, SpecError> {
        match max {
            Some(max) if max < min => Err(SpecError::InvalidArity { min, max }),
            _ => Ok(Self { min, max }),
        }
    }

    /// Accepts `min..=max` arguments.
    ///
    /// # Panics
    ///
    /// Panics if `max < min`.
    pub const fn between(min: usize, max: usize) -> Self {
        assert!(min <= max, "max args must not be lower than min args");
        Self {
            min,
            max: Some(max),
        }
    }

    pub const fn exactly(count: usize) -> Self {
        Self {
            min: count,
            max: Some(count),
        }
    }

    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    pub const fn none() -> Self {
        Self::exactly(0)
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "between {} and {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// Immutable description of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    title: String,
    description: String,
    long_description: String,
    aliases: Vec<String>,
    usage: String,
    arity: Arity,
}

impl CommandSpec {
    pub fn builder(title: impl Into<String>) -> CommandSpecBuilder {
        CommandSpecBuilder {
            title: title.into(),
            description: String::new(),
            long_description: None,
            aliases: Vec::new(),
            usage: String::new(),
            min_args: 0,
            max_args: Some(0),
        }
    }

    /// Construct a spec from literals known to be valid.
    pub(crate) fn from_parts(
        title: &str,
        description: &str,
        aliases: &[&str],
        usage: &str,
        arity: Arity,
    ) -> Self {
        debug_assert!(!title.is_empty() && !description.is_empty() && !usage.is_empty());
        debug_assert!(!aliases.is_empty() && aliases.iter().all(|a| !a.is_empty()));
        Self {
            title: title.to_string(),
            description: description.to_string(),
            long_description: description.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            usage: usage.to_string(),
            arity,
        }
    }

    /// Display name of the command.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Short description shown in listings.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Detailed description shown by `help <command>`.
    pub fn long_description(&self) -> &str {
        &self.long_description
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn min_args(&self) -> usize {
        self.arity.min()
    }

    pub fn max_args(&self) -> Option<usize> {
        self.arity.max()
    }

    /// The longest alias. On ties the later alias wins.
    pub fn longest_alias(&self) -> &str {
        self.aliases
            .iter()
            .max_by_key(|alias| alias.chars().count())
            .map(String::as_str)
            .unwrap_or_default()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{}\nAliases: {}\nUsage: {}",
            self.title,
            self.description,
            self.aliases.join(", "),
            self.usage
        )
    }
}

/// Builder for [`CommandSpec`]; all invariants are checked in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct CommandSpecBuilder {
    title: String,
    description: String,
    long_description: Option<String>,
    aliases: Vec<String>,
    usage: String,
    min_args: usize,
    max_args: Option<usize>,
}

impl CommandSpecBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Defaults to the short description when not set.
    pub fn long_description(mut self, long_description: impl Into<String>) -> Self {
        self.long_description = Some(long_description.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn min_args(mut self, min: usize) -> Self {
        self.min_args = min;
        self
    }

    pub fn max_args(mut self, max: usize) -> Self {
        self.max_args = Some(max);
        self
    }

    /// Remove the upper bound on the argument count.
    pub fn unbounded(mut self) -> Self {
        self.max_args = None;
        self
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.min_args = arity.min();
        self.max_args = arity.max();
        self
    }

    pub fn build(self) -> Result<CommandSpec, SpecError> {
        if self.title.is_empty() {
            return Err(SpecError::EmptyField { field: "title" });
        }
        if self.description.is_empty() {
            return Err(SpecError::EmptyField {
                field: "description",
            });
        }
        if self.usage.is_empty() {
            return Err(SpecError::EmptyField { field: "usage" });
        }
        if self.aliases.is_empty() {
            return Err(SpecError::NoAliases);
        }
        if let Some(index) = self.aliases.iter().position(String::is_empty) {
            return Err(SpecError::EmptyAlias { index });
        }
        let arity = Arity::new(self.min_args, self.max_args)?;
        let long_description = self
            .long_description
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.description.clone());

        Ok(CommandSpec {
            title: self.title,
            description: self.description,
            long_description,
            aliases: self.aliases,
            usage: self.usage,
            arity,
        })
    }
}

/// Signature of a command body.
pub type CommandOutcome<C> = Result<CommandResult<C>, CommandError>;

/// Trait that all commands implement.
///
/// `C` is the caller-chosen context threaded through every invocation.
pub trait Command<C>: Send + Sync {
    fn spec(&self) -> &CommandSpec;

    /// Execute the command body. Arity has not necessarily been checked yet;
    /// call [`invoke`] to get the checked, failure-shielded variant.
    fn execute(&self, args: &[String], context: Option<&mut C>) -> CommandOutcome<C>;

    fn accepts_arg_count(&self, count: usize) -> bool {
        self.spec().arity().accepts(count)
    }
}

/// Check arity, then execute `command`, converting errors and panics into
/// error-kind results.
///
/// This is a free function so no [`Command`] implementation can skip the
/// checks; the dispatcher always goes through it.
pub fn invoke<C, K>(command: &K, args: &[String], context: Option<&mut C>) -> CommandResult<C>
where
    K: Command<C> + ?Sized,
{
    let spec = command.spec();
    if !spec.arity().accepts(args.len()) {
        return CommandResult::invalid_arg_count(spec.arity(), args.len());
    }

    match panic::catch_unwind(AssertUnwindSafe(|| command.execute(args, context))) {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => {
            warn!(command = %spec.title(), error = %err, "Command failed");
            CommandResult::error(format!("Command '{}' failed: {}", spec.title(), err))
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            warn!(command = %spec.title(), reason = %reason, "Command panicked");
            CommandResult::error(format!("Command '{}' panicked: {}", spec.title(), reason))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// A command whose body is a closure.
pub struct FnCommand<C, F> {
    spec: CommandSpec,
    body: F,
    _context: PhantomData<fn(&mut C)>,
}

impl<C, F> FnCommand<C, F>
where
    F: Fn(&[String], Option<&mut C>) -> CommandOutcome<C> + Send + Sync,
{
    pub fn new(spec: CommandSpec, body: F) -> Self {
        Self {
            spec,
            body,
            _context: PhantomData,
        }
    }
}

impl<C, F> Command<C> for FnCommand<C, F>
where
    F: Fn(&[String], Option<&mut C>) -> CommandOutcome<C> + Send + Sync,
{
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn execute(&self, args: &[String], context: Option<&mut C>) -> CommandOutcome<C> {
        (self.body)(args, context)
    }
}

/// Placeholder command that always reports [`ResultKind::NotImplemented`](crate::result::ResultKind::NotImplemented).
pub struct StubCommand {
    spec: CommandSpec,
}

impl StubCommand {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }
}

impl<C> Command<C> for StubCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn execute(&self, _args: &[String], _context: Option<&mut C>) -> CommandOutcome<C> {
        Ok(CommandResult::not_implemented(format!(
            "Command '{}' is not implemented yet",
            self.spec.title()
        )))
    }
}
