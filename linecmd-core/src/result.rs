//! Dispatch outcomes.
//!
//! Every dispatch attempt on a non-empty line yields exactly one
//! [`CommandResult`]. Results are plain data: failures are a [`ResultKind`],
//! never a panic or an `Err` crossing the dispatch boundary.

use std::fmt;

use crate::command::Arity;
use crate::style::{Role, Theme};

/// What happened when a command line was dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultKind {
    Success,
    /// Generic failure, e.g. an error surfaced from a command body.
    Error,
    InvalidArgumentCount { arity: Arity, got: usize },
    UnknownCommand { name: String },
    /// Placeholder for stubbed commands.
    NotImplemented,
}

impl ResultKind {
    /// Prefix used when rendering a result on the console.
    pub fn prefix(&self) -> &'static str {
        match self {
            ResultKind::Success => "[SUCCESS]",
            ResultKind::Error => "[ERROR]",
            ResultKind::InvalidArgumentCount { .. } => "[INVALID ARGS]",
            ResultKind::UnknownCommand { .. } => "[UNKNOWN COMMAND]",
            ResultKind::NotImplemented => "[NOT IMPLEMENTED]",
        }
    }

    /// Short label describing the category of the result.
    pub fn cause(&self) -> &'static str {
        match self {
            ResultKind::Success => "Info",
            ResultKind::Error => "An error occurred",
            ResultKind::InvalidArgumentCount { .. } => "Invalid arguments",
            ResultKind::UnknownCommand { .. } => "Unknown command",
            ResultKind::NotImplemented => "Not implemented",
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, ResultKind::Success)
    }
}

/// Outcome of a command invocation, with an optional typed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult<T> {
    kind: ResultKind,
    message: String,
    payload: Option<T>,
}

impl<T> CommandResult<T> {
    pub fn new(kind: ResultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            payload: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ResultKind::Success, message)
    }

    /// A successful result carrying `payload`.
    pub fn success_with(message: impl Into<String>, payload: T) -> Self {
        Self::success(message).with_payload(payload)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ResultKind::Error, message)
    }

    pub fn invalid_arg_count(arity: Arity, got: usize) -> Self {
        let message = format!("Argument count must be {}, got {}", arity, got);
        Self::new(ResultKind::InvalidArgumentCount { arity, got }, message)
    }

    pub fn unknown_command(name: impl Into<String>) -> Self {
        let name = name.into();
        let message = format!("Unknown command: {}", name);
        Self::new(ResultKind::UnknownCommand { name }, message)
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(ResultKind::NotImplemented, message)
    }

    pub fn with_payload(mut self, payload: T) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn kind(&self) -> &ResultKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> &'static str {
        self.kind.cause()
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn into_payload(self) -> Option<T> {
        self.payload
    }

    pub fn is_error(&self) -> bool {
        self.kind.is_error()
    }

    /// Render the standard `[ERROR] <cause>: <message>` line.
    pub fn render_error(&self, theme: &Theme) -> String {
        theme.paint(
            &format!("[ERROR] {}: {}", self.cause(), self.message),
            Role::Error,
        )
    }
}

impl<T> fmt::Display for CommandResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.prefix(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_arg_count_reports_bounds_and_count() {
        let result: CommandResult<()> = CommandResult::invalid_arg_count(Arity::between(1, 2), 3);
        assert_eq!(
            result.message(),
            "Argument count must be between 1 and 2, got 3"
        );
        assert_eq!(
            result.kind(),
            &ResultKind::InvalidArgumentCount {
                arity: Arity::between(1, 2),
                got: 3
            }
        );
        assert!(result.is_error());
    }

    #[test]
    fn test_invalid_arg_count_unbounded() {
        let result: CommandResult<()> = CommandResult::invalid_arg_count(Arity::at_least(2), 0);
        assert_eq!(result.message(), "Argument count must be at least 2, got 0");
    }

    #[test]
    fn test_unknown_command_carries_name() {
        let result: CommandResult<()> = CommandResult::unknown_command("frobnicate");
        match result.kind() {
            ResultKind::UnknownCommand { name } => assert_eq!(name, "frobnicate"),
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(result.cause(), "Unknown command");
    }

    #[test]
    fn test_success_is_not_error_and_carries_payload() {
        let result = CommandResult::success_with("done", 42);
        assert!(!result.is_error());
        assert_eq!(result.payload(), Some(&42));
        assert_eq!(result.into_payload(), Some(42));
    }

    #[test]
    fn test_display_uses_prefix() {
        let result: CommandResult<()> = CommandResult::not_implemented("later");
        assert_eq!(result.to_string(), "[NOT IMPLEMENTED] later");
        let result: CommandResult<()> = CommandResult::success("ok");
        assert_eq!(result.to_string(), "[SUCCESS] ok");
    }

    #[test]
    fn test_render_error_plain() {
        let result: CommandResult<()> = CommandResult::error("boom");
        assert_eq!(
            result.render_error(&Theme::plain()),
            "[ERROR] An error occurred: boom"
        );
    }
}
