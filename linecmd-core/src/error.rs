//! Error types for the linecmd core.
//!
//! Uses `thiserror` for public API error types. Dispatch outcomes are not errors:
//! they are reported as [`CommandResult`](crate::result::CommandResult) values.
//! The enums here cover the boundaries that do fail outward: command metadata
//! construction, flag parsing, command execution and configuration loading.

use std::path::PathBuf;

/// Top-level error type for the linecmd core library.
#[derive(Debug, thiserror::Error)]
pub enum LinecmdError {
    #[error("Invalid command definition: {0}")]
    Spec(#[from] SpecError),

    #[error("Flag error: {0}")]
    Flag(#[from] FlagError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while building a [`CommandSpec`](crate::command::CommandSpec)
/// or a [`FlagSpec`](crate::flags::FlagSpec).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("at least one alias is required")]
    NoAliases,

    #[error("alias #{index} is empty")]
    EmptyAlias { index: usize },

    #[error("max args ({max}) is lower than min args ({min})")]
    InvalidArity { min: usize, max: usize },
}

/// Errors from [`FlagParser::parse`](crate::flags::FlagParser::parse).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlagError {
    #[error("Unknown argument: {token}")]
    UnknownArgument { token: String },

    #[error("Argument {flag} requires a value")]
    MissingValue { flag: String },

    #[error("Missing required arguments: {}", flags.join(", "))]
    MissingRequired { flags: Vec<String> },
}

/// Failure raised by a command body.
///
/// The dispatcher converts these into error-kind results; they never escape
/// [`Dispatcher::dispatch`](crate::dispatch::Dispatcher::dispatch).
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{message}")]
    Failed { message: String },

    #[error(transparent)]
    Flags(#[from] FlagError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CommandError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Convenience alias for results using [`LinecmdError`].
pub type Result<T> = std::result::Result<T, LinecmdError>;
