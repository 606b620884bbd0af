//! # linecmd Core
//!
//! Command-dispatch core for interactive, line-oriented CLI tools.
//! Provides the command registry with alias resolution and similarity search,
//! the built-in help command, the line dispatcher, a declarative flag parser,
//! console styling and layered configuration.
//!
//! ```
//! use std::sync::Arc;
//! use linecmd_core::{CommandResult, CommandSpec, Dispatcher, FnCommand, ParserConfig, SharedCommand};
//!
//! let spec = CommandSpec::builder("Greet")
//!     .description("Say hello")
//!     .aliases(["greet", "hi"])
//!     .usage("greet <name>")
//!     .min_args(1)
//!     .max_args(1)
//!     .build()
//!     .unwrap();
//! let greet: SharedCommand<()> = Arc::new(FnCommand::new(spec, |args: &[String], _ctx: Option<&mut ()>| {
//!     Ok(CommandResult::success(format!("Hello, {}!", args[0])))
//! }));
//!
//! let dispatcher = Dispatcher::new([greet], ParserConfig::default());
//! let result = dispatcher.dispatch(Some("hi ana"), None).unwrap();
//! assert_eq!(result.message(), "Hello, ana!");
//! ```

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod flags;
pub mod help;
pub mod registry;
pub mod result;
pub mod style;

// Re-export commonly used types at the crate root.
pub use command::{
    Arity, Command, CommandOutcome, CommandSpec, CommandSpecBuilder, FnCommand, StubCommand, invoke,
};
pub use config::{LogConfig, ParserConfig, load_config};
pub use dispatch::{Dispatcher, UnknownCommandTips, split_line};
pub use error::{CommandError, ConfigError, FlagError, LinecmdError, Result, SpecError};
pub use flags::{FlagParser, FlagSpec, ParsedFlags};
pub use help::{HelpCommand, Output, stdout_output};
pub use registry::{CommandRegistry, CommandRegistryBuilder, RegistryView, SharedCommand};
pub use result::{CommandResult, ResultKind};
pub use style::{Role, Style, Theme, style};
