//! linecmd - interactive demo shell built on the linecmd dispatch core.
//!
//! Runs one line and exits when a line is given, otherwise starts the REPL.

mod commands;
mod repl;

use clap::Parser;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use linecmd_core::{Dispatcher, ParserConfig, stdout_output};

use crate::commands::{Session, builtin_commands};

/// linecmd: a small line-oriented command shell
#[derive(Parser, Debug)]
#[command(name = "linecmd", version, about, long_about = None)]
struct Cli {
    /// Line to execute (starts interactive mode if omitted)
    line: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,

    /// Disable ANSI styling
    #[arg(long)]
    no_color: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create the default user configuration file
    Init,
    /// Show the effective configuration
    Show,
}

fn filter_directive(cli: &Cli, config: &ParserConfig) -> String {
    match cli.verbose {
        0 if cli.quiet => "error".to_string(),
        0 => config.log.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Human-readable stderr logging, plus JSON file logging when enabled.
///
/// The returned guard must live until exit so buffered file logs are flushed.
fn init_tracing(cli: &Cli, config: &ParserConfig) -> Option<WorkerGuard> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_ansi(config.theme.enabled)
        .with_filter(EnvFilter::new(filter_directive(cli, config)));

    let mut guard = None;
    let json_layer = if config.log.file {
        let log_dir = config
            .log
            .directory
            .clone()
            .or_else(linecmd_core::config::default_log_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let _ = std::fs::create_dir_all(&log_dir);
        let file_appender = tracing_appender::rolling::daily(&log_dir, "linecmd.log");
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);
        Some(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new("debug")),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    guard
}

/// Write the default config to `path` unless a file is already there.
///
/// Returns whether a file was created.
fn init_config(path: &Path) -> anyhow::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(&ParserConfig::default())?;
    std::fs::write(path, &toml_str)?;
    Ok(true)
}

/// The effective configuration rendered as TOML.
fn show_config(explicit: Option<&Path>) -> anyhow::Result<String> {
    let config = linecmd_core::load_config(explicit)
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    Ok(toml::to_string_pretty(&config)?)
}

fn handle_config(action: ConfigAction, explicit: Option<&Path>) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = linecmd_core::config::user_config_path()
                .ok_or_else(|| anyhow::anyhow!("Could not determine the user config directory"))?;
            if init_config(&config_path)? {
                println!("Created configuration file at: {}", config_path.display());
            } else {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
            }
        }
        ConfigAction::Show => println!("{}", show_config(explicit)?),
    }
    Ok(())
}

fn main() -> anyhow::Result<ExitCode> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = linecmd_core::load_config(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    if cli.no_color {
        config.theme.enabled = false;
    }

    let _guard = init_tracing(&cli, &config);

    if let Some(Commands::Config { action }) = cli.command {
        handle_config(action, cli.config.as_deref())?;
        return Ok(ExitCode::SUCCESS);
    }

    let commands = builtin_commands()?;
    let dispatcher = Dispatcher::new(commands, config);
    let mut session = Session::new(stdout_output());
    tracing::debug!(commands = dispatcher.commands().len(), "Dispatcher ready");

    if let Some(line) = cli.line {
        let ok = repl::run_single(&dispatcher, &mut session, &line, &mut io::stderr())?;
        return Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    let stdin = io::stdin();
    repl::run_interactive(
        &dispatcher,
        &mut session,
        stdin.lock(),
        &mut io::stdout(),
        &mut io::stderr(),
    )?;
    Ok(ExitCode::SUCCESS)
}
