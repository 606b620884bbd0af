//! REPL (Read-Eval-Print Loop) for interactive and single-line modes.

use std::io::{self, BufRead, Write};

use linecmd_core::{CommandResult, Dispatcher, ResultKind};
use tracing::{debug, info};

use crate::commands::Session;

/// Print the outcome of one dispatched line to `err`.
///
/// Successful results are only logged; commands print their own output.
/// Returns whether the result was successful.
pub fn report<W: Write>(
    dispatcher: &Dispatcher<Session>,
    result: &CommandResult<Session>,
    err: &mut W,
) -> io::Result<bool> {
    match result.kind() {
        ResultKind::Success => {
            debug!(message = %result.message(), "Command succeeded");
            return Ok(true);
        }
        ResultKind::UnknownCommand { name } => {
            writeln!(err, "{}", dispatcher.render_unknown_command(name))?;
        }
        _ => {
            writeln!(err, "{}", result.render_error(&dispatcher.config().theme))?;
        }
    }
    Ok(false)
}

/// Read lines from `input` until EOF or until the session stops running.
///
/// Returns the number of lines dispatched.
pub fn run_interactive<R, W, E>(
    dispatcher: &Dispatcher<Session>,
    session: &mut Session,
    mut input: R,
    out: &mut W,
    err: &mut E,
) -> io::Result<usize>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let prompt = dispatcher.config().styled_prompt();
    let mut dispatched = 0;

    info!("Interactive session started");
    while session.is_running() {
        write!(out, "{prompt}")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // EOF
            writeln!(out)?;
            break;
        }
        let line = line.strip_suffix('\n').unwrap_or(&line);
        let line = line.strip_suffix('\r').unwrap_or(line);

        if let Some(result) = dispatcher.dispatch(Some(line), Some(&mut *session)) {
            dispatched += 1;
            report(dispatcher, &result, err)?;
        }
    }
    info!(dispatched, "Interactive session ended");

    Ok(dispatched)
}

/// Dispatch a single line. Returns whether it succeeded.
///
/// An empty line counts as success.
pub fn run_single<E: Write>(
    dispatcher: &Dispatcher<Session>,
    session: &mut Session,
    line: &str,
    err: &mut E,
) -> io::Result<bool> {
    match dispatcher.dispatch(Some(line), Some(&mut *session)) {
        Some(result) => report(dispatcher, &result, err),
        None => Ok(true),
    }
}
