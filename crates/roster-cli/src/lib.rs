//! Command-line client for the roster directory daemon.
//!
//! Each invocation sends one request over a fresh TCP connection and prints
//! the daemon's answer. Failure codes exit with status 1; usage, connection
//! and protocol errors exit with status 2.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use roster_wire::Client;

mod cli;
mod errors;
mod outcome;

use cli::{Cli, CliCommand};
use errors::AppError;
use outcome::Outcome;

const FAILURE_STATUS: u8 = 1;
const ERROR_STATUS: u8 = 2;

/// Parses `args`, sends the request and writes the outcome.
pub fn run<I, T, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) if !error.use_stderr() => {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => return report(stderr, &AppError::CliUsage(error)),
    };
    let outcome = match execute(&cli) {
        Ok(outcome) => outcome,
        Err(error) => return report(stderr, &error),
    };
    if let Err(error) = print(stdout, &outcome) {
        return report(stderr, &error);
    }
    if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(FAILURE_STATUS)
    }
}

fn execute(cli: &Cli) -> Result<Outcome, AppError> {
    let client =
        Client::resolve(&cli.host, cli.port)?.with_timeout(Duration::from_millis(cli.timeout_ms));
    let outcome = match &cli.command {
        CliCommand::Register { username } => outcome::register(client.register(username)?),
        CliCommand::Unregister { username } => outcome::unregister(client.unregister(username)?),
        CliCommand::Connect { username, port } => {
            outcome::connect(client.connect(username, *port)?)
        }
        CliCommand::Disconnect { username } => outcome::disconnect(client.disconnect(username)?),
        CliCommand::Publish {
            username,
            file,
            description,
        } => outcome::publish(client.publish(username, file, description)?),
        CliCommand::Delete { username, file } => outcome::delete(client.delete(username, file)?),
        CliCommand::ListUsers { username } => outcome::list_users(client.list_users(username)?),
        CliCommand::ListContent { username, owner } => {
            outcome::list_content(client.list_content(username, owner)?)
        }
    };
    Ok(outcome)
}

fn print<W: Write>(stdout: &mut W, outcome: &Outcome) -> Result<(), AppError> {
    for line in &outcome.lines {
        writeln!(stdout, "{line}").map_err(AppError::WriteOutput)?;
    }
    stdout.flush().map_err(AppError::WriteOutput)
}

fn report<E: Write>(stderr: &mut E, error: &AppError) -> ExitCode {
    match error {
        AppError::CliUsage(usage) => {
            let _ = write!(stderr, "{usage}");
        }
        other => {
            let _ = writeln!(stderr, "roster: {other}");
        }
    }
    ExitCode::from(ERROR_STATUS)
}
