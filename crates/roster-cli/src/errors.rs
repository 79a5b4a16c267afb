//! Error types for the CLI runtime.

use std::io;

use roster_wire::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
}
