//! Error types for request dispatch failures.

use thiserror::Error;

use roster_wire::{FrameError, NameError, UnknownCommand};

use crate::sessions::SessionError;
use crate::store::StoreError;

/// Errors surfaced while reading, handling or answering a request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The command token could not be read.
    #[error("failed to read command: {0}")]
    ReadCommand(#[source] FrameError),
    /// The command token names no known command.
    #[error(transparent)]
    UnknownCommand(#[from] UnknownCommand),
    /// An argument token could not be read.
    #[error("failed to read {argument}: {source}")]
    ReadArgument {
        /// Argument being read.
        argument: &'static str,
        /// Underlying framing error.
        #[source]
        source: FrameError,
    },
    /// An argument token was read but is not acceptable.
    #[error("invalid {argument}: {source}")]
    InvalidArgument {
        /// Argument being validated.
        argument: &'static str,
        /// Validation failure.
        #[source]
        source: NameError,
    },
    /// The port token is not a number between 1 and 65535.
    #[error("invalid port '{token}'")]
    InvalidPort {
        /// Token as received.
        token: String,
    },
    /// The response could not be written.
    #[error("failed to write response: {0}")]
    WriteResponse(#[source] FrameError),
    /// The user directory store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The session registry failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}
