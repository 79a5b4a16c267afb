//! Command routing for the dispatch loop.

use std::io::{Read, Write};
use std::net::IpAddr;

use tracing::{debug, warn};

use roster_wire::{Command, FrameError, MAX_COMMAND_BYTES, ResultCode, frame};

use super::directory::Directory;
use super::errors::DispatchError;
use super::response::{Reply, ResponseWriter};
use super::{content, listing, registration, session};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Routes one request to its handler and answers it.
#[derive(Debug)]
pub struct CommandRouter {
    directory: Directory,
}

impl CommandRouter {
    /// Creates a router serving `directory`.
    #[must_use]
    pub const fn new(directory: Directory) -> Self {
        Self { directory }
    }

    /// State the handlers operate on.
    #[must_use]
    pub const fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Reads a command from `request`, runs it and writes the reply.
    ///
    /// Returns `Ok(None)` when the peer closed the stream without sending a
    /// command. Errors from inside a recognised command are answered with the
    /// command's `OTHER_ERROR` code rather than returned.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::ReadCommand`] or
    /// [`DispatchError::UnknownCommand`] when no command could be identified;
    /// nothing is written in that case. Returns
    /// [`DispatchError::WriteResponse`] when the reply cannot be delivered.
    pub(crate) fn route<R: Read, W: Write>(
        &self,
        peer: IpAddr,
        request: &mut R,
        response: &mut ResponseWriter<W>,
    ) -> Result<Option<Command>, DispatchError> {
        let token = match frame::read_frame(request, MAX_COMMAND_BYTES) {
            Ok(token) => token,
            Err(FrameError::Closed) => return Ok(None),
            Err(error) => return Err(DispatchError::ReadCommand(error)),
        };
        let command = Command::from_token(&token)?;
        debug!(target: DISPATCH_TARGET, %command, "dispatching request");

        let directory = &self.directory;
        match command {
            Command::Register => respond(
                command,
                response,
                registration::register(directory, request).map(Reply::from),
            ),
            Command::Unregister => respond(
                command,
                response,
                registration::unregister(directory, request).map(Reply::from),
            ),
            Command::Connect => respond(
                command,
                response,
                session::connect(directory, peer, request).map(Reply::from),
            ),
            Command::Disconnect => respond(
                command,
                response,
                session::disconnect(directory, request).map(Reply::from),
            ),
            Command::Publish => respond(
                command,
                response,
                content::publish(directory, request).map(Reply::from),
            ),
            Command::Delete => respond(
                command,
                response,
                content::delete(directory, request).map(Reply::from),
            ),
            Command::ListUsers => respond(command, response, listing::list_users(directory, request)),
            Command::ListContent => {
                respond(command, response, listing::list_content(directory, request))
            }
        }?;
        Ok(Some(command))
    }
}

fn respond<C: ResultCode, W: Write>(
    command: Command,
    response: &mut ResponseWriter<W>,
    outcome: Result<Reply<C>, DispatchError>,
) -> Result<(), DispatchError> {
    let reply = outcome.unwrap_or_else(|error| {
        warn!(
            target: DISPATCH_TARGET,
            %command,
            %error,
            "request failed"
        );
        Reply::from(C::OTHER_ERROR)
    });
    response.write_reply(&reply)?;
    response.finish()?;
    debug!(
        target: DISPATCH_TARGET,
        %command,
        code = reply.code.as_byte(),
        "response sent"
    );
    Ok(())
}

#[cfg(test)]
mod tests;
