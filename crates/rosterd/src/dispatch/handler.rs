//! Connection handler that dispatches directory commands.
//!
//! Each connection carries one request. The handler reads it from the
//! socket, lets the [`CommandRouter`] answer it and then returns; the worker
//! that owns the connection closes the socket afterwards.

use tracing::{debug, warn};

use crate::transport::{Connection, ConnectionHandler};

use super::directory::Directory;
use super::errors::DispatchError;
use super::response::ResponseWriter;
use super::router::{CommandRouter, DISPATCH_TARGET};

/// Connection handler that routes one request per connection.
#[derive(Debug)]
pub struct DispatchConnectionHandler {
    router: CommandRouter,
}

impl DispatchConnectionHandler {
    /// Creates a handler serving `directory`.
    #[must_use]
    pub const fn new(directory: Directory) -> Self {
        Self {
            router: CommandRouter::new(directory),
        }
    }

    fn dispatch(&self, connection: &Connection) {
        let (mut reader, writer) = connection.split();
        let mut response = ResponseWriter::new(writer);
        match self
            .router
            .route(connection.peer().ip(), &mut reader, &mut response)
        {
            Ok(Some(command)) => debug!(
                target: DISPATCH_TARGET,
                connection = connection.id(),
                %command,
                "request served"
            ),
            Ok(None) => debug!(
                target: DISPATCH_TARGET,
                connection = connection.id(),
                "client disconnected without request"
            ),
            Err(error @ DispatchError::UnknownCommand(_)) => warn!(
                target: DISPATCH_TARGET,
                connection = connection.id(),
                peer = %connection.peer(),
                %error,
                "unknown command ignored"
            ),
            Err(error) => warn!(
                target: DISPATCH_TARGET,
                connection = connection.id(),
                peer = %connection.peer(),
                %error,
                "dispatch failed"
            ),
        }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, connection: &Connection) {
        self.dispatch(connection);
    }
}
