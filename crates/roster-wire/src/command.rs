//! Command tokens opening every request.

use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

/// Commands understood by the daemon.
///
/// Tokens are matched exactly and in upper case, for example `LIST_USERS`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Creates a user.
    Register,
    /// Deletes a user and everything they own.
    Unregister,
    /// Opens a session for a registered user.
    Connect,
    /// Closes a user's session.
    Disconnect,
    /// Adds a content item to a user's catalogue.
    Publish,
    /// Removes a content item from a user's catalogue.
    Delete,
    /// Lists connected users.
    ListUsers,
    /// Lists a user's content items.
    ListContent,
}

/// A command token that does not name any [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command token '{token}'")]
pub struct UnknownCommand {
    /// The token as received, lossily decoded.
    pub token: String,
}

impl Command {
    /// Parses a command token as read off the wire.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCommand`] when the token names no command.
    pub fn from_token(token: &[u8]) -> Result<Self, UnknownCommand> {
        let text = String::from_utf8_lossy(token);
        Self::from_str(&text).map_err(|_| UnknownCommand {
            token: text.into_owned(),
        })
    }

    /// Returns the wire token for the command.
    #[must_use]
    pub fn token(self) -> &'static str {
        self.into()
    }
}
