//! Wire protocol shared by the roster daemon and its clients.
//!
//! Requests are a command token followed by argument tokens; responses open
//! with a single result byte. See [`frame`] for the token encoding, [`codes`]
//! for the per-command result tables and [`client`] for a blocking client.

pub mod client;
pub mod codes;
pub mod command;
pub mod frame;
pub mod names;

pub use client::{Client, ClientError, ConnectedUser, Listing};
pub use codes::{
    ConnectCode, DeleteCode, DisconnectCode, ListContentCode, ListUsersCode, PublishCode,
    RegisterCode, ResultCode, UnregisterCode,
};
pub use command::{Command, UnknownCommand};
pub use frame::{FrameError, MAX_COMMAND_BYTES, MAX_TOKEN_BYTES};
pub use names::{ContentName, NameError, Username};
