//! CLI argument definitions for the roster client.

use clap::{Parser, Subcommand};

use roster_config::DEFAULT_PORT;

/// Command-line client for the roster directory daemon.
#[derive(Parser, Debug)]
#[command(name = "roster", disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Host name or address of the daemon.
    #[arg(long, default_value = "127.0.0.1")]
    pub(crate) host: String,
    /// TCP port of the daemon.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub(crate) port: u16,
    /// Connect, read and write timeout in milliseconds.
    #[arg(long, default_value_t = 5_000)]
    pub(crate) timeout_ms: u64,
    /// Request to send.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Requests understood by the daemon.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Creates a user.
    Register { username: String },
    /// Removes a user and all of their content.
    Unregister { username: String },
    /// Opens a session, declaring the port the user listens on.
    Connect { username: String, port: u16 },
    /// Closes the user's session.
    Disconnect { username: String },
    /// Publishes a content item with a description.
    Publish {
        username: String,
        file: String,
        description: String,
    },
    /// Deletes a published content item.
    Delete { username: String, file: String },
    /// Lists every connected user.
    ListUsers { username: String },
    /// Lists the content another user has published.
    ListContent { username: String, owner: String },
}
