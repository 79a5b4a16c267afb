//! Multi-client directory server.
//!
//! `rosterd` accepts TCP connections, reads one request per connection and
//! answers it. Requests register and unregister users, open and close user
//! sessions, publish and delete content items, and list connected users or a
//! user's content. Each registered user owns a directory under the
//! configured storage root; published content lives as plain files inside
//! it. Sessions are kept in memory only.
//!
//! Startup follows a fixed sequence: load configuration through
//! [`roster_config`], initialise structured telemetry, open the storage root,
//! bind the listener and arm the shutdown signals. Health reporting hooks
//! emit a structured event at each stage.
//!
//! The listener hands every accepted connection to a bounded worker pool.
//! When every worker is busy and the backlog is full, new connections are
//! closed immediately.

mod bootstrap;
mod dispatch;
mod health;
mod process;
mod sessions;
mod store;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use dispatch::{CommandRouter, Directory, DispatchConnectionHandler, DispatchError};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon};
pub use sessions::{Session, SessionError, SessionRegistry};
pub use store::{StoreError, UserStore};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{
    Connection, ConnectionHandler, ListenerError, ListenerHandle, ListenerSettings, SocketListener,
};

#[cfg(test)]
mod tests;
