//! Request dispatch for the directory protocol.
//!
//! A connection carries exactly one request: a command token followed by the
//! command's argument tokens. The router reads the command, hands the
//! arguments to the matching handler and writes the handler's result code,
//! plus the listing body for `LIST_USERS` and `LIST_CONTENT`. Failures inside
//! a recognised command are reported as that command's `OTHER_ERROR` code;
//! an unrecognised command gets no response at all.

mod content;
mod directory;
mod errors;
mod handler;
mod listing;
mod registration;
mod request;
mod response;
mod router;
mod session;

pub use self::directory::Directory;
pub use self::errors::DispatchError;
pub use self::handler::DispatchConnectionHandler;
pub use self::router::CommandRouter;
