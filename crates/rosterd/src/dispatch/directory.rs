//! Shared state the command handlers operate on.

use roster_wire::Username;

use crate::sessions::SessionRegistry;
use crate::store::UserStore;

use super::errors::DispatchError;

/// Where a requesting user stands before a gated command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Standing {
    /// No directory exists for the user.
    Unregistered,
    /// The user is registered but has no session.
    Disconnected,
    /// The user is registered and has a session.
    Connected,
}

/// User directory store and session registry served by the daemon.
#[derive(Debug)]
pub struct Directory {
    store: UserStore,
    sessions: SessionRegistry,
}

impl Directory {
    /// Combines a store and a session registry.
    #[must_use]
    pub const fn new(store: UserStore, sessions: SessionRegistry) -> Self {
        Self { store, sessions }
    }

    /// Persistent user directories.
    #[must_use]
    pub const fn store(&self) -> &UserStore {
        &self.store
    }

    /// Connected users.
    #[must_use]
    pub const fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub(crate) fn standing(&self, user: &Username) -> Result<Standing, DispatchError> {
        if !self.store.is_registered(user)? {
            return Ok(Standing::Unregistered);
        }
        if !self.sessions.is_connected(user)? {
            return Ok(Standing::Disconnected);
        }
        Ok(Standing::Connected)
    }
}
