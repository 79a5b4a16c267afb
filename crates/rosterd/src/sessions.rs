//! In-memory registry of connected users.
//!
//! `CONNECT` records the peer address a user connected from and the port they
//! declared; `DISCONNECT` and `UNREGISTER` remove the record. Sessions do not
//! survive a daemon restart.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, error};

use roster_wire::Username;

const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::sessions");

/// Where a connected user can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// Address the `CONNECT` request arrived from.
    pub address: IpAddr,
    /// Port the user declared in the `CONNECT` request.
    pub port: u16,
}

/// Errors surfaced by [`SessionRegistry`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The user already has a session.
    #[error("user '{user}' is already connected")]
    AlreadyConnected {
        /// Username.
        user: String,
    },
    /// The user has no session.
    #[error("user '{user}' is not connected")]
    NotConnected {
        /// Username.
        user: String,
    },
    /// A previous holder of the registry lock panicked.
    #[error("session registry lock poisoned")]
    LockPoisoned,
}

/// Sessions keyed by username.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<BTreeMap<Username, Session>>,
}

impl SessionRegistry {
    /// Builds an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a session for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyConnected`] when a session exists.
    pub fn connect(&self, user: &Username, session: Session) -> Result<(), SessionError> {
        let mut sessions = self.acquire()?;
        if sessions.contains_key(user) {
            return Err(SessionError::AlreadyConnected {
                user: user.to_string(),
            });
        }
        sessions.insert(user.clone(), session);
        debug!(
            target: SESSION_TARGET,
            user = %user,
            address = %session.address,
            port = session.port,
            "session opened"
        );
        Ok(())
    }

    /// Removes the session for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotConnected`] when no session exists.
    pub fn disconnect(&self, user: &Username) -> Result<(), SessionError> {
        let mut sessions = self.acquire()?;
        match sessions.remove(user) {
            Some(_) => {
                debug!(target: SESSION_TARGET, user = %user, "session closed");
                Ok(())
            }
            None => Err(SessionError::NotConnected {
                user: user.to_string(),
            }),
        }
    }

    /// Removes any session for `user`, returning whether one existed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::LockPoisoned`] when the lock is unusable.
    pub fn forget(&self, user: &Username) -> Result<bool, SessionError> {
        Ok(self.acquire()?.remove(user).is_some())
    }

    /// Returns whether `user` has a session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::LockPoisoned`] when the lock is unusable.
    pub fn is_connected(&self, user: &Username) -> Result<bool, SessionError> {
        Ok(self.acquire()?.contains_key(user))
    }

    /// Copies every session, ordered by username.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::LockPoisoned`] when the lock is unusable.
    pub fn snapshot(&self) -> Result<Vec<(Username, Session)>, SessionError> {
        Ok(self
            .acquire()?
            .iter()
            .map(|(user, session)| (user.clone(), *session))
            .collect())
    }

    /// Poisons the registry lock by panicking while holding it.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let outcome: std::thread::Result<()> = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = self.sessions.lock();
                    panic!("poisoning the session registry");
                })
                .join()
        });
        assert!(outcome.is_err(), "poisoning thread must panic");
    }

    fn acquire(&self) -> Result<MutexGuard<'_, BTreeMap<Username, Session>>, SessionError> {
        self.sessions.lock().map_err(|_| {
            error!(target: SESSION_TARGET, "session registry lock poisoned");
            SessionError::LockPoisoned
        })
    }
}
