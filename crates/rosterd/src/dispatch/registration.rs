//! `REGISTER` and `UNREGISTER`.

use std::io::Read;

use tracing::{info, warn};

use roster_wire::{RegisterCode, UnregisterCode};

use crate::store::StoreError;

use super::directory::Directory;
use super::errors::DispatchError;
use super::request::read_username;
use super::router::DISPATCH_TARGET;

pub(super) fn register<R: Read>(
    directory: &Directory,
    request: &mut R,
) -> Result<RegisterCode, DispatchError> {
    let user = read_username(request, "username")?;
    match directory.store().create_user(&user) {
        Ok(()) => {
            info!(target: DISPATCH_TARGET, user = %user, "user registered");
            Ok(RegisterCode::Success)
        }
        Err(StoreError::Exists { .. }) => Ok(RegisterCode::NonUniqueUsername),
        Err(error) => Err(error.into()),
    }
}

/// Deletes the user's content and directory, then drops any session while
/// the store lock is still held.
///
/// The user is gone once the directory is removed, so a session that cannot
/// be dropped is logged rather than reported.
pub(super) fn unregister<R: Read>(
    directory: &Directory,
    request: &mut R,
) -> Result<UnregisterCode, DispatchError> {
    let user = read_username(request, "username")?;
    let removed = directory
        .store()
        .delete_user_then(&user, || directory.sessions().forget(&user));
    match removed {
        Ok(forgotten) => {
            if let Err(error) = forgotten {
                warn!(
                    target: DISPATCH_TARGET,
                    user = %user,
                    error = %error,
                    "user removed but its session could not be dropped"
                );
            }
            info!(target: DISPATCH_TARGET, user = %user, "user unregistered");
            Ok(UnregisterCode::Success)
        }
        Err(StoreError::NotFound { .. }) => Ok(UnregisterCode::NoSuchUser),
        Err(error) => Err(error.into()),
    }
}
