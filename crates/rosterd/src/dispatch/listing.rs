//! `LIST_USERS` and `LIST_CONTENT`.

use std::io::Read;

use roster_wire::{ListContentCode, ListUsersCode};

use crate::store::StoreError;

use super::directory::{Directory, Standing};
use super::errors::DispatchError;
use super::request::read_username;
use super::response::{Body, Reply};

/// Lists every connected user on behalf of a connected requester.
pub(super) fn list_users<R: Read>(
    directory: &Directory,
    request: &mut R,
) -> Result<Reply<ListUsersCode>, DispatchError> {
    let requester = read_username(request, "username")?;
    match directory.standing(&requester)? {
        Standing::Unregistered => Ok(ListUsersCode::NoSuchUser.into()),
        Standing::Disconnected => Ok(ListUsersCode::Disconnected.into()),
        Standing::Connected => {
            let users = directory.sessions().snapshot()?;
            Ok(Reply::new(ListUsersCode::Success, Body::Users(users)))
        }
    }
}

/// Lists the owner's content on behalf of a connected requester.
pub(super) fn list_content<R: Read>(
    directory: &Directory,
    request: &mut R,
) -> Result<Reply<ListContentCode>, DispatchError> {
    let requester = read_username(request, "username")?;
    let owner = read_username(request, "content owner")?;
    match directory.standing(&requester)? {
        Standing::Unregistered => return Ok(ListContentCode::NotRegistered.into()),
        Standing::Disconnected => return Ok(ListContentCode::Disconnected.into()),
        Standing::Connected => {}
    }
    match directory.store().list_files(&owner) {
        Ok(files) => Ok(Reply::new(ListContentCode::Success, Body::Files(files))),
        Err(StoreError::NotFound { .. }) => Ok(ListContentCode::NoSuchFilesOwner.into()),
        Err(error) => Err(error.into()),
    }
}
