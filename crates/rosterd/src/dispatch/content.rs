//! `PUBLISH` and `DELETE`.

use std::io::Read;

use tracing::info;

use roster_wire::{DeleteCode, PublishCode};

use crate::store::StoreError;

use super::directory::{Directory, Standing};
use super::errors::DispatchError;
use super::request::{read_content_name, read_description, read_username};
use super::router::DISPATCH_TARGET;

pub(super) fn publish<R: Read>(
    directory: &Directory,
    request: &mut R,
) -> Result<PublishCode, DispatchError> {
    let user = read_username(request, "username")?;
    let file = read_content_name(request)?;
    let description = read_description(request)?;
    match directory.standing(&user)? {
        Standing::Unregistered => return Ok(PublishCode::NoSuchUser),
        Standing::Disconnected => return Ok(PublishCode::Disconnected),
        Standing::Connected => {}
    }
    match directory.store().publish(&user, &file, &description) {
        Ok(()) => {
            info!(target: DISPATCH_TARGET, user = %user, file = %file, "content published");
            Ok(PublishCode::Success)
        }
        Err(StoreError::ContentExists { .. }) => Ok(PublishCode::AlreadyPublished),
        Err(StoreError::NotFound { .. }) => Ok(PublishCode::NoSuchUser),
        Err(error) => Err(error.into()),
    }
}

pub(super) fn delete<R: Read>(
    directory: &Directory,
    request: &mut R,
) -> Result<DeleteCode, DispatchError> {
    let user = read_username(request, "username")?;
    let file = read_content_name(request)?;
    match directory.standing(&user)? {
        Standing::Unregistered => return Ok(DeleteCode::NoSuchUser),
        Standing::Disconnected => return Ok(DeleteCode::Disconnected),
        Standing::Connected => {}
    }
    match directory.store().remove_content(&user, &file) {
        Ok(()) => {
            info!(target: DISPATCH_TARGET, user = %user, file = %file, "content deleted");
            Ok(DeleteCode::Success)
        }
        Err(StoreError::ContentNotFound { .. }) => Ok(DeleteCode::NotPublished),
        Err(StoreError::NotFound { .. }) => Ok(DeleteCode::NoSuchUser),
        Err(error) => Err(error.into()),
    }
}
