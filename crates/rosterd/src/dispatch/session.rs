//! `CONNECT` and `DISCONNECT`.

use std::io::Read;
use std::net::IpAddr;

use tracing::info;

use roster_wire::{ConnectCode, DisconnectCode};

use crate::sessions::{Session, SessionError};

use super::directory::Directory;
use super::errors::DispatchError;
use super::request::{read_port, read_username};
use super::router::DISPATCH_TARGET;

pub(super) fn connect<R: Read>(
    directory: &Directory,
    peer: IpAddr,
    request: &mut R,
) -> Result<ConnectCode, DispatchError> {
    let user = read_username(request, "username")?;
    let port = read_port(request)?;
    let session = Session {
        address: peer,
        port,
    };
    let opened = directory
        .store()
        .with_registered(&user, || directory.sessions().connect(&user, session))?;
    let Some(opened) = opened else {
        return Ok(ConnectCode::NoSuchUser);
    };
    match opened {
        Ok(()) => {
            info!(
                target: DISPATCH_TARGET,
                user = %user,
                address = %peer,
                port,
                "user connected"
            );
            Ok(ConnectCode::Success)
        }
        Err(SessionError::AlreadyConnected { .. }) => Ok(ConnectCode::AlreadyConnected),
        Err(error) => Err(error.into()),
    }
}

pub(super) fn disconnect<R: Read>(
    directory: &Directory,
    request: &mut R,
) -> Result<DisconnectCode, DispatchError> {
    let user = read_username(request, "username")?;
    if !directory.store().is_registered(&user)? {
        return Ok(DisconnectCode::NoSuchUser);
    }
    match directory.sessions().disconnect(&user) {
        Ok(()) => {
            info!(target: DISPATCH_TARGET, user = %user, "user disconnected");
            Ok(DisconnectCode::Success)
        }
        Err(SessionError::NotConnected { .. }) => Ok(DisconnectCode::NotConnected),
        Err(error) => Err(error.into()),
    }
}
