//! Argument readers shared by the command handlers.

use std::io::Read;

use roster_wire::{ContentName, FrameError, MAX_TOKEN_BYTES, Username, frame};

use super::errors::DispatchError;

pub(super) fn read_username<R: Read>(
    request: &mut R,
    argument: &'static str,
) -> Result<Username, DispatchError> {
    let token = read_token(request, argument)?;
    Username::from_bytes(&token).map_err(|source| DispatchError::InvalidArgument { argument, source })
}

pub(super) fn read_content_name<R: Read>(request: &mut R) -> Result<ContentName, DispatchError> {
    let argument = "file name";
    let token = read_token(request, argument)?;
    ContentName::from_bytes(&token)
        .map_err(|source| DispatchError::InvalidArgument { argument, source })
}

/// Reads free text; an empty description is allowed.
pub(super) fn read_description<R: Read>(request: &mut R) -> Result<String, DispatchError> {
    frame::read_text(request, MAX_TOKEN_BYTES).map_err(|source| DispatchError::ReadArgument {
        argument: "description",
        source,
    })
}

pub(super) fn read_port<R: Read>(request: &mut R) -> Result<u16, DispatchError> {
    let port: u16 = frame::read_number(request).map_err(|source| match source {
        FrameError::InvalidNumber { token } => DispatchError::InvalidPort { token },
        source => DispatchError::ReadArgument {
            argument: "port",
            source,
        },
    })?;
    if port == 0 {
        return Err(DispatchError::InvalidPort {
            token: port.to_string(),
        });
    }
    Ok(port)
}

fn read_token<R: Read>(request: &mut R, argument: &'static str) -> Result<Vec<u8>, DispatchError> {
    frame::read_frame(request, MAX_TOKEN_BYTES)
        .map_err(|source| DispatchError::ReadArgument { argument, source })
}
