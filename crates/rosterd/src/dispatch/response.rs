//! Response framing for the dispatch loop.
//!
//! Every response opens with the result byte. Listings follow a success code
//! with a decimal count token and then the entries, one token per field.

use std::io::Write;

use roster_wire::{FrameError, ResultCode, Username, frame};

use crate::sessions::Session;

use super::errors::DispatchError;

/// Entries sent after a success code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Body {
    /// Nothing follows the result byte.
    Empty,
    /// `(username, ip, port)` triples.
    Users(Vec<(Username, Session)>),
    /// Content filenames.
    Files(Vec<String>),
}

/// A handler's answer: the code and, on success, an optional listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reply<C> {
    pub(crate) code: C,
    pub(crate) body: Body,
}

impl<C: ResultCode> Reply<C> {
    pub(crate) const fn new(code: C, body: Body) -> Self {
        Self { code, body }
    }
}

impl<C: ResultCode> From<C> for Reply<C> {
    fn from(code: C) -> Self {
        Self::new(code, Body::Empty)
    }
}

/// Writer that frames replies onto a stream.
pub(crate) struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    pub(crate) const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes the result byte and, only for success codes, the body.
    pub(crate) fn write_reply<C: ResultCode>(
        &mut self,
        reply: &Reply<C>,
    ) -> Result<(), DispatchError> {
        self.write(|writer| frame::write_code(writer, reply.code.as_byte()))?;
        if !reply.code.is_success() {
            return Ok(());
        }
        match &reply.body {
            Body::Empty => Ok(()),
            Body::Users(users) => {
                self.write(|writer| frame::write_number(writer, users.len()))?;
                for (user, session) in users {
                    self.write(|writer| frame::write_frame(writer, user.as_str().as_bytes()))?;
                    self.write(|writer| {
                        frame::write_frame(writer, session.address.to_string().as_bytes())
                    })?;
                    self.write(|writer| frame::write_number(writer, session.port))?;
                }
                Ok(())
            }
            Body::Files(files) => {
                self.write(|writer| frame::write_number(writer, files.len()))?;
                for file in files {
                    self.write(|writer| frame::write_frame(writer, file.as_bytes()))?;
                }
                Ok(())
            }
        }
    }

    /// Flushes everything written so far.
    pub(crate) fn finish(&mut self) -> Result<(), DispatchError> {
        self.writer
            .flush()
            .map_err(|source| DispatchError::WriteResponse(source.into()))
    }

    fn write(
        &mut self,
        step: impl FnOnce(&mut W) -> Result<(), FrameError>,
    ) -> Result<(), DispatchError> {
        step(&mut self.writer).map_err(DispatchError::WriteResponse)
    }
}
