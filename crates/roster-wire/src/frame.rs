//! Token framing shared by the daemon and its clients.
//!
//! A token travels as its bytes followed by a NUL terminator. Readers also
//! accept a newline (optionally preceded by a carriage return) so the daemon
//! can be driven from line-oriented tools such as `nc`. End of stream after at
//! least one byte terminates the token as well. Result codes are a single raw
//! byte with no terminator; counts and ports are decimal tokens.

use std::io::{self, Read, Write};
use std::str::FromStr;

use thiserror::Error;

/// Byte terminating every token written by this crate.
pub const FRAME_TERMINATOR: u8 = 0;

/// Upper bound for a command token.
pub const MAX_COMMAND_BYTES: usize = 20;

/// Upper bound for usernames, filenames, descriptions and other text tokens.
pub const MAX_TOKEN_BYTES: usize = 256;

/// Upper bound for decimal tokens (counts and ports).
const MAX_NUMBER_BYTES: usize = 20;

/// Errors raised while reading or writing frames.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The peer closed the stream before sending any byte of the frame.
    #[error("connection closed before a frame arrived")]
    Closed,
    /// The frame grew beyond the caller's limit.
    #[error("frame exceeds {limit} bytes")]
    TooLong {
        /// Limit supplied by the caller.
        limit: usize,
    },
    /// A payload handed to [`write_frame`] contains a terminator byte.
    #[error("frame payload contains a terminator byte")]
    EmbeddedTerminator,
    /// A decimal token could not be parsed.
    #[error("invalid numeric token '{token}'")]
    InvalidNumber {
        /// The offending token, lossily decoded.
        token: String,
    },
    /// Underlying stream failure.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Reads one token of at most `limit` bytes, excluding the terminator.
///
/// An immediately terminated token yields an empty vector; callers decide
/// whether that is acceptable.
///
/// # Errors
///
/// Returns [`FrameError::Closed`] when the stream ends before any byte,
/// [`FrameError::TooLong`] when the token exceeds `limit`, and
/// [`FrameError::Io`] for stream failures.
pub fn read_frame<R: Read>(reader: &mut R, limit: usize) -> Result<Vec<u8>, FrameError> {
    let mut frame = Vec::new();
    let mut consumed_any = false;
    loop {
        match read_byte(reader)? {
            None if !consumed_any => return Err(FrameError::Closed),
            None | Some(FRAME_TERMINATOR) => return check_limit(frame, limit),
            Some(b'\n') => {
                if frame.last() == Some(&b'\r') {
                    frame.pop();
                }
                return check_limit(frame, limit);
            }
            Some(byte) => {
                consumed_any = true;
                // One spare byte leaves room for a '\r' before a newline.
                if frame.len() > limit {
                    return Err(FrameError::TooLong { limit });
                }
                frame.push(byte);
            }
        }
    }
}

fn check_limit(frame: Vec<u8>, limit: usize) -> Result<Vec<u8>, FrameError> {
    if frame.len() > limit {
        return Err(FrameError::TooLong { limit });
    }
    Ok(frame)
}

/// Reads a token and decodes it as UTF-8, replacing invalid sequences.
///
/// # Errors
///
/// Propagates the failures of [`read_frame`].
pub fn read_text<R: Read>(reader: &mut R, limit: usize) -> Result<String, FrameError> {
    let frame = read_frame(reader, limit)?;
    Ok(String::from_utf8_lossy(&frame).into_owned())
}

/// Reads a decimal token and parses it into `T`.
///
/// # Errors
///
/// Returns [`FrameError::InvalidNumber`] when the token is not a valid `T`,
/// and propagates the failures of [`read_frame`].
pub fn read_number<R, T>(reader: &mut R) -> Result<T, FrameError>
where
    R: Read,
    T: FromStr,
{
    let token = read_text(reader, MAX_NUMBER_BYTES)?;
    token
        .trim()
        .parse()
        .map_err(|_| FrameError::InvalidNumber { token })
}

/// Writes `payload` followed by the NUL terminator.
///
/// # Errors
///
/// Returns [`FrameError::EmbeddedTerminator`] when the payload contains a NUL
/// or newline byte, and [`FrameError::Io`] when writing fails.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), FrameError> {
    if payload
        .iter()
        .any(|byte| *byte == FRAME_TERMINATOR || *byte == b'\n')
    {
        return Err(FrameError::EmbeddedTerminator);
    }
    writer.write_all(payload)?;
    writer.write_all(&[FRAME_TERMINATOR])?;
    Ok(())
}

/// Writes a decimal token.
///
/// # Errors
///
/// Returns [`FrameError::Io`] when writing fails.
pub fn write_number<W, T>(writer: &mut W, value: T) -> Result<(), FrameError>
where
    W: Write,
    T: ToString,
{
    write_frame(writer, value.to_string().as_bytes())
}

/// Reads a single raw result byte.
///
/// # Errors
///
/// Returns [`FrameError::Closed`] when the stream ends first.
pub fn read_code<R: Read>(reader: &mut R) -> Result<u8, FrameError> {
    read_byte(reader)?.ok_or(FrameError::Closed)
}

/// Writes a single raw result byte.
///
/// # Errors
///
/// Returns [`FrameError::Io`] when writing fails.
pub fn write_code<W: Write>(writer: &mut W, code: u8) -> Result<(), FrameError> {
    writer.write_all(&[code])?;
    Ok(())
}

fn read_byte<R: Read>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut buffer = [0_u8; 1];
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => return Ok(None),
            Ok(_) => {
                let [byte] = buffer;
                return Ok(Some(byte));
            }
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::nul(b"alice\0".as_slice(), "alice")]
    #[case::newline(b"alice\n".as_slice(), "alice")]
    #[case::crlf(b"alice\r\n".as_slice(), "alice")]
    #[case::end_of_stream(b"alice".as_slice(), "alice")]
    #[case::empty(b"\0".as_slice(), "")]
    fn reads_terminated_tokens(#[case] input: &[u8], #[case] expected: &str) {
        let mut reader = Cursor::new(input);
        let frame = read_frame(&mut reader, MAX_TOKEN_BYTES).expect("frame");
        assert_eq!(frame, expected.as_bytes());
    }

    #[test]
    fn consecutive_frames_are_read_in_order() {
        let mut reader = Cursor::new(b"REGISTER\0alice\0".to_vec());
        assert_eq!(
            read_frame(&mut reader, MAX_COMMAND_BYTES).expect("command"),
            b"REGISTER"
        );
        assert_eq!(
            read_frame(&mut reader, MAX_TOKEN_BYTES).expect("username"),
            b"alice"
        );
        assert!(matches!(
            read_frame(&mut reader, MAX_TOKEN_BYTES),
            Err(FrameError::Closed)
        ));
    }

    #[test]
    fn closed_stream_is_reported() {
        let mut reader = Cursor::new(Vec::new());
        assert!(matches!(
            read_frame(&mut reader, MAX_TOKEN_BYTES),
            Err(FrameError::Closed)
        ));
    }

    #[test]
    fn token_at_limit_is_accepted() {
        let mut input = vec![b'a'; MAX_TOKEN_BYTES];
        input.extend_from_slice(b"\r\n");
        let mut reader = Cursor::new(input);
        let frame = read_frame(&mut reader, MAX_TOKEN_BYTES).expect("frame");
        assert_eq!(frame.len(), MAX_TOKEN_BYTES);
    }

    #[test]
    fn oversized_token_is_rejected() {
        let mut input = vec![b'a'; MAX_TOKEN_BYTES + 2];
        input.push(0);
        let mut reader = Cursor::new(input);
        assert!(matches!(
            read_frame(&mut reader, MAX_TOKEN_BYTES),
            Err(FrameError::TooLong { limit: MAX_TOKEN_BYTES })
        ));
    }

    #[test]
    fn written_frames_are_nul_terminated() {
        let mut output = Vec::new();
        write_frame(&mut output, b"alice").expect("write");
        write_number(&mut output, 2_usize).expect("write count");
        write_code(&mut output, 1).expect("write code");
        assert_eq!(output, b"alice\x002\x00\x01");
    }

    #[test]
    fn payloads_with_terminators_are_refused() {
        let mut output = Vec::new();
        assert!(matches!(
            write_frame(&mut output, b"two\nlines"),
            Err(FrameError::EmbeddedTerminator)
        ));
        assert!(output.is_empty());
    }

    #[test]
    fn numbers_are_parsed_from_tokens() {
        let mut reader = Cursor::new(b"8080\0port\0".to_vec());
        let port: u16 = read_number(&mut reader).expect("port");
        assert_eq!(port, 8080);
        let error = read_number::<_, u16>(&mut reader).expect_err("not a number");
        assert!(matches!(error, FrameError::InvalidNumber { .. }));
    }

    #[test]
    fn code_reads_single_byte() {
        let mut reader = Cursor::new(vec![3_u8, 0]);
        assert_eq!(read_code(&mut reader).expect("code"), 3);
        assert_eq!(read_code(&mut reader).expect("code"), 0);
        assert!(matches!(read_code(&mut reader), Err(FrameError::Closed)));
    }
}
