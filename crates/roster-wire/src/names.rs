//! Validated identifiers carried by requests.
//!
//! Both names end up as path components under the daemon's storage root, so
//! they are validated before anything touches the filesystem.

use std::fmt;

use thiserror::Error;

use crate::frame::MAX_TOKEN_BYTES;

/// Reasons a username or content name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// The name is empty.
    #[error("name is empty")]
    Empty,
    /// The name is longer than the protocol allows.
    #[error("name is {length} bytes, limit is {limit}")]
    TooLong {
        /// Length of the rejected name.
        length: usize,
        /// Maximum accepted length.
        limit: usize,
    },
    /// A username contains a byte outside `[A-Za-z0-9_]`.
    #[error("username contains invalid character {character:?}")]
    InvalidUsernameCharacter {
        /// First offending character.
        character: char,
    },
    /// A content name would escape or hide inside the owner's directory.
    #[error("content name '{name}' is not a plain visible filename")]
    InvalidContentName {
        /// The rejected name.
        name: String,
    },
    /// The name is not valid UTF-8.
    #[error("name is not valid UTF-8")]
    NotUtf8,
}

/// A username matching `[A-Za-z0-9_]{1,256}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Username(String);

impl Username {
    /// Validates raw token bytes as a username.
    ///
    /// # Errors
    ///
    /// Returns a [`NameError`] describing the first rule the bytes break.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NameError> {
        let text = std::str::from_utf8(bytes).map_err(|_| NameError::NotUtf8)?;
        Self::parse(text)
    }

    /// Validates a string as a username.
    ///
    /// # Errors
    ///
    /// Returns a [`NameError`] describing the first rule the string breaks.
    pub fn parse(text: &str) -> Result<Self, NameError> {
        check_length(text)?;
        if let Some(character) = text
            .chars()
            .find(|character| !(character.is_ascii_alphanumeric() || *character == '_'))
        {
            return Err(NameError::InvalidUsernameCharacter { character });
        }
        Ok(Self(text.to_owned()))
    }

    /// Borrows the username.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A content filename: non-empty, at most 256 bytes, without path
/// separators or NUL bytes, and not starting with a dot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentName(String);

impl ContentName {
    /// Validates raw token bytes as a content name.
    ///
    /// # Errors
    ///
    /// Returns a [`NameError`] describing the first rule the bytes break.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NameError> {
        let text = std::str::from_utf8(bytes).map_err(|_| NameError::NotUtf8)?;
        Self::parse(text)
    }

    /// Validates a string as a content name.
    ///
    /// # Errors
    ///
    /// Returns a [`NameError`] describing the first rule the string breaks.
    pub fn parse(text: &str) -> Result<Self, NameError> {
        check_length(text)?;
        if text.starts_with('.') || text.contains(['/', '\\', '\0']) {
            return Err(NameError::InvalidContentName {
                name: text.to_owned(),
            });
        }
        Ok(Self(text.to_owned()))
    }

    /// Borrows the content name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn check_length(text: &str) -> Result<(), NameError> {
    if text.is_empty() {
        return Err(NameError::Empty);
    }
    if text.len() > MAX_TOKEN_BYTES {
        return Err(NameError::TooLong {
            length: text.len(),
            limit: MAX_TOKEN_BYTES,
        });
    }
    Ok(())
}

impl fmt::Display for Username {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl fmt::Display for ContentName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ContentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
