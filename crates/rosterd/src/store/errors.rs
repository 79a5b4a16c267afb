//! Failures reported by the user directory store.

use std::io;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors surfaced by [`UserStore`](super::UserStore) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage root could not be created.
    #[error("failed to prepare storage root {path}: {source}")]
    Root {
        /// Configured storage root.
        path: Utf8PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// A directory for the user already exists.
    #[error("user '{user}' already exists")]
    Exists {
        /// Requested username.
        user: String,
    },
    /// Creating the user directory failed for a reason other than existence.
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// No directory exists for the user.
    #[error("user '{user}' does not exist")]
    NotFound {
        /// Requested username.
        user: String,
    },
    /// A content entry could not be removed while deleting a user.
    #[error(
        "failed to remove {} ({unremoved} entries left in place): {source}",
        .path.display()
    )]
    RemoveFile {
        /// First entry that could not be removed.
        path: PathBuf,
        /// Entries still present in the user directory.
        unremoved: usize,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// The emptied user directory could not be removed.
    #[error("failed to remove directory {path}: {source}")]
    RemoveFolder {
        /// User directory.
        path: Utf8PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// A previous holder of the store lock panicked.
    #[error("store lock poisoned")]
    LockPoisoned,
    /// The user already owns a content item with that name.
    #[error("'{file}' is already published by '{user}'")]
    ContentExists {
        /// Owner of the content item.
        user: String,
        /// Content filename.
        file: String,
    },
    /// The user owns no content item with that name.
    #[error("'{file}' is not published by '{user}'")]
    ContentNotFound {
        /// Owner of the content item.
        user: String,
        /// Content filename.
        file: String,
    },
    /// Any other filesystem failure.
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: Utf8PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
}
