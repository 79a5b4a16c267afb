//! Filesystem-backed user directory.
//!
//! A user exists exactly when `<root>/<username>/` exists; the files directly
//! inside that directory are the user's published content. Entries whose
//! names start with a dot are invisible to listing and deletion.
//!
//! Every operation holds the store-wide lock for the whole of its filesystem
//! work. The guard is scoped to the operation, so it is released on every
//! return path.

mod errors;

use std::fs::{self, DirBuilder, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, error, info, warn};

use roster_config::DeletePolicy;
use roster_wire::{ContentName, Username};

pub use self::errors::StoreError;

pub(crate) const STORE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::store");

/// Concurrency-safe access to the per-user storage directories.
#[derive(Debug)]
pub struct UserStore {
    root: Utf8PathBuf,
    lock: Mutex<()>,
    policy: DeletePolicy,
}

impl UserStore {
    /// Opens the store, creating the storage root with owner-only permissions
    /// when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Root`] when the root cannot be created.
    pub fn open(root: impl Into<Utf8PathBuf>, policy: DeletePolicy) -> Result<Self, StoreError> {
        let root = root.into();
        private_dir_builder()
            .recursive(true)
            .create(&root)
            .map_err(|source| StoreError::Root {
                path: root.clone(),
                source,
            })?;
        info!(
            target: STORE_TARGET,
            root = %root,
            policy = %policy,
            "user store ready"
        );
        Ok(Self {
            root,
            lock: Mutex::new(()),
            policy,
        })
    }

    /// Storage root holding the user directories.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Creates the directory for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Exists`] when the user already exists,
    /// [`StoreError::CreateDirectory`] for other filesystem failures and
    /// [`StoreError::LockPoisoned`] when the lock is unusable.
    pub fn create_user(&self, user: &Username) -> Result<(), StoreError> {
        let _guard = self.acquire()?;
        let path = self.user_dir(user);
        match private_dir_builder().create(&path) {
            Ok(()) => {
                debug!(target: STORE_TARGET, user = %user, "user directory created");
                Ok(())
            }
            Err(source) if source.kind() == io::ErrorKind::AlreadyExists => {
                Err(StoreError::Exists {
                    user: user.to_string(),
                })
            }
            Err(source) => Err(StoreError::CreateDirectory { path, source }),
        }
    }

    /// Removes every visible entry in the user's directory, then the directory.
    ///
    /// Files are unlinked and empty subdirectories removed. Under
    /// [`DeletePolicy::FailFast`] the first entry that cannot be removed ends
    /// the operation; entries removed before it stay removed. Under
    /// [`DeletePolicy::BestEffort`] every entry is attempted and the first
    /// failure is reported afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the user does not exist,
    /// [`StoreError::RemoveFile`] when an entry cannot be removed,
    /// [`StoreError::RemoveFolder`] when the directory itself cannot be
    /// removed and [`StoreError::LockPoisoned`] when the lock is unusable.
    pub fn delete_user(&self, user: &Username) -> Result<(), StoreError> {
        self.delete_user_then(user, || ())
    }

    /// Deletes `user` like [`Self::delete_user`] and runs `after` before the
    /// store lock is released, so no other store operation observes the user
    /// gone without `after` having run.
    ///
    /// `after` only runs when the directory was removed.
    ///
    /// # Errors
    ///
    /// As for [`Self::delete_user`].
    pub fn delete_user_then<T>(
        &self,
        user: &Username,
        after: impl FnOnce() -> T,
    ) -> Result<T, StoreError> {
        let _guard = self.acquire()?;
        let path = self.user_dir(user);
        let entries = visible_entries(user, &path)?;
        let total = entries.len();
        let mut removed = 0_usize;
        let mut first_failure = None;
        for entry in entries {
            match entry.remove() {
                Ok(()) => removed += 1,
                Err(source) => {
                    warn!(
                        target: STORE_TARGET,
                        user = %user,
                        entry = %entry.path.display(),
                        error = %source,
                        "failed to remove content entry"
                    );
                    if !self.policy.continues_after_failure() {
                        return Err(StoreError::RemoveFile {
                            path: entry.path,
                            unremoved: total - removed,
                            source,
                        });
                    }
                    first_failure.get_or_insert((entry.path, source));
                }
            }
        }
        if let Some((entry, source)) = first_failure {
            return Err(StoreError::RemoveFile {
                path: entry,
                unremoved: total - removed,
                source,
            });
        }
        fs::remove_dir(&path).map_err(|source| StoreError::RemoveFolder {
            path: path.clone(),
            source,
        })?;
        debug!(target: STORE_TARGET, user = %user, removed, "user directory removed");
        Ok(after())
    }

    /// Lists the names of the user's visible content entries in directory
    /// iteration order.
    ///
    /// Entries whose names are not valid UTF-8 cannot travel as tokens; they
    /// are logged and left out.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the user does not exist,
    /// [`StoreError::Io`] when the directory cannot be read and
    /// [`StoreError::LockPoisoned`] when the lock is unusable.
    pub fn list_files(&self, user: &Username) -> Result<Vec<String>, StoreError> {
        let _guard = self.acquire()?;
        let path = self.user_dir(user);
        let entries = visible_entries(user, &path)?;
        Ok(entries
            .into_iter()
            .filter_map(|entry| match entry.path.file_name()?.to_str() {
                Some(name) => Some(name.to_owned()),
                None => {
                    warn!(
                        target: STORE_TARGET,
                        user = %user,
                        entry = %entry.path.display(),
                        "skipping content entry whose name is not UTF-8"
                    );
                    None
                }
            })
            .collect())
    }

    /// Returns whether a directory exists for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LockPoisoned`] when the lock is unusable.
    pub fn is_registered(&self, user: &Username) -> Result<bool, StoreError> {
        let _guard = self.acquire()?;
        Ok(self.user_dir(user).is_dir())
    }

    /// Runs `action` while holding the store lock, if `user` is registered.
    ///
    /// Returns `None` without running `action` when no directory exists for
    /// `user`. No deletion can interleave between the check and `action`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LockPoisoned`] when the lock is unusable.
    pub fn with_registered<T>(
        &self,
        user: &Username,
        action: impl FnOnce() -> T,
    ) -> Result<Option<T>, StoreError> {
        let _guard = self.acquire()?;
        Ok(self.user_dir(user).is_dir().then(action))
    }

    /// Creates a content entry for `user` whose body is `description`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the user does not exist,
    /// [`StoreError::ContentExists`] when the entry already exists,
    /// [`StoreError::Io`] for other filesystem failures and
    /// [`StoreError::LockPoisoned`] when the lock is unusable.
    pub fn publish(
        &self,
        user: &Username,
        file: &ContentName,
        description: &str,
    ) -> Result<(), StoreError> {
        let _guard = self.acquire()?;
        let path = self.existing_user_dir(user)?.join(file.as_str());
        let mut handle = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(handle) => handle,
            Err(source) if source.kind() == io::ErrorKind::AlreadyExists => {
                return Err(StoreError::ContentExists {
                    user: user.to_string(),
                    file: file.to_string(),
                });
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        if let Err(source) = handle.write_all(description.as_bytes()) {
            drop(handle);
            if let Err(cleanup) = fs::remove_file(&path) {
                warn!(
                    target: STORE_TARGET,
                    entry = %path,
                    error = %cleanup,
                    "failed to remove partially written content entry"
                );
            }
            return Err(StoreError::Io { path, source });
        }
        debug!(target: STORE_TARGET, user = %user, file = %file, "content published");
        Ok(())
    }

    /// Removes one of the user's content entries.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the user does not exist,
    /// [`StoreError::ContentNotFound`] when the entry does not exist,
    /// [`StoreError::Io`] for other filesystem failures and
    /// [`StoreError::LockPoisoned`] when the lock is unusable.
    pub fn remove_content(&self, user: &Username, file: &ContentName) -> Result<(), StoreError> {
        let _guard = self.acquire()?;
        let path = self.existing_user_dir(user)?.join(file.as_str());
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(target: STORE_TARGET, user = %user, file = %file, "content removed");
                Ok(())
            }
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::ContentNotFound {
                    user: user.to_string(),
                    file: file.to_string(),
                })
            }
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn acquire(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.lock.lock().map_err(|_| {
            error!(target: STORE_TARGET, "store lock poisoned");
            StoreError::LockPoisoned
        })
    }

    fn user_dir(&self, user: &Username) -> Utf8PathBuf {
        self.root.join(user.as_str())
    }

    fn existing_user_dir(&self, user: &Username) -> Result<Utf8PathBuf, StoreError> {
        let path = self.user_dir(user);
        if path.is_dir() {
            Ok(path)
        } else {
            Err(StoreError::NotFound {
                user: user.to_string(),
            })
        }
    }
}

fn private_dir_builder() -> DirBuilder {
    let mut builder = DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
}

/// A non-hidden entry of a user directory.
struct Entry {
    path: PathBuf,
    is_dir: bool,
}

impl Entry {
    fn remove(&self) -> io::Result<()> {
        if self.is_dir {
            fs::remove_dir(&self.path)
        } else {
            fs::remove_file(&self.path)
        }
    }
}

fn visible_entries(user: &Username, path: &Utf8Path) -> Result<Vec<Entry>, StoreError> {
    let io_error = |source: io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let read_dir = fs::read_dir(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound {
                user: user.to_string(),
            }
        } else {
            io_error(source)
        }
    })?;
    let mut entries = Vec::new();
    for item in read_dir {
        let entry = item.map_err(io_error)?;
        if entry.file_name().as_encoded_bytes().first() == Some(&b'.') {
            continue;
        }
        let is_dir = entry.file_type().map_err(io_error)?.is_dir();
        entries.push(Entry {
            path: entry.path(),
            is_dir,
        });
    }
    Ok(entries)
}
