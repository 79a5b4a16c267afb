use camino::Utf8PathBuf;

use crate::logging::LogFormat;
use crate::policy::DeletePolicy;

/// Default address the daemon binds to.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default TCP port the daemon listens on.
pub const DEFAULT_PORT: u16 = 7070;

/// Default directory holding one subdirectory per registered user.
pub const DEFAULT_STORAGE_ROOT: &str = "storage";

/// Default number of worker threads serving connections.
pub const DEFAULT_WORKERS: usize = 8;

/// Default number of accepted connections allowed to wait for a worker.
pub const DEFAULT_BACKLOG: usize = 32;

/// Default per-connection read and write timeout in milliseconds.
pub const DEFAULT_IO_TIMEOUT_MS: u64 = 30_000;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default storage root as an owned path.
#[must_use]
pub fn default_storage_root() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_STORAGE_ROOT)
}

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default behaviour of `UNREGISTER` when a content file cannot be removed.
#[must_use]
pub const fn default_delete_policy() -> DeletePolicy {
    DeletePolicy::FailFast
}
