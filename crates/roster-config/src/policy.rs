//! How `UNREGISTER` treats content files it cannot remove.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Behaviour of the user-deletion loop when removing a content file fails.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DeletePolicy {
    /// Stop at the first file that cannot be removed. Files already removed
    /// stay removed and the user directory is kept.
    #[default]
    FailFast,
    /// Attempt every file, then report the first failure together with the
    /// number of files left behind.
    BestEffort,
}

impl DeletePolicy {
    /// Returns true when the deletion loop should keep going after a failure.
    #[must_use]
    pub const fn continues_after_failure(self) -> bool {
        matches!(self, Self::BestEffort)
    }
}
