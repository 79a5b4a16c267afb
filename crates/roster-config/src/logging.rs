//! Output format for daemon log events.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How `rosterd` renders tracing events on stderr.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event with fields flattened to the top level.
    #[default]
    Json,
    /// Single-line text for interactive runs.
    Compact,
}
