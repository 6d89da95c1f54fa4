//! Execution runtime configuration.

use serde::{Deserialize, Serialize};

/// Where a console's runtime evaluates code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Isolation {
    /// A dedicated thread fed over a channel.
    #[default]
    Worker,
    /// In-process, on the caller's thread.
    Inline,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuntimeConfig {
    pub isolation: Isolation,
}
