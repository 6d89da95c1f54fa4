//! Sandboxed frame configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Target origin attached to every post into the isolated context.
    /// `"*"` means the receiver's address is not checked.
    pub target_origin: String,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            target_origin: "*".into(),
        }
    }
}
