//! Console window configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Prompt written before each input line.
    pub prompt: String,
    /// Leading character that switches a submitted line into expand mode.
    pub expand_sentinel: char,
    pub cursor_blink: bool,
    /// Grid used when the pane cannot be measured.
    pub fallback_cols: u32,
    pub fallback_rows: u32,
    /// Success indicator written when a full buffer finishes loading.
    pub loaded_message: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: "λ ".into(),
            expand_sentinel: '&',
            cursor_blink: true,
            fallback_cols: 80,
            fallback_rows: 24,
            loaded_message: "Buffer loaded.".into(),
        }
    }
}
