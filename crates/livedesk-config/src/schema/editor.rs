//! Editor window configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Tab width in columns (valid range: 1-16).
    pub tab_size: u32,
    pub soft_tabs: bool,
    pub show_line_numbers: bool,
    pub wrap: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_size: 2,
            soft_tabs: true,
            show_line_numbers: false,
            wrap: false,
        }
    }
}
