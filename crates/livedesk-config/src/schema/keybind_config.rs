//! Keyboard shortcut configuration.

use serde::{Deserialize, Serialize};

/// Key bindings, written as `"Mod+Mod+Key"` strings.
///
/// `focus_first` is the desktop-wide shortcut. The rest are scoped to the
/// window that binds them, so the same combo may appear in two scopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindConfig {
    pub focus_first: String,
    pub send_to_repl: String,
    pub focus_target: String,
    pub blur: String,
    pub load_buffer: String,
}

impl Default for KeybindConfig {
    fn default() -> Self {
        Self {
            focus_first: "Ctrl+O".into(),
            send_to_repl: "Ctrl+S".into(),
            focus_target: "Ctrl+O".into(),
            blur: "Escape".into(),
            load_buffer: "Ctrl+L".into(),
        }
    }
}
