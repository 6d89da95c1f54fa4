//! Keybind validation utilities.

use crate::schema::KeybindConfig;
use livedesk_common::ConfigError;
use std::collections::HashMap;

/// Where a binding is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyScope {
    /// Installed by the desktop between stabilise and cleanup.
    Desktop,
    /// Bound on each editor widget.
    Editor,
    /// Handled by each console's terminal surface.
    Console,
}

/// Returns all keybinds as `(scope, name, binding)` triples.
pub fn all_keybinds(config: &KeybindConfig) -> Vec<(KeyScope, &str, &str)> {
    vec![
        (KeyScope::Desktop, "focus_first", &config.focus_first),
        (KeyScope::Editor, "send_to_repl", &config.send_to_repl),
        (KeyScope::Editor, "focus_target", &config.focus_target),
        (KeyScope::Editor, "blur", &config.blur),
        (KeyScope::Console, "load_buffer", &config.load_buffer),
    ]
}

/// Keybinds active in one scope, as `(name, binding)` pairs.
pub fn keybinds_in(config: &KeybindConfig, scope: KeyScope) -> Vec<(&str, &str)> {
    all_keybinds(config)
        .into_iter()
        .filter(|(s, _, _)| *s == scope)
        .map(|(_, name, binding)| (name, binding))
        .collect()
}

/// Validate that no binding is empty and that no two bindings in the same
/// scope share a key combination.
pub fn validate_no_duplicates(config: &KeybindConfig) -> Result<(), ConfigError> {
    let mut seen: HashMap<(KeyScope, &str), &str> = HashMap::new();

    for (scope, name, binding) in all_keybinds(config) {
        if binding.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "keybind '{name}' is empty"
            )));
        }
        if let Some(existing_name) = seen.get(&(scope, binding)) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate keybind '{binding}': assigned to both '{existing_name}' and '{name}'"
            )));
        }
        seen.insert((scope, binding), name);
    }

    Ok(())
}
