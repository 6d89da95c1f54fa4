use std::collections::HashMap;

use livedesk_config::keybinds::{all_keybinds, KeyScope};
use livedesk_config::schema::KeybindConfig;

use crate::combo::KeyCombo;

/// What a bound key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// Focus the first declared window.
    FocusFirst,
    /// Push the editor buffer to its peer.
    SendToRepl,
    /// Hand focus from the editor to its peer.
    FocusTarget,
    /// Drop focus locally.
    Blur,
    /// Ask the console's peer for its buffer.
    LoadBuffer,
}

impl Binding {
    fn from_config_name(name: &str) -> Option<Self> {
        match name {
            "focus_first" => Some(Binding::FocusFirst),
            "send_to_repl" => Some(Binding::SendToRepl),
            "focus_target" => Some(Binding::FocusTarget),
            "blur" => Some(Binding::Blur),
            "load_buffer" => Some(Binding::LoadBuffer),
            _ => None,
        }
    }
}

/// Maps key combinations to [`Binding`]s for one scope.
#[derive(Debug, Clone, Default)]
pub struct KeybindRegistry {
    bindings: HashMap<KeyCombo, Binding>,
}

impl KeybindRegistry {
    /// Build the registry for `scope` from the config keybind section.
    ///
    /// Invalid keybind strings are logged as warnings and skipped.
    pub fn from_config(config: &KeybindConfig, scope: KeyScope) -> Self {
        let mut bindings = HashMap::new();

        for (binding_scope, name, binding_str) in all_keybinds(config) {
            if binding_scope != scope {
                continue;
            }
            let Some(binding) = Binding::from_config_name(name) else {
                continue;
            };
            match KeyCombo::parse(binding_str) {
                Ok(combo) => {
                    bindings.insert(combo, binding);
                }
                Err(e) => {
                    tracing::warn!("invalid keybind '{binding_str}' for {name}: {e}");
                }
            }
        }

        Self { bindings }
    }

    pub fn lookup(&self, combo: &KeyCombo) -> Option<Binding> {
        self.bindings.get(combo).copied()
    }

    /// The combo bound to `binding`, if any.
    pub fn combo_for(&self, binding: Binding) -> Option<&KeyCombo> {
        self.bindings
            .iter()
            .find(|(_, b)| **b == binding)
            .map(|(combo, _)| combo)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
