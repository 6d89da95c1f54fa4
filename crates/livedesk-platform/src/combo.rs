use std::fmt;

use livedesk_common::PlatformError;

use crate::keymap::{parse_keybind, KeyBind, Modifier};

const MOD_CTRL: u8 = 0b0001;
const MOD_ALT: u8 = 0b0010;
const MOD_SHIFT: u8 = 0b0100;
const MOD_SUPER: u8 = 0b1000;

/// A canonical key representation for HashMap lookup.
///
/// Modifiers are a bitmask, so `Shift+Ctrl+X` and `Ctrl+Shift+X` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    /// Bitmask: Ctrl=1, Alt=2, Shift=4, Super=8.
    pub mods: u8,
    /// Normalized key name (e.g. "O", "Escape").
    pub key: String,
}

impl KeyCombo {
    pub fn from_keybind(kb: &KeyBind) -> Self {
        let mut mods = 0u8;
        for m in &kb.modifiers {
            mods |= match m {
                Modifier::Ctrl => MOD_CTRL,
                Modifier::Alt => MOD_ALT,
                Modifier::Shift => MOD_SHIFT,
                Modifier::Super => MOD_SUPER,
            };
        }
        Self {
            mods,
            key: kb.key.clone(),
        }
    }

    /// Parse a config string straight into a combo.
    pub fn parse(s: &str) -> Result<Self, PlatformError> {
        parse_keybind(s).map(|kb| Self::from_keybind(&kb))
    }

    /// Build from raw modifier state as reported by a key-down event.
    pub fn from_state(ctrl: bool, alt: bool, shift: bool, super_key: bool, key: &str) -> Self {
        let mut mods = 0u8;
        for (held, bit) in [
            (ctrl, MOD_CTRL),
            (alt, MOD_ALT),
            (shift, MOD_SHIFT),
            (super_key, MOD_SUPER),
        ] {
            if held {
                mods |= bit;
            }
        }
        Self {
            mods,
            key: key.to_string(),
        }
    }

    pub fn has(&self, modifier: Modifier) -> bool {
        let bit = match modifier {
            Modifier::Ctrl => MOD_CTRL,
            Modifier::Alt => MOD_ALT,
            Modifier::Shift => MOD_SHIFT,
            Modifier::Super => MOD_SUPER,
        };
        self.mods & bit != 0
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in [Modifier::Ctrl, Modifier::Alt, Modifier::Shift, Modifier::Super] {
            if self.has(modifier) {
                write!(f, "{}+", modifier.as_str())?;
            }
        }
        f.write_str(&self.key)
    }
}
