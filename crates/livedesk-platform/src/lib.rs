//! Keyboard plumbing shared by the desktop and its windows.
//!
//! Config strings like `"Ctrl+O"` are parsed into [`KeyBind`]s, canonicalised
//! into [`KeyCombo`]s, and collected per scope in a [`KeybindRegistry`].

pub mod keymap;

mod combo;
mod registry;

pub use combo::KeyCombo;
pub use keymap::{parse_keybind, KeyBind, Modifier};
pub use registry::{Binding, KeybindRegistry};
