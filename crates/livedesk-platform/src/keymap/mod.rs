mod parse;
mod types;

pub use parse::parse_keybind;
pub use types::{KeyBind, Modifier};

use std::fmt;

impl fmt::Display for KeyBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier.as_str())?;
        }
        f.write_str(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_keybind() {
        let kb = parse_keybind("Ctrl+O").unwrap();
        assert_eq!(kb.modifiers, vec![Modifier::Ctrl]);
        assert_eq!(kb.key, "O");
    }

    #[test]
    fn parse_multi_modifier_keybind() {
        let kb = parse_keybind("Ctrl+Shift+t").unwrap();
        assert_eq!(kb.modifiers, vec![Modifier::Ctrl, Modifier::Shift]);
        assert_eq!(kb.key, "T");
    }

    #[test]
    fn parse_option_becomes_alt() {
        let kb = parse_keybind("Option+Period").unwrap();
        assert_eq!(kb.modifiers, vec![Modifier::Alt]);
        assert_eq!(kb.key, ".");
    }

    #[test]
    fn parse_cmd_modifier() {
        let kb = parse_keybind("Cmd+S").unwrap();
        if cfg!(target_os = "macos") {
            assert_eq!(kb.modifiers, vec![Modifier::Super]);
        } else {
            assert_eq!(kb.modifiers, vec![Modifier::Ctrl]);
        }
    }

    #[test]
    fn parse_single_key() {
        let kb = parse_keybind("esc").unwrap();
        assert!(kb.modifiers.is_empty());
        assert_eq!(kb.key, "Escape");
    }

    #[test]
    fn parse_empty_string_fails() {
        assert!(parse_keybind("").is_err());
        assert!(parse_keybind("Ctrl+").is_err());
    }

    #[test]
    fn parse_unknown_modifier_fails() {
        let err = parse_keybind("Hyper+O").unwrap_err();
        assert!(err.to_string().contains("unrecognized modifier: Hyper"));
    }

    #[test]
    fn parse_duplicate_modifiers_deduplicated() {
        let kb = parse_keybind("Ctrl+Ctrl+A").unwrap();
        assert_eq!(kb.modifiers, vec![Modifier::Ctrl]);
    }

    #[test]
    fn display_joins_with_plus() {
        let kb = parse_keybind("shift+ctrl+enter").unwrap();
        assert_eq!(kb.to_string(), "Shift+Ctrl+Enter");
    }
}
