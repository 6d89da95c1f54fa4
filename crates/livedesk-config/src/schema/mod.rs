//! Configuration schema types for livedesk.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod console;
mod editor;
mod frame;
mod keybind_config;
mod runtime;
mod system;

pub use console::*;
pub use editor::*;
pub use frame::*;
pub use keybind_config::*;
pub use runtime::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Root configuration for livedesk.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct LivedeskConfig {
    pub console: ConsoleConfig,
    pub editor: EditorConfig,
    pub frame: FrameConfig,
    pub keybinds: KeybindConfig,
    pub runtime: RuntimeConfig,
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config: LivedeskConfig = toml::from_str("").unwrap();
        assert_eq!(config.console.prompt, "λ ");
        assert_eq!(config.frame.target_origin, "*");
        assert_eq!(config.keybinds.focus_first, "Ctrl+O");
        assert_eq!(config.runtime.isolation, Isolation::Worker);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: LivedeskConfig = toml::from_str(
            r#"
[console]
prompt = "> "

[runtime]
isolation = "inline"
"#,
        )
        .unwrap();
        assert_eq!(config.console.prompt, "> ");
        assert_eq!(config.console.expand_sentinel, '&');
        assert_eq!(config.console.fallback_cols, 80);
        assert_eq!(config.runtime.isolation, Isolation::Inline);
    }

    #[test]
    fn unknown_isolation_is_a_parse_error() {
        let result: Result<LivedeskConfig, _> = toml::from_str(
            r#"
[runtime]
isolation = "iframe"
"#,
        );
        assert!(result.is_err());
    }
}
