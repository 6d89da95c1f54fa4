//! Deck files: the window declarations for one slide.
//!
//! ```toml
//! [[window]]
//! id = "editor"
//! type = "editor"
//! target = "repl"
//! lang = "calc"
//! content = "let x = 1"
//! ```
//!
//! `type` and `lang` stay strings here. Resolving them is the desktop's job,
//! so an unknown value fails the desktop rather than the file parse.

use std::path::Path;

use livedesk_common::{ConfigError, WindowId};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One declared window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowDecl {
    pub id: WindowId,
    #[serde(rename = "type")]
    pub kind: String,
    /// The peer this window primarily exchanges messages with.
    #[serde(default)]
    pub target: Option<WindowId>,
    pub lang: String,
    /// Inert content of the pane; the editor's initial buffer.
    #[serde(default)]
    pub content: String,
}

impl WindowDecl {
    pub fn new(
        id: impl Into<WindowId>,
        kind: impl Into<String>,
        target: Option<&str>,
        lang: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            target: target.map(WindowId::from),
            lang: lang.into(),
            content: String::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

/// All windows of a deck, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckConfig {
    #[serde(default, rename = "window")]
    pub windows: Vec<WindowDecl>,
}

/// Parse a deck from TOML text.
pub fn parse_deck(content: &str) -> Result<DeckConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(format!("invalid deck: {e}")))
}

/// Load a deck file.
pub fn load_deck(path: &Path) -> Result<DeckConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        _ => ConfigError::ParseError(format!("failed to read {}: {e}", path.display())),
    })?;
    let deck = parse_deck(&content)?;
    info!(windows = deck.windows.len(), "loaded deck from {}", path.display());
    Ok(deck)
}
