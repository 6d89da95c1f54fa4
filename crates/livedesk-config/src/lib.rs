//! livedesk configuration system.
//!
//! Two kinds of file are read here:
//! - `config.toml`: user preferences (console prompt, keybinds, runtime
//!   isolation, logging). Every section has defaults so partial files work.
//! - deck files: the window declarations for one slide, the equivalent of
//!   markup carrying `data-id` / `data-type` / `data-target` / `data-lang`.

pub mod deck;
pub mod keybinds;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use deck::{load_deck, parse_deck, DeckConfig, WindowDecl};
pub use schema::LivedeskConfig;

use livedesk_common::ConfigError;

/// Load config from the platform default path, creating it if absent.
pub fn load_config() -> Result<LivedeskConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}
