//! Full configuration validation.
//!
//! Each domain has its own submodule; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod helpers;
mod windows;

#[cfg(test)]
mod tests;

use crate::keybinds;
use crate::schema::LivedeskConfig;
use livedesk_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &LivedeskConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    if let Err(e) = keybinds::validate_no_duplicates(&config.keybinds) {
        errors.push(e.to_string());
    }

    windows::validate_console(&mut errors, config);
    windows::validate_editor(&mut errors, config);
    windows::validate_frame(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
