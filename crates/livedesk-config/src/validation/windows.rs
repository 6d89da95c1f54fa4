//! Per-window-kind validation.

use crate::schema::LivedeskConfig;

use super::helpers::{validate_not_blank, validate_range};

pub(super) fn validate_console(errors: &mut Vec<String>, config: &LivedeskConfig) {
    let console = &config.console;
    validate_range(errors, "console.fallback_cols", console.fallback_cols, 1, 1000);
    validate_range(errors, "console.fallback_rows", console.fallback_rows, 1, 1000);
    if console.expand_sentinel.is_whitespace() {
        errors.push("console.expand_sentinel must not be whitespace".into());
    }
    validate_not_blank(errors, "console.loaded_message", &console.loaded_message);
}

pub(super) fn validate_editor(errors: &mut Vec<String>, config: &LivedeskConfig) {
    validate_range(errors, "editor.tab_size", config.editor.tab_size, 1, 16);
}

pub(super) fn validate_frame(errors: &mut Vec<String>, config: &LivedeskConfig) {
    validate_not_blank(errors, "frame.target_origin", &config.frame.target_origin);
}
