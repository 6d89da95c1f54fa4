//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> &'static str {
    r##"# livedesk configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[console]
# prompt = "λ "
# expand_sentinel = "&"        # leading char that echoes the final value
# cursor_blink = true
# fallback_cols = 80           # 1-1000, used when the pane cannot be measured
# fallback_rows = 24           # 1-1000
# loaded_message = "Buffer loaded."

[editor]
# tab_size = 2                 # 1-16
# soft_tabs = true
# show_line_numbers = false
# wrap = false

[frame]
# target_origin = "*"

[keybinds]
# focus_first = "Ctrl+O"       # desktop-wide
# send_to_repl = "Ctrl+S"      # editor
# focus_target = "Ctrl+O"      # editor
# blur = "Escape"              # editor
# load_buffer = "Ctrl+L"       # console

[runtime]
# isolation = "worker"         # worker, inline

[logging]
# level = "INFO"               # TRACE, DEBUG, INFO, WARNING, ERROR
"##
}
