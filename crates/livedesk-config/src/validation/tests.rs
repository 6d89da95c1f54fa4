use super::*;

#[test]
fn default_config_is_valid() {
    assert!(validate(&LivedeskConfig::default()).is_ok());
}

#[test]
fn out_of_range_grid_is_reported() {
    let mut config = LivedeskConfig::default();
    config.console.fallback_cols = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("console.fallback_cols = 0 is out of range [1, 1000]"));
}

#[test]
fn whitespace_sentinel_is_rejected() {
    let mut config = LivedeskConfig::default();
    config.console.expand_sentinel = ' ';
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("expand_sentinel"));
}

#[test]
fn collects_all_errors() {
    let mut config = LivedeskConfig::default();
    config.editor.tab_size = 0;
    config.frame.target_origin = String::new();
    config.keybinds.blur = "Ctrl+S".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("editor.tab_size"));
    assert!(err.contains("frame.target_origin must not be empty"));
    assert!(err.contains("duplicate keybind 'Ctrl+S'"));
    assert_eq!(err.matches("; ").count(), 2);
}
