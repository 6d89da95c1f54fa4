use std::path::PathBuf;

use crate::id::WindowId;
use crate::types::Phase;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("keybind error: {0}")]
    Keybind(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("failed to start runtime: {0}")]
    Spawn(String),

    #[error("runtime has been shut down")]
    Closed,
}

/// Errors a single window reports from its message handler.
///
/// None of these are fatal; the desktop records them and carries on.
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("{window} received unknown command `{command}` (data: {data})")]
    UnknownCommand {
        window: WindowId,
        command: String,
        data: String,
    },

    #[error("{window} is not ready for `{command}`")]
    NotReady { window: WindowId, command: String },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

#[derive(Debug, thiserror::Error)]
pub enum DesktopError {
    #[error("window `{id}` declares unknown kind `{kind}`")]
    UnknownKind { id: WindowId, kind: String },

    #[error("window `{id}` declares unknown language `{lang}`")]
    UnknownLanguage { id: WindowId, lang: String },

    #[error("duplicate window id `{0}`")]
    DuplicateId(WindowId),

    #[error("window `{id}` targets `{peer}`, which is not declared")]
    UnresolvedPeer { id: WindowId, peer: WindowId },

    #[error("no window with id `{0}`")]
    UnknownWindow(WindowId),

    #[error("cannot route `{command}` from `{from}` to unknown window `{to}`")]
    UnresolvedRoute {
        from: WindowId,
        to: WindowId,
        command: String,
    },

    #[error("cannot {operation} window `{window}` while {phase}")]
    Lifecycle {
        window: WindowId,
        operation: &'static str,
        phase: Phase,
    },

    #[error("desktop has no windows")]
    Empty,

    #[error(transparent)]
    Window(#[from] WindowError),
}

#[derive(Debug, thiserror::Error)]
pub enum LivedeskError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Desktop(#[from] DesktopError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
