//! Structured compile errors reported by a language runtime.
//!
//! A compile error optionally carries the source it was raised against plus a
//! position, either as a character offset or as an explicit line/column pair.

use serde::{Deserialize, Serialize};

/// Where in the source an error was raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    /// Character offset into `input`.
    Cursor { input: String, offset: usize },
    /// 1-based line and 0-based column into `input`.
    LineColumn {
        input: String,
        line: usize,
        column: usize,
    },
}

impl Location {
    pub fn input(&self) -> &str {
        match self {
            Location::Cursor { input, .. } | Location::LineColumn { input, .. } => input,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl CompileError {
    /// An error with no position; rendered as bare message text.
    pub fn bare(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    pub fn at_offset(message: impl Into<String>, input: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            location: Some(Location::Cursor {
                input: input.into(),
                offset,
            }),
        }
    }

    pub fn at_line(
        message: impl Into<String>,
        input: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            message: message.into(),
            location: Some(Location::LineColumn {
                input: input.into(),
                line,
                column,
            }),
        }
    }
}
