use serde::{Deserialize, Serialize};
use std::fmt;

/// The three window kinds a deck can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Editor,
    Console,
    Frame,
}

/// Markup tags accepted for each kind. `repl` is the historical name for a console.
const KIND_TAGS: &[(&str, WindowKind)] = &[
    ("editor", WindowKind::Editor),
    ("console", WindowKind::Console),
    ("repl", WindowKind::Console),
    ("frame", WindowKind::Frame),
];

impl WindowKind {
    /// Resolve a declared kind tag. Matching is exact; tags are lowercase.
    pub fn from_tag(tag: &str) -> Option<Self> {
        KIND_TAGS
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, kind)| *kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowKind::Editor => "editor",
            WindowKind::Console => "console",
            WindowKind::Frame => "frame",
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle phase shared by every window kind.
///
/// `Constructed -> Active -> Stable -> Destroyed`, and `Destroyed -> Active`
/// again when a slide is re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Constructed,
    Active,
    Stable,
    Destroyed,
}

impl Phase {
    pub fn can_activate(self) -> bool {
        matches!(self, Phase::Constructed | Phase::Destroyed)
    }

    pub fn can_stabilise(self) -> bool {
        self == Phase::Active
    }

    pub fn can_cleanup(self) -> bool {
        matches!(self, Phase::Active | Phase::Stable)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Constructed => "constructed",
            Phase::Active => "active",
            Phase::Stable => "stable",
            Phase::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}
