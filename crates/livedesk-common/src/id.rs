use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Short random token used to pair a request with its response.
pub fn new_correlation_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    let bytes = uuid.as_bytes();
    format!(
        "{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3]
    )
}

/// Identifier of a window, taken verbatim from the deck declaration.
///
/// Unique within one desktop and stable for the desktop's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(String);

impl WindowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WindowId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for WindowId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_id_length() {
        let cid = new_correlation_id();
        assert_eq!(cid.len(), 8);
    }

    #[test]
    fn correlation_id_is_hex() {
        let cid = new_correlation_id();
        assert!(cid.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn correlation_id_is_unique() {
        let a = new_correlation_id();
        let b = new_correlation_id();
        assert_ne!(a, b);
    }

    #[test]
    fn window_id_display() {
        let id = WindowId::new("repl-1");
        assert_eq!(id.to_string(), "repl-1");
        assert_eq!(id.as_str(), "repl-1");
    }

    #[test]
    fn window_id_borrows_as_str() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(WindowId::from("editor"), 1);
        assert_eq!(map.get("editor"), Some(&1));
    }

    #[test]
    fn window_id_serializes_as_plain_string() {
        let id = WindowId::from("frame");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"frame\"");
        let back: WindowId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
