//! Inter-window message vocabulary.
//!
//! Messages are fire-and-forget: no acknowledgement, no sequence numbers.
//! The only correlation is the optional `token` carried by a `save` request
//! and echoed by the `load` that answers it.
//!
//! The wire form (used when a message crosses into a sandboxed frame) is a
//! JSON object `{"command": ..., "data": ..., "token": ...}`.

use serde::{Deserialize, Serialize};

use crate::compile::CompileError;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Give keyboard focus to the receiving window.
    Focus,
    /// Drop keyboard focus.
    Blur,
    /// Push a full buffer.
    Load(String),
    /// Evaluate one line or fragment.
    Eval(String),
    /// Ask the receiver for its current buffer.
    Save,
    /// Structured compile errors for the receiver to highlight.
    Errors(Vec<CompileError>),
    /// Environment bootstrap source, delivered before the first load.
    Prelude(String),
    /// Anything outside the vocabulary, kept for reporting.
    Other {
        name: String,
        data: serde_json::Value,
    },
}

impl Command {
    pub fn name(&self) -> &str {
        match self {
            Command::Focus => "focus",
            Command::Blur => "blur",
            Command::Load(_) => "load",
            Command::Eval(_) => "eval",
            Command::Save => "save",
            Command::Errors(_) => "errors",
            Command::Prelude(_) => "prelude",
            Command::Other { name, .. } => name,
        }
    }

    /// The payload as JSON, `null` for payload-less commands.
    pub fn data(&self) -> serde_json::Value {
        match self {
            Command::Focus | Command::Blur | Command::Save => serde_json::Value::Null,
            Command::Load(text) | Command::Eval(text) | Command::Prelude(text) => {
                serde_json::Value::String(text.clone())
            }
            Command::Errors(errors) => {
                serde_json::to_value(errors).unwrap_or(serde_json::Value::Null)
            }
            Command::Other { data, .. } => data.clone(),
        }
    }

    fn from_parts(name: String, data: serde_json::Value) -> Option<Self> {
        let text = |data: serde_json::Value| match data {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        };
        let command = match name.as_str() {
            "focus" => Command::Focus,
            "blur" => Command::Blur,
            "save" => Command::Save,
            "load" => Command::Load(text(data)?),
            "eval" => Command::Eval(text(data)?),
            "prelude" => Command::Prelude(text(data)?),
            "errors" => Command::Errors(serde_json::from_value(data).ok()?),
            _ => Command::Other { name, data },
        };
        Some(command)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub command: Command,
    pub token: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    command: String,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl Message {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            token: None,
        }
    }

    pub fn focus() -> Self {
        Self::new(Command::Focus)
    }

    pub fn blur() -> Self {
        Self::new(Command::Blur)
    }

    pub fn load(text: impl Into<String>) -> Self {
        Self::new(Command::Load(text.into()))
    }

    pub fn eval(text: impl Into<String>) -> Self {
        Self::new(Command::Eval(text.into()))
    }

    pub fn save() -> Self {
        Self::new(Command::Save)
    }

    pub fn errors(errors: Vec<CompileError>) -> Self {
        Self::new(Command::Errors(errors))
    }

    pub fn prelude(source: impl Into<String>) -> Self {
        Self::new(Command::Prelude(source.into()))
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn name(&self) -> &str {
        self.command.name()
    }

    /// Encode to the JSON wire form.
    pub fn to_json(&self) -> String {
        let wire = WireMessage {
            command: self.command.name().to_string(),
            data: self.command.data(),
            token: self.token.clone(),
        };
        serde_json::to_string(&wire).unwrap_or_else(|_| "null".to_string())
    }

    /// Decode from the JSON wire form.
    ///
    /// Returns `None` when the JSON is malformed or a known command carries a
    /// payload of the wrong shape. Unknown command names decode to
    /// [`Command::Other`].
    pub fn from_json(raw: &str) -> Option<Self> {
        let wire: WireMessage = serde_json::from_str(raw).ok()?;
        let command = Command::from_parts(wire.command, wire.data)?;
        Some(Self {
            command,
            token: wire.token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_encodes_text_payload() {
        let json = Message::load("let x = 1").to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["command"], "load");
        assert_eq!(value["data"], "let x = 1");
        assert!(value.get("token").is_none());
    }

    #[test]
    fn token_survives_the_wire() {
        let msg = Message::save().with_token("abcd1234");
        let back = Message::from_json(&msg.to_json()).unwrap();
        assert_eq!(back.command, Command::Save);
        assert_eq!(back.token.as_deref(), Some("abcd1234"));
    }

    #[test]
    fn errors_payload_decodes() {
        let errors = vec![
            CompileError::bare("first"),
            CompileError::at_offset("second", "1 +", 3),
        ];
        let back = Message::from_json(&Message::errors(errors.clone()).to_json()).unwrap();
        assert_eq!(back.command, Command::Errors(errors));
    }

    #[test]
    fn unknown_command_decodes_as_other() {
        let msg = Message::from_json(r#"{"command":"reticulate","data":[1,2]}"#).unwrap();
        assert_eq!(msg.name(), "reticulate");
        assert!(matches!(msg.command, Command::Other { ref data, .. } if data.is_array()));
    }

    #[test]
    fn wrong_payload_shape_is_rejected() {
        assert!(Message::from_json(r#"{"command":"load","data":42}"#).is_none());
        assert!(Message::from_json(r#"{"command":"errors","data":"nope"}"#).is_none());
        assert!(Message::from_json("not json").is_none());
    }

    #[test]
    fn payloadless_commands_need_no_data() {
        let msg = Message::from_json(r#"{"command":"focus"}"#).unwrap();
        assert_eq!(msg.command, Command::Focus);
        assert_eq!(msg.command.data(), serde_json::Value::Null);
    }
}
