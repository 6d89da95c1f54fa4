//! An isolated execution context reachable only by posting JSON messages.
//!
//! The context owns a bare interpreter (no prelude) on its own thread. It
//! learns its environment from a `prelude` post and runs user code from
//! `load` posts. Everything it sees or produces goes into a transcript.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use livedesk_common::{Command, Message, RuntimeError};
use tracing::{debug, warn};

use crate::events::RuntimeEvent;
use crate::handle::EventSink;
use crate::language::LanguageDescriptor;

/// One line of a sandbox transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum SandboxRecord {
    /// A post was received and decoded.
    Received { command: String, origin: String },
    /// A post could not be decoded.
    Rejected(String),
    /// Output from the interpreter.
    Event(RuntimeEvent),
}

/// Shared, append-only view of a sandbox's transcript.
#[derive(Debug, Clone, Default)]
pub struct Transcript(Arc<Mutex<Vec<SandboxRecord>>>);

impl Transcript {
    fn push(&self, record: SandboxRecord) {
        if let Ok(mut records) = self.0.lock() {
            records.push(record);
        }
    }

    pub fn records(&self) -> Vec<SandboxRecord> {
        self.0.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Output events only, in arrival order.
    pub fn events(&self) -> Vec<RuntimeEvent> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                SandboxRecord::Event(e) => Some(e),
                _ => None,
            })
            .collect()
    }
}

enum Post {
    Message { payload: String, origin: String },
    Flush(mpsc::Sender<()>),
}

pub struct SandboxFrame {
    tx: Option<mpsc::Sender<Post>>,
    transcript: Transcript,
}

impl SandboxFrame {
    pub fn spawn(language: &dyn LanguageDescriptor) -> Result<Self, RuntimeError> {
        let (tx, rx) = mpsc::channel::<Post>();
        let transcript = Transcript::default();
        let mut interpreter = language.interpreter();

        let record = transcript.clone();
        let sink = {
            let record = transcript.clone();
            EventSink::new(move |event| record.push(SandboxRecord::Event(event)))
        };

        thread::Builder::new()
            .name(format!("livedesk-{}-sandbox", language.name()))
            .spawn(move || {
                while let Ok(post) = rx.recv() {
                    let (payload, origin) = match post {
                        Post::Message { payload, origin } => (payload, origin),
                        Post::Flush(done) => {
                            let _ = done.send(());
                            continue;
                        }
                    };
                    let Some(message) = Message::from_json(&payload) else {
                        warn!("sandbox rejected malformed post");
                        record.push(SandboxRecord::Rejected(payload));
                        continue;
                    };
                    record.push(SandboxRecord::Received {
                        command: message.name().to_string(),
                        origin,
                    });
                    if let Command::Prelude(source) | Command::Load(source) = message.command {
                        interpreter.load(&source, &sink);
                    }
                }
                debug!("sandbox exiting");
            })
            .map_err(|e| RuntimeError::Spawn(format!("sandbox thread: {e}")))?;

        Ok(Self {
            tx: Some(tx),
            transcript,
        })
    }

    /// Deliver a JSON-encoded message. The origin is recorded, never checked.
    pub fn post(&self, payload: &str, target_origin: &str) -> Result<(), RuntimeError> {
        let tx = self.tx.as_ref().ok_or(RuntimeError::Closed)?;
        tx.send(Post::Message {
            payload: payload.to_string(),
            origin: target_origin.to_string(),
        })
        .map_err(|_| RuntimeError::Closed)
    }

    /// Block until every post sent so far has been handled.
    pub fn flush(&self) -> Result<(), RuntimeError> {
        let tx = self.tx.as_ref().ok_or(RuntimeError::Closed)?;
        let (done_tx, done_rx) = mpsc::channel();
        tx.send(Post::Flush(done_tx))
            .map_err(|_| RuntimeError::Closed)?;
        done_rx.recv().map_err(|_| RuntimeError::Closed)
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.clone()
    }

    /// Detach the context. Safe before any post and safe to repeat.
    pub fn close(&mut self) {
        self.tx = None;
    }
}

impl Drop for SandboxFrame {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::CalcLanguage;

    fn events(frame: &SandboxFrame) -> Vec<RuntimeEvent> {
        frame.transcript().events()
    }

    #[test]
    fn prelude_then_load_runs_in_one_environment() {
        let frame = SandboxFrame::spawn(&CalcLanguage).unwrap();
        frame
            .post(&Message::prelude("let base = 40").to_json(), "*")
            .unwrap();
        frame
            .post(&Message::load("print(base + 2)").to_json(), "*")
            .unwrap();
        frame.flush().unwrap();

        let transcript = frame.transcript().records();
        assert_eq!(
            transcript[0],
            SandboxRecord::Received {
                command: "prelude".into(),
                origin: "*".into()
            }
        );
        assert_eq!(
            events(&frame),
            vec![
                RuntimeEvent::Loaded,
                RuntimeEvent::Log("42".into()),
                RuntimeEvent::Loaded
            ]
        );
    }

    #[test]
    fn load_without_prelude_has_bare_environment() {
        let frame = SandboxFrame::spawn(&CalcLanguage).unwrap();
        frame.post(&Message::load("print(pi)").to_json(), "*").unwrap();
        frame.flush().unwrap();
        assert!(matches!(events(&frame).as_slice(), [RuntimeEvent::Error(_)]));
    }

    #[test]
    fn malformed_post_is_rejected() {
        let frame = SandboxFrame::spawn(&CalcLanguage).unwrap();
        frame.post("{not json", "*").unwrap();
        frame.flush().unwrap();
        assert_eq!(
            frame.transcript().records(),
            vec![SandboxRecord::Rejected("{not json".into())]
        );
    }

    #[test]
    fn focus_is_recorded_only() {
        let frame = SandboxFrame::spawn(&CalcLanguage).unwrap();
        frame.post(&Message::focus().to_json(), "*").unwrap();
        frame.flush().unwrap();
        assert_eq!(frame.transcript().records().len(), 1);
        assert!(events(&frame).is_empty());
    }

    #[test]
    fn close_before_any_post_is_safe() {
        let mut frame = SandboxFrame::spawn(&CalcLanguage).unwrap();
        frame.close();
        frame.close();
        assert!(matches!(frame.post("{}", "*"), Err(RuntimeError::Closed)));
    }
}
