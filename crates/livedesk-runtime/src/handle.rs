use std::fmt;
use std::sync::Arc;

use livedesk_common::RuntimeError;

use crate::events::RuntimeEvent;

/// Where a runtime sends its events.
///
/// Cloning is cheap; every clone feeds the same destination. The callback
/// must only hand the event off (post it to a queue), never process it.
#[derive(Clone)]
pub struct EventSink(Arc<dyn Fn(RuntimeEvent) + Send + Sync>);

impl EventSink {
    pub fn new(f: impl Fn(RuntimeEvent) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn emit(&self, event: RuntimeEvent) {
        (self.0)(event)
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventSink")
    }
}

/// A live connection to one evaluator.
///
/// Requests return as soon as they are accepted; outcomes arrive on the
/// sink the handle was created with.
pub trait RuntimeHandle: Send {
    /// Evaluate one line. `expand` asks for the value of a trailing
    /// statement to be reported even when it would normally be discarded.
    fn eval(&mut self, line: &str, expand: bool) -> Result<(), RuntimeError>;

    /// Run a full buffer, replacing nothing: definitions accumulate.
    fn load(&mut self, source: &str) -> Result<(), RuntimeError>;

    /// Stop the evaluator. Later requests fail with [`RuntimeError::Closed`].
    fn cleanup(&mut self);
}

/// The synchronous core of a language: parse and run, reporting to `sink`.
pub trait Interpreter: Send {
    fn eval(&mut self, line: &str, expand: bool, sink: &EventSink);
    fn load(&mut self, source: &str, sink: &EventSink);
}
