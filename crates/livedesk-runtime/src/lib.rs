//! Execution runtimes for livedesk consoles and frames.
//!
//! A [`RuntimeHandle`] accepts `eval`/`load` requests and reports back through
//! an [`EventSink`] using the fixed [`RuntimeEvent`] vocabulary. Whoever
//! creates the sink decides when events are handled; the runtimes here never
//! call back into their owner synchronously.

pub mod calc;

mod events;
mod handle;
mod inline;
mod language;
mod sandbox;
mod worker;

pub use events::RuntimeEvent;
pub use handle::{EventSink, Interpreter, RuntimeHandle};
pub use inline::InlineRuntime;
pub use language::{LanguageDescriptor, LanguageRegistry};
pub use sandbox::{SandboxFrame, SandboxRecord, Transcript};
pub use worker::WorkerRuntime;
