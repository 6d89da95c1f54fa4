//! A runtime on its own OS thread, fed over a channel.

use std::sync::mpsc;
use std::thread;

use livedesk_common::RuntimeError;
use tracing::debug;

use crate::handle::{EventSink, Interpreter, RuntimeHandle};

enum Request {
    Eval { line: String, expand: bool },
    Load(String),
}

pub struct WorkerRuntime {
    tx: Option<mpsc::Sender<Request>>,
}

impl WorkerRuntime {
    /// Move `interpreter` onto a new thread that serves requests in order.
    pub fn spawn(
        lang: &str,
        mut interpreter: Box<dyn Interpreter>,
        sink: EventSink,
    ) -> Result<Self, RuntimeError> {
        let (tx, rx) = mpsc::channel::<Request>();
        let name = format!("livedesk-{lang}-worker");

        thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                while let Ok(request) = rx.recv() {
                    match request {
                        Request::Eval { line, expand } => interpreter.eval(&line, expand, &sink),
                        Request::Load(source) => interpreter.load(&source, &sink),
                    }
                }
                debug!(thread = %name, "worker exiting");
            })
            .map_err(|e| RuntimeError::Spawn(format!("worker thread: {e}")))?;

        Ok(Self { tx: Some(tx) })
    }

    fn submit(&self, request: Request) -> Result<(), RuntimeError> {
        let tx = self.tx.as_ref().ok_or(RuntimeError::Closed)?;
        tx.send(request).map_err(|_| RuntimeError::Closed)
    }
}

impl RuntimeHandle for WorkerRuntime {
    fn eval(&mut self, line: &str, expand: bool) -> Result<(), RuntimeError> {
        self.submit(Request::Eval {
            line: line.to_string(),
            expand,
        })
    }

    fn load(&mut self, source: &str) -> Result<(), RuntimeError> {
        self.submit(Request::Load(source.to_string()))
    }

    /// Dropping the sender ends the thread after its current request.
    /// The thread is detached, not joined.
    fn cleanup(&mut self) {
        self.tx = None;
    }
}

impl Drop for WorkerRuntime {
    fn drop(&mut self) {
        self.cleanup();
    }
}
