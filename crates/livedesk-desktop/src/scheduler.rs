//! The desktop's turn queue for runtime events.
//!
//! Runtimes never call into windows. Each sink posts onto this queue and the
//! desktop handles one posted event per turn, so a handler cannot re-enter
//! the runtime that emitted it.

use livedesk_common::WindowId;
use livedesk_runtime::{EventSink, RuntimeEvent};
use tokio::sync::mpsc;
use tracing::debug;

/// A runtime event waiting for its turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Posted {
    pub window: WindowId,
    /// Which runtime instance of `window` produced the event.
    pub generation: u64,
    pub event: RuntimeEvent,
}

pub struct Scheduler {
    tx: mpsc::UnboundedSender<Posted>,
    rx: mpsc::UnboundedReceiver<Posted>,
    next_generation: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            next_generation: 1,
        }
    }

    /// A sink for a new runtime of `window`, tagged with a fresh generation.
    pub fn sink(&mut self, window: &WindowId) -> (u64, EventSink) {
        let generation = self.next_generation;
        self.next_generation += 1;

        let tx = self.tx.clone();
        let window = window.clone();
        let sink = EventSink::new(move |event| {
            let posted = Posted {
                window: window.clone(),
                generation,
                event,
            };
            if tx.send(posted).is_err() {
                debug!(window = %window, generation, "scheduler gone, event dropped");
            }
        });
        (generation, sink)
    }

    /// The next posted event, if one is ready.
    pub fn try_next(&mut self) -> Option<Posted> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next posted event. Waits forever while nothing posts.
    pub async fn next(&mut self) -> Posted {
        // `self.tx` keeps the channel open, so `recv` never yields `None`.
        match self.rx.recv().await {
            Some(posted) => posted,
            None => std::future::pending().await,
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
