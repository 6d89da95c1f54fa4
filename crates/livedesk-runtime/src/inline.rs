use livedesk_common::RuntimeError;

use crate::handle::{EventSink, Interpreter, RuntimeHandle};

/// Runs requests on the caller's thread.
///
/// Events still leave through the sink, so the owner sees them on its next
/// scheduling turn exactly as with a worker.
pub struct InlineRuntime {
    interpreter: Option<Box<dyn Interpreter>>,
    sink: EventSink,
}

impl InlineRuntime {
    pub fn new(interpreter: Box<dyn Interpreter>, sink: EventSink) -> Self {
        Self {
            interpreter: Some(interpreter),
            sink,
        }
    }
}

impl RuntimeHandle for InlineRuntime {
    fn eval(&mut self, line: &str, expand: bool) -> Result<(), RuntimeError> {
        let interpreter = self.interpreter.as_mut().ok_or(RuntimeError::Closed)?;
        interpreter.eval(line, expand, &self.sink);
        Ok(())
    }

    fn load(&mut self, source: &str) -> Result<(), RuntimeError> {
        let interpreter = self.interpreter.as_mut().ok_or(RuntimeError::Closed)?;
        interpreter.load(source, &self.sink);
        Ok(())
    }

    fn cleanup(&mut self) {
        self.interpreter = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::CalcInterpreter;
    use crate::RuntimeEvent;
    use std::sync::{Arc, Mutex};

    fn collecting() -> (EventSink, Arc<Mutex<Vec<RuntimeEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let events = Arc::clone(&events);
            EventSink::new(move |e| events.lock().unwrap().push(e))
        };
        (sink, events)
    }

    #[test]
    fn eval_reports_through_sink() {
        let (sink, events) = collecting();
        let mut rt = InlineRuntime::new(Box::new(CalcInterpreter::new()), sink);
        rt.eval("1 + 1", false).unwrap();
        assert_eq!(
            events.lock().unwrap().as_slice(),
            &[RuntimeEvent::Result(Some("2".into()))]
        );
    }

    #[test]
    fn requests_after_cleanup_fail() {
        let (sink, events) = collecting();
        let mut rt = InlineRuntime::new(Box::new(CalcInterpreter::new()), sink);
        rt.cleanup();
        assert!(matches!(rt.eval("1", false), Err(RuntimeError::Closed)));
        assert!(matches!(rt.load("1"), Err(RuntimeError::Closed)));
        assert!(events.lock().unwrap().is_empty());
    }
}
