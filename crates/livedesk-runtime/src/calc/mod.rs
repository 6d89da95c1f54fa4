//! `calc`: the bundled expression language.
//!
//! ```text
//! let r = 2
//! fn area(r) = pi * r * r
//! if area(r) > 10 then print("big") else print("small")
//! ```
//!
//! Values are numbers, strings, bools and functions. Statements are
//! separated by newlines or `;`. Builtins: `print`, `len`, `str`.

mod eval;
mod lexer;
mod parser;


use livedesk_common::CompileError;

use crate::events::RuntimeEvent;
use crate::handle::{EventSink, Interpreter};
use crate::language::LanguageDescriptor;

use eval::{Env, Outcome, Value};

const PRELUDE: &str = "\
let pi = 3.141592653589793
let e = 2.718281828459045
let tau = 2 * pi
";

pub struct CalcLanguage;

impl LanguageDescriptor for CalcLanguage {
    fn name(&self) -> &str {
        "calc"
    }

    fn syntax_tag(&self) -> &str {
        "calc"
    }

    fn prelude(&self) -> &str {
        PRELUDE
    }

    fn interpreter(&self) -> Box<dyn Interpreter> {
        Box::new(CalcInterpreter::new())
    }
}

#[derive(Default)]
pub struct CalcInterpreter {
    env: Env,
}

impl CalcInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and run `source`, returning the last statement's outcome.
    /// Compile and execution failures are reported on `sink`.
    fn run(&mut self, source: &str, sink: &EventSink) -> Option<Option<Outcome>> {
        let stmts = match parser::parse(source) {
            Ok(stmts) => stmts,
            Err(e) => {
                sink.emit(RuntimeEvent::CompileError(vec![CompileError::at_offset(
                    e.message, source, e.offset,
                )]));
                return None;
            }
        };

        let mut last = None;
        for stmt in &stmts {
            let mut out = Vec::new();
            let outcome = self.env.exec(stmt, &mut out);
            for line in out {
                sink.emit(RuntimeEvent::Log(line));
            }
            match outcome {
                Ok(outcome) => last = Some(outcome),
                Err(message) => {
                    sink.emit(RuntimeEvent::Error(message));
                    return None;
                }
            }
        }
        Some(last)
    }
}

impl Interpreter for CalcInterpreter {
    fn eval(&mut self, line: &str, expand: bool, sink: &EventSink) {
        let Some(last) = self.run(line, sink) else {
            return;
        };
        let shown = match last {
            Some(Outcome::Value(Value::Nil)) | None => None,
            Some(Outcome::Value(value)) => Some(value.repr()),
            Some(Outcome::Bound(value)) if expand => Some(value.repr()),
            Some(Outcome::Bound(_)) => None,
        };
        sink.emit(RuntimeEvent::Result(shown));
    }

    fn load(&mut self, source: &str, sink: &EventSink) {
        if self.run(source, sink).is_some() {
            sink.emit(RuntimeEvent::Loaded);
        }
    }
}
