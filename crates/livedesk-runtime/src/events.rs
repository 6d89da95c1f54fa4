use livedesk_common::CompileError;

/// Everything a runtime can report.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeEvent {
    /// The source did not parse. Nothing was executed.
    CompileError(Vec<CompileError>),
    /// Execution failed.
    Error(String),
    /// Value of an `eval`. `None` is the "no value" result of a statement.
    Result(Option<String>),
    /// Output written by the program itself.
    Log(String),
    /// A full-buffer `load` parsed and ran to completion.
    Loaded,
}

impl RuntimeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RuntimeEvent::CompileError(_) => "compileError",
            RuntimeEvent::Error(_) => "error",
            RuntimeEvent::Result(_) => "result",
            RuntimeEvent::Log(_) => "log",
            RuntimeEvent::Loaded => "loaded",
        }
    }
}
