use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use livedesk_common::RuntimeError;
use livedesk_config::schema::Isolation;
use tracing::warn;

use crate::events::RuntimeEvent;
use crate::handle::{EventSink, Interpreter, RuntimeHandle};
use crate::inline::InlineRuntime;
use crate::worker::WorkerRuntime;

/// One supported language.
pub trait LanguageDescriptor: Send + Sync {
    /// Name used in deck declarations (`lang = "calc"`).
    fn name(&self) -> &str;

    /// Syntax highlighting mode handed to the editor widget.
    fn syntax_tag(&self) -> &str;

    /// Bootstrap source run before any user code in a fresh sandbox.
    fn prelude(&self) -> &str;

    /// A fresh interpreter with an empty environment.
    fn interpreter(&self) -> Box<dyn Interpreter>;

    /// A live runtime primed with the prelude, reporting to `sink`.
    fn context(
        &self,
        isolation: Isolation,
        sink: EventSink,
    ) -> Result<Box<dyn RuntimeHandle>, RuntimeError> {
        let mut interpreter = self.interpreter();
        prime(self.name(), interpreter.as_mut(), self.prelude());
        let handle: Box<dyn RuntimeHandle> = match isolation {
            Isolation::Inline => Box::new(InlineRuntime::new(interpreter, sink)),
            Isolation::Worker => Box::new(WorkerRuntime::spawn(self.name(), interpreter, sink)?),
        };
        Ok(handle)
    }
}

/// Run the prelude, logging any failure instead of surfacing it to the user.
fn prime(lang: &str, interpreter: &mut dyn Interpreter, prelude: &str) {
    if prelude.trim().is_empty() {
        return;
    }
    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let failures = Arc::clone(&failures);
        EventSink::new(move |event| match event {
            RuntimeEvent::CompileError(_) | RuntimeEvent::Error(_) => {
                if let Ok(mut f) = failures.lock() {
                    f.push(event);
                }
            }
            _ => {}
        })
    };
    interpreter.load(prelude, &sink);
    if let Ok(failures) = failures.lock() {
        for failure in failures.iter() {
            warn!(lang, ?failure, "prelude failed");
        }
    };
}

/// Languages available to a desktop, by name.
#[derive(Clone, Default)]
pub struct LanguageRegistry {
    languages: IndexMap<String, Arc<dyn LanguageDescriptor>>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every bundled language.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(crate::calc::CalcLanguage));
        registry
    }

    /// Add a language, replacing any previous one with the same name.
    pub fn register(&mut self, language: Arc<dyn LanguageDescriptor>) {
        self.languages.insert(language.name().to_string(), language);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn LanguageDescriptor>> {
        self.languages.get(name).cloned()
    }
}
