//! An in-memory [`Platform`] that records every call.
//!
//! Clones share one state, so a test keeps a clone and inspects it after
//! handing the original to a [`Desktop`](crate::Desktop).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use livedesk_common::{RuntimeError, WindowId};
use livedesk_config::schema::{EditorConfig, Isolation};
use livedesk_platform::{Binding, KeyCombo};
use livedesk_runtime::{EventSink, Interpreter, LanguageDescriptor, RuntimeHandle};

use crate::metrics::{Calibration, GridSize, PaneSize, SampleRect};
use crate::platform::{
    Annotation, EditorWidget, FontMetrics, FrameContext, Platform, TerminalOptions,
    TerminalSurface,
};

#[derive(Debug, Clone, Default)]
pub struct EditorRecord {
    pub value: String,
    pub mode: Option<String>,
    pub options: Option<EditorConfig>,
    pub bindings: Vec<(KeyCombo, Binding)>,
    pub annotations: Vec<Annotation>,
    pub focused: bool,
    pub destroyed: bool,
}

#[derive(Debug, Clone)]
pub struct TerminalRecord {
    pub options: TerminalOptions,
    pub grid: GridSize,
    pub lines: Vec<String>,
    pub focused: bool,
    pub cleaned_up: bool,
}

/// One message posted into a frame context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePost {
    pub window: WindowId,
    pub payload: String,
    pub origin: String,
}

#[derive(Debug, Default)]
pub struct RecordedState {
    /// Latest editor created for each pane.
    pub editors: HashMap<WindowId, EditorRecord>,
    /// Latest terminal created for each pane.
    pub terminals: HashMap<WindowId, TerminalRecord>,
    pub frame_posts: Vec<FramePost>,
    /// Frame posts still to be refused before posting succeeds again.
    pub refused_posts: usize,
    pub frames_created: usize,
    pub frames_detached: usize,
    pub restored: Vec<(WindowId, String)>,
    /// Every collaborator call as `"<window>: <call>"`, in order.
    pub calls: Vec<String>,
    pub pane_sizes: HashMap<WindowId, PaneSize>,
    /// What every metrics probe measures. `None` reads as a hidden pane.
    pub sample: Option<SampleRect>,
    pub calibration: Calibration,
}

#[derive(Clone, Default)]
pub struct RecordingPlatform {
    state: Arc<Mutex<RecordedState>>,
}

fn lock(state: &Mutex<RecordedState>) -> MutexGuard<'_, RecordedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, RecordedState> {
        lock(&self.state)
    }

    pub fn with_pane(self, id: &str, width: f64, height: f64) -> Self {
        self.state()
            .pane_sizes
            .insert(WindowId::from(id), PaneSize { width, height });
        self
    }

    pub fn with_sample(self, width: f64, height: f64) -> Self {
        self.state().sample = Some(SampleRect { width, height });
        self
    }

    /// Refuse the next `count` frame posts as if the context had closed.
    pub fn with_refused_posts(self, count: usize) -> Self {
        self.state().refused_posts = count;
        self
    }

    pub fn with_calibration(self, calibration: Calibration) -> Self {
        self.state().calibration = calibration;
        self
    }

    pub fn editor(&self, id: &str) -> Option<EditorRecord> {
        self.state().editors.get(id).cloned()
    }

    pub fn terminal(&self, id: &str) -> Option<TerminalRecord> {
        self.state().terminals.get(id).cloned()
    }

    /// Terminal output with styling removed.
    pub fn terminal_text(&self, id: &str) -> Vec<String> {
        self.terminal(id)
            .map(|t| t.lines.iter().map(|l| strip_ansi(l)).collect())
            .unwrap_or_default()
    }

    /// Commands posted into frame `id`, in order.
    pub fn frame_commands(&self, id: &str) -> Vec<String> {
        self.state()
            .frame_posts
            .iter()
            .filter(|post| post.window.as_str() == id)
            .filter_map(|post| livedesk_common::Message::from_json(&post.payload))
            .map(|message| message.name().to_string())
            .collect()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Wrap `language` so every runtime it starts logs its release as
    /// `"<language>: runtime.cleanup"` in [`calls`](Self::calls).
    pub fn language(&self, language: Arc<dyn LanguageDescriptor>) -> Arc<dyn LanguageDescriptor> {
        Arc::new(RecordingLanguage {
            platform: self.clone(),
            inner: language,
        })
    }

    fn record(&self, id: &WindowId, call: &str) {
        self.state().calls.push(format!("{id}: {call}"));
    }
}

/// Remove ANSI escape sequences.
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

struct Handle {
    platform: RecordingPlatform,
    id: WindowId,
}

impl Handle {
    fn record(&self, call: &str) {
        self.platform.record(&self.id, call);
    }

    fn editor(&self, f: impl FnOnce(&mut EditorRecord)) {
        if let Some(editor) = self.platform.state().editors.get_mut(&self.id) {
            f(editor);
        }
    }

    fn terminal(&self, f: impl FnOnce(&mut TerminalRecord)) {
        if let Some(terminal) = self.platform.state().terminals.get_mut(&self.id) {
            f(terminal);
        }
    }
}

impl EditorWidget for Handle {
    fn value(&self) -> String {
        self.platform
            .state()
            .editors
            .get(&self.id)
            .map(|e| e.value.clone())
            .unwrap_or_default()
    }

    fn set_mode(&mut self, syntax_tag: &str) {
        self.record("editor.set_mode");
        self.editor(|e| e.mode = Some(syntax_tag.to_string()));
    }

    fn configure(&mut self, options: &EditorConfig) {
        self.editor(|e| e.options = Some(options.clone()));
    }

    fn bind(&mut self, combo: &KeyCombo, binding: Binding) {
        self.editor(|e| e.bindings.push((combo.clone(), binding)));
    }

    fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        self.editor(|e| e.annotations = annotations);
    }

    fn focus(&mut self) {
        self.record("editor.focus");
        self.editor(|e| e.focused = true);
    }

    fn blur(&mut self) {
        self.editor(|e| e.focused = false);
    }

    fn destroy(&mut self) {
        self.record("editor.destroy");
        self.editor(|e| e.destroyed = true);
    }
}

impl TerminalSurface for Handle {
    fn writeln(&mut self, text: &str) {
        self.terminal(|t| t.lines.push(text.to_string()));
    }

    fn focus(&mut self) {
        self.record("terminal.focus");
        self.terminal(|t| t.focused = true);
    }

    fn blur(&mut self) {
        self.terminal(|t| t.focused = false);
    }

    fn resize(&mut self, grid: GridSize) {
        self.record("terminal.resize");
        self.terminal(|t| t.grid = grid);
    }

    fn cleanup(&mut self) {
        self.record("terminal.cleanup");
        self.terminal(|t| t.cleaned_up = true);
    }
}

impl FontMetrics for Handle {
    fn measure(&mut self, _sample: &str) -> Option<SampleRect> {
        self.platform.state().sample
    }

    fn destroy(&mut self) {
        self.record("metrics.destroy");
    }
}

impl FrameContext for Handle {
    fn post_message(&mut self, payload: &str, target_origin: &str) -> Result<(), RuntimeError> {
        let mut state = self.platform.state();
        if state.refused_posts > 0 {
            state.refused_posts -= 1;
            return Err(RuntimeError::Closed);
        }
        state.frame_posts.push(FramePost {
            window: self.id.clone(),
            payload: payload.to_string(),
            origin: target_origin.to_string(),
        });
        Ok(())
    }

    fn detach(&mut self) {
        self.record("frame.detach");
        self.platform.state().frames_detached += 1;
    }
}

struct RecordingLanguage {
    platform: RecordingPlatform,
    inner: Arc<dyn LanguageDescriptor>,
}

impl LanguageDescriptor for RecordingLanguage {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn syntax_tag(&self) -> &str {
        self.inner.syntax_tag()
    }

    fn prelude(&self) -> &str {
        self.inner.prelude()
    }

    fn interpreter(&self) -> Box<dyn Interpreter> {
        self.inner.interpreter()
    }

    fn context(
        &self,
        isolation: Isolation,
        sink: EventSink,
    ) -> Result<Box<dyn RuntimeHandle>, RuntimeError> {
        let inner = self.inner.context(isolation, sink)?;
        Ok(Box::new(RecordingRuntime {
            platform: self.platform.clone(),
            language: WindowId::from(self.inner.name()),
            inner,
        }))
    }
}

struct RecordingRuntime {
    platform: RecordingPlatform,
    language: WindowId,
    inner: Box<dyn RuntimeHandle>,
}

impl RuntimeHandle for RecordingRuntime {
    fn eval(&mut self, line: &str, expand: bool) -> Result<(), RuntimeError> {
        self.inner.eval(line, expand)
    }

    fn load(&mut self, source: &str) -> Result<(), RuntimeError> {
        self.inner.load(source)
    }

    fn cleanup(&mut self) {
        self.platform.record(&self.language, "runtime.cleanup");
        self.inner.cleanup();
    }
}

impl Platform for RecordingPlatform {
    fn calibration(&self) -> Calibration {
        self.state().calibration
    }

    fn create_editor(&mut self, id: &WindowId, content: &str) -> Box<dyn EditorWidget> {
        self.record(id, "editor.create");
        self.state().editors.insert(
            id.clone(),
            EditorRecord {
                value: content.to_string(),
                ..EditorRecord::default()
            },
        );
        Box::new(Handle {
            platform: self.clone(),
            id: id.clone(),
        })
    }

    fn create_terminal(
        &mut self,
        id: &WindowId,
        options: &TerminalOptions,
    ) -> Box<dyn TerminalSurface> {
        self.record(id, "terminal.create");
        self.state().terminals.insert(
            id.clone(),
            TerminalRecord {
                options: options.clone(),
                grid: options.grid,
                lines: Vec::new(),
                focused: false,
                cleaned_up: false,
            },
        );
        Box::new(Handle {
            platform: self.clone(),
            id: id.clone(),
        })
    }

    fn create_metrics(&mut self, id: &WindowId) -> Box<dyn FontMetrics> {
        self.record(id, "metrics.create");
        Box::new(Handle {
            platform: self.clone(),
            id: id.clone(),
        })
    }

    fn create_frame(
        &mut self,
        id: &WindowId,
        _language: &dyn LanguageDescriptor,
    ) -> Result<Box<dyn FrameContext>, RuntimeError> {
        self.record(id, "frame.create");
        self.state().frames_created += 1;
        Ok(Box::new(Handle {
            platform: self.clone(),
            id: id.clone(),
        }))
    }

    fn pane_size(&self, id: &WindowId) -> Option<PaneSize> {
        self.state().pane_sizes.get(id).copied()
    }

    fn restore_pane(&mut self, id: &WindowId, content: &str) {
        self.record(id, "pane.restore");
        self.state()
            .restored
            .push((id.clone(), content.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_ansi_removes_sgr_sequences() {
        assert_eq!(strip_ansi("\x1b[0m\x1b[1m\x1b[31mboom\x1b[0m"), "boom");
        assert_eq!(strip_ansi("plain"), "plain");
        assert_eq!(strip_ansi("\x1b[38;5;22m2\x1b[0m"), "2");
    }

    #[test]
    fn clones_share_state() {
        let platform = RecordingPlatform::new();
        let mut handed_off = platform.clone();
        handed_off.restore_pane(&WindowId::from("w"), "inert");
        assert_eq!(platform.state().restored.len(), 1);
        assert_eq!(platform.calls(), vec!["w: pane.restore".to_string()]);
    }
}
