//! A [`Platform`] for a plain terminal.
//!
//! Console panes print to stdout. Editor panes are in-memory buffers shown on
//! request. Frames are real sandbox contexts whose transcripts can be shown.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use livedesk_common::{RuntimeError, WindowId};
use livedesk_config::schema::EditorConfig;
use livedesk_desktop::metrics::{Calibration, GridSize, PaneSize, SampleRect};
use livedesk_desktop::platform::{
    Annotation, EditorWidget, FontMetrics, FrameContext, Platform, TerminalOptions,
    TerminalSurface,
};
use livedesk_platform::{Binding, KeyCombo};
use livedesk_runtime::{LanguageDescriptor, RuntimeEvent, SandboxFrame, SandboxRecord, Transcript};
use tracing::{debug, info};

#[derive(Default)]
struct Panes {
    buffers: HashMap<WindowId, String>,
    transcripts: HashMap<WindowId, Transcript>,
}

#[derive(Clone, Default)]
pub struct StdioPlatform {
    panes: Arc<Mutex<Panes>>,
}

impl StdioPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn panes(&self) -> MutexGuard<'_, Panes> {
        self.panes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Printable view of a pane, if it holds anything to show.
    pub fn show(&self, id: &WindowId) -> Option<String> {
        let panes = self.panes();
        if let Some(buffer) = panes.buffers.get(id) {
            return Some(buffer.clone());
        }
        let transcript = panes.transcripts.get(id)?;
        let lines: Vec<String> = transcript.records().iter().map(describe).collect();
        Some(lines.join("\n"))
    }
}

fn describe(record: &SandboxRecord) -> String {
    match record {
        SandboxRecord::Received { command, origin } => format!("<- {command} ({origin})"),
        SandboxRecord::Rejected(payload) => format!("!! rejected {payload}"),
        SandboxRecord::Event(RuntimeEvent::CompileError(errors)) => errors
            .iter()
            .map(|e| format!("-> compile error: {}", e.message))
            .collect::<Vec<_>>()
            .join("\n"),
        SandboxRecord::Event(RuntimeEvent::Error(message)) => format!("-> error: {message}"),
        SandboxRecord::Event(RuntimeEvent::Result(Some(value))) => format!("-> {value}"),
        SandboxRecord::Event(RuntimeEvent::Result(None)) => "->".to_string(),
        SandboxRecord::Event(RuntimeEvent::Log(text)) => format!("-> log: {text}"),
        SandboxRecord::Event(RuntimeEvent::Loaded) => "-> loaded".to_string(),
    }
}

/// Terminal size from the environment, in cells.
fn terminal_cells() -> Option<PaneSize> {
    let read = |name: &str| std::env::var(name).ok()?.trim().parse::<f64>().ok();
    Some(PaneSize {
        width: read("COLUMNS")?,
        height: read("LINES")?,
    })
}

struct StdioEditor {
    id: WindowId,
    platform: StdioPlatform,
}

impl EditorWidget for StdioEditor {
    fn value(&self) -> String {
        self.platform
            .panes()
            .buffers
            .get(&self.id)
            .cloned()
            .unwrap_or_default()
    }

    fn set_mode(&mut self, syntax_tag: &str) {
        debug!(window = %self.id, syntax_tag, "editor mode");
    }

    fn configure(&mut self, options: &EditorConfig) {
        debug!(window = %self.id, tab_size = options.tab_size, "editor configured");
    }

    fn bind(&mut self, combo: &KeyCombo, binding: Binding) {
        debug!(window = %self.id, %combo, ?binding, "editor key bound");
    }

    fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        for a in annotations {
            println!("[{}] line {}: {}", self.id, a.row + 1, a.text);
        }
    }

    fn focus(&mut self) {
        info!(window = %self.id, "focused");
    }

    fn blur(&mut self) {}

    fn destroy(&mut self) {
        self.platform.panes().buffers.remove(&self.id);
    }
}

struct StdioTerminal {
    id: WindowId,
}

impl TerminalSurface for StdioTerminal {
    fn writeln(&mut self, text: &str) {
        println!("{text}");
    }

    fn focus(&mut self) {
        info!(window = %self.id, "focused");
    }

    fn blur(&mut self) {}

    fn resize(&mut self, grid: GridSize) {
        debug!(window = %self.id, cols = grid.cols, rows = grid.rows, "resized");
    }

    fn cleanup(&mut self) {
        debug!(window = %self.id, "terminal released");
    }
}

/// Every cell of a plain terminal is one character wide and one line high.
struct CellMetrics;

impl FontMetrics for CellMetrics {
    fn measure(&mut self, sample: &str) -> Option<SampleRect> {
        Some(SampleRect {
            width: sample.chars().count() as f64,
            height: 1.0,
        })
    }

    fn destroy(&mut self) {}
}

impl Platform for StdioPlatform {
    fn calibration(&self) -> Calibration {
        Calibration {
            fractional_rects: false,
        }
    }

    fn create_editor(&mut self, id: &WindowId, content: &str) -> Box<dyn EditorWidget> {
        self.panes()
            .buffers
            .insert(id.clone(), content.to_string());
        Box::new(StdioEditor {
            id: id.clone(),
            platform: self.clone(),
        })
    }

    fn create_terminal(
        &mut self,
        id: &WindowId,
        options: &TerminalOptions,
    ) -> Box<dyn TerminalSurface> {
        debug!(window = %id, cols = options.grid.cols, rows = options.grid.rows, "terminal created");
        Box::new(StdioTerminal { id: id.clone() })
    }

    fn create_metrics(&mut self, _id: &WindowId) -> Box<dyn FontMetrics> {
        Box::new(CellMetrics)
    }

    fn create_frame(
        &mut self,
        id: &WindowId,
        language: &dyn LanguageDescriptor,
    ) -> Result<Box<dyn FrameContext>, RuntimeError> {
        let frame = SandboxFrame::spawn(language)?;
        self.panes()
            .transcripts
            .insert(id.clone(), frame.transcript());
        Ok(Box::new(frame))
    }

    fn pane_size(&self, _id: &WindowId) -> Option<PaneSize> {
        terminal_cells()
    }

    fn restore_pane(&mut self, id: &WindowId, _content: &str) {
        let mut panes = self.panes();
        panes.buffers.remove(id);
        panes.transcripts.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_buffer_is_shown() {
        let mut platform = StdioPlatform::new();
        let id = WindowId::from("editor");
        let editor = platform.create_editor(&id, "let x = 1");
        assert_eq!(platform.show(&id).as_deref(), Some("let x = 1"));
        assert_eq!(editor.value(), "let x = 1");

        platform.restore_pane(&id, "let x = 1");
        assert!(platform.show(&id).is_none());
    }

    #[test]
    fn frame_transcript_is_shown() {
        let mut platform = StdioPlatform::new();
        let id = WindowId::from("frame");
        let language = livedesk_runtime::calc::CalcLanguage;
        let frame = platform.create_frame(&id, &language).unwrap();
        drop(frame);
        assert_eq!(platform.show(&id).as_deref(), Some(""));
    }

    #[test]
    fn describe_records() {
        assert_eq!(
            describe(&SandboxRecord::Received {
                command: "load".into(),
                origin: "*".into()
            }),
            "<- load (*)"
        );
        assert_eq!(describe(&SandboxRecord::Event(RuntimeEvent::Loaded)), "-> loaded");
    }

    #[test]
    fn cells_measure_one_by_one() {
        let rect = CellMetrics.measure("XXXX").unwrap();
        assert_eq!(rect.width, 4.0);
        assert_eq!(rect.height, 1.0);
    }
}
