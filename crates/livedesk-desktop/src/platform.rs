//! Collaborators the desktop drives but does not implement.
//!
//! A host supplies one [`Platform`], which creates the per-pane widgets.
//! The desktop only ever calls through these traits.

use livedesk_common::{RuntimeError, WindowId};
use livedesk_config::schema::EditorConfig;
use livedesk_platform::{Binding, KeyCombo};
use livedesk_runtime::{LanguageDescriptor, SandboxFrame};

use crate::metrics::{Calibration, GridSize, PaneSize, SampleRect};

/// A highlight placed on an editor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// 0-based.
    pub row: usize,
    pub column: usize,
    pub text: String,
}

/// How a terminal surface should be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalOptions {
    pub grid: GridSize,
    /// Prompt text, already styled.
    pub prompt: String,
    pub cursor_blink: bool,
}

pub trait EditorWidget {
    fn value(&self) -> String;
    fn set_mode(&mut self, syntax_tag: &str);
    fn configure(&mut self, options: &EditorConfig);
    /// Route `combo` to `binding`. The host reports it back as
    /// [`InputEvent::Binding`](crate::InputEvent::Binding).
    fn bind(&mut self, combo: &KeyCombo, binding: Binding);
    /// Replace all annotations.
    fn set_annotations(&mut self, annotations: Vec<Annotation>);
    fn focus(&mut self);
    fn blur(&mut self);
    fn destroy(&mut self);
}

pub trait TerminalSurface {
    fn writeln(&mut self, text: &str);
    fn focus(&mut self);
    fn blur(&mut self);
    fn resize(&mut self, grid: GridSize);
    fn cleanup(&mut self);
}

pub trait FontMetrics {
    /// Measure `sample` in the pane's font. `None` when not visible.
    fn measure(&mut self, sample: &str) -> Option<SampleRect>;
    fn destroy(&mut self);
}

/// An isolated context reachable only by posting encoded messages.
pub trait FrameContext {
    fn post_message(&mut self, payload: &str, target_origin: &str) -> Result<(), RuntimeError>;
    /// Must be safe before the context finished starting.
    fn detach(&mut self);
}

impl FrameContext for SandboxFrame {
    fn post_message(&mut self, payload: &str, target_origin: &str) -> Result<(), RuntimeError> {
        self.post(payload, target_origin)
    }

    fn detach(&mut self) {
        self.close();
    }
}

pub trait Platform {
    /// One-time capability detection, read once per desktop.
    fn calibration(&self) -> Calibration;

    /// Replace the pane's inert content with a live editor holding `content`.
    fn create_editor(&mut self, id: &WindowId, content: &str) -> Box<dyn EditorWidget>;

    fn create_terminal(&mut self, id: &WindowId, options: &TerminalOptions)
        -> Box<dyn TerminalSurface>;

    fn create_metrics(&mut self, id: &WindowId) -> Box<dyn FontMetrics>;

    fn create_frame(
        &mut self,
        id: &WindowId,
        language: &dyn LanguageDescriptor,
    ) -> Result<Box<dyn FrameContext>, RuntimeError>;

    /// Rendered size of the pane, if it has been laid out.
    fn pane_size(&self, id: &WindowId) -> Option<PaneSize>;

    /// Put the pane back to its declared inert content.
    fn restore_pane(&mut self, id: &WindowId, content: &str);
}
