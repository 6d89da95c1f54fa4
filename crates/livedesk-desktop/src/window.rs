//! The shared window contract and the kind dispatch table.

use std::sync::Arc;

use livedesk_common::{Message, WindowError, WindowId, WindowKind};
use livedesk_config::LivedeskConfig;
use livedesk_platform::{Binding, KeyCombo};
use livedesk_runtime::{LanguageDescriptor, RuntimeEvent};
use tracing::debug;

use crate::console::ConsoleWindow;
use crate::editor::EditorWindow;
use crate::frame::FrameWindow;
use crate::metrics::Calibration;
use crate::platform::Platform;
use crate::scheduler::Scheduler;

/// Host input addressed to one window.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A line submitted at a console prompt.
    Command(String),
    /// The console asked for its peer's buffer.
    LoadBuffer,
    /// Focus left the console.
    FocusOut,
    /// Escape pressed in the console.
    Escape,
    /// A key the widget already resolved to a binding.
    Binding(Binding),
    /// A raw key, resolved against the window's own bindings.
    Key(KeyCombo),
    /// The pane's font metrics may have changed.
    CharacterSizeChanged,
}

/// A message waiting for delivery.
#[derive(Debug, Clone)]
pub(crate) struct Envelope {
    pub from: WindowId,
    pub to: WindowId,
    pub message: Message,
}

/// What a window may touch while handling a call.
///
/// Windows never see each other. Anything they send is queued here and
/// delivered by the desktop after the current handler returns.
pub(crate) struct Context<'a> {
    pub platform: &'a mut dyn Platform,
    pub scheduler: &'a mut Scheduler,
    pub config: &'a LivedeskConfig,
    pub calibration: Calibration,
    outbox: &'a mut Vec<Envelope>,
    focus: &'a mut Option<WindowId>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        platform: &'a mut dyn Platform,
        scheduler: &'a mut Scheduler,
        config: &'a LivedeskConfig,
        calibration: Calibration,
        outbox: &'a mut Vec<Envelope>,
        focus: &'a mut Option<WindowId>,
    ) -> Self {
        Self {
            platform,
            scheduler,
            config,
            calibration,
            outbox,
            focus,
        }
    }

    pub(crate) fn send(&mut self, from: &WindowId, to: &WindowId, message: Message) {
        debug!(from = %from, to = %to, command = message.name(), "queued");
        self.outbox.push(Envelope {
            from: from.clone(),
            to: to.clone(),
            message,
        });
    }

    pub(crate) fn focused(&mut self, id: &WindowId) {
        *self.focus = Some(id.clone());
    }

    pub(crate) fn blurred(&mut self, id: &WindowId) {
        if self.focus.as_ref() == Some(id) {
            *self.focus = None;
        }
    }
}

/// Lifecycle and message contract shared by every kind.
///
/// The desktop enforces phase order; implementations may assume `stabilise`
/// follows `activate` and `cleanup` follows one of them.
pub(crate) trait Window {
    fn id(&self) -> &WindowId;

    /// Allocate resources that do not depend on layout.
    fn activate(&mut self, cx: &mut Context<'_>) -> Result<(), WindowError>;

    /// Allocate layout-dependent resources.
    fn stabilise(&mut self, cx: &mut Context<'_>) -> Result<(), WindowError>;

    /// Release everything, layout resources first, and restore the pane.
    fn cleanup(&mut self, cx: &mut Context<'_>);

    fn on_message(
        &mut self,
        cx: &mut Context<'_>,
        source: &WindowId,
        message: Message,
    ) -> Result<(), WindowError>;

    fn focus(&mut self, cx: &mut Context<'_>);

    fn blur(&mut self, cx: &mut Context<'_>);

    fn on_input(&mut self, _cx: &mut Context<'_>, event: InputEvent) -> Result<(), WindowError> {
        debug!(window = %self.id(), ?event, "input ignored");
        Ok(())
    }

    fn on_runtime_event(
        &mut self,
        _cx: &mut Context<'_>,
        _generation: u64,
        event: RuntimeEvent,
    ) -> Result<(), WindowError> {
        debug!(window = %self.id(), event = event.name(), "runtime event ignored");
        Ok(())
    }
}

/// Static configuration of one declared window.
pub(crate) struct WindowSpec {
    pub id: WindowId,
    pub peer: Option<WindowId>,
    pub language: Arc<dyn LanguageDescriptor>,
    /// Declared inert content of the pane.
    pub content: String,
}

impl WindowSpec {
    pub(crate) fn unknown_command(&self, message: &Message) -> WindowError {
        WindowError::UnknownCommand {
            window: self.id.clone(),
            command: message.name().to_string(),
            data: message.command.data().to_string(),
        }
    }

    pub(crate) fn not_ready(&self, message: &Message) -> WindowError {
        WindowError::NotReady {
            window: self.id.clone(),
            command: message.name().to_string(),
        }
    }
}

pub(crate) enum AnyWindow {
    Editor(EditorWindow),
    Console(ConsoleWindow),
    Frame(FrameWindow),
}

type Constructor = fn(WindowSpec, &LivedeskConfig) -> AnyWindow;

fn new_editor(spec: WindowSpec, config: &LivedeskConfig) -> AnyWindow {
    AnyWindow::Editor(EditorWindow::new(spec, config))
}

fn new_console(spec: WindowSpec, config: &LivedeskConfig) -> AnyWindow {
    AnyWindow::Console(ConsoleWindow::new(spec, config))
}

fn new_frame(spec: WindowSpec, config: &LivedeskConfig) -> AnyWindow {
    AnyWindow::Frame(FrameWindow::new(spec, config))
}

const CONSTRUCTORS: &[(WindowKind, Constructor)] = &[
    (WindowKind::Editor, new_editor),
    (WindowKind::Console, new_console),
    (WindowKind::Frame, new_frame),
];

impl AnyWindow {
    pub(crate) fn construct(
        kind: WindowKind,
        spec: WindowSpec,
        config: &LivedeskConfig,
    ) -> Option<Self> {
        CONSTRUCTORS
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, construct)| construct(spec, config))
    }

    pub(crate) fn kind(&self) -> WindowKind {
        match self {
            AnyWindow::Editor(_) => WindowKind::Editor,
            AnyWindow::Console(_) => WindowKind::Console,
            AnyWindow::Frame(_) => WindowKind::Frame,
        }
    }

    pub(crate) fn spec(&self) -> &WindowSpec {
        match self {
            AnyWindow::Editor(w) => &w.spec,
            AnyWindow::Console(w) => &w.spec,
            AnyWindow::Frame(w) => &w.spec,
        }
    }
}

macro_rules! delegate {
    ($self:ident, $w:ident => $call:expr) => {
        match $self {
            AnyWindow::Editor($w) => $call,
            AnyWindow::Console($w) => $call,
            AnyWindow::Frame($w) => $call,
        }
    };
}

impl Window for AnyWindow {
    fn id(&self) -> &WindowId {
        &self.spec().id
    }

    fn activate(&mut self, cx: &mut Context<'_>) -> Result<(), WindowError> {
        delegate!(self, w => w.activate(cx))
    }

    fn stabilise(&mut self, cx: &mut Context<'_>) -> Result<(), WindowError> {
        delegate!(self, w => w.stabilise(cx))
    }

    fn cleanup(&mut self, cx: &mut Context<'_>) {
        delegate!(self, w => w.cleanup(cx))
    }

    fn on_message(
        &mut self,
        cx: &mut Context<'_>,
        source: &WindowId,
        message: Message,
    ) -> Result<(), WindowError> {
        delegate!(self, w => w.on_message(cx, source, message))
    }

    fn focus(&mut self, cx: &mut Context<'_>) {
        delegate!(self, w => w.focus(cx))
    }

    fn blur(&mut self, cx: &mut Context<'_>) {
        delegate!(self, w => w.blur(cx))
    }

    fn on_input(&mut self, cx: &mut Context<'_>, event: InputEvent) -> Result<(), WindowError> {
        delegate!(self, w => w.on_input(cx, event))
    }

    fn on_runtime_event(
        &mut self,
        cx: &mut Context<'_>,
        generation: u64,
        event: RuntimeEvent,
    ) -> Result<(), WindowError> {
        delegate!(self, w => w.on_runtime_event(cx, generation, event))
    }
}
