//! Console window: a terminal surface driving one language runtime.
//!
//! The runtime reports through the desktop's scheduler, so every event is
//! handled on a later turn than the request that caused it. Events carry the
//! generation of the runtime that emitted them; anything from a runtime this
//! console has since released is dropped.

mod style;

use livedesk_common::{new_correlation_id, Command, CompileError, Message, WindowError, WindowId};
use livedesk_config::keybinds::KeyScope;
use livedesk_config::schema::Isolation;
use livedesk_config::LivedeskConfig;
use livedesk_platform::{Binding, KeybindRegistry};
use livedesk_runtime::{RuntimeEvent, RuntimeHandle};
use tracing::{debug, warn};

use crate::format::format_error;
use crate::metrics::{GridSize, Metrics};
use crate::platform::{TerminalOptions, TerminalSurface};
use crate::window::{Context, InputEvent, Window, WindowSpec};

use self::style::Style;

pub(crate) struct ConsoleWindow {
    pub(crate) spec: WindowSpec,
    keys: KeybindRegistry,
    isolation: Isolation,
    sentinel: char,
    prompt: String,
    loaded_message: String,
    cursor_blink: bool,
    fallback: GridSize,

    runtime: Option<Box<dyn RuntimeHandle>>,
    generation: Option<u64>,
    terminal: Option<Box<dyn TerminalSurface>>,
    metrics: Option<Metrics>,
    grid: GridSize,
    /// Output produced before the terminal exists.
    backlog: Vec<String>,
    /// Token of the outstanding `save` request, if any.
    pending_save: Option<String>,
}

impl ConsoleWindow {
    pub(crate) fn new(spec: WindowSpec, config: &LivedeskConfig) -> Self {
        let console = &config.console;
        let fallback = GridSize {
            cols: console.fallback_cols,
            rows: console.fallback_rows,
        };
        Self {
            spec,
            keys: KeybindRegistry::from_config(&config.keybinds, KeyScope::Console),
            isolation: config.runtime.isolation,
            sentinel: console.expand_sentinel,
            prompt: console.prompt.clone(),
            loaded_message: console.loaded_message.clone(),
            cursor_blink: console.cursor_blink,
            fallback,
            runtime: None,
            generation: None,
            terminal: None,
            metrics: None,
            grid: fallback,
            backlog: Vec::new(),
            pending_save: None,
        }
    }

    /// Split off the expand sentinel. The rest of the line is passed on as typed.
    fn parse_line<'l>(&self, line: &'l str) -> (&'l str, bool) {
        match line.strip_prefix(self.sentinel) {
            Some(rest) => (rest, true),
            None => (line, false),
        }
    }

    fn submit(&mut self, line: &str) -> Result<(), WindowError> {
        let (line, expand) = self.parse_line(line);
        let Some(runtime) = self.runtime.as_mut() else {
            return Err(WindowError::NotReady {
                window: self.spec.id.clone(),
                command: "eval".into(),
            });
        };
        debug!(window = %self.spec.id, expand, "eval");
        runtime.eval(line, expand)?;
        Ok(())
    }

    /// Ask the peer for its buffer. The answer arrives later as a `load`.
    fn request_buffer(&mut self, cx: &mut Context<'_>) {
        let Some(peer) = self.spec.peer.clone() else {
            warn!(window = %self.spec.id, "load-buffer with no target");
            return;
        };
        let token = new_correlation_id();
        self.pending_save = Some(token.clone());
        cx.send(&self.spec.id, &peer, Message::save().with_token(token));
    }

    /// Accept a `load` unless it answers a request other than the outstanding one.
    fn accept_load(&mut self, token: Option<&str>) -> bool {
        let Some(token) = token else {
            return true;
        };
        if self.pending_save.as_deref() == Some(token) {
            self.pending_save = None;
            return true;
        }
        warn!(
            window = %self.spec.id,
            token,
            pending = ?self.pending_save,
            "ignoring load that answers no outstanding save"
        );
        false
    }

    fn run_binding(&mut self, cx: &mut Context<'_>, binding: Binding) {
        match binding {
            Binding::LoadBuffer => self.request_buffer(cx),
            Binding::Blur => self.blur(cx),
            other => debug!(window = %self.spec.id, ?other, "binding not handled by console"),
        }
    }

    fn fit_grid(&self, cx: &Context<'_>) -> GridSize {
        let cell = self.metrics.as_ref().and_then(Metrics::character_size);
        match (cx.platform.pane_size(&self.spec.id), cell) {
            (Some(pane), Some(cell)) => GridSize::fit(pane, cell),
            _ => self.fallback,
        }
    }

    fn resize(&mut self, cx: &mut Context<'_>) {
        let changed = self.metrics.as_mut().is_some_and(Metrics::refresh);
        if !changed {
            return;
        }
        let grid = self.fit_grid(cx);
        if grid == self.grid {
            return;
        }
        self.grid = grid;
        if let Some(terminal) = self.terminal.as_mut() {
            debug!(window = %self.spec.id, cols = grid.cols, rows = grid.rows, "resize");
            terminal.resize(grid);
        }
    }

    fn show(&mut self, style: Style, text: &str) {
        // `"".lines()` is empty, but an empty print is still one line.
        let lines = if text.is_empty() {
            vec![""]
        } else {
            text.lines().collect()
        };
        for line in lines {
            let painted = style.paint(line);
            match self.terminal.as_mut() {
                Some(terminal) => terminal.writeln(&painted),
                None => self.backlog.push(painted),
            }
        }
    }

    fn show_compile_errors(&mut self, errors: &[CompileError]) {
        let width = self.grid.cols as usize;
        for error in errors {
            let text = format_error(error, width);
            self.show(Style::Error, &text);
        }
    }
}

impl Window for ConsoleWindow {
    fn id(&self) -> &WindowId {
        &self.spec.id
    }

    fn activate(&mut self, cx: &mut Context<'_>) -> Result<(), WindowError> {
        let (generation, sink) = cx.scheduler.sink(&self.spec.id);
        let runtime = self.spec.language.context(self.isolation, sink)?;
        debug!(window = %self.spec.id, generation, lang = self.spec.language.name(), "runtime started");
        self.runtime = Some(runtime);
        self.generation = Some(generation);
        Ok(())
    }

    fn stabilise(&mut self, cx: &mut Context<'_>) -> Result<(), WindowError> {
        let probe = cx.platform.create_metrics(&self.spec.id);
        self.metrics = Some(Metrics::new(probe, cx.calibration));
        self.grid = self.fit_grid(cx);

        let options = TerminalOptions {
            grid: self.grid,
            prompt: style::prompt(&self.prompt),
            cursor_blink: self.cursor_blink,
        };
        let mut terminal = cx.platform.create_terminal(&self.spec.id, &options);
        for line in self.backlog.drain(..) {
            terminal.writeln(&line);
        }
        self.terminal = Some(terminal);
        Ok(())
    }

    fn cleanup(&mut self, cx: &mut Context<'_>) {
        if let Some(mut terminal) = self.terminal.take() {
            terminal.cleanup();
        }
        if let Some(metrics) = self.metrics.take() {
            metrics.destroy(&self.spec.id);
        }
        if let Some(mut runtime) = self.runtime.take() {
            runtime.cleanup();
        }
        self.generation = None;
        self.pending_save = None;
        self.backlog.clear();
        self.grid = self.fallback;
        cx.blurred(&self.spec.id);
        cx.platform.restore_pane(&self.spec.id, &self.spec.content);
    }

    fn on_message(
        &mut self,
        cx: &mut Context<'_>,
        _source: &WindowId,
        message: Message,
    ) -> Result<(), WindowError> {
        if self.runtime.is_none() {
            return Err(self.spec.not_ready(&message));
        }
        match &message.command {
            Command::Focus => self.focus(cx),
            Command::Blur => self.blur(cx),
            Command::Load(source) => {
                if self.accept_load(message.token.as_deref()) {
                    if let Some(runtime) = self.runtime.as_mut() {
                        runtime.load(source)?;
                    }
                }
            }
            Command::Eval(line) => self.submit(line)?,
            _ => return Err(self.spec.unknown_command(&message)),
        }
        Ok(())
    }

    fn focus(&mut self, cx: &mut Context<'_>) {
        if let Some(terminal) = self.terminal.as_mut() {
            terminal.focus();
            cx.focused(&self.spec.id);
        }
    }

    fn blur(&mut self, cx: &mut Context<'_>) {
        if let Some(terminal) = self.terminal.as_mut() {
            terminal.blur();
        }
        cx.blurred(&self.spec.id);
    }

    fn on_input(&mut self, cx: &mut Context<'_>, event: InputEvent) -> Result<(), WindowError> {
        match event {
            InputEvent::Command(line) => self.submit(&line)?,
            InputEvent::LoadBuffer => self.request_buffer(cx),
            InputEvent::FocusOut => {
                self.blur(cx);
                if let Some(peer) = self.spec.peer.clone() {
                    cx.send(&self.spec.id, &peer, Message::focus());
                }
            }
            InputEvent::Escape => self.blur(cx),
            InputEvent::Binding(binding) => self.run_binding(cx, binding),
            InputEvent::Key(combo) => match self.keys.lookup(&combo) {
                Some(binding) => self.run_binding(cx, binding),
                None => debug!(window = %self.spec.id, %combo, "unbound key"),
            },
            InputEvent::CharacterSizeChanged => self.resize(cx),
        }
        Ok(())
    }

    fn on_runtime_event(
        &mut self,
        cx: &mut Context<'_>,
        generation: u64,
        event: RuntimeEvent,
    ) -> Result<(), WindowError> {
        if self.generation != Some(generation) {
            warn!(
                window = %self.spec.id,
                generation,
                event = event.name(),
                "event from a released runtime dropped"
            );
            return Ok(());
        }
        match event {
            RuntimeEvent::CompileError(errors) => {
                if let Some(peer) = self.spec.peer.clone() {
                    cx.send(&self.spec.id, &peer, Message::errors(errors.clone()));
                }
                self.show_compile_errors(&errors);
            }
            RuntimeEvent::Error(message) => self.show(Style::Error, &message),
            RuntimeEvent::Result(Some(value)) => self.show(Style::Value, &value),
            RuntimeEvent::Result(None) => {}
            RuntimeEvent::Log(text) => self.show(Style::Log, &text),
            RuntimeEvent::Loaded => {
                let message = self.loaded_message.clone();
                self.show(Style::Success, &message);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livedesk_runtime::LanguageRegistry;

    fn console() -> ConsoleWindow {
        let language = LanguageRegistry::with_builtins().get("calc").unwrap();
        let spec = WindowSpec {
            id: WindowId::from("repl"),
            peer: Some(WindowId::from("editor")),
            language,
            content: String::new(),
        };
        ConsoleWindow::new(spec, &LivedeskConfig::default())
    }

    #[test]
    fn sentinel_selects_expand_mode() {
        let c = console();
        assert_eq!(c.parse_line("&1+1"), ("1+1", true));
        assert_eq!(c.parse_line("1+1"), ("1+1", false));
        assert_eq!(c.parse_line("&"), ("", true));
        assert_eq!(c.parse_line(" &1"), (" &1", false));
    }

    #[test]
    fn untokened_load_is_always_accepted() {
        let mut c = console();
        assert!(c.accept_load(None));
        c.pending_save = Some("abcd".into());
        assert!(c.accept_load(None));
        assert_eq!(c.pending_save.as_deref(), Some("abcd"));
    }

    #[test]
    fn matching_token_clears_the_request() {
        let mut c = console();
        c.pending_save = Some("abcd".into());
        assert!(!c.accept_load(Some("ffff")));
        assert!(c.accept_load(Some("abcd")));
        assert!(c.pending_save.is_none());
        assert!(!c.accept_load(Some("abcd")));
    }

    #[test]
    fn output_before_terminal_is_kept() {
        let mut c = console();
        c.show(Style::Log, "one\ntwo");
        assert_eq!(c.backlog.len(), 2);
        assert!(c.backlog[1].contains("two"));
    }

    #[test]
    fn empty_output_is_one_blank_line() {
        let mut c = console();
        c.show(Style::Log, "");
        assert_eq!(c.backlog, vec![Style::Log.paint("")]);
    }
}
