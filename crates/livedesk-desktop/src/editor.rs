//! Editor window: a code buffer that pushes to its peer console.

use livedesk_common::{Command, CompileError, Message, WindowError, WindowId};
use livedesk_config::keybinds::KeyScope;
use livedesk_config::LivedeskConfig;
use livedesk_platform::{Binding, KeybindRegistry};
use tracing::{debug, warn};

use crate::format::resolve;
use crate::platform::{Annotation, EditorWidget};
use crate::window::{Context, InputEvent, Window, WindowSpec};

pub(crate) struct EditorWindow {
    pub(crate) spec: WindowSpec,
    keys: KeybindRegistry,
    widget: Option<Box<dyn EditorWidget>>,
}

impl EditorWindow {
    pub(crate) fn new(spec: WindowSpec, config: &LivedeskConfig) -> Self {
        Self {
            spec,
            keys: KeybindRegistry::from_config(&config.keybinds, KeyScope::Editor),
            widget: None,
        }
    }

    /// Push the whole buffer to the peer as a `load`.
    fn send_to_peer(&mut self, cx: &mut Context<'_>) {
        let (Some(widget), Some(peer)) = (&self.widget, &self.spec.peer) else {
            warn!(window = %self.spec.id, "send-to-repl with no live editor or no target");
            return;
        };
        cx.send(&self.spec.id, peer, Message::load(widget.value()));
    }

    fn focus_target(&mut self, cx: &mut Context<'_>) {
        self.blur(cx);
        if let Some(peer) = &self.spec.peer {
            cx.send(&self.spec.id, peer, Message::focus());
        }
    }

    fn run_binding(&mut self, cx: &mut Context<'_>, binding: Binding) {
        match binding {
            Binding::SendToRepl => self.send_to_peer(cx),
            Binding::FocusTarget => self.focus_target(cx),
            Binding::Blur => self.blur(cx),
            other => debug!(window = %self.spec.id, ?other, "binding not handled by editor"),
        }
    }
}

/// Place located errors on the buffer. Unlocated errors cannot be placed.
fn annotations(errors: &[CompileError]) -> Vec<Annotation> {
    errors
        .iter()
        .filter_map(|err| {
            let at = resolve(err.location.as_ref()?);
            Some(Annotation {
                row: at.row.saturating_sub(1),
                column: at.column,
                text: err.message.clone(),
            })
        })
        .collect()
}

impl Window for EditorWindow {
    fn id(&self) -> &WindowId {
        &self.spec.id
    }

    fn activate(&mut self, cx: &mut Context<'_>) -> Result<(), WindowError> {
        let mut widget = cx.platform.create_editor(&self.spec.id, &self.spec.content);
        widget.set_mode(self.spec.language.syntax_tag());
        widget.configure(&cx.config.editor);
        for binding in [Binding::SendToRepl, Binding::FocusTarget, Binding::Blur] {
            if let Some(combo) = self.keys.combo_for(binding) {
                widget.bind(combo, binding);
            }
        }
        self.widget = Some(widget);
        Ok(())
    }

    fn stabilise(&mut self, _cx: &mut Context<'_>) -> Result<(), WindowError> {
        Ok(())
    }

    fn cleanup(&mut self, cx: &mut Context<'_>) {
        if let Some(mut widget) = self.widget.take() {
            widget.destroy();
        }
        cx.blurred(&self.spec.id);
        cx.platform.restore_pane(&self.spec.id, &self.spec.content);
    }

    fn on_message(
        &mut self,
        cx: &mut Context<'_>,
        source: &WindowId,
        message: Message,
    ) -> Result<(), WindowError> {
        if self.widget.is_none() {
            return Err(self.spec.not_ready(&message));
        }
        match &message.command {
            Command::Focus => self.focus(cx),
            Command::Blur => self.blur(cx),
            Command::Save => {
                let buffer = self.widget.as_ref().map(|w| w.value()).unwrap_or_default();
                let mut reply = Message::load(buffer);
                reply.token = message.token.clone();
                cx.send(&self.spec.id, source, reply);
            }
            Command::Errors(errors) => {
                if let Some(widget) = self.widget.as_mut() {
                    widget.set_annotations(annotations(errors));
                }
            }
            _ => return Err(self.spec.unknown_command(&message)),
        }
        Ok(())
    }

    fn focus(&mut self, cx: &mut Context<'_>) {
        if let Some(widget) = self.widget.as_mut() {
            widget.focus();
            cx.focused(&self.spec.id);
        }
    }

    fn blur(&mut self, cx: &mut Context<'_>) {
        if let Some(widget) = self.widget.as_mut() {
            widget.blur();
        }
        cx.blurred(&self.spec.id);
    }

    fn on_input(&mut self, cx: &mut Context<'_>, event: InputEvent) -> Result<(), WindowError> {
        match event {
            InputEvent::Binding(binding) => self.run_binding(cx, binding),
            InputEvent::Key(combo) => match self.keys.lookup(&combo) {
                Some(binding) => self.run_binding(cx, binding),
                None => debug!(window = %self.spec.id, %combo, "unbound key"),
            },
            other => debug!(window = %self.spec.id, ?other, "input ignored by editor"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotations_skip_unlocated_errors() {
        let errors = vec![
            CompileError::bare("no position"),
            CompileError::at_offset("bad", "a\nb ?", 4),
            CompileError::at_line("also bad", "x\ny\nz", 3, 0),
        ];
        assert_eq!(
            annotations(&errors),
            vec![
                Annotation {
                    row: 1,
                    column: 2,
                    text: "bad".into()
                },
                Annotation {
                    row: 2,
                    column: 0,
                    text: "also bad".into()
                },
            ]
        );
    }
}
