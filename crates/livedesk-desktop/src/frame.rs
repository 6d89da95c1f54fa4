//! Frame window: hosts a sandboxed context and primes it once per lifetime.

use livedesk_common::{Command, Message, WindowError, WindowId};
use livedesk_config::LivedeskConfig;
use tracing::debug;

use crate::platform::FrameContext;
use crate::window::{Context, Window, WindowSpec};

pub(crate) struct FrameWindow {
    pub(crate) spec: WindowSpec,
    target_origin: String,
    context: Option<Box<dyn FrameContext>>,
    prelude_ready: bool,
}

impl FrameWindow {
    pub(crate) fn new(spec: WindowSpec, config: &LivedeskConfig) -> Self {
        Self {
            spec,
            target_origin: config.frame.target_origin.clone(),
            context: None,
            prelude_ready: false,
        }
    }

    fn post(&mut self, message: &Message) -> Result<(), WindowError> {
        let Some(context) = self.context.as_mut() else {
            return Err(self.spec.not_ready(message));
        };
        debug!(window = %self.spec.id, command = message.name(), "posting into frame");
        context.post_message(&message.to_json(), &self.target_origin)?;
        Ok(())
    }
}

impl Window for FrameWindow {
    fn id(&self) -> &WindowId {
        &self.spec.id
    }

    fn activate(&mut self, _cx: &mut Context<'_>) -> Result<(), WindowError> {
        Ok(())
    }

    fn stabilise(&mut self, cx: &mut Context<'_>) -> Result<(), WindowError> {
        let context = cx
            .platform
            .create_frame(&self.spec.id, self.spec.language.as_ref())?;
        self.context = Some(context);
        self.prelude_ready = false;
        Ok(())
    }

    fn cleanup(&mut self, cx: &mut Context<'_>) {
        if let Some(mut context) = self.context.take() {
            context.detach();
        }
        self.prelude_ready = false;
        cx.blurred(&self.spec.id);
        cx.platform.restore_pane(&self.spec.id, &self.spec.content);
    }

    fn on_message(
        &mut self,
        _cx: &mut Context<'_>,
        _source: &WindowId,
        message: Message,
    ) -> Result<(), WindowError> {
        match message.command {
            Command::Focus | Command::Blur => self.post(&message),
            Command::Load(_) => {
                if self.context.is_none() {
                    return Err(self.spec.not_ready(&message));
                }
                if !self.prelude_ready {
                    let prelude = Message::prelude(self.spec.language.prelude());
                    self.post(&prelude)?;
                    self.prelude_ready = true;
                }
                self.post(&message)
            }
            _ => Err(self.spec.unknown_command(&message)),
        }
    }

    fn focus(&mut self, cx: &mut Context<'_>) {
        if self.post(&Message::focus()).is_ok() {
            cx.focused(&self.spec.id);
        }
    }

    fn blur(&mut self, cx: &mut Context<'_>) {
        if let Err(err) = self.post(&Message::blur()) {
            debug!(window = %self.spec.id, %err, "blur not delivered");
        }
        cx.blurred(&self.spec.id);
    }
}
