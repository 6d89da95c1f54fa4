//! The desktop controller: window registry, lifecycle and routing.
//!
//! The registry is built once in [`Desktop::construct`] and never changes
//! shape afterwards. Windows talk to each other only through messages the
//! desktop delivers; deliveries queue up and are drained in FIFO order, so a
//! handler never runs inside another handler.

use std::collections::VecDeque;
use std::fmt;

use indexmap::IndexMap;
use livedesk_common::{DesktopError, Message, Phase, WindowError, WindowId, WindowKind};
use livedesk_config::keybinds::KeyScope;
use livedesk_config::{DeckConfig, LivedeskConfig};
use livedesk_platform::{Binding, KeyCombo, KeybindRegistry};
use livedesk_runtime::LanguageRegistry;
use tracing::{debug, error, info, warn};

use crate::metrics::Calibration;
use crate::platform::Platform;
use crate::scheduler::{Posted, Scheduler};
use crate::window::{AnyWindow, Context, Envelope, InputEvent, Window, WindowSpec};

/// A wiring problem reported instead of raised.
#[derive(Debug)]
pub enum Diagnostic {
    /// A message addressed to an id the registry does not hold.
    UnresolvedRoute {
        from: WindowId,
        to: WindowId,
        command: String,
    },
    /// A window rejected a message or an input.
    Window(WindowError),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnresolvedRoute { from, to, command } => write!(
                f,
                "cannot route `{command}` from `{from}` to unknown window `{to}`"
            ),
            Diagnostic::Window(err) => write!(f, "{err}"),
        }
    }
}

struct Slot {
    phase: Phase,
    window: AnyWindow,
}

pub struct Desktop {
    windows: IndexMap<WindowId, Slot>,
    platform: Box<dyn Platform>,
    scheduler: Scheduler,
    config: LivedeskConfig,
    calibration: Calibration,
    global_keys: KeybindRegistry,
    /// Installed between `stabilise` and `cleanup`.
    shortcut: Option<KeyCombo>,
    focused: Option<WindowId>,
    queue: VecDeque<Envelope>,
    outbox: Vec<Envelope>,
    diagnostics: Vec<Diagnostic>,
}

impl Desktop {
    /// Build one window per declaration.
    ///
    /// Unknown kinds or languages, duplicate ids, and targets that name no
    /// declared window are configuration errors and fail the whole desktop.
    pub fn construct(
        deck: &DeckConfig,
        languages: &LanguageRegistry,
        config: LivedeskConfig,
        platform: Box<dyn Platform>,
    ) -> Result<Self, DesktopError> {
        if deck.windows.is_empty() {
            return Err(DesktopError::Empty);
        }

        let mut windows = IndexMap::with_capacity(deck.windows.len());
        for decl in &deck.windows {
            let unknown_kind = || DesktopError::UnknownKind {
                id: decl.id.clone(),
                kind: decl.kind.clone(),
            };
            let kind = WindowKind::from_tag(&decl.kind).ok_or_else(unknown_kind)?;
            let language = languages
                .get(&decl.lang)
                .ok_or_else(|| DesktopError::UnknownLanguage {
                    id: decl.id.clone(),
                    lang: decl.lang.clone(),
                })?;
            if windows.contains_key(&decl.id) {
                return Err(DesktopError::DuplicateId(decl.id.clone()));
            }

            let spec = WindowSpec {
                id: decl.id.clone(),
                peer: decl.target.clone(),
                language,
                content: decl.content.clone(),
            };
            let window = AnyWindow::construct(kind, spec, &config).ok_or_else(unknown_kind)?;
            debug!(window = %decl.id, %kind, lang = %decl.lang, "constructed");
            windows.insert(
                decl.id.clone(),
                Slot {
                    phase: Phase::Constructed,
                    window,
                },
            );
        }

        for (id, slot) in &windows {
            if let Some(peer) = &slot.window.spec().peer {
                if !windows.contains_key(peer) {
                    return Err(DesktopError::UnresolvedPeer {
                        id: id.clone(),
                        peer: peer.clone(),
                    });
                }
            }
        }

        let global_keys = KeybindRegistry::from_config(&config.keybinds, KeyScope::Desktop);
        let calibration = platform.calibration();
        info!(windows = windows.len(), ?calibration, "desktop constructed");

        Ok(Self {
            windows,
            platform,
            scheduler: Scheduler::new(),
            config,
            calibration,
            global_keys,
            shortcut: None,
            focused: None,
            queue: VecDeque::new(),
            outbox: Vec::new(),
            diagnostics: Vec::new(),
        })
    }

    /// Activate every window in declaration order.
    ///
    /// If one window fails, the windows already activated are cleaned up
    /// again so the desktop can be activated afresh.
    pub fn activate(&mut self) -> Result<(), DesktopError> {
        self.check_phases("activate", Phase::can_activate)?;
        let ids = self.window_ids();
        for (n, id) in ids.iter().enumerate() {
            let result = self.call(id, |w, cx| w.activate(cx));
            if let Some(Err(err)) = result {
                error!(window = %id, %err, "activation failed");
                for done in &ids[..n] {
                    self.call(done, |w, cx| w.cleanup(cx));
                    self.set_phase(done, Phase::Destroyed);
                }
                return Err(err.into());
            }
            self.set_phase(id, Phase::Active);
        }
        self.deliver_all();
        Ok(())
    }

    /// Stabilise every window, then install the global shortcut.
    pub fn stabilise(&mut self) -> Result<(), DesktopError> {
        self.check_phases("stabilise", Phase::can_stabilise)?;
        for id in self.window_ids() {
            if let Some(Err(err)) = self.call(&id, |w, cx| w.stabilise(cx)) {
                error!(window = %id, %err, "stabilise failed");
                return Err(err.into());
            }
            self.set_phase(&id, Phase::Stable);
        }
        self.shortcut = self.global_keys.combo_for(Binding::FocusFirst).cloned();
        if let Some(combo) = &self.shortcut {
            debug!(%combo, "global shortcut installed");
        }
        self.deliver_all();
        Ok(())
    }

    /// Remove the shortcut and release every window.
    pub fn cleanup(&mut self) -> Result<(), DesktopError> {
        self.check_phases("cleanup", Phase::can_cleanup)?;
        if let Some(combo) = self.shortcut.take() {
            debug!(%combo, "global shortcut removed");
        }
        for id in self.window_ids() {
            self.call(&id, |w, cx| w.cleanup(cx));
            self.set_phase(&id, Phase::Destroyed);
        }
        // Nothing sent during cleanup has a live receiver left.
        let dropped = self.outbox.len() + self.queue.len();
        self.outbox.clear();
        self.queue.clear();
        if dropped > 0 {
            debug!(dropped, "undelivered messages discarded at cleanup");
        }
        self.focused = None;
        info!("desktop cleaned up");
        Ok(())
    }

    /// Deliver `message` from `from` to `to`, then everything it triggers.
    ///
    /// An unknown `to` is reported and returned. Failures further down the
    /// chain are recorded as diagnostics and do not stop delivery.
    pub fn send(
        &mut self,
        from: &WindowId,
        to: &WindowId,
        message: Message,
    ) -> Result<(), DesktopError> {
        let envelope = Envelope {
            from: from.clone(),
            to: to.clone(),
            message,
        };
        if !self.windows.contains_key(to) {
            return Err(self.unresolved(&envelope));
        }
        self.queue.push_back(envelope);
        self.deliver_all();
        Ok(())
    }

    /// Hand host input to one window.
    pub fn input(&mut self, id: &WindowId, event: InputEvent) -> Result<(), DesktopError> {
        let result = self
            .call(id, |w, cx| w.on_input(cx, event))
            .ok_or_else(|| DesktopError::UnknownWindow(id.clone()))?;
        if let Err(err) = result {
            self.report(err);
        }
        self.deliver_all();
        Ok(())
    }

    pub fn focus(&mut self, id: &WindowId) -> Result<(), DesktopError> {
        self.call(id, |w, cx| w.focus(cx))
            .ok_or_else(|| DesktopError::UnknownWindow(id.clone()))?;
        self.deliver_all();
        Ok(())
    }

    pub fn blur(&mut self, id: &WindowId) -> Result<(), DesktopError> {
        self.call(id, |w, cx| w.blur(cx))
            .ok_or_else(|| DesktopError::UnknownWindow(id.clone()))?;
        self.deliver_all();
        Ok(())
    }

    /// Offer a key press to the global shortcut. Returns true if consumed.
    pub fn key_down(&mut self, combo: &KeyCombo) -> bool {
        if self.shortcut.as_ref() != Some(combo) {
            return false;
        }
        let Some(first) = self.windows.keys().next().cloned() else {
            return false;
        };
        debug!(%combo, window = %first, "global shortcut");
        self.call(&first, |w, cx| w.focus(cx));
        self.deliver_all();
        true
    }

    /// Handle every runtime event already posted. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Some(posted) = self.scheduler.try_next() {
            self.handle_posted(posted);
            handled += 1;
        }
        handled
    }

    /// Wait for one runtime event and handle it. Pending until some runtime
    /// posts, so callers race it against their other inputs.
    pub async fn next_turn(&mut self) {
        let posted = self.scheduler.next().await;
        self.handle_posted(posted);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn focused(&self) -> Option<&WindowId> {
        self.focused.as_ref()
    }

    /// Ids in declaration order.
    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.keys().cloned().collect()
    }

    pub fn kind(&self, id: &WindowId) -> Option<WindowKind> {
        self.windows.get(id).map(|slot| slot.window.kind())
    }

    pub fn peer(&self, id: &WindowId) -> Option<&WindowId> {
        self.windows.get(id)?.window.spec().peer.as_ref()
    }

    pub fn phase(&self, id: &WindowId) -> Option<Phase> {
        self.windows.get(id).map(|slot| slot.phase)
    }

    /// The installed global shortcut, if the desktop is stable.
    pub fn shortcut(&self) -> Option<&KeyCombo> {
        self.shortcut.as_ref()
    }

    /// Run `f` against window `id` with a dispatch context.
    fn call<R>(
        &mut self,
        id: &WindowId,
        f: impl FnOnce(&mut AnyWindow, &mut Context<'_>) -> R,
    ) -> Option<R> {
        let Self {
            windows,
            platform,
            scheduler,
            config,
            calibration,
            outbox,
            focused,
            ..
        } = self;
        let slot = windows.get_mut(id)?;
        let mut cx = Context::new(
            platform.as_mut(),
            scheduler,
            config,
            *calibration,
            outbox,
            focused,
        );
        Some(f(&mut slot.window, &mut cx))
    }

    fn set_phase(&mut self, id: &WindowId, phase: Phase) {
        if let Some(slot) = self.windows.get_mut(id) {
            slot.phase = phase;
        }
    }

    fn check_phases(
        &self,
        operation: &'static str,
        allowed: fn(Phase) -> bool,
    ) -> Result<(), DesktopError> {
        match self.windows.iter().find(|(_, slot)| !allowed(slot.phase)) {
            Some((id, slot)) => Err(DesktopError::Lifecycle {
                window: id.clone(),
                operation,
                phase: slot.phase,
            }),
            None => Ok(()),
        }
    }

    fn deliver_all(&mut self) {
        self.queue.extend(self.outbox.drain(..));
        while let Some(envelope) = self.queue.pop_front() {
            self.deliver(envelope);
            self.queue.extend(self.outbox.drain(..));
        }
    }

    fn deliver(&mut self, envelope: Envelope) {
        if !self.windows.contains_key(&envelope.to) {
            self.unresolved(&envelope);
            return;
        }
        let Envelope { from, to, message } = envelope;
        debug!(from = %from, to = %to, command = message.name(), "deliver");
        if let Some(Err(err)) = self.call(&to, |w, cx| w.on_message(cx, &from, message)) {
            self.report(err);
        }
    }

    fn handle_posted(&mut self, posted: Posted) {
        let Posted {
            window,
            generation,
            event,
        } = posted;
        let result = self.call(&window, |w, cx| w.on_runtime_event(cx, generation, event));
        match result {
            Some(Err(err)) => self.report(err),
            Some(Ok(())) => {}
            None => warn!(window = %window, "runtime event for unknown window"),
        }
        self.deliver_all();
    }

    fn unresolved(&mut self, envelope: &Envelope) -> DesktopError {
        error!(
            from = %envelope.from,
            to = %envelope.to,
            command = envelope.message.name(),
            "unresolved route"
        );
        self.diagnostics.push(Diagnostic::UnresolvedRoute {
            from: envelope.from.clone(),
            to: envelope.to.clone(),
            command: envelope.message.name().to_string(),
        });
        DesktopError::UnresolvedRoute {
            from: envelope.from.clone(),
            to: envelope.to.clone(),
            command: envelope.message.name().to_string(),
        }
    }

    fn report(&mut self, err: WindowError) {
        warn!(%err, "window diagnostic");
        self.diagnostics.push(Diagnostic::Window(err));
    }
}
