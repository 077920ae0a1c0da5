//! Event signals raised by a check run and the handler registry
//!
//! Whether a listener is registered changes engine behavior in two places:
//! an `Install` listener turns auto accept/reject into a suspended external
//! decision, and an `Error` listener turns returned errors into emitted
//! events. Unsubscribing is split into three explicit operations instead of
//! one polymorphic signature.

use crate::domain::{ModuleReport, RunReport};
use crate::gate::InstallRequest;

/// The event channels a run can raise on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// One module found satisfied
    Current,
    /// One module needs a decision
    Install,
    /// One module finished installing successfully
    Complete,
    /// A fatal condition for the run
    Error,
    /// Terminal success
    Ready,
}

/// Payload-carrying event delivered to handlers
#[derive(Debug)]
pub enum Event {
    /// Module projection of a satisfied module
    Current(ModuleReport),
    /// Projection plus decision capability for a needs-action module
    Install(InstallRequest),
    /// Module projection with install duration
    Complete(ModuleReport),
    /// Fatal condition message
    Error(String),
    /// Ordered list of all processed module projections
    Ready(RunReport),
}

impl Event {
    /// The channel this event is delivered on
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Current(_) => EventKind::Current,
            Event::Install(_) => EventKind::Install,
            Event::Complete(_) => EventKind::Complete,
            Event::Error(_) => EventKind::Error,
            Event::Ready(_) => EventKind::Ready,
        }
    }
}

/// Opaque handle identifying one subscribed handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerToken(u64);

type Handler = Box<dyn FnMut(&Event) + Send>;

/// Registry of event handlers, invoked in subscription order
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<(EventKind, HandlerToken, Handler)>,
    next_token: u64,
}

impl EventBus {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a handler to one event channel
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&Event) + Send + 'static,
    ) -> HandlerToken {
        let token = HandlerToken(self.next_token);
        self.next_token += 1;
        self.handlers.push((kind, token, Box::new(handler)));
        token
    }

    /// Removes every handler from every channel
    pub fn unsubscribe_all(&mut self) {
        self.handlers.clear();
    }

    /// Removes every handler subscribed to one channel
    pub fn unsubscribe_event(&mut self, kind: EventKind) {
        self.handlers.retain(|(k, _, _)| *k != kind);
    }

    /// Removes one handler by its token; returns true if it was present
    pub fn unsubscribe_handler(&mut self, kind: EventKind, token: HandlerToken) -> bool {
        let before = self.handlers.len();
        self.handlers
            .retain(|(k, t, _)| *k != kind || *t != token);
        self.handlers.len() != before
    }

    /// Returns true if any handler is subscribed to the channel
    pub fn has_listeners(&self, kind: EventKind) -> bool {
        self.handlers.iter().any(|(k, _, _)| *k == kind)
    }

    /// Delivers one event to every handler on its channel
    pub(crate) fn emit(&mut self, event: &Event) {
        let kind = event.kind();
        for (k, _, handler) in self.handlers.iter_mut() {
            if *k == kind {
                handler(event);
            }
        }
    }
}
