//! Decision gate: the request/accept/reject protocol gating every install
//!
//! For each needs-action module the engine hands out an [`InstallRequest`]: a
//! read-only projection of the module plus a single-use [`Responder`]
//! capability. Resolving the responder routes the decision back to the engine
//! on a later scheduling turn, so a listener resolving synchronously from
//! inside an event handler never re-enters engine state mid-mutation.

use crate::domain::{ModuleAction, ModuleCheck};
use crate::error::GateError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// The two-variant decision token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Proceed with the install on the next scheduling turn
    Accept,
    /// Mark the module skipped
    Reject,
}

/// A decision routed back to the engine
#[derive(Debug, Clone, Copy)]
pub(crate) struct Reply {
    pub module: usize,
    pub decision: Decision,
}

struct ResponderInner {
    module: usize,
    name: String,
    decided: AtomicBool,
    reply: mpsc::UnboundedSender<Reply>,
}

/// Single-use capability resolving one pending decision
///
/// Cloning shares the same capability: whichever clone resolves first wins
/// and every later resolve returns [`GateError::AlreadyDecided`]. Dropping
/// all clones without resolving stalls that module's run permanently; making
/// a decision is the listener's responsibility.
#[derive(Clone)]
pub struct Responder {
    inner: Arc<ResponderInner>,
}

impl Responder {
    pub(crate) fn new(
        module: usize,
        name: impl Into<String>,
        reply: mpsc::UnboundedSender<Reply>,
    ) -> Self {
        Self {
            inner: Arc::new(ResponderInner {
                module,
                name: name.into(),
                decided: AtomicBool::new(false),
                reply,
            }),
        }
    }

    /// Resolves the pending decision
    pub fn resolve(&self, decision: Decision) -> Result<(), GateError> {
        if self.inner.decided.swap(true, Ordering::SeqCst) {
            return Err(GateError::already_decided(&self.inner.name));
        }

        self.inner
            .reply
            .send(Reply {
                module: self.inner.module,
                decision,
            })
            .map_err(|_| GateError::run_ended(&self.inner.name))
    }

    /// Returns true once the capability has been used
    pub fn is_decided(&self) -> bool {
        self.inner.decided.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("module", &self.inner.module)
            .field("name", &self.inner.name)
            .field("decided", &self.is_decided())
            .finish()
    }
}

/// Read-only projection of a module awaiting a decision
#[derive(Debug)]
pub struct InstallRequest {
    /// Package identifier
    pub name: String,
    /// Declared version constraint
    pub range: String,
    /// Manifest section the declaration came from
    pub scope: String,
    /// Currently installed version, if any
    pub installed_version: Option<String>,
    /// Whether this is a fresh install or an upgrade
    pub action: ModuleAction,
    responder: Responder,
}

impl InstallRequest {
    pub(crate) fn new(module: &ModuleCheck, action: ModuleAction, responder: Responder) -> Self {
        Self {
            name: module.name.clone(),
            range: module.range.clone(),
            scope: module.scope.clone(),
            installed_version: module.installed_version.clone(),
            action,
            responder,
        }
    }

    /// Resolves the pending decision for this module
    pub fn resolve(&self, decision: Decision) -> Result<(), GateError> {
        self.responder.resolve(decision)
    }

    /// A clone of the decision capability, for resolving after the event
    /// handler has returned
    pub fn responder(&self) -> Responder {
        self.responder.clone()
    }
}
