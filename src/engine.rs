//! Check engine: queue, decision dispatch, and outcome aggregation
//!
//! This module provides:
//! - CheckOptions: configuration for one batch check
//! - Checker: the orchestrator driving every module from manifest entry to a
//!   terminal outcome
//!
//! A check seeds one module per manifest entry in declaration order, resolves
//! each against the installed state, routes needs-action modules through the
//! decision gate, and aggregates terminal outcomes. Completion only requires
//! dispatched and terminal counts to reach parity; decisions and installs may
//! land in any order. All per-run state is local to `check`, so a long-lived
//! Checker starts every run fresh.

use crate::domain::{is_valid_name, ModuleAction, ModuleCheck, ModuleReport, ModuleState, RunReport};
use crate::error::{CheckError, ResolveError};
use crate::events::{Event, EventBus, EventKind, HandlerToken};
use crate::gate::{Decision, InstallRequest, Responder};
use crate::installer::{InstallRunner, NpmInstaller};
use crate::manifest::Manifest;
use crate::ondemand::{self, ModuleSpec, ResolvedModule};
use crate::probe;
use crate::resolver::{self, Resolution};
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Scope checked when none is configured
pub const DEFAULT_SCOPE: &str = "devDependencies";

/// Configuration for a batch check
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Project root containing the manifest
    pub path: PathBuf,
    /// Scopes to check, in processing order
    pub scopes: Vec<String>,
    /// Accept every install when no install listener is registered
    pub auto_accept: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            scopes: vec![DEFAULT_SCOPE.to_string()],
            auto_accept: false,
        }
    }
}

impl CheckOptions {
    /// Creates options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project root
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Checks a single scope
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes = vec![scope.into()];
        self
    }

    /// Checks an ordered set of scopes
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Enables automatic acceptance
    pub fn with_auto_accept(mut self, auto_accept: bool) -> Self {
        self.auto_accept = auto_accept;
        self
    }
}

/// Per-run bookkeeping, created and dropped inside one `check` call
struct Run {
    modules: Vec<ModuleCheck>,
    /// Module ids in completion order
    processed: Vec<usize>,
    /// Duplicate-free names of modules that ended up skipped or failed
    needs_install: Vec<String>,
}

impl Run {
    fn new(entries: Vec<(String, String, String)>) -> Self {
        Self {
            modules: entries
                .into_iter()
                .map(|(name, range, scope)| ModuleCheck::new(name, range, scope))
                .collect(),
            processed: Vec::new(),
            needs_install: Vec::new(),
        }
    }

    fn finish(&mut self, id: usize, state: ModuleState) {
        self.modules[id].finish(state);
        self.processed.push(id);

        if state.needs_install() {
            let name = &self.modules[id].name;
            if !self.needs_install.iter().any(|n| n == name) {
                self.needs_install.push(name.clone());
            }
        }
    }

    fn report(&self) -> RunReport {
        RunReport::new(
            self.processed
                .iter()
                .map(|&id| ModuleReport::from(&self.modules[id]))
                .collect(),
        )
    }
}

/// Orchestrator for batch dependency checks
///
/// Construct one per embedding context; there is no shared global instance.
/// Event handlers registered through [`Checker::on`] observe run progress and
/// gate installs; without them the engine auto-accepts or auto-rejects per
/// [`CheckOptions::auto_accept`], and fatal conditions are returned as `Err`
/// instead of emitted.
pub struct Checker {
    options: CheckOptions,
    bus: EventBus,
    runner: Arc<dyn InstallRunner>,
}

impl Checker {
    /// Creates a checker installing through npm
    pub fn new(options: CheckOptions) -> Self {
        Self::with_runner(options, Arc::new(NpmInstaller::new()))
    }

    /// Creates a checker with a custom install mechanism
    pub fn with_runner(options: CheckOptions, runner: Arc<dyn InstallRunner>) -> Self {
        Self {
            options,
            bus: EventBus::new(),
            runner,
        }
    }

    /// The configured options
    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    /// Subscribes a handler to one event channel
    pub fn on(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&Event) + Send + 'static,
    ) -> HandlerToken {
        self.bus.subscribe(kind, handler)
    }

    /// Removes every handler from every channel
    pub fn unsubscribe_all(&mut self) {
        self.bus.unsubscribe_all();
    }

    /// Removes every handler subscribed to one channel
    pub fn unsubscribe_event(&mut self, kind: EventKind) {
        self.bus.unsubscribe_event(kind);
    }

    /// Removes one handler by its token; returns true if it was present
    pub fn unsubscribe_handler(&mut self, kind: EventKind, token: HandlerToken) -> bool {
        self.bus.unsubscribe_handler(kind, token)
    }

    /// Resolves one named module outside the batch queue, installing it
    /// synchronously if needed
    ///
    /// Blocks the calling thread while the install subprocess runs; do not
    /// call from an async context. Failures are raised directly to the
    /// caller and never use the event channel. When no path is given the
    /// configured project root is searched.
    pub fn require(&self, spec: impl Into<ModuleSpec>) -> Result<ResolvedModule, ResolveError> {
        let mut spec = spec.into();
        if spec.path.is_none() {
            spec.path = Some(self.options.path.clone());
        }
        ondemand::resolve(spec, self.runner.as_ref())
    }

    /// Routes a fatal condition: emitted when an error listener is
    /// registered, returned otherwise
    fn raise(&mut self, err: CheckError) -> Result<(), CheckError> {
        if self.bus.has_listeners(EventKind::Error) {
            self.bus.emit(&Event::Error(err.to_string()));
            Ok(())
        } else {
            Err(err)
        }
    }

    /// Runs one batch check to a terminal outcome
    ///
    /// Returns the processed report, or `Err` for any fatal condition when no
    /// error listener is registered. With an error listener, fatal conditions
    /// are emitted instead and the returned report covers whatever was
    /// processed.
    pub async fn check(&mut self) -> Result<RunReport, CheckError> {
        let path = self.options.path.clone();
        let scopes = self.options.scopes.clone();
        let auto_accept = self.options.auto_accept;

        let manifest = match Manifest::load(&path).await {
            Ok(manifest) => manifest,
            Err(err) => {
                self.raise(err)?;
                return Ok(RunReport::default());
            }
        };

        let mut entries: Vec<(String, String, String)> = Vec::new();
        for scope in &scopes {
            match manifest.scope(scope) {
                Some(declarations) => entries.extend(
                    declarations
                        .into_iter()
                        .map(|(name, range)| (name, range, scope.clone())),
                ),
                None => {
                    self.raise(CheckError::scope_not_found(scope))?;
                    return Ok(RunReport::default());
                }
            }
        }

        let mut run = Run::new(entries);
        let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();
        let mut installs = FuturesUnordered::new();
        let mut outstanding = 0usize;

        // Dispatch phase: resolve every module in manifest order
        for id in 0..run.modules.len() {
            let installed = probe::installed_version(&path, &run.modules[id].name).await;
            run.modules[id].installed_version = installed.clone();

            match resolver::resolve_state(installed.as_deref(), &run.modules[id].range) {
                Resolution::Current => {
                    run.finish(id, ModuleState::Current);
                    let report = ModuleReport::from(&run.modules[id]);
                    self.bus.emit(&Event::Current(report));
                }
                Resolution::NeedsAction(action) => {
                    run.modules[id].needs_upgrade = action == ModuleAction::Update;

                    // validated before any install can be attempted
                    if !is_valid_name(&run.modules[id].name) {
                        run.finish(id, ModuleState::Failed);
                        let name = run.modules[id].name.clone();
                        self.raise(CheckError::invalid_name(name))?;
                        continue;
                    }

                    outstanding += 1;
                    let responder =
                        Responder::new(id, run.modules[id].name.clone(), reply_tx.clone());

                    if self.bus.has_listeners(EventKind::Install) {
                        let request = InstallRequest::new(&run.modules[id], action, responder);
                        self.bus.emit(&Event::Install(request));
                    } else {
                        let decision = if auto_accept {
                            Decision::Accept
                        } else {
                            Decision::Reject
                        };
                        // routed through the reply channel like a listener
                        // decision, so bookkeeping happens on a later turn
                        responder
                            .resolve(decision)
                            .expect("fresh responder cannot be decided");
                    }
                }
            }
        }

        // Drain phase: decisions and install completions land in any order.
        // reply_tx stays alive so a listener that never decides stalls the
        // run here rather than closing the channel.
        while outstanding > 0 {
            tokio::select! {
                Some(reply) = reply_rx.recv() => match reply.decision {
                    Decision::Accept => {
                        let id = reply.module;
                        let package = run.modules[id].package_spec();
                        let runner = Arc::clone(&self.runner);
                        let project = path.clone();
                        installs.push(async move {
                            let start = Instant::now();
                            let output = runner.install(&package, &project).await;
                            (id, output, start.elapsed())
                        });
                    }
                    Decision::Reject => {
                        run.finish(reply.module, ModuleState::Skipped);
                        outstanding -= 1;
                    }
                },
                Some((id, output, elapsed)) = installs.next() => {
                    outstanding -= 1;
                    if output.success {
                        if let Some(version) = probe::installed_version(&path, &run.modules[id].name).await {
                            run.modules[id].installed_version = Some(version);
                        }
                        run.modules[id].install_duration = Some(elapsed);
                        run.finish(id, ModuleState::Installed);
                        let report = ModuleReport::from(&run.modules[id]);
                        self.bus.emit(&Event::Complete(report));
                    } else {
                        run.finish(id, ModuleState::Failed);
                        let name = run.modules[id].name.clone();
                        self.raise(CheckError::install_failed(name))?;
                    }
                }
            }
        }

        let report = run.report();
        if run.needs_install.is_empty() {
            self.bus.emit(&Event::Ready(report.clone()));
            Ok(report)
        } else {
            self.raise(CheckError::update_needed(run.needs_install.clone()))?;
            Ok(report)
        }
    }
}
