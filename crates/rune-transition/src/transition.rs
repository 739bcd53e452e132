//! Transition instances: binding to an element, parameters, and start.
//!
//! A `Transition` is created for each intro/outro directive occurrence.
//!
//! ```text
//! new ──► bind ──► start(kind) ──► should_fire? ──no──► complete (no animation)
//!                                       │
//!                                      yes
//!                                       ▼
//!                         handler(handle, params) ──► complete
//! ```
//!
//! # Example
//!
//! ```ignore
//! let directive = TransitionDirective::named(Direction::Intro, "fade")
//!     .with_params(vec![json!({"duration": 300})]);
//! let mut fade = Transition::new(element, directive);
//! fade.bind(&mut tree, &tree.handler_scope(instance, &globals), &*env.diagnostics);
//! fade.start(&tree, &env, TransitionKind::Intro);
//! ```

use futures::task::LocalSpawnExt;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

use crate::completion::{CompleteCallback, CompleteHandlers, Completion};
use crate::env::{DiagnosticSink, TransitionEnv};
use crate::handle::TransitionHandle;
use crate::handler::{Handler, HandlerOutcome, HandlerScope};
use crate::tree::{ElementId, SlotEntry, ViewTree};
use crate::types::{Direction, StateCell, TransitionId, TransitionKind, TransitionState};

/// How a directive names its handler.
#[derive(Debug, Clone)]
pub enum TransitionName {
    /// Resolved through the handler scope at bind time.
    Named(String),
    /// Supplied directly; named by the handler's own name.
    Handler(Handler),
}

/// Deferred argument expression.
///
/// Evaluated at call time with the current value of each dependency keypath
/// (`None` when the keypath does not resolve).
#[derive(Clone)]
pub struct ParamExpr {
    dependencies: Vec<String>,
    evaluate: Rc<dyn Fn(&[Option<Value>]) -> Vec<Value>>,
}

impl ParamExpr {
    pub fn new<I, S, F>(dependencies: I, evaluate: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[Option<Value>]) -> Vec<Value> + 'static,
    {
        Self {
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            evaluate: Rc::new(evaluate),
        }
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

impl fmt::Debug for ParamExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamExpr")
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Arguments passed to the handler.
#[derive(Debug, Clone, Default)]
pub enum TransitionParams {
    #[default]
    None,
    Fixed(Vec<Value>),
    Deferred(ParamExpr),
}

/// A declared intro/outro directive.
#[derive(Debug, Clone)]
pub struct TransitionDirective {
    pub direction: Direction,
    pub name: TransitionName,
    pub params: TransitionParams,
}

impl TransitionDirective {
    pub fn named(direction: Direction, name: impl Into<String>) -> Self {
        Self {
            direction,
            name: TransitionName::Named(name.into()),
            params: TransitionParams::None,
        }
    }

    pub fn with_handler(direction: Direction, handler: Handler) -> Self {
        Self {
            direction,
            name: TransitionName::Handler(handler),
            params: TransitionParams::None,
        }
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = TransitionParams::Fixed(params);
        self
    }

    pub fn with_expr(mut self, expr: ParamExpr) -> Self {
        self.params = TransitionParams::Deferred(expr);
        self
    }
}

/// What `start` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The run was not started (wrong direction, or already running/complete).
    Ignored,
    /// Suppressed by the firing rules; completed without animating.
    Suppressed,
    /// Completed before `start` returned.
    Completed,
    /// The handler is still running.
    Running,
}

/// One transition directive bound to an element.
#[derive(Debug)]
pub struct Transition {
    id: TransitionId,
    owner: ElementId,
    direction: Direction,
    name: TransitionName,
    params: TransitionParams,
    handler: Option<Handler>,
    state: StateCell,
    handlers: CompleteHandlers,
    completion: Option<Completion>,
    last_kind: Option<TransitionKind>,
}

impl Transition {
    pub fn new(owner: ElementId, directive: TransitionDirective) -> Self {
        Self {
            id: TransitionId::new(),
            owner,
            direction: directive.direction,
            name: directive.name,
            params: directive.params,
            handler: None,
            state: StateCell::new(),
            handlers: CompleteHandlers::new(),
            completion: None,
            last_kind: None,
        }
    }

    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn owner(&self) -> ElementId {
        self.owner
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> TransitionState {
        self.state.get()
    }

    /// Handler name, whether looked up or supplied directly.
    pub fn name(&self) -> &str {
        match &self.name {
            TransitionName::Named(name) => name,
            TransitionName::Handler(handler) => handler.name(),
        }
    }

    /// The resolved handler; `None` before bind or when lookup failed.
    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// Completion state of the current (or last) run.
    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    /// Occupy the owner's slot(s) and resolve the handler.
    ///
    /// A failed lookup is reported once through `diagnostics`; the transition
    /// stays usable and completes immediately when started.
    pub fn bind(&mut self, tree: &mut ViewTree, scope: &HandlerScope, diagnostics: &dyn DiagnosticSink) {
        let entry = SlotEntry {
            id: self.id,
            state: self.state.clone(),
        };
        let element = tree.element_mut(self.owner);
        for kind in [TransitionKind::Intro, TransitionKind::Outro] {
            if !self.direction.includes(kind) {
                continue;
            }
            if let Some(previous) = element.slot_mut(kind).replace(entry.clone()) {
                if previous.id != self.id {
                    tracing::debug!(transition = %self.id, replaced = %previous.id, %kind, "replaced slot occupant");
                }
            }
        }

        self.handler = match &self.name {
            TransitionName::Handler(handler) => Some(handler.clone()),
            TransitionName::Named(name) => {
                let found = scope.lookup(name);
                if found.is_none() {
                    diagnostics.warn_once(&format!("Missing \"{name}\" transition plugin"), "transition");
                }
                found
            }
        };

        tracing::debug!(
            transition = %self.id,
            name = %self.name(),
            direction = ?self.direction,
            resolved = self.handler.is_some(),
            "bound transition"
        );
    }

    /// Release the owner's slot(s), unless the owner is being torn down in bulk.
    pub fn unbind(&mut self, tree: &mut ViewTree) {
        let element = tree.element_mut(self.owner);
        if element.tearing_down {
            return;
        }
        for kind in [TransitionKind::Intro, TransitionKind::Outro] {
            let slot = element.slot_mut(kind);
            if slot.as_ref().is_some_and(|entry| entry.id == self.id) {
                *slot = None;
            }
        }
    }

    /// Arguments for the handler, evaluating a deferred expression against
    /// the current tree state.
    pub fn get_params(&self, tree: &ViewTree) -> Vec<Value> {
        match &self.params {
            TransitionParams::None => Vec::new(),
            TransitionParams::Fixed(params) => params.clone(),
            TransitionParams::Deferred(expr) => {
                let instance = tree.element(self.owner).instance();
                let values: Vec<Option<Value>> = expr
                    .dependencies
                    .iter()
                    .map(|keypath| tree.resolve_keypath(instance, keypath))
                    .collect();
                (expr.evaluate)(&values)
            }
        }
    }

    pub fn register_complete_handler(&self, callback: CompleteCallback) {
        self.handlers.register(callback);
    }

    pub fn unregister_complete_handler(&self, callback: &CompleteCallback) {
        self.handlers.unregister(callback);
    }

    /// Complete the current run, if any. Idempotent.
    pub fn complete(&self, preserve_style: bool) {
        if let Some(completion) = &self.completion {
            completion.complete(preserve_style);
        }
    }

    /// Run the transition as `kind`.
    ///
    /// Captures the owner's surface and inline style, then either completes
    /// immediately (suppressed, or no handler) or invokes the handler. An
    /// awaitable handler result is spawned on the environment's executor and
    /// completes the transition when it resolves.
    pub fn start(&mut self, tree: &ViewTree, env: &TransitionEnv, kind: TransitionKind) -> StartOutcome {
        if !self.direction.includes(kind) {
            tracing::debug!(transition = %self.id, %kind, "direction does not cover this run");
            return StartOutcome::Ignored;
        }
        match self.state.get() {
            TransitionState::Idle => {}
            TransitionState::Starting => {
                tracing::debug!(transition = %self.id, "already starting");
                return StartOutcome::Ignored;
            }
            // A two-way transition re-arms for the opposite run.
            TransitionState::Completed => {
                if self.direction != Direction::Both || self.last_kind == Some(kind) {
                    return StartOutcome::Ignored;
                }
            }
        }

        let fire = self.should_fire(tree, kind);
        let surface = tree.element(self.owner).surface().clone();

        self.state.set(TransitionState::Starting);
        self.last_kind = Some(kind);
        env.manager.register(self.id);

        let completion = Completion::new(
            self.id,
            kind,
            self.state.clone(),
            self.handlers.clone(),
            surface.clone(),
            Rc::clone(&env.manager),
        );
        self.completion = Some(completion.clone());

        if !fire {
            tracing::debug!(transition = %self.id, %kind, "transition suppressed");
            completion.complete(true);
            return StartOutcome::Suppressed;
        }

        let Some(handler) = self.handler.clone() else {
            completion.complete(true);
            return StartOutcome::Completed;
        };

        let params = self.get_params(tree);
        let handle = TransitionHandle::new(
            self.id,
            handler.name().to_string(),
            surface,
            env.clone(),
            completion.clone(),
            &params,
        );

        tracing::debug!(transition = %self.id, name = %handler.name(), %kind, "starting transition");
        match handler.invoke(handle, params) {
            HandlerOutcome::SelfCompleting => {}
            HandlerOutcome::Awaitable(future) => {
                let deferred = completion.clone();
                let spawned = env.spawner.spawn_local(async move {
                    future.await;
                    deferred.complete(false);
                });
                if let Err(err) = spawned {
                    tracing::warn!(transition = %self.id, error = %err, "could not spawn transition, completing now");
                    completion.complete(false);
                }
            }
        }

        if completion.is_complete() {
            StartOutcome::Completed
        } else {
            StartOutcome::Running
        }
    }
}
