//! Transition handlers and the registries that resolve them by name.
//!
//! A directive names its handler (`intro="fade"`) or supplies one directly.
//! Named handlers are looked up through a [`HandlerScope`]: an ordered list of
//! registries, nearest first, built from the owning instance up through the
//! instances hosting it and finally the global registry.

use futures::future::LocalBoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use crate::handle::TransitionHandle;

/// What a handler hands back once it has kicked off its animation.
pub enum HandlerOutcome {
    /// The handler calls [`TransitionHandle::complete`] itself.
    SelfCompleting,
    /// Completion is deferred until this future resolves.
    Awaitable(LocalBoxFuture<'static, ()>),
}

impl HandlerOutcome {
    pub fn awaitable(future: impl Future<Output = ()> + 'static) -> Self {
        Self::Awaitable(Box::pin(future))
    }
}

impl fmt::Debug for HandlerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfCompleting => f.write_str("SelfCompleting"),
            Self::Awaitable(_) => f.write_str("Awaitable(..)"),
        }
    }
}

/// Signature of a transition handler: the running transition plus its
/// resolved arguments.
pub type HandlerFn = dyn Fn(TransitionHandle, Vec<Value>) -> HandlerOutcome;

/// A named transition handler.
#[derive(Clone)]
pub struct Handler {
    name: String,
    func: Rc<HandlerFn>,
}

impl Handler {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(TransitionHandle, Vec<Value>) -> HandlerOutcome + 'static,
    {
        Self {
            name: name.into(),
            func: Rc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn invoke(&self, handle: TransitionHandle, params: Vec<Value>) -> HandlerOutcome {
        (self.func)(handle, params)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").field("name", &self.name).finish()
    }
}

/// Handlers registered under a name.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under its own name, replacing any previous entry.
    pub fn insert(&mut self, handler: Handler) -> Option<Handler> {
        self.handlers.insert(handler.name.clone(), handler)
    }

    /// Register a closure under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(TransitionHandle, Vec<Value>) -> HandlerOutcome + 'static,
    {
        self.insert(Handler::new(name, func));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Ordered list of registries consulted during lookup, nearest first.
#[derive(Debug, Clone, Default)]
pub struct HandlerScope {
    registries: Vec<Rc<HandlerRegistry>>,
}

impl HandlerScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, registry: Rc<HandlerRegistry>) {
        self.registries.push(registry);
    }

    pub fn with(mut self, registry: Rc<HandlerRegistry>) -> Self {
        self.push(registry);
        self
    }

    /// First handler registered under `name`, searching nearest first.
    pub fn lookup(&self, name: &str) -> Option<Handler> {
        self.registries
            .iter()
            .find_map(|registry| registry.get(name))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.registries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }
}
