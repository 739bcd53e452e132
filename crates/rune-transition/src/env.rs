//! Collaborators the engine depends on, and the bundle that carries them.
//!
//! ```text
//! TransitionEnv
//!   ├── StyleEnvironment   computed styles + visibility
//!   ├── PropertyResolver   logical → engine property names
//!   ├── TransitionDriver   runs an animation, reports when it is done
//!   ├── TransitionManager  bookkeeping of active transitions
//!   ├── DiagnosticSink     one-time warnings
//!   └── LocalSpawn         executor for awaitable handler results
//! ```

use futures::task::LocalSpawn;
use rune_config::TransitionConfig;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use crate::diagnostics::TracingDiagnostics;
use crate::driver::{DriveRequest, FrameDriver};
use crate::manager::TransitionTracker;
use crate::surface::Surface;
use crate::types::TransitionId;
use crate::value::{StyleMap, StyleValue};

/// Source of computed styles.
pub trait StyleEnvironment {
    /// Current computed style of `surface`, keyed by engine property name.
    fn computed_style(&self, surface: &Surface) -> StyleMap;

    /// Whether animations can run at all (false for hidden or background
    /// contexts, where completion signals are unreliable).
    fn is_visible(&self) -> bool;
}

/// Maps logical property names to the names the engine understands.
pub trait PropertyResolver {
    fn resolve(&self, name: &str) -> String;
}

/// Runs style animations.
pub trait TransitionDriver {
    /// Animate `request.changed` towards `request.targets`.
    ///
    /// Implementations must call `request.on_done` exactly once, when the
    /// animation finishes or is deemed instantaneous.
    fn drive(&self, request: DriveRequest);
}

/// Global bookkeeping of running transitions.
pub trait TransitionManager {
    /// Called when a transition starts.
    fn register(&self, _id: TransitionId) {}

    /// Called once when a transition completes.
    fn remove(&self, id: TransitionId);
}

/// Sink for non-fatal diagnostics.
pub trait DiagnosticSink {
    /// Report `message` once per distinct `(message, context)` pair.
    fn warn_once(&self, message: &str, context: &str);
}

/// Everything a transition needs from the outside world.
#[derive(Clone)]
pub struct TransitionEnv {
    pub styles: Rc<dyn StyleEnvironment>,
    pub resolver: Rc<dyn PropertyResolver>,
    pub driver: Rc<dyn TransitionDriver>,
    pub manager: Rc<dyn TransitionManager>,
    pub diagnostics: Rc<dyn DiagnosticSink>,
    pub spawner: Rc<dyn LocalSpawn>,
}

impl TransitionEnv {
    /// Environment with the built-in collaborators and the given executor.
    pub fn new(spawner: impl LocalSpawn + 'static) -> Self {
        Self {
            styles: Rc::new(InlineStyleEnvironment::new()),
            resolver: Rc::new(IdentityResolver),
            driver: Rc::new(FrameDriver::new()),
            manager: Rc::new(TransitionTracker::new()),
            diagnostics: Rc::new(TracingDiagnostics::new()),
            spawner: Rc::new(spawner),
        }
    }

    pub fn from_config(config: &TransitionConfig, spawner: impl LocalSpawn + 'static) -> Self {
        let mut env = Self::new(spawner);
        env.driver = Rc::new(FrameDriver::from_config(config));
        env.diagnostics = Rc::new(TracingDiagnostics::with_dedupe(config.diagnostics.warn_once));
        env
    }

    pub fn with_styles(mut self, styles: Rc<dyn StyleEnvironment>) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_resolver(mut self, resolver: Rc<dyn PropertyResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_driver(mut self, driver: Rc<dyn TransitionDriver>) -> Self {
        self.driver = driver;
        self
    }

    pub fn with_manager(mut self, manager: Rc<dyn TransitionManager>) -> Self {
        self.manager = manager;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Rc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

impl fmt::Debug for TransitionEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionEnv").finish_non_exhaustive()
    }
}

/// Computes styles as inline style layered over a base stylesheet.
///
/// Numbers in the inline style are reported as their CSS text, the way a
/// rendering engine reports computed values.
#[derive(Debug)]
pub struct InlineStyleEnvironment {
    base: RefCell<StyleMap>,
    visible: Cell<bool>,
}

impl Default for InlineStyleEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl InlineStyleEnvironment {
    pub fn new() -> Self {
        Self {
            base: RefCell::new(StyleMap::new()),
            visible: Cell::new(true),
        }
    }

    /// Set a base value, reported when a surface has no inline value.
    pub fn set_base(&self, property: impl Into<String>, value: impl Into<StyleValue>) {
        self.base.borrow_mut().insert(property.into(), value.into());
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }
}

impl StyleEnvironment for InlineStyleEnvironment {
    fn computed_style(&self, surface: &Surface) -> StyleMap {
        let mut computed = self.base.borrow().clone();
        for (property, value) in surface.inline_style() {
            computed.insert(property, StyleValue::Text(value.to_string()));
        }
        computed
    }

    fn is_visible(&self) -> bool {
        self.visible.get()
    }
}

/// Uses logical names unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl PropertyResolver for IdentityResolver {
    fn resolve(&self, name: &str) -> String {
        name.to_string()
    }
}

/// Adds a vendor prefix to a fixed set of property names.
#[derive(Debug, Clone)]
pub struct PrefixResolver {
    prefix: String,
    prefixed: HashSet<String>,
}

impl PrefixResolver {
    pub fn new<I, S>(prefix: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            prefixed: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl PropertyResolver for PrefixResolver {
    fn resolve(&self, name: &str) -> String {
        if self.prefixed.contains(name) {
            format!("{}{}", self.prefix, name)
        } else {
            name.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_over_base() {
        let env = InlineStyleEnvironment::new();
        env.set_base("height", "auto");
        env.set_base("opacity", "1");

        let surface = Surface::new();
        surface.set("opacity", StyleValue::Number(0.5));

        let computed = env.computed_style(&surface);
        assert_eq!(computed["height"], StyleValue::from("auto"));
        assert_eq!(computed["opacity"], StyleValue::from("0.5"));
    }

    #[test]
    fn test_visibility_flag() {
        let env = InlineStyleEnvironment::new();
        assert!(env.is_visible());
        env.set_visible(false);
        assert!(!env.is_visible());
    }

    #[test]
    fn test_prefix_resolver() {
        let resolver = PrefixResolver::new("-webkit-", ["transform"]);
        assert_eq!(resolver.resolve("transform"), "-webkit-transform");
        assert_eq!(resolver.resolve("opacity"), "opacity");
        assert_eq!(IdentityResolver.resolve("transform"), "transform");
    }
}
