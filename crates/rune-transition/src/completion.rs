//! Completion callbacks and the exactly-once completion state.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::env::TransitionManager;
use crate::surface::Surface;
use crate::types::{StateCell, TransitionId, TransitionKind, TransitionState};
use crate::value::StyleMap;

/// Callback run when a transition completes.
pub type CompleteCallback = Rc<dyn Fn()>;

/// Ordered set of completion callbacks.
///
/// A callback is identified by its `Rc` allocation; registering the same one
/// twice keeps a single entry.
#[derive(Clone, Default)]
pub struct CompleteHandlers {
    callbacks: Rc<RefCell<Vec<CompleteCallback>>>,
}

impl CompleteHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, callback: CompleteCallback) {
        let mut callbacks = self.callbacks.borrow_mut();
        if !callbacks.iter().any(|existing| Rc::ptr_eq(existing, &callback)) {
            callbacks.push(callback);
        }
    }

    pub fn unregister(&self, callback: &CompleteCallback) {
        self.callbacks
            .borrow_mut()
            .retain(|existing| !Rc::ptr_eq(existing, callback));
    }

    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }

    /// Run every callback in registration order and clear the set.
    fn drain_and_run(&self) {
        let callbacks = std::mem::take(&mut *self.callbacks.borrow_mut());
        for callback in callbacks {
            callback();
        }
    }
}

impl fmt::Debug for CompleteHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompleteHandlers")
            .field("len", &self.len())
            .finish()
    }
}

struct CompletionInner {
    id: TransitionId,
    kind: TransitionKind,
    state: StateCell,
    handlers: CompleteHandlers,
    surface: Surface,
    original_style: StyleMap,
    manager: Rc<dyn TransitionManager>,
    completed: Cell<bool>,
}

/// Completion state for one run of a transition, created at `start`.
///
/// Clones share state, so the handler, the driver callback and an awaited
/// handler future can all race to complete; only the first call has any
/// effect.
#[derive(Clone)]
pub struct Completion {
    inner: Rc<CompletionInner>,
}

impl Completion {
    pub(crate) fn new(
        id: TransitionId,
        kind: TransitionKind,
        state: StateCell,
        handlers: CompleteHandlers,
        surface: Surface,
        manager: Rc<dyn TransitionManager>,
    ) -> Self {
        let original_style = surface.inline_style();
        Self {
            inner: Rc::new(CompletionInner {
                id,
                kind,
                state,
                handlers,
                surface,
                original_style,
                manager,
                completed: Cell::new(false),
            }),
        }
    }

    /// Complete the transition.
    ///
    /// Runs the registered callbacks, restores the inline style captured at
    /// start for intros unless `preserve_style` is set, and deregisters from
    /// the transition manager. Later calls do nothing.
    pub fn complete(&self, preserve_style: bool) {
        let inner = &self.inner;
        if inner.completed.replace(true) {
            return;
        }
        inner.state.set(TransitionState::Completed);

        inner.handlers.drain_and_run();

        if !preserve_style && inner.kind == TransitionKind::Intro {
            inner.surface.replace(inner.original_style.clone());
        }

        tracing::debug!(transition = %inner.id, kind = %inner.kind, "transition complete");
        inner.manager.remove(inner.id);
    }

    pub fn is_complete(&self) -> bool {
        self.inner.completed.get()
    }

    pub fn kind(&self) -> TransitionKind {
        self.inner.kind
    }

    /// Inline style captured when the run started.
    pub fn original_style(&self) -> &StyleMap {
        &self.inner.original_style
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("completed", &self.inner.completed.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::TransitionTracker;
    use crate::value::StyleValue;

    fn completion(kind: TransitionKind, surface: &Surface, handlers: &CompleteHandlers) -> (Completion, Rc<TransitionTracker>) {
        let tracker = Rc::new(TransitionTracker::new());
        let completion = Completion::new(
            TransitionId::new(),
            kind,
            StateCell::new(),
            handlers.clone(),
            surface.clone(),
            tracker.clone(),
        );
        (completion, tracker)
    }

    #[test]
    fn test_register_deduplicates() {
        let handlers = CompleteHandlers::new();
        let callback: CompleteCallback = Rc::new(|| {});
        handlers.register(callback.clone());
        handlers.register(callback.clone());
        handlers.register(Rc::new(|| {}));
        assert_eq!(handlers.len(), 2);

        handlers.unregister(&callback);
        assert_eq!(handlers.len(), 1);
    }

    #[test]
    fn test_complete_twice_runs_callbacks_once_in_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let handlers = CompleteHandlers::new();
        for tag in ["first", "second"] {
            let order = Rc::clone(&order);
            handlers.register(Rc::new(move || order.borrow_mut().push(tag)));
        }

        let (completion, tracker) = completion(TransitionKind::Outro, &Surface::new(), &handlers);
        completion.complete(false);
        completion.clone().complete(false);

        assert_eq!(*order.borrow(), vec!["first", "second"]);
        assert!(handlers.is_empty());
        assert_eq!(tracker.completed_count(), 1);
    }

    #[test]
    fn test_intro_restores_original_style() {
        let surface = Surface::new();
        surface.set("color", "red".into());
        let (completion, _) = completion(TransitionKind::Intro, &surface, &CompleteHandlers::new());

        surface.set("opacity", StyleValue::from(0));
        completion.complete(false);

        assert_eq!(surface.get("opacity"), None);
        assert_eq!(surface.get("color"), Some(StyleValue::from("red")));
    }

    #[test]
    fn test_preserve_style_and_outro_keep_current_style() {
        let surface = Surface::new();
        let (intro, _) = completion(TransitionKind::Intro, &surface, &CompleteHandlers::new());
        surface.set("opacity", StyleValue::from(1));
        intro.complete(true);
        assert_eq!(surface.get("opacity"), Some(StyleValue::Number(1.0)));

        let (outro, _) = completion(TransitionKind::Outro, &surface, &CompleteHandlers::new());
        surface.set("opacity", StyleValue::from(0));
        outro.complete(false);
        assert_eq!(surface.get("opacity"), Some(StyleValue::Number(0.0)));
    }

    #[test]
    fn test_reentrant_complete_is_ignored() {
        let handlers = CompleteHandlers::new();
        let (completion, tracker) = completion(TransitionKind::Outro, &Surface::new(), &handlers);
        let again = completion.clone();
        handlers.register(Rc::new(move || again.complete(false)));

        completion.complete(false);
        assert!(completion.is_complete());
        assert_eq!(tracker.completed_count(), 1);
    }
}
