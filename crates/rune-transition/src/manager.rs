//! Bookkeeping of active transitions.
//!
//! `TransitionTracker` is the default [`TransitionManager`]: a transition is
//! registered when it starts and removed when it completes, so the host can
//! tell when a render pass has finished all of its intros and outros. Only
//! in-flight ids are kept; finished runs are counted, not stored.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

use crate::env::TransitionManager;
use crate::types::TransitionId;

#[derive(Debug, Default)]
pub struct TransitionTracker {
    active: RefCell<BTreeSet<TransitionId>>,
    completed: Cell<u64>,
}

impl TransitionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, id: TransitionId) -> bool {
        self.active.borrow().contains(&id)
    }

    pub fn active_count(&self) -> usize {
        self.active.borrow().len()
    }

    /// True once every registered transition has completed.
    pub fn is_idle(&self) -> bool {
        self.active.borrow().is_empty()
    }

    /// Number of removals seen so far.
    pub fn completed_count(&self) -> u64 {
        self.completed.get()
    }
}

impl TransitionManager for TransitionTracker {
    fn register(&self, id: TransitionId) {
        tracing::trace!(transition = %id, "registered transition");
        self.active.borrow_mut().insert(id);
    }

    fn remove(&self, id: TransitionId) {
        if self.active.borrow_mut().remove(&id) {
            tracing::trace!(transition = %id, "removed transition");
        }
        self.completed.set(self.completed.get() + 1);
    }
}
