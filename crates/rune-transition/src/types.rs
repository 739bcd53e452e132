//! Core transition types.
//!
//! This module defines the small value types shared by every part of the engine:
//! - `TransitionId`: Unique identifier for a transition instance
//! - `Direction`: Which slot(s) a directive binds to
//! - `TransitionKind`: Which way a single run goes (intro or outro)
//! - `TransitionState`: Lifecycle state of an instance

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a transition instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransitionId(pub u64);

impl TransitionId {
    /// Generate a new unique transition ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TransitionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// The slot(s) a transition directive occupies on its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Fires when the element enters the view tree.
    Intro,
    /// Fires when the element leaves the view tree.
    Outro,
    /// Fires both ways; one instance fills both slots.
    Both,
}

impl Direction {
    /// Whether a run of `kind` is covered by this direction.
    pub fn includes(self, kind: TransitionKind) -> bool {
        match self {
            Self::Both => true,
            Self::Intro => kind == TransitionKind::Intro,
            Self::Outro => kind == TransitionKind::Outro,
        }
    }
}

/// The way a single transition run goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Intro,
    Outro,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intro => f.write_str("intro"),
            Self::Outro => f.write_str("outro"),
        }
    }
}

/// Lifecycle state of a transition instance.
///
/// States only move forward: `Idle` → `Starting` → `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionState {
    /// Bound but not yet started.
    #[default]
    Idle,
    /// Started and waiting for completion.
    Starting,
    /// Completed; callbacks have run.
    Completed,
}

/// Shared view of an instance's state.
///
/// The element slots hold a clone so that descendants can observe whether an
/// ancestor is mid-transition without borrowing the instance itself.
#[derive(Debug, Clone, Default)]
pub struct StateCell(Rc<Cell<TransitionState>>);

impl StateCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> TransitionState {
        self.0.get()
    }

    pub fn set(&self, state: TransitionState) {
        self.0.set(state);
    }

    /// True while the transition is in flight.
    pub fn is_starting(&self) -> bool {
        self.get() == TransitionState::Starting
    }
}
