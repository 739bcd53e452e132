//! Transition lifecycle engine for the rune view tree.
//!
//! This crate binds intro/outro animations to view-tree elements and drives
//! them to an exactly-once completion:
//! - **Binding**: a directive occupies its element's intro/outro slot and
//!   resolves its handler through a scope of registries
//! - **Suppression**: `should_fire` skips runs that are disabled, hidden by
//!   first-render settings, or nested inside an ancestor's run
//! - **Style animation**: `animate_style` diffs targets against computed
//!   styles and hands only real changes to a driver
//! - **Completion**: callbacks run once, intros restore their inline style,
//!   and the manager is told the run is over
//!
//! # Architecture
//!
//! ```text
//! ViewTree (arena)          TransitionEnv (collaborators)
//!   ├── Element slots ◄──┐    ├── StyleEnvironment / PropertyResolver
//!   └── Instance settings│    ├── TransitionDriver (FrameDriver)
//!                        │    ├── TransitionManager (TransitionTracker)
//! Transition ────────────┘    └── DiagnosticSink (TracingDiagnostics)
//!   └── start ──► Handler(TransitionHandle, params) ──► Completion
//! ```

pub mod completion;
pub mod diagnostics;
pub mod driver;
pub mod easing;
pub mod env;
pub mod error;
pub mod handle;
pub mod handler;
pub mod manager;
pub mod params;
pub mod style;
pub mod suppression;
pub mod surface;
pub mod transition;
pub mod tree;
pub mod types;
pub mod value;

pub use completion::{CompleteCallback, CompleteHandlers, Completion};
pub use diagnostics::TracingDiagnostics;
pub use driver::{DEFAULT_FRAME_MS, DriveRequest, FrameDriver};
pub use easing::EasingFunction;
pub use env::{
    DiagnosticSink, IdentityResolver, InlineStyleEnvironment, PrefixResolver, PropertyResolver,
    StyleEnvironment, TransitionDriver, TransitionEnv, TransitionManager,
};
pub use error::{Result, TransitionError};
pub use handle::TransitionHandle;
pub use handler::{Handler, HandlerOutcome, HandlerRegistry, HandlerScope};
pub use manager::TransitionTracker;
pub use params::{AnimationOptions, process_params};
pub use style::{StyleAnimation, StyleLookup, StyleQuery, StyleRequest};
pub use surface::Surface;
pub use transition::{
    ParamExpr, StartOutcome, Transition, TransitionDirective, TransitionName, TransitionParams,
};
pub use tree::{
    Element, ElementId, Instance, InstanceId, InstanceSettings, LifecyclePhase, Setting,
    SettingDefaults, SlotEntry, ViewTree,
};
pub use types::{Direction, StateCell, TransitionId, TransitionKind, TransitionState};
pub use value::{StyleMap, StyleValue, numeric_or_string_equals};
