//! The handle a transition handler works through.

use serde_json::{Map, Value};
use std::fmt;

use crate::completion::Completion;
use crate::env::TransitionEnv;
use crate::params::{self, AnimationOptions};
use crate::surface::Surface;
use crate::types::{TransitionId, TransitionKind};

/// A running transition, as seen by its handler.
///
/// Cheap to clone; clones can be moved into futures and driver callbacks.
/// Style operations live in [`crate::style`].
#[derive(Clone)]
pub struct TransitionHandle {
    pub(crate) id: TransitionId,
    pub(crate) name: String,
    pub(crate) kind: TransitionKind,
    pub(crate) surface: Surface,
    pub(crate) env: TransitionEnv,
    pub(crate) completion: Completion,
    /// Options used when `animate_style` is called without any.
    pub(crate) ambient: AnimationOptions,
}

impl TransitionHandle {
    pub(crate) fn new(
        id: TransitionId,
        name: String,
        surface: Surface,
        env: TransitionEnv,
        completion: Completion,
        params: &[Value],
    ) -> Self {
        let first = params.first().unwrap_or(&Value::Null);
        let ambient = AnimationOptions::from_params(&params::process_params(first, &Map::new()));
        Self {
            id,
            name,
            kind: completion.kind(),
            surface,
            env,
            completion,
            ambient,
        }
    }

    pub fn id(&self) -> TransitionId {
        self.id
    }

    /// Name of the handler running this transition.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn is_intro(&self) -> bool {
        self.kind == TransitionKind::Intro
    }

    /// The animatable surface captured at start.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Complete the transition. See [`Completion::complete`].
    pub fn complete(&self, preserve_style: bool) {
        self.completion.complete(preserve_style);
    }

    pub fn is_complete(&self) -> bool {
        self.completion.is_complete()
    }

    /// Expand shorthand parameters over `defaults`. See [`params::process_params`].
    pub fn process_params(&self, params: &Value, defaults: &Map<String, Value>) -> Map<String, Value> {
        params::process_params(params, defaults)
    }
}

impl fmt::Debug for TransitionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
