//! Decides whether a transition run should actually animate.
//!
//! Checked in order, first match wins:
//!
//! 1. transitions disabled on the owning instance → suppress
//! 2. intro during a first render under `no_intro`, or outro during teardown
//!    under `no_outro` → suppress
//! 3. first argument carries `nested`: truthy → fire; falsy → skip to 6
//! 4. owner has no parent element → fire
//! 5. nearest `nested_transitions` setting is true → fire
//! 6. an ancestor is mid-transition in the same direction → suppress,
//!    otherwise fire

use serde_json::Value;

use crate::params::is_truthy;
use crate::transition::Transition;
use crate::tree::{LifecyclePhase, Setting, ViewTree};
use crate::types::TransitionKind;

impl Transition {
    /// Whether a `kind` run of this transition should animate.
    ///
    /// Ancestors must already be in their `Starting` state when this is
    /// called, which the outer-in order of a render pass guarantees.
    pub fn should_fire(&self, tree: &ViewTree, kind: TransitionKind) -> bool {
        let element = tree.element(self.owner());
        let instance_id = element.instance();
        let instance = tree.instance(instance_id);

        if !tree.local_setting(instance_id, Setting::TransitionsEnabled) {
            tracing::trace!(transition = %self.id(), "transitions disabled");
            return false;
        }

        let first_render_suppressed = match kind {
            TransitionKind::Intro => {
                instance.rendering
                    && tree.nearest_setting(instance_id, Setting::NoIntro, Some(LifecyclePhase::Rendering))
            }
            TransitionKind::Outro => {
                instance.unrendering
                    && tree.nearest_setting(instance_id, Setting::NoOutro, Some(LifecyclePhase::Unrendering))
            }
        };
        if first_render_suppressed {
            tracing::trace!(transition = %self.id(), %kind, "suppressed by first-render setting");
            return false;
        }

        let params = self.get_params(tree);
        let nested = params
            .first()
            .and_then(Value::as_object)
            .and_then(|options| options.get("nested"));
        match nested {
            Some(flag) if is_truthy(flag) => return true,
            // An explicit falsy flag skips the default policy and goes straight to the ancestor scan.
            Some(_) => {}
            None => {
                if element.parent().is_none() {
                    return true;
                }
                if tree.nearest_setting(instance_id, Setting::NestedTransitions, Some(kind.into())) {
                    return true;
                }
            }
        }

        let ancestor_running = tree
            .ancestors(self.owner())
            .any(|ancestor| ancestor.slot(kind).is_some_and(|slot| slot.state.is_starting()));
        if ancestor_running {
            tracing::trace!(transition = %self.id(), %kind, "ancestor already transitioning");
        }
        !ancestor_running
    }
}
