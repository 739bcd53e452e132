//! View-tree arena consumed by the transition engine.
//!
//! Elements and component instances live in flat vectors and refer to each
//! other by index:
//!
//! ```text
//! Instance (root)                 Instance (component)
//!   └── Element 0                   host ──► Instance (root)
//!         └── Element 1                └── Element 3 ── parent ──► Element 1
//!               └── Element 2
//! ```
//!
//! Parent links are non-owning. The host application creates and destroys
//! elements; the engine only walks ancestors and reads or writes the
//! intro/outro slots.

use rune_config::TransitionConfig;
use serde_json::Value;
use std::rc::Rc;

use crate::handler::{HandlerRegistry, HandlerScope};
use crate::surface::Surface;
use crate::types::{StateCell, TransitionId, TransitionKind};

/// Index of an element in a [`ViewTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

/// Index of a component instance in a [`ViewTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub usize);

/// A transition occupying an element's intro or outro slot.
#[derive(Debug, Clone)]
pub struct SlotEntry {
    pub id: TransitionId,
    pub state: StateCell,
}

/// A rendered element.
#[derive(Debug, Clone)]
pub struct Element {
    parent: Option<ElementId>,
    instance: InstanceId,
    surface: Surface,
    pub(crate) intro: Option<SlotEntry>,
    pub(crate) outro: Option<SlotEntry>,
    /// Set while the element's whole subtree is being torn down at once.
    pub tearing_down: bool,
}

impl Element {
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// The instance whose template produced this element.
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn slot(&self, kind: TransitionKind) -> Option<&SlotEntry> {
        match kind {
            TransitionKind::Intro => self.intro.as_ref(),
            TransitionKind::Outro => self.outro.as_ref(),
        }
    }

    pub(crate) fn slot_mut(&mut self, kind: TransitionKind) -> &mut Option<SlotEntry> {
        match kind {
            TransitionKind::Intro => &mut self.intro,
            TransitionKind::Outro => &mut self.outro,
        }
    }
}

/// Instance settings that influence whether a transition fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    TransitionsEnabled,
    NoIntro,
    NoOutro,
    NestedTransitions,
}

/// Settings an instance declares itself. `None` means "not set here".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceSettings {
    pub transitions_enabled: Option<bool>,
    pub no_intro: Option<bool>,
    pub no_outro: Option<bool>,
    pub nested_transitions: Option<bool>,
}

impl InstanceSettings {
    pub fn get(&self, setting: Setting) -> Option<bool> {
        match setting {
            Setting::TransitionsEnabled => self.transitions_enabled,
            Setting::NoIntro => self.no_intro,
            Setting::NoOutro => self.no_outro,
            Setting::NestedTransitions => self.nested_transitions,
        }
    }
}

/// Values used when an instance does not declare a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingDefaults {
    pub transitions_enabled: bool,
    pub no_intro: bool,
    pub no_outro: bool,
    pub nested_transitions: bool,
}

impl Default for SettingDefaults {
    fn default() -> Self {
        Self {
            transitions_enabled: true,
            no_intro: false,
            no_outro: false,
            nested_transitions: true,
        }
    }
}

impl SettingDefaults {
    pub fn from_config(config: &TransitionConfig) -> Self {
        Self {
            transitions_enabled: config.transitions.enabled,
            no_intro: config.transitions.no_intro,
            no_outro: config.transitions.no_outro,
            nested_transitions: config.transitions.nested,
        }
    }

    pub fn get(&self, setting: Setting) -> bool {
        match setting {
            Setting::TransitionsEnabled => self.transitions_enabled,
            Setting::NoIntro => self.no_intro,
            Setting::NoOutro => self.no_outro,
            Setting::NestedTransitions => self.nested_transitions,
        }
    }
}

/// Render lifecycle phase an instance can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Rendering,
    Unrendering,
}

impl From<TransitionKind> for LifecyclePhase {
    fn from(kind: TransitionKind) -> Self {
        match kind {
            TransitionKind::Intro => Self::Rendering,
            TransitionKind::Outro => Self::Unrendering,
        }
    }
}

/// A component instance.
#[derive(Debug, Clone, Default)]
pub struct Instance {
    host: Option<InstanceId>,
    pub settings: InstanceSettings,
    /// True during the instance's first render.
    pub rendering: bool,
    /// True while the instance is being torn down.
    pub unrendering: bool,
    /// Data that deferred transition arguments are evaluated against.
    pub data: Value,
    /// Handlers registered on this instance.
    pub registry: Option<Rc<HandlerRegistry>>,
}

impl Instance {
    /// The instance hosting this one as a component, if any.
    pub fn host(&self) -> Option<InstanceId> {
        self.host
    }

    pub fn in_phase(&self, phase: LifecyclePhase) -> bool {
        match phase {
            LifecyclePhase::Rendering => self.rendering,
            LifecyclePhase::Unrendering => self.unrendering,
        }
    }
}

/// Arena of elements and instances.
#[derive(Debug, Clone, Default)]
pub struct ViewTree {
    elements: Vec<Element>,
    instances: Vec<Instance>,
    defaults: SettingDefaults,
}

impl ViewTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: SettingDefaults) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    pub fn from_config(config: &TransitionConfig) -> Self {
        Self::with_defaults(SettingDefaults::from_config(config))
    }

    pub fn defaults(&self) -> &SettingDefaults {
        &self.defaults
    }

    /// Add an instance, optionally hosted by another as a component.
    pub fn add_instance(&mut self, host: Option<InstanceId>) -> InstanceId {
        let id = InstanceId(self.instances.len());
        self.instances.push(Instance {
            host,
            data: Value::Object(Default::default()),
            ..Instance::default()
        });
        id
    }

    /// Add an element belonging to `instance` under `parent`.
    pub fn add_element(&mut self, instance: InstanceId, parent: Option<ElementId>) -> ElementId {
        self.add_element_with_surface(instance, parent, Surface::new())
    }

    pub fn add_element_with_surface(
        &mut self,
        instance: InstanceId,
        parent: Option<ElementId>,
        surface: Surface,
    ) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            parent,
            instance,
            surface,
            intro: None,
            outro: None,
            tearing_down: false,
        });
        id
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    pub fn element_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.elements[id.0]
    }

    pub fn instance(&self, id: InstanceId) -> &Instance {
        &self.instances[id.0]
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> &mut Instance {
        &mut self.instances[id.0]
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = &Element> + '_ {
        std::iter::successors(self.element(id).parent, move |current| {
            self.element(*current).parent
        })
        .map(move |ancestor| self.element(ancestor))
    }

    /// Instance chain starting at `id` and following component hosts.
    pub fn instance_chain(&self, id: InstanceId) -> impl Iterator<Item = (InstanceId, &Instance)> + '_ {
        std::iter::successors(Some(id), move |current| self.instance(*current).host)
            .map(move |current| (current, self.instance(current)))
    }

    /// Resolve `setting` for `instance`.
    ///
    /// Walks from `instance` up through its hosts and returns the first value
    /// declared by an instance that is in `phase` (any instance when `phase`
    /// is `None`). Falls back to the local instance's own value, then to the
    /// tree defaults.
    pub fn nearest_setting(
        &self,
        instance: InstanceId,
        setting: Setting,
        phase: Option<LifecyclePhase>,
    ) -> bool {
        let declared = self.instance_chain(instance).find_map(|(_, candidate)| {
            let value = candidate.settings.get(setting)?;
            phase.is_none_or(|p| candidate.in_phase(p)).then_some(value)
        });
        declared.unwrap_or_else(|| self.local_setting(instance, setting))
    }

    /// The instance's own value for `setting`, or the tree default.
    pub fn local_setting(&self, instance: InstanceId, setting: Setting) -> bool {
        self.instance(instance)
            .settings
            .get(setting)
            .unwrap_or_else(|| self.defaults.get(setting))
    }

    /// Look up a dotted keypath (`user.items.0`) in instance data.
    ///
    /// Searches `instance` first, then the instances hosting it.
    pub fn resolve_keypath(&self, instance: InstanceId, keypath: &str) -> Option<Value> {
        self.instance_chain(instance)
            .find_map(|(_, candidate)| lookup_path(&candidate.data, keypath))
            .cloned()
    }

    /// Handler scope for `instance`: its own registry, its hosts' registries,
    /// then `global`.
    pub fn handler_scope(&self, instance: InstanceId, global: &Rc<HandlerRegistry>) -> HandlerScope {
        let mut scope = HandlerScope::new();
        for (_, candidate) in self.instance_chain(instance) {
            if let Some(registry) = &candidate.registry {
                scope.push(Rc::clone(registry));
            }
        }
        scope.push(Rc::clone(global));
        scope
    }
}

fn lookup_path<'a>(root: &'a Value, keypath: &str) -> Option<&'a Value> {
    if keypath.is_empty() {
        return Some(root);
    }
    keypath.split('.').try_fold(root, |value, key| match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}
