use anyhow::Result;
use futures::executor::LocalPool;
use rune_config::TransitionConfig;
use rune_transition::{
    AnimationOptions, DiagnosticSink, Direction, ElementId, FrameDriver, HandlerOutcome,
    HandlerRegistry, InlineStyleEnvironment, InstanceId, StartOutcome, StyleValue, Transition,
    TransitionDirective, TransitionEnv, TransitionKind, TransitionState, TransitionTracker,
    ViewTree,
};
use serde_json::{Map, Value, json};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Default)]
struct RecordingDiagnostics {
    warnings: RefCell<Vec<(String, String)>>,
}

impl DiagnosticSink for RecordingDiagnostics {
    fn warn_once(&self, message: &str, context: &str) {
        self.warnings
            .borrow_mut()
            .push((message.to_string(), context.to_string()));
    }
}

struct Harness {
    pool: LocalPool,
    tree: ViewTree,
    root: InstanceId,
    env: TransitionEnv,
    driver: Rc<FrameDriver>,
    tracker: Rc<TransitionTracker>,
    diagnostics: Rc<RecordingDiagnostics>,
    global: Rc<HandlerRegistry>,
}

impl Harness {
    fn new(config: &TransitionConfig, registry: HandlerRegistry) -> Self {
        let pool = LocalPool::new();
        let driver = Rc::new(FrameDriver::new());
        let tracker = Rc::new(TransitionTracker::new());
        let diagnostics = Rc::new(RecordingDiagnostics::default());
        let styles = Rc::new(InlineStyleEnvironment::new());
        styles.set_base("opacity", "1");

        let env = TransitionEnv::from_config(config, pool.spawner())
            .with_driver(driver.clone())
            .with_manager(tracker.clone())
            .with_diagnostics(diagnostics.clone())
            .with_styles(styles);

        let mut tree = ViewTree::from_config(config);
        let root = tree.add_instance(None);
        Self {
            pool,
            tree,
            root,
            env,
            driver,
            tracker,
            diagnostics,
            global: Rc::new(registry),
        }
    }

    fn bind(&mut self, owner: ElementId, directive: TransitionDirective) -> Transition {
        let instance = self.tree.element(owner).instance();
        let scope = self.tree.handler_scope(instance, &self.global);
        let mut transition = Transition::new(owner, directive);
        transition.bind(&mut self.tree, &scope, &*self.env.diagnostics);
        transition
    }

    fn run_frames(&mut self) {
        self.pool.run_until_stalled();
        while !self.driver.is_idle() {
            self.driver.advance_frame();
            self.pool.run_until_stalled();
        }
    }
}

/// Fades `opacity` from 0 up to its computed value, deferring completion to the animation.
fn fade_registry(calls: &Rc<Cell<u32>>) -> HandlerRegistry {
    let calls = Rc::clone(calls);
    let mut registry = HandlerRegistry::new();
    registry.register("fade", move |t, params| {
        calls.set(calls.get() + 1);
        let mut defaults = Map::new();
        defaults.insert("duration".to_string(), json!(100));
        let options =
            AnimationOptions::from_params(&t.process_params(params.first().unwrap_or(&Value::Null), &defaults));
        t.set_style(("opacity", 0.0));
        HandlerOutcome::awaitable(t.animate_style(("opacity", 1.0), Some(&options)))
    });
    registry
}

#[test]
fn fade_intro_runs_to_completion() -> Result<()> {
    let calls = Rc::new(Cell::new(0));
    let mut h = Harness::new(&TransitionConfig::default(), fade_registry(&calls));
    let element = h.tree.add_element(h.root, None);
    h.tree.element(element).surface().set("color", "red".into());

    let mut fade = h.bind(
        element,
        TransitionDirective::named(Direction::Intro, "fade").with_params(vec![json!("fast")]),
    );
    let completed = Rc::new(Cell::new(0));
    let counter = Rc::clone(&completed);
    fade.register_complete_handler(Rc::new(move || counter.set(counter.get() + 1)));

    assert_eq!(fade.start(&h.tree, &h.env, TransitionKind::Intro), StartOutcome::Running);
    assert_eq!(fade.state(), TransitionState::Starting);
    assert!(h.tracker.is_active(fade.id()));

    h.driver.tick(100.0);
    let surface = h.tree.element(element).surface().clone();
    assert_eq!(surface.get("opacity"), Some(StyleValue::Number(0.5)));

    h.run_frames();

    assert_eq!(fade.state(), TransitionState::Completed);
    assert_eq!(calls.get(), 1);
    assert_eq!(completed.get(), 1);
    assert!(h.tracker.is_idle());
    // Intro completion restores the inline style captured at start.
    assert_eq!(surface.get("opacity"), None);
    assert_eq!(surface.get("color"), Some(StyleValue::from("red")));
    Ok(())
}

#[test]
fn completion_is_exactly_once_when_handler_and_future_both_complete() -> Result<()> {
    let mut registry = HandlerRegistry::new();
    registry.register("eager", |t, _| {
        t.complete(true);
        let later = t.clone();
        HandlerOutcome::awaitable(async move { later.complete(false) })
    });
    let mut h = Harness::new(&TransitionConfig::default(), registry);
    let element = h.tree.add_element(h.root, None);
    let mut eager = h.bind(element, TransitionDirective::named(Direction::Outro, "eager"));

    let fired = Rc::new(Cell::new(0));
    let counter = Rc::clone(&fired);
    eager.register_complete_handler(Rc::new(move || counter.set(counter.get() + 1)));

    assert_eq!(eager.start(&h.tree, &h.env, TransitionKind::Outro), StartOutcome::Completed);
    h.run_frames();
    eager.complete(false);

    assert_eq!(fired.get(), 1);
    assert_eq!(h.tracker.completed_count(), 1);
    assert!(!h.tracker.is_active(eager.id()));
    Ok(())
}

#[test]
fn disabled_transitions_complete_without_invoking_handler() -> Result<()> {
    let mut config = TransitionConfig::default();
    config.transitions.enabled = false;
    let calls = Rc::new(Cell::new(0));
    let mut h = Harness::new(&config, fade_registry(&calls));
    let element = h.tree.add_element(h.root, None);
    h.tree.element(element).surface().set("opacity", 0.25.into());

    let mut fade = h.bind(element, TransitionDirective::named(Direction::Intro, "fade"));
    assert_eq!(fade.start(&h.tree, &h.env, TransitionKind::Intro), StartOutcome::Suppressed);

    assert_eq!(calls.get(), 0);
    assert_eq!(fade.state(), TransitionState::Completed);
    assert!(h.driver.is_idle());
    assert_eq!(
        h.tree.element(element).surface().get("opacity"),
        Some(StyleValue::Number(0.25))
    );
    Ok(())
}

#[test]
fn nested_intro_is_suppressed_while_parent_runs() -> Result<()> {
    let mut config = TransitionConfig::default();
    config.transitions.nested = false;
    let calls = Rc::new(Cell::new(0));
    let mut h = Harness::new(&config, fade_registry(&calls));
    let outer = h.tree.add_element(h.root, None);
    let inner = h.tree.add_element(h.root, Some(outer));

    let mut parent = h.bind(outer, TransitionDirective::named(Direction::Intro, "fade"));
    let mut child = h.bind(inner, TransitionDirective::named(Direction::Intro, "fade"));

    assert_eq!(parent.start(&h.tree, &h.env, TransitionKind::Intro), StartOutcome::Running);
    assert_eq!(child.start(&h.tree, &h.env, TransitionKind::Intro), StartOutcome::Suppressed);
    assert_eq!(calls.get(), 1);

    h.run_frames();
    assert_eq!(parent.state(), TransitionState::Completed);
    assert!(h.tracker.is_idle());

    // A later run of the inner element alone is not nested any more.
    let mut again = h.bind(inner, TransitionDirective::named(Direction::Intro, "fade"));
    assert_eq!(again.start(&h.tree, &h.env, TransitionKind::Intro), StartOutcome::Running);
    h.run_frames();
    assert_eq!(calls.get(), 2);
    Ok(())
}

#[test]
fn missing_handler_warns_and_outro_leaves_style_alone() -> Result<()> {
    let mut h = Harness::new(&TransitionConfig::default(), HandlerRegistry::new());
    let element = h.tree.add_element(h.root, None);
    let surface = h.tree.element(element).surface().clone();
    surface.set("height", "40px".into());

    let mut slide = h.bind(element, TransitionDirective::named(Direction::Outro, "slide"));
    assert!(slide.handler().is_none());
    assert_eq!(
        *h.diagnostics.warnings.borrow(),
        vec![(
            "Missing \"slide\" transition plugin".to_string(),
            "transition".to_string()
        )]
    );

    assert_eq!(slide.start(&h.tree, &h.env, TransitionKind::Outro), StartOutcome::Completed);
    assert_eq!(surface.get("height"), Some(StyleValue::from("40px")));
    surface.set("height", "0px".into());
    slide.complete(false);
    assert_eq!(surface.get("height"), Some(StyleValue::from("0px")));
    Ok(())
}

#[test]
fn component_registry_shadows_global_handler() -> Result<()> {
    let used = Rc::new(RefCell::new(Vec::new()));
    let mut global = HandlerRegistry::new();
    let log = Rc::clone(&used);
    global.register("pop", move |t, _| {
        log.borrow_mut().push("global");
        t.complete(false);
        HandlerOutcome::SelfCompleting
    });
    let mut h = Harness::new(&TransitionConfig::default(), global);

    let component = h.tree.add_instance(Some(h.root));
    let mut local = HandlerRegistry::new();
    let log = Rc::clone(&used);
    local.register("pop", move |t, _| {
        log.borrow_mut().push("component");
        t.complete(false);
        HandlerOutcome::SelfCompleting
    });
    h.tree.instance_mut(component).registry = Some(Rc::new(local));

    let host_element = h.tree.add_element(h.root, None);
    let hosted = h.tree.add_element(component, Some(host_element));

    let mut inner = h.bind(hosted, TransitionDirective::named(Direction::Intro, "pop"));
    let mut outer = h.bind(host_element, TransitionDirective::named(Direction::Outro, "pop"));
    inner.start(&h.tree, &h.env, TransitionKind::Intro);
    outer.start(&h.tree, &h.env, TransitionKind::Outro);

    assert_eq!(*used.borrow(), vec!["component", "global"]);
    Ok(())
}

#[test]
fn two_way_transition_rearms_for_opposite_run() -> Result<()> {
    let kinds = Rc::new(RefCell::new(Vec::new()));
    let mut registry = HandlerRegistry::new();
    let seen = Rc::clone(&kinds);
    registry.register("toggle", move |t, _| {
        seen.borrow_mut().push(t.kind());
        t.complete(false);
        HandlerOutcome::SelfCompleting
    });
    let mut h = Harness::new(&TransitionConfig::default(), registry);
    let element = h.tree.add_element(h.root, None);
    let mut toggle = h.bind(element, TransitionDirective::named(Direction::Both, "toggle"));

    assert!(h.tree.element(element).slot(TransitionKind::Intro).is_some());
    assert!(h.tree.element(element).slot(TransitionKind::Outro).is_some());

    assert_eq!(toggle.start(&h.tree, &h.env, TransitionKind::Intro), StartOutcome::Completed);
    assert_eq!(toggle.start(&h.tree, &h.env, TransitionKind::Intro), StartOutcome::Ignored);
    assert_eq!(toggle.start(&h.tree, &h.env, TransitionKind::Outro), StartOutcome::Completed);
    assert_eq!(*kinds.borrow(), vec![TransitionKind::Intro, TransitionKind::Outro]);
    Ok(())
}

#[test]
fn wrong_direction_is_ignored() -> Result<()> {
    let calls = Rc::new(Cell::new(0));
    let mut h = Harness::new(&TransitionConfig::default(), fade_registry(&calls));
    let element = h.tree.add_element(h.root, None);
    let mut fade = h.bind(element, TransitionDirective::named(Direction::Intro, "fade"));

    assert_eq!(fade.start(&h.tree, &h.env, TransitionKind::Outro), StartOutcome::Ignored);
    assert_eq!(fade.state(), TransitionState::Idle);
    assert_eq!(calls.get(), 0);
    Ok(())
}

#[test]
fn unbind_releases_slots_unless_tearing_down() -> Result<()> {
    let mut h = Harness::new(&TransitionConfig::default(), HandlerRegistry::new());
    let first = h.tree.add_element(h.root, None);
    let second = h.tree.add_element(h.root, None);

    let mut a = h.bind(first, TransitionDirective::named(Direction::Intro, "fade"));
    a.unbind(&mut h.tree);
    assert!(h.tree.element(first).slot(TransitionKind::Intro).is_none());

    let mut b = h.bind(second, TransitionDirective::named(Direction::Outro, "fade"));
    h.tree.element_mut(second).tearing_down = true;
    b.unbind(&mut h.tree);
    let slot = h.tree.element(second).slot(TransitionKind::Outro);
    assert_eq!(slot.map(|entry| entry.id), Some(b.id()));
    Ok(())
}

#[test]
fn rebinding_replaces_slot_occupant() -> Result<()> {
    let mut h = Harness::new(&TransitionConfig::default(), HandlerRegistry::new());
    let element = h.tree.add_element(h.root, None);

    let mut old = h.bind(element, TransitionDirective::named(Direction::Intro, "fade"));
    let new = h.bind(element, TransitionDirective::named(Direction::Intro, "fade"));

    // The stale transition must not clear its successor's slot.
    old.unbind(&mut h.tree);
    let slot = h.tree.element(element).slot(TransitionKind::Intro);
    assert_eq!(slot.map(|entry| entry.id), Some(new.id()));
    Ok(())
}
