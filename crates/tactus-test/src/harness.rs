//! Scripted input for gesture tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tactus::{
    GestureCoordinator, GestureEvent, GestureOptionsPatch, GestureQueue, GestureRuntime,
    TrackerConfig,
};
use tactus_core::{
    InterruptReason, Point, PointerInput, PointerKind, TargetHierarchy, TargetId, WheelInput,
};

/// Test harness driving a runtime and a coordinator with scripted input.
///
/// Every input is stamped with the harness clock; advance it with
/// [`tick`](Self::tick). Emitted events are collected until taken.
pub struct Harness {
    runtime: GestureRuntime,
    coordinator: GestureCoordinator,
    queue: Rc<RefCell<GestureQueue>>,
    tree: Rc<RefCell<TargetHierarchy>>,
    positions: HashMap<u32, Point>,
    kind: PointerKind,
    clock: f64,
    events: Vec<GestureEvent>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    /// Root target every harness starts with.
    pub const ROOT: TargetId = TargetId(1);

    /// Create a harness with a single root target and touch input.
    pub fn new() -> Self {
        let mut runtime = GestureRuntime::new();
        let queue = Rc::new(RefCell::new(GestureQueue::new()));
        let tree = Rc::new(RefCell::new(TargetHierarchy::new()));
        let config = TrackerConfig {
            root: Some(Self::ROOT),
            ..TrackerConfig::default()
        };
        let coordinator = GestureCoordinator::new(&mut runtime, config, tree.clone(), queue.clone());
        Self {
            runtime,
            coordinator,
            queue,
            tree,
            positions: HashMap::new(),
            kind: PointerKind::Touch,
            clock: 0.0,
            events: Vec::new(),
        }
    }

    /// Add `child` below `parent` in the target tree.
    #[must_use]
    pub fn with_child(self, child: TargetId, parent: TargetId) -> Self {
        self.tree.borrow_mut().attach(child, parent);
        self
    }

    /// Pointer kind used by subsequent pointer input.
    #[must_use]
    pub const fn with_kind(mut self, kind: PointerKind) -> Self {
        self.kind = kind;
        self
    }

    // === Setup ===

    /// Register a gesture with its template options.
    ///
    /// # Panics
    ///
    /// Panics if the name is unknown.
    pub fn register(&mut self, name: &str, target: TargetId) -> &mut Self {
        self.coordinator
            .register(name, target, None)
            .unwrap_or_else(|e| panic!("register '{name}': {e}"));
        self
    }

    /// Register a gesture with option overrides.
    ///
    /// # Panics
    ///
    /// Panics if the name is unknown.
    pub fn register_with(
        &mut self,
        name: &str,
        target: TargetId,
        patch: &GestureOptionsPatch,
    ) -> &mut Self {
        self.coordinator
            .register(name, target, Some(patch))
            .unwrap_or_else(|e| panic!("register '{name}': {e}"));
        self
    }

    /// The coordinator, for calls the harness does not wrap.
    pub fn coordinator(&mut self) -> &mut GestureCoordinator {
        &mut self.coordinator
    }

    /// The runtime.
    pub fn runtime(&mut self) -> &mut GestureRuntime {
        &mut self.runtime
    }

    // === Input Simulation ===

    /// Advance the clock.
    pub fn tick(&mut self, ms: f64) -> &mut Self {
        self.clock += ms;
        self
    }

    /// Current clock value in milliseconds.
    pub const fn now(&self) -> f64 {
        self.clock
    }

    fn feed(&mut self, input: PointerInput) -> &mut Self {
        let input = input.with_kind(self.kind).at(self.clock);
        self.positions.insert(input.id.0, input.client);
        self.runtime
            .pointer(input)
            .unwrap_or_else(|e| panic!("pointer input: {e}"));
        self.collect()
    }

    fn collect(&mut self) -> &mut Self {
        let drained = self.queue.borrow_mut().drain();
        self.events.extend(drained);
        self
    }

    fn position(&self, id: u32) -> Point {
        self.positions.get(&id).copied().unwrap_or_default()
    }

    /// Press pointer `id` at `(x, y)` over `target`.
    pub fn down(&mut self, id: u32, x: f32, y: f32, target: TargetId) -> &mut Self {
        self.feed(PointerInput::down(id, Point::new(x, y), target))
    }

    /// Move pointer `id` to `(x, y)` over `target`.
    pub fn move_to(&mut self, id: u32, x: f32, y: f32, target: TargetId) -> &mut Self {
        self.feed(PointerInput::motion(id, Point::new(x, y), target))
    }

    /// Release pointer `id` where it last was.
    pub fn up(&mut self, id: u32, target: TargetId) -> &mut Self {
        let at = self.position(id);
        self.feed(PointerInput::up(id, at, target))
    }

    /// Cancel pointer `id` where it last was.
    pub fn cancel(&mut self, id: u32, target: TargetId) -> &mut Self {
        let at = self.position(id);
        self.feed(PointerInput::cancel(id, at, target))
    }

    /// Press, move in `steps` equal increments, release.
    pub fn drag(&mut self, id: u32, from: Point, to: Point, steps: u32, target: TargetId) -> &mut Self {
        self.down(id, from.x, from.y, target);
        let steps = steps.max(1);
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let at = from + (to - from) * t;
            self.tick(16.0).move_to(id, at.x, at.y, target);
        }
        self.tick(16.0).up(id, target)
    }

    /// Press and release without moving.
    pub fn tap(&mut self, id: u32, x: f32, y: f32, target: TargetId) -> &mut Self {
        self.down(id, x, y, target).tick(50.0).up(id, target)
    }

    /// Scroll by `(dx, dy)` pixels over `target`.
    pub fn wheel(&mut self, dx: f32, dy: f32, target: TargetId) -> &mut Self {
        self.wheel_input(WheelInput::new(dx, dy, Point::ORIGIN, target))
    }

    /// Feed a prepared wheel input, stamped with the clock.
    pub fn wheel_input(&mut self, input: WheelInput) -> &mut Self {
        self.runtime
            .wheel(input.at(self.clock))
            .unwrap_or_else(|e| panic!("wheel input: {e}"));
        self.collect()
    }

    /// Abort the current interaction.
    pub fn interrupt(&mut self) -> &mut Self {
        self.runtime
            .interrupt(InterruptReason::Explicit, self.clock)
            .unwrap_or_else(|e| panic!("interrupt: {e}"));
        self.positions.clear();
        self.collect()
    }

    // === Queries ===

    /// Events collected since the last take.
    pub fn events(&self) -> &[GestureEvent] {
        &self.events
    }

    /// Take the collected events.
    pub fn take_events(&mut self) -> Vec<GestureEvent> {
        std::mem::take(&mut self.events)
    }

    /// Event names collected since the last take.
    pub fn event_names(&self) -> Vec<String> {
        self.events.iter().map(GestureEvent::event_name).collect()
    }

    /// Last collected event with the given event name.
    pub fn last(&self, event_name: &str) -> Option<&GestureEvent> {
        self.events
            .iter()
            .rev()
            .find(|e| e.event_name() == event_name)
    }

    // === Assertions ===

    /// Assert the exact sequence of event names collected, then clear them.
    ///
    /// # Panics
    ///
    /// Panics if the sequence differs.
    #[track_caller]
    pub fn assert_emitted(&mut self, expected: &[&str]) -> &mut Self {
        let names = self.event_names();
        assert_eq!(names, expected, "unexpected gesture events");
        self.events.clear();
        self
    }

    /// Assert that nothing was emitted since the last take.
    ///
    /// # Panics
    ///
    /// Panics if any event was collected.
    #[track_caller]
    pub fn assert_none(&mut self) -> &mut Self {
        let names = self.event_names();
        assert!(names.is_empty(), "Expected no gesture events, got {names:?}");
        self
    }

    /// Assert whether `name` is mid-gesture on `target`.
    ///
    /// # Panics
    ///
    /// Panics if the state differs.
    #[track_caller]
    pub fn assert_active(&mut self, name: &str, target: TargetId, expected: bool) -> &mut Self {
        let active = self.coordinator.is_active(name, target);
        assert_eq!(
            active, expected,
            "Expected '{name}' on {target} to be {}",
            if expected { "active" } else { "inactive" }
        );
        self
    }
}
