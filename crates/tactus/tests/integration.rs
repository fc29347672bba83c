//! End-to-end gesture recognition through the runtime and coordinator.

use std::cell::RefCell;
use std::rc::Rc;
use tactus::{
    Direction, GestureCoordinator, GestureError, GestureOptionsPatch, GestureQueue,
    GestureRuntime, TrackerConfig,
};
use tactus_core::{Point, PointerInput, PointerKind, TargetHierarchy, TargetId, TargetTree};
use tactus_test::{init_tracing, Harness};

const ROOT: TargetId = Harness::ROOT;
const PANEL: TargetId = TargetId(2);
const BUTTON: TargetId = TargetId(3);

fn nested() -> Harness {
    init_tracing();
    Harness::new()
        .with_child(PANEL, ROOT)
        .with_child(BUTTON, PANEL)
}

#[test]
fn test_horizontal_swipe() {
    let mut harness = nested();
    harness.register_with(
        "pan",
        ROOT,
        &GestureOptionsPatch::default()
            .with_threshold(10.0)
            .with_directions(&[Direction::Left, Direction::Right]),
    );

    harness.down(1, 0.0, 0.0, BUTTON).tick(16.0).move_to(1, 20.0, 0.0, BUTTON);
    let start = harness.last("panStart").unwrap().clone();
    let detail = start.pan().unwrap();
    assert_eq!(detail.delta, Point::new(20.0, 0.0));
    assert_eq!(detail.direction, Some(Direction::Right));
    assert_eq!(start.target, ROOT);
    assert!(start.active_gestures.contains("pan"));

    harness.tick(16.0).up(1, BUTTON).assert_emitted(&["panStart", "panEnd"]);
    harness.assert_active("pan", ROOT, false);
}

#[test]
fn test_vertical_motion_does_not_swipe() {
    let mut harness = nested();
    harness.register_with(
        "pan",
        ROOT,
        &GestureOptionsPatch::default().with_directions(&[Direction::Left, Direction::Right]),
    );
    harness
        .drag(1, Point::new(0.0, 0.0), Point::new(0.0, 80.0), 4, PANEL)
        .assert_none();
}

#[test]
fn test_gestures_on_sibling_targets_are_independent() {
    init_tracing();
    let mut harness = Harness::new()
        .with_child(PANEL, ROOT)
        .with_child(BUTTON, ROOT);
    harness.register("tap", PANEL).register("tap", BUTTON);

    harness.tap(1, 0.0, 0.0, BUTTON);
    let events = harness.take_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].target, BUTTON);
}

#[test]
fn test_pinch_zoom_with_finger_lift() {
    let mut harness = nested();
    harness.register("pinch", ROOT);

    harness
        .down(1, 0.0, 0.0, PANEL)
        .down(2, 100.0, 0.0, PANEL)
        .tick(16.0)
        .move_to(2, 150.0, 0.0, PANEL)
        .tick(16.0)
        .up(2, PANEL)
        .tick(16.0)
        .down(2, 150.0, 0.0, PANEL)
        .tick(16.0)
        .move_to(2, 225.0, 0.0, PANEL);

    let last = harness.last("pinch").unwrap().pinch().copied().unwrap();
    assert!((last.scale - 1.5).abs() < 1e-4);
    assert!((last.total_scale - 2.25).abs() < 1e-4);
    harness.assert_emitted(&["pinchStart", "pinch", "pinchEnd", "pinchStart", "pinch"]);
}

#[test]
fn test_pan_yields_to_pinch() {
    let mut harness = nested();
    harness.register("pinch", ROOT).register_with(
        "pan",
        ROOT,
        &GestureOptionsPatch::default()
            .with_prevent_if(&["pinch"])
            .with_pointers(1, 2),
    );

    harness
        .down(1, 0.0, 0.0, ROOT)
        .down(2, 100.0, 0.0, ROOT)
        .tick(16.0)
        .move_to(1, -30.0, 0.0, ROOT)
        .move_to(2, 130.0, 0.0, ROOT);
    assert!(harness.event_names().iter().all(|n| n.starts_with("pinch")));
    harness.assert_active("pinch", ROOT, true).assert_active("pan", ROOT, false);
}

#[test]
fn test_interrupt_cancels_every_active_gesture() {
    let mut harness = nested();
    harness.register("pan", ROOT).register("rotate", ROOT).register("tap", ROOT);

    harness
        .down(1, 0.0, 0.0, ROOT)
        .down(2, 100.0, 0.0, ROOT)
        .tick(16.0)
        .move_to(1, 0.0, 40.0, ROOT);
    harness.take_events();

    harness.interrupt();
    let mut names = harness.event_names();
    names.sort();
    assert_eq!(names, vec!["panCancel", "rotateCancel"]);
    assert!(harness.runtime().snapshot_all().unwrap().is_empty());
    assert!(harness.runtime().registry().borrow().is_empty());
}

#[test]
fn test_interrupt_without_pointers_resets_silently() {
    let mut harness = nested();
    harness.register("pan", ROOT).interrupt().assert_none();

    harness
        .drag(1, Point::new(0.0, 0.0), Point::new(40.0, 0.0), 2, ROOT)
        .assert_emitted(&["panStart", "pan", "panEnd"]);
}

#[test]
fn test_interrupt_cancels_hover_without_pressed_pointers() {
    init_tracing();
    let mut harness = Harness::new()
        .with_child(PANEL, ROOT)
        .with_kind(PointerKind::Mouse);
    harness.register("move", PANEL).register("pan", PANEL);

    harness.move_to(1, 5.0, 5.0, PANEL).assert_emitted(&["moveStart"]);
    assert!(harness.runtime().snapshot_all().unwrap().is_empty());
    harness.assert_active("move", PANEL, true);

    harness.interrupt().assert_emitted(&["moveCancel"]);
    harness.assert_active("move", PANEL, false);
    assert!(harness.runtime().registry().borrow().is_empty());

    harness.interrupt().assert_none();
}

#[test]
fn test_second_hand_on_sibling_keeps_move_alive() {
    init_tracing();
    let mut harness = Harness::new()
        .with_child(PANEL, ROOT)
        .with_child(BUTTON, ROOT);
    harness.register("move", PANEL);

    harness
        .down(1, 0.0, 0.0, PANEL)
        .move_to(1, 3.0, 0.0, PANEL)
        .down(2, 300.0, 0.0, BUTTON)
        .move_to(2, 320.0, 0.0, BUTTON)
        .move_to(1, 6.0, 0.0, PANEL)
        .up(1, PANEL)
        .assert_emitted(&["moveStart", "move", "moveEnd"]);
}

#[test]
fn test_double_tap() {
    let mut harness = nested();
    harness.register("tap", ROOT);
    harness
        .tap(1, 10.0, 10.0, BUTTON)
        .tick(100.0)
        .tap(1, 12.0, 10.0, BUTTON);

    let counts: Vec<u32> = harness
        .take_events()
        .iter()
        .map(|e| e.tap().unwrap().count)
        .collect();
    assert_eq!(counts, vec![1, 2]);
}

#[test]
fn test_mouse_hover_tracking() {
    init_tracing();
    let mut harness = Harness::new()
        .with_child(PANEL, ROOT)
        .with_kind(PointerKind::Mouse);
    harness.register("move", PANEL);

    harness
        .move_to(1, 5.0, 5.0, PANEL)
        .tick(16.0)
        .move_to(1, 9.0, 5.0, PANEL)
        .tick(16.0)
        .move_to(1, 50.0, 5.0, ROOT);
    harness.assert_emitted(&["moveStart", "move", "moveEnd"]);
}

#[test]
fn test_wheel_turns() {
    let mut harness = nested();
    harness.register("wheel", ROOT);
    harness
        .wheel(0.0, 10.0, BUTTON)
        .tick(50.0)
        .wheel(0.0, 10.0, BUTTON)
        .tick(1000.0)
        .wheel(0.0, 10.0, BUTTON);

    let totals: Vec<f32> = harness
        .take_events()
        .iter()
        .map(|e| e.wheel().unwrap().total_y)
        .collect();
    assert_eq!(totals, vec![10.0, 20.0, 10.0]);
}

#[test]
fn test_manifest_defined_gesture() {
    let mut harness = nested();
    harness
        .coordinator()
        .load_manifest_yaml(
            "gestures:\n  - name: swipe\n    kind: pan\n    threshold: 50\n    directions: [left]\n",
        )
        .unwrap();
    harness.register("swipe", ROOT);

    harness
        .drag(1, Point::new(100.0, 0.0), Point::new(70.0, 0.0), 1, ROOT)
        .assert_none()
        .drag(1, Point::new(100.0, 0.0), Point::new(20.0, 0.0), 1, ROOT)
        .assert_emitted(&["swipeStart", "swipeEnd"]);
}

#[test]
fn test_runtime_must_be_initialized() {
    let runtime = GestureRuntime::new();
    let err = runtime
        .pointer(PointerInput::down(1, Point::ORIGIN, ROOT))
        .unwrap_err();
    assert!(matches!(err, GestureError::Uninitialized(_)));
    assert_eq!(err.to_string(), "pointer tracker used before initialization");
}

#[test]
fn test_events_serialize_for_hosts() {
    let mut runtime = GestureRuntime::new();
    let queue = Rc::new(RefCell::new(GestureQueue::new()));
    let tree: Rc<dyn TargetTree> = Rc::new(TargetHierarchy::new());
    let mut coordinator =
        GestureCoordinator::new(&mut runtime, TrackerConfig::default(), tree, queue.clone());
    coordinator.register("tap", ROOT, None).unwrap();

    runtime.pointer(PointerInput::down(1, Point::new(3.0, 4.0), ROOT)).unwrap();
    runtime.pointer(PointerInput::up(1, Point::new(3.0, 4.0), ROOT)).unwrap();

    let events = queue.borrow_mut().drain();
    let json = serde_json::to_value(&events[0]).unwrap();
    assert_eq!(json["name"], "tap");
    assert_eq!(json["detail"]["kind"], "tap");
    assert_eq!(json["detail"]["count"], 1);
    assert_eq!(json["source"]["type"], "pointer");
}
