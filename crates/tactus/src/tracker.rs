//! Live pointer tracking and fan-out to subscribers.
//!
//! The tracker owns the set of pressed pointers. Every input ends with each
//! subscriber being called once, synchronously, with the current set and
//! the input. A released or cancelled pointer is still in the set during
//! that call and is removed right after it.

use crate::error::CaptureError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tactus_core::{
    InputEvent, InterruptInput, Point, PointerId, PointerInput, PointerKind, PointerPhase,
    PointerSet, PointerSnapshot, Size, TargetId, WheelInput,
};
use tracing::trace;

/// Callback invoked for every tracked input.
pub type PointerHandler = Box<dyn FnMut(&PointerSet, &InputEvent)>;

/// Handle returned by [`PointerTracker::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Host listener settings.
///
/// The tracker does not attach listeners itself; the host adapter reads
/// these values when wiring the platform's input source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerConfig {
    /// Surface the listeners are attached to
    pub root: Option<TargetId>,
    /// Input policy applied to the root (CSS `touch-action` equivalent)
    pub touch_action: String,
    /// Register listeners as passive
    pub passive: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            root: None,
            touch_action: "none".to_string(),
            passive: false,
        }
    }
}

/// Platform pointer capture.
pub trait PointerCapture {
    /// Route further input of `pointer` to `target`.
    fn capture(&mut self, pointer: PointerId, target: TargetId) -> Result<(), CaptureError>;

    /// Stop routing input of `pointer` to `target`.
    fn release(&mut self, pointer: PointerId, target: TargetId) -> Result<(), CaptureError>;
}

/// Capture collaborator for hosts without pointer capture.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn capture(&mut self, _pointer: PointerId, _target: TargetId) -> Result<(), CaptureError> {
        Ok(())
    }

    fn release(&mut self, _pointer: PointerId, _target: TargetId) -> Result<(), CaptureError> {
        Ok(())
    }
}

/// Owner of the active pointer set.
pub struct PointerTracker {
    config: TrackerConfig,
    pointers: PointerSet,
    subscribers: Vec<(SubscriptionId, PointerHandler)>,
    next_subscription: u64,
    capture: Box<dyn PointerCapture>,
}

impl fmt::Debug for PointerTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerTracker")
            .field("config", &self.config)
            .field("pointers", &self.pointers)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl PointerTracker {
    /// Create a tracker without pointer capture.
    #[must_use]
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_capture(config, Box::new(NoCapture))
    }

    /// Create a tracker with a capture collaborator.
    #[must_use]
    pub fn with_capture(config: TrackerConfig, capture: Box<dyn PointerCapture>) -> Self {
        Self {
            config,
            pointers: PointerSet::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
            capture,
        }
    }

    /// Listener settings this tracker was created with.
    #[must_use]
    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Add a subscriber.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&PointerSet, &InputEvent) + 'static,
    {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Number of subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Copy of the current pointer set.
    #[must_use]
    pub fn snapshot_all(&self) -> PointerSet {
        self.pointers.clone()
    }

    /// Number of pressed pointers.
    #[must_use]
    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// Route any input to its handler.
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pointer(input) => self.handle_pointer(input),
            InputEvent::Wheel(input) => self.handle_wheel(input),
            InputEvent::Interrupt(input) => self.interrupt(input),
        }
    }

    /// Process one pointer input.
    pub fn handle_pointer(&mut self, mut input: PointerInput) {
        // Only the tracker may mark a reset.
        input.force_reset = false;
        let snapshot = PointerSnapshot::from_input(&input);

        match input.phase {
            PointerPhase::Down => {
                self.pointers.insert(snapshot);
                if let Err(err) = self.capture.capture(input.id, input.origin) {
                    trace!(%err, pointer = input.id.0, "pointer capture failed");
                }
                self.notify(&InputEvent::Pointer(input));
            }
            PointerPhase::Move => {
                if self.pointers.contains(input.id) {
                    self.pointers.insert(snapshot);
                }
                self.notify(&InputEvent::Pointer(input));
            }
            PointerPhase::Up | PointerPhase::Cancel => {
                if let Err(err) = self.capture.release(input.id, input.origin) {
                    trace!(%err, pointer = input.id.0, "pointer release failed");
                }
                if self.pointers.contains(input.id) {
                    self.pointers.insert(snapshot);
                } else {
                    trace!(pointer = input.id.0, "release of untracked pointer");
                }
                self.notify(&InputEvent::Pointer(input));
                self.pointers.remove(input.id);
            }
        }
    }

    /// Forward one wheel input, normalized to pixels.
    pub fn handle_wheel(&mut self, input: WheelInput) {
        self.notify(&InputEvent::Wheel(input.normalized()));
    }

    /// Cancel everything.
    ///
    /// Subscribers always receive one synthetic cancel marked as a force
    /// reset, even when no pointer is pressed. The set is empty afterwards.
    pub fn interrupt(&mut self, interrupt: InterruptInput) {
        let representative = self.pointers.first().copied();
        for snapshot in self.pointers.values_mut() {
            snapshot.phase = PointerPhase::Cancel;
            snapshot.timestamp = interrupt.timestamp;
        }

        let synthetic = representative.map_or_else(
            || PointerInput {
                id: PointerId(0),
                kind: PointerKind::default(),
                phase: PointerPhase::Cancel,
                client: Point::ORIGIN,
                page: Point::ORIGIN,
                size: Size::new(1.0, 1.0),
                pressure: 0.0,
                is_primary: true,
                timestamp: interrupt.timestamp,
                origin: self.config.root.unwrap_or_default(),
                force_reset: true,
            },
            |rep| PointerInput {
                id: rep.id,
                kind: rep.kind,
                phase: PointerPhase::Cancel,
                client: rep.client,
                page: rep.page,
                size: rep.size,
                pressure: 0.0,
                is_primary: rep.is_primary,
                timestamp: interrupt.timestamp,
                origin: rep.origin,
                force_reset: true,
            },
        );

        trace!(
            pointers = self.pointers.len(),
            reason = ?interrupt.reason,
            "interrupt"
        );
        self.notify(&InputEvent::Pointer(synthetic));
        self.pointers.clear();
    }

    fn notify(&mut self, event: &InputEvent) {
        for (_, handler) in &mut self.subscribers {
            handler(&self.pointers, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(Vec<u32>, InputEvent)>>>;

    fn recording(tracker: &mut PointerTracker) -> Log {
        let log: Log = Rc::default();
        let sink = Rc::clone(&log);
        tracker.subscribe(move |set, event| {
            let ids = set.iter().map(|s| s.id.0).collect();
            sink.borrow_mut().push((ids, *event));
        });
        log
    }

    fn at(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    const T: TargetId = TargetId(1);

    #[derive(Default)]
    struct FailingCapture {
        attempts: Rc<RefCell<u32>>,
    }

    impl PointerCapture for FailingCapture {
        fn capture(&mut self, _: PointerId, target: TargetId) -> Result<(), CaptureError> {
            *self.attempts.borrow_mut() += 1;
            Err(CaptureError { target })
        }

        fn release(&mut self, _: PointerId, target: TargetId) -> Result<(), CaptureError> {
            *self.attempts.borrow_mut() += 1;
            Err(CaptureError { target })
        }
    }

    #[test]
    fn test_down_inserts_and_notifies() {
        let mut tracker = PointerTracker::default();
        let log = recording(&mut tracker);

        tracker.handle_pointer(PointerInput::down(1, at(0.0, 0.0), T));

        assert_eq!(tracker.pointer_count(), 1);
        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].0, vec![1]);
    }

    #[test]
    fn test_up_visible_before_removal() {
        let mut tracker = PointerTracker::default();
        let log = recording(&mut tracker);

        tracker.handle_pointer(PointerInput::down(1, at(0.0, 0.0), T));
        tracker.handle_pointer(PointerInput::up(1, at(5.0, 0.0), T));

        assert_eq!(tracker.pointer_count(), 0);
        let log = log.borrow();
        assert_eq!(log[1].0, vec![1], "released pointer must be visible to subscribers");
    }

    #[test]
    fn test_up_replaces_snapshot_one_last_time() {
        let mut tracker = PointerTracker::default();
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        tracker.subscribe(move |set, event| {
            if event.as_pointer().is_some_and(|p| p.phase == PointerPhase::Up) {
                *sink.borrow_mut() = set.get(PointerId(1)).map(|s| (s.client, s.phase));
            }
        });

        tracker.handle_pointer(PointerInput::down(1, at(0.0, 0.0), T));
        tracker.handle_pointer(PointerInput::up(1, at(7.0, 3.0), T));

        assert_eq!(*seen.borrow(), Some((at(7.0, 3.0), PointerPhase::Up)));
    }

    #[test]
    fn test_move_unknown_pointer_is_forwarded_not_tracked() {
        let mut tracker = PointerTracker::default();
        let log = recording(&mut tracker);

        tracker.handle_pointer(PointerInput::motion(4, at(1.0, 1.0), T));

        assert_eq!(tracker.pointer_count(), 0);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_snapshot_all_is_a_copy() {
        let mut tracker = PointerTracker::default();
        tracker.handle_pointer(PointerInput::down(1, at(0.0, 0.0), T));

        let mut copy = tracker.snapshot_all();
        copy.clear();

        assert_eq!(tracker.pointer_count(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let mut tracker = PointerTracker::default();
        let log = recording(&mut tracker);
        let other = tracker.subscribe(|_, _| {});
        assert_eq!(tracker.subscriber_count(), 2);

        assert!(tracker.unsubscribe(other));
        assert!(!tracker.unsubscribe(other));

        tracker.handle_pointer(PointerInput::down(1, at(0.0, 0.0), T));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_interrupt_without_pointers_still_notifies() {
        let mut tracker = PointerTracker::new(TrackerConfig {
            root: Some(TargetId(9)),
            ..TrackerConfig::default()
        });
        let log = recording(&mut tracker);

        tracker.interrupt(InterruptInput {
            timestamp: 12.0,
            ..InterruptInput::default()
        });

        let log = log.borrow();
        assert_eq!(log.len(), 1);
        let synthetic = log[0].1.as_pointer().copied().unwrap();
        assert!(synthetic.force_reset);
        assert_eq!(synthetic.phase, PointerPhase::Cancel);
        assert_eq!(synthetic.origin, TargetId(9));
        assert_eq!(synthetic.timestamp, 12.0);
    }

    #[test]
    fn test_interrupt_stamps_and_clears() {
        let mut tracker = PointerTracker::default();
        let phases = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&phases);
        tracker.subscribe(move |set, event| {
            if event.is_force_reset() {
                sink.borrow_mut().extend(set.iter().map(|s| s.phase));
            }
        });

        tracker.handle_pointer(PointerInput::down(1, at(0.0, 0.0), T));
        tracker.handle_pointer(PointerInput::down(2, at(10.0, 0.0), T));
        tracker.interrupt(InterruptInput::default());

        assert_eq!(*phases.borrow(), vec![PointerPhase::Cancel, PointerPhase::Cancel]);
        assert_eq!(tracker.pointer_count(), 0);
    }

    #[test]
    fn test_interrupt_borrows_representative_geometry() {
        let mut tracker = PointerTracker::default();
        let log = recording(&mut tracker);

        tracker.handle_pointer(PointerInput::down(3, at(4.0, 5.0), TargetId(2)));
        tracker.interrupt(InterruptInput::default());

        let synthetic = log.borrow()[1].1.as_pointer().copied().unwrap();
        assert_eq!(synthetic.id, PointerId(3));
        assert_eq!(synthetic.client, at(4.0, 5.0));
        assert_eq!(synthetic.origin, TargetId(2));
    }

    #[test]
    fn test_host_cannot_forge_force_reset() {
        let mut tracker = PointerTracker::default();
        let log = recording(&mut tracker);

        let mut forged = PointerInput::cancel(1, at(0.0, 0.0), T);
        forged.force_reset = true;
        tracker.handle_pointer(forged);

        assert!(!log.borrow()[0].1.is_force_reset());
    }

    #[test]
    fn test_capture_failure_is_ignored() {
        let attempts = Rc::new(RefCell::new(0));
        let capture = FailingCapture {
            attempts: Rc::clone(&attempts),
        };
        let mut tracker = PointerTracker::with_capture(TrackerConfig::default(), Box::new(capture));

        tracker.handle_pointer(PointerInput::down(1, at(0.0, 0.0), T));
        tracker.handle_pointer(PointerInput::up(1, at(0.0, 0.0), T));

        assert_eq!(*attempts.borrow(), 2);
        assert_eq!(tracker.pointer_count(), 0);
    }

    #[test]
    fn test_wheel_is_normalized_and_keeps_pointers() {
        let mut tracker = PointerTracker::default();
        let log = recording(&mut tracker);

        tracker.handle_pointer(PointerInput::down(1, at(0.0, 0.0), T));
        tracker.handle_wheel(
            WheelInput::new(0.0, 2.0, at(0.0, 0.0), T).with_mode(tactus_core::DeltaMode::Line),
        );

        let log = log.borrow();
        assert_eq!(log[1].0, vec![1]);
        assert_eq!(log[1].1.as_wheel().map(|w| w.delta_y), Some(32.0));
    }

    #[test]
    fn test_tracker_config_default() {
        let config = TrackerConfig::default();
        assert_eq!(config.touch_action, "none");
        assert!(!config.passive);
        assert!(config.root.is_none());
    }

    #[derive(Debug, Clone)]
    enum Step {
        Down(u32),
        Move(u32),
        Up(u32),
        Cancel(u32),
        Interrupt,
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0u32..4).prop_map(Step::Down),
            (0u32..4).prop_map(Step::Move),
            (0u32..4).prop_map(Step::Up),
            (0u32..4).prop_map(Step::Cancel),
            Just(Step::Interrupt),
        ]
    }

    proptest! {
        #[test]
        fn prop_released_pointer_never_remains(steps in proptest::collection::vec(step(), 1..40)) {
            let mut tracker = PointerTracker::default();
            for s in steps {
                match s {
                    Step::Down(id) => tracker.handle_pointer(PointerInput::down(id, at(0.0, 0.0), T)),
                    Step::Move(id) => tracker.handle_pointer(PointerInput::motion(id, at(1.0, 1.0), T)),
                    Step::Up(id) => {
                        tracker.handle_pointer(PointerInput::up(id, at(1.0, 1.0), T));
                        prop_assert!(!tracker.snapshot_all().contains(PointerId(id)));
                    }
                    Step::Cancel(id) => {
                        tracker.handle_pointer(PointerInput::cancel(id, at(1.0, 1.0), T));
                        prop_assert!(!tracker.snapshot_all().contains(PointerId(id)));
                    }
                    Step::Interrupt => {
                        tracker.interrupt(InterruptInput::default());
                        prop_assert_eq!(tracker.pointer_count(), 0);
                    }
                }
            }
        }
    }
}
