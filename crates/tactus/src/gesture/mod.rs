//! Gesture instances and the contract every recognizer follows.
//!
//! A [`GestureInstance`] is a descriptor bound to one target. On every
//! tracker notification it:
//!
//! 1. resets on a force-reset marker, no matter where it came from;
//! 2. ignores input originating outside its target's subtree;
//! 3. cancels (if active) and stops while a `preventIf` gesture is active;
//! 4. narrows the pointer set to pointers that originated in its subtree;
//! 5. hands the rest to the recognizer selected by the descriptor's kind.

mod pan;
mod pinch;
mod point_move;
mod rotate;
mod tap;
mod wheel;

use crate::descriptor::{GestureDescriptor, GestureKind};
use crate::event::{GestureDetail, GestureEvent, GesturePhase, GestureSink};
use crate::options::{GestureOptions, GestureOptionsPatch};
use crate::registry::{GestureRegistry, InstanceId};
use std::fmt;
use tactus_core::{
    InputEvent, Point, PointerId, PointerInput, PointerSet, PointerSnapshot, TargetId, TargetTree,
    WheelInput,
};
use tracing::debug;

use pan::PanRecognizer;
use pinch::PinchRecognizer;
use point_move::MoveRecognizer;
use rotate::RotateRecognizer;
use tap::TapRecognizer;
use wheel::WheelRecognizer;

/// Variant-specific phase logic.
trait Recognizer: fmt::Debug {
    /// Whether the gesture is mid start/ongoing sequence.
    fn is_active(&self) -> bool;

    /// Pointer input originating inside the target.
    fn on_pointer(&mut self, cx: &mut GestureContext<'_>, input: &PointerInput);

    /// Wheel input originating inside the target.
    fn on_wheel(&mut self, _cx: &mut GestureContext<'_>, _input: &WheelInput) {}

    /// Input originating outside the target.
    fn on_foreign(&mut self, _cx: &mut GestureContext<'_>, _event: &InputEvent) {}

    /// Emit a cancel if active, then drop all recognition state.
    fn cancel(&mut self, cx: &mut GestureContext<'_>);
}

fn recognizer_for(kind: GestureKind) -> Box<dyn Recognizer> {
    match kind {
        GestureKind::Pan => Box::<PanRecognizer>::default(),
        GestureKind::Pinch => Box::<PinchRecognizer>::default(),
        GestureKind::Rotate => Box::<RotateRecognizer>::default(),
        GestureKind::Move => Box::<MoveRecognizer>::default(),
        GestureKind::Tap => Box::<TapRecognizer>::default(),
        GestureKind::TurnWheel => Box::<WheelRecognizer>::default(),
    }
}

/// Everything a recognizer may read or touch during one notification.
struct GestureContext<'a> {
    instance: InstanceId,
    target: TargetId,
    name: &'a str,
    options: &'a GestureOptions,
    source: &'a InputEvent,
    /// Pressed pointers that originated inside the target, in ID order.
    relevant: Vec<PointerSnapshot>,
    registry: &'a mut GestureRegistry,
    sink: &'a mut dyn GestureSink,
}

impl GestureContext<'_> {
    fn timestamp(&self) -> f64 {
        self.source.timestamp()
    }

    /// Relevant pointers that stay pressed after `lifted` goes away.
    fn remaining(&self, lifted: PointerId) -> Vec<PointerSnapshot> {
        self.relevant
            .iter()
            .filter(|s| s.id != lifted)
            .copied()
            .collect()
    }

    fn activate(&mut self) {
        if self.registry.register_active(self.target, self.instance, self.name) {
            debug!(gesture = self.name, target = %self.target, "gesture active");
        }
    }

    fn deactivate(&mut self) {
        if self.registry.unregister_active(self.target, self.instance) {
            debug!(gesture = self.name, target = %self.target, "gesture inactive");
        }
    }

    fn emit(&mut self, phase: Option<GesturePhase>, centroid: Point, detail: GestureDetail) {
        let event = GestureEvent {
            name: self.name.to_string(),
            phase,
            target: self.target,
            centroid,
            timestamp: self.timestamp(),
            source: *self.source,
            pointers: self.relevant.clone(),
            active_gestures: self.registry.active_names(self.target),
            prevent_default: self.options.prevent_default,
            stop_propagation: self.options.stop_propagation,
            detail,
        };
        self.sink.emit(event);
    }

    /// Register and emit a start.
    fn start(&mut self, centroid: Point, detail: GestureDetail) {
        self.activate();
        self.emit(Some(GesturePhase::Start), centroid, detail);
    }

    fn ongoing(&mut self, centroid: Point, detail: GestureDetail) {
        self.emit(Some(GesturePhase::Ongoing), centroid, detail);
    }

    /// Emit an end or cancel, then unregister.
    fn finish(&mut self, phase: GesturePhase, centroid: Point, detail: GestureDetail) {
        self.emit(Some(phase), centroid, detail);
        self.deactivate();
    }
}

/// End or cancel, depending on the phase of the terminating pointer input.
fn terminal_phase(input: &PointerInput) -> GesturePhase {
    if input.phase == tactus_core::PointerPhase::Cancel {
        GesturePhase::Cancel
    } else {
        GesturePhase::End
    }
}

fn centroid(pointers: &[PointerSnapshot]) -> Option<Point> {
    Point::centroid(pointers.iter().map(PointerSnapshot::position))
}

/// Twice the mean distance of the pointers from their centroid.
///
/// Equals the pair distance for two pointers; needs at least two.
fn spread(pointers: &[PointerSnapshot]) -> Option<f32> {
    if pointers.len() < 2 {
        return None;
    }
    let c = centroid(pointers)?;
    let sum: f32 = pointers.iter().map(|s| s.position().distance(&c)).sum();
    Some(2.0 * sum / pointers.len() as f32)
}

/// Seconds between two millisecond timestamps; zero when not increasing.
fn elapsed_secs(from: f64, to: f64) -> f32 {
    let dt = (to - from) / 1000.0;
    if dt > 0.0 {
        dt as f32
    } else {
        0.0
    }
}

/// A gesture descriptor bound to one target, with its own recognition state.
#[derive(Debug)]
pub struct GestureInstance {
    id: InstanceId,
    target: TargetId,
    descriptor: GestureDescriptor,
    recognizer: Box<dyn Recognizer>,
}

impl GestureInstance {
    /// Bind a copy of `descriptor` to `target`.
    #[must_use]
    pub fn new(id: InstanceId, descriptor: GestureDescriptor, target: TargetId) -> Self {
        Self {
            id,
            target,
            recognizer: recognizer_for(descriptor.kind),
            descriptor,
        }
    }

    /// Instance identity.
    #[must_use]
    pub const fn id(&self) -> InstanceId {
        self.id
    }

    /// Bound target.
    #[must_use]
    pub const fn target(&self) -> TargetId {
        self.target
    }

    /// Gesture name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Recognition strategy.
    #[must_use]
    pub const fn kind(&self) -> GestureKind {
        self.descriptor.kind
    }

    /// Current options.
    #[must_use]
    pub const fn options(&self) -> &GestureOptions {
        &self.descriptor.options
    }

    /// Whether the recognizer considers itself mid-gesture.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.recognizer.is_active()
    }

    /// Overwrite options in place; recognition state is kept.
    pub fn update_options(&mut self, patch: &GestureOptionsPatch) {
        patch.apply(&mut self.descriptor.options);
    }

    /// Process one tracker notification.
    pub fn handle(
        &mut self,
        pointers: &PointerSet,
        event: &InputEvent,
        tree: &dyn TargetTree,
        registry: &mut GestureRegistry,
        sink: &mut dyn GestureSink,
    ) {
        let target = self.target;
        let name = self.descriptor.name.as_str();
        let options = &self.descriptor.options;

        let inside = event.origin().is_some_and(|origin| tree.contains(target, origin));
        let suppressed = inside
            && !event.is_force_reset()
            && registry.any_active(
                target,
                options
                    .prevent_if
                    .iter()
                    .map(String::as_str)
                    .filter(|other| *other != name),
            );

        let mut cx = GestureContext {
            instance: self.id,
            target,
            name,
            options,
            source: event,
            relevant: pointers
                .iter()
                .filter(|s| tree.contains(target, s.origin))
                .copied()
                .collect(),
            registry,
            sink,
        };

        if event.is_force_reset() {
            self.recognizer.cancel(&mut cx);
            return;
        }
        if !inside {
            self.recognizer.on_foreign(&mut cx, event);
            return;
        }
        if suppressed {
            if self.recognizer.is_active() {
                debug!(gesture = name, target = %target, "gesture suppressed");
            }
            self.recognizer.cancel(&mut cx);
            return;
        }

        match event {
            InputEvent::Pointer(input) => self.recognizer.on_pointer(&mut cx, input),
            InputEvent::Wheel(input) => self.recognizer.on_wheel(&mut cx, input),
            InputEvent::Interrupt(_) => self.recognizer.cancel(&mut cx),
        }
    }
}
