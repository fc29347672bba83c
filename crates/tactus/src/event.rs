//! Gesture notifications and the sinks that receive them.

use crate::options::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use tactus_core::{InputEvent, Point, PointerSnapshot, TargetId};

/// Lifecycle stage of a multi-phase gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GesturePhase {
    /// Gesture started
    Start,
    /// Gesture in progress
    Ongoing,
    /// Gesture ended
    End,
    /// Gesture cancelled
    Cancel,
}

impl GesturePhase {
    /// Suffix appended to the gesture name in event names.
    #[must_use]
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Ongoing => "",
            Self::End => "End",
            Self::Cancel => "Cancel",
        }
    }

    /// Check if the gesture is over after this phase.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::End | Self::Cancel)
    }
}

/// Pan kinematics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanDetail {
    /// Centroid offset since the gesture started
    pub delta: Point,
    /// Centroid offset accumulated since the first activation
    pub total_delta: Point,
    /// Length of `delta`
    pub distance: f32,
    /// Delta over seconds elapsed since first contact (px/s)
    pub velocity: Point,
    /// Dominant direction of `delta`
    pub direction: Option<Direction>,
}

/// Pinch kinematics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinchDetail {
    /// Spread relative to the spread at activation
    pub scale: f32,
    /// Product of scales across restarts
    pub total_scale: f32,
    /// Current spread (px)
    pub distance: f32,
    /// Change of spread per second (px/s)
    pub velocity: f32,
}

/// Rotate kinematics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotateDetail {
    /// Rotation since activation (radians)
    pub rotation: f32,
    /// Sum of rotations across restarts (radians)
    pub total_rotation: f32,
    /// Current angle between the two tracked pointers (radians)
    pub angle: f32,
    /// Rotation per second (rad/s)
    pub velocity: f32,
}

/// Move kinematics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDetail {
    /// Centroid offset since the previous frame
    pub delta: Point,
    /// Centroid offset since the gesture started
    pub total_delta: Point,
    /// Whether the tracked pointer is hovering rather than pressed
    pub hover: bool,
}

/// Tap details.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TapDetail {
    /// Consecutive tap count (1 = single, 2 = double, ...)
    pub count: u32,
    /// Press duration (ms)
    pub duration: f64,
    /// Peak number of pointers during the press
    pub pointers: usize,
}

/// Wheel details, deltas in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelDetail {
    /// Horizontal delta of this event
    pub delta_x: f32,
    /// Vertical delta of this event
    pub delta_y: f32,
    /// Zoom delta of this event
    pub delta_z: f32,
    /// Horizontal delta accumulated over the current turn
    pub total_x: f32,
    /// Vertical delta accumulated over the current turn
    pub total_y: f32,
    /// Zoom delta accumulated over the current turn
    pub total_z: f32,
}

/// Variant-specific payload of a gesture event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GestureDetail {
    /// Pan
    Pan(PanDetail),
    /// Pinch
    Pinch(PinchDetail),
    /// Rotate
    Rotate(RotateDetail),
    /// Move
    Move(MoveDetail),
    /// Tap
    Tap(TapDetail),
    /// Wheel
    TurnWheel(WheelDetail),
}

/// A recognized gesture, delivered to the consumer bound to `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureEvent {
    /// Gesture name
    pub name: String,
    /// Phase, `None` for single-phase gestures
    pub phase: Option<GesturePhase>,
    /// Target the gesture is bound to
    pub target: TargetId,
    /// Centroid of the contributing pointers
    pub centroid: Point,
    /// Timestamp in milliseconds
    pub timestamp: f64,
    /// Input that produced this event
    pub source: InputEvent,
    /// Contributing pointers
    pub pointers: Vec<PointerSnapshot>,
    /// Gestures active on the target when the event was emitted
    pub active_gestures: BTreeSet<String>,
    /// Host should suppress the default action of `source`
    pub prevent_default: bool,
    /// Host should stop propagation of `source`
    pub stop_propagation: bool,
    /// Kinematics
    pub detail: GestureDetail,
}

impl GestureEvent {
    /// Event name: `<name>Start`, `<name>`, `<name>End`, `<name>Cancel`,
    /// or bare `<name>` for single-phase gestures.
    #[must_use]
    pub fn event_name(&self) -> String {
        match self.phase {
            Some(phase) => format!("{}{}", self.name, phase.suffix()),
            None => self.name.clone(),
        }
    }

    /// Pan kinematics, if this is a pan event.
    #[must_use]
    pub const fn pan(&self) -> Option<&PanDetail> {
        match &self.detail {
            GestureDetail::Pan(d) => Some(d),
            _ => None,
        }
    }

    /// Pinch kinematics, if this is a pinch event.
    #[must_use]
    pub const fn pinch(&self) -> Option<&PinchDetail> {
        match &self.detail {
            GestureDetail::Pinch(d) => Some(d),
            _ => None,
        }
    }

    /// Rotate kinematics, if this is a rotate event.
    #[must_use]
    pub const fn rotate(&self) -> Option<&RotateDetail> {
        match &self.detail {
            GestureDetail::Rotate(d) => Some(d),
            _ => None,
        }
    }

    /// Move kinematics, if this is a move event.
    #[must_use]
    pub const fn movement(&self) -> Option<&MoveDetail> {
        match &self.detail {
            GestureDetail::Move(d) => Some(d),
            _ => None,
        }
    }

    /// Tap details, if this is a tap event.
    #[must_use]
    pub const fn tap(&self) -> Option<&TapDetail> {
        match &self.detail {
            GestureDetail::Tap(d) => Some(d),
            _ => None,
        }
    }

    /// Wheel details, if this is a wheel event.
    #[must_use]
    pub const fn wheel(&self) -> Option<&WheelDetail> {
        match &self.detail {
            GestureDetail::TurnWheel(d) => Some(d),
            _ => None,
        }
    }
}

/// Receiver of gesture events.
///
/// Sinks run inside the tracker's dispatch and must not feed input back into
/// the runtime or register gestures from within [`emit`](Self::emit).
pub trait GestureSink {
    /// Receive one event.
    fn emit(&mut self, event: GestureEvent);
}

impl<F: FnMut(GestureEvent)> GestureSink for F {
    fn emit(&mut self, event: GestureEvent) {
        self(event);
    }
}

/// Sink that queues events for the host to drain after each input.
#[derive(Debug, Clone, Default)]
pub struct GestureQueue {
    events: VecDeque<GestureEvent>,
}

impl GestureQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take every queued event in emission order.
    pub fn drain(&mut self) -> Vec<GestureEvent> {
        self.events.drain(..).collect()
    }

    /// Take the queued events bound to `target`, leaving the rest.
    pub fn drain_target(&mut self, target: TargetId) -> Vec<GestureEvent> {
        let (taken, kept): (VecDeque<_>, VecDeque<_>) =
            self.events.drain(..).partition(|e| e.target == target);
        self.events = kept;
        taken.into()
    }
}

impl GestureSink for GestureQueue {
    fn emit(&mut self, event: GestureEvent) {
        self.events.push_back(event);
    }
}
