//! Pointer input and the normalized pointer snapshots derived from it.

use crate::geometry::{Point, Size};
use crate::target::TargetId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pointer identifier assigned by the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct PointerId(pub u32);

/// Type of pointer device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    /// Mouse pointer
    #[default]
    Mouse,
    /// Touch pointer
    Touch,
    /// Pen/stylus pointer
    Pen,
}

impl PointerKind {
    /// Check if this is a mouse pointer.
    #[must_use]
    pub const fn is_mouse(&self) -> bool {
        matches!(self, Self::Mouse)
    }

    /// Check if this is a touch pointer.
    #[must_use]
    pub const fn is_touch(&self) -> bool {
        matches!(self, Self::Touch)
    }
}

/// Lifecycle stage carried by a pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Pointer pressed
    Down,
    /// Pointer moved (pressed or hovering)
    Move,
    /// Pointer released
    Up,
    /// Pointer cancelled by the platform
    Cancel,
}

impl PointerPhase {
    /// Check if this phase removes the pointer from the active set.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Up | Self::Cancel)
    }
}

/// Raw pointer input as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerInput {
    /// Pointer ID
    pub id: PointerId,
    /// Device kind
    pub kind: PointerKind,
    /// Lifecycle stage
    pub phase: PointerPhase,
    /// Viewport coordinates
    pub client: Point,
    /// Document coordinates
    pub page: Point,
    /// Contact size
    pub size: Size,
    /// Pressure as reported by the device
    pub pressure: f32,
    /// Is primary pointer
    pub is_primary: bool,
    /// Timestamp in milliseconds
    pub timestamp: f64,
    /// Target the input originated from
    pub origin: TargetId,
    /// Set on the synthetic cancel produced by an interrupt
    #[serde(default)]
    pub force_reset: bool,
}

impl PointerInput {
    /// Create a pointer input at `position` with document coordinates equal
    /// to viewport coordinates.
    #[must_use]
    pub fn new(id: u32, phase: PointerPhase, position: Point, origin: TargetId) -> Self {
        Self {
            id: PointerId(id),
            kind: PointerKind::Touch,
            phase,
            client: position,
            page: position,
            size: Size::new(1.0, 1.0),
            pressure: if phase == PointerPhase::Up { 0.0 } else { 0.5 },
            is_primary: true,
            timestamp: 0.0,
            origin,
            force_reset: false,
        }
    }

    /// Pointer pressed.
    #[must_use]
    pub fn down(id: u32, position: Point, origin: TargetId) -> Self {
        Self::new(id, PointerPhase::Down, position, origin)
    }

    /// Pointer moved.
    #[must_use]
    pub fn motion(id: u32, position: Point, origin: TargetId) -> Self {
        Self::new(id, PointerPhase::Move, position, origin)
    }

    /// Pointer released.
    #[must_use]
    pub fn up(id: u32, position: Point, origin: TargetId) -> Self {
        Self::new(id, PointerPhase::Up, position, origin)
    }

    /// Pointer cancelled.
    #[must_use]
    pub fn cancel(id: u32, position: Point, origin: TargetId) -> Self {
        Self::new(id, PointerPhase::Cancel, position, origin)
    }

    /// Set the timestamp.
    #[must_use]
    pub const fn at(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the device kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: PointerKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the pressure.
    #[must_use]
    pub const fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = pressure;
        self
    }

    /// Set the contact size.
    #[must_use]
    pub const fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Set the primary flag.
    #[must_use]
    pub const fn primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }
}

/// Unit of a wheel delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeltaMode {
    /// Pixels
    #[default]
    Pixel,
    /// Lines of text
    Line,
    /// Pages
    Page,
}

impl DeltaMode {
    /// Pixels per line used when normalizing line deltas.
    pub const LINE_HEIGHT: f32 = 16.0;
    /// Pixels per page used when normalizing page deltas.
    pub const PAGE_HEIGHT: f32 = 800.0;

    /// Multiplier converting a delta in this unit to pixels.
    #[must_use]
    pub const fn pixel_factor(&self) -> f32 {
        match self {
            Self::Pixel => 1.0,
            Self::Line => Self::LINE_HEIGHT,
            Self::Page => Self::PAGE_HEIGHT,
        }
    }
}

/// Scroll/zoom input from the wheel channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelInput {
    /// Horizontal delta
    pub delta_x: f32,
    /// Vertical delta
    pub delta_y: f32,
    /// Depth (zoom) delta
    pub delta_z: f32,
    /// Unit of the deltas
    #[serde(default)]
    pub mode: DeltaMode,
    /// Pointer position in viewport coordinates
    pub position: Point,
    /// Timestamp in milliseconds
    pub timestamp: f64,
    /// Target the input originated from
    pub origin: TargetId,
}

impl WheelInput {
    /// Create a pixel-mode wheel input.
    #[must_use]
    pub const fn new(delta_x: f32, delta_y: f32, position: Point, origin: TargetId) -> Self {
        Self {
            delta_x,
            delta_y,
            delta_z: 0.0,
            mode: DeltaMode::Pixel,
            position,
            timestamp: 0.0,
            origin,
        }
    }

    /// Set the timestamp.
    #[must_use]
    pub const fn at(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the depth (zoom) delta.
    #[must_use]
    pub const fn with_zoom(mut self, delta_z: f32) -> Self {
        self.delta_z = delta_z;
        self
    }

    /// Set the delta unit.
    #[must_use]
    pub const fn with_mode(mut self, mode: DeltaMode) -> Self {
        self.mode = mode;
        self
    }

    /// Copy of this input with all deltas converted to pixels.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let factor = self.mode.pixel_factor();
        Self {
            delta_x: self.delta_x * factor,
            delta_y: self.delta_y * factor,
            delta_z: self.delta_z * factor,
            mode: DeltaMode::Pixel,
            ..*self
        }
    }
}

/// Why an interaction was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum InterruptReason {
    /// The host surface lost focus
    #[default]
    FocusLost,
    /// The host asked for an explicit reset
    Explicit,
}

/// Out-of-band interrupt signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct InterruptInput {
    /// Timestamp in milliseconds
    pub timestamp: f64,
    /// Why the interrupt happened
    pub reason: InterruptReason,
}

/// Everything the pointer tracker consumes and forwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    /// Pointer lifecycle input
    Pointer(PointerInput),
    /// Wheel input
    Wheel(WheelInput),
    /// Interrupt signal
    Interrupt(InterruptInput),
}

impl InputEvent {
    /// Timestamp in milliseconds.
    #[must_use]
    pub const fn timestamp(&self) -> f64 {
        match self {
            Self::Pointer(p) => p.timestamp,
            Self::Wheel(w) => w.timestamp,
            Self::Interrupt(i) => i.timestamp,
        }
    }

    /// Target the input originated from, if any.
    #[must_use]
    pub const fn origin(&self) -> Option<TargetId> {
        match self {
            Self::Pointer(p) => Some(p.origin),
            Self::Wheel(w) => Some(w.origin),
            Self::Interrupt(_) => None,
        }
    }

    /// The pointer input, if this is one.
    #[must_use]
    pub const fn as_pointer(&self) -> Option<&PointerInput> {
        match self {
            Self::Pointer(p) => Some(p),
            _ => None,
        }
    }

    /// The wheel input, if this is one.
    #[must_use]
    pub const fn as_wheel(&self) -> Option<&WheelInput> {
        match self {
            Self::Wheel(w) => Some(w),
            _ => None,
        }
    }

    /// Whether this is a synthetic cancel that must reset every gesture.
    #[must_use]
    pub const fn is_force_reset(&self) -> bool {
        match self {
            Self::Pointer(p) => p.force_reset,
            Self::Interrupt(_) => true,
            Self::Wheel(_) => false,
        }
    }
}

/// Normalized, immutable view of one pressed pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerSnapshot {
    /// Pointer ID
    pub id: PointerId,
    /// Viewport coordinates
    pub client: Point,
    /// Document coordinates
    pub page: Point,
    /// Contact size (at least 1×1)
    pub size: Size,
    /// Pressure in `[0, 1]`
    pub pressure: f32,
    /// Device kind
    pub kind: PointerKind,
    /// Is primary pointer
    pub is_primary: bool,
    /// Timestamp in milliseconds
    pub timestamp: f64,
    /// Phase of the input that produced this snapshot
    pub phase: PointerPhase,
    /// Target the pointer originated from
    pub origin: TargetId,
}

impl PointerSnapshot {
    /// Pressure reported for a pressed device that has no pressure sensor.
    pub const DEFAULT_PRESSURE: f32 = 0.5;

    /// Normalize a raw input into a snapshot.
    #[must_use]
    pub fn from_input(input: &PointerInput) -> Self {
        let mut pressure = if input.pressure.is_finite() {
            input.pressure.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let pressed = matches!(input.phase, PointerPhase::Down | PointerPhase::Move);
        if pressed && pressure == 0.0 && !input.kind.is_touch() {
            pressure = Self::DEFAULT_PRESSURE;
        }

        Self {
            id: input.id,
            client: input.client,
            page: input.page,
            size: input.size.at_least(1.0),
            pressure,
            kind: input.kind,
            is_primary: input.is_primary,
            timestamp: input.timestamp,
            phase: input.phase,
            origin: input.origin,
        }
    }

    /// Viewport position.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.client
    }
}

/// The live set of pressed pointers, keyed by pointer ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerSet {
    pointers: BTreeMap<PointerId, PointerSnapshot>,
}

impl PointerSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the snapshot for its pointer ID.
    pub fn insert(&mut self, snapshot: PointerSnapshot) -> Option<PointerSnapshot> {
        self.pointers.insert(snapshot.id, snapshot)
    }

    /// Remove a pointer.
    pub fn remove(&mut self, id: PointerId) -> Option<PointerSnapshot> {
        self.pointers.remove(&id)
    }

    /// Remove every pointer.
    pub fn clear(&mut self) {
        self.pointers.clear();
    }

    /// Look up a pointer.
    #[must_use]
    pub fn get(&self, id: PointerId) -> Option<&PointerSnapshot> {
        self.pointers.get(&id)
    }

    /// Mutable access for in-place restamping.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut PointerSnapshot> {
        self.pointers.values_mut()
    }

    /// Check if a pointer is present.
    #[must_use]
    pub fn contains(&self, id: PointerId) -> bool {
        self.pointers.contains_key(&id)
    }

    /// Number of pointers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    /// Iterate snapshots in pointer-ID order.
    pub fn iter(&self) -> impl Iterator<Item = &PointerSnapshot> {
        self.pointers.values()
    }

    /// First snapshot in pointer-ID order.
    #[must_use]
    pub fn first(&self) -> Option<&PointerSnapshot> {
        self.pointers.values().next()
    }

    /// Centroid of all pointers.
    #[must_use]
    pub fn centroid(&self) -> Option<Point> {
        Point::centroid(self.iter().map(PointerSnapshot::position))
    }
}

impl<'a> IntoIterator for &'a PointerSet {
    type Item = &'a PointerSnapshot;
    type IntoIter = std::collections::btree_map::Values<'a, PointerId, PointerSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.pointers.values()
    }
}
