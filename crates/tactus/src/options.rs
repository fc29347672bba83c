//! Per-gesture options and the live options patch channel.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use tactus_core::Point;

/// Dominant direction of a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards negative x
    Left,
    /// Towards positive x
    Right,
    /// Towards negative y
    Up,
    /// Towards positive y
    Down,
}

impl Direction {
    /// Every direction.
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];

    /// Classify a delta by its larger absolute axis.
    ///
    /// Ties (including a zero delta) have no direction.
    #[must_use]
    pub fn classify(delta: Point) -> Option<Self> {
        let (ax, ay) = (delta.x.abs(), delta.y.abs());
        if ax > ay {
            Some(if delta.x > 0.0 { Self::Right } else { Self::Left })
        } else if ay > ax {
            Some(if delta.y > 0.0 { Self::Down } else { Self::Up })
        } else {
            None
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Configuration of one gesture.
///
/// Fields a variant has no use for are carried but ignored, so one options
/// shape serves every gesture kind and every manifest entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GestureOptions {
    /// Activation threshold: px for pan, scale delta for pinch, radians for
    /// rotate, px of largest delta for wheel
    pub threshold: f32,
    /// Minimum number of relevant pointers
    pub min_pointers: usize,
    /// Maximum number of relevant pointers
    pub max_pointers: usize,
    /// Directions allowed to start a pan
    pub directions: Vec<Direction>,
    /// Ask the host to suppress the default action of source events
    pub prevent_default: bool,
    /// Ask the host to stop propagation of source events
    pub stop_propagation: bool,
    /// Gesture names that suppress this one while active on the same target
    pub prevent_if: Vec<String>,
    /// Keep accumulated totals after the last pointer lifts
    pub keep_total: bool,
    /// Maximum gap between consecutive taps (ms)
    pub tap_interval: f64,
    /// Maximum travel of a tap and between consecutive taps (px)
    pub tap_distance: f32,
    /// Maximum press duration of a tap (ms)
    pub press_duration: f64,
    /// Tap count wraps to 1 after this many taps
    pub max_taps: u32,
    /// Wheel events further apart than this start a new turn (ms)
    pub wheel_idle: f64,
}

impl Default for GestureOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            min_pointers: 1,
            max_pointers: 10,
            directions: Direction::ALL.to_vec(),
            prevent_default: true,
            stop_propagation: false,
            prevent_if: Vec::new(),
            keep_total: false,
            tap_interval: 300.0,
            tap_distance: 10.0,
            press_duration: 500.0,
            max_taps: 3,
            wheel_idle: 250.0,
        }
    }
}

impl GestureOptions {
    /// Check if `direction` may start the gesture.
    #[must_use]
    pub fn allows(&self, direction: Option<Direction>) -> bool {
        direction.is_some_and(|d| self.directions.contains(&d))
    }

    /// Check if `count` relevant pointers lie within the configured bounds.
    #[must_use]
    pub const fn accepts_count(&self, count: usize) -> bool {
        count >= self.min_pointers && count <= self.max_pointers
    }

    /// Apply a patch, returning the updated options.
    #[must_use]
    pub fn patched(mut self, patch: &GestureOptionsPatch) -> Self {
        patch.apply(&mut self);
        self
    }
}

/// Partial update of [`GestureOptions`].
///
/// Present fields overwrite, absent fields keep their value. Decoding
/// ignores fields it does not recognize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GestureOptionsPatch {
    /// See [`GestureOptions::threshold`]
    pub threshold: Option<f32>,
    /// See [`GestureOptions::min_pointers`]
    pub min_pointers: Option<usize>,
    /// See [`GestureOptions::max_pointers`]
    pub max_pointers: Option<usize>,
    /// See [`GestureOptions::directions`]
    pub directions: Option<Vec<Direction>>,
    /// See [`GestureOptions::prevent_default`]
    pub prevent_default: Option<bool>,
    /// See [`GestureOptions::stop_propagation`]
    pub stop_propagation: Option<bool>,
    /// See [`GestureOptions::prevent_if`]
    pub prevent_if: Option<Vec<String>>,
    /// See [`GestureOptions::keep_total`]
    pub keep_total: Option<bool>,
    /// See [`GestureOptions::tap_interval`]
    pub tap_interval: Option<f64>,
    /// See [`GestureOptions::tap_distance`]
    pub tap_distance: Option<f32>,
    /// See [`GestureOptions::press_duration`]
    pub press_duration: Option<f64>,
    /// See [`GestureOptions::max_taps`]
    pub max_taps: Option<u32>,
    /// See [`GestureOptions::wheel_idle`]
    pub wheel_idle: Option<f64>,
}

impl GestureOptionsPatch {
    /// Decode a patch from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode a patch from an already parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Check if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Overwrite the fields present in this patch.
    pub fn apply(&self, options: &mut GestureOptions) {
        fn set<T: Clone>(slot: &mut T, value: Option<&T>) {
            if let Some(v) = value {
                slot.clone_from(v);
            }
        }

        set(&mut options.threshold, self.threshold.as_ref());
        set(&mut options.min_pointers, self.min_pointers.as_ref());
        set(&mut options.max_pointers, self.max_pointers.as_ref());
        set(&mut options.directions, self.directions.as_ref());
        set(&mut options.prevent_default, self.prevent_default.as_ref());
        set(&mut options.stop_propagation, self.stop_propagation.as_ref());
        set(&mut options.prevent_if, self.prevent_if.as_ref());
        set(&mut options.keep_total, self.keep_total.as_ref());
        set(&mut options.tap_interval, self.tap_interval.as_ref());
        set(&mut options.tap_distance, self.tap_distance.as_ref());
        set(&mut options.press_duration, self.press_duration.as_ref());
        set(&mut options.max_taps, self.max_taps.as_ref());
        set(&mut options.wheel_idle, self.wheel_idle.as_ref());
    }

    /// Set the threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Set the allowed directions.
    #[must_use]
    pub fn with_directions(mut self, directions: &[Direction]) -> Self {
        self.directions = Some(directions.to_vec());
        self
    }

    /// Set the exclusion list.
    #[must_use]
    pub fn with_prevent_if(mut self, names: &[&str]) -> Self {
        self.prevent_if = Some(names.iter().map(|n| (*n).to_string()).collect());
        self
    }

    /// Set the pointer-count bounds.
    #[must_use]
    pub const fn with_pointers(mut self, min: usize, max: usize) -> Self {
        self.min_pointers = Some(min);
        self.max_pointers = Some(max);
        self
    }

    /// Set the total-keeping policy.
    #[must_use]
    pub const fn with_keep_total(mut self, keep: bool) -> Self {
        self.keep_total = Some(keep);
        self
    }
}
