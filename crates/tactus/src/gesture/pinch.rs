//! Change of pointer spread.

use super::{centroid, elapsed_secs, spread, terminal_phase, GestureContext, Recognizer};
use crate::event::{GestureDetail, GesturePhase, PinchDetail};
use tactus_core::{Point, PointerInput, PointerPhase, PointerSnapshot};

#[derive(Debug)]
pub(super) struct PinchRecognizer {
    active: bool,
    /// Spread the current scale is measured from.
    start: Option<f32>,
    distance: f32,
    scale: f32,
    total_scale: f32,
    velocity: f32,
    last_time: f64,
    centroid: Point,
}

impl Default for PinchRecognizer {
    fn default() -> Self {
        Self {
            active: false,
            start: None,
            distance: 0.0,
            scale: 1.0,
            total_scale: 1.0,
            velocity: 0.0,
            last_time: 0.0,
            centroid: Point::ORIGIN,
        }
    }
}

fn measure(pointers: &[PointerSnapshot]) -> Option<(Point, f32)> {
    Some((centroid(pointers)?, spread(pointers)?))
}

impl PinchRecognizer {
    const fn detail(&self) -> GestureDetail {
        GestureDetail::Pinch(PinchDetail {
            scale: self.scale,
            total_scale: self.total_scale,
            distance: self.distance,
            velocity: self.velocity,
        })
    }

    /// Keep the current scale when the pointer set changes.
    ///
    /// A collapsed spread leaves the start at zero; the next usable frame
    /// rebases again.
    fn rebase(&mut self, c: Point, distance: f32) {
        let start = if distance > f32::EPSILON && self.scale > f32::EPSILON {
            distance / self.scale
        } else {
            0.0
        };
        self.start = Some(start);
        self.distance = distance;
        self.centroid = c;
    }

    fn on_down(&mut self, cx: &mut GestureContext<'_>, input: &PointerInput) {
        let count = cx.relevant.len();
        if count < 2 || !cx.options.accepts_count(count) {
            return;
        }
        let Some((c, distance)) = measure(&cx.relevant) else {
            return;
        };
        if self.start.is_some() {
            self.rebase(c, distance);
            return;
        }

        self.start = Some(distance);
        self.distance = distance;
        self.scale = 1.0;
        self.velocity = 0.0;
        self.last_time = input.timestamp;
        self.centroid = c;
        if cx.options.threshold <= 0.0 {
            self.active = true;
            cx.start(c, self.detail());
        }
    }

    fn on_move(&mut self, cx: &mut GestureContext<'_>, input: &PointerInput) {
        let count = cx.relevant.len();
        if count < 2 || !cx.options.accepts_count(count) {
            return;
        }
        let Some(start) = self.start else {
            self.on_down(cx, input);
            return;
        };
        let Some((c, distance)) = measure(&cx.relevant) else {
            return;
        };
        // Coincident pointers have no scale; hold until they separate.
        if distance <= f32::EPSILON {
            return;
        }
        if start <= f32::EPSILON {
            self.rebase(c, distance);
            return;
        }

        let scale = distance / start;
        let phase = if self.active {
            GesturePhase::Ongoing
        } else if (scale - 1.0).abs() >= cx.options.threshold {
            GesturePhase::Start
        } else {
            return;
        };

        let dt = elapsed_secs(self.last_time, input.timestamp);
        if dt > 0.0 {
            self.velocity = (distance - self.distance) / dt;
        }
        self.total_scale *= scale / self.scale;
        self.scale = scale;
        self.distance = distance;
        self.last_time = input.timestamp;
        self.centroid = c;

        if phase == GesturePhase::Start {
            self.active = true;
            cx.start(c, self.detail());
        } else {
            cx.ongoing(c, self.detail());
        }
    }

    fn on_release(&mut self, cx: &mut GestureContext<'_>, input: &PointerInput) {
        let remaining = cx.remaining(input.id);
        if remaining.len() < cx.options.min_pointers.max(2) {
            if self.active {
                cx.finish(terminal_phase(input), self.centroid, self.detail());
            }
            let total_scale = if remaining.is_empty() && !cx.options.keep_total {
                1.0
            } else {
                self.total_scale
            };
            *self = Self {
                total_scale,
                ..Self::default()
            };
        } else if let Some((c, distance)) = measure(&remaining) {
            self.rebase(c, distance);
        }
    }
}

impl Recognizer for PinchRecognizer {
    fn is_active(&self) -> bool {
        self.active
    }

    fn on_pointer(&mut self, cx: &mut GestureContext<'_>, input: &PointerInput) {
        match input.phase {
            PointerPhase::Down => self.on_down(cx, input),
            PointerPhase::Move => self.on_move(cx, input),
            PointerPhase::Up | PointerPhase::Cancel => self.on_release(cx, input),
        }
    }

    fn cancel(&mut self, cx: &mut GestureContext<'_>) {
        if self.active {
            cx.finish(GesturePhase::Cancel, self.centroid, self.detail());
        }
        *self = Self::default();
    }
}
