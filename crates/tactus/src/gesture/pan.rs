//! Threshold-activated translation of the pointer centroid.

use super::{centroid, elapsed_secs, terminal_phase, GestureContext, Recognizer};
use crate::event::{GestureDetail, GesturePhase, PanDetail};
use crate::options::Direction;
use tactus_core::{Point, PointerInput, PointerPhase};

#[derive(Debug, Default)]
pub(super) struct PanRecognizer {
    active: bool,
    /// Centroid the current delta is measured from.
    start: Option<Point>,
    /// Centroid at the previous frame.
    last: Point,
    /// Offset accumulated across activations.
    total: Point,
    delta: Point,
    first_contact: Option<f64>,
}

impl PanRecognizer {
    fn detail(&self, now: f64) -> GestureDetail {
        let elapsed = self
            .first_contact
            .map_or(0.0, |first| elapsed_secs(first, now));
        let velocity = if elapsed > 0.0 {
            self.delta / elapsed
        } else {
            Point::ORIGIN
        };
        GestureDetail::Pan(PanDetail {
            delta: self.delta,
            total_delta: self.total,
            distance: self.delta.length(),
            velocity,
            direction: Direction::classify(self.delta),
        })
    }

    /// Shift the start reference so the delta stays continuous when the
    /// centroid jumps because pointers were added or removed.
    fn rebase(&mut self, centroid: Point) {
        if let Some(start) = self.start {
            self.start = Some(start + (centroid - self.last));
            self.last = centroid;
        }
    }

    fn on_down(&mut self, cx: &GestureContext<'_>, input: &PointerInput) {
        let Some(c) = centroid(&cx.relevant) else {
            return;
        };
        self.first_contact.get_or_insert(input.timestamp);
        if self.start.is_some() {
            self.rebase(c);
        } else {
            self.start = Some(c);
            self.last = c;
        }
    }

    fn on_move(&mut self, cx: &mut GestureContext<'_>, input: &PointerInput) {
        if !cx.options.accepts_count(cx.relevant.len()) {
            return;
        }
        let Some(c) = centroid(&cx.relevant) else {
            return;
        };
        let Some(start) = self.start else {
            self.first_contact.get_or_insert(input.timestamp);
            self.start = Some(c);
            self.last = c;
            return;
        };

        let delta = c - start;
        if self.active {
            self.total += c - self.last;
            self.last = c;
            self.delta = delta;
            let detail = self.detail(cx.timestamp());
            cx.ongoing(c, detail);
            return;
        }

        self.last = c;
        if delta.length() >= cx.options.threshold && cx.options.allows(Direction::classify(delta)) {
            self.active = true;
            self.total += delta;
            self.delta = delta;
            let detail = self.detail(cx.timestamp());
            cx.start(c, detail);
        }
    }

    fn on_release(&mut self, cx: &mut GestureContext<'_>, input: &PointerInput) {
        let remaining = cx.remaining(input.id);
        if remaining.is_empty() || remaining.len() < cx.options.min_pointers {
            if self.active {
                let detail = self.detail(cx.timestamp());
                cx.finish(terminal_phase(input), self.last, detail);
            }
            self.active = false;
            self.start = None;
            self.delta = Point::ORIGIN;
            if remaining.is_empty() {
                self.first_contact = None;
                if !cx.options.keep_total {
                    self.total = Point::ORIGIN;
                }
            }
        } else if let Some(c) = centroid(&remaining) {
            self.rebase(c);
        }
    }
}

impl Recognizer for PanRecognizer {
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
            let detail = self.detail(cx.timestamp());
            cx.finish(GesturePhase::Cancel, self.last, detail);
        }
        *self = Self::default();
    }
}
