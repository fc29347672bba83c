//! Short presses, counted into single/double/... taps.

use super::{GestureContext, Recognizer};
use crate::event::{GestureDetail, TapDetail};
use std::collections::BTreeMap;
use tactus_core::{Point, PointerId, PointerInput, PointerPhase};

/// Press in progress.
#[derive(Debug, Clone)]
struct Press {
    started: f64,
    /// Where each contributing pointer went down.
    origins: BTreeMap<PointerId, Point>,
    peak: usize,
    valid: bool,
}

impl Press {
    fn position(&self) -> Point {
        Point::centroid(self.origins.values().copied()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
struct LastTap {
    position: Point,
    time: f64,
    count: u32,
}

#[derive(Debug, Default)]
pub(super) struct TapRecognizer {
    press: Option<Press>,
    last_tap: Option<LastTap>,
}

impl TapRecognizer {
    fn on_down(&mut self, cx: &GestureContext<'_>, input: &PointerInput) {
        let press = self.press.get_or_insert_with(|| Press {
            started: input.timestamp,
            origins: BTreeMap::new(),
            peak: 0,
            valid: true,
        });
        press.origins.entry(input.id).or_insert(input.client);
        press.peak = press.peak.max(cx.relevant.len());
        if press.peak > cx.options.max_pointers {
            press.valid = false;
        }
    }

    /// Invalidate the press once any pointer strays too far.
    fn track(&mut self, cx: &GestureContext<'_>) {
        let Some(press) = self.press.as_mut() else {
            return;
        };
        let strayed = cx.relevant.iter().any(|s| {
            press
                .origins
                .get(&s.id)
                .is_some_and(|origin| s.client.distance(origin) > cx.options.tap_distance)
        });
        if strayed {
            press.valid = false;
        }
    }

    fn on_up(&mut self, cx: &mut GestureContext<'_>, input: &PointerInput) {
        self.track(cx);
        if !cx.remaining(input.id).is_empty() {
            return;
        }
        let Some(press) = self.press.take() else {
            return;
        };

        let duration = input.timestamp - press.started;
        let qualifies = press.valid
            && press.peak >= cx.options.min_pointers
            && duration <= cx.options.press_duration;
        if !qualifies {
            return;
        }

        let position = press.position();
        let count = match self.last_tap {
            Some(last)
                if input.timestamp - last.time <= cx.options.tap_interval
                    && position.distance(&last.position) <= cx.options.tap_distance
                    && last.count < cx.options.max_taps =>
            {
                last.count + 1
            }
            _ => 1,
        };
        self.last_tap = Some(LastTap {
            position,
            time: input.timestamp,
            count,
        });

        let detail = GestureDetail::Tap(TapDetail {
            count,
            duration,
            pointers: press.peak,
        });
        cx.emit(None, position, detail);
    }
}

impl Recognizer for TapRecognizer {
    fn is_active(&self) -> bool {
        false
    }

    fn on_pointer(&mut self, cx: &mut GestureContext<'_>, input: &PointerInput) {
        match input.phase {
            PointerPhase::Down => self.on_down(cx, input),
            PointerPhase::Move => self.track(cx),
            PointerPhase::Up => self.on_up(cx, input),
            PointerPhase::Cancel => self.press = None,
        }
    }

    fn cancel(&mut self, _cx: &mut GestureContext<'_>) {
        *self = Self::default();
    }
}
