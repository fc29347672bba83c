//! Continuous centroid tracking, pressed or hovering.

use super::{centroid, terminal_phase, GestureContext, Recognizer};
use crate::event::{GestureDetail, GesturePhase, MoveDetail};
use std::collections::BTreeSet;
use tactus_core::{InputEvent, Point, PointerId, PointerInput, PointerPhase, PointerSnapshot};

#[derive(Debug, Default)]
pub(super) struct MoveRecognizer {
    active: bool,
    start: Point,
    last: Point,
    delta: Point,
    hover: bool,
    /// Pointers the tracked position comes from.
    pointers: BTreeSet<PointerId>,
}

fn ids(pointers: &[PointerSnapshot]) -> BTreeSet<PointerId> {
    pointers.iter().map(|s| s.id).collect()
}

impl MoveRecognizer {
    fn detail(&self) -> GestureDetail {
        GestureDetail::Move(MoveDetail {
            delta: self.delta,
            total_delta: self.last - self.start,
            hover: self.hover,
        })
    }

    /// Follow a jump of the tracked position without reporting it as motion.
    fn rebase(&mut self, position: Point) {
        self.start += position - self.last;
        self.last = position;
    }

    fn on_move(&mut self, cx: &mut GestureContext<'_>, input: &PointerInput) {
        let count = cx.relevant.len();
        if count > cx.options.max_pointers || count < cx.options.min_pointers {
            return;
        }
        let (position, hover) = match centroid(&cx.relevant) {
            Some(c) => (c, false),
            None => (input.client, true),
        };
        self.hover = hover;
        self.pointers = if hover {
            BTreeSet::from([input.id])
        } else {
            ids(&cx.relevant)
        };

        if self.active {
            self.delta = position - self.last;
            self.last = position;
            cx.ongoing(position, self.detail());
        } else {
            self.active = true;
            self.start = position;
            self.last = position;
            self.delta = Point::ORIGIN;
            cx.start(position, self.detail());
        }
    }

    fn on_release(&mut self, cx: &mut GestureContext<'_>, input: &PointerInput) {
        if !self.active {
            return;
        }
        let remaining = cx.remaining(input.id);
        if let Some(c) = centroid(&remaining) {
            self.pointers = ids(&remaining);
            self.rebase(c);
            return;
        }
        if input.phase == PointerPhase::Up && input.kind.is_mouse() {
            // A released mouse keeps hovering.
            self.hover = true;
            self.pointers = BTreeSet::from([input.id]);
            self.rebase(input.client);
            return;
        }
        self.delta = Point::ORIGIN;
        cx.finish(terminal_phase(input), self.last, self.detail());
        *self = Self::default();
    }
}

impl Recognizer for MoveRecognizer {
    fn is_active(&self) -> bool {
        self.active
    }

    fn on_pointer(&mut self, cx: &mut GestureContext<'_>, input: &PointerInput) {
        match input.phase {
            PointerPhase::Down => {
                if self.active {
                    if let Some(c) = centroid(&cx.relevant) {
                        self.hover = false;
                        self.pointers = ids(&cx.relevant);
                        self.rebase(c);
                    }
                }
            }
            PointerPhase::Move => self.on_move(cx, input),
            PointerPhase::Up | PointerPhase::Cancel => self.on_release(cx, input),
        }
    }

    /// A followed pointer moving over some other target has left this one.
    fn on_foreign(&mut self, cx: &mut GestureContext<'_>, event: &InputEvent) {
        let left = event.as_pointer().is_some_and(|input| {
            input.phase == PointerPhase::Move && self.pointers.contains(&input.id)
        });
        if self.active && left {
            self.delta = Point::ORIGIN;
            cx.finish(GesturePhase::End, self.last, self.detail());
            *self = Self::default();
        }
    }

    fn cancel(&mut self, cx: &mut GestureContext<'_>) {
        if self.active {
            self.delta = Point::ORIGIN;
            cx.finish(GesturePhase::Cancel, self.last, self.detail());
        }
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use crate::descriptor::GestureKind;
    use crate::event::GesturePhase;
    use crate::gesture::tests::{p, Bench, T};
    use crate::options::GestureOptionsPatch;
    use tactus_core::{PointerInput, PointerKind, TargetId};

    fn tracking() -> Bench {
        Bench::single(GestureKind::Move, GestureOptionsPatch::default())
    }

    #[test]
    fn test_hover_starts_on_first_move() {
        let mut bench = tracking();
        let events = bench.input(
            PointerInput::motion(1, p(10.0, 10.0), T).with_kind(PointerKind::Mouse),
        );
        assert_eq!(events[0].event_name(), "moveStart");
        assert!(events[0].movement().unwrap().hover);
        assert!(!events[0].prevent_default);

        let events = bench.input(
            PointerInput::motion(1, p(15.0, 12.0), T).with_kind(PointerKind::Mouse),
        );
        let detail = events[0].movement().unwrap();
        assert_eq!(events[0].phase, Some(GesturePhase::Ongoing));
        assert_eq!(detail.delta, p(5.0, 2.0));
        assert_eq!(detail.total_delta, p(5.0, 2.0));
    }

    #[test]
    fn test_pressed_touch_tracks_and_ends_on_lift() {
        let mut bench = tracking();
        assert!(bench.input(PointerInput::down(1, p(0.0, 0.0), T)).is_empty());
        bench.input(PointerInput::motion(1, p(4.0, 0.0), T));

        let events = bench.input(PointerInput::motion(1, p(10.0, 0.0), T));
        let detail = events[0].movement().unwrap();
        assert!(!detail.hover);
        assert_eq!(detail.delta, p(6.0, 0.0));

        let events = bench.input(PointerInput::up(1, p(10.0, 0.0), T));
        assert_eq!(events[0].event_name(), "moveEnd");
        assert!(bench.registry.is_empty());
    }

    #[test]
    fn test_released_mouse_keeps_hovering() {
        let mut bench = tracking();
        let mouse = |input: PointerInput| input.with_kind(PointerKind::Mouse);
        bench.input(mouse(PointerInput::down(1, p(0.0, 0.0), T)));
        bench.input(mouse(PointerInput::motion(1, p(5.0, 0.0), T)));

        assert!(bench.input(mouse(PointerInput::up(1, p(5.0, 0.0), T))).is_empty());
        let events = bench.input(mouse(PointerInput::motion(1, p(8.0, 0.0), T)));
        let detail = events[0].movement().unwrap();
        assert!(detail.hover);
        assert_eq!(detail.delta, p(3.0, 0.0));
        assert_eq!(detail.total_delta, p(3.0, 0.0));
    }

    #[test]
    fn test_leaving_target_ends() {
        let mut bench = tracking();
        bench.input(PointerInput::motion(1, p(0.0, 0.0), T).with_kind(PointerKind::Mouse));

        let events = bench.input(
            PointerInput::motion(1, p(-5.0, 0.0), TargetId(99)).with_kind(PointerKind::Mouse),
        );
        assert_eq!(events[0].event_name(), "moveEnd");
        assert!(!bench.instances[0].is_active());
    }

    #[test]
    fn test_pointer_on_sibling_target_is_ignored() {
        let mut bench = tracking();
        bench.input(PointerInput::down(1, p(0.0, 0.0), T));
        bench.input(PointerInput::motion(1, p(2.0, 0.0), T));
        bench.input(PointerInput::down(2, p(500.0, 0.0), TargetId(9)));

        assert!(bench.input(PointerInput::motion(2, p(520.0, 0.0), TargetId(9))).is_empty());
        assert!(bench.instances[0].is_active());

        let events = bench.input(PointerInput::motion(1, p(6.0, 0.0), T));
        assert_eq!(events[0].event_name(), "move");
        assert_eq!(events[0].movement().unwrap().total_delta, p(4.0, 0.0));
    }

    #[test]
    fn test_interrupt_cancels_hover_once() {
        let mut bench = tracking();
        bench.input(PointerInput::motion(1, p(0.0, 0.0), T).with_kind(PointerKind::Mouse));
        assert!(bench.instances[0].is_active());

        let events = bench.reset();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_name(), "moveCancel");
        assert!(bench.registry.is_empty());
        assert!(bench.reset().is_empty());
    }

    #[test]
    fn test_cancel_pointer_cancels() {
        let mut bench = tracking();
        bench.input(PointerInput::down(1, p(0.0, 0.0), T));
        bench.input(PointerInput::motion(1, p(3.0, 0.0), T));

        let events = bench.input(PointerInput::cancel(1, p(3.0, 0.0), T));
        assert_eq!(events[0].event_name(), "moveCancel");
    }

    #[test]
    fn test_second_pointer_does_not_jump() {
        let mut bench = tracking();
        bench.input(PointerInput::down(1, p(0.0, 0.0), T));
        bench.input(PointerInput::motion(1, p(0.0, 0.0), T));
        bench.input(PointerInput::down(2, p(100.0, 0.0), T));

        let events = bench.input(PointerInput::motion(2, p(104.0, 0.0), T));
        let detail = events[0].movement().unwrap();
        assert_eq!(detail.delta, p(2.0, 0.0));
        assert_eq!(detail.total_delta, p(2.0, 0.0));
    }
}
