//! Change of the angle between the two lowest-ID pointers.

use super::{centroid, elapsed_secs, terminal_phase, GestureContext, Recognizer};
use crate::event::{GestureDetail, GesturePhase, RotateDetail};
use std::f32::consts::{PI, TAU};
use tactus_core::{Point, PointerInput, PointerPhase, PointerSnapshot};

/// Wrap an angle difference into `(-PI, PI]`.
fn wrap(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Angle of the line from the first to the second pointer.
///
/// `None` while the two coincide.
fn angle(pointers: &[PointerSnapshot]) -> Option<f32> {
    match pointers {
        [a, b, ..] if a.position().distance(&b.position()) > f32::EPSILON => {
            Some(a.position().angle_to(&b.position()))
        }
        _ => None,
    }
}

#[derive(Debug, Default)]
pub(super) struct RotateRecognizer {
    active: bool,
    tracking: bool,
    /// The pointer pair changed while it had no angle.
    stale: bool,
    angle: f32,
    /// Rotation since tracking began.
    rotation: f32,
    total: f32,
    velocity: f32,
    last_time: f64,
    centroid: Point,
}

impl RotateRecognizer {
    const fn detail(&self) -> GestureDetail {
        GestureDetail::Rotate(RotateDetail {
            rotation: self.rotation,
            total_rotation: self.total,
            angle: self.angle,
            velocity: self.velocity,
        })
    }

    fn on_down(&mut self, cx: &mut GestureContext<'_>, input: &PointerInput) {
        let count = cx.relevant.len();
        if !cx.options.accepts_count(count) {
            return;
        }
        let (Some(angle), Some(c)) = (angle(&cx.relevant), centroid(&cx.relevant)) else {
            self.stale = self.tracking;
            return;
        };
        self.angle = angle;
        self.centroid = c;
        if self.tracking {
            self.stale = false;
            return;
        }

        self.tracking = true;
        self.rotation = 0.0;
        self.velocity = 0.0;
        self.last_time = input.timestamp;
        if cx.options.threshold <= 0.0 {
            self.active = true;
            cx.start(c, self.detail());
        }
    }

    fn on_move(&mut self, cx: &mut GestureContext<'_>, input: &PointerInput) {
        if !cx.options.accepts_count(cx.relevant.len()) {
            return;
        }
        if !self.tracking {
            self.on_down(cx, input);
            return;
        }
        let (Some(angle), Some(c)) = (angle(&cx.relevant), centroid(&cx.relevant)) else {
            return;
        };
        if self.stale {
            self.stale = false;
            self.angle = angle;
            self.centroid = c;
            self.last_time = input.timestamp;
            return;
        }

        let step = wrap(angle - self.angle);
        let dt = elapsed_secs(self.last_time, input.timestamp);
        if dt > 0.0 {
            self.velocity = step / dt;
        }
        self.angle = angle;
        self.rotation += step;
        self.last_time = input.timestamp;
        self.centroid = c;

        if self.active {
            self.total += step;
            cx.ongoing(c, self.detail());
        } else if self.rotation.abs() >= cx.options.threshold {
            self.active = true;
            self.total += self.rotation;
            cx.start(c, self.detail());
        }
    }

    fn on_release(&mut self, cx: &mut GestureContext<'_>, input: &PointerInput) {
        let remaining = cx.remaining(input.id);
        if remaining.len() < cx.options.min_pointers.max(2) {
            if self.active {
                cx.finish(terminal_phase(input), self.centroid, self.detail());
            }
            let total = if remaining.is_empty() && !cx.options.keep_total {
                0.0
            } else {
                self.total
            };
            *self = Self {
                total,
                ..Self::default()
            };
        } else if let Some(angle) = angle(&remaining) {
            self.angle = angle;
            self.centroid = centroid(&remaining).unwrap_or(self.centroid);
        } else {
            self.stale = true;
        }
    }
}

impl Recognizer for RotateRecognizer {
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

#[cfg(test)]
mod tests {
    use super::wrap;
    use crate::descriptor::GestureKind;
    use crate::gesture::tests::{p, Bench, T};
    use crate::options::GestureOptionsPatch;
    use std::f32::consts::{FRAC_PI_2, PI};
    use tactus_core::PointerInput;

    fn rotate(patch: GestureOptionsPatch) -> Bench {
        Bench::single(GestureKind::Rotate, patch)
    }

    #[test]
    fn test_wrap() {
        assert!((wrap(0.5) - 0.5).abs() < 1e-6);
        assert!((wrap(1.5 * PI) + 0.5 * PI).abs() < 1e-5);
        assert!((wrap(-1.5 * PI) - 0.5 * PI).abs() < 1e-5);
        assert!(wrap(-PI) > 0.0);
    }

    #[test]
    fn test_quarter_turn() {
        let mut bench = rotate(GestureOptionsPatch::default());
        bench.input(PointerInput::down(1, p(0.0, 0.0), T).at(0.0));
        let started = bench.input(PointerInput::down(2, p(100.0, 0.0), T).at(0.0));
        assert_eq!(started[0].event_name(), "rotateStart");

        let events = bench.input(PointerInput::motion(2, p(0.0, 100.0), T).at(1000.0));
        let detail = events[0].rotate().unwrap();
        assert!((detail.rotation - FRAC_PI_2).abs() < 1e-4);
        assert!((detail.angle - FRAC_PI_2).abs() < 1e-4);
        assert!((detail.velocity - FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn test_crossing_the_seam_is_continuous() {
        let mut bench = rotate(GestureOptionsPatch::default());
        bench.input(PointerInput::down(1, p(0.0, 0.0), T));
        bench.input(PointerInput::down(2, p(-100.0, 1.0), T));

        let events = bench.input(PointerInput::motion(2, p(-100.0, -1.0), T));
        let detail = events[0].rotate().unwrap();
        assert!(detail.rotation.abs() < 0.05);
    }

    #[test]
    fn test_threshold_delays_start() {
        let mut bench = rotate(GestureOptionsPatch::default().with_threshold(0.5));
        bench.input(PointerInput::down(1, p(0.0, 0.0), T));
        assert!(bench.input(PointerInput::down(2, p(100.0, 0.0), T)).is_empty());
        assert!(bench.input(PointerInput::motion(2, p(100.0, 20.0), T)).is_empty());

        let events = bench.input(PointerInput::motion(2, p(0.0, 100.0), T));
        assert_eq!(events[0].event_name(), "rotateStart");
        assert!((events[0].rotate().unwrap().total_rotation - FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn test_total_rotation_adds_across_restarts() {
        let mut bench = rotate(GestureOptionsPatch::default());
        bench.input(PointerInput::down(1, p(0.0, 0.0), T));
        bench.input(PointerInput::down(2, p(100.0, 0.0), T));
        bench.input(PointerInput::motion(2, p(0.0, 100.0), T));
        let ended = bench.input(PointerInput::up(2, p(0.0, 100.0), T));
        assert_eq!(ended[0].event_name(), "rotateEnd");

        bench.input(PointerInput::down(2, p(100.0, 0.0), T));
        let events = bench.input(PointerInput::motion(2, p(0.0, 100.0), T));
        let detail = events[0].rotate().unwrap();
        assert!((detail.rotation - FRAC_PI_2).abs() < 1e-4);
        assert!((detail.total_rotation - PI).abs() < 1e-4);
    }

    #[test]
    fn test_coincident_pointers_hold_the_angle() {
        let mut bench = rotate(GestureOptionsPatch::default());
        bench.input(PointerInput::down(1, p(0.0, 0.0), T));
        bench.input(PointerInput::down(2, p(100.0, 0.0), T));
        bench.input(PointerInput::motion(2, p(0.0, 100.0), T));

        assert!(bench.input(PointerInput::motion(1, p(0.0, 100.0), T)).is_empty());

        let events = bench.input(PointerInput::motion(1, p(0.0, 0.0), T));
        let detail = events[0].rotate().unwrap();
        assert!((detail.rotation - FRAC_PI_2).abs() < 1e-4);
        assert!((detail.total_rotation - FRAC_PI_2).abs() < 1e-4);
        assert!((detail.angle - FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn test_lift_onto_coincident_pair_rebases() {
        let mut bench = rotate(GestureOptionsPatch::default());
        bench.input(PointerInput::down(1, p(0.0, 0.0), T));
        bench.input(PointerInput::down(2, p(100.0, 0.0), T));
        bench.input(PointerInput::down(3, p(0.0, 0.0), T));

        assert!(bench.input(PointerInput::up(2, p(100.0, 0.0), T)).is_empty());
        assert!(bench.input(PointerInput::motion(3, p(0.0, -100.0), T)).is_empty());

        let events = bench.input(PointerInput::motion(3, p(100.0, 0.0), T));
        let detail = events[0].rotate().unwrap();
        assert!((detail.rotation - FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn test_force_reset_cancels() {
        let mut bench = rotate(GestureOptionsPatch::default());
        bench.input(PointerInput::down(1, p(0.0, 0.0), T));
        bench.input(PointerInput::down(2, p(100.0, 0.0), T));

        let events = bench.reset();
        assert_eq!(events[0].event_name(), "rotateCancel");
        assert!(!bench.instances[0].is_active());
    }
}
