//! Scroll and zoom deltas from the wheel channel.

use super::{GestureContext, Recognizer};
use crate::event::{GestureDetail, WheelDetail};
use tactus_core::{PointerInput, WheelInput};

#[derive(Debug, Default)]
pub(super) struct WheelRecognizer {
    total: [f32; 3],
    last_time: Option<f64>,
}

impl Recognizer for WheelRecognizer {
    fn is_active(&self) -> bool {
        false
    }

    fn on_pointer(&mut self, _cx: &mut GestureContext<'_>, _input: &PointerInput) {}

    fn on_wheel(&mut self, cx: &mut GestureContext<'_>, input: &WheelInput) {
        // A pause longer than the idle window starts a new turn.
        if self
            .last_time
            .is_some_and(|last| input.timestamp - last > cx.options.wheel_idle)
        {
            self.total = [0.0; 3];
        }
        self.last_time = Some(input.timestamp);

        let deltas = [input.delta_x, input.delta_y, input.delta_z];
        let largest = deltas.iter().fold(0.0_f32, |acc, d| acc.max(d.abs()));
        if largest == 0.0 || largest < cx.options.threshold {
            return;
        }
        for (total, delta) in self.total.iter_mut().zip(deltas) {
            *total += delta;
        }

        let detail = GestureDetail::TurnWheel(WheelDetail {
            delta_x: input.delta_x,
            delta_y: input.delta_y,
            delta_z: input.delta_z,
            total_x: self.total[0],
            total_y: self.total[1],
            total_z: self.total[2],
        });
        cx.emit(None, input.position, detail);
    }

    fn cancel(&mut self, _cx: &mut GestureContext<'_>) {
        *self = Self::default();
    }
}
