//! Process-wide engine state: one pointer tracker, one gesture registry.
//!
//! The runtime is an explicit service object rather than a global. Hosts
//! create one per input root and pass it to every
//! [`GestureCoordinator`](crate::GestureCoordinator) that should share it.

use crate::error::{GestureError, Result};
use crate::registry::GestureRegistry;
use crate::tracker::{PointerCapture, PointerTracker, TrackerConfig};
use std::cell::RefCell;
use std::rc::Rc;
use tactus_core::{InputEvent, InterruptInput, InterruptReason, PointerInput, PointerSet, WheelInput};
use tracing::debug;

/// Shared tracker and registry handles.
#[derive(Debug, Default)]
pub struct GestureRuntime {
    tracker: Option<Rc<RefCell<PointerTracker>>>,
    registry: Option<Rc<RefCell<GestureRegistry>>>,
}

impl GestureRuntime {
    /// Create an uninitialized runtime.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the tracker on first call; later calls return the same one.
    ///
    /// A different `config` on a later call is ignored.
    pub fn init_tracker(&mut self, config: TrackerConfig) -> Rc<RefCell<PointerTracker>> {
        if let Some(tracker) = &self.tracker {
            if tracker.borrow().config() != &config {
                debug!(?config, "pointer tracker already initialized, keeping its config");
            }
            return Rc::clone(tracker);
        }
        self.install(PointerTracker::new(config))
    }

    /// Like [`init_tracker`](Self::init_tracker), with a capture collaborator
    /// used only if the tracker does not exist yet.
    pub fn init_tracker_with_capture(
        &mut self,
        config: TrackerConfig,
        capture: Box<dyn PointerCapture>,
    ) -> Rc<RefCell<PointerTracker>> {
        if let Some(tracker) = &self.tracker {
            return Rc::clone(tracker);
        }
        self.install(PointerTracker::with_capture(config, capture))
    }

    fn install(&mut self, tracker: PointerTracker) -> Rc<RefCell<PointerTracker>> {
        debug!(config = ?tracker.config(), "pointer tracker initialized");
        let tracker = Rc::new(RefCell::new(tracker));
        self.tracker = Some(Rc::clone(&tracker));
        tracker
    }

    /// Whether the tracker exists.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.tracker.is_some()
    }

    /// The tracker.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Uninitialized`] before
    /// [`init_tracker`](Self::init_tracker).
    pub fn tracker(&self) -> Result<Rc<RefCell<PointerTracker>>> {
        self.tracker
            .as_ref()
            .map(Rc::clone)
            .ok_or(GestureError::Uninitialized("pointer tracker"))
    }

    /// The registry, created on first use.
    pub fn registry(&mut self) -> Rc<RefCell<GestureRegistry>> {
        Rc::clone(
            self.registry
                .get_or_insert_with(|| Rc::new(RefCell::new(GestureRegistry::new()))),
        )
    }

    /// Feed any input.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Uninitialized`] before the tracker exists.
    pub fn dispatch(&self, event: InputEvent) -> Result<()> {
        self.tracker()?.borrow_mut().handle(event);
        Ok(())
    }

    /// Feed a pointer input.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Uninitialized`] before the tracker exists.
    pub fn pointer(&self, input: PointerInput) -> Result<()> {
        self.dispatch(InputEvent::Pointer(input))
    }

    /// Feed a wheel input.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Uninitialized`] before the tracker exists.
    pub fn wheel(&self, input: WheelInput) -> Result<()> {
        self.dispatch(InputEvent::Wheel(input))
    }

    /// Abort the current interaction: every gesture resets, active ones
    /// emit a cancel.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Uninitialized`] before the tracker exists.
    pub fn interrupt(&self, reason: InterruptReason, timestamp: f64) -> Result<()> {
        self.dispatch(InputEvent::Interrupt(InterruptInput { timestamp, reason }))
    }

    /// Copy of the pressed pointers.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Uninitialized`] before the tracker exists.
    pub fn snapshot_all(&self) -> Result<PointerSet> {
        Ok(self.tracker()?.borrow().snapshot_all())
    }

    /// Drop the tracker and the registry.
    ///
    /// Coordinators created earlier keep their own handles; they no longer
    /// receive input fed through this runtime.
    pub fn teardown(&mut self) {
        if let Some(registry) = self.registry.take() {
            registry.borrow_mut().clear();
        }
        if self.tracker.take().is_some() {
            debug!("pointer tracker torn down");
        }
    }
}
