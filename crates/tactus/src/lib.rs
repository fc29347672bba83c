//! Multi-pointer gesture recognition.
//!
//! Raw pointer, wheel and interrupt input goes into a [`GestureRuntime`].
//! Its [`PointerTracker`] keeps the set of pressed pointers and fans every
//! input out to the gesture instances a [`GestureCoordinator`] has bound to
//! targets. Recognized gestures arrive at a [`GestureSink`] as
//! [`GestureEvent`]s.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use tactus::{GestureCoordinator, GestureQueue, GestureRuntime, TrackerConfig};
//! use tactus_core::{Point, PointerInput, TargetHierarchy, TargetId, TargetTree};
//!
//! let mut runtime = GestureRuntime::new();
//! let queue = Rc::new(RefCell::new(GestureQueue::new()));
//! let tree: Rc<dyn TargetTree> = Rc::new(TargetHierarchy::new());
//! let mut gestures =
//!     GestureCoordinator::new(&mut runtime, TrackerConfig::default(), tree, queue.clone());
//!
//! let canvas = TargetId(1);
//! gestures.register("pan", canvas, None).unwrap();
//!
//! runtime.pointer(PointerInput::down(1, Point::new(0.0, 0.0), canvas)).unwrap();
//! runtime.pointer(PointerInput::motion(1, Point::new(40.0, 0.0), canvas)).unwrap();
//!
//! let events = queue.borrow_mut().drain();
//! assert_eq!(events[0].event_name(), "panStart");
//! ```

mod coordinator;
mod descriptor;
mod error;
mod event;
mod gesture;
mod options;
mod registry;
mod runtime;
mod tracker;

pub use coordinator::GestureCoordinator;
pub use descriptor::{GestureDescriptor, GestureKind, GestureManifest, ManifestEntry};
pub use error::{CaptureError, GestureError, Result};
pub use event::{
    GestureDetail, GestureEvent, GesturePhase, GestureQueue, GestureSink, MoveDetail, PanDetail,
    PinchDetail, RotateDetail, TapDetail, WheelDetail,
};
pub use gesture::GestureInstance;
pub use options::{Direction, GestureOptions, GestureOptionsPatch};
pub use registry::{GestureRegistry, InstanceId};
pub use runtime::GestureRuntime;
pub use tracker::{
    NoCapture, PointerCapture, PointerHandler, PointerTracker, SubscriptionId, TrackerConfig,
};

pub use tactus_core as core;
