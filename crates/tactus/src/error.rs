//! Error types for the gesture engine.

use tactus_core::TargetId;
use thiserror::Error;

/// Errors returned by the coordinator, runtime and option channels.
#[derive(Debug, Error)]
pub enum GestureError {
    /// No template exists for the requested gesture name.
    #[error("unknown gesture: {0}")]
    UnknownGesture(String),

    /// The gesture is not registered on the target.
    #[error("gesture '{name}' is not registered on target {target}")]
    NotRegistered {
        /// Gesture name
        name: String,
        /// Target the lookup was made for
        target: TargetId,
    },

    /// A shared service was used before it was initialized.
    #[error("{0} used before initialization")]
    Uninitialized(&'static str),

    /// An options payload could not be decoded.
    #[error("invalid gesture options: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    /// A gesture manifest could not be decoded.
    #[error("invalid gesture manifest: {0}")]
    Manifest(#[from] serde_yaml_ng::Error),
}

/// Failure reported by a [`PointerCapture`](crate::PointerCapture) collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pointer capture unsupported on target {target}")]
pub struct CaptureError {
    /// Target the capture was attempted on
    pub target: TargetId,
}

/// Result alias for fallible gesture operations.
pub type Result<T, E = GestureError> = std::result::Result<T, E>;
