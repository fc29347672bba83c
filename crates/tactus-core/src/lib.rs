//! Core types for the tactus gesture engine.
//!
//! This crate provides the data every other tactus crate speaks:
//! - Geometric primitives: [`Point`], [`Size`]
//! - Pointer input and normalized snapshots: [`PointerInput`], [`PointerSnapshot`], [`PointerSet`]
//! - The wheel channel: [`WheelInput`]
//! - Interactive surfaces: [`TargetId`], [`TargetTree`], [`TargetHierarchy`]

mod geometry;
mod pointer;
mod target;

pub use geometry::{Point, Size};
pub use pointer::{
    DeltaMode, InputEvent, InterruptInput, InterruptReason, PointerId, PointerInput, PointerKind,
    PointerPhase, PointerSet, PointerSnapshot, WheelInput,
};
pub use target::{TargetHierarchy, TargetId, TargetTree};
