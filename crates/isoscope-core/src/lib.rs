//! Core abstractions for isoscope.
//!
//! This crate provides the state behind an interactive scalar-field viewer:
//! - [`ScalarField`] for the immutable loaded volume
//! - [`TransferFunction`] with its clamped opacity editing protocol
//! - [`SceneGraph`] and the [`RenderModeController`] state machine
//! - The surface and volume pipelines' parameter wiring
//! - Configuration [`Options`]

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
#![allow(clippy::float_cmp)]

pub mod actor;
pub mod error;
pub mod mode;
pub mod options;
pub mod pipeline;
pub mod scalar_field;
pub mod scene;
pub mod transfer_function;

pub use actor::{IsoSurfaceActor, OutlineActor, PropertyHandle, SurfaceProperty};
pub use error::{IsoscopeError, Result};
pub use mode::{transition, ModeCommand, ModeTransition, RenderMode, RenderModeController};
pub use options::{BlendMode, Options, Variant};
pub use pipeline::{
    SharedTransferFunction, SurfaceExtractionPipeline, VolumeProperty, VolumeRenderPipeline,
};
pub use scalar_field::ScalarField;
pub use scene::{PropId, SceneEdit, SceneGraph};
pub use transfer_function::{
    Anchor, AnchorPoint, ColorPoint, ColorTransferFunction, OpacityAdjustment, OpacityPoint,
    OpacityTransferFunction, TransferFunction,
};

// Re-export glam types for convenience
pub use glam::{UVec2, UVec3, Vec2, Vec3};
