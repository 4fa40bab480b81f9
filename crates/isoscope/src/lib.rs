//! isoscope: an interactive skin/bone iso-surface and volume viewer for 3D
//! scalar fields such as CT scans.
//!
//! The viewer shows a field either as two extracted iso-surfaces (skin and
//! bone) or as a direct-rendered volume, and lets the user tune opacities and
//! the ray sample step size from the keyboard while a slider controls the
//! skin opacity.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use isoscope::*;
//!
//! fn main() -> Result<()> {
//!     let options = Options::surface_and_volume();
//!     let field = isoscope_io::read_scalar_field("FullHead.mhd".as_ref(), &options)?;
//!     let session = Session::new(Arc::new(field), options);
//!     run_app(session)
//! }
//! ```
//!
//! # Keys
//!
//! Surface-and-volume viewer:
//! - `Right` / `Left` grow and shrink the sample step size
//! - `1` / `2` raise and lower the opacity at the first iso value
//! - `3` / `4` raise and lower the opacity at the second iso value
//! - `v` shows the volume, `i` shows the iso-surfaces
//!
//! Volume-only viewer: `Up` / `Down` raise and lower every opacity point.
//!
//! Headless use goes through [`Viewer`] with any [`RenderBackend`].

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::float_cmp)]

pub mod app;
pub mod geometry;
pub mod key;
pub mod render;
pub mod session;
pub mod slider;
pub mod viewer;

// Re-export core types
pub use isoscope_core::{
    Anchor, BlendMode, IsoscopeError, ModeCommand, OpacityAdjustment, Options, PropId,
    RenderMode, Result, ScalarField, TransferFunction, Variant, Vec2, Vec3,
};

pub use app::{run_app, WindowBackend};
pub use key::{bound_keys, Direction, KeyCommand};
pub use render::{Frame, RenderBackend};
pub use session::Session;
pub use slider::{OpacityBinding, SliderWidget};
pub use viewer::{InputEvent, Viewer};

/// Initializes logging from `RUST_LOG`, defaulting to `info`.
///
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
