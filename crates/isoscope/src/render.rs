//! Render backends.
//!
//! Each render pass hands a [`RenderBackend`] a [`Frame`]: a read-only view
//! of everything the session currently shows.

use std::fmt::Write as _;

use glam::Vec3;
use isoscope_core::{
    IsoSurfaceActor, PropId, RenderMode, Result, SurfaceExtractionPipeline, Variant,
    VolumeRenderPipeline,
};

use crate::slider::SliderWidget;

/// Everything a backend needs to draw one pass.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Number of passes rendered before this one.
    pub index: u64,
    pub variant: Variant,
    pub mode: RenderMode,
    /// Attached props, in attach order.
    pub props: &'a [PropId],
    pub background: Vec3,
    pub surfaces: &'a SurfaceExtractionPipeline,
    pub volume: &'a VolumeRenderPipeline,
    /// The opacity slider, when it is shown.
    pub slider: Option<&'a SliderWidget>,
}

impl Frame<'_> {
    /// Returns true if `prop` is attached.
    #[must_use]
    pub fn shows(&self, prop: PropId) -> bool {
        self.props.contains(&prop)
    }

    /// Attached iso-surface actors.
    pub fn visible_surfaces(&self) -> impl Iterator<Item = &IsoSurfaceActor> + '_ {
        self.props.iter().filter_map(|&p| self.surfaces.surface(p))
    }

    /// One-line description of the frame, e.g.
    /// `volume | step 0.50 | opacity 0.30 0.60`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        match self.mode {
            RenderMode::Surface => {
                let _ = write!(out, "surface | skin opacity {:.2}", self.surfaces.skin().opacity());
            }
            RenderMode::Volume => {
                let _ = write!(out, "volume | step {:.2}", self.volume.sample_step_size());
                if let Some(tf) = self.volume.transfer_function() {
                    out.push_str(" | opacity");
                    for point in tf.opacity().points() {
                        let _ = write!(out, " {:.2}", point.opacity);
                    }
                }
            }
        }
        out
    }
}

/// Draws frames.
///
/// A failing render is fatal to the session.
pub trait RenderBackend {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()>;
}
