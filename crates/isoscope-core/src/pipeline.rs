//! Parameter wiring for the surface and volume pipelines.
//!
//! Neither pipeline triangulates or ray-casts anything itself; they hold the
//! parameters a render backend needs to do so.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use crate::actor::{IsoSurfaceActor, OutlineActor};
use crate::options::{BlendMode, Options, ShadingConfig, VolumeConfig};
use crate::scalar_field::ScalarField;
use crate::scene::PropId;
use crate::transfer_function::{Anchor, TransferFunction};

/// Shared handle to the transfer function edited by keyboard commands.
pub type SharedTransferFunction = Rc<RefCell<TransferFunction>>;

/// Skin and bone surfaces plus the outline, all derived from one field.
#[derive(Debug, Clone)]
pub struct SurfaceExtractionPipeline {
    field: Arc<ScalarField>,
    skin: IsoSurfaceActor,
    bone: IsoSurfaceActor,
    outline: OutlineActor,
}

impl SurfaceExtractionPipeline {
    pub fn new(field: Arc<ScalarField>, options: &Options) -> Self {
        let skin = IsoSurfaceActor::new("skin", &options.skin);
        let bone = IsoSurfaceActor::new("bone", &options.bone);
        let outline = OutlineActor::new(&field, options.outline_color);
        Self {
            field,
            skin,
            bone,
            outline,
        }
    }

    #[must_use]
    pub fn field(&self) -> &ScalarField {
        &self.field
    }

    #[must_use]
    pub fn skin(&self) -> &IsoSurfaceActor {
        &self.skin
    }

    #[must_use]
    pub fn bone(&self) -> &IsoSurfaceActor {
        &self.bone
    }

    #[must_use]
    pub fn outline(&self) -> &OutlineActor {
        &self.outline
    }

    /// Returns the surface actor behind a prop, if it is one.
    #[must_use]
    pub fn surface(&self, prop: PropId) -> Option<&IsoSurfaceActor> {
        match prop {
            PropId::Skin => Some(&self.skin),
            PropId::Bone => Some(&self.bone),
            PropId::Outline | PropId::Volume => None,
        }
    }
}

/// Fixed rendering properties of the volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeProperty {
    pub blend_mode: BlendMode,
    pub shading: ShadingConfig,
    /// Iso values rendered in [`BlendMode::IsoSurface`].
    pub iso_values: [f32; 2],
}

/// Direct volume rendering of the field through a shared transfer function.
#[derive(Debug)]
pub struct VolumeRenderPipeline {
    field: Arc<ScalarField>,
    transfer: Option<SharedTransferFunction>,
    sample_step_size: f32,
    property: VolumeProperty,
}

impl VolumeRenderPipeline {
    pub fn new(field: Arc<ScalarField>, config: &VolumeConfig) -> Self {
        Self {
            field,
            transfer: None,
            sample_step_size: config.sample_step_size,
            property: VolumeProperty {
                blend_mode: config.blend_mode,
                shading: config.shading,
                iso_values: [config.iso1.scalar, config.iso2.scalar],
            },
        }
    }

    /// Binds the transfer function by reference. Later edits through any
    /// clone of the handle are seen by the next render.
    pub fn attach(&mut self, transfer: SharedTransferFunction) {
        self.transfer = Some(transfer);
    }

    /// Borrows the bound transfer function.
    #[must_use]
    pub fn transfer_function(&self) -> Option<Ref<'_, TransferFunction>> {
        self.transfer.as_ref().map(|tf| tf.borrow())
    }

    /// Sets the distance between ray samples. Any value is accepted.
    pub fn set_sample_step_size(&mut self, step: f32) {
        self.sample_step_size = step;
    }

    #[must_use]
    pub fn sample_step_size(&self) -> f32 {
        self.sample_step_size
    }

    #[must_use]
    pub fn property(&self) -> &VolumeProperty {
        &self.property
    }

    #[must_use]
    pub fn field(&self) -> &ScalarField {
        &self.field
    }

    /// Returns the iso value for an anchor.
    #[must_use]
    pub fn iso_value(&self, anchor: Anchor) -> f32 {
        match anchor {
            Anchor::Iso1 => self.property.iso_values[0],
            Anchor::Iso2 => self.property.iso_values[1],
        }
    }
}
