//! Interactive session state.
//!
//! A [`Session`] owns every piece of mutable visualization state: the
//! transfer function, the render mode and scene, the skin opacity slider and
//! the sample step size. Input handlers take `&mut Session`; nothing is
//! captured implicitly.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use glam::Vec2;
use isoscope_core::mode::initial_scene;
use isoscope_core::{
    Anchor, ModeCommand, ModeTransition, Options, RenderMode, RenderModeController, ScalarField,
    SceneGraph, SharedTransferFunction, SurfaceExtractionPipeline, TransferFunction, Variant,
    VolumeRenderPipeline,
};

use crate::key::KeyCommand;
use crate::render::Frame;
use crate::slider::{OpacityBinding, SliderWidget};

/// Mutable state of one viewer session.
#[derive(Debug)]
pub struct Session {
    options: Options,
    surfaces: SurfaceExtractionPipeline,
    volume: VolumeRenderPipeline,
    transfer: SharedTransferFunction,
    scene: SceneGraph,
    controller: RenderModeController,
    slider: SliderWidget,
    binding: OpacityBinding,
    sample_step_size: f32,
}

impl Session {
    /// Builds both pipelines over `field` and enters the variant's initial
    /// mode.
    pub fn new(field: Arc<ScalarField>, options: Options) -> Self {
        let surfaces = SurfaceExtractionPipeline::new(Arc::clone(&field), &options);

        let transfer = Rc::new(RefCell::new(options.volume.transfer_function()));
        let mut volume = VolumeRenderPipeline::new(field, &options.volume);
        volume.attach(Rc::clone(&transfer));

        let mode = options.initial_mode();
        let scene = initial_scene(mode);

        let mut slider = SliderWidget::new(options.slider.clone(), surfaces.skin().opacity());
        slider.set_enabled(mode.slider_interactive());
        let binding = OpacityBinding::new(surfaces.skin().property_handle());

        log::info!(
            "session started: {:?} variant, {:?} mode, {} props",
            options.variant,
            mode,
            scene.len()
        );

        Self {
            sample_step_size: options.volume.sample_step_size,
            options,
            surfaces,
            volume,
            transfer,
            scene,
            controller: RenderModeController::new(mode),
            slider,
            binding,
        }
    }

    /// Handles one key press.
    ///
    /// Whatever the key, the opacities are re-clamped, the surface variant's
    /// color points are rebuilt and the step size is pushed to the volume
    /// pipeline. The caller renders once afterwards, bound key or not.
    pub fn handle_key(&mut self, key: &str) -> Option<KeyCommand> {
        let command = KeyCommand::parse(self.options.variant, key);
        match command {
            Some(KeyCommand::StepSize(direction)) => {
                self.sample_step_size += direction.signed(self.options.input.step_size_delta);
            }
            Some(KeyCommand::Opacity(adjustment, direction)) => {
                let delta = direction.signed(self.options.input.opacity_delta);
                self.transfer.borrow_mut().adjust_opacity(adjustment, delta);
            }
            Some(KeyCommand::Mode(mode_command)) => {
                self.switch_mode(mode_command);
            }
            None => log::trace!("no command bound to {key:?}"),
        }
        log::debug!("key {key:?} -> {command:?}");
        self.finish_key();
        command
    }

    fn finish_key(&mut self) {
        {
            let mut tf = self.transfer.borrow_mut();
            match self.options.variant {
                Variant::SurfaceAndVolume => {
                    tf.clamp_anchor_opacities();
                    tf.rebuild_color_points();
                }
                Variant::VolumeOnly => tf.clamp_all_opacities(),
            }
        }
        self.apply_sample_step_size();
    }

    fn apply_sample_step_size(&mut self) {
        if let Some(floor) = self.options.volume.min_sample_step_size {
            if self.sample_step_size < floor {
                self.sample_step_size = floor;
            }
        }
        if self.sample_step_size <= 0.0 {
            log::warn!(
                "sample step size is {:.2}; volume sampling is undefined",
                self.sample_step_size
            );
        }
        self.volume.set_sample_step_size(self.sample_step_size);
    }

    /// Switches render mode and gates the slider accordingly.
    pub fn switch_mode(&mut self, command: ModeCommand) -> ModeTransition {
        let transition = self.controller.apply(command, &mut self.scene);
        if let Some(enabled) = transition.slider_enabled {
            self.slider.set_enabled(enabled);
        }
        transition
    }

    /// Sets the slider to `value` and forwards it to the skin opacity.
    ///
    /// Returns false, changing nothing, while the slider is disabled.
    pub fn on_slider_changed(&mut self, value: f32) -> bool {
        if !self.slider.is_enabled() {
            return false;
        }
        self.slider.set_value(value);
        self.binding.on_slider_changed(self.slider.value());
        true
    }

    /// Pointer press at `position` in normalized display coordinates.
    /// Returns true if the skin opacity changed.
    pub fn pointer_pressed(&mut self, position: Vec2) -> bool {
        self.slider
            .on_press(position)
            .map(|value| self.binding.on_slider_changed(value))
            .is_some()
    }

    /// Pointer motion. Returns true if the skin opacity changed.
    pub fn pointer_moved(&mut self, position: Vec2) -> bool {
        self.slider
            .on_move(position)
            .map(|value| self.binding.on_slider_changed(value))
            .is_some()
    }

    /// Pointer release. Returns true if a slider drag ended.
    pub fn pointer_released(&mut self) -> bool {
        self.slider.on_release()
    }

    /// Read-only view of the current state for a render pass.
    #[must_use]
    pub fn frame(&self, index: u64) -> Frame<'_> {
        let show_slider =
            self.options.variant == Variant::SurfaceAndVolume && self.slider.is_enabled();
        Frame {
            index,
            variant: self.options.variant,
            mode: self.mode(),
            props: self.scene.props(),
            background: self.options.background_color,
            surfaces: &self.surfaces,
            volume: &self.volume,
            slider: show_slider.then_some(&self.slider),
        }
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub fn mode(&self) -> RenderMode {
        self.controller.mode()
    }

    #[must_use]
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    #[must_use]
    pub fn surfaces(&self) -> &SurfaceExtractionPipeline {
        &self.surfaces
    }

    #[must_use]
    pub fn volume(&self) -> &VolumeRenderPipeline {
        &self.volume
    }

    #[must_use]
    pub fn slider(&self) -> &SliderWidget {
        &self.slider
    }

    /// Borrows the shared transfer function.
    #[must_use]
    pub fn transfer_function(&self) -> Ref<'_, TransferFunction> {
        self.transfer.borrow()
    }

    /// Current opacity at an anchor.
    #[must_use]
    pub fn opacity_at(&self, anchor: Anchor) -> f32 {
        self.transfer.borrow().opacity_at(anchor)
    }

    /// Step size as edited by keys, which the volume pipeline receives after
    /// each key.
    #[must_use]
    pub fn sample_step_size(&self) -> f32 {
        self.sample_step_size
    }

    #[must_use]
    pub fn skin_opacity(&self) -> f32 {
        self.surfaces.skin().opacity()
    }
}
