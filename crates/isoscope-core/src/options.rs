//! Configuration options for isoscope.
//!
//! Two presets exist, one per [`Variant`]. Options can be loaded from JSON;
//! fields missing from the document keep the preset of the selected variant.

use std::path::Path;

use glam::{UVec2, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{IsoscopeError, Result};
use crate::mode::RenderMode;
use crate::transfer_function::{AnchorPoint, ColorPoint, OpacityPoint, TransferFunction};

/// Named colors used by the presets.
pub mod colors {
    use glam::Vec3;

    pub const BLACK: Vec3 = Vec3::ZERO;
    pub const FLESH: Vec3 = Vec3::new(1.0, 0.49, 0.25);
    pub const IVORY: Vec3 = Vec3::new(1.0, 1.0, 0.941);
    pub const SKIN: Vec3 = Vec3::new(240.0 / 255.0, 184.0 / 255.0, 160.0 / 255.0);
    pub const SKIN_BACKFACE: Vec3 = Vec3::new(1.0, 229.0 / 255.0, 200.0 / 255.0);
    pub const BACKGROUND: Vec3 = Vec3::new(51.0 / 255.0, 77.0 / 255.0, 102.0 / 255.0);
}

/// Which interactive program configuration to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Skin/bone surfaces with a switchable iso-surface volume, per-anchor
    /// opacity keys and a skin opacity slider.
    #[default]
    SurfaceAndVolume,
    /// Composite volume rendering only, with uniform opacity keys.
    VolumeOnly,
}

/// How the volume is composited along each ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Render the surfaces at the iso values.
    #[default]
    IsoSurface,
    /// Front-to-back alpha compositing.
    Composite,
}

/// Lighting applied to the volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadingConfig {
    pub shade: bool,
    pub linear_interpolation: bool,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            shade: true,
            linear_interpolation: true,
            ambient: 0.0,
            diffuse: 0.7,
            specular: 0.2,
        }
    }
}

/// One fixed-threshold surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsoSurfaceConfig {
    pub threshold: f32,
    pub color: Vec3,
    pub opacity: f32,
    pub specular: f32,
    pub specular_power: f32,
    pub backface_color: Option<Vec3>,
}

impl IsoSurfaceConfig {
    /// The skin surface at 500.
    pub fn skin() -> Self {
        Self {
            threshold: 500.0,
            color: colors::SKIN,
            opacity: 0.5,
            specular: 0.3,
            specular_power: 20.0,
            backface_color: Some(colors::SKIN_BACKFACE),
        }
    }

    /// The bone surface at 1150.
    pub fn bone() -> Self {
        Self {
            threshold: 1150.0,
            color: colors::IVORY,
            opacity: 1.0,
            specular: 0.0,
            specular_power: 1.0,
            backface_color: None,
        }
    }
}

/// Volume pipeline parameters and transfer function seed points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeConfig {
    pub iso1: AnchorPoint,
    pub iso2: AnchorPoint,
    /// Color points; when empty, one point per anchor is used.
    pub color_points: Vec<ColorPoint>,
    /// Opacity points; when empty, one point per anchor is used.
    pub opacity_points: Vec<OpacityPoint>,
    /// Gradient-magnitude opacity points; empty disables it.
    pub gradient_opacity_points: Vec<OpacityPoint>,
    pub sample_step_size: f32,
    /// Lower bound applied to the step size after each key, if set.
    pub min_sample_step_size: Option<f32>,
    pub blend_mode: BlendMode,
    pub shading: ShadingConfig,
}

impl VolumeConfig {
    /// Iso-surface blended volume with editable anchors at 500 and 1150.
    pub fn iso_surface() -> Self {
        Self {
            iso1: AnchorPoint::new(500.0, colors::FLESH, 0.3),
            iso2: AnchorPoint::new(1150.0, colors::IVORY, 0.6),
            color_points: Vec::new(),
            opacity_points: Vec::new(),
            gradient_opacity_points: Vec::new(),
            sample_step_size: 0.5,
            min_sample_step_size: None,
            blend_mode: BlendMode::IsoSurface,
            shading: ShadingConfig::default(),
        }
    }

    /// Composite volume with flesh and bone ramps.
    pub fn composite() -> Self {
        let flesh = Vec3::new(1.0, 0.5, 0.3);
        let bone = Vec3::new(1.0, 1.0, 0.9);
        Self {
            iso1: AnchorPoint::new(500.0, flesh, 0.15),
            iso2: AnchorPoint::new(1150.0, bone, 0.85),
            color_points: vec![
                ColorPoint::new(0.0, colors::BLACK),
                ColorPoint::new(500.0, flesh),
                ColorPoint::new(1000.0, flesh),
                ColorPoint::new(1150.0, bone),
            ],
            opacity_points: vec![
                OpacityPoint::new(0.0, 0.0),
                OpacityPoint::new(500.0, 0.15),
                OpacityPoint::new(1000.0, 0.15),
                OpacityPoint::new(1150.0, 0.85),
            ],
            gradient_opacity_points: vec![
                OpacityPoint::new(0.0, 0.0),
                OpacityPoint::new(90.0, 0.5),
                OpacityPoint::new(100.0, 1.0),
            ],
            sample_step_size: 1.0,
            min_sample_step_size: None,
            blend_mode: BlendMode::Composite,
            shading: ShadingConfig {
                ambient: 0.4,
                diffuse: 0.6,
                specular: 0.2,
                ..ShadingConfig::default()
            },
        }
    }

    /// Builds the transfer function seeded by this configuration.
    #[must_use]
    pub fn transfer_function(&self) -> TransferFunction {
        let tf = if self.color_points.is_empty() && self.opacity_points.is_empty() {
            TransferFunction::with_anchors(self.iso1, self.iso2)
        } else {
            TransferFunction::from_points(
                self.iso1,
                self.iso2,
                &self.color_points,
                &self.opacity_points,
            )
        };
        if self.gradient_opacity_points.is_empty() {
            tf
        } else {
            tf.with_gradient_opacity(&self.gradient_opacity_points)
        }
    }

    /// Checks that explicit opacity points give both anchors a point of
    /// their own, so per-anchor keys have something to rewrite.
    pub fn validate(&self) -> Result<()> {
        if self.opacity_points.is_empty() {
            return Ok(());
        }
        for anchor in [&self.iso1, &self.iso2] {
            if !self.opacity_points.iter().any(|p| p.x == anchor.scalar) {
                return Err(IsoscopeError::InvalidConfig(format!(
                    "volume.opacity_points has no point at anchor {}",
                    anchor.scalar
                )));
            }
        }
        Ok(())
    }

    /// Sets the step size floor.
    #[must_use]
    pub fn with_min_sample_step_size(mut self, floor: Option<f32>) -> Self {
        self.min_sample_step_size = floor;
        self
    }
}

/// Increments applied by keyboard commands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    pub step_size_delta: f32,
    pub opacity_delta: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            step_size_delta: 0.1,
            opacity_delta: 0.1,
        }
    }
}

/// Skin opacity slider layout, in normalized display coordinates
/// (origin bottom-left).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderConfig {
    pub title: String,
    pub minimum: f32,
    pub maximum: f32,
    pub point1: Vec2,
    pub point2: Vec2,
    pub slider_length: f32,
    pub slider_width: f32,
    pub end_cap_length: f32,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            title: "Skin Opacity".to_string(),
            minimum: 0.0,
            maximum: 1.0,
            point1: Vec2::new(0.1, 0.1),
            point2: Vec2::new(0.8, 0.1),
            slider_length: 0.05,
            slider_width: 0.025,
            end_cap_length: 0.02,
        }
    }
}

/// Layout of a 16-bit slice series (`prefix.N` files).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceSeriesConfig {
    /// Width and height of every slice.
    pub dimensions: UVec2,
    /// First and last slice number, inclusive.
    pub image_range: (u32, u32),
    pub spacing: Vec3,
    pub little_endian: bool,
}

impl Default for SliceSeriesConfig {
    fn default() -> Self {
        Self {
            dimensions: UVec2::new(64, 64),
            image_range: (1, 93),
            spacing: Vec3::new(3.2, 3.2, 1.5),
            little_endian: true,
        }
    }
}

/// Global configuration options for isoscope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    pub variant: Variant,
    /// Input used when none is given on the command line.
    pub default_input: String,
    pub window_title: String,
    pub window_size: UVec2,
    pub background_color: Vec3,
    pub outline_color: Vec3,
    pub skin: IsoSurfaceConfig,
    pub bone: IsoSurfaceConfig,
    pub volume: VolumeConfig,
    pub input: InputConfig,
    pub slider: SliderConfig,
    pub slice_series: SliceSeriesConfig,
}

impl Default for Options {
    fn default() -> Self {
        Self::surface_and_volume()
    }
}

impl Options {
    /// Preset for the surface-and-volume program.
    pub fn surface_and_volume() -> Self {
        Self {
            variant: Variant::SurfaceAndVolume,
            default_input: "FullHead.mhd".to_string(),
            window_title: "VolumeRendering".to_string(),
            window_size: UVec2::new(800, 600),
            background_color: colors::BACKGROUND,
            outline_color: colors::BLACK,
            skin: IsoSurfaceConfig::skin(),
            bone: IsoSurfaceConfig::bone(),
            volume: VolumeConfig::iso_surface(),
            input: InputConfig::default(),
            slider: SliderConfig::default(),
            slice_series: SliceSeriesConfig::default(),
        }
    }

    /// Preset for the volume-only program.
    pub fn volume_only() -> Self {
        Self {
            variant: Variant::VolumeOnly,
            default_input: "headsq/quarter".to_string(),
            window_size: UVec2::new(640, 480),
            background_color: colors::BLACK,
            volume: VolumeConfig::composite(),
            ..Self::surface_and_volume()
        }
    }

    /// Returns the preset for a variant.
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::SurfaceAndVolume => Self::surface_and_volume(),
            Variant::VolumeOnly => Self::volume_only(),
        }
    }

    /// The mode the session starts in.
    #[must_use]
    pub fn initial_mode(&self) -> RenderMode {
        match self.variant {
            Variant::SurfaceAndVolume => RenderMode::Surface,
            Variant::VolumeOnly => RenderMode::Volume,
        }
    }

    /// Parses options from JSON, filling missing fields from the preset of
    /// the variant named in the document (or the default variant).
    ///
    /// Explicit opacity points must include a point at each anchor.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json_str_as(json, None)
    }

    /// Like [`Options::from_json_str`], but `variant`, when given, replaces
    /// the variant named in the document.
    pub fn from_json_str_as(json: &str, variant: Option<Variant>) -> Result<Self> {
        let mut overrides: serde_json::Value = serde_json::from_str(json)?;
        let variant = match (variant, overrides.get("variant")) {
            (Some(variant), _) => variant,
            (None, Some(v)) => serde_json::from_value(v.clone())?,
            (None, None) => Variant::default(),
        };
        if let Some(object) = overrides.as_object_mut() {
            object.insert("variant".to_string(), serde_json::to_value(variant)?);
        }
        let mut merged = serde_json::to_value(Self::for_variant(variant))?;
        merge_json(&mut merged, overrides);
        let options: Self = serde_json::from_value(merged)?;
        options.volume.validate()?;
        Ok(options)
    }

    /// Reads options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_file_as(path, None)
    }

    /// Reads options from a JSON file, optionally forcing the variant.
    pub fn from_json_file_as(path: impl AsRef<Path>, variant: Option<Variant>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str_as(&text, variant)
    }

    /// Serializes the options as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Sets the step size floor.
    #[must_use]
    pub fn with_min_sample_step_size(mut self, floor: Option<f32>) -> Self {
        self.volume.min_sample_step_size = floor;
        self
    }
}

/// Recursively overlays `overrides` onto `base`. Objects merge by key; any
/// other value replaces the base value.
fn merge_json(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
