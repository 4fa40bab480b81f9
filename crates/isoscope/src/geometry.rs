//! Line geometry drawn by the window backend.
//!
//! A frame becomes a flat list of colored segments in normalized device
//! coordinates: the outline box seen from a fixed camera, the skin opacity
//! slider when it is shown, and in volume mode the opacity curve of the
//! transfer function with each segment tinted by the color function.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use isoscope_core::{OutlineActor, PropId, RenderMode, TransferFunction};

use crate::render::Frame;
use crate::slider::SliderWidget;

const TRACK_COLOR: Vec4 = Vec4::new(0.8, 0.8, 0.8, 1.0);
const HANDLE_COLOR: Vec4 = Vec4::ONE;

/// Samples taken along the opacity curve.
const CURVE_SAMPLES: usize = 64;
/// Corners of the opacity curve plot, in normalized display coordinates.
const CURVE_MIN: Vec2 = Vec2::new(0.1, 0.05);
const CURVE_MAX: Vec2 = Vec2::new(0.9, 0.25);

/// Vertical field of view of the default camera.
const FOV_Y_DEGREES: f32 = 30.0;

/// Vertex layout shared with the line shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

/// Segments for a single draw call, two vertices each.
#[derive(Debug, Clone, Default)]
pub struct LineBatch {
    vertices: Vec<LineVertex>,
}

impl LineBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a segment in normalized device coordinates.
    pub fn push(&mut self, a: Vec2, b: Vec2, color: Vec4) {
        let color = color.to_array();
        self.vertices.push(LineVertex {
            position: a.to_array(),
            color,
        });
        self.vertices.push(LineVertex {
            position: b.to_array(),
            color,
        });
    }

    /// Adds a segment in normalized display coordinates (origin bottom-left).
    pub fn push_display(&mut self, a: Vec2, b: Vec2, color: Vec4) {
        self.push(display_to_ndc(a), display_to_ndc(b), color);
    }

    #[must_use]
    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len() / 2
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

fn display_to_ndc(p: Vec2) -> Vec2 {
    p * 2.0 - Vec2::ONE
}

/// View-projection of the default camera: looking down from +Y with view up
/// -Z, turned 30 degrees in azimuth and elevation, far enough back that a
/// sphere of `radius` around `center` fits the view.
#[must_use]
pub fn default_camera(center: Vec3, radius: f32, aspect: f32) -> Mat4 {
    let up = Vec3::NEG_Z;
    let dir = Quat::from_axis_angle(up, 30f32.to_radians()) * Vec3::Y;
    let right = dir.cross(up).normalize();
    let dir = Quat::from_axis_angle(right, 30f32.to_radians()) * dir;

    let fov = FOV_Y_DEGREES.to_radians();
    let radius = radius.max(f32::EPSILON);
    let distance = radius / (fov * 0.5).sin();
    let eye = center + dir * distance;

    let view = Mat4::look_at_rh(eye, center, up);
    let near = (distance - radius).max(distance * 0.01);
    let projection = Mat4::perspective_rh(fov, aspect.max(f32::EPSILON), near, distance + radius);
    projection * view
}

/// Builds the line geometry for `frame` on a surface with the given aspect
/// ratio (width over height).
#[must_use]
pub fn frame_lines(frame: &Frame<'_>, aspect: f32) -> LineBatch {
    let mut batch = LineBatch::new();
    if frame.shows(PropId::Outline) {
        let center = frame.surfaces.field().center();
        push_outline(&mut batch, frame.surfaces.outline(), center, aspect);
    }
    if frame.mode == RenderMode::Volume {
        if let Some(tf) = frame.volume.transfer_function() {
            push_opacity_curve(&mut batch, &tf);
        }
    }
    if let Some(slider) = frame.slider {
        push_slider(&mut batch, slider);
    }
    batch
}

fn push_outline(batch: &mut LineBatch, outline: &OutlineActor, center: Vec3, aspect: f32) {
    let (min, max) = outline.bounds();
    let camera = default_camera(center, (max - min).length() * 0.5, aspect);
    let (corners, edges) = outline.wireframe();
    let projected = corners.map(|c| camera.project_point3(c).truncate());
    let color = outline.color().extend(1.0);
    for [a, b] in edges {
        batch.push(projected[a as usize], projected[b as usize], color);
    }
}

fn push_slider(batch: &mut LineBatch, slider: &SliderWidget) {
    let config = slider.config();
    let along = (config.point2 - config.point1).try_normalize().unwrap_or(Vec2::X);
    let across = along.perp() * config.slider_width;
    let cap = along * config.end_cap_length;

    let (start, end) = (config.point1 - cap, config.point2 + cap);
    batch.push_display(start, end, TRACK_COLOR);
    for p in [start, end] {
        batch.push_display(p - across, p + across, TRACK_COLOR);
    }

    let center = slider.handle_position();
    let half = along * (config.slider_length * 0.5);
    let corners = [
        center - half - across,
        center + half - across,
        center + half + across,
        center - half + across,
    ];
    for (i, &corner) in corners.iter().enumerate() {
        batch.push_display(corner, corners[(i + 1) % corners.len()], HANDLE_COLOR);
    }
}

#[allow(clippy::cast_precision_loss)]
fn push_opacity_curve(batch: &mut LineBatch, tf: &TransferFunction) {
    let points = tf.opacity().points();
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return;
    };
    let (lo, hi) = (first.x, last.x);
    let size = CURVE_MAX - CURVE_MIN;

    batch.push_display(CURVE_MIN, Vec2::new(CURVE_MAX.x, CURVE_MIN.y), TRACK_COLOR);
    let sample = |i: usize| {
        let t = i as f32 / (CURVE_SAMPLES - 1) as f32;
        let x = lo + t * (hi - lo);
        let position = CURVE_MIN + Vec2::new(t, tf.opacity().value(x)) * size;
        (position, tf.color().evaluate(x).extend(1.0))
    };
    for i in 1..CURVE_SAMPLES {
        let (a, _) = sample(i - 1);
        let (b, color) = sample(i);
        batch.push_display(a, b, color);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::session::Session;
    use isoscope_core::{Options, ScalarField, UVec3};

    fn session(options: Options) -> Session {
        let samples = (0..27u16).map(|v| f32::from(v) * 50.0).collect();
        let field =
            ScalarField::new(UVec3::splat(3), Vec3::new(3.2, 3.2, 1.5), Vec3::ZERO, samples)
                .unwrap();
        Session::new(Arc::new(field), options)
    }

    fn in_view(p: [f32; 2]) -> bool {
        p.iter().all(|v| v.is_finite() && v.abs() <= 1.0 + 1e-4)
    }

    #[test]
    fn test_surface_frame_lines() {
        let session = session(Options::surface_and_volume());
        let batch = frame_lines(&session.frame(0), 800.0 / 600.0);

        // 12 outline edges, then the slider track, 2 end caps and 4 handle sides.
        assert_eq!(batch.len(), 12 + 7);
        assert!(batch.vertices().iter().all(|v| in_view(v.position)));
        let outline = &batch.vertices()[..24];
        assert!(outline.iter().all(|v| v.color == [0.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_volume_frame_lines() {
        let mut session = session(Options::surface_and_volume());
        session.handle_key("v");
        let batch = frame_lines(&session.frame(1), 1.0);

        // No slider; the opacity curve has a baseline plus one segment per
        // pair of samples.
        assert_eq!(batch.len(), 12 + 1 + (CURVE_SAMPLES - 1));
        assert!(batch.vertices().iter().all(|v| in_view(v.position)));

        // The curve starts at the opacity of the first anchor.
        let start = batch.vertices()[26].position;
        let expected = display_to_ndc(CURVE_MIN + Vec2::new(0.0, 0.3) * (CURVE_MAX - CURVE_MIN));
        assert!((Vec2::from(start) - expected).length() < 1e-5);
    }

    #[test]
    fn test_slider_handle_follows_value() {
        let mut session = session(Options::surface_and_volume());
        let left = frame_lines(&session.frame(0), 1.0);
        session.on_slider_changed(1.0);
        let right = frame_lines(&session.frame(1), 1.0);

        let handle_x = |batch: &LineBatch| batch.vertices()[batch.vertices().len() - 1].position[0];
        assert!(handle_x(&right) > handle_x(&left));
    }

    #[test]
    fn test_display_to_ndc() {
        assert_eq!(display_to_ndc(Vec2::ZERO), Vec2::NEG_ONE);
        assert_eq!(display_to_ndc(Vec2::splat(0.5)), Vec2::ZERO);
        assert_eq!(display_to_ndc(Vec2::ONE), Vec2::ONE);
    }

    #[test]
    fn test_default_camera_centers_the_field() {
        let camera = default_camera(Vec3::new(5.0, 5.0, 5.0), 2.0, 1.0);
        let p = camera.project_point3(Vec3::new(5.0, 5.0, 5.0));
        assert!(p.truncate().length() < 1e-5);
    }
}
