//! Skin opacity slider.
//!
//! [`SliderWidget`] is the slider's interaction model: a value range, a track
//! between two points in normalized display coordinates (origin bottom-left)
//! and a press/drag/release state. [`OpacityBinding`] forwards slider values
//! to a surface property.

use glam::Vec2;
use isoscope_core::options::SliderConfig;
use isoscope_core::PropertyHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    Dragging,
}

/// A horizontal-or-not slider laid out along `point1 -> point2`.
#[derive(Debug, Clone)]
pub struct SliderWidget {
    config: SliderConfig,
    value: f32,
    enabled: bool,
    state: DragState,
}

impl SliderWidget {
    /// Creates an enabled slider with the given initial value.
    pub fn new(config: SliderConfig, value: f32) -> Self {
        let mut slider = Self {
            config,
            value: 0.0,
            enabled: true,
            state: DragState::Idle,
        };
        slider.set_value(value);
        slider
    }

    #[must_use]
    pub fn config(&self) -> &SliderConfig {
        &self.config
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.config.title
    }

    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Sets the value, clamped to the slider range. NaN maps to the minimum.
    pub fn set_value(&mut self, value: f32) {
        let (lo, hi) = self.range();
        self.value = if value.is_nan() {
            lo
        } else {
            value.clamp(lo, hi)
        };
    }

    /// The value range as `(low, high)`.
    #[must_use]
    pub fn range(&self) -> (f32, f32) {
        let SliderConfig {
            minimum, maximum, ..
        } = self.config;
        if minimum <= maximum {
            (minimum, maximum)
        } else {
            (maximum, minimum)
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables input. Disabling ends any drag in progress.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.state = DragState::Idle;
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.state == DragState::Dragging
    }

    /// Parameter of the projection of `position` onto the track, clamped to
    /// `[0, 1]`.
    fn track_parameter(&self, position: Vec2) -> f32 {
        let track = self.config.point2 - self.config.point1;
        let length_squared = track.length_squared();
        if length_squared <= f32::EPSILON {
            return 0.0;
        }
        ((position - self.config.point1).dot(track) / length_squared).clamp(0.0, 1.0)
    }

    /// Value under `position` when projected onto the track.
    #[must_use]
    pub fn value_at(&self, position: Vec2) -> f32 {
        let t = self.track_parameter(position);
        self.config.minimum + t * (self.config.maximum - self.config.minimum)
    }

    /// Position of the slider handle in normalized display coordinates.
    #[must_use]
    pub fn handle_position(&self) -> Vec2 {
        let span = self.config.maximum - self.config.minimum;
        let t = if span.abs() <= f32::EPSILON {
            0.0
        } else {
            ((self.value - self.config.minimum) / span).clamp(0.0, 1.0)
        };
        self.config.point1.lerp(self.config.point2, t)
    }

    /// Returns true if `position` lies on the track, its end caps included,
    /// within `slider_width` of the track line.
    #[must_use]
    pub fn hit_test(&self, position: Vec2) -> bool {
        let track = self.config.point2 - self.config.point1;
        let length = track.length();
        if length <= f32::EPSILON {
            return position.distance(self.config.point1) <= self.config.slider_width;
        }
        let direction = track / length;
        let offset = position - self.config.point1;
        let along = offset.dot(direction);
        let across = offset.perp_dot(direction).abs();
        let cap = self.config.end_cap_length;
        along >= -cap && along <= length + cap && across <= self.config.slider_width
    }

    /// Starts a drag if `position` hits the slider. The handle jumps to the
    /// pressed position.
    ///
    /// Returns the new value if the slider took the press.
    pub fn on_press(&mut self, position: Vec2) -> Option<f32> {
        if !self.enabled || !self.hit_test(position) {
            return None;
        }
        self.state = DragState::Dragging;
        self.set_value(self.value_at(position));
        Some(self.value)
    }

    /// Follows the pointer while dragging.
    ///
    /// Returns the new value if it changed.
    pub fn on_move(&mut self, position: Vec2) -> Option<f32> {
        if !self.enabled || self.state != DragState::Dragging {
            return None;
        }
        let previous = self.value;
        self.set_value(self.value_at(position));
        (self.value != previous).then_some(self.value)
    }

    /// Ends a drag. Returns true if one was in progress.
    pub fn on_release(&mut self) -> bool {
        let was_dragging = self.state == DragState::Dragging;
        self.state = DragState::Idle;
        was_dragging
    }
}

/// Writes slider values into a surface's opacity.
#[derive(Debug, Clone)]
pub struct OpacityBinding {
    target: PropertyHandle,
}

impl OpacityBinding {
    pub fn new(target: PropertyHandle) -> Self {
        Self { target }
    }

    /// Sets the target opacity to `value`.
    pub fn on_slider_changed(&self, value: f32) {
        self.target.borrow_mut().set_opacity(value);
        log::debug!("skin opacity set to {value:.3}");
    }

    #[must_use]
    pub fn target(&self) -> &PropertyHandle {
        &self.target
    }
}
