//! Transfer functions mapping scalar values to color and opacity.
//!
//! Both functions are ordered sets of control points keyed by scalar value.
//! Evaluation is piecewise linear between points and clamps to the first and
//! last point outside their range.
//!
//! [`TransferFunction`] pairs a color and an opacity function with two named
//! anchors (`iso1`, `iso2`). Keyboard commands rewrite the opacity at an
//! anchor (or at every point) in place; control points are never inserted or
//! removed by those edits.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Clamps an opacity to `[0, 1]`, mapping NaN to zero.
#[must_use]
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// A color control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorPoint {
    /// Scalar value this point is keyed on.
    pub x: f32,
    /// RGB color in `[0, 1]`.
    pub color: Vec3,
}

impl ColorPoint {
    pub fn new(x: f32, color: Vec3) -> Self {
        Self { x, color }
    }
}

/// An opacity control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpacityPoint {
    /// Scalar value this point is keyed on.
    pub x: f32,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
}

impl OpacityPoint {
    pub fn new(x: f32, opacity: f32) -> Self {
        Self { x, opacity }
    }
}

/// Inserts `point` keeping `points` sorted by `key`, replacing an existing
/// point with the same key. Returns the index of the point.
fn upsert<T>(points: &mut Vec<T>, point: T, key: impl Fn(&T) -> f32) -> usize {
    let x = key(&point);
    let idx = points.partition_point(|p| key(p) < x);
    if points.get(idx).is_some_and(|p| key(p) == x) {
        points[idx] = point;
    } else {
        points.insert(idx, point);
    }
    idx
}

/// Locates the segment containing `x`. Returns the clamped end point index or
/// the segment `(lo, hi, t)` to interpolate.
fn locate<T>(points: &[T], x: f32, key: impl Fn(&T) -> f32) -> Segment {
    let last = points.len() - 1;
    if x <= key(&points[0]) {
        return Segment::Point(0);
    }
    if x >= key(&points[last]) {
        return Segment::Point(last);
    }
    let hi = points.partition_point(|p| key(p) <= x);
    let lo = hi - 1;
    let (x0, x1) = (key(&points[lo]), key(&points[hi]));
    Segment::Between(lo, hi, (x - x0) / (x1 - x0))
}

enum Segment {
    Point(usize),
    Between(usize, usize, f32),
}

/// Piecewise-linear map from scalar value to RGB color.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorTransferFunction {
    points: Vec<ColorPoint>,
}

impl ColorTransferFunction {
    /// Creates an empty color transfer function.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a control point, replacing any point at the same scalar value.
    pub fn add_rgb_point(&mut self, x: f32, color: Vec3) -> usize {
        upsert(&mut self.points, ColorPoint::new(x, color), |p| p.x)
    }

    /// Removes every control point.
    pub fn remove_all_points(&mut self) {
        self.points.clear();
    }

    /// Returns the control points ordered by scalar value.
    #[must_use]
    pub fn points(&self) -> &[ColorPoint] {
        &self.points
    }

    /// Returns the number of control points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no control points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Evaluates the color at a scalar value. Black when empty.
    #[must_use]
    pub fn evaluate(&self, x: f32) -> Vec3 {
        if self.points.is_empty() {
            return Vec3::ZERO;
        }
        match locate(&self.points, x, |p| p.x) {
            Segment::Point(i) => self.points[i].color,
            Segment::Between(lo, hi, t) => self.points[lo].color.lerp(self.points[hi].color, t),
        }
    }
}

/// Piecewise-linear map from scalar value to opacity.
///
/// Every stored opacity is clamped to `[0, 1]` on write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpacityTransferFunction {
    points: Vec<OpacityPoint>,
}

impl OpacityTransferFunction {
    /// Creates an empty opacity transfer function.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a control point, replacing any point at the same scalar value.
    pub fn add_point(&mut self, x: f32, opacity: f32) -> usize {
        upsert(
            &mut self.points,
            OpacityPoint::new(x, clamp_unit(opacity)),
            |p| p.x,
        )
    }

    /// Returns the index of the control point keyed exactly on `x`.
    #[must_use]
    pub fn index_of(&self, x: f32) -> Option<usize> {
        self.points.iter().position(|p| p.x == x)
    }

    /// Rewrites the opacity of the control point at `index`.
    ///
    /// Returns `false` if there is no such point.
    pub fn set_node_value(&mut self, index: usize, opacity: f32) -> bool {
        match self.points.get_mut(index) {
            Some(point) => {
                point.opacity = clamp_unit(opacity);
                true
            }
            None => false,
        }
    }

    /// Removes every control point.
    pub fn remove_all_points(&mut self) {
        self.points.clear();
    }

    /// Returns the control points ordered by scalar value.
    #[must_use]
    pub fn points(&self) -> &[OpacityPoint] {
        &self.points
    }

    /// Returns the number of control points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no control points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Evaluates the opacity at a scalar value. Zero when empty.
    #[must_use]
    pub fn value(&self, x: f32) -> f32 {
        if self.points.is_empty() {
            return 0.0;
        }
        match locate(&self.points, x, |p| p.x) {
            Segment::Point(i) => self.points[i].opacity,
            Segment::Between(lo, hi, t) => {
                let (a, b) = (self.points[lo].opacity, self.points[hi].opacity);
                a + (b - a) * t
            }
        }
    }

    /// Adds `delta` to every control point, clamping each result.
    pub fn shift_all(&mut self, delta: f32) {
        for point in &mut self.points {
            point.opacity = clamp_unit(point.opacity + delta);
        }
    }

    /// Re-clamps every control point.
    pub fn clamp_all(&mut self) {
        for point in &mut self.points {
            point.opacity = clamp_unit(point.opacity);
        }
    }
}

/// One of the two named scalar anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    /// The lower anchor (skin, 500 by default).
    Iso1,
    /// The upper anchor (bone, 1150 by default).
    Iso2,
}

impl Anchor {
    fn index(self) -> usize {
        match self {
            Anchor::Iso1 => 0,
            Anchor::Iso2 => 1,
        }
    }
}

/// A scalar value at which a color and an opacity point are kept together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorPoint {
    /// Scalar value of the anchor.
    pub scalar: f32,
    /// Fixed color re-inserted on every rebuild.
    pub color: Vec3,
    /// Opacity at creation time.
    pub opacity: f32,
}

impl AnchorPoint {
    pub fn new(scalar: f32, color: Vec3, opacity: f32) -> Self {
        Self {
            scalar,
            color,
            opacity,
        }
    }
}

/// Which opacity points a keyboard delta applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpacityAdjustment {
    /// Only the point at one anchor.
    Anchor(Anchor),
    /// Every opacity control point.
    All,
}

/// Color and opacity transfer functions sharing two named anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferFunction {
    color: ColorTransferFunction,
    opacity: OpacityTransferFunction,
    gradient_opacity: Option<OpacityTransferFunction>,
    anchors: [AnchorPoint; 2],
}

impl TransferFunction {
    /// Creates a transfer function with one color and one opacity point per
    /// anchor.
    pub fn with_anchors(iso1: AnchorPoint, iso2: AnchorPoint) -> Self {
        let mut color = ColorTransferFunction::new();
        color.add_rgb_point(iso1.scalar, iso1.color);
        color.add_rgb_point(iso2.scalar, iso2.color);

        let mut opacity = OpacityTransferFunction::new();
        opacity.add_point(iso1.scalar, iso1.opacity);
        opacity.add_point(iso2.scalar, iso2.opacity);

        Self {
            color,
            opacity,
            gradient_opacity: None,
            anchors: [iso1, iso2],
        }
    }

    /// Creates a transfer function from explicit control point lists.
    ///
    /// Per-anchor edits only rewrite a point keyed exactly on the anchor's
    /// scalar value, so `opacities` should list one for each anchor (see
    /// [`TransferFunction::has_anchor_points`]). An anchor without one reads
    /// the interpolated opacity and ignores edits.
    pub fn from_points(
        iso1: AnchorPoint,
        iso2: AnchorPoint,
        colors: &[ColorPoint],
        opacities: &[OpacityPoint],
    ) -> Self {
        let mut color = ColorTransferFunction::new();
        for p in colors {
            color.add_rgb_point(p.x, p.color);
        }
        let mut opacity = OpacityTransferFunction::new();
        for p in opacities {
            opacity.add_point(p.x, p.opacity);
        }
        Self {
            color,
            opacity,
            gradient_opacity: None,
            anchors: [iso1, iso2],
        }
    }

    /// Attaches a gradient-magnitude opacity function.
    #[must_use]
    pub fn with_gradient_opacity(mut self, gradient: &[OpacityPoint]) -> Self {
        let mut function = OpacityTransferFunction::new();
        for p in gradient {
            function.add_point(p.x, p.opacity);
        }
        self.gradient_opacity = Some(function);
        self
    }

    #[must_use]
    pub fn color(&self) -> &ColorTransferFunction {
        &self.color
    }

    #[must_use]
    pub fn opacity(&self) -> &OpacityTransferFunction {
        &self.opacity
    }

    #[must_use]
    pub fn gradient_opacity(&self) -> Option<&OpacityTransferFunction> {
        self.gradient_opacity.as_ref()
    }

    /// Returns the definition of an anchor.
    #[must_use]
    pub fn anchor(&self, anchor: Anchor) -> &AnchorPoint {
        &self.anchors[anchor.index()]
    }

    /// Returns the current opacity at an anchor.
    #[must_use]
    pub fn opacity_at(&self, anchor: Anchor) -> f32 {
        self.opacity.value(self.anchor(anchor).scalar)
    }

    /// Returns true if both anchors have an opacity point keyed exactly on
    /// their scalar value.
    #[must_use]
    pub fn has_anchor_points(&self) -> bool {
        self.anchors
            .iter()
            .all(|a| self.opacity.index_of(a.scalar).is_some())
    }

    /// Adds `delta` to the opacity at `anchor`, clamps to `[0, 1]` and
    /// rewrites the point at exactly the anchor's scalar value.
    ///
    /// Never inserts a point: if the anchor has no point of its own the
    /// function is left unchanged. Returns the opacity at the anchor.
    pub fn set_opacity_at(&mut self, anchor: Anchor, delta: f32) -> f32 {
        let scalar = self.anchor(anchor).scalar;
        let Some(index) = self.opacity.index_of(scalar) else {
            log::warn!("no opacity point at {scalar}; {anchor:?} left unchanged");
            return self.opacity.value(scalar);
        };
        let value = clamp_unit(self.opacity.points[index].opacity + delta);
        self.opacity.set_node_value(index, value);
        value
    }

    /// Adds `delta` to every opacity control point, clamping each.
    pub fn adjust_all(&mut self, delta: f32) {
        self.opacity.shift_all(delta);
    }

    /// Applies an opacity delta with the given targeting.
    pub fn adjust_opacity(&mut self, adjustment: OpacityAdjustment, delta: f32) {
        match adjustment {
            OpacityAdjustment::Anchor(anchor) => {
                self.set_opacity_at(anchor, delta);
            }
            OpacityAdjustment::All => self.adjust_all(delta),
        }
    }

    /// Re-clamps the opacity at both anchors. Idempotent.
    pub fn clamp_anchor_opacities(&mut self) {
        self.set_opacity_at(Anchor::Iso1, 0.0);
        self.set_opacity_at(Anchor::Iso2, 0.0);
    }

    /// Re-clamps every opacity control point. Idempotent.
    pub fn clamp_all_opacities(&mut self) {
        self.opacity.clamp_all();
    }

    /// Clears the color function and re-inserts the two anchors, `iso2`
    /// first, with their fixed colors.
    pub fn rebuild_color_points(&mut self) {
        self.color.remove_all_points();
        for anchor in [Anchor::Iso2, Anchor::Iso1] {
            let point = *self.anchor(anchor);
            self.color.add_rgb_point(point.scalar, point.color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLESH: Vec3 = Vec3::new(1.0, 0.49, 0.25);
    const IVORY: Vec3 = Vec3::new(1.0, 1.0, 0.94);

    fn head_tf() -> TransferFunction {
        TransferFunction::with_anchors(
            AnchorPoint::new(500.0, FLESH, 0.3),
            AnchorPoint::new(1150.0, IVORY, 0.6),
        )
    }

    #[test]
    fn test_opacity_evaluation() {
        let mut f = OpacityTransferFunction::new();
        f.add_point(0.0, 0.0);
        f.add_point(100.0, 1.0);
        assert_eq!(f.value(-5.0), 0.0);
        assert!((f.value(25.0) - 0.25).abs() < 1e-6);
        assert_eq!(f.value(100.0), 1.0);
        assert_eq!(f.value(500.0), 1.0);
        assert_eq!(OpacityTransferFunction::new().value(3.0), 0.0);
    }

    #[test]
    fn test_add_point_replaces_same_key() {
        let mut f = OpacityTransferFunction::new();
        f.add_point(1150.0, 0.6);
        f.add_point(500.0, 0.3);
        assert_eq!(f.len(), 2);
        assert_eq!(f.points()[0].x, 500.0);
        f.add_point(500.0, 0.9);
        assert_eq!(f.len(), 2);
        assert_eq!(f.value(500.0), 0.9);
    }

    #[test]
    fn test_add_point_clamps() {
        let mut f = OpacityTransferFunction::new();
        f.add_point(0.0, 1.7);
        f.add_point(1.0, -0.2);
        f.add_point(2.0, f32::NAN);
        assert_eq!(f.points()[0].opacity, 1.0);
        assert_eq!(f.points()[1].opacity, 0.0);
        assert_eq!(f.points()[2].opacity, 0.0);
    }

    #[test]
    fn test_color_evaluation() {
        let mut c = ColorTransferFunction::new();
        c.add_rgb_point(0.0, Vec3::ZERO);
        c.add_rgb_point(10.0, Vec3::ONE);
        assert!((c.evaluate(5.0) - Vec3::splat(0.5)).length() < 1e-6);
        assert_eq!(c.evaluate(20.0), Vec3::ONE);
        assert_eq!(ColorTransferFunction::new().evaluate(1.0), Vec3::ZERO);
    }

    #[test]
    fn test_set_opacity_at_anchor() {
        let mut tf = head_tf();
        let v = tf.set_opacity_at(Anchor::Iso1, 0.1);
        assert!((v - 0.4).abs() < 1e-6);
        assert!((tf.opacity_at(Anchor::Iso2) - 0.6).abs() < 1e-6);
        assert_eq!(tf.opacity().len(), 2);
    }

    #[test]
    fn test_set_opacity_at_clamps() {
        let mut tf = head_tf();
        for _ in 0..10 {
            tf.set_opacity_at(Anchor::Iso1, -0.1);
        }
        assert_eq!(tf.opacity_at(Anchor::Iso1), 0.0);
        for _ in 0..10 {
            tf.set_opacity_at(Anchor::Iso2, 0.1);
        }
        assert_eq!(tf.opacity_at(Anchor::Iso2), 1.0);
        assert_eq!(tf.opacity().len(), 2);
    }

    #[test]
    fn test_set_opacity_at_never_inserts() {
        let mut tf = TransferFunction::from_points(
            AnchorPoint::new(500.0, FLESH, 0.3),
            AnchorPoint::new(1150.0, IVORY, 0.6),
            &[],
            &[OpacityPoint::new(0.0, 0.1), OpacityPoint::new(2000.0, 0.9)],
        );
        assert!(!tf.has_anchor_points());
        let before = tf.opacity().clone();

        let v = tf.set_opacity_at(Anchor::Iso1, 0.1);
        assert!((v - before.value(500.0)).abs() < 1e-6);
        tf.clamp_anchor_opacities();
        assert_eq!(tf.opacity(), &before);
        assert_eq!(tf.opacity().len(), 2);

        assert!(head_tf().has_anchor_points());
    }

    #[test]
    fn test_adjust_all() {
        let mut tf = TransferFunction::from_points(
            AnchorPoint::new(500.0, FLESH, 0.15),
            AnchorPoint::new(1150.0, IVORY, 0.85),
            &[],
            &[
                OpacityPoint::new(0.0, 0.0),
                OpacityPoint::new(500.0, 0.15),
                OpacityPoint::new(1000.0, 0.15),
                OpacityPoint::new(1150.0, 0.85),
            ],
        );
        tf.adjust_opacity(OpacityAdjustment::All, 0.1);
        let values: Vec<f32> = tf.opacity().points().iter().map(|p| p.opacity).collect();
        assert!((values[0] - 0.1).abs() < 1e-6);
        assert!((values[1] - 0.25).abs() < 1e-6);
        assert!((values[3] - 0.95).abs() < 1e-6);
        tf.adjust_opacity(OpacityAdjustment::All, 0.1);
        assert_eq!(tf.opacity().points()[3].opacity, 1.0);
        assert_eq!(tf.opacity().len(), 4);
    }

    #[test]
    fn test_rebuild_color_points() {
        let mut tf = head_tf();
        for _ in 0..5 {
            tf.rebuild_color_points();
        }
        let points = tf.color().points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], ColorPoint::new(500.0, FLESH));
        assert_eq!(points[1], ColorPoint::new(1150.0, IVORY));
    }

    #[test]
    fn test_clamp_anchor_opacities_is_idempotent() {
        let mut tf = head_tf();
        let before = tf.clone();
        tf.clamp_anchor_opacities();
        tf.clamp_anchor_opacities();
        assert_eq!(tf, before);
    }

    #[test]
    fn test_gradient_opacity() {
        let tf = head_tf().with_gradient_opacity(&[
            OpacityPoint::new(0.0, 0.0),
            OpacityPoint::new(90.0, 0.5),
            OpacityPoint::new(100.0, 1.0),
        ]);
        let gradient = tf.gradient_opacity().unwrap();
        assert_eq!(gradient.len(), 3);
        assert!((gradient.value(95.0) - 0.75).abs() < 1e-6);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn adjustment() -> impl Strategy<Value = OpacityAdjustment> {
        prop_oneof![
            Just(OpacityAdjustment::Anchor(Anchor::Iso1)),
            Just(OpacityAdjustment::Anchor(Anchor::Iso2)),
            Just(OpacityAdjustment::All),
        ]
    }

    proptest! {
        #[test]
        fn opacity_stays_in_unit_interval(
            edits in prop::collection::vec((adjustment(), -1.5f32..1.5), 0..64)
        ) {
            let mut tf = TransferFunction::with_anchors(
                AnchorPoint::new(500.0, Vec3::X, 0.3),
                AnchorPoint::new(1150.0, Vec3::Y, 0.6),
            );
            for (adj, delta) in edits {
                tf.adjust_opacity(adj, delta);
                prop_assert_eq!(tf.opacity().len(), 2);
                for p in tf.opacity().points() {
                    prop_assert!((0.0..=1.0).contains(&p.opacity));
                }
            }
        }
    }
}
