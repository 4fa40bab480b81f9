//! Surface actors: the skin and bone iso-surfaces and the bounding outline.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use crate::options::IsoSurfaceConfig;
use crate::scalar_field::ScalarField;
use crate::transfer_function::clamp_unit;

/// Appearance of an iso-surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceProperty {
    /// Diffuse color.
    pub color: Vec3,
    /// Opacity in `[0, 1]`.
    opacity: f32,
    /// Specular coefficient.
    pub specular: f32,
    /// Specular exponent.
    pub specular_power: f32,
    /// Color used for back faces, if different from the front.
    pub backface_color: Option<Vec3>,
}

impl SurfaceProperty {
    /// Returns the opacity.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Sets the opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = clamp_unit(opacity);
    }
}

impl From<&IsoSurfaceConfig> for SurfaceProperty {
    fn from(config: &IsoSurfaceConfig) -> Self {
        Self {
            color: config.color,
            opacity: clamp_unit(config.opacity),
            specular: config.specular,
            specular_power: config.specular_power,
            backface_color: config.backface_color,
        }
    }
}

/// Shared handle to a surface property, written by the opacity slider.
pub type PropertyHandle = Rc<RefCell<SurfaceProperty>>;

/// An iso-surface extracted at a fixed threshold.
///
/// The threshold is set at construction and never changes; the extraction
/// itself is performed by the render backend.
#[derive(Debug, Clone)]
pub struct IsoSurfaceActor {
    name: String,
    threshold: f32,
    property: PropertyHandle,
}

impl IsoSurfaceActor {
    /// Creates an actor from its configuration.
    pub fn new(name: impl Into<String>, config: &IsoSurfaceConfig) -> Self {
        Self {
            name: name.into(),
            threshold: config.threshold,
            property: Rc::new(RefCell::new(SurfaceProperty::from(config))),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the iso-value this surface is extracted at.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Returns the current opacity.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.property.borrow().opacity()
    }

    /// Returns the current diffuse color.
    #[must_use]
    pub fn color(&self) -> Vec3 {
        self.property.borrow().color
    }

    /// Returns a snapshot of the property.
    #[must_use]
    pub fn property(&self) -> SurfaceProperty {
        self.property.borrow().clone()
    }

    /// Returns a shared handle to the property for bindings.
    #[must_use]
    pub fn property_handle(&self) -> PropertyHandle {
        Rc::clone(&self.property)
    }
}

/// The wireframe box around the scalar field.
#[derive(Debug, Clone)]
pub struct OutlineActor {
    bound_min: Vec3,
    bound_max: Vec3,
    color: Vec3,
}

impl OutlineActor {
    /// Creates an outline around the bounds of a field.
    pub fn new(field: &ScalarField, color: Vec3) -> Self {
        let (bound_min, bound_max) = field.bounds();
        Self {
            bound_min,
            bound_max,
            color,
        }
    }

    #[must_use]
    pub fn color(&self) -> Vec3 {
        self.color
    }

    #[must_use]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.bound_min, self.bound_max)
    }

    /// Returns the 8 corners and 12 edges of the outline box.
    #[must_use]
    pub fn wireframe(&self) -> ([Vec3; 8], [[u32; 2]; 12]) {
        let min = self.bound_min;
        let max = self.bound_max;

        let nodes = [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(max.x, max.y, max.z),
            Vec3::new(min.x, max.y, max.z),
        ];

        let edges = [
            // Bottom face
            [0, 1],
            [1, 2],
            [2, 3],
            [3, 0],
            // Top face
            [4, 5],
            [5, 6],
            [6, 7],
            [7, 4],
            // Vertical edges
            [0, 4],
            [1, 5],
            [2, 6],
            [3, 7],
        ];

        (nodes, edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec3;

    #[test]
    fn test_property_handle_is_shared() {
        let actor = IsoSurfaceActor::new("skin", &IsoSurfaceConfig::skin());
        assert!((actor.opacity() - 0.5).abs() < 1e-6);

        actor.property_handle().borrow_mut().set_opacity(0.2);
        assert!((actor.opacity() - 0.2).abs() < 1e-6);
        assert_eq!(actor.threshold(), 500.0);
    }

    #[test]
    fn test_property_clamps_opacity() {
        let mut property = SurfaceProperty::from(&IsoSurfaceConfig::bone());
        property.set_opacity(3.0);
        assert_eq!(property.opacity(), 1.0);
    }

    #[test]
    fn test_outline_wireframe() {
        let field = ScalarField::new(
            UVec3::new(3, 3, 3),
            Vec3::ONE,
            Vec3::new(-1.0, -1.0, -1.0),
            vec![0.0; 27],
        )
        .unwrap();
        let outline = OutlineActor::new(&field, Vec3::ZERO);
        let (nodes, edges) = outline.wireframe();
        assert_eq!(nodes[0], Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(nodes[6], Vec3::new(1.0, 1.0, 1.0));
        for [a, b] in edges {
            // Every edge connects corners differing along exactly one axis.
            let d = nodes[a as usize] - nodes[b as usize];
            let axes = [d.x, d.y, d.z].iter().filter(|c| c.abs() > 0.0).count();
            assert_eq!(axes, 1);
        }
    }
}
