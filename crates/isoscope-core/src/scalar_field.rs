//! Immutable 3D scalar fields.
//!
//! A [`ScalarField`] is a regular axis-aligned grid of samples, as produced by
//! a volume reader. Samples are stored x-fastest: the value at node
//! `(i, j, k)` lives at `i + j * nx + k * nx * ny`.

use std::sync::Arc;

use glam::{UVec3, Vec3};

use crate::error::{IsoscopeError, Result};

/// A loaded scalar volume.
///
/// The sample buffer is reference counted so the surface and volume pipelines
/// can share one field without copying it.
#[derive(Debug, Clone)]
pub struct ScalarField {
    dimensions: UVec3,
    spacing: Vec3,
    origin: Vec3,
    samples: Arc<[f32]>,
    range: (f32, f32),
}

impl ScalarField {
    /// Creates a scalar field from its grid description and samples.
    ///
    /// Fails if any dimension is zero, any spacing component is not a
    /// positive finite number, or the sample count is not `nx * ny * nz`.
    pub fn new(dimensions: UVec3, spacing: Vec3, origin: Vec3, samples: Vec<f32>) -> Result<Self> {
        if dimensions.min_element() == 0 {
            return Err(IsoscopeError::InvalidField(format!(
                "dimensions must be non-zero, got {}x{}x{}",
                dimensions.x, dimensions.y, dimensions.z
            )));
        }
        if !spacing.is_finite() || spacing.min_element() <= 0.0 {
            return Err(IsoscopeError::InvalidField(format!(
                "spacing must be positive, got ({}, {}, {})",
                spacing.x, spacing.y, spacing.z
            )));
        }

        let expected = (dimensions.x as usize)
            .checked_mul(dimensions.y as usize)
            .and_then(|n| n.checked_mul(dimensions.z as usize))
            .ok_or_else(|| {
                IsoscopeError::InvalidField(format!(
                    "{}x{}x{} samples do not fit in memory",
                    dimensions.x, dimensions.y, dimensions.z
                ))
            })?;
        if samples.len() != expected {
            return Err(IsoscopeError::SizeMismatch {
                expected,
                actual: samples.len(),
            });
        }

        let range = compute_range(&samples);
        Ok(Self {
            dimensions,
            spacing,
            origin,
            samples: samples.into(),
            range,
        })
    }

    /// Returns the number of nodes in each dimension.
    #[must_use]
    pub fn dimensions(&self) -> UVec3 {
        self.dimensions
    }

    /// Returns the distance between adjacent nodes.
    #[must_use]
    pub fn spacing(&self) -> Vec3 {
        self.spacing
    }

    /// Returns the world position of node `(0, 0, 0)`.
    #[must_use]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Returns all samples, x-fastest.
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Returns the total number of samples.
    #[must_use]
    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    /// Returns the minimum and maximum finite sample values.
    ///
    /// A field with no finite samples reports `(0.0, 1.0)`.
    #[must_use]
    pub fn scalar_range(&self) -> (f32, f32) {
        self.range
    }

    /// Flattens a 3D node index to a linear index.
    #[must_use]
    pub fn flatten_index(&self, i: u32, j: u32, k: u32) -> usize {
        let nx = self.dimensions.x as usize;
        let ny = self.dimensions.y as usize;
        i as usize + j as usize * nx + k as usize * nx * ny
    }

    /// Returns the sample at a node, or `None` outside the grid.
    #[must_use]
    pub fn value(&self, i: u32, j: u32, k: u32) -> Option<f32> {
        let d = self.dimensions;
        if i >= d.x || j >= d.y || k >= d.z {
            return None;
        }
        self.samples.get(self.flatten_index(i, j, k)).copied()
    }

    /// Returns the world position of a node.
    #[must_use]
    pub fn position_of_node(&self, i: u32, j: u32, k: u32) -> Vec3 {
        self.origin + UVec3::new(i, j, k).as_vec3() * self.spacing
    }

    /// Returns the axis-aligned world bounds `(min, max)` of the grid.
    #[must_use]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let extent = (self.dimensions - UVec3::ONE).as_vec3() * self.spacing;
        (self.origin, self.origin + extent)
    }

    /// Returns the center of the grid bounds.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        let (min, max) = self.bounds();
        (min + max) * 0.5
    }
}

fn compute_range(values: &[f32]) -> (f32, f32) {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for &v in values {
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if min > max {
        (0.0, 1.0)
    } else {
        (min, max)
    }
}
