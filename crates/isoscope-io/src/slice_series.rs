//! Reader for a volume stored as one raw 16-bit file per slice.
//!
//! Slice `n` of a series with prefix `headsq/quarter` lives in
//! `headsq/quarter.n`. Any bytes in front of the pixel data are treated as a
//! header and skipped.

use std::path::{Path, PathBuf};

use glam::UVec3;
use isoscope_core::options::SliceSeriesConfig;
use isoscope_core::{IsoscopeError, Result, ScalarField};

use crate::sample::{read_samples, ElementType};
use crate::ScalarFieldReader;

/// Reads a series of unsigned 16-bit slices.
#[derive(Debug, Clone)]
pub struct SliceSeriesReader {
    prefix: PathBuf,
    config: SliceSeriesConfig,
}

impl SliceSeriesReader {
    pub fn new(prefix: impl Into<PathBuf>, config: SliceSeriesConfig) -> Self {
        Self {
            prefix: prefix.into(),
            config,
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Path of slice number `index`.
    #[must_use]
    pub fn slice_path(&self, index: u32) -> PathBuf {
        PathBuf::from(format!("{}.{index}", self.prefix.display()))
    }
}

impl ScalarFieldReader for SliceSeriesReader {
    fn read(&self) -> Result<ScalarField> {
        let (first, last) = self.config.image_range;
        if last < first {
            return Err(IsoscopeError::InvalidField(format!(
                "empty image range {first}..={last}"
            )));
        }

        let Some(depth) = (last - first).checked_add(1) else {
            return Err(IsoscopeError::InvalidField(format!(
                "image range {first}..={last} has too many slices"
            )));
        };

        let width = self.config.dimensions.x;
        let height = self.config.dimensions.y;
        let too_large =
            || IsoscopeError::InvalidField(format!("{width}x{height}x{depth} slices are too large"));
        let pixels = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(too_large)?;
        let slice_bytes = pixels
            .checked_mul(ElementType::UShort.size())
            .ok_or_else(too_large)?;
        pixels.checked_mul(depth as usize).ok_or_else(too_large)?;

        // Grows per slice; the range may name slices that do not exist.
        let mut samples = Vec::new();
        for index in first..=last {
            let path = self.slice_path(index);
            let bytes = std::fs::read(&path)?;
            if bytes.len() < slice_bytes {
                return Err(IsoscopeError::SizeMismatch {
                    expected: slice_bytes,
                    actual: bytes.len(),
                });
            }
            let skip = bytes.len() - slice_bytes;
            if skip > 0 {
                log::debug!("skipping {skip} header bytes in {}", path.display());
            }
            samples.extend(read_samples(
                &mut &bytes[skip..],
                ElementType::UShort,
                pixels,
                !self.config.little_endian,
            )?);
        }

        log::info!(
            "read {width}x{height}x{depth} slice series from {}.*",
            self.prefix.display()
        );

        ScalarField::new(
            UVec3::new(width, height, depth),
            self.config.spacing,
            glam::Vec3::ZERO,
            samples,
        )
    }
}
