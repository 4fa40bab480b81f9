//! Scalar field readers for isoscope.
//!
//! Every format implements [`ScalarFieldReader`]. [`reader_for`] picks a
//! reader from the input path: `.mhd` and `.mha` files are MetaImage volumes,
//! anything else is taken as the prefix of a 16-bit slice series.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod metaimage;
pub mod sample;
pub mod slice_series;

use std::path::Path;

use isoscope_core::{Options, Result, ScalarField};

pub use metaimage::{MetaImageHeader, MetaImageReader};
pub use sample::ElementType;
pub use slice_series::SliceSeriesReader;

/// Produces a [`ScalarField`] from some storage.
pub trait ScalarFieldReader {
    /// Reads the whole field. Any failure is fatal to the caller.
    fn read(&self) -> Result<ScalarField>;
}

/// Chooses a reader for `path`.
pub fn reader_for(path: &Path, options: &Options) -> Box<dyn ScalarFieldReader> {
    let is_metaimage = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mhd") || e.eq_ignore_ascii_case("mha"));

    if is_metaimage {
        Box::new(MetaImageReader::new(path))
    } else {
        Box::new(SliceSeriesReader::new(path, options.slice_series))
    }
}

/// Reads the scalar field at `path` with the reader [`reader_for`] selects.
pub fn read_scalar_field(path: &Path, options: &Options) -> Result<ScalarField> {
    log::info!("loading scalar field from {}", path.display());
    reader_for(path, options).read()
}
