//! MetaImage (`.mhd` / `.mha`) volume reader.
//!
//! The header is a list of `Key = Value` lines terminated by
//! `ElementDataFile`. Sample data either follows the header in the same file
//! (`ElementDataFile = LOCAL`) or lives in a separate raw file resolved
//! relative to the header.

use std::path::{Path, PathBuf};

use glam::{UVec3, Vec3};
use isoscope_core::{IsoscopeError, Result, ScalarField};

use crate::sample::{read_samples, ElementType};
use crate::ScalarFieldReader;

/// Where the sample bytes are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataFile {
    /// Directly after the header.
    Local,
    /// In a separate file.
    External(PathBuf),
}

/// Parsed MetaImage header.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaImageHeader {
    pub dimensions: UVec3,
    pub spacing: Vec3,
    pub origin: Vec3,
    pub element_type: ElementType,
    pub big_endian: bool,
    /// Bytes to skip before the samples; `-1` means the samples end the file.
    pub header_size: Option<i64>,
    pub data_file: DataFile,
    /// Byte length of the header text, including the data file line.
    pub header_len: usize,
}

impl MetaImageHeader {
    /// Parses a header from the start of `bytes`.
    pub fn parse(bytes: &[u8], path: &Path) -> Result<Self> {
        let invalid = |reason: String| IsoscopeError::InvalidHeader {
            path: path.display().to_string(),
            reason,
        };

        let mut ndims: Option<usize> = None;
        let mut dim_size: Option<Vec<u32>> = None;
        let mut spacing: Option<Vec<f32>> = None;
        let mut origin: Option<Vec<f32>> = None;
        let mut element_type = None;
        let mut big_endian = false;
        let mut header_size = None;
        let mut data_file = None;

        let mut pos = 0;
        while pos < bytes.len() && data_file.is_none() {
            let end = bytes[pos..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(bytes.len(), |i| pos + i + 1);
            let line = std::str::from_utf8(&bytes[pos..end])
                .map_err(|_| invalid(format!("non-UTF-8 header line at byte {pos}")))?
                .trim();
            pos = end;

            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(invalid(format!("expected 'Key = Value', got '{line}'")));
            };
            let (key, value) = (key.trim(), value.trim());

            match key.to_ascii_lowercase().as_str() {
                "ndims" => {
                    ndims = Some(
                        value
                            .parse()
                            .map_err(|_| invalid(format!("bad NDims '{value}'")))?,
                    );
                }
                "dimsize" => dim_size = Some(parse_list(value).map_err(invalid)?),
                "elementspacing" | "elementsize" => {
                    if key.eq_ignore_ascii_case("elementspacing") || spacing.is_none() {
                        spacing = Some(parse_list(value).map_err(invalid)?);
                    }
                }
                "offset" | "position" | "origin" => {
                    origin = Some(parse_list(value).map_err(invalid)?);
                }
                "elementtype" => {
                    element_type = Some(ElementType::from_met(value).ok_or_else(|| {
                        IsoscopeError::UnsupportedFormat(format!("element type '{value}'"))
                    })?);
                }
                "elementbyteordermsb" | "binarydatabyteordermsb" => {
                    big_endian = value.eq_ignore_ascii_case("true");
                }
                "headersize" => {
                    header_size = Some(
                        value
                            .parse()
                            .map_err(|_| invalid(format!("bad HeaderSize '{value}'")))?,
                    );
                }
                "compresseddata" if value.eq_ignore_ascii_case("true") => {
                    return Err(IsoscopeError::UnsupportedFormat(
                        "compressed MetaImage data".to_string(),
                    ));
                }
                "elementnumberofchannels" if value != "1" => {
                    return Err(IsoscopeError::UnsupportedFormat(format!(
                        "{value} channels per element"
                    )));
                }
                "elementdatafile" => {
                    data_file = Some(if value.eq_ignore_ascii_case("local") {
                        DataFile::Local
                    } else if value.contains('%') || value.eq_ignore_ascii_case("list") {
                        return Err(IsoscopeError::UnsupportedFormat(format!(
                            "multi-file data '{value}'"
                        )));
                    } else {
                        DataFile::External(PathBuf::from(value))
                    });
                }
                other => log::trace!("ignoring MetaImage key '{other}'"),
            }
        }

        let data_file = data_file.ok_or_else(|| invalid("missing ElementDataFile".into()))?;
        let dim_size = dim_size.ok_or_else(|| invalid("missing DimSize".into()))?;
        let element_type = element_type.ok_or_else(|| invalid("missing ElementType".into()))?;
        let ndims = ndims.unwrap_or(dim_size.len());
        if !(2..=3).contains(&ndims) || dim_size.len() != ndims {
            return Err(invalid(format!(
                "expected 2 or 3 dimensions, got NDims={ndims} with {} sizes",
                dim_size.len()
            )));
        }

        if dim_size.contains(&0) {
            return Err(invalid(format!("zero-sized dimension in DimSize {dim_size:?}")));
        }

        let header = Self {
            dimensions: to_uvec3(&dim_size, 1),
            spacing: to_vec3(spacing.as_deref(), 1.0),
            origin: to_vec3(origin.as_deref(), 0.0),
            element_type,
            big_endian,
            header_size,
            data_file,
            header_len: pos,
        };
        if header.data_len().is_none() {
            return Err(invalid(format!("DimSize {dim_size:?} is too large")));
        }
        Ok(header)
    }

    /// Number of samples described by the header, or `None` if it does not
    /// fit in `usize`.
    #[must_use]
    pub fn num_samples(&self) -> Option<usize> {
        (self.dimensions.x as usize)
            .checked_mul(self.dimensions.y as usize)?
            .checked_mul(self.dimensions.z as usize)
    }

    /// Number of sample bytes described by the header.
    #[must_use]
    pub fn data_len(&self) -> Option<usize> {
        self.num_samples()?.checked_mul(self.element_type.size())
    }
}

fn parse_list<T: std::str::FromStr>(value: &str) -> std::result::Result<Vec<T>, String> {
    value
        .split_whitespace()
        .map(|v| v.parse().map_err(|_| format!("bad number '{v}'")))
        .collect()
}

fn to_uvec3(values: &[u32], fill: u32) -> UVec3 {
    let get = |i: usize| values.get(i).copied().unwrap_or(fill);
    UVec3::new(get(0), get(1), get(2))
}

fn to_vec3(values: Option<&[f32]>, fill: f32) -> Vec3 {
    let values = values.unwrap_or(&[]);
    let get = |i: usize| values.get(i).copied().unwrap_or(fill);
    Vec3::new(get(0), get(1), get(2))
}

/// Reads a MetaImage volume.
#[derive(Debug, Clone)]
pub struct MetaImageReader {
    path: PathBuf,
}

impl MetaImageReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScalarFieldReader for MetaImageReader {
    fn read(&self) -> Result<ScalarField> {
        let bytes = std::fs::read(&self.path)?;
        let header = MetaImageHeader::parse(&bytes, &self.path)?;

        let (data, data_path) = match &header.data_file {
            DataFile::Local => (bytes[header.header_len..].to_vec(), self.path.clone()),
            DataFile::External(name) => {
                let data_path = self
                    .path
                    .parent()
                    .map_or_else(|| name.clone(), |dir| dir.join(name));
                (std::fs::read(&data_path)?, data_path)
            }
        };

        let invalid = |reason: String| IsoscopeError::InvalidHeader {
            path: self.path.display().to_string(),
            reason,
        };
        let (Some(count), Some(needed)) = (header.num_samples(), header.data_len()) else {
            return Err(invalid(format!("DimSize {} is too large", header.dimensions)));
        };
        let skip = match header.header_size {
            Some(-1) => data.len().saturating_sub(needed),
            Some(n) => usize::try_from(n).map_err(|_| invalid(format!("negative HeaderSize {n}")))?,
            None => 0,
        };
        if skip > data.len() {
            return Err(invalid(format!(
                "HeaderSize {skip} is past the end of {} data bytes",
                data.len()
            )));
        }
        let available = data.len() - skip;
        if available < needed {
            return Err(IsoscopeError::SizeMismatch {
                expected: needed,
                actual: available,
            });
        }

        let samples = read_samples(
            &mut &data[skip..skip + needed],
            header.element_type,
            count,
            header.big_endian,
        )?;

        log::info!(
            "read {}x{}x{} {:?} volume from {}",
            header.dimensions.x,
            header.dimensions.y,
            header.dimensions.z,
            header.element_type,
            data_path.display()
        );

        ScalarField::new(header.dimensions, header.spacing, header.origin, samples)
    }
}
