//! Raw sample decoding.

use std::io::{self, Read};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};

/// Storage type of one voxel on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    UChar,
    Char,
    UShort,
    Short,
    UInt,
    Int,
    Float,
    Double,
}

impl ElementType {
    /// Parses a MetaImage `ElementType` value such as `MET_SHORT`.
    pub fn from_met(name: &str) -> Option<Self> {
        let ty = match name {
            "MET_UCHAR" => ElementType::UChar,
            "MET_CHAR" => ElementType::Char,
            "MET_USHORT" => ElementType::UShort,
            "MET_SHORT" => ElementType::Short,
            "MET_UINT" => ElementType::UInt,
            "MET_INT" => ElementType::Int,
            "MET_FLOAT" => ElementType::Float,
            "MET_DOUBLE" => ElementType::Double,
            _ => return None,
        };
        Some(ty)
    }

    /// Size of one element in bytes.
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            ElementType::UChar | ElementType::Char => 1,
            ElementType::UShort | ElementType::Short => 2,
            ElementType::UInt | ElementType::Int | ElementType::Float => 4,
            ElementType::Double => 8,
        }
    }
}

/// Decodes `count` samples of type `ty` as `f32`.
pub fn read_samples<R: Read>(
    reader: &mut R,
    ty: ElementType,
    count: usize,
    big_endian: bool,
) -> io::Result<Vec<f32>> {
    if big_endian {
        read_samples_with::<BigEndian, R>(reader, ty, count)
    } else {
        read_samples_with::<LittleEndian, R>(reader, ty, count)
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn read_samples_with<B: ByteOrder, R: Read>(
    reader: &mut R,
    ty: ElementType,
    count: usize,
) -> io::Result<Vec<f32>> {
    let mut samples = Vec::with_capacity(count);
    for _ in 0..count {
        let value = match ty {
            ElementType::UChar => f32::from(reader.read_u8()?),
            ElementType::Char => f32::from(reader.read_i8()?),
            ElementType::UShort => f32::from(reader.read_u16::<B>()?),
            ElementType::Short => f32::from(reader.read_i16::<B>()?),
            ElementType::UInt => reader.read_u32::<B>()? as f32,
            ElementType::Int => reader.read_i32::<B>()? as f32,
            ElementType::Float => reader.read_f32::<B>()?,
            ElementType::Double => reader.read_f64::<B>()? as f32,
        };
        samples.push(value);
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_byte_order() {
        let bytes = [0x01, 0x02, 0xff, 0xff];
        let le = read_samples(&mut &bytes[..], ElementType::Short, 2, false).unwrap();
        assert_eq!(le, vec![513.0, -1.0]);
        let be = read_samples(&mut &bytes[..], ElementType::Short, 2, true).unwrap();
        assert_eq!(be, vec![258.0, -1.0]);
        let ule = read_samples(&mut &bytes[..], ElementType::UShort, 2, false).unwrap();
        assert_eq!(ule, vec![513.0, 65535.0]);
    }

    #[test]
    fn test_short_read_fails() {
        let bytes = [0x01, 0x02, 0x03];
        assert!(read_samples(&mut &bytes[..], ElementType::UShort, 2, false).is_err());
    }

    #[test]
    fn test_met_names() {
        assert_eq!(ElementType::from_met("MET_FLOAT"), Some(ElementType::Float));
        assert_eq!(ElementType::from_met("MET_DOUBLE").map(ElementType::size), Some(8));
        assert_eq!(ElementType::from_met("MET_LONG_LONG"), None);
    }
}
