/// Anex86 HDI hard disk images
///
/// The header carries no signature; files are trusted by extension. The
/// geometry is stored as little-endian 32-bit words at the start of the
/// record.

use crate::error::Result;
use crate::format::constants::{HDI_HEADER_SIZE, MIN_TRACKS_PER_SIDE};
use crate::format::{Geometry, ImageFormat};
use crate::io::raw::{RawHeaderFields, RawHeaderLayout};
use binrw::{binrw, BinRead};
use std::io::Cursor;

/// HDI header record
#[derive(Debug, Clone, PartialEq, Eq)]
#[binrw]
#[brw(little)]
pub struct HdiHeader {
    /// Always zero
    pub reserved: u32,
    /// Drive type, 0 for SASI
    pub hdd_type: u32,
    /// Offset of the sector data as written by Anex86
    pub header_size: u32,
    /// Bytes of sector data
    pub disk_size: u32,
    /// Sector size in bytes
    pub sector_size: u32,
    /// Sectors per track
    pub sectors: u32,
    /// Heads
    pub surfaces: u32,
    /// Cylinders
    pub cylinders: u32,
    /// Unused
    pub padding: [u8; HDI_HEADER_SIZE - 32],
}

impl HdiHeader {
    /// Build a header describing a geometry
    pub fn new(geometry: &Geometry) -> Self {
        Self {
            reserved: 0,
            hdd_type: 0,
            header_size: HDI_HEADER_SIZE as u32,
            disk_size: geometry.total_capacity() as u32,
            sector_size: geometry.sector_size,
            sectors: geometry.sectors_per_track,
            surfaces: geometry.sides,
            cylinders: geometry.tracks_per_side,
            padding: [0; HDI_HEADER_SIZE - 32],
        }
    }
}

fn decode(bytes: &[u8]) -> Result<RawHeaderFields> {
    let header = HdiHeader::read(&mut Cursor::new(bytes))?;
    Ok(RawHeaderFields {
        sector_size: header.sector_size,
        sectors_per_track: header.sectors,
        sides: header.surfaces,
        tracks_per_side: header.cylinders,
        skip: HDI_HEADER_SIZE as u64,
    })
}

/// HDI header layout
pub const LAYOUT: RawHeaderLayout = RawHeaderLayout {
    format: ImageFormat::Hdi,
    header_size: HDI_HEADER_SIZE,
    min_tracks: MIN_TRACKS_PER_SIDE,
    decode,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImageError;
    use binrw::BinWrite;

    fn header_bytes(header: &HdiHeader) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        header.write(&mut cursor).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_header_size() {
        let bytes = header_bytes(&HdiHeader::new(&Geometry::new(4, 153, 33, 256)));
        assert_eq!(bytes.len(), HDI_HEADER_SIZE);
    }

    #[test]
    fn test_decode_little_endian() {
        let mut bytes = vec![0u8; HDI_HEADER_SIZE];
        bytes[16..20].copy_from_slice(&512u32.to_le_bytes());
        bytes[20..24].copy_from_slice(&17u32.to_le_bytes());
        bytes[24..28].copy_from_slice(&8u32.to_le_bytes());
        bytes[28..32].copy_from_slice(&615u32.to_le_bytes());

        let fields = decode(&bytes).unwrap();
        assert_eq!(fields.geometry(), Geometry::new(8, 615, 17, 512));
        assert_eq!(fields.skip, 220);
    }

    #[test]
    fn test_decode_short() {
        assert!(matches!(decode(&[0u8; 10]), Err(ImageError::ImageTooSmall)));
    }
}
