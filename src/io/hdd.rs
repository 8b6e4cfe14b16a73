/// Virtual98 HDD hard disk images

use crate::error::{ImageError, Result};
use crate::format::constants::{HDD_HEADER_SIZE, HDD_SIGNATURE, MIN_TRACKS_PER_SIDE};
use crate::format::{Geometry, ImageFormat};
use crate::io::raw::{RawHeaderFields, RawHeaderLayout};
use binrw::{binrw, BinRead};
use std::io::Cursor;

/// HDD header record
#[derive(Debug, Clone, PartialEq, Eq)]
#[binrw]
#[brw(little)]
pub struct HddHeader {
    /// "VHD"
    pub signature: [u8; 3],
    /// Version text such as "1.00"
    pub version: [u8; 4],
    /// NUL after the version
    pub delimiter: u8,
    /// Free-form comment
    pub comment: [u8; 128],
    /// Unused
    pub padding1: [u8; 4],
    /// Capacity in megabytes
    pub mb_size: u16,
    /// Sector size in bytes
    pub sector_size: u16,
    /// Sectors per track
    pub sectors: u8,
    /// Heads
    pub surfaces: u8,
    /// Cylinders
    pub cylinders: u16,
    /// Total sector count
    pub totals: u32,
    /// Unused
    pub padding2: [u8; 0x44],
}

impl HddHeader {
    /// Build a header describing a geometry
    pub fn new(geometry: &Geometry) -> Self {
        let mut signature = [0u8; 3];
        signature.copy_from_slice(HDD_SIGNATURE);
        Self {
            signature,
            version: *b"1.00",
            delimiter: 0,
            comment: [0; 128],
            padding1: [0; 4],
            mb_size: (geometry.total_capacity() / (1024 * 1024)) as u16,
            sector_size: geometry.sector_size as u16,
            sectors: geometry.sectors_per_track as u8,
            surfaces: geometry.sides as u8,
            cylinders: geometry.tracks_per_side as u16,
            totals: (geometry.track_count() * geometry.sectors_per_track as usize) as u32,
            padding2: [0; 0x44],
        }
    }
}

fn decode(bytes: &[u8]) -> Result<RawHeaderFields> {
    if !bytes.starts_with(HDD_SIGNATURE) {
        return Err(ImageError::not_recognized(ImageFormat::Hdd));
    }
    let header = HddHeader::read(&mut Cursor::new(bytes))?;
    Ok(RawHeaderFields {
        sector_size: header.sector_size as u32,
        sectors_per_track: header.sectors as u32,
        sides: header.surfaces as u32,
        tracks_per_side: header.cylinders as u32,
        skip: HDD_HEADER_SIZE as u64,
    })
}

/// HDD header layout
pub const LAYOUT: RawHeaderLayout = RawHeaderLayout {
    format: ImageFormat::Hdd,
    header_size: HDD_HEADER_SIZE,
    min_tracks: MIN_TRACKS_PER_SIDE,
    decode,
};

#[cfg(test)]
mod tests {
    use super::*;
    use binrw::BinWrite;

    fn header_bytes(header: &HddHeader) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        header.write(&mut cursor).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_header_layout() {
        let bytes = header_bytes(&HddHeader::new(&Geometry::new(8, 615, 33, 256)));
        assert_eq!(bytes.len(), HDD_HEADER_SIZE);
        assert_eq!(&bytes[..3], b"VHD");
        // sector size at 0x8E, cylinders at 0x92
        assert_eq!(&bytes[0x8E..0x90], &256u16.to_le_bytes());
        assert_eq!(bytes[0x90], 33);
        assert_eq!(bytes[0x91], 8);
        assert_eq!(&bytes[0x92..0x94], &615u16.to_le_bytes());
    }

    #[test]
    fn test_decode() {
        let bytes = header_bytes(&HddHeader::new(&Geometry::new(8, 615, 33, 256)));
        let fields = decode(&bytes).unwrap();
        assert_eq!(fields.geometry(), Geometry::new(8, 615, 33, 256));
        assert_eq!(fields.skip, 220);
    }

    #[test]
    fn test_decode_bad_signature() {
        let mut bytes = header_bytes(&HddHeader::new(&Geometry::new(8, 615, 33, 256)));
        bytes[2] = b'X';
        assert!(matches!(
            decode(&bytes),
            Err(ImageError::NotRecognized { format: ImageFormat::Hdd })
        ));
    }
}
