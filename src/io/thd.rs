/// T98 THD hard disk images
///
/// Only the cylinder count is stored; every THD drive has 8 heads and 33
/// sectors of 256 bytes per track.

use crate::error::Result;
use crate::format::constants::{
    MIN_TRACKS_PER_SIDE, THD_HEADER_SIZE, THD_SECTORS_PER_TRACK, THD_SECTOR_SIZE, THD_SIDES,
};
use crate::format::ImageFormat;
use crate::io::raw::{RawHeaderFields, RawHeaderLayout};
use binrw::{binrw, BinRead};
use std::io::Cursor;

/// THD header record
#[derive(Debug, Clone, PartialEq, Eq)]
#[binrw]
#[brw(little)]
pub struct ThdHeader {
    /// Cylinders; heads and sectors are fixed
    pub cylinders: u16,
    /// Unused
    pub reserved: [u8; THD_HEADER_SIZE - 2],
}

impl ThdHeader {
    /// Build a header for a cylinder count
    pub fn new(cylinders: u16) -> Self {
        Self {
            cylinders,
            reserved: [0; THD_HEADER_SIZE - 2],
        }
    }
}

fn decode(bytes: &[u8]) -> Result<RawHeaderFields> {
    let header = ThdHeader::read(&mut Cursor::new(bytes))?;
    Ok(RawHeaderFields {
        sector_size: THD_SECTOR_SIZE,
        sectors_per_track: THD_SECTORS_PER_TRACK,
        sides: THD_SIDES,
        tracks_per_side: header.cylinders as u32,
        skip: THD_HEADER_SIZE as u64,
    })
}

/// THD header layout
pub const LAYOUT: RawHeaderLayout = RawHeaderLayout {
    format: ImageFormat::Thd,
    header_size: THD_HEADER_SIZE,
    min_tracks: MIN_TRACKS_PER_SIDE,
    decode,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Geometry;
    use binrw::BinWrite;

    #[test]
    fn test_header_size() {
        let mut cursor = Cursor::new(Vec::new());
        ThdHeader::new(310).write(&mut cursor).unwrap();
        let bytes = cursor.into_inner();
        assert_eq!(bytes.len(), THD_HEADER_SIZE);
        assert_eq!(&bytes[..2], &[0x36, 0x01]);
    }

    #[test]
    fn test_decode_fixed_geometry() {
        let mut bytes = vec![0u8; THD_HEADER_SIZE];
        bytes[0] = 40;
        let fields = decode(&bytes).unwrap();
        assert_eq!(fields.geometry(), Geometry::new(8, 40, 33, 256));
        assert_eq!(fields.skip, 256);
    }
}
