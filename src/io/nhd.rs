/// T98-Next NHD hard disk images

use crate::error::{ImageError, Result};
use crate::format::constants::{MIN_TRACKS_PER_SIDE, NHD_HEADER_SIZE, NHD_SIGNATURE};
use crate::format::{Geometry, ImageFormat};
use crate::io::raw::{RawHeaderFields, RawHeaderLayout};
use binrw::{binrw, BinRead};
use std::io::Cursor;

/// NHD header record
#[derive(Debug, Clone, PartialEq, Eq)]
#[binrw]
#[brw(little)]
pub struct NhdHeader {
    /// "T98HDDIMAGE.R0" NUL padded
    pub signature: [u8; 16],
    /// Free-form comment
    pub comment: [u8; 0x100],
    /// Offset of the sector data
    pub header_size: u32,
    /// Cylinders
    pub cylinders: u32,
    /// Heads
    pub surfaces: u16,
    /// Sectors per track
    pub sectors: u16,
    /// Sector size in bytes
    pub sector_size: u16,
    /// Unused
    pub reserved: [u8; 0xE2],
}

impl NhdHeader {
    /// Build a header describing a geometry
    pub fn new(geometry: &Geometry) -> Self {
        let mut signature = [0u8; 16];
        signature[..14].copy_from_slice(b"T98HDDIMAGE.R0");
        Self {
            signature,
            comment: [0; 0x100],
            header_size: NHD_HEADER_SIZE as u32,
            cylinders: geometry.tracks_per_side,
            surfaces: geometry.sides as u16,
            sectors: geometry.sectors_per_track as u16,
            sector_size: geometry.sector_size as u16,
            reserved: [0; 0xE2],
        }
    }
}

fn decode(bytes: &[u8]) -> Result<RawHeaderFields> {
    if !bytes.starts_with(NHD_SIGNATURE) {
        return Err(ImageError::not_recognized(ImageFormat::Nhd));
    }
    let header = NhdHeader::read(&mut Cursor::new(bytes))?;
    // Older writers leave the header size at zero
    let skip = if header.header_size as usize >= NHD_HEADER_SIZE {
        header.header_size as u64
    } else {
        NHD_HEADER_SIZE as u64
    };
    Ok(RawHeaderFields {
        sector_size: header.sector_size as u32,
        sectors_per_track: header.sectors as u32,
        sides: header.surfaces as u32,
        tracks_per_side: header.cylinders,
        skip,
    })
}

/// NHD header layout
pub const LAYOUT: RawHeaderLayout = RawHeaderLayout {
    format: ImageFormat::Nhd,
    header_size: NHD_HEADER_SIZE,
    min_tracks: MIN_TRACKS_PER_SIDE,
    decode,
};
