/// Disk geometry and density types

use crate::error::{ImageError, Result};
use crate::format::constants::{
    fdc_size_covering, MAX_SECTOR_SIZE, MAX_SIDES, MAX_TRACKS_PER_SIDE,
};
use std::fmt;

/// Recording density, as encoded by the D88 disk type byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiskDensity {
    /// 2D: double sided, double density (320K class)
    #[default]
    Double,
    /// 2DD: double sided, double density, double track (640K/720K)
    DoubleTrack,
    /// 2HD: double sided, high density (1.2M/1.44M)
    High,
    /// 1D: single sided, double density
    SingleSided,
    /// 1DD: single sided, double density, double track
    SingleSidedDoubleTrack,
    /// No density recorded, used by hard disk images
    Unspecified,
}

impl DiskDensity {
    /// Decode a D88 disk type byte
    pub fn from_d88_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(DiskDensity::Double),
            0x10 => Some(DiskDensity::DoubleTrack),
            0x20 => Some(DiskDensity::High),
            0x30 => Some(DiskDensity::SingleSided),
            0x40 => Some(DiskDensity::SingleSidedDoubleTrack),
            _ => None,
        }
    }

    /// Encode as a D88 disk type byte
    pub fn d88_code(&self) -> u8 {
        match self {
            DiskDensity::Double | DiskDensity::Unspecified => 0x00,
            DiskDensity::DoubleTrack => 0x10,
            DiskDensity::High => 0x20,
            DiskDensity::SingleSided => 0x30,
            DiskDensity::SingleSidedDoubleTrack => 0x40,
        }
    }

    /// Number of sides implied by the density type
    pub fn sides(&self) -> u32 {
        match self {
            DiskDensity::SingleSided | DiskDensity::SingleSidedDoubleTrack => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for DiskDensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiskDensity::Double => write!(f, "2D"),
            DiskDensity::DoubleTrack => write!(f, "2DD"),
            DiskDensity::High => write!(f, "2HD"),
            DiskDensity::SingleSided => write!(f, "1D"),
            DiskDensity::SingleSidedDoubleTrack => write!(f, "1DD"),
            DiskDensity::Unspecified => write!(f, "-"),
        }
    }
}

/// Physical addressing scheme of a disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    /// Number of sides (heads)
    pub sides: u32,
    /// Number of tracks (cylinders) per side
    pub tracks_per_side: u32,
    /// Sectors per track
    pub sectors_per_track: u32,
    /// Sector size in bytes
    pub sector_size: u32,
    /// Recording density
    pub density: DiskDensity,
    /// Bit map of tracks recorded in single density (template lookup only)
    pub single_density_map: u32,
    /// Bit map of tracks with a non-uniform layout (template lookup only)
    pub particular_tracks_map: u32,
}

impl Geometry {
    /// Create a new geometry with no density and no modifiers
    pub fn new(sides: u32, tracks_per_side: u32, sectors_per_track: u32, sector_size: u32) -> Self {
        Self {
            sides,
            tracks_per_side,
            sectors_per_track,
            sector_size,
            density: DiskDensity::Unspecified,
            single_density_map: 0,
            particular_tracks_map: 0,
        }
    }

    /// Set the density
    pub fn with_density(mut self, density: DiskDensity) -> Self {
        self.density = density;
        self
    }

    /// Set the single density track map
    pub fn with_single_density_map(mut self, map: u32) -> Self {
        self.single_density_map = map;
        self
    }

    /// Set the particular tracks map
    pub fn with_particular_tracks_map(mut self, map: u32) -> Self {
        self.particular_tracks_map = map;
        self
    }

    /// Check every field against its valid range, failing on the first bad field
    ///
    /// `min_tracks` is the format-specific lower bound for tracks per side.
    pub fn validate(&self, min_tracks: u32) -> Result<()> {
        if self.sector_size == 0 || self.sector_size > MAX_SECTOR_SIZE {
            return Err(ImageError::InvalidSectorSize(self.sector_size));
        }
        if self.sectors_per_track == 0 {
            return Err(ImageError::InvalidSectorsPerTrack(self.sectors_per_track));
        }
        if self.sides == 0 || self.sides > MAX_SIDES {
            return Err(ImageError::InvalidSidesPerDisk(self.sides));
        }
        if self.tracks_per_side < min_tracks || self.tracks_per_side > MAX_TRACKS_PER_SIDE {
            return Err(ImageError::InvalidTracksPerSide(self.tracks_per_side));
        }
        Ok(())
    }

    /// Total number of tracks over all sides
    pub fn track_count(&self) -> usize {
        self.sides as usize * self.tracks_per_side as usize
    }

    /// Bytes in one track
    pub fn track_size(&self) -> usize {
        self.sectors_per_track as usize * self.sector_size as usize
    }

    /// Calculate total disk capacity in bytes
    pub fn total_capacity(&self) -> u64 {
        self.track_count() as u64 * self.track_size() as u64
    }

    /// FDC size code for the sector size
    pub fn size_code(&self) -> u8 {
        fdc_size_covering(self.sector_size as usize)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sides, {} tracks, {} sectors x {} bytes ({})",
            self.sides, self.tracks_per_side, self.sectors_per_track, self.sector_size, self.density
        )
    }
}
