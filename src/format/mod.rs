/// Disk image formats, geometry and lookup tables

/// Format constants
pub mod constants;
/// File extension to format lookup
pub mod filetype;
/// Disk geometry types
pub mod geometry;
/// Known geometry templates
pub mod template;

pub use constants::*;
pub use filetype::{extension_of, DefaultFileTypes, FileTypeTable, FormatCandidate};
pub use geometry::{DiskDensity, Geometry};
pub use template::{DiskTemplate, GeometryMatcher, TemplateTable};

use std::fmt;

/// Disk image container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// D88 indexed container (also D77/D68)
    D88,
    /// Anex86 HDI header followed by raw sectors
    Hdi,
    /// Virtual98 HDD header followed by raw sectors
    Hdd,
    /// T98-Next NHD header followed by raw sectors
    Nhd,
    /// T98 THD header followed by raw sectors
    Thd,
    /// Raw sector dump without any header
    Plain,
}

impl ImageFormat {
    /// Get the magic bytes for this format
    pub fn magic_bytes(&self) -> &'static [u8] {
        match self {
            ImageFormat::Hdd => HDD_SIGNATURE,
            ImageFormat::Nhd => NHD_SIGNATURE,
            ImageFormat::D88 | ImageFormat::Hdi | ImageFormat::Thd | ImageFormat::Plain => &[],
        }
    }

    /// Get a human-readable name for this format
    pub fn name(&self) -> &'static str {
        match self {
            ImageFormat::D88 => "D88",
            ImageFormat::Hdi => "HDI",
            ImageFormat::Hdd => "HDD",
            ImageFormat::Nhd => "NHD",
            ImageFormat::Thd => "THD",
            ImageFormat::Plain => "plain",
        }
    }

    /// Does this format store a header in front of the sector data
    pub fn has_header(&self) -> bool {
        !matches!(self, ImageFormat::Plain)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
