use crate::format::ImageFormat;
use thiserror::Error;

/// Result type alias for disk image operations
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors that can occur when reading or writing disk images
#[derive(Debug, Error)]
pub enum ImageError {
    /// I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete header or any sector could be read
    #[error("Image is too small")]
    ImageTooSmall,

    /// The header signature or layout does not belong to the format
    #[error("Not a recognized {format} image")]
    NotRecognized {
        /// Format whose check failed
        format: ImageFormat,
    },

    /// Sector size outside of (0, 4096]
    #[error("Invalid sector size: {0}")]
    InvalidSectorSize(u32),

    /// Sectors per track is zero
    #[error("Invalid sectors per track: {0}")]
    InvalidSectorsPerTrack(u32),

    /// Sides per disk outside of [1, 32]
    #[error("Invalid sides per disk: {0}")]
    InvalidSidesPerDisk(u32),

    /// Tracks per side outside of the format's range
    #[error("Invalid tracks per side: {0}")]
    InvalidTracksPerSide(u32),

    /// A parse was requested without usable disk parameters
    #[error("Invalid disk parameters")]
    InvalidDiskParameters,

    /// No registered format accepted the image
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// No disk was supplied to the writer
    #[error("No disk")]
    NoDisk,

    /// The disk has no track data to write
    #[error("No data")]
    NoData,

    /// Invalid track index specified
    #[error("Invalid track {track} (max: {max})")]
    InvalidTrack {
        /// Track index
        track: usize,
        /// Maximum allowed track index
        max: usize,
    },

    /// Invalid sector ID specified
    #[error("Invalid sector: id={id} on track {track}")]
    InvalidSector {
        /// Track index
        track: usize,
        /// Sector record number
        id: u16,
    },

    /// A sector holds more data than a D88 sector header can describe
    #[error("Sector {record} on track {track} is too large: {size} bytes")]
    SectorTooLarge {
        /// Track index
        track: usize,
        /// Sector record number
        record: u16,
        /// Data length in bytes
        size: usize,
    },

    /// The disk does not fit in a D88 container's 32-bit offsets
    #[error("Disk too large for a D88 container")]
    DiskTooLarge,

    /// Binary layout decode or encode failure
    #[error("Binary layout error: {0}")]
    Binary(String),
}

/// Diagnostic code for each error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// See [`ImageError::Io`]
    Io,
    /// See [`ImageError::ImageTooSmall`]
    ImageTooSmall,
    /// See [`ImageError::NotRecognized`]
    NotRecognized,
    /// See [`ImageError::InvalidSectorSize`]
    InvalidSectorSize,
    /// See [`ImageError::InvalidSectorsPerTrack`]
    InvalidSectorsPerTrack,
    /// See [`ImageError::InvalidSidesPerDisk`]
    InvalidSidesPerDisk,
    /// See [`ImageError::InvalidTracksPerSide`]
    InvalidTracksPerSide,
    /// See [`ImageError::InvalidDiskParameters`]
    InvalidDiskParameters,
    /// See [`ImageError::UnsupportedFormat`]
    UnsupportedFormat,
    /// See [`ImageError::NoDisk`]
    NoDisk,
    /// See [`ImageError::NoData`]
    NoData,
    /// See [`ImageError::InvalidTrack`]
    InvalidTrack,
    /// See [`ImageError::InvalidSector`]
    InvalidSector,
    /// See [`ImageError::SectorTooLarge`]
    SectorTooLarge,
    /// See [`ImageError::DiskTooLarge`]
    DiskTooLarge,
    /// See [`ImageError::Binary`]
    Binary,
    /// No template matched; the caller must confirm a geometry
    ManualGeometryRequired,
}

impl ImageError {
    /// Get the diagnostic code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            ImageError::Io(_) => ErrorCode::Io,
            ImageError::ImageTooSmall => ErrorCode::ImageTooSmall,
            ImageError::NotRecognized { .. } => ErrorCode::NotRecognized,
            ImageError::InvalidSectorSize(_) => ErrorCode::InvalidSectorSize,
            ImageError::InvalidSectorsPerTrack(_) => ErrorCode::InvalidSectorsPerTrack,
            ImageError::InvalidSidesPerDisk(_) => ErrorCode::InvalidSidesPerDisk,
            ImageError::InvalidTracksPerSide(_) => ErrorCode::InvalidTracksPerSide,
            ImageError::InvalidDiskParameters => ErrorCode::InvalidDiskParameters,
            ImageError::UnsupportedFormat(_) => ErrorCode::UnsupportedFormat,
            ImageError::NoDisk => ErrorCode::NoDisk,
            ImageError::NoData => ErrorCode::NoData,
            ImageError::InvalidTrack { .. } => ErrorCode::InvalidTrack,
            ImageError::InvalidSector { .. } => ErrorCode::InvalidSector,
            ImageError::SectorTooLarge { .. } => ErrorCode::SectorTooLarge,
            ImageError::DiskTooLarge => ErrorCode::DiskTooLarge,
            ImageError::Binary(_) => ErrorCode::Binary,
        }
    }

    /// Create a not-recognized error for a format
    pub fn not_recognized(format: ImageFormat) -> Self {
        ImageError::NotRecognized { format }
    }

    /// Create an unsupported format error
    pub fn unsupported<S: Into<String>>(message: S) -> Self {
        ImageError::UnsupportedFormat(message.into())
    }
}

impl From<binrw::Error> for ImageError {
    fn from(err: binrw::Error) -> Self {
        // Field reads wrap their EOF in a backtrace
        if err.is_eof() {
            return ImageError::ImageTooSmall;
        }
        match err {
            binrw::Error::Io(io) => ImageError::Io(io),
            other => ImageError::Binary(other.to_string()),
        }
    }
}
