/// Disk image data structures

/// Image builder for creating blank images
pub mod builder;
/// Disk structure
pub mod disk;
/// Sector definition
pub mod sector;
/// Track definition
pub mod track;

pub use builder::DiskImageBuilder;
pub use disk::Disk;
pub use sector::{Sector, SectorId};
pub use track::Track;

use crate::diagnostics::Diagnostics;
use crate::error::{ImageError, Result};
use crate::format::ImageFormat;
use crate::io::{Dispatcher, D88Writer, FormatRequest, WriterOptions};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A loaded image file, holding one or more disks
#[derive(Debug, Clone)]
pub struct DiskImage {
    /// Format the image was read from
    pub(crate) format: ImageFormat,
    /// Disks in file order
    pub(crate) disks: Vec<Disk>,
    /// Bytes skipped in front of the sector data
    pub(crate) start_offset: u64,
    /// Original filename if loaded from disk
    pub(crate) filename: Option<String>,
}

impl DiskImage {
    /// Create an empty image of a format
    pub fn new(format: ImageFormat) -> Self {
        Self {
            format,
            disks: Vec::new(),
            start_offset: 0,
            filename: None,
        }
    }

    /// Open an image file, choosing the format from its extension
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let filename = path
            .as_ref()
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string());
        let request = FormatRequest::from_path(&path);

        let mut file = File::open(&path)?;
        let mut diag = Diagnostics::new();
        let mut image = Dispatcher::default().parse_auto(request, &mut file, &mut diag)?;
        image.filename = filename;
        Ok(image)
    }

    /// Create a new builder for constructing blank images
    pub fn builder() -> DiskImageBuilder {
        DiskImageBuilder::new()
    }

    /// Get the format type
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Get the original filename if loaded from disk
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Get all disks
    pub fn disks(&self) -> &[Disk] {
        &self.disks
    }

    /// Get a mutable reference to all disks
    pub fn disks_mut(&mut self) -> &mut [Disk] {
        &mut self.disks
    }

    /// Get a disk by index
    pub fn get_disk(&self, index: usize) -> Option<&Disk> {
        self.disks.get(index)
    }

    /// Get a mutable reference to a disk by index
    pub fn get_disk_mut(&mut self, index: usize) -> Option<&mut Disk> {
        self.disks.get_mut(index)
    }

    /// Add a disk
    pub fn add_disk(&mut self, disk: Disk) {
        self.disks.push(disk);
    }

    /// Get the number of disks
    pub fn disk_count(&self) -> usize {
        self.disks.len()
    }

    /// Get the number of header bytes skipped in front of the sector data
    pub fn start_offset(&self) -> u64 {
        self.start_offset
    }

    /// Record the number of header bytes skipped in front of the sector data
    pub fn set_start_offset(&mut self, offset: u64) {
        self.start_offset = offset;
    }

    /// Read sector data
    pub fn read_sector(&self, disk: usize, track: usize, record: u16) -> Result<&[u8]> {
        let disk = self.disks.get(disk).ok_or(ImageError::NoDisk)?;
        let track_obj = disk.get_track(track).ok_or(ImageError::InvalidTrack {
            track,
            max: disk.track_count().saturating_sub(1),
        })?;
        let sector = track_obj
            .get_sector(record)
            .ok_or(ImageError::InvalidSector { track, id: record })?;
        Ok(sector.data())
    }

    /// Write sector data, resizing the sector if needed
    pub fn write_sector(&mut self, disk: usize, track: usize, record: u16, data: &[u8]) -> Result<()> {
        let disk = self.disks.get_mut(disk).ok_or(ImageError::NoDisk)?;
        let max = disk.track_count().saturating_sub(1);
        let track_obj = disk
            .get_track_mut(track)
            .ok_or(ImageError::InvalidTrack { track, max })?;
        let sector = track_obj
            .get_sector_mut(record)
            .ok_or(ImageError::InvalidSector { track, id: record })?;
        sector.set_data(data.to_vec());
        Ok(())
    }

    /// Save every disk to a D88 file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        let mut diag = Diagnostics::new();
        D88Writer::new(WriterOptions::default()).write_image(self, &mut file, &mut diag)?;
        file.flush()?;
        Ok(())
    }

    /// Check if any disk has been modified
    pub fn is_changed(&self) -> bool {
        self.disks.iter().any(|d| d.is_modified())
    }
}
