/// Builder for creating blank disk images

use crate::error::Result;
use crate::format::{DiskDensity, Geometry, ImageFormat};
use crate::image::{Disk, DiskImage, Sector, SectorId, Track};

/// Builder for constructing formatted blank images
pub struct DiskImageBuilder {
    format: ImageFormat,
    geometry: Geometry,
    first_sector_id: u16,
    filler_byte: u8,
    name: String,
}

impl DiskImageBuilder {
    /// Create a new builder for a 2HD 1.2M D88 disk
    pub fn new() -> Self {
        Self {
            format: ImageFormat::D88,
            geometry: Geometry::new(2, 77, 8, 1024).with_density(DiskDensity::High),
            first_sector_id: 1,
            filler_byte: 0xE5,
            name: String::new(),
        }
    }

    /// Set the image format
    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the geometry
    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the first sector record number
    pub fn first_sector_id(mut self, first_sector_id: u16) -> Self {
        self.first_sector_id = first_sector_id;
        self
    }

    /// Set the filler byte
    pub fn filler_byte(mut self, filler_byte: u8) -> Self {
        self.filler_byte = filler_byte;
        self
    }

    /// Set the disk name
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Build the image with one formatted disk
    pub fn build(self) -> Result<DiskImage> {
        self.geometry.validate(1)?;

        let geometry = self.geometry;
        let size_code = geometry.size_code();
        let mut disk = Disk::with_capacity(geometry.density, geometry.track_count());

        for cylinder in 0..geometry.tracks_per_side {
            for side in 0..geometry.sides {
                let index = disk.track_count();
                let mut track = Track::new(index, cylinder, side as u8);

                for i in 0..geometry.sectors_per_track {
                    let id = SectorId::new(cylinder, side as u8, self.first_sector_id + i as u16, size_code);
                    let mut sector =
                        Sector::with_data(id, vec![self.filler_byte; geometry.sector_size as usize]);
                    sector.set_sectors_per_track(geometry.sectors_per_track as u16);
                    track.add_sector(sector);
                }

                disk.add_track(track);
            }
        }

        disk.set_name(&self.name);
        // Newly created disk is considered modified
        disk.mark_modified();
        disk.shrink_tracks(true);

        let mut image = DiskImage::new(self.format);
        image.add_disk(disk);
        Ok(image)
    }
}

impl Default for DiskImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_default() {
        let image = DiskImageBuilder::new().build().unwrap();

        assert_eq!(image.format(), ImageFormat::D88);
        assert_eq!(image.disk_count(), 1);
        let disk = image.get_disk(0).unwrap();
        assert_eq!(disk.track_count(), 154);
        assert_eq!(disk.density, DiskDensity::High);
        assert!(disk.is_modified());
    }

    #[test]
    fn test_builder_track_order() {
        let image = DiskImageBuilder::new()
            .geometry(Geometry::new(2, 3, 4, 256))
            .first_sector_id(0x41)
            .build()
            .unwrap();

        let disk = image.get_disk(0).unwrap();
        let track = disk.get_track(3).unwrap();
        assert_eq!((track.cylinder, track.side_number), (1, 1));
        assert_eq!(track.sector_ids(), vec![0x41, 0x42, 0x43, 0x44]);
        assert_eq!(track.sectors()[0].id().size_code, 1);
    }

    #[test]
    fn test_builder_rejects_bad_geometry() {
        let result = DiskImageBuilder::new()
            .geometry(Geometry::new(2, 40, 0, 256))
            .build();
        assert!(result.is_err());
    }
}
