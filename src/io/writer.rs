/// D88 container writer

use crate::diagnostics::Diagnostics;
use crate::error::{ImageError, Result};
use crate::format::constants::*;
use crate::image::{Disk, DiskImage, Track};
use crate::io::d88::{D88Header, D88SectorHeader};
use binrw::BinWrite;
use std::io::{Seek, SeekFrom, Write};

/// Writer options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriterOptions {
    /// Drop the padding stored after the last sector of each track
    pub trim_unused_data: bool,
}

impl WriterOptions {
    /// Set whether trailing track padding is dropped
    pub fn with_trim_unused_data(mut self, trim: bool) -> Self {
        self.trim_unused_data = trim;
        self
    }
}

/// Which tracks of a disk to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideSelector {
    /// Every track in order
    Both,
    /// Every second track starting at this side, written as side 0
    Side(u8),
}

/// Writes disks as D88 containers
#[derive(Debug, Clone, Copy, Default)]
pub struct D88Writer {
    options: WriterOptions,
}

impl D88Writer {
    /// Create a writer
    pub fn new(options: WriterOptions) -> Self {
        Self { options }
    }

    /// Get the writer options
    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Write one disk at the current stream position
    ///
    /// The header is written first as a placeholder and rewritten once the
    /// offset table and disk size are known, so the stream is left just past
    /// the last track.
    pub fn write_disk<W: Write + Seek>(
        &self,
        disk: Option<&mut Disk>,
        side: SideSelector,
        stream: &mut W,
        diag: &mut Diagnostics,
    ) -> Result<()> {
        diag.clear();
        let result = match disk {
            Some(disk) => self.emit_disk(disk, side, stream),
            None => Err(ImageError::NoDisk),
        };
        diag.track(result)
    }

    /// Write every disk of an image back to back
    pub fn write_image<W: Write + Seek>(
        &self,
        image: &mut DiskImage,
        stream: &mut W,
        diag: &mut Diagnostics,
    ) -> Result<()> {
        diag.clear();
        diag.track(self.emit_image(image, stream))
    }

    fn emit_image<W: Write + Seek>(&self, image: &mut DiskImage, stream: &mut W) -> Result<()> {
        if image.disk_count() == 0 {
            return Err(ImageError::NoDisk);
        }
        for disk in image.disks_mut() {
            self.emit_disk(disk, SideSelector::Both, stream)?;
        }
        Ok(())
    }

    fn emit_disk<W: Write + Seek>(&self, disk: &mut Disk, side: SideSelector, stream: &mut W) -> Result<()> {
        if disk.is_empty() {
            return Err(ImageError::NoData);
        }

        let trim = self.options.trim_unused_data;
        let (first, stride) = match side {
            SideSelector::Both => (0, 1),
            SideSelector::Side(s) => (s as usize, 2),
        };
        // Sized up front so an unwritable disk leaves the stream untouched
        let sizes = disk
            .tracks()
            .iter()
            .skip(first)
            .step_by(stride)
            .map(|track| container_size(track, trim))
            .collect::<Result<Vec<u32>>>()?;
        sizes
            .iter()
            .try_fold(D88_HEADER_SIZE as u32, |total, &size| total.checked_add(size))
            .ok_or(ImageError::DiskTooLarge)?;

        let start = stream.stream_position()?;
        disk.set_offset_start(D88_HEADER_SIZE as u32);
        if side == SideSelector::Both {
            disk.shrink_tracks(trim);
        }

        let mut header = D88Header::from_disk(disk);
        header.write(stream)?;
        header.offsets = [0; D88_MAX_TRACKS];
        header.disk_size = D88_HEADER_SIZE as u32;

        let mut cursor = D88_HEADER_SIZE as u32;
        let tracks = disk.tracks().iter().skip(first).step_by(stride);
        for (slot, (track, &size)) in tracks.zip(&sizes).enumerate() {
            for sector in track.sectors() {
                let mut sector_header = D88SectorHeader::default();
                sector.fill_header(&mut sector_header);
                if let SideSelector::Side(_) = side {
                    sector_header.h = 0;
                }
                sector_header.write(stream)?;
                stream.write_all(sector.data())?;
            }
            if !trim && !track.is_empty() {
                stream.write_all(track.extra())?;
            }

            if size == 0 {
                continue;
            }
            match header.offsets.get_mut(slot) {
                Some(entry) => *entry = cursor,
                None => log::debug!("D88Writer: track {} has no offset slot", track.index),
            }
            cursor += size;
            header.disk_size += size;
        }

        let end = stream.stream_position()?;
        stream.seek(SeekFrom::Start(start))?;
        header.write(stream)?;
        stream.seek(SeekFrom::Start(end))?;

        log::trace!(
            "D88Writer: '{}' {:?} wrote {} bytes at {:X}",
            disk.name(),
            side,
            header.disk_size,
            start
        );
        disk.clear_modify();
        Ok(())
    }
}

/// Bytes a track takes in the container, checked against the field widths
fn container_size(track: &Track, trim: bool) -> Result<u32> {
    if let Some(sector) = track.sectors().iter().find(|s| s.data().len() > u16::MAX as usize) {
        return Err(ImageError::SectorTooLarge {
            track: track.index,
            record: sector.id().record,
            size: sector.data().len(),
        });
    }
    u32::try_from(track.container_size(trim)).map_err(|_| ImageError::DiskTooLarge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Outcome;
    use crate::error::ErrorCode;
    use crate::format::{DiskDensity, Geometry, ImageFormat};
    use crate::image::{Sector, SectorId, Track};
    use crate::io::d88;
    use crate::io::dispatch::ParseFlags;
    use binrw::BinRead;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn test_disk(sides: u32, tracks: u32, spt: u32) -> Disk {
        let geometry = Geometry::new(sides, tracks, spt, 256).with_density(DiskDensity::Double);
        let image = DiskImage::builder().geometry(geometry).build().unwrap();
        image.disks()[0].clone()
    }

    fn write(disk: &mut Disk, side: SideSelector, options: WriterOptions) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let mut diag = Diagnostics::new();
        D88Writer::new(options)
            .write_disk(Some(disk), side, &mut cursor, &mut diag)
            .unwrap();
        assert!(diag.is_empty());
        cursor.into_inner()
    }

    fn header_of(bytes: &[u8]) -> D88Header {
        D88Header::read(&mut Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_write_both_sides() {
        let mut disk = test_disk(2, 3, 4);
        let bytes = write(&mut disk, SideSelector::Both, WriterOptions::default());
        let header = header_of(&bytes);

        let track_size = 4 * (16 + 256) as u32;
        assert_eq!(header.disk_size as usize, bytes.len());
        assert_eq!(header.disk_type, 0x00);
        assert_eq!(header.used_slots(), 6);
        for slot in 0..6 {
            assert_eq!(header.offsets[slot], 0x2B0 + slot as u32 * track_size);
        }
        assert!(!disk.is_modified());
    }

    #[test]
    fn test_write_single_side() {
        let mut disk = test_disk(2, 3, 2);
        let bytes = write(&mut disk, SideSelector::Side(1), WriterOptions::default());
        let header = header_of(&bytes);
        assert_eq!(header.used_slots(), 3);
        assert_eq!(header.disk_size as usize, bytes.len());

        for slot in 0..3 {
            let offset = header.offsets[slot] as usize;
            let sh = D88SectorHeader::read(&mut Cursor::new(&bytes[offset..])).unwrap();
            assert_eq!(sh.c as usize, slot);
            assert_eq!(sh.h, 0);
        }
    }

    #[test]
    fn test_write_errors() {
        let writer = D88Writer::default();
        let mut diag = Diagnostics::new();
        let mut cursor = Cursor::new(Vec::new());

        let result = writer.write_disk(None, SideSelector::Both, &mut cursor, &mut diag);
        assert!(matches!(result, Err(ImageError::NoDisk)));
        assert_eq!(diag.codes(), vec![ErrorCode::NoDisk]);

        let mut empty = Disk::new(DiskDensity::Double);
        let result = writer.write_disk(Some(&mut empty), SideSelector::Both, &mut cursor, &mut diag);
        assert!(matches!(result, Err(ImageError::NoData)));
        assert_eq!(diag.codes(), vec![ErrorCode::NoData]);
    }

    #[test]
    fn test_write_oversized_sector() {
        let mut disk = test_disk(1, 2, 1);
        let track = disk.get_track_mut(1).unwrap();
        track.get_sector_mut(1).unwrap().set_data(vec![0x5A; 70000]);

        let mut cursor = Cursor::new(Vec::new());
        let mut diag = Diagnostics::new();
        let result = D88Writer::default().write_disk(Some(&mut disk), SideSelector::Both, &mut cursor, &mut diag);
        assert!(matches!(
            result,
            Err(ImageError::SectorTooLarge { track: 1, record: 1, size: 70000 })
        ));
        assert_eq!(diag.outcome(), Outcome::Failure);
        assert_eq!(diag.codes(), vec![ErrorCode::SectorTooLarge]);
        assert!(cursor.into_inner().is_empty());
        assert!(disk.is_modified());
    }

    #[test]
    fn test_write_largest_sector() {
        let mut disk = test_disk(1, 1, 1);
        let track = disk.get_track_mut(0).unwrap();
        track.get_sector_mut(1).unwrap().set_data(vec![0x5A; u16::MAX as usize]);

        let bytes = write(&mut disk, SideSelector::Both, WriterOptions::default());
        let sh = D88SectorHeader::read(&mut Cursor::new(&bytes[0x2B0..])).unwrap();
        assert_eq!(sh.size, u16::MAX);
        assert_eq!(bytes.len(), 0x2B0 + 16 + u16::MAX as usize);
    }

    #[test]
    fn test_trim_unused_data() {
        let mut disk = test_disk(1, 2, 1);
        disk.get_track_mut(0).unwrap().set_extra(vec![0x4E; 100]);

        let kept = write(&mut disk.clone(), SideSelector::Both, WriterOptions::default());
        let trimmed = write(
            &mut disk,
            SideSelector::Both,
            WriterOptions::default().with_trim_unused_data(true),
        );
        assert_eq!(kept.len(), trimmed.len() + 100);
        assert_eq!(header_of(&kept).offsets[1], 0x2B0 + 272 + 100);
        assert!(disk.get_track(0).unwrap().extra().is_empty());
    }

    #[test]
    fn test_offset_table_full() {
        let mut disk = Disk::new(DiskDensity::High);
        for index in 0..D88_MAX_TRACKS + 1 {
            let mut track = Track::new(index, (index / 2) as u32, (index % 2) as u8);
            track.add_sector(Sector::with_data(SectorId::new(0, 0, 1, 0), vec![0; 128]));
            disk.add_track(track);
        }

        let bytes = write(&mut disk, SideSelector::Both, WriterOptions::default());
        let header = header_of(&bytes);
        assert_eq!(bytes.len(), 0x2B0 + (D88_MAX_TRACKS + 1) * (16 + 128));
        assert_eq!(header.disk_size as usize, bytes.len());
        assert_eq!(header.used_slots(), D88_MAX_TRACKS);
        assert!(header.offsets.iter().all(|&o| o != 0));
    }

    #[test]
    fn test_round_trip_image() {
        let mut image = DiskImage::new(ImageFormat::D88);
        let mut disk = test_disk(2, 2, 3);
        disk.set_name("FIRST");
        disk.get_track_mut(1).unwrap().set_extra(vec![0xAA; 7]);
        image.add_disk(disk);
        image.add_disk(test_disk(1, 4, 1));

        let mut cursor = Cursor::new(Vec::new());
        let mut diag = Diagnostics::new();
        D88Writer::default().write_image(&mut image, &mut cursor, &mut diag).unwrap();
        let first = cursor.into_inner();

        let mut parsed = DiskImage::new(ImageFormat::D88);
        d88::parse(&mut Cursor::new(&first), ParseFlags::empty(), &mut parsed).unwrap();
        assert_eq!(parsed.disk_count(), 2);
        assert_eq!(parsed.get_disk(0).unwrap().name(), "FIRST");
        assert_eq!(parsed.get_disk(0).unwrap().get_track(1).unwrap().extra(), &[0xAA; 7][..]);
        assert_eq!(parsed.get_disk(1).unwrap().track_count(), 4);

        let mut cursor = Cursor::new(Vec::new());
        D88Writer::default().write_image(&mut parsed, &mut cursor, &mut diag).unwrap();
        assert_eq!(cursor.into_inner(), first);
    }

    proptest! {
        #[test]
        fn prop_single_side_stride(cylinders in 1u32..12, spt in 1u32..5, side in 0u8..2) {
            let mut disk = test_disk(2, cylinders, spt);
            let bytes = write(&mut disk, SideSelector::Side(side), WriterOptions::default());
            let header = header_of(&bytes);

            prop_assert_eq!(header.used_slots(), cylinders as usize);
            let mut previous = 0;
            for slot in 0..cylinders as usize {
                let offset = header.offsets[slot];
                prop_assert!(offset > previous);
                previous = offset;
                let sh = D88SectorHeader::read(&mut Cursor::new(&bytes[offset as usize..])).unwrap();
                prop_assert_eq!(sh.c as usize, slot);
                prop_assert_eq!(sh.h, 0);
            }
        }

        #[test]
        fn prop_rewrite_is_identical(sides in 1u32..3, cylinders in 1u32..8, spt in 1u32..6) {
            let mut disk = test_disk(sides, cylinders, spt);
            let once = write(&mut disk, SideSelector::Both, WriterOptions::default());
            let twice = write(&mut disk, SideSelector::Both, WriterOptions::default());
            prop_assert_eq!(once, twice);
        }
    }
}
