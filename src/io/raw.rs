/// Raw sector slicer shared by every "header + sector dump" format
///
/// Each raw format only describes its header with a [`RawHeaderLayout`]: the
/// record size, the smallest track count it accepts and a decode function
/// that checks the signature and pulls out the geometry fields. Checking,
/// parsing and cutting the sector data into tracks all happen here.

use crate::error::{ImageError, Result};
use crate::format::{Geometry, GeometryMatcher, ImageFormat};
use crate::image::{Disk, DiskImage, Sector, SectorId, Track};
use crate::io::dispatch::{CheckReport, CheckStatus};
use crate::io::{read_fill, read_header_at, stream_len, ReadSeek};
use std::io::SeekFrom;

/// Geometry fields and skip length decoded from a raw header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawHeaderFields {
    /// Sector size in bytes
    pub sector_size: u32,
    /// Sectors per track
    pub sectors_per_track: u32,
    /// Sides (heads)
    pub sides: u32,
    /// Tracks (cylinders) per side
    pub tracks_per_side: u32,
    /// Bytes in front of the sector data
    pub skip: u64,
}

impl RawHeaderFields {
    /// Geometry described by the fields, with no density and no modifiers
    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.sides, self.tracks_per_side, self.sectors_per_track, self.sector_size)
    }
}

/// Description of a raw format's header
#[derive(Debug, Clone, Copy)]
pub struct RawHeaderLayout {
    /// Format the layout belongs to
    pub format: ImageFormat,
    /// Bytes to read for the header record
    pub header_size: usize,
    /// Smallest accepted tracks per side
    pub min_tracks: u32,
    /// Validate the signature and decode the fields of a header record
    pub decode: fn(&[u8]) -> Result<RawHeaderFields>,
}

impl RawHeaderLayout {
    /// Read and decode the header at the start of the stream
    pub fn read_fields<S: ReadSeek + ?Sized>(&self, stream: &mut S) -> Result<RawHeaderFields> {
        let bytes = read_header_at(stream, 0, self.header_size)?;
        (self.decode)(&bytes)
    }
}

/// Check a raw image: header, signature, field ranges, then template lookup
///
/// Hints whose addressing equals the header's are offered after the
/// template match.
pub fn check_raw<S: ReadSeek + ?Sized>(
    layout: &RawHeaderLayout,
    stream: &mut S,
    hints: &[Geometry],
    matcher: &dyn GeometryMatcher,
) -> Result<CheckReport> {
    let fields = layout.read_fields(stream)?;
    let geometry = fields.geometry();
    geometry.validate(layout.min_tracks)?;

    log::debug!("check_raw(): {} header: {}, skip {}", layout.format, geometry, fields.skip);

    let mut report = CheckReport::new(layout.format);
    if let Some(template) = matcher.find_strict(&geometry) {
        report.candidates.push(template);
    }
    for hint in hints {
        if same_addressing(hint, &geometry) && !report.candidates.contains(hint) {
            report.candidates.push(*hint);
        }
    }

    if report.candidates.is_empty() {
        report.manual = Some(geometry);
        report.status = CheckStatus::ManualRequired;
    }
    Ok(report)
}

fn same_addressing(a: &Geometry, b: &Geometry) -> bool {
    a.sides == b.sides
        && a.tracks_per_side == b.tracks_per_side
        && a.sectors_per_track == b.sectors_per_track
        && a.sector_size == b.sector_size
}

/// Parse a raw image with a confirmed geometry
pub fn parse_raw<S: ReadSeek + ?Sized>(
    layout: &RawHeaderLayout,
    geometry: &Geometry,
    stream: &mut S,
    image: &mut DiskImage,
) -> Result<()> {
    let fields = layout.read_fields(stream)?;

    image.set_start_offset(fields.skip);
    stream.seek(SeekFrom::Start(fields.skip))?;

    let index = image.disk_count();
    let sectors = slice_sectors(stream, geometry, index, image)?;
    log::debug!(
        "parse_raw(): {} read {} sectors after skipping {} bytes",
        layout.format,
        sectors,
        fields.skip
    );
    Ok(())
}

/// Cut a sector stream into tracks
///
/// Sectors are assigned cylinder-major, then head, then record starting at
/// 1. Reading stops at the end of the geometry or of the stream; a partial
/// final sector is zero padded. The disk is stored at `disk_index`,
/// replacing a disk already there. Returns the number of sectors read.
pub fn slice_sectors<S: ReadSeek + ?Sized>(
    stream: &mut S,
    geometry: &Geometry,
    disk_index: usize,
    image: &mut DiskImage,
) -> Result<usize> {
    if geometry.sector_size == 0 || geometry.sectors_per_track == 0 || geometry.sides == 0 {
        return Err(ImageError::InvalidDiskParameters);
    }

    let sector_size = geometry.sector_size as usize;
    let size_code = geometry.size_code();
    let remaining = stream_len(stream)?.saturating_sub(stream.stream_position()?);
    let track_size = geometry.track_size() as u64;
    let backed_tracks = remaining.div_ceil(track_size).min(geometry.track_count() as u64);
    let mut disk = Disk::with_capacity(geometry.density, backed_tracks as usize);
    let mut sectors_read = 0;
    let mut exhausted = false;

    'cylinders: for cylinder in 0..geometry.tracks_per_side {
        for head in 0..geometry.sides {
            let mut track = Track::new(disk.track_count(), cylinder, head as u8);

            for record in 1..=geometry.sectors_per_track {
                let mut data = vec![0u8; sector_size];
                let got = read_fill(stream, &mut data)?;
                if got == 0 {
                    exhausted = true;
                    break;
                }

                let id = SectorId::new(cylinder, head as u8, record as u16, size_code);
                let mut sector = Sector::with_data(id, data);
                sector.set_sectors_per_track(geometry.sectors_per_track as u16);
                track.add_sector(sector);
                sectors_read += 1;

                if got < sector_size {
                    log::warn!(
                        "slice_sectors(): partial sector c:{} h:{} r:{} ({} of {} bytes)",
                        cylinder,
                        head,
                        record,
                        got,
                        sector_size
                    );
                    exhausted = true;
                    break;
                }
            }

            if !track.is_empty() {
                disk.add_track(track);
            }
            if exhausted {
                break 'cylinders;
            }
        }
    }

    if sectors_read == 0 {
        return Err(ImageError::ImageTooSmall);
    }

    log::trace!(
        "slice_sectors(): {} tracks, {} sectors for {}",
        disk.track_count(),
        sectors_read,
        geometry
    );

    disk.shrink_tracks(true);
    disk.clear_modify();
    if disk_index < image.disks.len() {
        image.disks[disk_index] = disk;
    } else {
        image.disks.push(disk);
    }
    Ok(sectors_read)
}
