/// D88 indexed container reader
///
/// A D88 file is one or more disks back to back. Each disk starts with a
/// fixed header holding the disk name, write protect flag, disk type, total
/// size and a table of 164 track offsets relative to the start of the disk.
/// Every track is a run of sectors, each preceded by a 16-byte header.

use crate::error::{ImageError, Result};
use crate::fdc::FdcStatus;
use crate::format::constants::*;
use crate::format::{DiskDensity, Geometry, GeometryMatcher, ImageFormat};
use crate::image::{Disk, DiskImage, Sector, Track};
use crate::io::dispatch::{CheckReport, CheckStatus, ParseFlags};
use crate::io::{read_fill, stream_len, ReadSeek};
use binrw::{binrw, BinRead};
use std::io::{Cursor, SeekFrom};

/// D88 disk header
#[derive(Debug, Clone, PartialEq, Eq)]
#[binrw]
#[brw(little)]
pub struct D88Header {
    /// Disk name, Shift-JIS, NUL padded
    pub name: [u8; D88_NAME_LENGTH],
    /// Reserved
    pub reserved: [u8; 9],
    /// 0x10 when write protected
    pub write_protect: u8,
    /// Disk type code, see [`DiskDensity::from_d88_code`]
    pub disk_type: u8,
    /// Size of the disk including this header
    pub disk_size: u32,
    /// Track offsets relative to the start of the disk, zero when unused
    pub offsets: [u32; D88_MAX_TRACKS],
}

impl Default for D88Header {
    fn default() -> Self {
        Self {
            name: [0; D88_NAME_LENGTH],
            reserved: [0; 9],
            write_protect: 0,
            disk_type: 0,
            disk_size: D88_HEADER_SIZE as u32,
            offsets: [0; D88_MAX_TRACKS],
        }
    }
}

impl D88Header {
    /// Build a header from a disk's descriptive fields with an empty offset table
    pub fn from_disk(disk: &Disk) -> Self {
        Self {
            name: *disk.raw_name(),
            reserved: disk.reserved,
            write_protect: if disk.write_protected { D88_WRITE_PROTECTED } else { 0 },
            disk_type: disk.density.d88_code(),
            disk_size: disk.size_with_header(),
            offsets: [0; D88_MAX_TRACKS],
        }
    }

    /// Index one past the last used offset slot
    pub fn used_slots(&self) -> usize {
        self.offsets
            .iter()
            .rposition(|&o| o != 0)
            .map_or(0, |i| i + 1)
    }

    /// End of the track starting at `offset`: the next higher offset or the disk end
    fn track_end(&self, offset: u32) -> u32 {
        self.offsets
            .iter()
            .copied()
            .filter(|&o| o > offset)
            .min()
            .unwrap_or(self.disk_size)
            .min(self.disk_size)
    }

    /// Check the header's values make sense for a D88 disk
    fn validate(&self, ignore_disk_type: bool) -> Result<()> {
        let not_recognized = || ImageError::not_recognized(ImageFormat::D88);

        if !ignore_disk_type && DiskDensity::from_d88_code(self.disk_type).is_none() {
            log::debug!("D88Header::validate(): unknown disk type {:02X}", self.disk_type);
            return Err(not_recognized());
        }
        if (self.disk_size as usize) < D88_HEADER_SIZE {
            log::debug!("D88Header::validate(): disk size {} too small", self.disk_size);
            return Err(not_recognized());
        }
        for &offset in self.offsets.iter().filter(|&&o| o != 0) {
            if (offset as usize) < D88_HEADER_SIZE || offset >= self.disk_size {
                log::debug!("D88Header::validate(): track offset {:X} out of range", offset);
                return Err(not_recognized());
            }
        }
        Ok(())
    }
}

/// D88 sector header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[binrw]
#[brw(little)]
pub struct D88SectorHeader {
    /// Cylinder
    pub c: u8,
    /// Head
    pub h: u8,
    /// Record
    pub r: u8,
    /// Size code
    pub n: u8,
    /// Sectors in this track
    pub sectors: u16,
    /// 0x00 double density, 0x40 single density
    pub density: u8,
    /// 0x10 deleted data
    pub deleted: u8,
    /// BIOS status
    pub status: u8,
    /// Reserved
    pub reserved: [u8; 5],
    /// Bytes of data following this header
    pub size: u16,
}

/// Read one disk header at `base`
fn read_disk_header<S: ReadSeek + ?Sized>(stream: &mut S, base: u64) -> Result<Option<D88Header>> {
    stream.seek(SeekFrom::Start(base))?;
    let mut bytes = vec![0u8; D88_HEADER_SIZE];
    let got = read_fill(stream, &mut bytes)?;
    if got == 0 {
        return Ok(None);
    }
    if got < D88_HEADER_SIZE {
        return Err(ImageError::ImageTooSmall);
    }
    Ok(Some(D88Header::read(&mut Cursor::new(&bytes))?))
}

/// Check a D88 file
///
/// The geometry is taken from the disk type and the first used track; raw
/// formats cannot express the single density map, but D88 can.
pub fn check<S: ReadSeek + ?Sized>(
    stream: &mut S,
    hints: &[Geometry],
    matcher: &dyn GeometryMatcher,
) -> Result<CheckReport> {
    let header = read_disk_header(stream, 0)?.ok_or(ImageError::ImageTooSmall)?;
    header.validate(false)?;

    let density = DiskDensity::from_d88_code(header.disk_type)
        .ok_or(ImageError::not_recognized(ImageFormat::D88))?;
    let sides = density.sides();
    let used = header.used_slots();
    let tracks_per_side = used.div_ceil(sides as usize) as u32;

    let mut geometry = Geometry::new(sides, tracks_per_side, 0, 0).with_density(density);
    let mut single_density = Vec::new();
    for (slot, &offset) in header.offsets.iter().enumerate().take(used) {
        if offset == 0 {
            continue;
        }
        stream.seek(SeekFrom::Start(offset as u64))?;
        let mut raw = [0u8; D88_SECTOR_HEADER_SIZE];
        if read_fill(stream, &mut raw)? < D88_SECTOR_HEADER_SIZE {
            continue;
        }
        let first = D88SectorHeader::read(&mut Cursor::new(&raw))?;
        if geometry.sectors_per_track == 0 {
            geometry.sectors_per_track = first.sectors as u32;
            geometry.sector_size = fdc_size_to_bytes(first.n) as u32;
        }
        single_density.push((slot, first.density & D88_SECTOR_SINGLE_DENSITY != 0));
    }

    // Only a mix of FM and MFM tracks is worth recording as a map
    if single_density.iter().any(|&(_, fm)| !fm) {
        geometry.single_density_map = single_density
            .iter()
            .filter(|&&(slot, fm)| fm && slot < 32)
            .fold(0u32, |map, &(slot, _)| map | (1u32 << slot));
    }

    log::debug!("d88::check(): {} used slots, {}", used, geometry);

    let mut report = CheckReport::new(ImageFormat::D88);
    if let Some(template) = matcher.find_strict(&geometry) {
        report.candidates.push(template);
    }
    for hint in hints {
        if hint.sides == geometry.sides
            && hint.sectors_per_track == geometry.sectors_per_track
            && hint.sector_size == geometry.sector_size
            && !report.candidates.contains(hint)
        {
            report.candidates.push(*hint);
        }
    }
    if report.candidates.is_empty() {
        report.manual = Some(geometry);
        report.status = CheckStatus::ManualRequired;
    }
    Ok(report)
}

/// Parse every disk in a D88 file
pub fn parse<S: ReadSeek + ?Sized>(stream: &mut S, flags: ParseFlags, image: &mut DiskImage) -> Result<()> {
    let len = stream_len(stream)?;
    let mut base = 0u64;

    loop {
        let header = match read_disk_header(stream, base) {
            Ok(Some(header)) => header,
            Ok(None) => break,
            Err(e) if base == 0 => return Err(e),
            Err(_) => {
                log::warn!("d88::parse(): {} trailing bytes after last disk", len - base);
                break;
            }
        };
        if let Err(e) = header.validate(flags.contains(ParseFlags::IGNORE_DISK_TYPE)) {
            if base == 0 {
                return Err(e);
            }
            log::warn!("d88::parse(): unrecognized data at {:X}, stopping", base);
            break;
        }

        let disk = parse_disk(stream, &header, base, flags)?;
        log::debug!(
            "d88::parse(): disk {} '{}' at {:X}: {} tracks",
            image.disk_count(),
            disk.name(),
            base,
            disk.track_count()
        );
        image.add_disk(disk);

        base += header.disk_size as u64;
        if base >= len {
            break;
        }
    }

    image.set_start_offset(0);
    Ok(())
}

fn parse_disk<S: ReadSeek + ?Sized>(
    stream: &mut S,
    header: &D88Header,
    base: u64,
    flags: ParseFlags,
) -> Result<Disk> {
    let stated = DiskDensity::from_d88_code(header.disk_type);
    let density = match stated {
        Some(density) if !flags.contains(ParseFlags::IGNORE_DISK_TYPE) => density,
        _ => DiskDensity::Double,
    };
    let sides = density.sides() as usize;
    let used = header.used_slots();

    let mut disk = Disk::with_capacity(density, used);
    disk.set_raw_name(header.name);
    disk.reserved = header.reserved;
    disk.write_protected = header.write_protect & D88_WRITE_PROTECTED != 0;

    for (slot, &offset) in header.offsets.iter().enumerate().take(used) {
        let track = if offset == 0 {
            Track::new(slot, (slot / sides) as u32, (slot % sides) as u8)
        } else {
            let end = header.track_end(offset);
            read_track(stream, base, slot, sides, offset, end)?
        };
        disk.add_track(track);
    }

    if stated.is_none() || flags.contains(ParseFlags::IGNORE_DISK_TYPE) {
        disk.density = infer_density(&disk);
        log::debug!("d88::parse_disk(): density inferred as {}", disk.density);
    }

    disk.set_offset_start(D88_HEADER_SIZE as u32);
    disk.set_size_without_header(header.disk_size - D88_HEADER_SIZE as u32);
    if flags.contains(ParseFlags::MARK_MODIFIED) {
        disk.mark_modified();
    } else {
        disk.clear_modify();
    }
    Ok(disk)
}

/// Read the sectors of one track, keeping bytes after the last sector as padding
fn read_track<S: ReadSeek + ?Sized>(
    stream: &mut S,
    base: u64,
    slot: usize,
    sides: usize,
    offset: u32,
    end: u32,
) -> Result<Track> {
    stream.seek(SeekFrom::Start(base + offset as u64))?;
    let mut track = Track::new(slot, (slot / sides) as u32, (slot % sides) as u8);
    let mut remaining = (end - offset) as usize;
    let mut expected: Option<u16> = None;

    while remaining >= D88_SECTOR_HEADER_SIZE {
        if let Some(count) = expected {
            if track.sector_count() >= count as usize {
                break;
            }
        }

        let mut raw = [0u8; D88_SECTOR_HEADER_SIZE];
        if read_fill(stream, &mut raw)? < D88_SECTOR_HEADER_SIZE {
            log::warn!("d88::read_track(): slot {} truncated in sector header", slot);
            return Ok(track);
        }
        let sector_header = D88SectorHeader::read(&mut Cursor::new(&raw))?;
        remaining -= D88_SECTOR_HEADER_SIZE;

        if expected.is_none() {
            expected = Some(sector_header.sectors.max(1));
            track.cylinder = sector_header.c as u32;
            track.side_number = sector_header.h;
        }

        let size = (sector_header.size as usize).min(remaining);
        if size < sector_header.size as usize {
            log::warn!(
                "d88::read_track(): slot {} sector r:{} claims {} bytes, {} left",
                slot,
                sector_header.r,
                sector_header.size,
                remaining
            );
        }
        let mut data = vec![0u8; size];
        let got = read_fill(stream, &mut data)?;
        remaining -= size;

        let mut sector = Sector::from_header(sector_header, data);
        if FdcStatus::new(sector_header.status).is_deleted() {
            sector.deleted = true;
        }
        track.add_sector(sector);

        if got < size {
            log::warn!("d88::read_track(): slot {} truncated in sector data", slot);
            return Ok(track);
        }
    }

    if remaining > 0 {
        let mut extra = vec![0u8; remaining];
        let got = read_fill(stream, &mut extra)?;
        extra.truncate(got);
        track.set_extra(extra);
    }
    Ok(track)
}

/// Guess the density of a disk whose header type is missing or ignored
fn infer_density(disk: &Disk) -> DiskDensity {
    let first = disk.tracks().iter().find(|t| !t.is_empty());
    let track_bytes = first.map_or(0, |t| t.total_data_size());
    let single_sided = disk
        .tracks()
        .iter()
        .flat_map(|t| t.sectors())
        .all(|s| s.id().head == 0);
    let double_track = disk.track_count() > 84 * if single_sided { 1 } else { 2 };

    match (track_bytes >= 8 * 1024, single_sided, double_track) {
        (true, _, _) => DiskDensity::High,
        (false, true, true) => DiskDensity::SingleSidedDoubleTrack,
        (false, true, false) => DiskDensity::SingleSided,
        (false, false, true) => DiskDensity::DoubleTrack,
        (false, false, false) => DiskDensity::Double,
    }
}
