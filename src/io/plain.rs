/// Plain sector dumps
///
/// Plain images have no header at all, so the geometry has to come from the
/// caller. Hints usually come from the file extension.

use crate::error::{ImageError, Result};
use crate::format::{Geometry, ImageFormat};
use crate::image::DiskImage;
use crate::io::dispatch::{CheckReport, CheckStatus};
use crate::io::raw::slice_sectors;
use crate::io::{stream_len, ReadSeek};
use std::io::SeekFrom;

/// Pick the hints whose capacity equals the stream length
///
/// When none fits exactly the first hint is offered as a manual fallback.
pub fn check<S: ReadSeek + ?Sized>(stream: &mut S, hints: &[Geometry]) -> Result<CheckReport> {
    let first = hints.first().ok_or(ImageError::InvalidDiskParameters)?;
    let len = stream_len(stream)?;
    if len == 0 {
        return Err(ImageError::ImageTooSmall);
    }

    let mut report = CheckReport::new(ImageFormat::Plain);
    report.candidates = hints
        .iter()
        .filter(|g| g.total_capacity() == len)
        .copied()
        .collect();

    if report.candidates.is_empty() {
        log::debug!("plain::check(): no hint matches {} bytes", len);
        report.manual = Some(*first);
        report.status = CheckStatus::ManualRequired;
    }
    Ok(report)
}

/// Slice the whole stream with the given geometry
pub fn parse<S: ReadSeek + ?Sized>(
    geometry: Option<&Geometry>,
    stream: &mut S,
    image: &mut DiskImage,
) -> Result<()> {
    let geometry = geometry.ok_or(ImageError::InvalidDiskParameters)?;
    geometry.validate(1)?;

    stream.seek(SeekFrom::Start(0))?;
    image.set_start_offset(0);
    let index = image.disk_count();
    slice_sectors(stream, geometry, index, image)?;
    Ok(())
}
