/// Format dispatch
///
/// Every supported format registers a check and a parse function in
/// [`FORMATS`]. The [`Dispatcher`] resolves a request to one or more formats,
/// runs their checks in order and hands the chosen geometry to the parser.

use crate::diagnostics::Diagnostics;
use crate::error::{ErrorCode, ImageError, Result};
use crate::format::{
    extension_of, DefaultFileTypes, FileTypeTable, FormatCandidate, Geometry, GeometryMatcher,
    ImageFormat, TemplateTable,
};
use crate::image::DiskImage;
use crate::io::raw::{check_raw, parse_raw, RawHeaderLayout};
use crate::io::{d88, hdd, hdi, nhd, plain, thd, ReadSeek};
use bitflags::bitflags;
use std::io::SeekFrom;
use std::path::Path;

/// Whether a check found a template or needs the caller to confirm a geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// At least one candidate geometry was found
    Matched,
    /// No candidate; `manual` holds the geometry read from the header
    ManualRequired,
}

impl CheckStatus {
    /// Numeric status, 0 for matched and 1 for manual selection
    pub fn code(&self) -> u8 {
        match self {
            CheckStatus::Matched => 0,
            CheckStatus::ManualRequired => 1,
        }
    }
}

/// Result of checking a stream against a format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Format that accepted the stream
    pub format: ImageFormat,
    /// Template or hint geometries, best first
    pub candidates: Vec<Geometry>,
    /// Geometry built from the header when nothing matched
    pub manual: Option<Geometry>,
    /// Match status
    pub status: CheckStatus,
}

impl CheckReport {
    /// Empty, matched report for a format
    pub fn new(format: ImageFormat) -> Self {
        Self {
            format,
            candidates: Vec::new(),
            manual: None,
            status: CheckStatus::Matched,
        }
    }

    /// First candidate, or the manual fallback
    pub fn geometry(&self) -> Option<Geometry> {
        self.candidates.first().copied().or(self.manual)
    }
}

bitflags! {
    /// Options for parsing
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ParseFlags: u32 {
        /// Infer D88 density from the sector data instead of the header type
        const IGNORE_DISK_TYPE = 0b0000_0001;
        /// Leave parsed disks flagged as modified
        const MARK_MODIFIED = 0b0000_0010;
    }
}

/// What to check a stream as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatRequest {
    /// A single format without hints
    Format(ImageFormat),
    /// A file extension, looked up in the file-type table
    Extension(String),
    /// An explicit list of formats and hints, tried in order
    Candidates(Vec<FormatCandidate>),
}

impl FormatRequest {
    /// Build a request from a file name's extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        FormatRequest::Extension(extension_of(path).unwrap_or_default())
    }
}

/// Check function of a registered format
pub type CheckFn = fn(&mut dyn ReadSeek, &[Geometry], &dyn GeometryMatcher) -> Result<CheckReport>;

/// Parse function of a registered format
pub type ParseFn = fn(&mut dyn ReadSeek, Option<&Geometry>, ParseFlags, &mut DiskImage) -> Result<()>;

/// A registered format
#[derive(Clone, Copy)]
pub struct FormatEntry {
    /// Format identifier
    pub format: ImageFormat,
    /// Header check
    pub check: CheckFn,
    /// Parser
    pub parse: ParseFn,
}

/// Every supported format
pub static FORMATS: &[FormatEntry] = &[
    FormatEntry {
        format: ImageFormat::D88,
        check: check_d88,
        parse: parse_d88,
    },
    FormatEntry {
        format: ImageFormat::Hdi,
        check: check_hdi,
        parse: parse_hdi,
    },
    FormatEntry {
        format: ImageFormat::Hdd,
        check: check_hdd,
        parse: parse_hdd,
    },
    FormatEntry {
        format: ImageFormat::Nhd,
        check: check_nhd,
        parse: parse_nhd,
    },
    FormatEntry {
        format: ImageFormat::Thd,
        check: check_thd,
        parse: parse_thd,
    },
    FormatEntry {
        format: ImageFormat::Plain,
        check: check_plain,
        parse: parse_plain,
    },
];

/// Look up the registry entry of a format
pub fn entry_for(format: ImageFormat) -> Result<&'static FormatEntry> {
    FORMATS
        .iter()
        .find(|e| e.format == format)
        .ok_or_else(|| ImageError::unsupported(format!("no handler for {}", format)))
}

fn check_d88(stream: &mut dyn ReadSeek, hints: &[Geometry], matcher: &dyn GeometryMatcher) -> Result<CheckReport> {
    d88::check(stream, hints, matcher)
}

fn parse_d88(stream: &mut dyn ReadSeek, _: Option<&Geometry>, flags: ParseFlags, image: &mut DiskImage) -> Result<()> {
    d88::parse(stream, flags, image)
}

fn check_plain(stream: &mut dyn ReadSeek, hints: &[Geometry], _: &dyn GeometryMatcher) -> Result<CheckReport> {
    plain::check(stream, hints)
}

fn parse_plain(
    stream: &mut dyn ReadSeek,
    geometry: Option<&Geometry>,
    flags: ParseFlags,
    image: &mut DiskImage,
) -> Result<()> {
    plain::parse(geometry, stream, image)?;
    apply_flags(flags, image);
    Ok(())
}

fn parse_layout(
    layout: &RawHeaderLayout,
    stream: &mut dyn ReadSeek,
    geometry: Option<&Geometry>,
    flags: ParseFlags,
    image: &mut DiskImage,
) -> Result<()> {
    let geometry = geometry.ok_or(ImageError::InvalidDiskParameters)?;
    geometry.validate(1)?;
    parse_raw(layout, geometry, stream, image)?;
    apply_flags(flags, image);
    Ok(())
}

fn apply_flags(flags: ParseFlags, image: &mut DiskImage) {
    if flags.contains(ParseFlags::MARK_MODIFIED) {
        for disk in image.disks_mut() {
            disk.mark_modified();
        }
    }
}

fn check_hdi(stream: &mut dyn ReadSeek, hints: &[Geometry], matcher: &dyn GeometryMatcher) -> Result<CheckReport> {
    check_raw(&hdi::LAYOUT, stream, hints, matcher)
}

fn parse_hdi(stream: &mut dyn ReadSeek, geometry: Option<&Geometry>, flags: ParseFlags, image: &mut DiskImage) -> Result<()> {
    parse_layout(&hdi::LAYOUT, stream, geometry, flags, image)
}

fn check_hdd(stream: &mut dyn ReadSeek, hints: &[Geometry], matcher: &dyn GeometryMatcher) -> Result<CheckReport> {
    check_raw(&hdd::LAYOUT, stream, hints, matcher)
}

fn parse_hdd(stream: &mut dyn ReadSeek, geometry: Option<&Geometry>, flags: ParseFlags, image: &mut DiskImage) -> Result<()> {
    parse_layout(&hdd::LAYOUT, stream, geometry, flags, image)
}

fn check_nhd(stream: &mut dyn ReadSeek, hints: &[Geometry], matcher: &dyn GeometryMatcher) -> Result<CheckReport> {
    check_raw(&nhd::LAYOUT, stream, hints, matcher)
}

fn parse_nhd(stream: &mut dyn ReadSeek, geometry: Option<&Geometry>, flags: ParseFlags, image: &mut DiskImage) -> Result<()> {
    parse_layout(&nhd::LAYOUT, stream, geometry, flags, image)
}

fn check_thd(stream: &mut dyn ReadSeek, hints: &[Geometry], matcher: &dyn GeometryMatcher) -> Result<CheckReport> {
    check_raw(&thd::LAYOUT, stream, hints, matcher)
}

fn parse_thd(stream: &mut dyn ReadSeek, geometry: Option<&Geometry>, flags: ParseFlags, image: &mut DiskImage) -> Result<()> {
    parse_layout(&thd::LAYOUT, stream, geometry, flags, image)
}

/// Resolves requests to formats and runs their checks and parsers
pub struct Dispatcher {
    matcher: Box<dyn GeometryMatcher>,
    file_types: Box<dyn FileTypeTable>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Box::new(TemplateTable::pc98()), Box::new(DefaultFileTypes))
    }
}

impl Dispatcher {
    /// Create a dispatcher over a template matcher and a file-type table
    pub fn new(matcher: Box<dyn GeometryMatcher>, file_types: Box<dyn FileTypeTable>) -> Self {
        Self { matcher, file_types }
    }

    /// Expand a request into the formats to try
    pub fn resolve(&self, request: &FormatRequest) -> Vec<FormatCandidate> {
        match request {
            FormatRequest::Format(format) => vec![FormatCandidate::new(*format)],
            FormatRequest::Extension(ext) => self.file_types.find_ext(ext),
            FormatRequest::Candidates(list) => list.clone(),
        }
    }

    /// Check a stream
    ///
    /// Candidates are tried in order and the first one that accepts the
    /// stream wins. A report needing manual confirmation is recorded as a
    /// warning in `diag`.
    pub fn check<S: ReadSeek>(
        &self,
        request: &FormatRequest,
        stream: &mut S,
        diag: &mut Diagnostics,
    ) -> Result<CheckReport> {
        diag.clear();
        let result = diag.track(self.check_candidates(request, stream));
        if let Ok(report) = &result {
            if report.status == CheckStatus::ManualRequired {
                diag.warning(
                    ErrorCode::ManualGeometryRequired,
                    format!("{}: no template matches, confirm geometry", report.format),
                );
            }
        }
        result
    }

    fn check_candidates(&self, request: &FormatRequest, stream: &mut dyn ReadSeek) -> Result<CheckReport> {
        let candidates = self.resolve(request);
        if candidates.is_empty() {
            return Err(ImageError::unsupported(format!("nothing handles {:?}", request)));
        }

        let mut last_error = None;
        for candidate in &candidates {
            let entry = entry_for(candidate.format)?;
            stream.seek(SeekFrom::Start(0))?;
            match (entry.check)(&mut *stream, &candidate.hints, self.matcher.as_ref()) {
                Ok(report) => {
                    log::debug!(
                        "Dispatcher::check(): {} accepted, status {}",
                        report.format,
                        report.status.code()
                    );
                    return Ok(report);
                }
                Err(e) => {
                    log::debug!("Dispatcher::check(): {} rejected: {}", candidate.format, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if candidates.len() == 1 => Err(e),
            _ => Err(ImageError::unsupported(format!(
                "no format in {:?} accepts the image",
                candidates.iter().map(|c| c.format.name()).collect::<Vec<_>>()
            ))),
        }
    }

    /// Parse a stream as a format with a confirmed geometry
    ///
    /// D88 containers ignore the geometry; every other format requires one.
    pub fn parse<S: ReadSeek>(
        &self,
        format: ImageFormat,
        geometry: Option<&Geometry>,
        stream: &mut S,
        flags: ParseFlags,
        diag: &mut Diagnostics,
    ) -> Result<DiskImage> {
        diag.clear();
        diag.track(Self::parse_format(format, geometry, stream, flags))
    }

    fn parse_format(
        format: ImageFormat,
        geometry: Option<&Geometry>,
        stream: &mut dyn ReadSeek,
        flags: ParseFlags,
    ) -> Result<DiskImage> {
        let entry = entry_for(format)?;
        stream.seek(SeekFrom::Start(0))?;
        let mut image = DiskImage::new(format);
        (entry.parse)(stream, geometry, flags, &mut image)?;
        Ok(image)
    }

    /// Check then parse with the best geometry
    ///
    /// When only a manual fallback exists it is used, and the warning is
    /// left in `diag`. D88 files carry their own layout, so they never warn.
    pub fn parse_auto<S: ReadSeek>(
        &self,
        request: FormatRequest,
        stream: &mut S,
        diag: &mut Diagnostics,
    ) -> Result<DiskImage> {
        let report = self.check(&request, stream, diag)?;
        let geometry = report.geometry();
        let image = self.parse(report.format, geometry.as_ref(), stream, ParseFlags::empty(), diag)?;
        // D88 parsing never uses the geometry
        if report.status == CheckStatus::ManualRequired && report.format != ImageFormat::D88 {
            diag.warning(
                ErrorCode::ManualGeometryRequired,
                format!("{}: parsed with unconfirmed geometry", report.format),
            );
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Outcome;
    use crate::format::DiskDensity;
    use crate::io::hdd::HddHeader;
    use crate::io::writer::D88Writer;
    use binrw::BinWrite;
    use std::io::Cursor;

    fn hdd_image(geometry: &Geometry) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        HddHeader::new(geometry).write(&mut cursor).unwrap();
        let mut bytes = cursor.into_inner();
        bytes.resize(bytes.len() + geometry.total_capacity() as usize, 0xE5);
        bytes
    }

    #[test]
    fn test_registry_covers_every_format() {
        for format in [
            ImageFormat::D88,
            ImageFormat::Hdi,
            ImageFormat::Hdd,
            ImageFormat::Nhd,
            ImageFormat::Thd,
            ImageFormat::Plain,
        ] {
            assert_eq!(entry_for(format).unwrap().format, format);
        }
    }

    #[test]
    fn test_request_from_path() {
        assert_eq!(
            FormatRequest::from_path("games/disk.HDD"),
            FormatRequest::Extension("HDD".to_string())
        );
        assert_eq!(FormatRequest::from_path("noext"), FormatRequest::Extension(String::new()));
    }

    #[test]
    fn test_check_template_match() {
        let geometry = Geometry::new(8, 310, 33, 256);
        let mut stream = Cursor::new(hdd_image(&geometry));
        let mut diag = Diagnostics::new();
        let report = Dispatcher::default()
            .check(&FormatRequest::Format(ImageFormat::Hdd), &mut stream, &mut diag)
            .unwrap();

        assert_eq!(report.status.code(), 0);
        assert_eq!(report.candidates, vec![geometry]);
        assert_eq!(diag.outcome(), Outcome::Success);
    }

    #[test]
    fn test_check_manual_warns() {
        let geometry = Geometry::new(4, 40, 17, 512);
        let mut stream = Cursor::new(hdd_image(&geometry));
        let mut diag = Diagnostics::new();
        let report = Dispatcher::default()
            .check(&FormatRequest::Extension("hdd".into()), &mut stream, &mut diag)
            .unwrap();

        assert_eq!(report.status.code(), 1);
        assert_eq!(report.manual, Some(geometry));
        assert_eq!(diag.outcome(), Outcome::Warning);
        assert_eq!(diag.codes(), vec![ErrorCode::ManualGeometryRequired]);
    }

    #[test]
    fn test_check_single_candidate_keeps_error() {
        let mut bytes = hdd_image(&Geometry::new(8, 310, 33, 256));
        bytes[0] = b'X';
        let mut diag = Diagnostics::new();
        let result = Dispatcher::default().check(
            &FormatRequest::Format(ImageFormat::Hdd),
            &mut Cursor::new(bytes),
            &mut diag,
        );

        assert!(matches!(result, Err(ImageError::NotRecognized { format: ImageFormat::Hdd })));
        assert_eq!(diag.outcome(), Outcome::Failure);
        assert_eq!(diag.codes(), vec![ErrorCode::NotRecognized]);
    }

    #[test]
    fn test_check_unknown_extension() {
        let mut diag = Diagnostics::new();
        let result = Dispatcher::default().check(
            &FormatRequest::Extension("xyz".into()),
            &mut Cursor::new(vec![0u8; 4096]),
            &mut diag,
        );
        assert!(matches!(result, Err(ImageError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_img_falls_back_to_plain() {
        let mut stream = Cursor::new(vec![0u8; 1_474_560]);
        let mut diag = Diagnostics::new();
        let report = Dispatcher::default()
            .check(&FormatRequest::Extension("img".into()), &mut stream, &mut diag)
            .unwrap();

        assert_eq!(report.format, ImageFormat::Plain);
        assert_eq!(
            report.candidates,
            vec![Geometry::new(2, 80, 18, 512).with_density(DiskDensity::High)]
        );
    }

    #[test]
    fn test_parse_requires_geometry() {
        let mut stream = Cursor::new(hdd_image(&Geometry::new(8, 310, 33, 256)));
        let mut diag = Diagnostics::new();
        let result = Dispatcher::default().parse(
            ImageFormat::Hdd,
            None,
            &mut stream,
            ParseFlags::empty(),
            &mut diag,
        );
        assert!(matches!(result, Err(ImageError::InvalidDiskParameters)));
        assert_eq!(diag.codes(), vec![ErrorCode::InvalidDiskParameters]);
    }

    #[test]
    fn test_parse_auto_mark_modified() {
        let geometry = Geometry::new(4, 153, 33, 256);
        let mut stream = Cursor::new(hdd_image(&geometry));
        let mut diag = Diagnostics::new();
        let dispatcher = Dispatcher::default();

        let image = dispatcher
            .parse_auto(FormatRequest::Format(ImageFormat::Hdd), &mut stream, &mut diag)
            .unwrap();
        assert_eq!(image.format(), ImageFormat::Hdd);
        assert_eq!(image.start_offset(), 220);
        assert_eq!(image.get_disk(0).unwrap().track_count(), 4 * 153);
        assert!(!image.is_changed());

        let image = dispatcher
            .parse(ImageFormat::Hdd, Some(&geometry), &mut stream, ParseFlags::MARK_MODIFIED, &mut diag)
            .unwrap();
        assert!(image.is_changed());
        assert!(diag.is_empty());
    }

    #[test]
    fn test_parse_auto_d88_odd_geometry() {
        let geometry = Geometry::new(2, 3, 5, 256).with_density(DiskDensity::Double);
        let mut image = DiskImage::builder().geometry(geometry).build().unwrap();
        let mut stream = Cursor::new(Vec::new());
        let mut diag = Diagnostics::new();
        D88Writer::default().write_image(&mut image, &mut stream, &mut diag).unwrap();

        let dispatcher = Dispatcher::default();
        let report = dispatcher
            .check(&FormatRequest::Format(ImageFormat::D88), &mut stream, &mut diag)
            .unwrap();
        assert_eq!(report.status, CheckStatus::ManualRequired);

        let parsed = dispatcher
            .parse_auto(FormatRequest::Format(ImageFormat::D88), &mut stream, &mut diag)
            .unwrap();
        assert_eq!(parsed.get_disk(0).unwrap().track_count(), 6);
        assert!(diag.is_empty());
    }
}
