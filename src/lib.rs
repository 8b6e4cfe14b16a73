/*!
# d88manager

A Rust library for reading PC-98 disk images and writing D88 containers.

## Features

- Read D88 containers, including files holding several disks
- Read HDI, HDD, NHD and THD hard disk images and headerless sector dumps
- Match header geometries against known drive templates, or fall back to a
  geometry the caller confirms
- Write any disk back out as a D88 container, whole or one side at a time

## Quick Start

```rust,no_run
use d88manager::{D88Writer, Diagnostics, DiskImage, SideSelector, WriterOptions};
use std::fs::File;

// Open an image, choosing the format from the extension
let mut image = DiskImage::open("game.hdm")?;

// Read a sector: disk 0, track 0, record 1
let data = image.read_sector(0, 0, 1)?;
println!("{} bytes", data.len());

// Save the whole image as D88
image.save("game.d88")?;

// Extract side 1 of the first disk
let mut file = File::create("side1.d88")?;
let mut diag = Diagnostics::new();
D88Writer::new(WriterOptions::default()).write_disk(
    image.get_disk_mut(0),
    SideSelector::Side(1),
    &mut file,
    &mut diag,
)?;
# Ok::<(), d88manager::ImageError>(())
```

## Checking before parsing

Raw hard disk headers only describe a geometry. A check reports whether the
geometry matches a known template; when it does not, the caller confirms
the manual fallback before parsing.

```rust,no_run
use d88manager::{CheckStatus, Diagnostics, Dispatcher, FormatRequest, ParseFlags};
use std::fs::File;

let mut file = File::open("drive.nhd")?;
let mut diag = Diagnostics::new();
let dispatcher = Dispatcher::default();

let report = dispatcher.check(&FormatRequest::from_path("drive.nhd"), &mut file, &mut diag)?;
if report.status == CheckStatus::ManualRequired {
    println!("unknown geometry {:?}", report.manual);
}
let image = dispatcher.parse(
    report.format,
    report.geometry().as_ref(),
    &mut file,
    ParseFlags::empty(),
    &mut diag,
)?;
# Ok::<(), d88manager::ImageError>(())
```

## Modules

- `format`: format identifiers, geometry, templates and constants
- `image`: in-memory image model (DiskImage, Disk, Track, Sector)
- `io`: format readers, dispatch and the D88 writer
- `diagnostics`: call-scoped error and warning sink
- `fdc`: disk BIOS result codes stored with D88 sectors
- `error`: Error types and Result alias
*/

#![warn(missing_docs)]

/// Call-scoped diagnostics sink
pub mod diagnostics;
/// Error types and Result alias
pub mod error;
/// Disk BIOS result codes
pub mod fdc;
/// Format identifiers, geometry and templates
pub mod format;
/// Core image data structures (DiskImage, Disk, Track, Sector)
pub mod image;
/// I/O operations for reading and writing images
pub mod io;

// Re-export common types
pub use diagnostics::{Diagnostic, Diagnostics, Outcome, Severity};
pub use error::{ErrorCode, ImageError, Result};
pub use fdc::FdcStatus;
pub use format::{
    DefaultFileTypes, DiskDensity, DiskTemplate, FileTypeTable, FormatCandidate, Geometry,
    GeometryMatcher, ImageFormat, TemplateTable,
};
pub use image::{Disk, DiskImage, DiskImageBuilder, Sector, SectorId, Track};
pub use io::{
    CheckReport, CheckStatus, D88Writer, Dispatcher, FormatRequest, ParseFlags, SideSelector,
    WriterOptions,
};
