/// I/O operations for reading and writing disk images

/// Indexed container (D88) reader and header records
pub mod d88;
/// Format dispatch
pub mod dispatch;
/// Virtual98 HDD header
pub mod hdd;
/// Anex86 HDI header
pub mod hdi;
/// T98-Next NHD header
pub mod nhd;
/// Headerless sector dumps
pub mod plain;
/// Shared raw sector slicer
pub mod raw;
/// T98 THD header
pub mod thd;
/// D88 container writer
pub mod writer;

pub use d88::{D88Header, D88SectorHeader};
pub use dispatch::{CheckReport, CheckStatus, Dispatcher, FormatRequest, ParseFlags};
pub use raw::{slice_sectors, RawHeaderFields, RawHeaderLayout};
pub use writer::{D88Writer, SideSelector, WriterOptions};

use crate::error::{ImageError, Result};
use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// A stream that can be read and repositioned
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// Get the length of a stream, leaving the position where it was
pub fn stream_len<S: Seek + ?Sized>(stream: &mut S) -> Result<u64> {
    let pos = stream.stream_position()?;
    let len = stream.seek(SeekFrom::End(0))?;
    stream.seek(SeekFrom::Start(pos))?;
    Ok(len)
}

/// Read as many bytes as possible into `buf`, stopping only at end of stream
pub(crate) fn read_fill<R: Read + ?Sized>(stream: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Rewind to `start` and read exactly `size` header bytes
///
/// A short read is reported as [`ImageError::ImageTooSmall`].
pub(crate) fn read_header_at<S: ReadSeek + ?Sized>(stream: &mut S, start: u64, size: usize) -> Result<Vec<u8>> {
    stream.seek(SeekFrom::Start(start))?;
    let mut buf = vec![0u8; size];
    if read_fill(stream, &mut buf)? < size {
        return Err(ImageError::ImageTooSmall);
    }
    Ok(buf)
}
