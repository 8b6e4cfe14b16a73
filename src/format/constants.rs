/// Header sizes, signatures and limits of the supported formats

/// Size of the D88 disk header including the track offset table
pub const D88_HEADER_SIZE: usize = 0x2B0;

/// Number of slots in the D88 track offset table
pub const D88_MAX_TRACKS: usize = 164;

/// Size of a D88 sector header
pub const D88_SECTOR_HEADER_SIZE: usize = 16;

/// Length of the D88 disk name field (16 characters plus terminator)
pub const D88_NAME_LENGTH: usize = 17;

/// D88 write protect byte value
pub const D88_WRITE_PROTECTED: u8 = 0x10;

/// D88 sector header density value for single density (FM) sectors
pub const D88_SECTOR_SINGLE_DENSITY: u8 = 0x40;

/// D88 sector header deleted data mark value
pub const D88_SECTOR_DELETED: u8 = 0x10;

/// Size of the Anex86 HDI header record
pub const HDI_HEADER_SIZE: usize = 220;

/// Size of the Virtual98 HDD header record
pub const HDD_HEADER_SIZE: usize = 220;

/// Virtual98 HDD signature
pub const HDD_SIGNATURE: &[u8] = b"VHD";

/// Size of the T98-Next NHD header record
pub const NHD_HEADER_SIZE: usize = 512;

/// T98-Next NHD signature (the revision suffix is not checked)
pub const NHD_SIGNATURE: &[u8] = b"T98HDDIMAGE.";

/// Size of the T98 THD header record
pub const THD_HEADER_SIZE: usize = 256;

/// THD images always use 256-byte sectors
pub const THD_SECTOR_SIZE: u32 = 256;

/// THD images always use 33 sectors per track
pub const THD_SECTORS_PER_TRACK: u32 = 33;

/// THD images always use 8 heads
pub const THD_SIDES: u32 = 8;

/// Largest accepted sector size in bytes
pub const MAX_SECTOR_SIZE: u32 = 4096;

/// Largest accepted number of sides
pub const MAX_SIDES: u32 = 32;

/// Largest accepted number of tracks per side
pub const MAX_TRACKS_PER_SIDE: u32 = 99_999;

/// Smallest track count accepted from raw hard disk headers
pub const MIN_TRACKS_PER_SIDE: u32 = 32;

/// FDC sector size code to actual byte size mapping
/// Index: size_code (0-8), Value: actual size in bytes
pub const FDC_SECTOR_SIZES: [usize; 9] = [
    128,    // 0
    256,    // 1
    512,    // 2
    1024,   // 3
    2048,   // 4
    4096,   // 5
    8192,   // 6
    16384,  // 7
    32768,  // 8
];

/// Convert FDC size code to actual byte size
#[inline]
pub fn fdc_size_to_bytes(size_code: u8) -> usize {
    if size_code as usize >= FDC_SECTOR_SIZES.len() {
        // Invalid size code, return default
        512
    } else {
        FDC_SECTOR_SIZES[size_code as usize]
    }
}

/// Convert byte size to FDC size code
#[inline]
pub fn bytes_to_fdc_size(bytes: usize) -> Option<u8> {
    FDC_SECTOR_SIZES
        .iter()
        .position(|&size| size == bytes)
        .map(|code| code as u8)
}

/// Smallest size code whose sector holds `bytes`
#[inline]
pub fn fdc_size_covering(bytes: usize) -> u8 {
    FDC_SECTOR_SIZES
        .iter()
        .position(|&size| size >= bytes)
        .unwrap_or(FDC_SECTOR_SIZES.len() - 1) as u8
}
