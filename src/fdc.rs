/// Per-sector FDC result status
///
/// D88 sector headers record the PC-98 disk BIOS result code returned when
/// the sector was dumped. Only the high nibble is meaningful.

use std::fmt;

/// Disk BIOS result code stored with each D88 sector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FdcStatus(pub u8);

impl FdcStatus {
    /// Normal end
    pub const NORMAL: u8 = 0x00;

    /// Normal end, deleted data address mark read
    pub const DELETED: u8 = 0x10;

    /// CRC error in the ID field
    pub const ID_CRC: u8 = 0xA0;

    /// CRC error in the data field
    pub const DATA_CRC: u8 = 0xB0;

    /// No ID address mark found
    pub const NO_ADDRESS_MARK: u8 = 0xE0;

    /// No data address mark found
    pub const NO_DATA_MARK: u8 = 0xF0;

    /// Create a new FdcStatus from a raw byte
    #[inline]
    pub fn new(value: u8) -> Self {
        FdcStatus(value)
    }

    #[inline]
    fn kind(&self) -> u8 {
        self.0 & 0xF0
    }

    /// Check if a deleted data mark was read
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.kind() == Self::DELETED
    }

    /// Check if either field had a CRC error
    #[inline]
    pub fn crc_error(&self) -> bool {
        matches!(self.kind(), Self::ID_CRC | Self::DATA_CRC)
    }

    /// Check if an address or data mark was missing
    #[inline]
    pub fn missing_mark(&self) -> bool {
        matches!(self.kind(), Self::NO_ADDRESS_MARK | Self::NO_DATA_MARK)
    }

    /// Check if any error is recorded
    #[inline]
    pub fn has_error(&self) -> bool {
        !matches!(self.kind(), Self::NORMAL | Self::DELETED)
    }
}

impl fmt::Display for FdcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Self::NORMAL => write!(f, "OK"),
            Self::DELETED => write!(f, "Deleted"),
            Self::ID_CRC => write!(f, "ID CRC"),
            Self::DATA_CRC => write!(f, "Data CRC"),
            Self::NO_ADDRESS_MARK => write!(f, "No AM"),
            Self::NO_DATA_MARK => write!(f, "No DAM"),
            _ => write!(f, "{:02X}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal() {
        let status = FdcStatus::new(0);
        assert!(!status.has_error());
        assert!(!status.is_deleted());
        assert_eq!(status.to_string(), "OK");
    }

    #[test]
    fn test_deleted_is_not_error() {
        let status = FdcStatus::new(FdcStatus::DELETED);
        assert!(status.is_deleted());
        assert!(!status.has_error());
    }

    #[test]
    fn test_errors() {
        assert!(FdcStatus::new(FdcStatus::DATA_CRC).crc_error());
        assert!(FdcStatus::new(FdcStatus::ID_CRC).has_error());
        assert!(FdcStatus::new(FdcStatus::NO_DATA_MARK).missing_mark());
        assert_eq!(FdcStatus::new(0xB0).to_string(), "Data CRC");
    }
}
