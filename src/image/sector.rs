/// Sector data structures

use crate::fdc::FdcStatus;
use crate::format::constants::{
    fdc_size_to_bytes, D88_SECTOR_DELETED, D88_SECTOR_SINGLE_DENSITY,
};
use crate::io::d88::D88SectorHeader;

/// Sector ID (CHRN) - addressing information for a sector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorId {
    /// C - Cylinder/Track number
    pub cylinder: u32,
    /// H - Head/Side number
    pub head: u8,
    /// R - Sector ID/Record number
    pub record: u16,
    /// N - Size code (0=128, 1=256, 2=512, 3=1024, 4=2048, etc.)
    pub size_code: u8,
}

impl SectorId {
    /// Create a new sector ID
    pub fn new(cylinder: u32, head: u8, record: u16, size_code: u8) -> Self {
        Self {
            cylinder,
            head,
            record,
            size_code,
        }
    }

    /// Get the advertised sector size in bytes based on size code
    pub fn size_bytes(&self) -> usize {
        fdc_size_to_bytes(self.size_code)
    }
}

/// A disk sector containing data and metadata
#[derive(Debug, Clone)]
pub struct Sector {
    /// Sector addressing information (CHRN)
    id: SectorId,
    /// Number of sectors in the track, as recorded with this sector
    pub sectors_per_track: u16,
    /// Recorded in single density (FM)
    pub single_density: bool,
    /// Deleted data address mark
    pub deleted: bool,
    /// BIOS result status
    pub status: FdcStatus,
    /// Sector data
    data: Vec<u8>,
    /// Header record this sector was parsed from
    header: Option<D88SectorHeader>,
}

impl Sector {
    /// Create a new sector filled with the format filler byte
    pub fn new(id: SectorId) -> Self {
        let size = id.size_bytes();
        Self::with_data(id, vec![0xE5; size])
    }

    /// Create a new sector with specific data
    pub fn with_data(id: SectorId, data: Vec<u8>) -> Self {
        Self {
            id,
            sectors_per_track: 0,
            single_density: false,
            deleted: false,
            status: FdcStatus::default(),
            data,
            header: None,
        }
    }

    /// Create a sector from a parsed D88 header record and its data
    pub fn from_header(header: D88SectorHeader, data: Vec<u8>) -> Self {
        Self {
            id: SectorId::new(header.c as u32, header.h, header.r as u16, header.n),
            sectors_per_track: header.sectors,
            single_density: header.density & D88_SECTOR_SINGLE_DENSITY != 0,
            deleted: header.deleted & D88_SECTOR_DELETED != 0,
            status: FdcStatus::new(header.status),
            data,
            header: Some(header),
        }
    }

    /// Get the sector ID
    pub fn id(&self) -> SectorId {
        self.id
    }

    /// Replace the sector ID; the original header record is no longer valid
    pub fn set_id(&mut self, id: SectorId) {
        self.id = id;
        self.header = None;
    }

    /// Set the sectors per track hint
    pub fn set_sectors_per_track(&mut self, count: u16) {
        self.sectors_per_track = count;
    }

    /// Get a reference to the sector data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the sector data
    pub fn data_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }

    /// Set the sector data
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }

    /// Get the advertised size from the size code
    pub fn advertised_size(&self) -> usize {
        self.id.size_bytes()
    }

    /// Get the actual data size
    pub fn actual_size(&self) -> usize {
        self.data.len()
    }

    /// Check if the actual size matches the advertised size
    pub fn has_size_mismatch(&self) -> bool {
        self.actual_size() != self.advertised_size()
    }

    /// Fill the sector with a specific byte value
    pub fn fill(&mut self, byte: u8) {
        self.data.fill(byte);
    }

    /// Resize the sector data
    pub fn resize(&mut self, new_size: usize, fill_byte: u8) {
        self.data.resize(new_size, fill_byte);
    }

    /// Does this sector still carry the header record it was parsed from
    pub fn has_header(&self) -> bool {
        self.header.is_some()
    }

    /// Fill a D88 sector header record for this sector
    ///
    /// Copies the parsed header when one exists and returns `true`;
    /// otherwise builds the record from the sector's own fields and
    /// returns `false`. The size field reflects the current data, saturating
    /// at `u16::MAX`; the writer refuses larger sectors.
    pub fn fill_header(&self, header: &mut D88SectorHeader) -> bool {
        let existing = match &self.header {
            Some(original) => {
                *header = *original;
                true
            }
            None => {
                *header = D88SectorHeader {
                    c: self.id.cylinder as u8,
                    h: self.id.head,
                    r: self.id.record as u8,
                    n: self.id.size_code,
                    sectors: self.sectors_per_track,
                    density: if self.single_density { D88_SECTOR_SINGLE_DENSITY } else { 0 },
                    deleted: if self.deleted { D88_SECTOR_DELETED } else { 0 },
                    status: self.status.0,
                    reserved: [0; 5],
                    size: 0,
                };
                false
            }
        };
        header.size = u16::try_from(self.data.len()).unwrap_or(u16::MAX);
        existing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_id_size() {
        let id = SectorId::new(0, 0, 1, 2);
        assert_eq!(id.size_bytes(), 512);

        let id2 = SectorId::new(0, 0, 1, 3);
        assert_eq!(id2.size_bytes(), 1024);
    }

    #[test]
    fn test_new_sector() {
        let sector = Sector::new(SectorId::new(0, 0, 1, 1));

        assert_eq!(sector.data().len(), 256);
        assert!(sector.data().iter().all(|&b| b == 0xE5));
        assert!(!sector.has_size_mismatch());
        assert!(!sector.has_header());
    }

    #[test]
    fn test_fill_header_from_identity() {
        let mut sector = Sector::with_data(SectorId::new(3, 1, 7, 1), vec![0x11; 256]);
        sector.set_sectors_per_track(16);
        sector.deleted = true;

        let mut header = D88SectorHeader::default();
        assert!(!sector.fill_header(&mut header));
        assert_eq!((header.c, header.h, header.r, header.n), (3, 1, 7, 1));
        assert_eq!(header.sectors, 16);
        assert_eq!(header.deleted, D88_SECTOR_DELETED);
        assert_eq!(header.size, 256);
    }

    #[test]
    fn test_fill_header_keeps_original() {
        let original = D88SectorHeader {
            c: 1,
            h: 0,
            r: 2,
            n: 1,
            sectors: 16,
            density: D88_SECTOR_SINGLE_DENSITY,
            deleted: 0,
            status: 0xB0,
            reserved: [1, 2, 3, 4, 5],
            size: 256,
        };
        let mut sector = Sector::from_header(original, vec![0; 256]);
        assert!(sector.single_density);
        assert!(sector.status.crc_error());

        sector.resize(128, 0);
        let mut header = D88SectorHeader::default();
        assert!(sector.fill_header(&mut header));
        assert_eq!(header.reserved, [1, 2, 3, 4, 5]);
        assert_eq!(header.size, 128);

        sector.set_id(SectorId::new(9, 1, 2, 1));
        assert!(!sector.fill_header(&mut header));
        assert_eq!(header.c, 9);
    }
}
