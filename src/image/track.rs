/// Track data structures

use crate::format::constants::D88_SECTOR_HEADER_SIZE;
use crate::image::sector::Sector;
use std::collections::HashMap;

/// A disk track containing multiple sectors
#[derive(Debug, Clone)]
pub struct Track {
    /// Position of the track in the disk (D88 offset table slot)
    pub index: usize,
    /// Physical cylinder number
    pub cylinder: u32,
    /// Physical side number
    pub side_number: u8,
    /// Sectors in this track
    sectors: Vec<Sector>,
    /// Map from sector record number to index in sectors vector
    sector_map: HashMap<u16, usize>,
    /// Bytes stored after the last sector, up to the next track
    extra: Vec<u8>,
}

impl Track {
    /// Create a new track
    pub fn new(index: usize, cylinder: u32, side_number: u8) -> Self {
        Self {
            index,
            cylinder,
            side_number,
            sectors: Vec::new(),
            sector_map: HashMap::new(),
            extra: Vec::new(),
        }
    }

    /// Add a sector to this track
    pub fn add_sector(&mut self, sector: Sector) {
        let record = sector.id().record;
        let index = self.sectors.len();
        self.sectors.push(sector);
        self.sector_map.entry(record).or_insert(index);
    }

    /// Get a reference to all sectors
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// Get a mutable reference to all sectors
    pub fn sectors_mut(&mut self) -> &mut [Sector] {
        &mut self.sectors
    }

    /// Get the first sector with a record number
    pub fn get_sector(&self, record: u16) -> Option<&Sector> {
        self.sector_map
            .get(&record)
            .and_then(|&idx| self.sectors.get(idx))
    }

    /// Get a mutable reference to the first sector with a record number
    pub fn get_sector_mut(&mut self, record: u16) -> Option<&mut Sector> {
        self.sector_map
            .get(&record)
            .and_then(|&idx| self.sectors.get_mut(idx))
    }

    /// Get a sector by its position index
    pub fn get_sector_by_index(&self, index: usize) -> Option<&Sector> {
        self.sectors.get(index)
    }

    /// Get the number of sectors in this track
    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    /// Check if this track has any sectors
    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    /// Get the total data size of all sectors in bytes
    pub fn total_data_size(&self) -> usize {
        self.sectors.iter().map(|s| s.actual_size()).sum()
    }

    /// Get the trailing bytes after the last sector
    pub fn extra(&self) -> &[u8] {
        &self.extra
    }

    /// Set the trailing bytes after the last sector
    pub fn set_extra(&mut self, extra: Vec<u8>) {
        self.extra = extra;
    }

    /// Drop the trailing bytes
    pub fn clear_extra(&mut self) {
        self.extra.clear();
    }

    /// Bytes this track occupies in a D88 container
    ///
    /// Trailing bytes are only counted when they are kept.
    pub fn container_size(&self, trim_unused: bool) -> usize {
        let sectors: usize = self
            .sectors
            .iter()
            .map(|s| D88_SECTOR_HEADER_SIZE + s.actual_size())
            .sum();
        if trim_unused || self.sectors.is_empty() {
            sectors
        } else {
            sectors + self.extra.len()
        }
    }

    /// Get list of all sector record numbers in this track
    pub fn sector_ids(&self) -> Vec<u16> {
        self.sectors.iter().map(|s| s.id().record).collect()
    }

    /// Check if this track contains a sector with the given record number
    pub fn has_sector(&self, record: u16) -> bool {
        self.sector_map.contains_key(&record)
    }
}
