/// Disk data structures

use crate::format::constants::{D88_HEADER_SIZE, D88_NAME_LENGTH};
use crate::format::DiskDensity;
use crate::image::track::Track;

/// A single disk: the unit a D88 container header describes
#[derive(Debug, Clone)]
pub struct Disk {
    /// Disk name as stored (Shift-JIS, NUL padded)
    name: [u8; D88_NAME_LENGTH],
    /// Reserved header bytes, kept for round trips
    pub(crate) reserved: [u8; 9],
    /// Write protect flag
    pub write_protected: bool,
    /// Recording density
    pub density: DiskDensity,
    /// Tracks in offset table order
    tracks: Vec<Track>,
    /// Size of the container header in front of the tracks
    offset_start: u32,
    /// Size of the track data, excluding the header
    size_without_header: u32,
    /// Has the disk been modified since it was read or written
    modified: bool,
}

impl Disk {
    /// Create a new empty disk
    pub fn new(density: DiskDensity) -> Self {
        Self {
            name: [0; D88_NAME_LENGTH],
            reserved: [0; 9],
            write_protected: false,
            density,
            tracks: Vec::new(),
            offset_start: D88_HEADER_SIZE as u32,
            size_without_header: 0,
            modified: false,
        }
    }

    /// Create a new empty disk with preallocated tracks
    pub fn with_capacity(density: DiskDensity, num_tracks: usize) -> Self {
        let mut disk = Self::new(density);
        disk.tracks.reserve(num_tracks);
        disk
    }

    /// Get the disk name, up to the first NUL
    pub fn name(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }

    /// Get the raw name field
    pub fn raw_name(&self) -> &[u8; D88_NAME_LENGTH] {
        &self.name
    }

    /// Set the disk name, truncated to 16 bytes
    pub fn set_name(&mut self, name: &str) {
        self.name = [0; D88_NAME_LENGTH];
        let bytes = name.as_bytes();
        let len = bytes.len().min(D88_NAME_LENGTH - 1);
        self.name[..len].copy_from_slice(&bytes[..len]);
        self.modified = true;
    }

    pub(crate) fn set_raw_name(&mut self, name: [u8; D88_NAME_LENGTH]) {
        self.name = name;
    }

    /// Add a track to this disk
    pub fn add_track(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Get a reference to all tracks
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Get a mutable reference to all tracks
    pub fn tracks_mut(&mut self) -> &mut [Track] {
        self.modified = true;
        &mut self.tracks
    }

    /// Get a track by its position
    pub fn get_track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Get a mutable reference to a track by its position
    pub fn get_track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.modified = true;
        self.tracks.get_mut(index)
    }

    /// Get the number of tracks on this disk
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Check if this disk has any tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Get the total size of all sector data in bytes
    pub fn total_size(&self) -> usize {
        self.tracks.iter().map(|t| t.total_data_size()).sum()
    }

    /// Drop trailing track bytes when trimming and recompute the disk size
    ///
    /// Returns the size of the disk as a container, header included.
    pub fn shrink_tracks(&mut self, trim_unused: bool) -> u32 {
        if trim_unused {
            for track in &mut self.tracks {
                track.clear_extra();
            }
        }
        let size: usize = self
            .tracks
            .iter()
            .map(|t| t.container_size(trim_unused))
            .sum();
        self.size_without_header = u32::try_from(size).unwrap_or(u32::MAX);
        self.offset_start.saturating_add(self.size_without_header)
    }

    /// Get the header size in front of the tracks
    pub fn offset_start(&self) -> u32 {
        self.offset_start
    }

    /// Set the header size in front of the tracks
    pub fn set_offset_start(&mut self, offset: u32) {
        self.offset_start = offset;
    }

    /// Get the size of the track data
    pub fn size_without_header(&self) -> u32 {
        self.size_without_header
    }

    /// Set the size of the track data
    pub fn set_size_without_header(&mut self, size: u32) {
        self.size_without_header = size;
    }

    /// Get the container size, header included
    pub fn size_with_header(&self) -> u32 {
        self.offset_start.saturating_add(self.size_without_header)
    }

    /// Check if the disk has been modified
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Mark the disk as modified
    pub fn mark_modified(&mut self) {
        self.modified = true;
    }

    /// Mark the disk as unchanged
    pub fn clear_modify(&mut self) {
        self.modified = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::sector::{Sector, SectorId};

    fn disk_with_tracks(count: usize) -> Disk {
        let mut disk = Disk::new(DiskDensity::High);
        for i in 0..count {
            let mut track = Track::new(i, (i / 2) as u32, (i % 2) as u8);
            for r in 1..=8 {
                track.add_sector(Sector::new(SectorId::new((i / 2) as u32, (i % 2) as u8, r, 3)));
            }
            disk.add_track(track);
        }
        disk
    }

    #[test]
    fn test_new_disk() {
        let disk = Disk::new(DiskDensity::DoubleTrack);
        assert_eq!(disk.track_count(), 0);
        assert!(disk.is_empty());
        assert!(!disk.is_modified());
        assert_eq!(disk.offset_start(), D88_HEADER_SIZE as u32);
    }

    #[test]
    fn test_name() {
        let mut disk = Disk::new(DiskDensity::High);
        disk.set_name("SYSTEM DISK WITH A LONG NAME");
        assert_eq!(disk.name(), "SYSTEM DISK WITH");
        assert_eq!(disk.raw_name()[16], 0);
        assert!(disk.is_modified());
    }

    #[test]
    fn test_get_track() {
        let disk = disk_with_tracks(4);
        assert_eq!(disk.get_track(3).unwrap().side_number, 1);
        assert!(disk.get_track(4).is_none());
    }

    #[test]
    fn test_modify_lifecycle() {
        let mut disk = disk_with_tracks(2);
        assert!(!disk.is_modified());
        disk.get_track_mut(0);
        assert!(disk.is_modified());
        disk.clear_modify();
        assert!(!disk.is_modified());
    }

    #[test]
    fn test_shrink_tracks() {
        let mut disk = disk_with_tracks(2);
        disk.tracks_mut()[0].set_extra(vec![0; 100]);

        let full = disk.shrink_tracks(false);
        assert_eq!(full, D88_HEADER_SIZE as u32 + 2 * 8 * (16 + 1024) + 100);
        assert_eq!(disk.get_track(0).unwrap().extra().len(), 100);

        let trimmed = disk.shrink_tracks(true);
        assert_eq!(trimmed, D88_HEADER_SIZE as u32 + 2 * 8 * (16 + 1024));
        assert!(disk.get_track(0).unwrap().extra().is_empty());
        assert_eq!(disk.size_with_header(), trimmed);
    }
}
