/// File extension to format lookup

use crate::format::geometry::{DiskDensity, Geometry};
use crate::format::ImageFormat;
use std::path::Path;

/// A format to try for a file, with optional geometry hints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatCandidate {
    /// Format to try
    pub format: ImageFormat,
    /// Geometries the extension suggests, in preference order
    pub hints: Vec<Geometry>,
}

impl FormatCandidate {
    /// Candidate without hints
    pub fn new(format: ImageFormat) -> Self {
        Self {
            format,
            hints: Vec::new(),
        }
    }

    /// Candidate with hints
    pub fn with_hints(format: ImageFormat, hints: Vec<Geometry>) -> Self {
        Self { format, hints }
    }
}

/// Maps a file extension to an ordered list of formats to try
pub trait FileTypeTable {
    /// Look up an extension (without the leading dot)
    fn find_ext(&self, extension: &str) -> Vec<FormatCandidate>;
}

/// Built-in extension table
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFileTypes;

fn hint_2hd_1m() -> Geometry {
    Geometry::new(2, 77, 8, 1024).with_density(DiskDensity::High)
}

fn hint_2hd_1440k() -> Geometry {
    Geometry::new(2, 80, 18, 512).with_density(DiskDensity::High)
}

impl FileTypeTable for DefaultFileTypes {
    fn find_ext(&self, extension: &str) -> Vec<FormatCandidate> {
        match extension.to_ascii_lowercase().as_str() {
            "d88" | "d77" | "d68" | "88d" | "98d" => vec![FormatCandidate::new(ImageFormat::D88)],
            "hdi" => vec![FormatCandidate::new(ImageFormat::Hdi)],
            "hdd" => vec![FormatCandidate::new(ImageFormat::Hdd)],
            "nhd" => vec![FormatCandidate::new(ImageFormat::Nhd)],
            "thd" => vec![FormatCandidate::new(ImageFormat::Thd)],
            "fdd" | "xdf" | "2hd" | "hdm" => vec![FormatCandidate::with_hints(
                ImageFormat::Plain,
                vec![hint_2hd_1m()],
            )],
            // Some tools save D88 containers with generic extensions
            "img" | "ima" | "dsk" | "dup" => vec![
                FormatCandidate::new(ImageFormat::D88),
                FormatCandidate::with_hints(
                    ImageFormat::Plain,
                    vec![hint_2hd_1m(), hint_2hd_1440k()],
                ),
            ],
            _ => Vec::new(),
        }
    }
}

/// Get the extension of a path, if any
pub fn extension_of<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        let table = DefaultFileTypes;
        assert_eq!(table.find_ext("d88")[0].format, ImageFormat::D88);
        assert_eq!(table.find_ext("HDI")[0].format, ImageFormat::Hdi);
        assert_eq!(table.find_ext("Nhd")[0].format, ImageFormat::Nhd);
        assert_eq!(table.find_ext("thd")[0].format, ImageFormat::Thd);
        assert_eq!(table.find_ext("hdd")[0].format, ImageFormat::Hdd);
    }

    #[test]
    fn test_generic_extension_order() {
        let candidates = DefaultFileTypes.find_ext("img");
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].format, ImageFormat::D88);
        assert_eq!(candidates[1].format, ImageFormat::Plain);
        assert_eq!(candidates[1].hints.len(), 2);
    }

    #[test]
    fn test_unknown_extension() {
        assert!(DefaultFileTypes.find_ext("txt").is_empty());
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("/path/to/disk.d88"), Some("d88".to_string()));
        assert_eq!(extension_of("noext"), None);
    }
}
