/// Known disk geometries used to confirm header-derived parameters

use crate::format::geometry::{DiskDensity, Geometry};

/// Looks up known geometries
pub trait GeometryMatcher {
    /// Find the template whose every field equals the query, including the
    /// density and both modifier maps
    fn find_strict(&self, query: &Geometry) -> Option<Geometry>;
}

/// A named known geometry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskTemplate {
    /// Display name
    pub name: String,
    /// The geometry
    pub geometry: Geometry,
}

impl DiskTemplate {
    /// Create a new template
    pub fn new<S: Into<String>>(name: S, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            geometry,
        }
    }
}

/// In-memory template table
#[derive(Debug, Clone, Default)]
pub struct TemplateTable {
    templates: Vec<DiskTemplate>,
}

impl TemplateTable {
    /// Create a table with no templates, every lookup falls back to manual selection
    pub fn empty() -> Self {
        Self::default()
    }

    /// PC-98 floppy and SASI hard disk templates
    pub fn pc98() -> Self {
        let mut table = Self::empty();
        table.add(DiskTemplate::new(
            "2D 320K",
            Geometry::new(2, 40, 16, 256).with_density(DiskDensity::Double),
        ));
        table.add(DiskTemplate::new(
            "2DD 640K",
            Geometry::new(2, 80, 8, 512).with_density(DiskDensity::DoubleTrack),
        ));
        table.add(DiskTemplate::new(
            "2DD 720K",
            Geometry::new(2, 80, 9, 512).with_density(DiskDensity::DoubleTrack),
        ));
        table.add(DiskTemplate::new(
            "2HD 1.2M",
            Geometry::new(2, 77, 8, 1024).with_density(DiskDensity::High),
        ));
        table.add(DiskTemplate::new(
            "2HD 1.44M",
            Geometry::new(2, 80, 18, 512).with_density(DiskDensity::High),
        ));
        table.add(DiskTemplate::new(
            "1D 160K",
            Geometry::new(1, 40, 16, 256).with_density(DiskDensity::SingleSided),
        ));
        // SASI drives as laid out by the T98/Anex86/Virtual98 emulators
        for (name, tracks, sides) in [
            ("SASI 5MB", 153, 4),
            ("SASI 10MB", 310, 4),
            ("SASI 15MB", 310, 6),
            ("SASI 20MB", 310, 8),
            ("SASI 30MB", 615, 6),
            ("SASI 40MB", 615, 8),
        ] {
            table.add(DiskTemplate::new(name, Geometry::new(sides, tracks, 33, 256)));
        }
        table
    }

    /// Add a template
    pub fn add(&mut self, template: DiskTemplate) {
        self.templates.push(template);
    }

    /// Iterate over templates
    pub fn iter(&self) -> impl Iterator<Item = &DiskTemplate> {
        self.templates.iter()
    }

    /// Number of templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Is the table empty
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Find a template by exact geometry, returning its name as well
    pub fn find_named(&self, query: &Geometry) -> Option<&DiskTemplate> {
        self.templates.iter().find(|t| t.geometry == *query)
    }
}

impl GeometryMatcher for TemplateTable {
    fn find_strict(&self, query: &Geometry) -> Option<Geometry> {
        self.find_named(query).map(|t| t.geometry)
    }
}
