//! Physical structures
//!
//! Physical structures describe the carriers of a work: the bound volume,
//! its pages, audio tracks and so on. Each one may point to one file per
//! media variant (e.g. the archival TIFF and a JPEG derivative of a page).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use super::division::{Division, Node};
use super::id::DivisionId;

/// A kind of file representing a physical structure
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MediaVariant {
    /// Usage name, e.g. `LOCAL` or `DEFAULT`
    #[serde(rename = "use")]
    pub use_name: String,

    /// MIME type, e.g. `image/tiff`
    pub mime_type: String,
}

impl MediaVariant {
    pub fn new(use_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            use_name: use_name.into(),
            mime_type: mime_type.into(),
        }
    }
}

impl fmt::Display for MediaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.use_name, self.mime_type)
    }
}

/// File locations of a physical structure, at most one per media variant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaFiles(BTreeMap<MediaVariant, String>);

impl MediaFiles {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets the file for a variant, returning the previous location
    pub fn insert(&mut self, variant: MediaVariant, uri: impl Into<String>) -> Option<String> {
        self.0.insert(variant, uri.into())
    }

    pub fn remove(&mut self, variant: &MediaVariant) -> Option<String> {
        self.0.remove(variant)
    }

    pub fn get(&self, variant: &MediaVariant) -> Option<&str> {
        self.0.get(variant).map(String::as_str)
    }

    /// Finds the file for a usage name regardless of MIME type
    pub fn by_use(&self, use_name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(variant, _)| variant.use_name == use_name)
            .map(|(_, uri)| uri.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MediaVariant, &str)> {
        self.0.iter().map(|(variant, uri)| (variant, uri.as_str()))
    }
}

#[derive(Serialize, Deserialize)]
struct MediaFileRecord {
    #[serde(flatten)]
    variant: MediaVariant,
    uri: String,
}

impl Serialize for MediaFiles {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Struct keys are not valid JSON object keys, so write a list
        let records: Vec<_> = self
            .0
            .iter()
            .map(|(variant, uri)| MediaFileRecord {
                variant: variant.clone(),
                uri: uri.clone(),
            })
            .collect();
        records.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MediaFiles {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let records = Vec::<MediaFileRecord>::deserialize(deserializer)?;
        let mut files = MediaFiles::new();
        for record in records {
            if files.insert(record.variant.clone(), record.uri).is_some() {
                return Err(serde::de::Error::custom(format!(
                    "more than one file for media variant {}",
                    record.variant
                )));
            }
        }
        Ok(files)
    }
}

/// A node of the physical structure tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalStructure {
    #[serde(default = "DivisionId::generate_physical")]
    pub id: DivisionId,

    #[serde(flatten)]
    pub division: Division<PhysicalStructure>,

    #[serde(default, skip_serializing_if = "MediaFiles::is_empty")]
    pub media_files: MediaFiles,
}

impl PhysicalStructure {
    /// Creates an untyped physical structure, as used for the tree root
    pub fn new() -> Self {
        Self::with_id(DivisionId::generate_physical())
    }

    pub fn with_id(id: DivisionId) -> Self {
        Self {
            id,
            division: Division::default(),
            media_files: MediaFiles::new(),
        }
    }

    /// Creates a typed physical structure with the given order
    pub fn typed(division_type: impl Into<String>, order: i32) -> Self {
        let mut structure = Self::new();
        structure.division.division_type = Some(division_type.into());
        structure.division.order = order;
        structure
    }

    pub fn with_orderlabel(mut self, orderlabel: impl Into<String>) -> Self {
        self.division.orderlabel = Some(orderlabel.into());
        self
    }

    pub fn with_media_file(mut self, variant: MediaVariant, uri: impl Into<String>) -> Self {
        self.media_files.insert(variant, uri);
        self
    }

    /// Finds a structure by ID in this subtree
    pub fn find(&self, id: &DivisionId) -> Option<&PhysicalStructure> {
        self.tree_stream().find(|structure| &structure.id == id)
    }

    /// Detaches the descendant with the given ID from this subtree
    pub fn remove_descendant(&mut self, id: &DivisionId) -> Option<PhysicalStructure> {
        let children = &mut self.division.children;
        if let Some(index) = children.iter().position(|child| &child.id == id) {
            return Some(children.remove(index));
        }
        children
            .iter_mut()
            .find_map(|child| child.remove_descendant(id))
    }
}

impl Default for PhysicalStructure {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for PhysicalStructure {
    fn division(&self) -> &Division<Self> {
        &self.division
    }

    fn division_mut(&mut self) -> &mut Division<Self> {
        &mut self.division
    }
}

impl fmt::Display for PhysicalStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} #{}",
            self.id,
            self.division_type().unwrap_or("-"),
            self.order()
        )?;
        if let Some(orderlabel) = self.orderlabel() {
            write!(f, " \"{}\"", orderlabel)?;
        }
        Ok(())
    }
}
