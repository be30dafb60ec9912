//! Metadata domain model
//!
//! Metadata is either a leaf key/value [`MetadataEntry`] or a named
//! [`MetadataGroup`] of further metadata. Structures hold their metadata in a
//! [`MetadataSet`], so identical entries collapse into one.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MetadataError {
    #[error("Trying to get value of metadata '{0}' that was never set")]
    UnsetValue(String),

    #[error("Value of metadata '{0}' must not be absent")]
    AbsentValue(String),
}

/// Metadata section a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MdSec {
    /// Descriptive metadata (the primary section)
    #[default]
    DmdSec,
    /// Technical metadata
    TechMd,
    /// Rights metadata
    RightsMd,
    /// Source metadata
    SourceMd,
    /// Digital provenance metadata
    DigiprovMd,
}

impl MdSec {
    pub fn as_str(&self) -> &'static str {
        match self {
            MdSec::DmdSec => "DMD_SEC",
            MdSec::TechMd => "TECH_MD",
            MdSec::RightsMd => "RIGHTS_MD",
            MdSec::SourceMd => "SOURCE_MD",
            MdSec::DigiprovMd => "DIGIPROV_MD",
        }
    }
}

impl fmt::Display for MdSec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A leaf key/value datum
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataEntry {
    key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    domain: Option<MdSec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

impl MetadataEntry {
    /// Creates an entry carrying a value
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            domain: None,
            value: Some(value.into()),
        }
    }

    /// Creates an entry whose value has not been assigned yet
    pub fn unset(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            domain: None,
            value: None,
        }
    }

    /// Places the entry in a metadata section
    pub fn with_domain(mut self, domain: MdSec) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the section, defaulting to the descriptive section
    pub fn domain(&self) -> MdSec {
        self.domain.unwrap_or_default()
    }

    /// Returns the value, failing if it was never set
    pub fn value(&self) -> Result<&str, MetadataError> {
        self.value
            .as_deref()
            .ok_or_else(|| MetadataError::UnsetValue(self.key.clone()))
    }

    /// Returns true once a value was assigned
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }

    /// Sets the value from an optional source, rejecting absence
    pub fn try_set_value(&mut self, value: Option<String>) -> Result<(), MetadataError> {
        match value {
            Some(value) => {
                self.value = Some(value);
                Ok(())
            }
            None => Err(MetadataError::AbsentValue(self.key.clone())),
        }
    }
}

impl PartialEq for MetadataEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.domain() == other.domain() && self.value == other.value
    }
}

impl Eq for MetadataEntry {}

impl Hash for MetadataEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain().hash(state);
        self.key.hash(state);
        self.value.hash(state);
    }
}

impl fmt::Display for MetadataEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(domain) = self.domain {
            write!(f, "({}) ", domain)?;
        }
        match &self.value {
            Some(value) => write!(f, "{}: \"{}\"", self.key, value),
            None => write!(f, "{}: <unset>", self.key),
        }
    }
}

/// A named, ordered collection of nested metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataGroup {
    key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    domain: Option<MdSec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,

    #[serde(default, skip_serializing_if = "MetadataSet::is_empty")]
    group: MetadataSet,
}

impl MetadataGroup {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            domain: None,
            label: None,
            group: MetadataSet::new(),
        }
    }

    pub fn with_domain(mut self, domain: MdSec) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Adds a member and returns the group, for building nested values
    pub fn with(mut self, metadata: impl Into<Metadata>) -> Self {
        self.group.insert(metadata.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn domain(&self) -> MdSec {
        self.domain.unwrap_or_default()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The members of this group
    pub fn group(&self) -> &MetadataSet {
        &self.group
    }

    pub fn group_mut(&mut self) -> &mut MetadataSet {
        &mut self.group
    }
}

// Members take no part in identity: two groups under one key and domain
// are the same set element, whatever they contain.
impl PartialEq for MetadataGroup {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.domain() == other.domain()
    }
}

impl Eq for MetadataGroup {}

impl Hash for MetadataGroup {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain().hash(state);
        self.key.hash(state);
    }
}

impl fmt::Display for MetadataGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(domain) = self.domain {
            write!(f, "({}) ", domain)?;
        }
        write!(f, "{} [{} members]", self.key, self.group.len())
    }
}

/// A metadata value: leaf entry or nested group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Metadata {
    Entry(MetadataEntry),
    Group(MetadataGroup),
}

impl Metadata {
    pub fn key(&self) -> &str {
        match self {
            Metadata::Entry(entry) => entry.key(),
            Metadata::Group(group) => group.key(),
        }
    }

    pub fn domain(&self) -> MdSec {
        match self {
            Metadata::Entry(entry) => entry.domain(),
            Metadata::Group(group) => group.domain(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Metadata::Group(_))
    }

    /// Short name of the shape, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Metadata::Entry(_) => "entry",
            Metadata::Group(_) => "group",
        }
    }

    pub fn as_entry(&self) -> Option<&MetadataEntry> {
        match self {
            Metadata::Entry(entry) => Some(entry),
            Metadata::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&MetadataGroup> {
        match self {
            Metadata::Group(group) => Some(group),
            Metadata::Entry(_) => None,
        }
    }
}

impl From<MetadataEntry> for Metadata {
    fn from(entry: MetadataEntry) -> Self {
        Metadata::Entry(entry)
    }
}

impl From<MetadataGroup> for Metadata {
    fn from(group: MetadataGroup) -> Self {
        Metadata::Group(group)
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metadata::Entry(entry) => entry.fmt(f),
            Metadata::Group(group) => group.fmt(f),
        }
    }
}

/// Insertion-ordered set of metadata
///
/// Adding a value equal to one already present is a no-op. Documents that
/// repeat an identical entry are collapsed on read. Lookups go through an
/// index from hash to positions, so building a large set stays linear.
#[derive(Debug, Clone, Default)]
pub struct MetadataSet {
    values: Vec<Metadata>,
    index: HashMap<u64, Vec<usize>>,
}

fn hash_of(metadata: &Metadata) -> u64 {
    let mut hasher = DefaultHasher::new();
    metadata.hash(&mut hasher);
    hasher.finish()
}

impl MetadataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, returning false if an equal value is already present
    pub fn insert(&mut self, metadata: impl Into<Metadata>) -> bool {
        let metadata = metadata.into();
        let hash = hash_of(&metadata);
        let positions = self.index.entry(hash).or_default();
        if positions.iter().any(|&i| self.values[i] == metadata) {
            return false;
        }
        positions.push(self.values.len());
        self.values.push(metadata);
        true
    }

    /// Removes a value, returning true if it was present
    pub fn remove(&mut self, metadata: &Metadata) -> bool {
        self.retain(|m| m != metadata) > 0
    }

    /// Removes every value with the given key, returning how many were removed
    pub fn remove_key(&mut self, key: &str) -> usize {
        self.retain(|m| m.key() != key)
    }

    fn retain(&mut self, keep: impl FnMut(&Metadata) -> bool) -> usize {
        let len_before = self.values.len();
        self.values.retain(keep);
        let removed = len_before - self.values.len();
        if removed > 0 {
            self.reindex();
        }
        removed
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (position, metadata) in self.values.iter().enumerate() {
            self.index.entry(hash_of(metadata)).or_default().push(position);
        }
    }

    pub fn contains(&self, metadata: &Metadata) -> bool {
        self.index
            .get(&hash_of(metadata))
            .is_some_and(|positions| positions.iter().any(|&i| &self.values[i] == metadata))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metadata> {
        self.values.iter()
    }

    /// Returns the value of the first entry with the given key
    pub fn first_value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .filter(|metadata| metadata.key() == key)
            .filter_map(Metadata::as_entry)
            .find_map(|entry| entry.value().ok())
    }
}

impl PartialEq for MetadataSet {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for MetadataSet {}

impl<'a> IntoIterator for &'a MetadataSet {
    type Item = &'a Metadata;
    type IntoIter = std::slice::Iter<'a, Metadata>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<M: Into<Metadata>> FromIterator<M> for MetadataSet {
    fn from_iter<I: IntoIterator<Item = M>>(iter: I) -> Self {
        let mut set = MetadataSet::new();
        for metadata in iter {
            set.insert(metadata);
        }
        set
    }
}

impl<M: Into<Metadata>> Extend<M> for MetadataSet {
    fn extend<I: IntoIterator<Item = M>>(&mut self, iter: I) {
        for metadata in iter {
            self.insert(metadata);
        }
    }
}

impl Serialize for MetadataSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.values.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MetadataSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Vec::<Metadata>::deserialize(deserializer)?;
        Ok(values.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_value_is_an_error() {
        let entry = MetadataEntry::unset("TitleDocMain");

        assert!(!entry.has_value());
        assert_eq!(
            entry.value(),
            Err(MetadataError::UnsetValue("TitleDocMain".to_string()))
        );
    }

    #[test]
    fn absent_value_rejected() {
        let mut entry = MetadataEntry::unset("TitleDocMain");

        assert!(entry.try_set_value(None).is_err());
        assert!(entry.try_set_value(Some("Faust".to_string())).is_ok());
        assert_eq!(entry.value(), Ok("Faust"));
    }

    #[test]
    fn empty_string_is_a_value() {
        let entry = MetadataEntry::new("Note", "");
        assert_eq!(entry.value(), Ok(""));
    }

    #[test]
    fn entry_equality_defaults_domain() {
        let implicit = MetadataEntry::new("Title", "A");
        let explicit = MetadataEntry::new("Title", "A").with_domain(MdSec::DmdSec);
        let rights = MetadataEntry::new("Title", "A").with_domain(MdSec::RightsMd);

        assert_eq!(implicit, explicit);
        assert_ne!(implicit, rights);
    }

    #[test]
    fn entry_equality_compares_value() {
        assert_ne!(MetadataEntry::new("Title", "A"), MetadataEntry::new("Title", "B"));
        assert_ne!(MetadataEntry::new("Title", "A"), MetadataEntry::unset("Title"));
    }

    #[test]
    fn identical_entries_collapse() {
        let mut set = MetadataSet::new();

        assert!(set.insert(MetadataEntry::new("Title", "A")));
        assert!(!set.insert(MetadataEntry::new("Title", "A")));
        assert!(set.insert(MetadataEntry::new("Title", "B")));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn groups_are_identified_by_key_and_domain() {
        let alice = MetadataGroup::new("Person").with(MetadataEntry::new("Name", "Alice"));
        let bob = MetadataGroup::new("Person").with(MetadataEntry::new("Name", "Bob"));
        let rights = MetadataGroup::new("Person")
            .with_domain(MdSec::RightsMd)
            .with(MetadataEntry::new("Name", "Bob"));

        let mut set = MetadataSet::new();
        assert!(set.insert(alice));
        assert!(!set.insert(bob));
        assert!(set.insert(rights));

        assert_eq!(set.len(), 2);
        let first = set.iter().next().and_then(Metadata::as_group).unwrap();
        assert_eq!(first.group().first_value("Name"), Some("Alice"));
    }

    #[test]
    fn lookups_survive_removal() {
        let mut set: MetadataSet = (0..500)
            .map(|i| MetadataEntry::new("Subject", i.to_string()))
            .collect();
        assert_eq!(set.len(), 500);

        let first = Metadata::from(MetadataEntry::new("Subject", "0"));
        let last = Metadata::from(MetadataEntry::new("Subject", "499"));
        assert!(set.remove(&first));
        assert!(!set.contains(&first));
        assert!(set.contains(&last));
        assert!(!set.insert(last));

        assert_eq!(set.remove_key("Subject"), 499);
        assert!(set.is_empty());
        assert!(set.insert(first));
    }

    #[test]
    fn group_keeps_member_order() {
        let group = MetadataGroup::new("Person")
            .with(MetadataEntry::new("LastName", "Goethe"))
            .with(MetadataEntry::new("FirstName", "Johann Wolfgang"));

        let keys: Vec<_> = group.group().iter().map(Metadata::key).collect();
        assert_eq!(keys, vec!["LastName", "FirstName"]);
    }

    #[test]
    fn remove_by_key() {
        let mut set: MetadataSet = [
            MetadataEntry::new("Title", "A"),
            MetadataEntry::new("Title", "B"),
            MetadataEntry::new("Year", "1808"),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.remove_key("Title"), 2);
        assert_eq!(set.len(), 1);
        assert_eq!(set.first_value("Year"), Some("1808"));
    }

    #[test]
    fn deserialization_collapses_duplicates() {
        let json = r#"[
            {"kind": "entry", "key": "Title", "value": "A"},
            {"kind": "entry", "key": "Title", "value": "A"},
            {"kind": "group", "key": "Person", "group": [
                {"kind": "entry", "key": "Name", "value": "Alice"}
            ]}
        ]"#;

        let set: MetadataSet = serde_json::from_str(json).unwrap();

        assert_eq!(set.len(), 2);
        assert!(set.iter().any(Metadata::is_group));
    }

    #[test]
    fn serde_roundtrip_keeps_domain() {
        let entry: Metadata = MetadataEntry::new("owner", "Library").with_domain(MdSec::RightsMd).into();
        let json = serde_json::to_string(&entry).unwrap();

        assert!(json.contains("RIGHTS_MD"));
        let parsed: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn display_formats() {
        let entry = MetadataEntry::new("Title", "Faust").with_domain(MdSec::DmdSec);
        assert_eq!(entry.to_string(), "(DMD_SEC) Title: \"Faust\"");
        assert_eq!(MetadataEntry::new("Title", "Faust").to_string(), "Title: \"Faust\"");
    }
}
