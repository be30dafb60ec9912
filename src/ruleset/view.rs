//! Ruleset view capability
//!
//! The validator never looks at a ruleset directly. It asks a [`RulesetView`]
//! for the view of a structural type and walks the fields that view reports.
//! Fields are either simple (a single value with a validity check) or
//! complex (a group of further fields).

use std::collections::BTreeMap;
use std::path::Path;

use super::RulesetError;
use crate::domain::Metadata;

/// Key under which a structure's own label takes part in validation
pub const LABEL_KEY: &str = "LABEL";

/// Key under which a structure's order label takes part in validation
pub const ORDERLABEL_KEY: &str = "ORDERLABEL";

/// Returns true for the keys of structure fields rather than stored metadata
pub fn is_structure_field(key: &str) -> bool {
    key == LABEL_KEY || key == ORDERLABEL_KEY
}

/// Common description of a rule-defined metadata field
pub trait FieldView: Send + Sync {
    /// Key the field matches
    fn id(&self) -> &str;

    /// Display label in the preferred language
    fn label(&self) -> &str;

    fn min_occurs(&self) -> usize;

    /// Upper bound; `usize::MAX` when unbounded
    fn max_occurs(&self) -> usize;
}

/// A field holding a single value
pub trait SimpleMetadataView: FieldView {
    fn is_valid(&self, value: &str) -> bool;
}

/// A field holding a group of further fields
pub trait ComplexMetadataView: FieldView {
    /// Every field declared on this level, in declaration order
    fn allowed_metadata(&self) -> Vec<MetadataView<'_>>;

    /// Assigns the present metadata to the fields of this view
    ///
    /// Rows come in field declaration order, not in the order the metadata
    /// occurs. A field may be reported in several rows (one per value, as
    /// for display); callers that count values merge rows of the same field.
    /// Fields whose key is in `excluded` are left out.
    fn sorted_visible_metadata<'m>(
        &self,
        present: &[&'m Metadata],
        excluded: &[&str],
    ) -> Vec<MetadataViewWithValues<'_, 'm>>;
}

/// The view of a structural type, itself the outermost complex field
pub trait StructuralElementView: ComplexMetadataView {
    /// Child types allowed below this type, mapped to their labels
    fn allowed_sub_structural_elements(&self) -> BTreeMap<String, String>;

    fn as_complex(&self) -> &dyn ComplexMetadataView;
}

/// A field of either shape
pub enum MetadataView<'v> {
    Simple(Box<dyn SimpleMetadataView + 'v>),
    Complex(Box<dyn ComplexMetadataView + 'v>),
}

impl MetadataView<'_> {
    pub fn id(&self) -> &str {
        match self {
            MetadataView::Simple(view) => view.id(),
            MetadataView::Complex(view) => view.id(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            MetadataView::Simple(view) => view.label(),
            MetadataView::Complex(view) => view.label(),
        }
    }

    pub fn min_occurs(&self) -> usize {
        match self {
            MetadataView::Simple(view) => view.min_occurs(),
            MetadataView::Complex(view) => view.min_occurs(),
        }
    }

    pub fn max_occurs(&self) -> usize {
        match self {
            MetadataView::Simple(view) => view.max_occurs(),
            MetadataView::Complex(view) => view.max_occurs(),
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, MetadataView::Complex(_))
    }

    /// Short name of the shape, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            MetadataView::Simple(_) => "simple field",
            MetadataView::Complex(_) => "complex field",
        }
    }
}

impl std::fmt::Debug for MetadataView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(self.kind())
            .field("id", &self.id())
            .field("min_occurs", &self.min_occurs())
            .field("max_occurs", &self.max_occurs())
            .finish()
    }
}

/// One row of [`ComplexMetadataView::sorted_visible_metadata`]
#[derive(Debug)]
pub struct MetadataViewWithValues<'v, 'm> {
    /// The field, if the row belongs to one
    pub view: Option<MetadataView<'v>>,

    /// Present metadata matched to the field
    pub values: Vec<&'m Metadata>,
}

/// Access to the rules of one loaded ruleset
pub trait RulesetView: Send + Sync {
    /// Returns the view for a structural type; `None` is the untyped case
    fn structural_element_view<'r>(
        &'r self,
        division_type: Option<&str>,
        languages: &LanguagePreferences,
    ) -> Box<dyn StructuralElementView + 'r>;
}

/// Loads a ruleset from a file
pub trait RulesetLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Box<dyn RulesetView>, RulesetError>;
}

/// A weighted language tag
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageRange {
    pub tag: String,
    pub weight: f32,
}

/// Ordered language preferences, most preferred first
///
/// Parsed from an `Accept-Language`-style list such as `de-DE, en;q=0.5`.
/// Only labels depend on it; validation outcomes never do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguagePreferences(Vec<LanguageRange>);

impl LanguagePreferences {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parses a comma separated list; malformed weights count as 1.0
    pub fn parse(list: &str) -> Self {
        let mut ranges: Vec<LanguageRange> = list
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.split(';');
                let tag = pieces.next()?.trim().to_ascii_lowercase();
                if tag.is_empty() {
                    return None;
                }
                let weight = pieces
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some(LanguageRange { tag, weight })
            })
            .filter(|range| range.weight > 0.0)
            .collect();
        ranges.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        Self(ranges)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageRange> {
        self.0.iter()
    }

    /// Picks the best translation from a language-keyed map
    ///
    /// A preference `de-DE` also accepts a `de` translation.
    pub fn select<'a>(&self, translations: &'a BTreeMap<String, String>) -> Option<&'a str> {
        for range in &self.0 {
            if range.tag == "*" {
                return translations.values().next().map(String::as_str);
            }
            if let Some(label) = translations.get(&range.tag) {
                return Some(label);
            }
            let primary = range.tag.split('-').next().unwrap_or(&range.tag);
            if let Some(label) = translations.get(primary) {
                return Some(label);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> BTreeMap<String, String> {
        [("de", "Titel"), ("en", "Title")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parse_sorts_by_weight() {
        let prefs = LanguagePreferences::parse("en;q=0.5, de-DE, fr;q=0.8");
        let tags: Vec<_> = prefs.iter().map(|r| r.tag.as_str()).collect();

        assert_eq!(tags, vec!["de-de", "fr", "en"]);
    }

    #[test]
    fn parse_skips_empty_and_zero_weight() {
        let prefs = LanguagePreferences::parse(" , en;q=0, de");
        let tags: Vec<_> = prefs.iter().map(|r| r.tag.as_str()).collect();

        assert_eq!(tags, vec!["de"]);
    }

    #[test]
    fn select_falls_back_to_primary_subtag() {
        let prefs = LanguagePreferences::parse("de-AT, en");
        assert_eq!(prefs.select(&labels()), Some("Titel"));
    }

    #[test]
    fn select_in_preference_order() {
        let prefs = LanguagePreferences::parse("fr, en;q=0.9, de;q=0.1");
        assert_eq!(prefs.select(&labels()), Some("Title"));
    }

    #[test]
    fn select_without_match() {
        assert_eq!(LanguagePreferences::parse("fr").select(&labels()), None);
        assert_eq!(LanguagePreferences::new().select(&labels()), None);
    }
}
