//! Views over a loaded [`Ruleset`]

use std::collections::BTreeMap;

use super::document::{resolve_label, DivisionDefinition, KeyDefinition, Rule, Ruleset, Unspecified};
use super::view::{
    is_structure_field, ComplexMetadataView, FieldView, LanguagePreferences, MetadataView,
    MetadataViewWithValues, SimpleMetadataView, StructuralElementView,
};
use crate::domain::Metadata;

/// The keys and rules of one nesting level
#[derive(Debug, Clone, Copy)]
struct Level<'r> {
    keys: &'r [KeyDefinition],
    rules: &'r [Rule],
    unspecified: Unspecified,
}

/// A level without keys or rules
const OPEN_LEVEL: Level<'static> = Level {
    keys: &[],
    rules: &[],
    unspecified: Unspecified::Unrestricted,
};

impl<'r> Level<'r> {
    fn key(&self, id: &str) -> Option<&'r KeyDefinition> {
        self.keys.iter().find(|key| key.id == id)
    }

    /// Ruled fields first, in rule order, then the remaining keys if the
    /// level is unrestricted
    fn fields(&self) -> Vec<(&'r KeyDefinition, usize, usize)> {
        let mut fields: Vec<_> = self
            .rules
            .iter()
            .filter_map(|rule| {
                self.key(&rule.key)
                    .map(|key| (key, rule.min, rule.max_occurs()))
            })
            .collect();

        if self.unspecified == Unspecified::Unrestricted {
            for key in self.keys {
                if !self.rules.iter().any(|rule| rule.key == key.id) {
                    fields.push((key, 0, usize::MAX));
                }
            }
        }
        fields
    }

    fn allowed(&self, languages: &LanguagePreferences) -> Vec<MetadataView<'r>> {
        self.fields()
            .into_iter()
            .map(|(key, min, max)| KeyView::field(key, min, max, languages))
            .collect()
    }

    fn rows<'m>(
        &self,
        languages: &LanguagePreferences,
        present: &[&'m Metadata],
        excluded: &[&str],
    ) -> Vec<MetadataViewWithValues<'r, 'm>> {
        let mut claimed = vec![false; present.len()];
        let mut rows = Vec::new();

        for (key, min, max) in self.fields() {
            let mut values = Vec::new();
            for (index, metadata) in present.iter().enumerate() {
                if metadata.key() == key.id {
                    claimed[index] = true;
                    values.push(*metadata);
                }
            }
            if excluded.contains(&key.id.as_str()) {
                continue;
            }

            if values.is_empty() {
                if min > 0 {
                    rows.push(MetadataViewWithValues {
                        view: Some(KeyView::field(key, min, max, languages)),
                        values,
                    });
                }
            } else {
                for value in values {
                    rows.push(MetadataViewWithValues {
                        view: Some(KeyView::field(key, min, max, languages)),
                        values: vec![value],
                    });
                }
            }
        }

        for (index, metadata) in present.iter().enumerate() {
            if claimed[index] || excluded.contains(&metadata.key()) {
                continue;
            }
            let max = if self.unspecified == Unspecified::Forbidden
                && !is_structure_field(metadata.key())
            {
                0
            } else {
                usize::MAX
            };
            let view = match self.key(metadata.key()) {
                Some(key) => KeyView::field(key, 0, max, languages),
                None => UndefinedField::field(metadata, max),
            };
            rows.push(MetadataViewWithValues {
                view: Some(view),
                values: vec![*metadata],
            });
        }

        rows
    }
}

/// A field declared in the ruleset
struct KeyView<'r> {
    key: &'r KeyDefinition,
    label: String,
    min: usize,
    max: usize,
    languages: LanguagePreferences,
}

impl<'r> KeyView<'r> {
    fn field(
        key: &'r KeyDefinition,
        min: usize,
        max: usize,
        languages: &LanguagePreferences,
    ) -> MetadataView<'r> {
        let view = KeyView {
            key,
            label: resolve_label(&key.id, key.label.as_deref(), &key.labels, languages),
            min,
            max,
            languages: languages.clone(),
        };
        if key.is_complex() {
            MetadataView::Complex(Box::new(view))
        } else {
            MetadataView::Simple(Box::new(view))
        }
    }

    fn level(&self) -> Level<'r> {
        Level {
            keys: &self.key.keys,
            rules: &self.key.rules,
            unspecified: self.key.unspecified,
        }
    }
}

impl FieldView for KeyView<'_> {
    fn id(&self) -> &str {
        &self.key.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn min_occurs(&self) -> usize {
        self.min
    }

    fn max_occurs(&self) -> usize {
        self.max
    }
}

impl SimpleMetadataView for KeyView<'_> {
    fn is_valid(&self, value: &str) -> bool {
        self.key.accepts(value)
    }
}

impl ComplexMetadataView for KeyView<'_> {
    fn allowed_metadata(&self) -> Vec<MetadataView<'_>> {
        self.level().allowed(&self.languages)
    }

    fn sorted_visible_metadata<'m>(
        &self,
        present: &[&'m Metadata],
        excluded: &[&str],
    ) -> Vec<MetadataViewWithValues<'_, 'm>> {
        self.level().rows(&self.languages, present, excluded)
    }
}

/// Stand-in for metadata whose key the ruleset does not know
///
/// Accepts any value; a group's members are again undefined fields.
struct UndefinedField {
    id: String,
    max: usize,
}

impl UndefinedField {
    fn field(metadata: &Metadata, max: usize) -> MetadataView<'static> {
        let view = UndefinedField {
            id: metadata.key().to_string(),
            max,
        };
        if metadata.is_group() {
            MetadataView::Complex(Box::new(view))
        } else {
            MetadataView::Simple(Box::new(view))
        }
    }
}

impl FieldView for UndefinedField {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.id
    }

    fn min_occurs(&self) -> usize {
        0
    }

    fn max_occurs(&self) -> usize {
        self.max
    }
}

impl SimpleMetadataView for UndefinedField {
    fn is_valid(&self, _value: &str) -> bool {
        true
    }
}

impl ComplexMetadataView for UndefinedField {
    fn allowed_metadata(&self) -> Vec<MetadataView<'_>> {
        Vec::new()
    }

    fn sorted_visible_metadata<'m>(
        &self,
        present: &[&'m Metadata],
        excluded: &[&str],
    ) -> Vec<MetadataViewWithValues<'_, 'm>> {
        OPEN_LEVEL.rows(&LanguagePreferences::new(), present, excluded)
    }
}

/// View of one structural type
///
/// Types the ruleset does not declare get an unrestricted view that allows
/// every declared division below it.
pub(crate) struct DivisionView<'r> {
    id: String,
    label: String,
    level: Level<'r>,
    children: BTreeMap<String, String>,
    languages: LanguagePreferences,
}

impl<'r> DivisionView<'r> {
    pub(crate) fn new(
        ruleset: &'r Ruleset,
        division_type: Option<&str>,
        definition: Option<&'r DivisionDefinition>,
        languages: &LanguagePreferences,
    ) -> Self {
        let label_of = |division: &DivisionDefinition| {
            resolve_label(
                &division.id,
                division.label.as_deref(),
                &division.labels,
                languages,
            )
        };

        match definition {
            Some(division) => Self {
                id: division.id.clone(),
                label: label_of(division),
                level: Level {
                    keys: ruleset.keys(),
                    rules: &division.rules,
                    unspecified: division.unspecified,
                },
                children: division
                    .children
                    .iter()
                    .filter_map(|child| ruleset.division(child))
                    .map(|child| (child.id.clone(), label_of(child)))
                    .collect(),
                languages: languages.clone(),
            },
            None => Self {
                id: division_type.unwrap_or_default().to_string(),
                label: division_type.unwrap_or_default().to_string(),
                level: Level {
                    keys: ruleset.keys(),
                    rules: &[],
                    unspecified: Unspecified::Unrestricted,
                },
                children: ruleset
                    .divisions()
                    .iter()
                    .map(|division| (division.id.clone(), label_of(division)))
                    .collect(),
                languages: languages.clone(),
            },
        }
    }
}

impl FieldView for DivisionView<'_> {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn min_occurs(&self) -> usize {
        1
    }

    fn max_occurs(&self) -> usize {
        1
    }
}

impl ComplexMetadataView for DivisionView<'_> {
    fn allowed_metadata(&self) -> Vec<MetadataView<'_>> {
        self.level.allowed(&self.languages)
    }

    fn sorted_visible_metadata<'m>(
        &self,
        present: &[&'m Metadata],
        excluded: &[&str],
    ) -> Vec<MetadataViewWithValues<'_, 'm>> {
        self.level.rows(&self.languages, present, excluded)
    }
}

impl StructuralElementView for DivisionView<'_> {
    fn allowed_sub_structural_elements(&self) -> BTreeMap<String, String> {
        self.children.clone()
    }

    fn as_complex(&self) -> &dyn ComplexMetadataView {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MetadataEntry, MetadataGroup};
    use crate::ruleset::RulesetView;

    const RULES: &str = r#"
divisions:
  - id: monograph
    label: Monograph
    labels: { de: Monographie }
    children: [chapter]
    rules:
      - { key: TitleDocMain, min: 1, max: 1 }
      - { key: Person, max: 3 }
  - id: chapter
    unspecified: forbidden
    rules:
      - { key: TitleDocMain, max: 1 }
keys:
  - id: TitleDocMain
    label: Main title
    labels: { de: Haupttitel }
  - id: PublicationYear
    datatype: integer
  - id: Person
    keys:
      - { id: LastName }
      - { id: Role, options: [aut, edt] }
    rules:
      - { key: LastName, min: 1, max: 1 }
"#;

    fn ruleset() -> Ruleset {
        Ruleset::from_yaml(RULES).unwrap()
    }

    fn ids(rows: &[MetadataViewWithValues<'_, '_>]) -> Vec<String> {
        rows.iter()
            .map(|row| row.view.as_ref().unwrap().id().to_string())
            .collect()
    }

    #[test]
    fn rows_follow_rule_order() {
        let ruleset = ruleset();
        let view = ruleset.structural_element_view(Some("monograph"), &LanguagePreferences::new());

        let year = Metadata::from(MetadataEntry::new("PublicationYear", "1808"));
        let title = Metadata::from(MetadataEntry::new("TitleDocMain", "Faust"));
        let present = vec![&year, &title];

        let rows = view.sorted_visible_metadata(&present, &[]);
        assert_eq!(ids(&rows), vec!["TitleDocMain", "PublicationYear"]);
    }

    #[test]
    fn missing_mandatory_field_gets_empty_row() {
        let ruleset = ruleset();
        let view = ruleset.structural_element_view(Some("monograph"), &LanguagePreferences::new());

        let rows = view.sorted_visible_metadata(&[], &[]);

        assert_eq!(ids(&rows), vec!["TitleDocMain"]);
        assert!(rows[0].values.is_empty());
        assert_eq!(rows[0].view.as_ref().unwrap().min_occurs(), 1);
    }

    #[test]
    fn one_row_per_value() {
        let ruleset = ruleset();
        let view = ruleset.structural_element_view(Some("monograph"), &LanguagePreferences::new());

        let first = Metadata::from(MetadataEntry::new("TitleDocMain", "Faust"));
        let second = Metadata::from(MetadataEntry::new("TitleDocMain", "Faust II"));
        let rows = view.sorted_visible_metadata(&[&first, &second], &[]);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.values.len() == 1));
    }

    #[test]
    fn excluded_fields_are_skipped() {
        let ruleset = ruleset();
        let view = ruleset.structural_element_view(Some("monograph"), &LanguagePreferences::new());

        let rows = view.sorted_visible_metadata(&[], &["TitleDocMain"]);
        assert!(rows.is_empty());
    }

    #[test]
    fn complex_keys_yield_complex_views() {
        let ruleset = ruleset();
        let view = ruleset.structural_element_view(Some("monograph"), &LanguagePreferences::new());

        let person = Metadata::from(MetadataGroup::new("Person"));
        let rows = view.sorted_visible_metadata(&[&person], &[]);

        let person_row = rows
            .iter()
            .find(|row| row.view.as_ref().unwrap().id() == "Person")
            .unwrap();
        assert!(person_row.view.as_ref().unwrap().is_complex());
        assert_eq!(person_row.view.as_ref().unwrap().max_occurs(), 3);
    }

    #[test]
    fn nested_rules_apply_inside_groups() {
        let ruleset = ruleset();
        let view = ruleset.structural_element_view(Some("monograph"), &LanguagePreferences::new());

        let person = Metadata::from(MetadataGroup::new("Person"));
        let rows = view.sorted_visible_metadata(&[&person], &[]);
        let person_view = rows
            .into_iter()
            .find_map(|row| match row.view {
                Some(MetadataView::Complex(view)) if view.id() == "Person" => Some(view),
                _ => None,
            })
            .unwrap();

        let role = Metadata::from(MetadataEntry::new("Role", "ill"));
        let nested = person_view.sorted_visible_metadata(&[&role], &[]);
        assert_eq!(ids(&nested), vec!["LastName", "Role"]);

        match &nested[1].view {
            Some(MetadataView::Simple(field)) => assert!(!field.is_valid("ill")),
            other => panic!("expected simple view, got {:?}", other),
        }
    }

    #[test]
    fn unknown_keys_are_unbounded_by_default() {
        let ruleset = ruleset();
        let view = ruleset.structural_element_view(Some("monograph"), &LanguagePreferences::new());

        let shelf = Metadata::from(MetadataEntry::new("Shelfmark", "A 12"));
        let rows = view.sorted_visible_metadata(&[&shelf], &[]);
        let field = rows[1].view.as_ref().unwrap();

        assert_eq!(field.id(), "Shelfmark");
        assert_eq!(field.max_occurs(), usize::MAX);
    }

    #[test]
    fn forbidden_level_rejects_unknown_keys() {
        let ruleset = ruleset();
        let view = ruleset.structural_element_view(Some("chapter"), &LanguagePreferences::new());

        let year = Metadata::from(MetadataEntry::new("PublicationYear", "1808"));
        let label = Metadata::from(MetadataEntry::new("LABEL", "Prologue"));
        let rows = view.sorted_visible_metadata(&[&year, &label], &[]);

        assert_eq!(ids(&rows), vec!["PublicationYear", "LABEL"]);
        assert_eq!(rows[0].view.as_ref().unwrap().max_occurs(), 0);
        assert_eq!(rows[1].view.as_ref().unwrap().max_occurs(), usize::MAX);
    }

    #[test]
    fn unknown_division_allows_everything() {
        let ruleset = ruleset();
        let view = ruleset.structural_element_view(Some("map"), &LanguagePreferences::new());

        let children: Vec<_> = view.allowed_sub_structural_elements().into_keys().collect();
        assert_eq!(children, vec!["chapter", "monograph"]);
        assert!(view.sorted_visible_metadata(&[], &[]).is_empty());
    }

    #[test]
    fn labels_follow_language() {
        let ruleset = ruleset();
        let german = LanguagePreferences::parse("de");
        let view = ruleset.structural_element_view(Some("monograph"), &german);

        assert_eq!(view.label(), "Monographie");
        let fields = view.allowed_metadata();
        assert_eq!(fields[0].label(), "Haupttitel");
        assert_eq!(fields.len(), 3);
    }
}
