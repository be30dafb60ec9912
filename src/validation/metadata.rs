//! Checks of the metadata on a single structure against its ruleset view
//!
//! Both checks walk the rows a [`ComplexMetadataView`] reports for the
//! present metadata and descend into groups matched by complex fields. The
//! location of a finding is the structure followed by the labels of the
//! enclosing fields, joined by `" - "`.

use super::error::ValidationError;
use super::messages::{MessageKey, Translations};
use super::result::ValidationResult;
use crate::domain::{Metadata, MetadataEntry, MetadataSet};
use crate::ruleset::{
    ComplexMetadataView, LanguagePreferences, MetadataView, MetadataViewWithValues, RulesetView,
    LABEL_KEY, ORDERLABEL_KEY,
};

/// Metadata as seen by validation: the stored set plus the structure's
/// label and order label as entries
pub(crate) fn metadata_for_validation(
    metadata: &MetadataSet,
    label: Option<&str>,
    orderlabel: Option<&str>,
) -> MetadataSet {
    let mut present = metadata.clone();
    if let Some(label) = label {
        present.insert(MetadataEntry::new(LABEL_KEY, label));
    }
    if let Some(orderlabel) = orderlabel {
        present.insert(MetadataEntry::new(ORDERLABEL_KEY, orderlabel));
    }
    present
}

/// Runs both metadata checks for one structure
pub(crate) fn check_metadata_rules(
    element: &str,
    division_type: Option<&str>,
    metadata: &MetadataSet,
    ruleset: &dyn RulesetView,
    languages: &LanguagePreferences,
    translations: &Translations,
) -> Result<ValidationResult, ValidationError> {
    let view = ruleset.structural_element_view(division_type, languages);
    let present: Vec<&Metadata> = metadata.iter().collect();
    let location = format!("{}: ", element);

    let quantities = check_quantities(&present, view.as_complex(), &location, translations)?;
    let details = check_details(&present, view.as_complex(), &location, translations)?;
    Ok(quantities.merge(details))
}

/// Merges rows of the same field into one counted collection
///
/// Views report one row per value; counting needs all values of a field
/// together. Rows without a field are dropped. The first row of a field
/// decides its position.
fn squash<'v, 'm>(
    rows: Vec<MetadataViewWithValues<'v, 'm>>,
) -> Vec<(MetadataView<'v>, Vec<&'m Metadata>)> {
    let mut squashed: Vec<(MetadataView<'v>, Vec<&'m Metadata>)> = Vec::new();
    for row in rows {
        let Some(view) = row.view else {
            continue;
        };
        match squashed.iter_mut().find(|(seen, _)| seen.id() == view.id()) {
            Some((_, values)) => values.extend(row.values),
            None => squashed.push((view, row.values)),
        }
    }
    squashed
}

fn shape_mismatch(field: &MetadataView<'_>, metadata: &Metadata) -> ValidationError {
    ValidationError::ShapeMismatch {
        key: field.id().to_string(),
        expected: field.kind(),
        actual: metadata.kind(),
    }
}

fn members<'m>(
    metadata: &'m Metadata,
    field: &MetadataView<'_>,
) -> Result<Vec<&'m Metadata>, ValidationError> {
    match metadata {
        Metadata::Group(group) => Ok(group.group().iter().collect()),
        Metadata::Entry(_) => Err(shape_mismatch(field, metadata)),
    }
}

/// Checks that every field occurs as often as its rule demands
fn check_quantities(
    present: &[&Metadata],
    view: &dyn ComplexMetadataView,
    location: &str,
    translations: &Translations,
) -> Result<ValidationResult, ValidationError> {
    let mut result = ValidationResult::success();

    for (field, values) in squash(view.sorted_visible_metadata(present, &[])) {
        let min = field.min_occurs();
        let max = field.max_occurs();
        let count = values.len();
        let subject = format!("{}{}", location, field.label());

        let finding = if count == 0 && min == 1 && max == 1 {
            Some(translations.format(MessageKey::MandatoryElement, &[&subject]))
        } else if count < min {
            Some(translations.format(
                MessageKey::NotEnoughElements,
                &[&subject, &count.to_string(), &min.to_string()],
            ))
        } else if count > max {
            // Reports the minimum, as established messages expect
            Some(translations.format(
                MessageKey::NotOneElement,
                &[&subject, &count.to_string(), &min.to_string()],
            ))
        } else {
            None
        };
        if let Some(message) = finding {
            result = result.merge(ValidationResult::error(message));
        }

        if let MetadataView::Complex(complex) = &field {
            let nested_location = format!("{}{} - ", location, field.label());
            for metadata in &values {
                let nested = members(metadata, &field)?;
                result = result.merge(check_quantities(
                    &nested,
                    complex.as_ref(),
                    &nested_location,
                    translations,
                )?);
            }
        }
    }

    Ok(result)
}

/// Checks every value against the validity check of its field
fn check_details(
    present: &[&Metadata],
    view: &dyn ComplexMetadataView,
    location: &str,
    translations: &Translations,
) -> Result<ValidationResult, ValidationError> {
    let mut result = ValidationResult::success();

    for row in view.sorted_visible_metadata(present, &[]) {
        let Some(field) = row.view else {
            continue;
        };
        for metadata in row.values {
            match (&field, metadata) {
                (MetadataView::Simple(simple), Metadata::Entry(entry)) => {
                    let value = entry.value()?;
                    if !simple.is_valid(value) {
                        let subject = format!("{}{}", location, field.label());
                        result = result.merge(ValidationResult::error(
                            translations.format(MessageKey::InvalidData, &[value, &subject]),
                        ));
                    }
                }
                (MetadataView::Complex(complex), Metadata::Group(_)) => {
                    let nested_location = format!("{}{} - ", location, field.label());
                    let nested = members(metadata, &field)?;
                    result = result.merge(check_details(
                        &nested,
                        complex.as_ref(),
                        &nested_location,
                        translations,
                    )?);
                }
                _ => return Err(shape_mismatch(&field, metadata)),
            }
        }
    }

    Ok(result)
}
