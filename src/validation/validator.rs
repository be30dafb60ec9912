//! Validation entry points

use rayon::prelude::*;
use tracing::debug;

use super::error::ValidationError;
use super::messages::Translations;
use super::metadata::{check_metadata_rules, metadata_for_validation};
use super::result::ValidationResult;
use super::structure::{structures_without_media, unlinked_media};
use crate::domain::{Node, Workpiece};
use crate::ruleset::{LanguagePreferences, RulesetLoader, RulesetView, YamlRulesetLoader};
use crate::storage::{uri_to_path, DocumentFormat, FileAccess, JsonDocumentFormat, LocalFileAccess};

/// Validates a workpiece against a ruleset
///
/// Runs four independent checks and merges their results:
///
/// 1. typed logical leaves without media, and views on missing media
/// 2. media no logical structure refers to
/// 3. metadata quantities per structure
/// 4. metadata values per structure
///
/// The last two run for every logical and physical structure. The checks
/// run in parallel; the outcome does not depend on their order.
///
/// `languages` only affects labels in messages. A ruleset whose
/// simple/complex classification disagrees with the metadata present aborts
/// with [`ValidationError::ShapeMismatch`], a division ID used twice with
/// [`ValidationError::DuplicateId`].
pub fn validate(
    workpiece: &Workpiece,
    ruleset: &dyn RulesetView,
    languages: &LanguagePreferences,
    translations: &Translations,
) -> Result<ValidationResult, ValidationError> {
    if let Some(id) = workpiece.duplicate_id() {
        return Err(ValidationError::DuplicateId(id.clone()));
    }

    let logical = workpiece.all_logical_structures();
    let physical = workpiece.all_physical_structures();
    debug!(
        workpiece = workpiece.id.as_deref().unwrap_or("-"),
        logical = logical.len(),
        physical = physical.len(),
        "validating workpiece"
    );

    let ((without_media, unlinked), (logical_rules, physical_rules)) = rayon::join(
        || {
            rayon::join(
                || structures_without_media(workpiece, translations),
                || unlinked_media(workpiece, translations),
            )
        },
        || {
            rayon::join(
                || {
                    logical
                        .par_iter()
                        .map(|structure| {
                            let metadata = metadata_for_validation(
                                structure.metadata(),
                                structure.label(),
                                structure.orderlabel(),
                            );
                            check_metadata_rules(
                                &structure.to_string(),
                                structure.division_type(),
                                &metadata,
                                ruleset,
                                languages,
                                translations,
                            )
                        })
                        .try_reduce(ValidationResult::success, |a, b| Ok(a.merge(b)))
                },
                || {
                    physical
                        .par_iter()
                        .map(|structure| {
                            let metadata = metadata_for_validation(
                                structure.metadata(),
                                None,
                                structure.orderlabel(),
                            );
                            check_metadata_rules(
                                &structure.to_string(),
                                structure.division_type(),
                                &metadata,
                                ruleset,
                                languages,
                                translations,
                            )
                        })
                        .try_reduce(ValidationResult::success, |a, b| Ok(a.merge(b)))
                },
            )
        },
    );

    debug!(state = %without_media.state, "structures without media checked");
    debug!(state = %unlinked.state, "unlinked media checked");
    let logical_rules = logical_rules?;
    debug!(state = %logical_rules.state, "logical metadata checked");
    let physical_rules = physical_rules?;
    debug!(state = %physical_rules.state, "physical metadata checked");

    Ok(ValidationResult::merge_all([
        without_media,
        unlinked,
        logical_rules,
        physical_rules,
    ]))
}

/// Validates stored documents against stored rulesets
///
/// Reading, parsing and ruleset loading are delegated to the injected
/// collaborators.
pub struct MetadataValidator {
    files: Box<dyn FileAccess>,
    format: Box<dyn DocumentFormat>,
    rulesets: Box<dyn RulesetLoader>,
}

impl MetadataValidator {
    pub fn new(
        files: Box<dyn FileAccess>,
        format: Box<dyn DocumentFormat>,
        rulesets: Box<dyn RulesetLoader>,
    ) -> Self {
        Self {
            files,
            format,
            rulesets,
        }
    }

    /// Loads the document behind `uri`
    pub fn load_workpiece(&self, uri: &str) -> Result<Workpiece, ValidationError> {
        let bytes = self.files.read(uri).map_err(|source| ValidationError::Io {
            uri: uri.to_string(),
            source,
        })?;
        self.format
            .read(&bytes)
            .map_err(|source| ValidationError::Document {
                uri: uri.to_string(),
                source,
            })
    }

    /// Loads the ruleset behind `uri`
    pub fn load_ruleset(&self, uri: &str) -> Result<Box<dyn RulesetView>, ValidationError> {
        let path = uri_to_path(uri).map_err(|source| ValidationError::Io {
            uri: uri.to_string(),
            source,
        })?;
        Ok(self.rulesets.load(&path)?)
    }

    /// Reads a document and a ruleset, then validates
    pub fn validate(
        &self,
        document_uri: &str,
        ruleset_uri: &str,
        languages: &LanguagePreferences,
        translations: &Translations,
    ) -> Result<ValidationResult, ValidationError> {
        let workpiece = self.load_workpiece(document_uri)?;
        let ruleset = self.load_ruleset(ruleset_uri)?;
        validate(&workpiece, ruleset.as_ref(), languages, translations)
    }
}

impl Default for MetadataValidator {
    fn default() -> Self {
        Self::new(
            Box::new(LocalFileAccess),
            Box::new(JsonDocumentFormat),
            Box::new(YamlRulesetLoader),
        )
    }
}
