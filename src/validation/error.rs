use thiserror::Error;

use crate::domain::{DivisionId, MetadataError};
use crate::ruleset::RulesetError;
use crate::storage::FormatError;

/// Failures that stop a validation from completing
///
/// These are never findings. A finding ends up in a
/// [`ValidationResult`](super::ValidationResult); an error means there is no
/// result at all.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The ruleset classifies a field as simple or complex, but the metadata
    /// under that key has the other shape
    #[error("Ruleset declares '{key}' as a {expected}, but the metadata is a {actual}")]
    ShapeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error(transparent)]
    UnsetValue(#[from] MetadataError),

    /// Two structures share an ID, so views cannot tell them apart
    #[error("Division ID '{0}' is used more than once")]
    DuplicateId(DivisionId),

    #[error("Failed to read {uri}: {source}")]
    Io {
        uri: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load document {uri}: {source}")]
    Document {
        uri: String,
        #[source]
        source: FormatError,
    },

    #[error(transparent)]
    Ruleset(#[from] RulesetError),
}
