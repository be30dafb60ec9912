//! Rulesets
//!
//! The validator consumes rulesets through the capability traits in
//! [`view`]. A YAML reference implementation is provided by [`Ruleset`].

mod document;
mod fields;
mod view;

use std::path::PathBuf;
use thiserror::Error;

pub use document::{
    Datatype, DivisionDefinition, KeyDefinition, Rule, Ruleset, Unspecified, YamlRulesetLoader,
};
pub use view::{
    is_structure_field, ComplexMetadataView, FieldView, LanguagePreferences, LanguageRange,
    MetadataView, MetadataViewWithValues, RulesetLoader, RulesetView, SimpleMetadataView,
    StructuralElementView, LABEL_KEY, ORDERLABEL_KEY,
};

/// Errors raised while loading a ruleset
#[derive(Debug, Error)]
pub enum RulesetError {
    #[error("Failed to read ruleset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse ruleset: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Duplicate {kind} '{id}' in ruleset")]
    Duplicate { kind: &'static str, id: String },

    #[error("Rule in '{scope}' refers to unknown key '{key}'")]
    UnknownKey { scope: String, key: String },

    #[error("Division '{division}' allows unknown child type '{child}'")]
    UnknownChild { division: String, child: String },

    #[error("Rule for '{key}' in '{scope}' requires {min} but allows at most {max}")]
    InvalidOccurs {
        scope: String,
        key: String,
        min: usize,
        max: usize,
    },

    #[error("Invalid pattern for key '{key}': {source}")]
    InvalidPattern {
        key: String,
        #[source]
        source: regex::Error,
    },
}
