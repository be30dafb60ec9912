//! Workpiece validation
//!
//! [`validate`] walks both structure trees of a [`Workpiece`](crate::domain::Workpiece)
//! and reports findings against a ruleset as a [`ValidationResult`]:
//!
//! | Finding | State |
//! |---------|-------|
//! | Typed logical leaf without views | `WARNING` |
//! | View on a physical structure that does not exist | `ERROR` |
//! | Media unit without any view on it | `WARNING` |
//! | Metadata missing, too rare or too frequent | `ERROR` |
//! | Metadata value rejected by its field | `ERROR` |
//!
//! Inconsistent rulesets and unreadable inputs are [`ValidationError`]s, not
//! findings.

mod error;
mod messages;
mod metadata;
mod result;
mod structure;
mod validator;

pub use error::ValidationError;
pub use messages::{format_message, MessageKey, Translations};
pub use result::{State, ValidationResult};
pub use validator::{validate, MetadataValidator};
