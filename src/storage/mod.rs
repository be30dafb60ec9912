//! # Storage Layer
//!
//! Collaborators that bring documents and settings into memory. Validation
//! itself performs no I/O; the [`crate::validation::MetadataValidator`]
//! entry point wires these in.
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Documents | JSON | any `file://` URI or path |
//! | Rulesets | YAML | any path, see [`crate::ruleset`] |
//! | Config | TOML | `.workpiece/config.toml` |
//!
//! ## Project Structure
//!
//! ```text
//! .workpiece/
//! └── config.toml           # Project configuration
//! rulesets/                 # Rulesets of the project
//! ```

mod config;
mod document;
mod file;
mod project;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, PROJECT_DIR};
pub use document::{DocumentFormat, FormatError, JsonDocumentFormat};
pub use file::{uri_to_path, FileAccess, LocalFileAccess};
pub use project::{Project, ProjectError};
