//! Workpiece - structure and metadata validation for digitized works
//!
//! A digitized work is described by two trees: the logical structure
//! (monograph, chapters, articles) and the physical structure (pages and
//! their files), linked by views. This crate models both trees, loads
//! rulesets describing the allowed structure and metadata, and validates a
//! work against them.

pub mod cli;
pub mod domain;
pub mod ruleset;
pub mod storage;
pub mod validation;

pub use domain::{LogicalStructure, Metadata, PhysicalStructure, Workpiece};
pub use validation::{validate, State, ValidationResult};
