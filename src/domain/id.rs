//! Division identifiers
//!
//! ID Format:
//! - Logical structures: `LOG_{7-char-hash}` (e.g., `LOG_7f2b4c1`) when generated
//! - Physical structures: `PHYS_{7-char-hash}` (e.g., `PHYS_9d3e5f2`) when generated
//! - Any XML-ID compatible name when read from a document (e.g., `PHYS_0001`)
//!
//! Views refer to physical structures by this ID, never by pointer, so the
//! two structure trees can be edited independently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid division ID: expected a letter or '_' followed by letters, digits, '_', '-' or '.', got '{0}'")]
    InvalidDivisionId(String),
}

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generates a 7-character hash from prefix, timestamp and a process-wide sequence
fn generate_hash(prefix: &str, timestamp: DateTime<Utc>) -> String {
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let input = format!(
        "{}{}{}",
        prefix,
        timestamp.timestamp_nanos_opt().unwrap_or(0),
        sequence
    );
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..7].to_string()
}

fn is_valid_id(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Identifier of a logical or physical structure
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DivisionId(String);

impl DivisionId {
    /// Prefix for generated logical structure IDs
    pub const LOGICAL_PREFIX: &'static str = "LOG";

    /// Prefix for generated physical structure IDs
    pub const PHYSICAL_PREFIX: &'static str = "PHYS";

    /// Generates a fresh ID with the given prefix
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{}_{}", prefix, generate_hash(prefix, Utc::now())))
    }

    /// Generates a fresh logical structure ID
    pub fn generate_logical() -> Self {
        Self::generate(Self::LOGICAL_PREFIX)
    }

    /// Generates a fresh physical structure ID
    pub fn generate_physical() -> Self {
        Self::generate(Self::PHYSICAL_PREFIX)
    }

    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DivisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DivisionId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !is_valid_id(s) {
            return Err(IdError::InvalidDivisionId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for DivisionId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DivisionId> for String {
    fn from(id: DivisionId) -> Self {
        id.0
    }
}
