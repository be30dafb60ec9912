//! Document formats
//!
//! A [`DocumentFormat`] turns stored bytes into a [`Workpiece`] and back.
//! JSON is the reference format; it mirrors the serde layout of the domain
//! types:
//!
//! ```json
//! {
//!   "id": "ppn123",
//!   "logical_root": {
//!     "id": "LOG_0001", "type": "monograph",
//!     "metadata": [{ "kind": "entry", "key": "TitleDocMain", "value": "Faust" }],
//!     "children": [{ "id": "LOG_0002", "type": "chapter", "views": [{ "physical": "PHYS_0001" }] }]
//!   },
//!   "physical_root": {
//!     "id": "PHYS_0000",
//!     "children": [{ "id": "PHYS_0001", "type": "page", "order": 1, "orderlabel": "I" }]
//!   }
//! }
//! ```

use thiserror::Error;

use crate::domain::{DivisionId, Workpiece};

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Invalid document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid document: division ID '{0}' is used more than once")]
    DuplicateId(DivisionId),
}

/// Reads and writes workpieces in a storage format
pub trait DocumentFormat: Send + Sync {
    fn read(&self, bytes: &[u8]) -> Result<Workpiece, FormatError>;

    fn write(&self, workpiece: &Workpiece) -> Result<Vec<u8>, FormatError>;
}

/// Pretty-printed JSON documents
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentFormat;

impl DocumentFormat for JsonDocumentFormat {
    fn read(&self, bytes: &[u8]) -> Result<Workpiece, FormatError> {
        let workpiece: Workpiece = serde_json::from_slice(bytes)?;
        match workpiece.duplicate_id() {
            Some(id) => Err(FormatError::DuplicateId(id.clone())),
            None => Ok(workpiece),
        }
    }

    fn write(&self, workpiece: &Workpiece) -> Result<Vec<u8>, FormatError> {
        let mut bytes = serde_json::to_vec_pretty(workpiece)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}
