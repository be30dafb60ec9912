//! Domain models for digitized works
//!
//! Contains the two structure trees, their metadata and the workpiece
//! aggregate, without any I/O concerns.

mod division;
mod id;
mod logical;
mod metadata;
mod physical;
mod workpiece;

pub use division::{Division, Node, TreeStream};
pub use id::{DivisionId, IdError};
pub use logical::{LinkedResource, LogicalStructure, View};
pub use metadata::{MdSec, Metadata, MetadataEntry, MetadataError, MetadataGroup, MetadataSet};
pub use physical::{MediaFiles, MediaVariant, PhysicalStructure};
pub use workpiece::{ProcessingNote, Workpiece};
