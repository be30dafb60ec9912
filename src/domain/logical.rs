//! Logical structures
//!
//! Logical structures describe the intellectual content of a work: the
//! monograph, its chapters, a periodical volume and its issues. A logical
//! structure is realized by physical structures, which it refers to through
//! [`View`]s. Instead of children it may link to an externally stored work.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::division::{Division, Node};
use super::id::DivisionId;

/// Reference from a logical structure to the physical structure realizing it
///
/// The view names its target by ID; it does not own the physical structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct View {
    pub physical: DivisionId,
}

impl View {
    pub fn of(physical: DivisionId) -> Self {
        Self { physical }
    }
}

fn default_loc_type() -> String {
    "URL".to_string()
}

/// Link to another, externally stored work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedResource {
    pub uri: String,

    #[serde(default = "default_loc_type")]
    pub loc_type: String,
}

impl LinkedResource {
    pub fn url(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            loc_type: default_loc_type(),
        }
    }
}

/// A node of the logical structure tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalStructure {
    #[serde(default = "DivisionId::generate_logical")]
    pub id: DivisionId,

    #[serde(flatten)]
    pub division: Division<LogicalStructure>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub views: Vec<View>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkedResource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl LogicalStructure {
    /// Creates an untyped logical structure
    pub fn new() -> Self {
        Self::with_id(DivisionId::generate_logical())
    }

    pub fn with_id(id: DivisionId) -> Self {
        Self {
            id,
            division: Division::default(),
            views: Vec::new(),
            link: None,
            label: None,
        }
    }

    /// Creates a logical structure of the given type
    pub fn typed(division_type: impl Into<String>) -> Self {
        let mut structure = Self::new();
        structure.division.division_type = Some(division_type.into());
        structure
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_view(mut self, physical: DivisionId) -> Self {
        self.assign_view(physical);
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Adds a view on a physical structure, returning false if already present
    pub fn assign_view(&mut self, physical: DivisionId) -> bool {
        let view = View::of(physical);
        if self.views.contains(&view) {
            false
        } else {
            self.views.push(view);
            true
        }
    }

    /// Removes the view on a physical structure, returning true if it existed
    pub fn unassign_view(&mut self, physical: &DivisionId) -> bool {
        let len_before = self.views.len();
        self.views.retain(|view| &view.physical != physical);
        self.views.len() != len_before
    }

    /// Returns true if this structure has a view on the physical structure
    pub fn views_to(&self, physical: &DivisionId) -> bool {
        self.views.iter().any(|view| &view.physical == physical)
    }

    /// Returns true if this node refers to an external work
    pub fn is_link(&self) -> bool {
        self.link.is_some()
    }

    /// Gives this node the views of all its descendants
    ///
    /// New views are appended in page order as reported by `order_of`;
    /// views already present keep their position.
    pub fn assign_views_from_children(&mut self, order_of: impl Fn(&DivisionId) -> i32) {
        let mut inherited: Vec<DivisionId> = Vec::new();
        for descendant in self.tree_stream().skip(1) {
            for view in &descendant.views {
                if !inherited.contains(&view.physical) {
                    inherited.push(view.physical.clone());
                }
            }
        }
        inherited.sort_by_key(|id| order_of(id));
        for physical in inherited {
            self.assign_view(physical);
        }
    }

    /// Finds a structure by ID in this subtree
    pub fn find(&self, id: &DivisionId) -> Option<&LogicalStructure> {
        self.tree_stream().find(|structure| &structure.id == id)
    }
}

impl Default for LogicalStructure {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for LogicalStructure {
    fn division(&self) -> &Division<Self> {
        &self.division
    }

    fn division_mut(&mut self) -> &mut Division<Self> {
        &mut self.division
    }
}

impl fmt::Display for LogicalStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.division_type().unwrap_or("-"))?;
        if let Some(label) = &self.label {
            write!(f, " \"{}\"", label)?;
        }
        Ok(())
    }
}
