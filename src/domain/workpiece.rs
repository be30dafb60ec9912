//! Workpiece domain model
//!
//! A workpiece is the aggregate root of a digitized work: one logical
//! structure tree, one physical structure tree, and the bookkeeping around
//! them. It provides the flattening traversals the validator walks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::division::Node;
use super::id::DivisionId;
use super::logical::LogicalStructure;
use super::physical::PhysicalStructure;

/// One entry of the processing history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingNote {
    /// Who did the processing (person or software agent)
    pub name: String,

    /// Role of the agent, e.g. `CREATOR` or `EDITOR`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Kind of agent, e.g. `INDIVIDUAL` or `SOFTWARE`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub note_type: Option<String>,

    /// Free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ProcessingNote {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: None,
            note_type: None,
            note: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A digitized work: logical tree, physical tree and their history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workpiece {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default = "Utc::now")]
    pub creation_date: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    edit_history: Vec<ProcessingNote>,

    /// Root of the logical structure tree
    pub logical_root: LogicalStructure,

    /// Root of the physical structure tree; its descendants are the media
    pub physical_root: PhysicalStructure,
}

impl Workpiece {
    /// Creates an empty workpiece for a new work
    pub fn new() -> Self {
        Self {
            id: None,
            creation_date: Utc::now(),
            edit_history: Vec::new(),
            logical_root: LogicalStructure::new(),
            physical_root: PhysicalStructure::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The processing history, oldest first
    pub fn edit_history(&self) -> &[ProcessingNote] {
        &self.edit_history
    }

    /// Appends to the processing history
    pub fn add_edit_note(&mut self, note: ProcessingNote) {
        self.edit_history.push(note);
    }

    /// All logical structures in pre-order, starting with the root
    pub fn all_logical_structures(&self) -> Vec<&LogicalStructure> {
        self.logical_root.tree_stream().collect()
    }

    /// All physical structures in pre-order, starting with the root
    pub fn all_physical_structures(&self) -> Vec<&PhysicalStructure> {
        self.physical_root.tree_stream().collect()
    }

    /// All physical structures sorted by `order`
    ///
    /// Structures with equal order keep their pre-order position.
    pub fn all_physical_structures_sorted(&self) -> Vec<&PhysicalStructure> {
        let mut structures = self.all_physical_structures();
        structures.sort_by_key(|structure| structure.order());
        structures
    }

    /// Physical structures below the root container
    pub fn media_units(&self) -> Vec<&PhysicalStructure> {
        self.physical_root.tree_stream().skip(1).collect()
    }

    /// Finds a physical structure anywhere in the physical tree
    pub fn find_physical(&self, id: &DivisionId) -> Option<&PhysicalStructure> {
        self.physical_root.find(id)
    }

    /// Finds a logical structure anywhere in the logical tree
    pub fn find_logical(&self, id: &DivisionId) -> Option<&LogicalStructure> {
        self.logical_root.find(id)
    }

    /// First division ID used by more than one structure
    ///
    /// Views address physical structures by ID, and the logical tree uses the
    /// same namespace, so every ID must be unique across both trees.
    pub fn duplicate_id(&self) -> Option<&DivisionId> {
        let mut seen = HashSet::new();
        self.logical_root
            .tree_stream()
            .map(|structure| &structure.id)
            .chain(self.physical_root.tree_stream().map(|structure| &structure.id))
            .find(|id| !seen.insert(*id))
    }

    /// IDs of every physical structure some view in the logical tree points to
    pub fn view_targets(&self) -> HashSet<&DivisionId> {
        self.logical_root
            .tree_stream()
            .flat_map(|structure| structure.views.iter())
            .map(|view| &view.physical)
            .collect()
    }

    /// Logical structures that have a view on the given physical structure
    pub fn logical_structures_viewing(&self, id: &DivisionId) -> Vec<&LogicalStructure> {
        self.logical_root
            .tree_stream()
            .filter(|structure| structure.views_to(id))
            .collect()
    }

    /// Gives every untyped logical structure with children the views of its
    /// descendants, in page order
    pub fn assign_views_from_children(&mut self) {
        let orders: HashMap<DivisionId, i32> = self
            .physical_root
            .tree_stream()
            .map(|structure| (structure.id.clone(), structure.order()))
            .collect();
        assign_views_recursive(&mut self.logical_root, &orders);
    }
}

fn assign_views_recursive(structure: &mut LogicalStructure, orders: &HashMap<DivisionId, i32>) {
    if structure.is_leaf() {
        return;
    }
    for child in &mut structure.division.children {
        assign_views_recursive(child, orders);
    }
    if structure.division_type().is_none() {
        structure.assign_views_from_children(|id| orders.get(id).copied().unwrap_or(i32::MAX));
    }
}

impl Default for Workpiece {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Workpiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}",
            self.id.as_deref().unwrap_or("-"),
            self.logical_root
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> DivisionId {
        s.parse().unwrap()
    }

    fn page(name: &str, order: i32) -> PhysicalStructure {
        let mut page = PhysicalStructure::typed("page", order);
        page.id = id(name);
        page
    }

    fn sample_workpiece() -> Workpiece {
        let mut workpiece = Workpiece::new().with_id("ppn123");
        workpiece.physical_root.add_child(page("PHYS_0003", 3));
        workpiece.physical_root.add_child(page("PHYS_0001", 1));
        workpiece.physical_root.add_child(page("PHYS_0002", 2));

        workpiece.logical_root.division.division_type = Some("monograph".to_string());
        workpiece
            .logical_root
            .add_child(LogicalStructure::typed("chapter").with_view(id("PHYS_0001")));
        workpiece
            .logical_root
            .add_child(LogicalStructure::typed("chapter").with_view(id("PHYS_0003")));
        workpiece
    }

    #[test]
    fn flat_lists_include_roots() {
        let workpiece = sample_workpiece();

        assert_eq!(workpiece.all_logical_structures().len(), 3);
        assert_eq!(workpiece.all_physical_structures().len(), 4);
        assert_eq!(workpiece.media_units().len(), 3);
    }

    #[test]
    fn sorted_by_order() {
        let workpiece = sample_workpiece();
        let orders: Vec<_> = workpiece
            .all_physical_structures_sorted()
            .iter()
            .map(|structure| structure.order())
            .collect();

        assert_eq!(orders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn sort_is_stable_for_equal_orders() {
        let mut workpiece = Workpiece::new();
        workpiece.physical_root.add_child(page("PHYS_B", 1));
        workpiece.physical_root.add_child(page("PHYS_A", 1));

        let ids: Vec<_> = workpiece
            .all_physical_structures_sorted()
            .iter()
            .skip(1)
            .map(|structure| structure.id.as_str())
            .collect();

        assert_eq!(ids, vec!["PHYS_B", "PHYS_A"]);
    }

    #[test]
    fn view_targets_and_viewers() {
        let workpiece = sample_workpiece();
        let targets = workpiece.view_targets();

        assert_eq!(targets.len(), 2);
        assert!(!targets.contains(&id("PHYS_0002")));
        assert_eq!(workpiece.logical_structures_viewing(&id("PHYS_0003")).len(), 1);
        assert!(workpiece.logical_structures_viewing(&id("PHYS_0002")).is_empty());
    }

    #[test]
    fn find_in_either_tree() {
        let workpiece = sample_workpiece();
        let chapter = workpiece.logical_root.children()[1].id.clone();

        assert_eq!(workpiece.find_physical(&id("PHYS_0002")).unwrap().order(), 2);
        assert!(workpiece.find_physical(&id("PHYS_0404")).is_none());
        assert!(workpiece.find_logical(&chapter).unwrap().views_to(&id("PHYS_0003")));
    }

    #[test]
    fn duplicate_ids_across_both_trees() {
        let mut workpiece = sample_workpiece();
        assert!(workpiece.duplicate_id().is_none());

        workpiece.physical_root.add_child(page("PHYS_0001", 4));
        assert_eq!(workpiece.duplicate_id(), Some(&id("PHYS_0001")));

        let mut shared = sample_workpiece();
        shared.logical_root.id = id("PHYS_0002");
        assert_eq!(shared.duplicate_id(), Some(&id("PHYS_0002")));
    }

    #[test]
    fn untyped_parents_inherit_views() {
        let mut workpiece = sample_workpiece();
        workpiece.logical_root.division.division_type = None;

        workpiece.assign_views_from_children();

        let targets: Vec<_> = workpiece
            .logical_root
            .views
            .iter()
            .map(|view| view.physical.as_str())
            .collect();
        assert_eq!(targets, vec!["PHYS_0001", "PHYS_0003"]);
    }

    #[test]
    fn typed_parents_keep_their_views() {
        let mut workpiece = sample_workpiece();

        workpiece.assign_views_from_children();

        assert!(workpiece.logical_root.views.is_empty());
    }

    #[test]
    fn edit_history_appends() {
        let mut workpiece = Workpiece::new();
        workpiece.add_edit_note(ProcessingNote::new("scanner").with_role("CREATOR"));
        workpiece.add_edit_note(ProcessingNote::new("editor").with_note("paginated"));

        let names: Vec<_> = workpiece.edit_history().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["scanner", "editor"]);
    }

    #[test]
    fn serde_roundtrip() {
        let workpiece = sample_workpiece();
        let json = serde_json::to_string(&workpiece).unwrap();
        let parsed: Workpiece = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, workpiece);
    }
}
