//! Checks on the links between the two structure trees

use std::collections::HashSet;

use super::messages::{MessageKey, Translations};
use super::result::ValidationResult;
use crate::domain::{DivisionId, Node, Workpiece};

/// Typed logical leaves without views, and views pointing nowhere
pub(crate) fn structures_without_media(
    workpiece: &Workpiece,
    translations: &Translations,
) -> ValidationResult {
    let mut result = ValidationResult::success();

    for structure in workpiece.logical_root.tree_stream() {
        if structure.division_type().is_some() && structure.views.is_empty() && structure.is_leaf()
        {
            let message = translations.about(MessageKey::StructureWithoutMedia, &structure.to_string());
            result = result.merge(ValidationResult::warning(message));
        }
    }

    let existing: HashSet<&DivisionId> = workpiece
        .physical_root
        .tree_stream()
        .map(|structure| &structure.id)
        .collect();
    if !workpiece
        .view_targets()
        .iter()
        .all(|target| existing.contains(target))
    {
        result = result.merge(ValidationResult::error(
            translations.get(MessageKey::MediaMissing),
        ));
    }

    result
}

/// Media units no view refers to
pub(crate) fn unlinked_media(workpiece: &Workpiece, translations: &Translations) -> ValidationResult {
    let targets = workpiece.view_targets();

    ValidationResult::merge_all(
        workpiece
            .media_units()
            .into_iter()
            .filter(|unit| !targets.contains(&unit.id))
            .map(|unit| {
                ValidationResult::warning(
                    translations.about(MessageKey::MediaUnassigned, &unit.to_string()),
                )
            }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LogicalStructure, PhysicalStructure};
    use crate::validation::State;

    fn id(s: &str) -> DivisionId {
        s.parse().unwrap()
    }

    fn page(name: &str, order: i32) -> PhysicalStructure {
        let mut page = PhysicalStructure::typed("page", order);
        page.id = id(name);
        page
    }

    #[test]
    fn typed_leaf_without_views_warns() {
        let mut workpiece = Workpiece::new();
        workpiece.logical_root = LogicalStructure::typed("book");

        let result = structures_without_media(&workpiece, &Translations::new());

        assert_eq!(result.state, State::Warning);
        assert_eq!(result.messages.len(), 1);
        assert!(result
            .messages
            .iter()
            .all(|m| m.starts_with("structure without media:")));
    }

    #[test]
    fn untyped_and_viewed_leaves_do_not_warn() {
        let mut workpiece = Workpiece::new();
        workpiece.physical_root.add_child(page("PHYS_0001", 1));
        workpiece
            .logical_root
            .add_child(LogicalStructure::typed("chapter").with_view(id("PHYS_0001")));
        workpiece.logical_root.add_child(LogicalStructure::new());

        let result = structures_without_media(&workpiece, &Translations::new());
        assert!(result.is_success());
    }

    #[test]
    fn dangling_view_is_one_error() {
        let mut workpiece = Workpiece::new();
        workpiece
            .logical_root
            .add_child(LogicalStructure::typed("chapter").with_view(id("PHYS_0404")));
        workpiece
            .logical_root
            .add_child(LogicalStructure::typed("chapter").with_view(id("PHYS_0405")));

        let result = structures_without_media(&workpiece, &Translations::new());

        assert_eq!(result.state, State::Error);
        assert_eq!(
            result.messages.iter().filter(|m| *m == "media missing").count(),
            1
        );
    }

    #[test]
    fn unreferenced_pages_warn_once_each() {
        let mut workpiece = Workpiece::new();
        workpiece.physical_root.add_child(page("PHYS_0001", 1));
        workpiece.physical_root.add_child(page("PHYS_0002", 2));
        workpiece.physical_root.add_child(page("PHYS_0003", 3));
        workpiece
            .logical_root
            .add_child(LogicalStructure::typed("chapter").with_view(id("PHYS_0002")));

        let result = unlinked_media(&workpiece, &Translations::new());

        assert_eq!(result.state, State::Warning);
        assert_eq!(result.messages.len(), 2);
        assert!(result.messages.iter().any(|m| m.contains("PHYS_0001")));
        assert!(result.messages.iter().any(|m| m.contains("PHYS_0003")));
    }

    #[test]
    fn all_pages_referenced() {
        let mut workpiece = Workpiece::new();
        workpiece.physical_root.add_child(page("PHYS_0001", 1));
        workpiece.logical_root.assign_view(id("PHYS_0001"));

        assert!(unlinked_media(&workpiece, &Translations::new()).is_success());
    }
}
