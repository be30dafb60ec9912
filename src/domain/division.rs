//! Generic structure tree node
//!
//! Both structure trees are built from [`Division`]s: the logical tree
//! (chapters, issues, articles) and the physical tree (pages, files). The
//! concrete node types embed a `Division` of themselves and expose it through
//! the [`Node`] trait, which also provides the pre-order [`TreeStream`].

use serde::{Deserialize, Serialize};

use super::metadata::MetadataSet;

/// Fields shared by logical and physical structures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division<T> {
    /// Child structures; insertion order is the tree shape
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<T>,

    /// Metadata attached directly to this node
    #[serde(default, skip_serializing_if = "MetadataSet::is_empty")]
    pub metadata: MetadataSet,

    /// Sequence number; authoritative page order for physical structures
    #[serde(default)]
    pub order: i32,

    /// Human-facing label for the order (e.g. "IV", "front cover")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orderlabel: Option<String>,

    /// Structural kind, used for ruleset lookups
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub division_type: Option<String>,
}

impl<T> Default for Division<T> {
    fn default() -> Self {
        Self {
            children: Vec::new(),
            metadata: MetadataSet::new(),
            order: 0,
            orderlabel: None,
            division_type: None,
        }
    }
}

impl<T> Division<T> {
    /// Creates an empty division of the given type
    pub fn typed(division_type: impl Into<String>) -> Self {
        Self {
            division_type: Some(division_type.into()),
            ..Self::default()
        }
    }
}

/// A node in one of the two structure trees
pub trait Node: Sized {
    fn division(&self) -> &Division<Self>;

    fn division_mut(&mut self) -> &mut Division<Self>;

    fn children(&self) -> &[Self] {
        &self.division().children
    }

    fn metadata(&self) -> &MetadataSet {
        &self.division().metadata
    }

    fn order(&self) -> i32 {
        self.division().order
    }

    fn orderlabel(&self) -> Option<&str> {
        self.division().orderlabel.as_deref()
    }

    fn division_type(&self) -> Option<&str> {
        self.division().division_type.as_deref()
    }

    fn is_leaf(&self) -> bool {
        self.division().children.is_empty()
    }

    /// Appends a child and returns a reference to it
    fn add_child(&mut self, child: Self) -> &mut Self {
        let children = &mut self.division_mut().children;
        children.push(child);
        let last = children.len() - 1;
        &mut children[last]
    }

    /// Lazily walks this node and all its descendants in pre-order
    fn tree_stream(&self) -> TreeStream<'_, Self> {
        TreeStream::new(self)
    }
}

/// Depth-first, pre-order iterator over a structure tree
///
/// Starts with the node itself. Each call to [`Node::tree_stream`] yields a
/// fresh iterator over the same nodes. The tree must be acyclic, which holds
/// for any tree built through ownership.
pub struct TreeStream<'a, T> {
    stack: Vec<&'a T>,
}

impl<'a, T: Node> TreeStream<'a, T> {
    pub fn new(root: &'a T) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a, T: Node> Iterator for TreeStream<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Plain {
        name: &'static str,
        division: Division<Plain>,
    }

    impl Node for Plain {
        fn division(&self) -> &Division<Self> {
            &self.division
        }

        fn division_mut(&mut self) -> &mut Division<Self> {
            &mut self.division
        }
    }

    fn plain(name: &'static str) -> Plain {
        Plain {
            name,
            division: Division::default(),
        }
    }

    fn sample_tree() -> Plain {
        let mut root = plain("root");
        let a = root.add_child(plain("a"));
        a.add_child(plain("a1"));
        a.add_child(plain("a2"));
        root.add_child(plain("b")).add_child(plain("b1"));
        root
    }

    #[test]
    fn pre_order_includes_start_node() {
        let root = sample_tree();
        let names: Vec<_> = root.tree_stream().map(|n| n.name).collect();

        assert_eq!(names, vec!["root", "a", "a1", "a2", "b", "b1"]);
    }

    #[test]
    fn stream_is_restartable() {
        let root = sample_tree();

        assert_eq!(root.tree_stream().count(), 6);
        assert_eq!(root.tree_stream().count(), 6);
    }

    #[test]
    fn stream_is_lazy() {
        let root = sample_tree();
        let first_two: Vec<_> = root.tree_stream().take(2).map(|n| n.name).collect();

        assert_eq!(first_two, vec!["root", "a"]);
    }

    #[test]
    fn subtree_stream() {
        let root = sample_tree();
        let b = &root.children()[1];
        let names: Vec<_> = b.tree_stream().map(|n| n.name).collect();

        assert_eq!(names, vec!["b", "b1"]);
    }

    #[test]
    fn typed_division() {
        let division: Division<Plain> = Division::typed("page");
        assert_eq!(division.division_type.as_deref(), Some("page"));
        assert!(division.children.is_empty());
    }
}
