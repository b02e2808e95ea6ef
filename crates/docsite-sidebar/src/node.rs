//! Sidebar node model.
//!
//! A sidebar is an ordered sequence of [`SidebarNode`]s, where each node is
//! either a leaf referencing one document or a labeled category holding an
//! ordered list of child nodes, recursively. There is no depth limit.
//!
//! Node order is significant: it is the rendered navigation order and is
//! preserved exactly through parsing, resolution, and re-serialization.

use serde::{Deserialize, Serialize};

/// One node in a sidebar tree.
///
/// Serializes with a `type` tag (`doc` or `category`):
///
/// ```yaml
/// - type: doc
///   id: welcome
/// - type: category
///   label: How To
///   items:
///     - type: doc
///       id: how_to/query_outputs
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SidebarNode {
    /// Leaf referencing one document by identifier.
    Doc {
        /// Opaque document identifier, resolved by the surrounding
        /// framework. Preserved byte-for-byte.
        id: String,
        /// Optional display label overriding the document title.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// Branch with a label and an ordered list of child nodes.
    Category {
        /// Display label for the category.
        label: String,
        /// Child nodes, in declaration order.
        items: Vec<SidebarNode>,
    },
}

impl SidebarNode {
    /// Document identifier, if this node is a leaf.
    #[must_use]
    pub fn doc_id(&self) -> Option<&str> {
        match self {
            Self::Doc { id, .. } => Some(id),
            Self::Category { .. } => None,
        }
    }

    /// Display label, if one is set.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Doc { label, .. } => label.as_deref(),
            Self::Category { label, .. } => Some(label),
        }
    }

    /// Child nodes; empty for leaves.
    #[must_use]
    pub fn items(&self) -> &[SidebarNode] {
        match self {
            Self::Doc { .. } => &[],
            Self::Category { items, .. } => items,
        }
    }
}

/// Depth-first pre-order iterator over sidebar nodes.
///
/// Yields each parent before its children, children in declared order.
/// This is the only traversal order the model guarantees; it determines
/// the rendered navigation sequence.
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<&'a SidebarNode>,
}

impl<'a> Walk<'a> {
    /// Walk the given nodes and their descendants in pre-order.
    #[must_use]
    pub fn new(nodes: &'a [SidebarNode]) -> Self {
        Self {
            stack: nodes.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a SidebarNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children reversed so they pop in declared order
        if let SidebarNode::Category { items, .. } = node {
            self.stack.extend(items.iter().rev());
        }
        Some(node)
    }
}
