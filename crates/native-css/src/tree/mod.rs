//! Element tree mirrored from the host.
//!
//! Parent/child relations are id lookups into an arena, so ancestors and
//! descendants can be walked without owning references between nodes.

mod node;

use std::collections::BTreeMap;

use slotmap::{SlotMap, new_key_type};

pub use node::{ContainerRole, ElementNode, PseudoState};

use crate::style::ComputedStyle;
use crate::{Error, Result};

new_key_type! {
    /// A stable handle for a mounted element.
    ///
    /// Handles become invalid when the element is unmounted and are never reused.
    pub struct NodeId;
}

/// Lifecycle of an element's style binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingState {
    /// Mounted, never resolved.
    Unbound,
    /// Resolved and current.
    Bound,
    /// Resolved, but a dependency changed since.
    Stale,
    /// Unmounted.
    Released,
}

/// Per-element record.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub element: ElementNode,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Distance from the root (roots are 0).
    pub depth: usize,
    pub(crate) binding: BindingState,
    pub(crate) style: Option<ComputedStyle>,
    /// Custom properties written by the host, which beat declared ones.
    pub(crate) inline_variables: BTreeMap<String, String>,
    /// Winning `--name` declarations from the last resolution.
    pub(crate) declared_variables: BTreeMap<String, String>,
    /// Container role from cascaded `container-*` declarations.
    pub(crate) derived_container: Option<ContainerRole>,
    /// Font size used for `em` on this element and its inheriting children.
    pub(crate) font_size: f32,
}

impl NodeData {
    fn new(element: ElementNode, parent: Option<NodeId>, depth: usize) -> Self {
        Self {
            element,
            parent,
            children: Vec::new(),
            depth,
            binding: BindingState::Unbound,
            style: None,
            inline_variables: BTreeMap::new(),
            declared_variables: BTreeMap::new(),
            derived_container: None,
            font_size: 0.0,
        }
    }

    /// The container role in effect: explicit, else derived from declarations.
    pub fn container_role(&self) -> Option<&ContainerRole> {
        self.element
            .container
            .as_ref()
            .or(self.derived_container.as_ref())
    }

    /// Current binding state.
    pub fn binding(&self) -> BindingState {
        self.binding
    }

    /// Look up a custom property defined on this element (host writes first).
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.inline_variables
            .get(name)
            .or_else(|| self.declared_variables.get(name))
            .map(String::as_str)
    }
}

/// Arena of mounted elements.
#[derive(Debug, Default)]
pub struct NodeTree {
    nodes: SlotMap<NodeId, NodeData>,
}

impl NodeTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    /// Insert an element under `parent` (or as a root).
    pub fn insert(&mut self, element: ElementNode, parent: Option<NodeId>) -> Result<NodeId> {
        let depth = match parent {
            Some(parent_id) => self.get(parent_id).ok_or(Error::UnknownNode(parent_id))?.depth + 1,
            None => 0,
        };
        let id = self.nodes.insert(NodeData::new(element, parent, depth));
        if let Some(parent_id) = parent {
            if let Some(parent_data) = self.nodes.get_mut(parent_id) {
                parent_data.children.push(id);
            }
        }
        tracing::trace!(target: "native_css::tree", ?id, ?parent, "inserted node");
        Ok(id)
    }

    /// Remove an element and its subtree, returning every removed id.
    pub fn remove(&mut self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut removed = self.descendants(id)?;
        removed.insert(0, id);

        if let Some(parent_id) = self.nodes.get(id).and_then(|d| d.parent) {
            if let Some(parent_data) = self.nodes.get_mut(parent_id) {
                parent_data.children.retain(|&child| child != id);
            }
        }
        for node in &removed {
            self.nodes.remove(*node);
        }
        tracing::trace!(target: "native_css::tree", ?id, count = removed.len(), "removed subtree");
        Ok(removed)
    }

    /// Check if an element is mounted.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    /// Get an element's snapshot.
    pub fn element(&self, id: NodeId) -> Option<&ElementNode> {
        self.nodes.get(id).map(|d| &d.element)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|d| d.parent)
    }

    /// Number of children (0 for unknown ids).
    pub fn child_count(&self, id: NodeId) -> usize {
        self.nodes.get(id).map_or(0, |d| d.children.len())
    }

    /// Iterate ancestors from the parent outwards.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// All descendants in pre-order (parents before children).
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let data = self.nodes.get(id).ok_or(Error::UnknownNode(id))?;
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = data.children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            result.push(next);
            if let Some(child) = self.nodes.get(next) {
                stack.extend(child.children.iter().rev().copied());
            }
        }
        Ok(result)
    }

    /// The effective container role of an element.
    pub fn container_role(&self, id: NodeId) -> Option<&ContainerRole> {
        self.nodes.get(id).and_then(NodeData::container_role)
    }

    /// Iterate all mounted ids.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Iterator over an element's ancestors, nearest first.
pub struct Ancestors<'a> {
    tree: &'a NodeTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_insert_and_walk() {
        let mut tree = NodeTree::new();
        let root = tree.insert(ElementNode::new("View"), None).unwrap();
        let a = tree.insert(ElementNode::new("View"), Some(root)).unwrap();
        let b = tree.insert(ElementNode::new("Text"), Some(a)).unwrap();
        let c = tree.insert(ElementNode::new("Text"), Some(root)).unwrap();

        assert_eq!(tree.get(b).unwrap().depth, 2);
        assert_eq!(tree.ancestors(b).collect::<Vec<_>>(), vec![a, root]);
        assert_eq!(tree.descendants(root).unwrap(), vec![a, b, c]);
        assert_eq!(tree.child_count(root), 2);
        assert_eq!(tree.child_count(b), 0);
    }

    #[test]
    fn tree_remove_subtree() {
        let mut tree = NodeTree::new();
        let root = tree.insert(ElementNode::new("View"), None).unwrap();
        let a = tree.insert(ElementNode::new("View"), Some(root)).unwrap();
        let b = tree.insert(ElementNode::new("Text"), Some(a)).unwrap();

        let removed = tree.remove(a).unwrap();
        assert_eq!(removed, vec![a, b]);
        assert!(!tree.contains(b));
        assert_eq!(tree.child_count(root), 0);
        assert!(matches!(tree.remove(a), Err(Error::UnknownNode(_))));
    }

    #[test]
    fn tree_unknown_parent() {
        let mut tree = NodeTree::new();
        let root = tree.insert(ElementNode::new("View"), None).unwrap();
        tree.remove(root).unwrap();
        assert!(tree.insert(ElementNode::new("View"), Some(root)).is_err());
    }

    #[test]
    fn container_role_prefers_explicit() {
        let mut tree = NodeTree::new();
        let root = tree
            .insert(ElementNode::new("View").with_container(ContainerRole::named("card")), None)
            .unwrap();
        tree.get_mut(root).unwrap().derived_container = Some(ContainerRole::named("other"));
        assert_eq!(tree.container_role(root), Some(&ContainerRole::named("card")));
    }
}
