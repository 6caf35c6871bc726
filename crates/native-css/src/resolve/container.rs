//! Container and viewport measurements.

use std::collections::HashMap;

use crate::rules::Size;
use crate::tree::{NodeId, NodeTree};

/// Identifies a measured box that size queries are evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContainerKey {
    /// A container reported by name through the layout feed.
    Named(String),
    /// An unnamed container, measured per element.
    Anonymous(NodeId),
    /// The window, for `@media` size features.
    Viewport,
}

/// Last measured size of every known container.
///
/// Only layout measurement events write here; cascade evaluation reads it.
#[derive(Debug, Clone, Default)]
pub struct ContainerContext {
    sizes: HashMap<ContainerKey, Size>,
}

impl ContainerContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a measurement, returning the previous size.
    pub fn set(&mut self, key: ContainerKey, size: Size) -> Option<Size> {
        self.sizes.insert(key, size)
    }

    pub fn get(&self, key: &ContainerKey) -> Option<Size> {
        self.sizes.get(key).copied()
    }

    /// Forget a container (its element was unmounted).
    pub fn remove(&mut self, key: &ContainerKey) {
        self.sizes.remove(key);
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

/// The key measurements for a container element are stored under.
pub fn container_key(tree: &NodeTree, id: NodeId) -> Option<ContainerKey> {
    let role = tree.container_role(id)?;
    Some(match &role.name {
        Some(name) => ContainerKey::Named(name.clone()),
        None => ContainerKey::Anonymous(id),
    })
}

/// Nearest proper ancestor of `id` that acts as a container answering `name`.
pub fn find_container(tree: &NodeTree, id: NodeId, name: Option<&str>) -> Option<ContainerKey> {
    tree.ancestors(id)
        .find(|ancestor| {
            tree.container_role(*ancestor)
                .is_some_and(|role| role.answers(name))
        })
        .and_then(|ancestor| container_key(tree, ancestor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ContainerRole, ElementNode};

    #[test]
    fn nearest_container_wins() {
        let mut tree = NodeTree::new();
        let outer = tree
            .insert(ElementNode::new("View").with_container(ContainerRole::named("page")), None)
            .unwrap();
        let inner = tree
            .insert(ElementNode::new("View").with_container(ContainerRole::anonymous()), Some(outer))
            .unwrap();
        let leaf = tree.insert(ElementNode::new("Text"), Some(inner)).unwrap();

        assert_eq!(find_container(&tree, leaf, None), Some(ContainerKey::Anonymous(inner)));
        assert_eq!(
            find_container(&tree, leaf, Some("page")),
            Some(ContainerKey::Named("page".into()))
        );
        assert_eq!(find_container(&tree, leaf, Some("sidebar")), None);
        // An element is never its own container.
        assert_eq!(find_container(&tree, outer, None), None);
    }

    #[test]
    fn context_tracks_sizes() {
        let mut context = ContainerContext::new();
        let key = ContainerKey::Named("card".into());
        assert_eq!(context.set(key.clone(), Size::new(200.0, 100.0)), None);
        assert_eq!(context.set(key.clone(), Size::new(500.0, 100.0)), Some(Size::new(200.0, 100.0)));
        assert_eq!(context.get(&key), Some(Size::new(500.0, 100.0)));
    }
}
