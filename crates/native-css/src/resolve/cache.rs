//! Style caching for state toggles.
//!
//! Each node keeps a few previous resolutions. An entry is reused when the
//! current values of the inputs *it* recorded equal the values it was
//! computed from, so hovering in and out hands back the earlier
//! [`ComputedStyle`] unchanged.

use std::collections::{BTreeMap, HashMap};

use super::container::ContainerKey;
use super::dependencies::Dependencies;
use crate::rules::{ColorScheme, SizeCondition};
use crate::selector::StateKind;
use crate::style::ComputedStyle;
use crate::tree::{ContainerRole, NodeId};

/// Everything a node's resolution produces.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Resolution {
    pub style: ComputedStyle,
    /// Winning custom properties, raw text.
    pub variables: BTreeMap<String, String>,
    /// Container role derived from `container-*` declarations.
    pub container: Option<ContainerRole>,
    pub font_size: f32,
}

/// Current values of the inputs a style can depend on.
pub(crate) trait SnapshotSource {
    fn state(&self, node: NodeId, kind: StateKind) -> bool;
    fn container_matches(&self, key: &ContainerKey, condition: &SizeCondition) -> bool;
    /// Nearest definition visible to the node, excluding its own declared ones.
    fn variable(&self, name: &str) -> Option<String>;
    fn color_scheme(&self) -> ColorScheme;
    fn parent_font_size(&self) -> f32;
}

/// Values of a dependency set at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DependencySnapshot {
    states: Vec<bool>,
    containers: Vec<bool>,
    variables: Vec<Option<String>>,
    color_scheme: Option<ColorScheme>,
    parent_font_size: Option<f32>,
}

impl DependencySnapshot {
    pub fn capture(deps: &Dependencies, source: &dyn SnapshotSource) -> Self {
        Self {
            states: deps
                .pseudo_states
                .iter()
                .map(|(node, kind)| source.state(*node, *kind))
                .collect(),
            containers: deps
                .containers
                .iter()
                .map(|dep| source.container_matches(&dep.key, &dep.condition))
                .collect(),
            variables: deps
                .custom_properties
                .iter()
                .map(|name| source.variable(name))
                .collect(),
            color_scheme: deps.color_scheme.then(|| source.color_scheme()),
            parent_font_size: deps.inherited_font_size.then(|| source.parent_font_size()),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedResolution {
    snapshot: DependencySnapshot,
    resolution: Resolution,
}

/// Per-node cache of previous resolutions.
#[derive(Debug)]
pub(crate) struct StyleCache {
    entries: HashMap<NodeId, Vec<CachedResolution>>,
    entries_per_node: usize,
}

impl StyleCache {
    pub fn with_capacity(entries_per_node: usize) -> Self {
        Self {
            entries: HashMap::new(),
            entries_per_node,
        }
    }

    /// Find an entry whose recorded inputs still hold.
    pub fn lookup(&self, id: NodeId, source: &dyn SnapshotSource) -> Option<&Resolution> {
        self.entries.get(&id)?.iter().rev().find_map(|entry| {
            let current = DependencySnapshot::capture(entry.resolution.style.dependencies(), source);
            (current == entry.snapshot).then_some(&entry.resolution)
        })
    }

    /// Remember a resolution, evicting the oldest entry when full.
    pub fn insert(&mut self, id: NodeId, snapshot: DependencySnapshot, resolution: Resolution) {
        if self.entries_per_node == 0 {
            return;
        }
        let entries = self.entries.entry(id).or_default();
        if entries.len() >= self.entries_per_node {
            entries.remove(0);
        }
        entries.push(CachedResolution { snapshot, resolution });
    }

    /// Drop a node's entries (its snapshot or surroundings changed).
    pub fn invalidate(&mut self, id: NodeId) {
        self.entries.remove(&id);
    }

    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    /// Total entries across all nodes.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResolvedValue;
    use slotmap::SlotMap;

    struct World {
        hovered: bool,
    }

    impl SnapshotSource for World {
        fn state(&self, _node: NodeId, kind: StateKind) -> bool {
            kind == StateKind::Hover && self.hovered
        }
        fn container_matches(&self, _key: &ContainerKey, _condition: &SizeCondition) -> bool {
            false
        }
        fn variable(&self, _name: &str) -> Option<String> {
            None
        }
        fn color_scheme(&self) -> ColorScheme {
            ColorScheme::Light
        }
        fn parent_font_size(&self) -> f32 {
            16.0
        }
    }

    fn resolution(node: NodeId, color: &str) -> Resolution {
        let mut deps = Dependencies::new();
        deps.record_state(node, StateKind::Hover);
        let mut style = ComputedStyle::with_dependencies(deps);
        style.insert("color", ResolvedValue::Keyword(color.into()));
        Resolution {
            style,
            variables: BTreeMap::new(),
            container: None,
            font_size: 16.0,
        }
    }

    fn node() -> NodeId {
        let mut keys: SlotMap<NodeId, ()> = SlotMap::with_key();
        keys.insert(())
    }

    #[test]
    fn reuses_entry_when_inputs_match() {
        let id = node();
        let mut cache = StyleCache::with_capacity(4);
        let idle = World { hovered: false };
        let hover = World { hovered: true };

        let first = resolution(id, "black");
        cache.insert(id, DependencySnapshot::capture(first.style.dependencies(), &idle), first.clone());
        let second = resolution(id, "red");
        cache.insert(id, DependencySnapshot::capture(second.style.dependencies(), &hover), second.clone());

        assert_eq!(cache.lookup(id, &idle), Some(&first));
        assert_eq!(cache.lookup(id, &hover), Some(&second));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn evicts_oldest_and_invalidates() {
        let id = node();
        let mut cache = StyleCache::with_capacity(1);
        let idle = World { hovered: false };
        let hover = World { hovered: true };

        let first = resolution(id, "black");
        cache.insert(id, DependencySnapshot::capture(first.style.dependencies(), &idle), first);
        let second = resolution(id, "red");
        cache.insert(id, DependencySnapshot::capture(second.style.dependencies(), &hover), second);

        assert_eq!(cache.len(), 1);
        assert!(cache.lookup(id, &idle).is_none());
        assert!(cache.lookup(id, &hover).is_some());

        cache.invalidate(id);
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let id = node();
        let mut cache = StyleCache::with_capacity(0);
        let idle = World { hovered: false };
        let first = resolution(id, "black");
        cache.insert(id, DependencySnapshot::capture(first.style.dependencies(), &idle), first);
        assert!(cache.lookup(id, &idle).is_none());
        cache.invalidate_all();
        assert!(cache.is_empty());
    }
}
