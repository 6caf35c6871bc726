//! Selector matching algorithm.

use super::{Combinator, PseudoClass, Selector, SelectorPart, StateKind, TypeSelector};
use crate::resolve::{AncestorRequirement, Dependencies};
use crate::tree::{ElementNode, NodeId, NodeTree};

/// Everything matching needs to know about one element.
#[derive(Debug, Clone, Copy)]
pub struct MatchTarget<'a> {
    pub id: NodeId,
    pub element: &'a ElementNode,
    /// The element has no parent (for `:root`).
    pub is_root: bool,
    /// Number of children (for `:empty`).
    pub child_count: usize,
}

impl<'a> MatchTarget<'a> {
    /// Build a target for a mounted node.
    pub fn of_node(tree: &'a NodeTree, id: NodeId) -> Option<Self> {
        let data = tree.get(id)?;
        Some(Self {
            id,
            element: &data.element,
            is_root: data.parent.is_none(),
            child_count: data.children.len(),
        })
    }

    /// The same node position with a different snapshot.
    pub fn with_element(self, element: &'a ElementNode) -> Self {
        Self { element, ..self }
    }
}

/// Selector matching engine.
pub struct SelectorMatcher;

impl SelectorMatcher {
    /// Match a full selector, recording every state read into `deps`.
    ///
    /// The subject is checked first; combinators are then walked outward
    /// against the tree with backtracking for descendant combinators.
    pub fn matches(
        selector: &Selector,
        target: &MatchTarget<'_>,
        tree: &NodeTree,
        deps: &mut Dependencies,
    ) -> bool {
        let Some(subject) = selector.subject() else {
            return false;
        };

        if selector.has_ancestors() {
            deps.ancestor_sensitive = true;
        }

        let subject_matched = Self::part_matches(subject, target, deps);
        if !selector.has_ancestors() {
            return subject_matched;
        }

        if subject_matched && Self::match_outward(selector, selector.parts.len() - 2, target.id, tree, deps) {
            return true;
        }

        // The subject's own state may turn on later, so judge it statically here.
        if Self::static_matches(subject, target) {
            Self::record_missing_groups(selector, target.id, tree, deps);
        }
        false
    }

    /// Match `selector.parts[index]` against the element reached from `from`
    /// via `selector.combinators[index]`, then continue leftwards.
    fn match_outward(
        selector: &Selector,
        index: usize,
        from: NodeId,
        tree: &NodeTree,
        deps: &mut Dependencies,
    ) -> bool {
        let part = &selector.parts[index];
        let try_candidate = |candidate: NodeId, deps: &mut Dependencies| {
            let Some(target) = MatchTarget::of_node(tree, candidate) else {
                return false;
            };
            Self::part_matches(part, &target, deps)
                && (index == 0 || Self::match_outward(selector, index - 1, candidate, tree, deps))
        };

        match selector.combinators[index] {
            Combinator::Child => match tree.parent(from) {
                Some(parent) => try_candidate(parent, deps),
                None => false,
            },
            Combinator::Descendant => tree
                .ancestors(from)
                .any(|ancestor| try_candidate(ancestor, deps)),
        }
    }

    fn record_missing_groups(selector: &Selector, id: NodeId, tree: &NodeTree, deps: &mut Dependencies) {
        let Some((_, ancestors)) = selector.parts.split_last() else {
            return;
        };
        for part in ancestors.iter().filter(|part| part.has_dynamic_pseudo()) {
            let present = tree.ancestors(id).any(|ancestor| {
                MatchTarget::of_node(tree, ancestor)
                    .is_some_and(|target| Self::static_matches(part, &target))
            });
            if !present {
                deps.record_missing(
                    selector.to_string(),
                    AncestorRequirement::Group(part.without_dynamic_pseudo()),
                );
            }
        }
    }

    /// Check one compound against an element, recording state reads.
    pub fn part_matches(part: &SelectorPart, target: &MatchTarget<'_>, deps: &mut Dependencies) -> bool {
        if !Self::identity_matches(part, target.element) {
            return false;
        }

        part.pseudo_classes
            .iter()
            .all(|pseudo| Self::pseudo_matches(pseudo, target, deps))
    }

    /// Check a compound ignoring interaction state.
    pub fn static_matches(part: &SelectorPart, target: &MatchTarget<'_>) -> bool {
        Self::identity_matches(part, target.element)
            && part.pseudo_classes.iter().all(|pseudo| match pseudo {
                PseudoClass::Root => target.is_root,
                PseudoClass::Empty => target.child_count == 0,
                PseudoClass::Not(inner) => !Self::static_matches(inner, target),
                _ => true,
            })
    }

    /// Type, id, classes and attributes.
    fn identity_matches(part: &SelectorPart, element: &ElementNode) -> bool {
        if let Some(TypeSelector::Type(name)) = &part.type_selector {
            if element.type_name.as_deref() != Some(name.as_str()) {
                return false;
            }
        }

        if let Some(id) = &part.id {
            if element.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }

        if !part.classes.iter().all(|class| element.has_class(class)) {
            return false;
        }

        part.attributes.iter().all(|attribute| {
            match (element.attributes.get(&attribute.name), &attribute.value) {
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
                (None, _) => false,
            }
        })
    }

    fn pseudo_matches(pseudo: &PseudoClass, target: &MatchTarget<'_>, deps: &mut Dependencies) -> bool {
        let state = &target.element.state;
        match pseudo {
            PseudoClass::Root => target.is_root,
            PseudoClass::Empty => {
                deps.record_state(target.id, StateKind::Empty);
                target.child_count == 0
            }
            PseudoClass::Not(inner) => !Self::part_matches(inner, target, deps),
            PseudoClass::Hover => {
                deps.record_state(target.id, StateKind::Hover);
                state.hover
            }
            PseudoClass::Active => {
                deps.record_state(target.id, StateKind::Active);
                state.active
            }
            PseudoClass::Focus => {
                deps.record_state(target.id, StateKind::Focus);
                state.focus
            }
            PseudoClass::Disabled => {
                deps.record_state(target.id, StateKind::Disabled);
                state.disabled
            }
            PseudoClass::Enabled => {
                deps.record_state(target.id, StateKind::Disabled);
                !state.disabled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::PseudoState;

    fn matches(selector: &Selector, tree: &NodeTree, id: NodeId) -> (bool, Dependencies) {
        let mut deps = Dependencies::new();
        let target = MatchTarget::of_node(tree, id).unwrap();
        let result = SelectorMatcher::matches(selector, &target, tree, &mut deps);
        (result, deps)
    }

    #[test]
    fn compound_predicates() {
        let mut tree = NodeTree::new();
        let id = tree
            .insert(
                ElementNode::new("View")
                    .with_class("card")
                    .with_id("main")
                    .with_attribute("data-state", "open"),
                None,
            )
            .unwrap();

        let part = SelectorPart::type_only("View")
            .with_class("card")
            .with_attribute(crate::selector::AttributeSelector::equals("data-state", "open"));
        assert!(matches(&Selector::compound(part), &tree, id).0);
        assert!(matches(&Selector::id("main"), &tree, id).0);
        assert!(!matches(&Selector::type_selector("Text"), &tree, id).0);
        assert!(!matches(&Selector::class("other"), &tree, id).0);

        let closed = SelectorPart::new()
            .with_attribute(crate::selector::AttributeSelector::equals("data-state", "closed"));
        assert!(!matches(&Selector::compound(closed), &tree, id).0);
    }

    #[test]
    fn dynamic_pseudo_records_dependency() {
        let mut tree = NodeTree::new();
        let id = tree.insert(ElementNode::new("View").with_class("btn"), None).unwrap();

        let selector = Selector::compound(SelectorPart::class_only("btn").with_pseudo(PseudoClass::Hover));
        let (matched, deps) = matches(&selector, &tree, id);
        assert!(!matched);
        assert!(deps.reads_state(id, StateKind::Hover));

        tree.get_mut(id).unwrap().element.state = PseudoState {
            hover: true,
            ..Default::default()
        };
        assert!(matches(&selector, &tree, id).0);
    }

    #[test]
    fn structural_pseudo_classes() {
        let mut tree = NodeTree::new();
        let root = tree.insert(ElementNode::new("View"), None).unwrap();
        let child = tree.insert(ElementNode::new("View"), Some(root)).unwrap();

        let root_sel = Selector::compound(SelectorPart::new().with_pseudo(PseudoClass::Root));
        assert!(matches(&root_sel, &tree, root).0);
        assert!(!matches(&root_sel, &tree, child).0);

        let empty = Selector::compound(SelectorPart::new().with_pseudo(PseudoClass::Empty));
        let (matched, deps) = matches(&empty, &tree, root);
        assert!(!matched);
        assert!(deps.reads_state(root, StateKind::Empty));
        assert!(matches(&empty, &tree, child).0);

        let not_hidden = Selector::compound(
            SelectorPart::new().with_pseudo(PseudoClass::Not(Box::new(SelectorPart::class_only("hidden")))),
        );
        assert!(matches(&not_hidden, &tree, child).0);
    }

    #[test]
    fn combinators_backtrack() {
        let mut tree = NodeTree::new();
        let a = tree.insert(ElementNode::new("View").with_class("a"), None).unwrap();
        let b = tree.insert(ElementNode::new("View").with_class("b"), Some(a)).unwrap();
        let mid = tree.insert(ElementNode::new("View"), Some(b)).unwrap();
        let leaf = tree.insert(ElementNode::new("Text").with_class("c"), Some(mid)).unwrap();

        // `.a > .b .c` needs backtracking past `mid`.
        let selector = Selector::class("a")
            .child(SelectorPart::class_only("b"))
            .descendant(SelectorPart::class_only("c"));
        let (matched, deps) = matches(&selector, &tree, leaf);
        assert!(matched);
        assert!(deps.ancestor_sensitive);

        let child_only = Selector::class("b").child(SelectorPart::class_only("c"));
        assert!(!matches(&child_only, &tree, leaf).0);
    }

    #[test]
    fn group_ancestor_state() {
        let mut tree = NodeTree::new();
        let group = tree.insert(ElementNode::new("View").with_class("group"), None).unwrap();
        let icon = tree.insert(ElementNode::new("Text").with_class("icon"), Some(group)).unwrap();

        let selector = Selector::compound(SelectorPart::class_only("group").with_pseudo(PseudoClass::Hover))
            .descendant(SelectorPart::class_only("icon"));
        let (matched, deps) = matches(&selector, &tree, icon);
        assert!(!matched);
        assert!(deps.reads_state(group, StateKind::Hover));
        assert!(deps.missing_ancestors.is_empty());
    }

    #[test]
    fn missing_group_is_recorded() {
        let mut tree = NodeTree::new();
        let parent = tree.insert(ElementNode::new("View"), None).unwrap();
        let icon = tree.insert(ElementNode::new("Text").with_class("icon"), Some(parent)).unwrap();

        let selector = Selector::compound(SelectorPart::class_only("group").with_pseudo(PseudoClass::Hover))
            .descendant(SelectorPart::class_only("icon"));
        let (_, deps) = matches(&selector, &tree, icon);
        assert_eq!(deps.missing_ancestors.len(), 1);
        assert_eq!(deps.missing_ancestors[0].selector, ".group:hover .icon");
        assert_eq!(
            deps.missing_ancestors[0].requirement,
            AncestorRequirement::Group(SelectorPart::class_only("group"))
        );
    }

    #[test]
    fn missing_group_is_recorded_while_subject_state_is_off() {
        let mut tree = NodeTree::new();
        let parent = tree.insert(ElementNode::new("View"), None).unwrap();
        let icon = tree.insert(ElementNode::new("Text").with_class("icon"), Some(parent)).unwrap();

        let selector = Selector::compound(SelectorPart::class_only("group").with_pseudo(PseudoClass::Hover))
            .descendant(SelectorPart::class_only("icon").with_pseudo(PseudoClass::Focus));
        let (matched, deps) = matches(&selector, &tree, icon);
        assert!(!matched);
        assert!(deps.reads_state(icon, StateKind::Focus));
        assert_eq!(deps.missing_ancestors.len(), 1);
        assert_eq!(deps.missing_ancestors[0].selector, ".group:hover .icon:focus");

        let other = Selector::compound(SelectorPart::class_only("group").with_pseudo(PseudoClass::Hover))
            .descendant(SelectorPart::class_only("badge").with_pseudo(PseudoClass::Focus));
        let (_, deps) = matches(&other, &tree, icon);
        assert!(deps.missing_ancestors.is_empty());
    }
}
