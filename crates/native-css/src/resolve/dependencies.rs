//! Inputs consulted while computing a style.

use std::collections::BTreeSet;

use super::ContainerKey;
use crate::rules::SizeCondition;
use crate::selector::{SelectorPart, StateKind};
use crate::tree::NodeId;

/// A size query evaluated against one container.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerDependency {
    pub key: ContainerKey,
    pub condition: SizeCondition,
    /// Result when the style was computed.
    pub matched: bool,
}

/// An ancestor role a rule needed but did not find.
#[derive(Debug, Clone, PartialEq)]
pub enum AncestorRequirement {
    /// A group compound such as `.group:hover`; the ancestor must statically match it.
    Group(SelectorPart),
    /// A container answering the given name (`None` = any container).
    Container(Option<String>),
}

impl AncestorRequirement {
    /// Selector-like text naming what would satisfy the requirement.
    pub fn describe(&self) -> String {
        match self {
            Self::Group(part) => part.to_string(),
            Self::Container(Some(name)) => format!("container-name: {}", name),
            Self::Container(None) => "container-type".to_string(),
        }
    }
}

/// Recorded when a subject matched statically but its group/container
/// ancestor was absent at match time.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingAncestor {
    /// The full selector (or `@container` condition) that needed the ancestor.
    pub selector: String,
    pub requirement: AncestorRequirement,
}

/// Dependency set of a computed style.
///
/// Records inputs consulted for every candidate rule, including rules that
/// did not win or were excluded, since a future change could make them win.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dependencies {
    /// Pseudo-states read, keyed by the element they were read from.
    pub pseudo_states: BTreeSet<(NodeId, StateKind)>,
    pub containers: Vec<ContainerDependency>,
    /// Custom property names looked up during `var()` substitution.
    pub custom_properties: BTreeSet<String>,
    /// A `prefers-color-scheme` condition was evaluated.
    pub color_scheme: bool,
    /// `em` or the inherited font size was read from the parent.
    pub inherited_font_size: bool,
    /// Some matched or candidate selector looked at ancestors.
    pub ancestor_sensitive: bool,
    pub missing_ancestors: Vec<MissingAncestor>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_state(&mut self, node: NodeId, kind: StateKind) {
        self.pseudo_states.insert((node, kind));
    }

    /// Record a container or viewport query result.
    pub fn record_container(&mut self, key: ContainerKey, condition: &SizeCondition, matched: bool) {
        let exists = self
            .containers
            .iter()
            .any(|dep| dep.key == key && dep.condition == *condition);
        if !exists {
            self.containers.push(ContainerDependency {
                key,
                condition: condition.clone(),
                matched,
            });
        }
    }

    pub fn record_variable(&mut self, name: &str) {
        if !self.custom_properties.contains(name) {
            self.custom_properties.insert(name.to_string());
        }
    }

    pub fn record_missing(&mut self, selector: String, requirement: AncestorRequirement) {
        let missing = MissingAncestor {
            selector,
            requirement,
        };
        if !self.missing_ancestors.contains(&missing) {
            self.missing_ancestors.push(missing);
        }
    }

    /// Whether the style read `kind` from `node`.
    pub fn reads_state(&self, node: NodeId, kind: StateKind) -> bool {
        self.pseudo_states.contains(&(node, kind))
    }

    pub fn reads_variable(&self, name: &str) -> bool {
        self.custom_properties.contains(name)
    }

    /// Whether any recorded query on `key` would evaluate differently now.
    pub fn container_flipped(&self, key: &ContainerKey, evaluate: impl Fn(&SizeCondition) -> bool) -> bool {
        self.containers
            .iter()
            .filter(|dep| dep.key == *key)
            .any(|dep| evaluate(&dep.condition) != dep.matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Comparator, SizeAxis, SizeFeature};

    fn wide() -> SizeCondition {
        SizeCondition::new(vec![SizeFeature::new(SizeAxis::Width, Comparator::Greater, 400.0)])
    }

    #[test]
    fn container_records_are_deduplicated() {
        let mut deps = Dependencies::new();
        let key = ContainerKey::Named("card".into());
        deps.record_container(key.clone(), &wide(), false);
        deps.record_container(key.clone(), &wide(), false);
        assert_eq!(deps.containers.len(), 1);

        assert!(!deps.container_flipped(&key, |c| c.evaluate(crate::rules::Size::new(200.0, 0.0))));
        assert!(deps.container_flipped(&key, |c| c.evaluate(crate::rules::Size::new(500.0, 0.0))));
        assert!(!deps.container_flipped(&ContainerKey::Viewport, |_| true));
    }

    #[test]
    fn requirement_descriptions() {
        let group = AncestorRequirement::Group(SelectorPart::class_only("group"));
        assert_eq!(group.describe(), ".group");
        assert_eq!(
            AncestorRequirement::Container(Some("card".into())).describe(),
            "container-name: card"
        );
    }
}
