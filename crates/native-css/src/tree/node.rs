//! Element snapshots supplied by the host.

use std::collections::BTreeMap;

use crate::parser::parse_declarations;
use crate::rules::Declaration;
use crate::selector::StateKind;

/// Interaction state of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PseudoState {
    pub hover: bool,
    pub active: bool,
    pub focus: bool,
    pub disabled: bool,
}

impl PseudoState {
    /// Read the flag for a state kind. `Empty` is structural and always reads false here.
    pub fn get(&self, kind: StateKind) -> bool {
        match kind {
            StateKind::Hover => self.hover,
            StateKind::Active => self.active,
            StateKind::Focus => self.focus,
            StateKind::Disabled => self.disabled,
            StateKind::Empty => false,
        }
    }

    /// The kinds whose flag differs between two states.
    pub fn changed_kinds(&self, other: &PseudoState) -> Vec<StateKind> {
        [StateKind::Hover, StateKind::Active, StateKind::Focus, StateKind::Disabled]
            .into_iter()
            .filter(|kind| self.get(*kind) != other.get(*kind))
            .collect()
    }
}

/// Marks an element as a size container for `@container` queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ContainerRole {
    /// `None` for an anonymous container, reachable only by unnamed queries.
    pub name: Option<String>,
}

impl ContainerRole {
    /// A container reachable by `@container <name>`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// A container reachable only by unnamed queries.
    pub fn anonymous() -> Self {
        Self { name: None }
    }

    /// Whether a query naming `name` (or no name) selects this container.
    pub fn answers(&self, name: Option<&str>) -> bool {
        match name {
            None => true,
            Some(name) => self.name.as_deref() == Some(name),
        }
    }
}

/// Snapshot of one element's style-relevant props.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementNode {
    /// Element type name for type selectors (e.g. "View").
    pub type_name: Option<String>,
    /// Native id for `#id` selectors.
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// Dataset attributes for `[name=value]` selectors.
    pub attributes: BTreeMap<String, String>,
    pub state: PseudoState,
    /// Explicit container role. Roles can also come from cascaded `container-*` declarations.
    pub container: Option<ContainerRole>,
    /// Declarations from the element's inline style.
    pub inline: Vec<Declaration>,
}

impl ElementNode {
    /// Create a snapshot for an element of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Default::default()
        }
    }

    /// Add a single class.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Add whitespace-separated classes, as found in a `className` prop.
    pub fn with_class_name(mut self, class_name: &str) -> Self {
        self.classes
            .extend(class_name.split_whitespace().map(str::to_string));
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_state(mut self, state: PseudoState) -> Self {
        self.state = state;
        self
    }

    pub fn with_container(mut self, role: ContainerRole) -> Self {
        self.container = Some(role);
        self
    }

    /// Parse and attach an inline style. Malformed declarations are dropped with a warning.
    pub fn with_inline_style(mut self, css: &str) -> Self {
        let (declarations, diagnostics) = parse_declarations(css);
        for diagnostic in diagnostics {
            tracing::warn!("inline style: {}", diagnostic);
        }
        self.inline = declarations;
        self
    }

    /// Check for a class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Whether anything other than interaction state differs.
    pub fn structure_differs(&self, other: &ElementNode) -> bool {
        self.type_name != other.type_name
            || self.id != other.id
            || self.classes != other.classes
            || self.attributes != other.attributes
            || self.container != other.container
            || self.inline != other.inline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_name_splitting() {
        let node = ElementNode::new("View").with_class_name("  p-4 group\thover:bg-red ");
        assert_eq!(node.classes, vec!["p-4", "group", "hover:bg-red"]);
        assert!(node.has_class("group"));
    }

    #[test]
    fn pseudo_state_changes() {
        let before = PseudoState::default();
        let after = PseudoState {
            hover: true,
            disabled: true,
            ..Default::default()
        };
        assert_eq!(
            before.changed_kinds(&after),
            vec![StateKind::Hover, StateKind::Disabled]
        );
        assert!(before.changed_kinds(&before).is_empty());
    }

    #[test]
    fn container_role_answers() {
        let sidebar = ContainerRole::named("sidebar");
        assert!(sidebar.answers(None));
        assert!(sidebar.answers(Some("sidebar")));
        assert!(!sidebar.answers(Some("main")));
        assert!(!ContainerRole::anonymous().answers(Some("sidebar")));
    }

    #[test]
    fn structure_ignores_state() {
        let node = ElementNode::new("View").with_class("a");
        let hovered = node.clone().with_state(PseudoState {
            hover: true,
            ..Default::default()
        });
        assert!(!node.structure_differs(&hovered));
        assert!(node.structure_differs(&node.clone().with_class("b")));
    }

    #[test]
    fn inline_style_parsing() {
        let node = ElementNode::new("View").with_inline_style("color: red; --gap: 4px; width: ;");
        assert_eq!(node.inline.len(), 2);
        assert_eq!(node.inline[1].name, "--gap");
    }
}
