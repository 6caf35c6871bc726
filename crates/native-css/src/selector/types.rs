//! Selector type definitions.

use std::fmt;

/// A complete selector (e.g., ".card:hover > .title").
///
/// A selector consists of one or more compound parts connected by combinators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    /// Chain of compound parts, outermost ancestor first.
    pub parts: Vec<SelectorPart>,
    /// Combinators between parts (length = parts.len() - 1).
    pub combinators: Vec<Combinator>,
}

impl Selector {
    /// Create a selector from a single compound.
    pub fn compound(part: SelectorPart) -> Self {
        Self {
            parts: vec![part],
            combinators: vec![],
        }
    }

    /// Create a simple type selector.
    pub fn type_selector(type_name: impl Into<String>) -> Self {
        Self::compound(SelectorPart::type_only(type_name))
    }

    /// Create a universal selector (*).
    pub fn universal() -> Self {
        Self::compound(SelectorPart::universal())
    }

    /// Create a class selector.
    pub fn class(class_name: impl Into<String>) -> Self {
        Self::compound(SelectorPart::class_only(class_name))
    }

    /// Create an ID selector.
    pub fn id(id: impl Into<String>) -> Self {
        Self::compound(SelectorPart::id_only(id))
    }

    /// Add a descendant selector part.
    pub fn descendant(mut self, part: SelectorPart) -> Self {
        if !self.parts.is_empty() {
            self.combinators.push(Combinator::Descendant);
        }
        self.parts.push(part);
        self
    }

    /// Add a child selector part.
    pub fn child(mut self, part: SelectorPart) -> Self {
        if !self.parts.is_empty() {
            self.combinators.push(Combinator::Child);
        }
        self.parts.push(part);
        self
    }

    /// Prepend a scope compound joined by a descendant combinator.
    pub fn scoped(mut self, scope: SelectorPart) -> Self {
        self.parts.insert(0, scope);
        self.combinators.insert(0, Combinator::Descendant);
        self
    }

    /// Get the rightmost (subject) selector part.
    pub fn subject(&self) -> Option<&SelectorPart> {
        self.parts.last()
    }

    /// Whether matching consults any element other than the subject.
    pub fn has_ancestors(&self) -> bool {
        self.parts.len() > 1
    }

    /// Whether the subject carries `:root`.
    pub fn is_root(&self) -> bool {
        self.subject()
            .is_some_and(|part| part.pseudo_classes.contains(&PseudoClass::Root))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                match &self.combinators[i - 1] {
                    Combinator::Descendant => write!(f, " ")?,
                    Combinator::Child => write!(f, " > ")?,
                }
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

/// A single compound selector (e.g., "Text.title[data-state=open]:hover").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SelectorPart {
    /// Type selector (element type name or universal).
    pub type_selector: Option<TypeSelector>,
    /// ID selector (#id).
    pub id: Option<String>,
    /// Class selectors (.class).
    pub classes: Vec<String>,
    /// Attribute predicates ([data-state=open]).
    pub attributes: Vec<AttributeSelector>,
    /// Pseudo-class selectors (:hover, :active, etc.).
    pub pseudo_classes: Vec<PseudoClass>,
}

impl SelectorPart {
    /// Create a new empty selector part.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a type-only selector.
    pub fn type_only(type_name: impl Into<String>) -> Self {
        Self {
            type_selector: Some(TypeSelector::Type(type_name.into())),
            ..Default::default()
        }
    }

    /// Create a universal selector part.
    pub fn universal() -> Self {
        Self {
            type_selector: Some(TypeSelector::Universal),
            ..Default::default()
        }
    }

    /// Create a class-only selector.
    pub fn class_only(class_name: impl Into<String>) -> Self {
        Self {
            classes: vec![class_name.into()],
            ..Default::default()
        }
    }

    /// Create an ID-only selector.
    pub fn id_only(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Add a class selector.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Add an attribute predicate.
    pub fn with_attribute(mut self, attribute: AttributeSelector) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add a pseudo-class selector.
    pub fn with_pseudo(mut self, pseudo: PseudoClass) -> Self {
        self.pseudo_classes.push(pseudo);
        self
    }

    /// Check if the part has no constraints at all.
    pub fn is_empty(&self) -> bool {
        self.type_selector.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.pseudo_classes.is_empty()
    }

    /// Whether any pseudo-class depends on interaction state.
    pub fn has_dynamic_pseudo(&self) -> bool {
        self.pseudo_classes.iter().any(PseudoClass::is_dynamic)
    }

    /// The same compound with interaction pseudo-classes removed.
    ///
    /// This is the part an ancestor must match statically to act as a group.
    pub fn without_dynamic_pseudo(&self) -> Self {
        Self {
            pseudo_classes: self
                .pseudo_classes
                .iter()
                .filter(|p| !p.is_dynamic())
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}

impl fmt::Display for SelectorPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_selector {
            Some(TypeSelector::Universal) => write!(f, "*")?,
            Some(TypeSelector::Type(t)) => write!(f, "{}", t)?,
            None => {}
        }

        if let Some(id) = &self.id {
            f.write_str("#")?;
            cssparser::serialize_identifier(id, f)?;
        }

        for class in &self.classes {
            f.write_str(".")?;
            cssparser::serialize_identifier(class, f)?;
        }

        for attribute in &self.attributes {
            write!(f, "{}", attribute)?;
        }

        for pseudo in &self.pseudo_classes {
            write!(f, ":{}", pseudo)?;
        }

        if self.is_empty() {
            write!(f, "*")?;
        }

        Ok(())
    }
}

/// Type selector - matches the element type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSelector {
    /// Universal selector (*) - matches any element.
    Universal,
    /// Specific element type name (e.g., "View", "Text").
    Type(String),
}

/// Attribute predicate matched against the element's dataset snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeSelector {
    pub name: String,
    /// `None` tests for presence only.
    pub value: Option<String>,
}

impl AttributeSelector {
    /// `[name]`
    pub fn exists(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// `[name="value"]`
    pub fn equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "[{}=\"{}\"]", self.name, value),
            None => write!(f, "[{}]", self.name),
        }
    }
}

/// Combinator between selector parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Descendant (space): matches any descendant.
    Descendant,
    /// Child (>): matches direct children only.
    Child,
}

/// Pseudo-class selectors for element state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    /// Pointer is over the element.
    Hover,
    /// Element is being pressed.
    Active,
    /// Element has focus.
    Focus,
    /// Element is disabled.
    Disabled,
    /// Element is enabled.
    Enabled,
    /// Element has no children.
    Empty,
    /// Element has no parent.
    Root,
    /// Negation of a static compound.
    Not(Box<SelectorPart>),
}

impl PseudoClass {
    /// Parse a pseudo-class name, accepting the native aliases.
    pub fn from_css(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "hover" => Self::Hover,
            "active" | "pressed" => Self::Active,
            "focus" | "focused" => Self::Focus,
            "disabled" => Self::Disabled,
            "enabled" => Self::Enabled,
            "empty" => Self::Empty,
            "root" => Self::Root,
            _ => return None,
        })
    }

    /// Whether matching depends on interaction state.
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            Self::Hover | Self::Active | Self::Focus | Self::Disabled | Self::Enabled
        )
    }

    /// The tracked state this pseudo-class reads, if any.
    pub fn state_kind(&self) -> Option<StateKind> {
        match self {
            Self::Hover => Some(StateKind::Hover),
            Self::Active => Some(StateKind::Active),
            Self::Focus => Some(StateKind::Focus),
            Self::Disabled | Self::Enabled => Some(StateKind::Disabled),
            Self::Empty => Some(StateKind::Empty),
            Self::Root | Self::Not(_) => None,
        }
    }
}

impl fmt::Display for PseudoClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hover => write!(f, "hover"),
            Self::Active => write!(f, "active"),
            Self::Focus => write!(f, "focus"),
            Self::Disabled => write!(f, "disabled"),
            Self::Enabled => write!(f, "enabled"),
            Self::Empty => write!(f, "empty"),
            Self::Root => write!(f, "root"),
            Self::Not(inner) => write!(f, "not({})", inner),
        }
    }
}

/// A piece of element state whose changes can invalidate a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateKind {
    Hover,
    Active,
    Focus,
    Disabled,
    /// Child count reaching or leaving zero.
    Empty,
}
