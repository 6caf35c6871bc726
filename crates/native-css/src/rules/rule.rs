//! Style rules and their declarations.

use crate::rules::RuleCondition;
use crate::selector::{Selector, Specificity, SpecificityWithOrder};
use crate::types::{ComponentValue, components_to_string};

/// A declared value: the source text plus its pre-parsed components.
///
/// The text is kept because `var()` substitution works on tokens and the
/// substituted value must be parsed again.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredValue {
    /// Trimmed source text, without `!important`.
    pub raw: String,
    pub components: Vec<ComponentValue>,
}

impl DeclaredValue {
    pub fn new(raw: impl Into<String>, components: Vec<ComponentValue>) -> Self {
        Self {
            raw: raw.into(),
            components,
        }
    }

    /// Build a value from components, serializing them as the source text.
    pub fn from_components(components: Vec<ComponentValue>) -> Self {
        Self {
            raw: components_to_string(&components),
            components,
        }
    }

    /// Whether resolution needs a `var()` substitution pass.
    pub fn has_references(&self) -> bool {
        self.components.iter().any(ComponentValue::has_reference)
    }
}

/// A single `property: value [!important]` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// CSS property name as written, lowercased (custom properties keep their case).
    pub name: String,
    pub value: DeclaredValue,
    pub important: bool,
}

impl Declaration {
    pub fn new(name: impl Into<String>, value: DeclaredValue, important: bool) -> Self {
        Self {
            name: name.into(),
            value,
            important,
        }
    }

    /// Whether this declares a `--custom` property.
    pub fn is_custom_property(&self) -> bool {
        self.name.starts_with("--")
    }
}

/// A style rule mapping a selector to declarations.
///
/// Each rule has:
/// - A selector that determines which elements it applies to
/// - Declarations to apply when the selector (and every condition) matches
/// - Pre-computed specificity for efficient sorting
/// - Source order for tie-breaking
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selector: Selector,
    pub declarations: Vec<Declaration>,
    /// Enclosing `@container` / `@media` conditions, outermost first.
    pub conditions: Vec<RuleCondition>,
    pub specificity: Specificity,
    /// Source order (for tie-breaking when specificity is equal).
    pub order: u32,
}

impl StyleRule {
    /// Create a new unconditional style rule.
    pub fn new(selector: Selector, declarations: Vec<Declaration>, order: u32) -> Self {
        let specificity = Specificity::of_selector(&selector);
        Self {
            selector,
            declarations,
            conditions: Vec::new(),
            specificity,
            order,
        }
    }

    /// Nest the rule under conditions.
    pub fn with_conditions(mut self, conditions: Vec<RuleCondition>) -> Self {
        self.conditions = conditions;
        self
    }

    /// Get the specificity with source order for comparison.
    pub fn specificity_with_order(&self) -> SpecificityWithOrder {
        self.specificity.with_order(self.order)
    }
}
