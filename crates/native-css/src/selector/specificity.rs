//! Specificity calculation and cascade ranking.

use super::{PseudoClass, Selector, SelectorPart, TypeSelector};

/// CSS specificity as (a, b, c) tuple.
///
/// - a: ID selectors
/// - b: Class selectors, attributes, pseudo-classes
/// - c: Type selectors
///
/// Compared lexicographically: (1,0,0) > (0,99,99)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl Specificity {
    /// Zero specificity (universal selector).
    pub const ZERO: Self = Self(0, 0, 0);

    /// Calculate specificity of a selector.
    pub fn of_selector(selector: &Selector) -> Self {
        let mut a = 0u32;
        let mut b = 0u32;
        let mut c = 0u32;

        for part in &selector.parts {
            Self::add_part(part, &mut a, &mut b, &mut c);
        }

        Self(a, b, c)
    }

    /// Calculate specificity of a selector part.
    pub fn of_part(part: &SelectorPart) -> Self {
        let mut a = 0u32;
        let mut b = 0u32;
        let mut c = 0u32;
        Self::add_part(part, &mut a, &mut b, &mut c);
        Self(a, b, c)
    }

    fn add_part(part: &SelectorPart, a: &mut u32, b: &mut u32, c: &mut u32) {
        if part.id.is_some() {
            *a += 1;
        }

        *b += part.classes.len() as u32;
        *b += part.attributes.len() as u32;

        for pseudo in &part.pseudo_classes {
            match pseudo {
                // :not() counts as its argument
                PseudoClass::Not(inner) => Self::add_part(inner, a, b, c),
                _ => *b += 1,
            }
        }

        if let Some(TypeSelector::Type(_)) = &part.type_selector {
            *c += 1;
        }
    }

    /// Combine with source order for complete ordering.
    pub fn with_order(self, order: u32) -> SpecificityWithOrder {
        SpecificityWithOrder {
            specificity: self,
            order,
        }
    }
}

impl std::fmt::Display for Specificity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{},{})", self.0, self.1, self.2)
    }
}

/// Specificity combined with source order for tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecificityWithOrder {
    /// The CSS specificity value.
    pub specificity: Specificity,
    /// Source order for tie-breaking (higher = later in stylesheet).
    pub order: u32,
}

/// Where a declaration came from. Later variants win at equal importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Origin {
    Stylesheet,
    Inline,
}

/// Total order of competing declarations; the greatest rank wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CascadeRank {
    pub important: bool,
    pub origin: Origin,
    pub specificity: SpecificityWithOrder,
    /// Position of the declaration within its block.
    pub position: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::AttributeSelector;

    #[test]
    fn specificity_calculation() {
        assert_eq!(Specificity::of_selector(&Selector::universal()), Specificity(0, 0, 0));
        assert_eq!(Specificity::of_selector(&Selector::type_selector("View")), Specificity(0, 0, 1));
        assert_eq!(Specificity::of_selector(&Selector::class("primary")), Specificity(0, 1, 0));
        assert_eq!(Specificity::of_selector(&Selector::id("submit")), Specificity(1, 0, 0));

        // View.primary[data-state]:hover -> (0,3,1)
        let sel = Selector::compound(
            SelectorPart::type_only("View")
                .with_class("primary")
                .with_attribute(AttributeSelector::exists("data-state"))
                .with_pseudo(PseudoClass::Hover),
        );
        assert_eq!(Specificity::of_selector(&sel), Specificity(0, 3, 1));

        // .group:hover .icon -> (0,3,0)
        let sel = Selector::compound(SelectorPart::class_only("group").with_pseudo(PseudoClass::Hover))
            .descendant(SelectorPart::class_only("icon"));
        assert_eq!(Specificity::of_selector(&sel), Specificity(0, 3, 0));
    }

    #[test]
    fn specificity_comparison() {
        assert!(Specificity(1, 0, 0) > Specificity(0, 99, 99));
        assert!(Specificity(0, 1, 0) > Specificity(0, 0, 99));
        assert!(Specificity(0, 2, 0) > Specificity(0, 1, 0));
    }

    #[test]
    fn specificity_with_order() {
        let s1 = Specificity(0, 1, 0).with_order(1);
        let s2 = Specificity(0, 1, 0).with_order(2);
        let s3 = Specificity(0, 2, 0).with_order(0);

        assert!(s3 > s1);
        assert!(s3 > s2);
        assert!(s2 > s1);
    }

    #[test]
    fn not_pseudo_class_specificity() {
        let sel = Selector::compound(
            SelectorPart::new().with_pseudo(PseudoClass::Not(Box::new(SelectorPart::class_only("primary")))),
        );
        assert_eq!(Specificity::of_selector(&sel), Specificity(0, 1, 0));
    }

    #[test]
    fn cascade_rank_ordering() {
        let rank = |important, origin, specificity: Specificity, order| CascadeRank {
            important,
            origin,
            specificity: specificity.with_order(order),
            position: 0,
        };
        // !important beats higher specificity.
        assert!(
            rank(true, Origin::Stylesheet, Specificity(0, 0, 1), 0)
                > rank(false, Origin::Stylesheet, Specificity(1, 0, 0), 5)
        );
        // Inline beats stylesheet at equal importance.
        assert!(
            rank(false, Origin::Inline, Specificity::ZERO, 0)
                > rank(false, Origin::Stylesheet, Specificity(1, 0, 0), 5)
        );
        // Important stylesheet declarations beat normal inline ones.
        assert!(
            rank(true, Origin::Stylesheet, Specificity::ZERO, 0)
                > rank(false, Origin::Inline, Specificity::ZERO, 9)
        );
    }
}
