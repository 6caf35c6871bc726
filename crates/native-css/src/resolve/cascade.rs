//! Property cascading logic.
//!
//! Candidate rules come from the [`SelectorIndex`]; each is matched against
//! the element, filtered by its `@container`/`@media` conditions, and its
//! declarations compete by [`CascadeRank`]. Inline declarations from the
//! element snapshot join last with the inline origin.

use std::collections::BTreeMap;

use super::container::{ContainerContext, ContainerKey, find_container};
use super::dependencies::{AncestorRequirement, Dependencies};
use crate::rules::{ColorScheme, Declaration, RuleCondition, StyleRule, StyleSheet};
use crate::selector::{CascadeRank, MatchTarget, Origin, SelectorIndex, SelectorMatcher, Specificity};
use crate::tree::{ElementNode, NodeId, NodeTree};

/// Environment a cascade is evaluated in.
#[derive(Debug, Clone, Copy)]
pub struct CascadeEnvironment<'a> {
    pub containers: &'a ContainerContext,
    pub color_scheme: ColorScheme,
}

/// A declaration that won its property, with the rank it won at.
#[derive(Debug, Clone, Copy)]
pub struct CascadedDeclaration<'a> {
    pub declaration: &'a Declaration,
    pub rank: CascadeRank,
}

/// Cascade output: the winner per property and everything consulted.
#[derive(Debug, Clone)]
pub struct DeclarationSet<'a> {
    /// Keyed by CSS property name as declared.
    pub winners: BTreeMap<String, CascadedDeclaration<'a>>,
    pub dependencies: Dependencies,
}

impl<'a> DeclarationSet<'a> {
    /// Winners from lowest to highest rank.
    ///
    /// Applying them in this order lets a longhand override a shorthand
    /// (or the other way round) exactly as the cascade decided.
    pub fn in_cascade_order(&self) -> Vec<&CascadedDeclaration<'a>> {
        let mut ordered: Vec<_> = self.winners.values().collect();
        ordered.sort_by_key(|winner| winner.rank);
        ordered
    }

    pub fn get(&self, property: &str) -> Option<&'a Declaration> {
        self.winners.get(property).map(|winner| winner.declaration)
    }

    /// Winning `--name` declarations.
    pub fn custom_properties(&self) -> impl Iterator<Item = &'a Declaration> + '_ {
        self.winners
            .values()
            .map(|winner| winner.declaration)
            .filter(|declaration| declaration.is_custom_property())
    }
}

/// Compute the winning declarations for `subject` at `id`.
///
/// `subject` may differ from the mounted snapshot, which lets an update be
/// checked before it is applied.
pub fn cascade<'a>(
    id: NodeId,
    subject: &'a ElementNode,
    tree: &NodeTree,
    sheet: &'a StyleSheet,
    index: &SelectorIndex,
    env: &CascadeEnvironment<'_>,
) -> DeclarationSet<'a> {
    let mut dependencies = Dependencies::new();
    let target = match MatchTarget::of_node(tree, id) {
        Some(target) => target.with_element(subject),
        None => MatchTarget {
            id,
            element: subject,
            is_root: true,
            child_count: 0,
        },
    };

    let mut winners = BTreeMap::new();
    for rule_index in index.candidates(subject) {
        let Some(rule) = sheet.rules.get(rule_index) else {
            continue;
        };
        if !SelectorMatcher::matches(&rule.selector, &target, tree, &mut dependencies) {
            let static_subject = rule
                .selector
                .subject()
                .is_some_and(|part| SelectorMatcher::static_matches(part, &target));
            if static_subject {
                record_missing_containers(rule, id, tree, &mut dependencies);
            }
            continue;
        }
        if !conditions_hold(rule, id, tree, env, &mut dependencies) {
            continue;
        }

        let specificity = rule.specificity_with_order();
        for (position, declaration) in rule.declarations.iter().enumerate() {
            offer(
                &mut winners,
                declaration,
                CascadeRank {
                    important: declaration.important,
                    origin: Origin::Stylesheet,
                    specificity,
                    position: position as u32,
                },
            );
        }
    }

    for (position, declaration) in subject.inline.iter().enumerate() {
        offer(
            &mut winners,
            declaration,
            CascadeRank {
                important: declaration.important,
                origin: Origin::Inline,
                specificity: Specificity::ZERO.with_order(0),
                position: position as u32,
            },
        );
    }

    DeclarationSet {
        winners,
        dependencies,
    }
}

fn offer<'a>(winners: &mut BTreeMap<String, CascadedDeclaration<'a>>, declaration: &'a Declaration, rank: CascadeRank) {
    match winners.get(&declaration.name) {
        Some(current) if current.rank > rank => {}
        _ => {
            winners.insert(declaration.name.clone(), CascadedDeclaration { declaration, rank });
        }
    }
}

/// Record `@container` conditions of a rule with no answering ancestor.
///
/// Used for rules whose subject could start matching once its own state
/// changes.
fn record_missing_containers(rule: &StyleRule, id: NodeId, tree: &NodeTree, deps: &mut Dependencies) {
    for condition in &rule.conditions {
        let RuleCondition::Container(query) = condition else {
            continue;
        };
        deps.ancestor_sensitive = true;
        if find_container(tree, id, query.name.as_deref()).is_none() {
            deps.record_missing(
                format!("{} {}", query, rule.selector),
                AncestorRequirement::Container(query.name.clone()),
            );
        }
    }
}

/// Evaluate a rule's conditions in nesting order, recording what was read.
fn conditions_hold(
    rule: &StyleRule,
    id: NodeId,
    tree: &NodeTree,
    env: &CascadeEnvironment<'_>,
    deps: &mut Dependencies,
) -> bool {
    rule.conditions.iter().all(|condition| match condition {
        RuleCondition::Container(query) => {
            // Which ancestor answers depends on the ancestors.
            deps.ancestor_sensitive = true;
            let Some(key) = find_container(tree, id, query.name.as_deref()) else {
                deps.record_missing(
                    format!("{} {}", query, rule.selector),
                    AncestorRequirement::Container(query.name.clone()),
                );
                return false;
            };
            let matched = env
                .containers
                .get(&key)
                .is_some_and(|size| query.condition.evaluate(size));
            deps.record_container(key, &query.condition, matched);
            matched
        }
        RuleCondition::Media(query) => {
            if let Some(scheme) = query.color_scheme {
                deps.color_scheme = true;
                if scheme != env.color_scheme {
                    return false;
                }
            }
            if query.viewport.is_empty() {
                return true;
            }
            let matched = env
                .containers
                .get(&ContainerKey::Viewport)
                .is_some_and(|size| query.viewport.evaluate(size));
            deps.record_container(ContainerKey::Viewport, &query.viewport, matched);
            matched
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseOptions;
    use crate::rules::Size;
    use crate::selector::StateKind;
    use crate::tree::{ContainerRole, PseudoState};

    struct Fixture {
        tree: NodeTree,
        sheet: StyleSheet,
        index: SelectorIndex,
        containers: ContainerContext,
    }

    impl Fixture {
        fn new(css: &str) -> Self {
            let sheet = StyleSheet::from_css(css, &ParseOptions::default()).stylesheet;
            let index = SelectorIndex::compile(&sheet);
            Self {
                tree: NodeTree::new(),
                sheet,
                index,
                containers: ContainerContext::new(),
            }
        }

        fn winner(&self, id: NodeId, scheme: ColorScheme, property: &str) -> Option<String> {
            self.run(id, scheme).get(property).map(|d| d.value.raw.clone())
        }

        fn run(&self, id: NodeId, scheme: ColorScheme) -> DeclarationSet<'_> {
            let env = CascadeEnvironment {
                containers: &self.containers,
                color_scheme: scheme,
            };
            let subject = self.tree.element(id).unwrap();
            cascade(id, subject, &self.tree, &self.sheet, &self.index, &env)
        }
    }

    #[test]
    fn specificity_then_source_order() {
        let mut f = Fixture::new(
            ".a { color: red; } View { color: blue; } .a { width: 1px; } .a { width: 2px; } #x { width: 3px; }",
        );
        let id = f.tree.insert(ElementNode::new("View").with_class("a"), None).unwrap();
        assert_eq!(f.winner(id, ColorScheme::Light, "color").as_deref(), Some("red"));
        assert_eq!(f.winner(id, ColorScheme::Light, "width").as_deref(), Some("2px"));

        let x = f.tree.insert(ElementNode::new("View").with_class("a").with_id("x"), None).unwrap();
        assert_eq!(f.winner(x, ColorScheme::Light, "width").as_deref(), Some("3px"));
    }

    #[test]
    fn important_and_inline_origin() {
        let mut f = Fixture::new("#x { color: red !important; width: 1px; } .a { height: 1px !important; }");
        let id = f
            .tree
            .insert(
                ElementNode::new("View")
                    .with_id("x")
                    .with_class("a")
                    .with_inline_style("color: blue; width: 5px; height: 5px !important"),
                None,
            )
            .unwrap();
        assert_eq!(f.winner(id, ColorScheme::Light, "color").as_deref(), Some("red"));
        assert_eq!(f.winner(id, ColorScheme::Light, "width").as_deref(), Some("5px"));
        assert_eq!(f.winner(id, ColorScheme::Light, "height").as_deref(), Some("5px"));
    }

    #[test]
    fn cascade_order_lets_longhands_override() {
        let mut f = Fixture::new(".a { margin: 4px; margin-top: 1px; } .b { margin-left: 2px; } .a.b { margin: 8px; }");
        let id = f
            .tree
            .insert(ElementNode::new("View").with_class("a").with_class("b"), None)
            .unwrap();
        let set = f.run(id, ColorScheme::Light);
        let order: Vec<&str> = set
            .in_cascade_order()
            .iter()
            .map(|w| w.declaration.name.as_str())
            .collect();
        assert_eq!(order, vec!["margin-top", "margin-left", "margin"]);
    }

    #[test]
    fn dynamic_pseudo_classes_are_recorded() {
        let mut f = Fixture::new(".a:hover { color: red; } .a:disabled { color: gray; }");
        let id = f
            .tree
            .insert(
                ElementNode::new("View").with_class("a").with_state(PseudoState {
                    hover: true,
                    ..Default::default()
                }),
                None,
            )
            .unwrap();
        let set = f.run(id, ColorScheme::Light);
        assert_eq!(set.get("color").map(|d| d.value.raw.as_str()), Some("red"));
        assert!(set.dependencies.reads_state(id, StateKind::Hover));
        assert!(set.dependencies.reads_state(id, StateKind::Disabled));
    }

    #[test]
    fn container_conditions() {
        let mut f = Fixture::new(
            "@container card (width > 400px) { .title { font-size: 20px; } } .title { font-size: 12px; }",
        );
        let card = f
            .tree
            .insert(ElementNode::new("View").with_container(ContainerRole::named("card")), None)
            .unwrap();
        let title = f.tree.insert(ElementNode::new("Text").with_class("title"), Some(card)).unwrap();

        // Unmeasured containers match nothing.
        let set = f.run(title, ColorScheme::Light);
        assert_eq!(set.get("font-size").map(|d| d.value.raw.as_str()), Some("12px"));
        assert_eq!(set.dependencies.containers.len(), 1);
        assert!(!set.dependencies.containers[0].matched);

        f.containers.set(ContainerKey::Named("card".into()), Size::new(500.0, 100.0));
        assert_eq!(f.winner(title, ColorScheme::Light, "font-size").as_deref(), Some("20px"));
    }

    #[test]
    fn missing_container_is_recorded() {
        let mut f = Fixture::new("@container card (width > 400px) { .title { color: red; } }");
        let title = f.tree.insert(ElementNode::new("Text").with_class("title"), None).unwrap();
        let set = f.run(title, ColorScheme::Light);
        assert!(set.winners.is_empty());
        assert_eq!(set.dependencies.missing_ancestors.len(), 1);
        assert_eq!(
            set.dependencies.missing_ancestors[0].requirement,
            AncestorRequirement::Container(Some("card".into()))
        );
    }

    #[test]
    fn missing_container_is_recorded_for_unmatched_state() {
        let mut f = Fixture::new(
            "@container card (width > 400px) { .title:hover { color: red; } .badge:hover { color: blue; } }",
        );
        let title = f.tree.insert(ElementNode::new("Text").with_class("title"), None).unwrap();
        let set = f.run(title, ColorScheme::Light);
        assert!(set.winners.is_empty());
        assert!(set.dependencies.ancestor_sensitive);
        assert_eq!(set.dependencies.missing_ancestors.len(), 1);
        assert_eq!(
            set.dependencies.missing_ancestors[0].selector,
            "@container card (width > 400px) .title:hover"
        );
    }

    #[test]
    fn color_scheme_and_viewport_media() {
        let mut f = Fixture::new(
            ".a { color: black; } @media (prefers-color-scheme: dark) { .a { color: white; } } \
             @media (min-width: 600px) { .a { width: 10px; } }",
        );
        let id = f.tree.insert(ElementNode::new("View").with_class("a"), None).unwrap();

        let light = f.run(id, ColorScheme::Light);
        assert_eq!(light.get("color").map(|d| d.value.raw.as_str()), Some("black"));
        assert!(light.dependencies.color_scheme);
        assert!(light.get("width").is_none());
        assert_eq!(f.winner(id, ColorScheme::Dark, "color").as_deref(), Some("white"));

        f.containers.set(ContainerKey::Viewport, Size::new(800.0, 600.0));
        assert_eq!(f.winner(id, ColorScheme::Light, "width").as_deref(), Some("10px"));
    }

    #[test]
    fn custom_property_winners() {
        let mut f = Fixture::new(":root { --gap: 4px; } .a { --gap: 8px; --tone: red; }");
        let id = f.tree.insert(ElementNode::new("View").with_class("a"), None).unwrap();
        let set = f.run(id, ColorScheme::Light);
        let mut names: Vec<&str> = set.custom_properties().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["--gap", "--tone"]);
        assert_eq!(set.get("--gap").map(|d| d.value.raw.as_str()), Some("8px"));
    }
}
