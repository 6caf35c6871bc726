//! Main style resolution engine.
//!
//! The engine owns the registered stylesheet, the mirrored element tree
//! and every measurement and variable feed. Styles are computed lazily on
//! first read and recomputed when a recorded dependency changes:
//!
//! - pseudo-state changes recompute synchronously;
//! - layout, custom property and color scheme writes are queued and settle
//!   together on [`StyleEngine::flush`];
//! - recomputes run ancestors first, and the [`StyleApplier`] only hears
//!   about property maps that actually changed.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::cache::{DependencySnapshot, Resolution, SnapshotSource, StyleCache};
use super::cascade::{CascadeEnvironment, DeclarationSet, cascade};
use super::container::{ContainerContext, ContainerKey, container_key};
use super::dependencies::{AncestorRequirement, Dependencies};
use super::values::{ResolveContext, resolve_declaration};
use super::variables::VariableSource;
use crate::applier::StyleApplier;
use crate::parser::{ParseDiagnostic, ParseOptions, parse_stylesheet};
use crate::rules::{ColorScheme, Keyframes, Size, SizeCondition, StyleSheet};
use crate::selector::{IndexStats, MatchTarget, SelectorIndex, SelectorMatcher, StateKind};
use crate::style::ComputedStyle;
use crate::tree::{BindingState, ContainerRole, ElementNode, NodeId, NodeTree, PseudoState};
use crate::types::{ComponentValue, ResolvedValue, UnitKind};
use crate::{Error, Result};

/// Engine-wide settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Basis for `rem`, and the font size of root elements.
    pub root_font_size: f32,
    /// Initial color scheme for `prefers-color-scheme`.
    pub color_scheme: ColorScheme,
    /// Previous resolutions kept per node; 0 disables the cache.
    pub cache_entries_per_node: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root_font_size: 16.0,
            color_scheme: ColorScheme::Light,
            cache_entries_per_node: 8,
        }
    }
}

/// A size report for a named container.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutMeasurement {
    pub container: String,
    pub width: f32,
    pub height: f32,
}

/// One keyframe resolved against an element.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedKeyframe {
    /// Position in the animation, 0 to 1.
    pub offset: f32,
    pub style: ComputedStyle,
}

/// A write held back until the next flush.
#[derive(Debug, Clone)]
enum Deferred {
    Layout(ContainerKey, Size),
    NodeLayout(NodeId, Size),
    CustomProperty(NodeId, String, Option<String>),
    RootVariable(String, Option<String>),
    ColorScheme(ColorScheme),
}

impl Deferred {
    fn node(&self) -> Option<NodeId> {
        match self {
            Self::NodeLayout(id, _) | Self::CustomProperty(id, _, _) => Some(*id),
            _ => None,
        }
    }
}

/// The reactive style runtime.
pub struct StyleEngine {
    config: EngineConfig,
    stylesheet: StyleSheet,
    index: SelectorIndex,
    tree: NodeTree,
    containers: ContainerContext,
    root_variables: BTreeMap<String, String>,
    cache: StyleCache,
    /// Stale nodes awaiting recompute, shallowest first.
    pending: BTreeSet<(usize, NodeId)>,
    deferred: Vec<Deferred>,
    applier: Option<Box<dyn StyleApplier>>,
}

impl Default for StyleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleEngine {
    /// Create an engine with the default configuration and no stylesheet.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            stylesheet: StyleSheet::new(),
            index: SelectorIndex::default(),
            tree: NodeTree::new(),
            containers: ContainerContext::new(),
            root_variables: BTreeMap::new(),
            cache: StyleCache::with_capacity(config.cache_entries_per_node),
            pending: BTreeSet::new(),
            deferred: Vec::new(),
            applier: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The mirrored element tree.
    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn stylesheet(&self) -> &StyleSheet {
        &self.stylesheet
    }

    /// Bucket sizes of the compiled selector index.
    pub fn index_stats(&self) -> IndexStats {
        self.index.stats()
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.config.color_scheme
    }

    /// Number of cached resolutions across all nodes.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Install the receiver for changed styles.
    pub fn set_applier(&mut self, applier: impl StyleApplier + 'static) {
        self.applier = Some(Box::new(applier));
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Parse and register a stylesheet, replacing the current one.
    ///
    /// Returns the parse diagnostics; the well-formed remainder of the sheet
    /// is registered regardless. Every bound node is recomputed and only
    /// nodes whose values changed reach the applier.
    #[tracing::instrument(skip_all, target = "native_css::runtime", fields(bytes = css.len()))]
    pub fn register_css(&mut self, css: &str, options: &ParseOptions) -> Vec<ParseDiagnostic> {
        let output = parse_stylesheet(css, options);
        self.register_stylesheet(output.stylesheet);
        output.diagnostics
    }

    /// Read, parse and register a stylesheet file.
    pub fn load_css_file(&mut self, path: impl AsRef<Path>, options: &ParseOptions) -> Result<Vec<ParseDiagnostic>> {
        let output = StyleSheet::from_file(path, options)?;
        self.register_stylesheet(output.stylesheet);
        Ok(output.diagnostics)
    }

    /// Register an already parsed stylesheet, replacing the current one.
    pub fn register_stylesheet(&mut self, stylesheet: StyleSheet) {
        self.index = SelectorIndex::compile(&stylesheet);
        self.stylesheet = stylesheet;
        self.cache.invalidate_all();
        tracing::debug!(
            target: "native_css::runtime",
            rules = self.stylesheet.len(),
            keyframes = self.stylesheet.keyframes.len(),
            "stylesheet registered"
        );
        self.invalidate_everything();
        self.process_pending();
    }

    /// Change the `rem` basis; every bound node is recomputed.
    pub fn set_root_font_size(&mut self, size: f32) {
        if self.config.root_font_size == size {
            return;
        }
        self.config.root_font_size = size;
        self.cache.invalidate_all();
        self.invalidate_everything();
        self.process_pending();
    }

    pub fn keyframes(&self, name: &str) -> Option<&Keyframes> {
        self.stylesheet.keyframes(name)
    }

    // =========================================================================
    // Element lifecycle
    // =========================================================================

    /// Mount an element under `parent`. The node starts out unbound.
    pub fn mount(&mut self, element: ElementNode, parent: Option<NodeId>) -> Result<NodeId> {
        let id = self.tree.insert(element, parent)?;
        tracing::trace!(target: "native_css::runtime", ?id, ?parent, "mounted (unbound)");
        if let Some(parent) = parent {
            self.invalidate_readers(parent, StateKind::Empty)?;
            self.process_pending();
        }
        Ok(id)
    }

    /// Replace an element's snapshot.
    ///
    /// Fails with [`Error::StructuralConfiguration`] when the new snapshot
    /// would introduce a group or container role that an already-resolved
    /// descendant selector needed but did not find; the update is then not
    /// applied.
    pub fn update(&mut self, id: NodeId, element: ElementNode) -> Result<()> {
        let current = self.tree.element(id).ok_or(Error::UnknownNode(id))?;
        if !current.structure_differs(&element) {
            return self.set_pseudo_state(id, element.state);
        }

        self.check_structure(id, &element)?;

        let changed_states = current.state.changed_kinds(&element.state);
        if let Some(data) = self.tree.get_mut(id) {
            data.element = element;
        }
        tracing::trace!(target: "native_css::runtime", ?id, "snapshot updated");

        self.cache.invalidate(id);
        self.invalidate(id);
        for descendant in self.tree.descendants(id)? {
            // Ancestor snapshots are not part of the cache key.
            self.cache.invalidate(descendant);
            let sensitive = self
                .dependencies_of(descendant)
                .is_some_and(|deps| deps.ancestor_sensitive);
            if sensitive {
                self.invalidate(descendant);
            }
        }
        for kind in changed_states {
            self.invalidate_readers(id, kind)?;
        }

        self.process_pending();
        Ok(())
    }

    /// Release an element and its subtree.
    ///
    /// Pending recomputes and queued writes for the subtree are dropped.
    pub fn unmount(&mut self, id: NodeId) -> Result<()> {
        if !self.tree.contains(id) {
            return Err(Error::UnknownNode(id));
        }
        let parent = self.tree.parent(id);
        let removed: BTreeSet<NodeId> = self.tree.remove(id)?.into_iter().collect();

        for node in &removed {
            self.cache.invalidate(*node);
            self.containers.remove(&ContainerKey::Anonymous(*node));
        }
        self.pending.retain(|(_, node)| !removed.contains(node));
        self.deferred
            .retain(|event| event.node().is_none_or(|node| !removed.contains(&node)));
        tracing::trace!(target: "native_css::runtime", ?id, count = removed.len(), "released");

        if let Some(parent) = parent {
            self.invalidate_readers(parent, StateKind::Empty)?;
            self.process_pending();
        }
        Ok(())
    }

    /// Binding state of a node. Unknown ids read as released.
    pub fn binding_state(&self, id: NodeId) -> BindingState {
        self.tree.get(id).map_or(BindingState::Released, |data| data.binding())
    }

    /// The node's current style, resolving it (and any unbound or stale
    /// ancestors) first.
    pub fn style(&mut self, id: NodeId) -> Result<&ComputedStyle> {
        self.ensure_resolved(id)?;
        self.tree
            .get(id)
            .and_then(|data| data.style.as_ref())
            .ok_or(Error::UnknownNode(id))
    }

    /// The last computed style without resolving anything.
    pub fn last_style(&self, id: NodeId) -> Option<&ComputedStyle> {
        self.tree.get(id).and_then(|data| data.style.as_ref())
    }

    /// Resolve a `@keyframes` block against a node's variables and font size.
    ///
    /// Returns `None` when no keyframes of that name are registered. Frames
    /// listing several offsets are returned once per offset, sorted.
    pub fn resolve_keyframes(&mut self, id: NodeId, name: &str) -> Result<Option<Vec<ResolvedKeyframe>>> {
        self.ensure_resolved(id)?;
        let Some(keyframes) = self.stylesheet.keyframes(name) else {
            return Ok(None);
        };
        let data = self.tree.get(id).ok_or(Error::UnknownNode(id))?;
        let parent_font_size = self.parent_font_size(id);

        let mut dependencies = Dependencies::new();
        let mut variables = NodeVariables {
            tree: &self.tree,
            id,
            inline: &data.inline_variables,
            declared: &data.declared_variables,
            root: &self.root_variables,
            dependencies: &mut dependencies,
        };

        let mut frames = Vec::new();
        for frame in &keyframes.frames {
            let mut style = ComputedStyle::new();
            let mut individual = Vec::new();
            for declaration in frame.declarations.iter().filter(|d| !d.is_custom_property()) {
                let mut ctx = ResolveContext {
                    font_size: data.font_size,
                    parent_font_size,
                    root_font_size: self.config.root_font_size,
                    variables: &mut variables,
                };
                let resolved = resolve_declaration(&declaration.name, &declaration.value, &mut ctx);
                insert_resolved(&mut style, &mut individual, &declaration.name, resolved);
            }
            if !individual.is_empty() {
                style.extend_transform(individual);
            }
            for offset in &frame.offsets {
                frames.push(ResolvedKeyframe {
                    offset: *offset,
                    style: style.clone(),
                });
            }
        }
        frames.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Ok(Some(frames))
    }

    // =========================================================================
    // Event feeds
    // =========================================================================

    /// Set a node's interaction state and recompute affected nodes now.
    pub fn set_pseudo_state(&mut self, id: NodeId, state: PseudoState) -> Result<()> {
        let data = self.tree.get_mut(id).ok_or(Error::UnknownNode(id))?;
        let changed = data.element.state.changed_kinds(&state);
        data.element.state = state;
        if changed.is_empty() {
            return Ok(());
        }
        tracing::trace!(target: "native_css::runtime", ?id, ?changed, "pseudo-state changed");

        for kind in changed {
            self.invalidate_readers(id, kind)?;
        }
        self.process_pending();
        Ok(())
    }

    /// Queue a size report for a named container.
    pub fn report_layout(&mut self, measurement: LayoutMeasurement) {
        self.deferred.push(Deferred::Layout(
            ContainerKey::Named(measurement.container),
            Size::new(measurement.width, measurement.height),
        ));
    }

    /// Queue a size report for a container element (named or not).
    pub fn report_node_layout(&mut self, id: NodeId, width: f32, height: f32) -> Result<()> {
        if !self.tree.contains(id) {
            return Err(Error::UnknownNode(id));
        }
        self.deferred.push(Deferred::NodeLayout(id, Size::new(width, height)));
        Ok(())
    }

    /// Queue a window size report for `@media` size features.
    pub fn report_viewport(&mut self, width: f32, height: f32) {
        self.deferred
            .push(Deferred::Layout(ContainerKey::Viewport, Size::new(width, height)));
    }

    /// Queue a host write of a custom property on a node (`None` removes it).
    pub fn set_custom_property(&mut self, id: NodeId, name: impl Into<String>, value: Option<&str>) -> Result<()> {
        if !self.tree.contains(id) {
            return Err(Error::UnknownNode(id));
        }
        self.deferred.push(Deferred::CustomProperty(
            id,
            name.into(),
            value.map(str::to_string),
        ));
        Ok(())
    }

    /// Queue a write of a global variable visible to every node.
    pub fn set_root_variable(&mut self, name: impl Into<String>, value: Option<&str>) {
        self.deferred
            .push(Deferred::RootVariable(name.into(), value.map(str::to_string)));
    }

    /// Queue a color scheme change.
    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.deferred.push(Deferred::ColorScheme(scheme));
    }

    /// Whether queued writes or stale nodes are waiting for a flush.
    pub fn has_pending_work(&self) -> bool {
        !self.deferred.is_empty() || !self.pending.is_empty()
    }

    /// Apply queued writes and recompute every node they invalidated.
    ///
    /// Writes are applied together first, so a batch is judged by its
    /// settled values: a container that shrinks and grows back within one
    /// batch invalidates nothing. Returns the number of nodes recomputed.
    pub fn flush(&mut self) -> usize {
        let events = std::mem::take(&mut self.deferred);
        let scheme_before = self.config.color_scheme;
        let mut touched = BTreeSet::new();
        let mut node_variables: BTreeMap<(NodeId, String), Option<String>> = BTreeMap::new();
        let mut root_variables: BTreeMap<String, Option<String>> = BTreeMap::new();

        tracing::debug!(target: "native_css::runtime", events = events.len(), "flush");
        for event in events {
            match event {
                Deferred::Layout(key, size) => {
                    self.containers.set(key.clone(), size);
                    touched.insert(key);
                }
                Deferred::NodeLayout(id, size) => {
                    if !self.tree.contains(id) {
                        continue;
                    }
                    let key = container_key(&self.tree, id).unwrap_or(ContainerKey::Anonymous(id));
                    self.containers.set(key.clone(), size);
                    touched.insert(key);
                }
                Deferred::CustomProperty(id, name, value) => {
                    let Some(data) = self.tree.get_mut(id) else {
                        continue;
                    };
                    let previous = match value {
                        Some(value) => data.inline_variables.insert(name.clone(), value),
                        None => data.inline_variables.remove(&name),
                    };
                    node_variables.entry((id, name)).or_insert(previous);
                }
                Deferred::RootVariable(name, value) => {
                    let previous = match value {
                        Some(value) => self.root_variables.insert(name.clone(), value),
                        None => self.root_variables.remove(&name),
                    };
                    root_variables.entry(name).or_insert(previous);
                }
                Deferred::ColorScheme(scheme) => self.config.color_scheme = scheme,
            }
        }

        for ((id, name), original) in node_variables {
            let current = self
                .tree
                .get(id)
                .and_then(|data| data.inline_variables.get(&name));
            if current == original.as_ref() {
                continue;
            }
            let mut affected = vec![id];
            affected.extend(self.tree.descendants(id).unwrap_or_default());
            self.invalidate_where(affected, |deps| deps.reads_variable(&name));
        }

        for (name, original) in root_variables {
            if self.root_variables.get(&name) == original.as_ref() {
                continue;
            }
            let all: Vec<NodeId> = self.tree.ids().collect();
            self.invalidate_where(all, |deps| deps.reads_variable(&name));
        }

        if self.config.color_scheme != scheme_before {
            tracing::debug!(target: "native_css::runtime", scheme = %self.config.color_scheme, "color scheme changed");
            let all: Vec<NodeId> = self.tree.ids().collect();
            self.invalidate_where(all, |deps| deps.color_scheme);
        }

        if !touched.is_empty() {
            let flipped: Vec<NodeId> = self
                .tree
                .ids()
                .filter(|id| {
                    self.dependencies_of(*id).is_some_and(|deps| {
                        touched.iter().any(|key| {
                            deps.container_flipped(key, |condition| {
                                self.containers
                                    .get(key)
                                    .is_some_and(|size| condition.evaluate(size))
                            })
                        })
                    })
                })
                .collect();
            for id in flipped {
                self.invalidate(id);
            }
        }

        self.process_pending()
    }

    // =========================================================================
    // Invalidation
    // =========================================================================

    fn dependencies_of(&self, id: NodeId) -> Option<&Dependencies> {
        self.tree
            .get(id)
            .and_then(|data| data.style.as_ref())
            .map(ComputedStyle::dependencies)
    }

    /// Bound -> Stale, queueing the recompute.
    fn invalidate(&mut self, id: NodeId) {
        let Some(data) = self.tree.get_mut(id) else {
            return;
        };
        if data.binding == BindingState::Bound {
            data.binding = BindingState::Stale;
            tracing::trace!(target: "native_css::runtime", ?id, "bound -> stale");
        }
        if data.binding == BindingState::Stale {
            self.pending.insert((data.depth, id));
        }
    }

    fn invalidate_where(&mut self, ids: Vec<NodeId>, predicate: impl Fn(&Dependencies) -> bool) {
        let stale: Vec<NodeId> = ids
            .into_iter()
            .filter(|id| self.dependencies_of(*id).is_some_and(&predicate))
            .collect();
        for id in stale {
            self.invalidate(id);
        }
    }

    /// Invalidate `node` and descendants that read `kind` from `node`.
    fn invalidate_readers(&mut self, node: NodeId, kind: StateKind) -> Result<()> {
        let mut affected = vec![node];
        affected.extend(self.tree.descendants(node)?);
        self.invalidate_where(affected, |deps| deps.reads_state(node, kind));
        Ok(())
    }

    fn invalidate_everything(&mut self) {
        let all: Vec<NodeId> = self.tree.ids().collect();
        for id in all {
            self.invalidate(id);
        }
    }

    /// Fail if `element` would introduce a role some descendant recorded as missing.
    fn check_structure(&self, id: NodeId, element: &ElementNode) -> Result<()> {
        let old_target = MatchTarget::of_node(&self.tree, id).ok_or(Error::UnknownNode(id))?;
        let new_target = old_target.with_element(element);
        let mut new_role: Option<Option<ContainerRole>> = None;

        for descendant in self.tree.descendants(id)? {
            let Some(deps) = self.dependencies_of(descendant) else {
                continue;
            };
            for missing in &deps.missing_ancestors {
                let introduced = match &missing.requirement {
                    AncestorRequirement::Group(part) => {
                        SelectorMatcher::static_matches(part, &new_target)
                            && !SelectorMatcher::static_matches(part, &old_target)
                    }
                    AncestorRequirement::Container(name) => {
                        let role = new_role.get_or_insert_with(|| self.container_role_for(id, element));
                        let answered_before = self
                            .tree
                            .container_role(id)
                            .is_some_and(|role| role.answers(name.as_deref()));
                        !answered_before && role.as_ref().is_some_and(|role| role.answers(name.as_deref()))
                    }
                };
                if introduced {
                    let introduced = missing.requirement.describe();
                    tracing::error!(
                        target: "native_css::runtime",
                        selector = %missing.selector,
                        %introduced,
                        "ancestor role introduced after first render"
                    );
                    return Err(Error::structural(missing.selector.clone(), introduced));
                }
            }
        }
        Ok(())
    }

    /// The container role `element` would have at `id`.
    fn container_role_for(&self, id: NodeId, element: &ElementNode) -> Option<ContainerRole> {
        if let Some(role) = &element.container {
            return Some(role.clone());
        }
        let env = self.environment();
        let set = cascade(id, element, &self.tree, &self.stylesheet, &self.index, &env);
        derive_container(&set)
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    fn environment(&self) -> CascadeEnvironment<'_> {
        CascadeEnvironment {
            containers: &self.containers,
            color_scheme: self.config.color_scheme,
        }
    }

    fn needs_resolution(&self, id: NodeId) -> bool {
        matches!(self.binding_state(id), BindingState::Unbound | BindingState::Stale)
    }

    /// Resolve `id` after any unbound or stale ancestors, outermost first.
    fn ensure_resolved(&mut self, id: NodeId) -> Result<()> {
        if !self.tree.contains(id) {
            return Err(Error::UnknownNode(id));
        }
        loop {
            let next = std::iter::once(id)
                .chain(self.tree.ancestors(id))
                .filter(|node| self.needs_resolution(*node))
                .last();
            let Some(next) = next else {
                return Ok(());
            };
            if let Some(data) = self.tree.get(next) {
                self.pending.remove(&(data.depth, next));
            }
            self.resolve_node(next)?;
        }
    }

    /// Recompute stale nodes in depth order. Returns how many were recomputed.
    fn process_pending(&mut self) -> usize {
        let mut recomputed = 0;
        while let Some((_, id)) = self.pending.pop_first() {
            if self.binding_state(id) != BindingState::Stale {
                continue;
            }
            match self.resolve_node(id) {
                Ok(()) => recomputed += 1,
                Err(e) => tracing::warn!(target: "native_css::runtime", ?id, error = %e, "recompute failed"),
            }
        }
        recomputed
    }

    fn resolve_node(&mut self, id: NodeId) -> Result<()> {
        let cached = {
            let source = EngineSnapshot { engine: self, id };
            self.cache.lookup(id, &source).cloned()
        };
        let resolution = match cached {
            Some(resolution) => {
                tracing::trace!(target: "native_css::runtime", ?id, "style cache hit");
                resolution
            }
            None => {
                let resolution = self.compute(id)?;
                let snapshot = DependencySnapshot::capture(
                    resolution.style.dependencies(),
                    &EngineSnapshot { engine: self, id },
                );
                self.cache.insert(id, snapshot, resolution.clone());
                resolution
            }
        };
        self.bind(id, resolution)
    }

    fn parent_font_size(&self, id: NodeId) -> f32 {
        self.tree
            .parent(id)
            .and_then(|parent| self.tree.get(parent))
            .map_or(self.config.root_font_size, |parent| parent.font_size)
    }

    /// Cascade and resolve one node against the current tree.
    fn compute(&self, id: NodeId) -> Result<Resolution> {
        let data = self.tree.get(id).ok_or(Error::UnknownNode(id))?;
        let parent_font_size = self.parent_font_size(id);
        let env = self.environment();
        let set = cascade(id, &data.element, &self.tree, &self.stylesheet, &self.index, &env);

        let mut dependencies = set.dependencies.clone();
        let declared: BTreeMap<String, String> = set
            .custom_properties()
            .map(|declaration| (declaration.name.clone(), declaration.value.raw.clone()))
            .collect();
        let container = derive_container(&set);

        let mut style = ComputedStyle::new();
        let mut font_size = parent_font_size;
        let mut inherits_font_size = true;
        {
            let mut variables = NodeVariables {
                tree: &self.tree,
                id,
                inline: &data.inline_variables,
                declared: &declared,
                root: &self.root_variables,
                dependencies: &mut dependencies,
            };

            let mut font_value = Vec::new();
            if let Some(declaration) = set.get("font-size") {
                let mut ctx = ResolveContext {
                    font_size: parent_font_size,
                    parent_font_size,
                    root_font_size: self.config.root_font_size,
                    variables: &mut variables,
                };
                font_value = resolve_declaration("font-size", &declaration.value, &mut ctx);
                if let Some(size) = font_value.first().and_then(|(_, value)| value.as_number()) {
                    font_size = size;
                    inherits_font_size = reads_font_size(&declaration.value.components);
                }
            }

            let mut individual = Vec::new();
            for winner in set.in_cascade_order() {
                let declaration = winner.declaration;
                let name = declaration.name.as_str();
                if declaration.is_custom_property() || is_container_property(name) {
                    continue;
                }
                if name == "font-size" {
                    for (property, value) in std::mem::take(&mut font_value) {
                        style.insert(property, value);
                    }
                    continue;
                }
                let mut ctx = ResolveContext {
                    font_size,
                    parent_font_size,
                    root_font_size: self.config.root_font_size,
                    variables: &mut variables,
                };
                let resolved = resolve_declaration(name, &declaration.value, &mut ctx);
                insert_resolved(&mut style, &mut individual, name, resolved);
            }
            if !individual.is_empty() {
                style.extend_transform(individual);
            }
        }

        dependencies.inherited_font_size = inherits_font_size && data.parent.is_some();
        style.set_dependencies(dependencies);
        tracing::debug!(target: "native_css::runtime", ?id, properties = style.len(), "computed style");

        Ok(Resolution {
            style,
            variables: declared,
            container,
            font_size,
        })
    }

    /// Store a resolution, notify the applier and invalidate dependents.
    fn bind(&mut self, id: NodeId, resolution: Resolution) -> Result<()> {
        let data = self.tree.get_mut(id).ok_or(Error::UnknownNode(id))?;
        let first = data.style.is_none();
        let changed_variables = changed_keys(&data.declared_variables, &resolution.variables);
        let font_changed = data.font_size != resolution.font_size;
        let container_changed = data.derived_container != resolution.container;
        let values_changed = data
            .style
            .as_ref()
            .is_none_or(|previous| !previous.same_values(&resolution.style));
        let from = data.binding;

        data.declared_variables = resolution.variables;
        data.font_size = resolution.font_size;
        data.derived_container = resolution.container;
        data.binding = BindingState::Bound;
        let style = data.style.insert(resolution.style);
        tracing::trace!(target: "native_css::runtime", ?id, ?from, values_changed, "-> bound");

        if values_changed {
            if let Some(applier) = self.applier.as_mut() {
                applier.apply(id, style);
            }
        } else {
            tracing::debug!(target: "native_css::runtime", ?id, "recompute produced identical values");
        }

        if !first && (!changed_variables.is_empty() || font_changed || container_changed) {
            self.propagate(id, &changed_variables, font_changed, container_changed)?;
        }
        Ok(())
    }

    /// Invalidate descendants that read something `id` just changed.
    fn propagate(&mut self, id: NodeId, variables: &[String], font_changed: bool, container_changed: bool) -> Result<()> {
        for descendant in self.tree.descendants(id)? {
            let stale = self.dependencies_of(descendant).is_some_and(|deps| {
                variables.iter().any(|name| deps.reads_variable(name))
                    || (font_changed && deps.inherited_font_size && self.tree.parent(descendant) == Some(id))
                    || (container_changed && deps.ancestor_sensitive)
            });
            if container_changed {
                self.cache.invalidate(descendant);
            }
            if stale {
                self.invalidate(descendant);
            }
        }
        Ok(())
    }
}

/// Variable lookup for one node: its own definitions, then ancestors, then
/// root variables. Every lookup is recorded as a dependency.
struct NodeVariables<'a> {
    tree: &'a NodeTree,
    id: NodeId,
    inline: &'a BTreeMap<String, String>,
    declared: &'a BTreeMap<String, String>,
    root: &'a BTreeMap<String, String>,
    dependencies: &'a mut Dependencies,
}

impl VariableSource for NodeVariables<'_> {
    fn lookup(&mut self, name: &str) -> Option<String> {
        self.dependencies.record_variable(name);
        self.inline
            .get(name)
            .or_else(|| self.declared.get(name))
            .map(String::as_str)
            .or_else(|| inherited_variable(self.tree, self.id, self.root, name))
            .map(str::to_string)
    }
}

fn inherited_variable<'a>(
    tree: &'a NodeTree,
    id: NodeId,
    root: &'a BTreeMap<String, String>,
    name: &str,
) -> Option<&'a str> {
    tree.ancestors(id)
        .find_map(|ancestor| tree.get(ancestor)?.variable(name))
        .or_else(|| root.get(name).map(String::as_str))
}

/// Current values of a node's inputs, for cache validation.
struct EngineSnapshot<'a> {
    engine: &'a StyleEngine,
    id: NodeId,
}

impl SnapshotSource for EngineSnapshot<'_> {
    fn state(&self, node: NodeId, kind: StateKind) -> bool {
        match kind {
            StateKind::Empty => self.engine.tree.child_count(node) == 0,
            kind => self
                .engine
                .tree
                .element(node)
                .is_some_and(|element| element.state.get(kind)),
        }
    }

    fn container_matches(&self, key: &ContainerKey, condition: &SizeCondition) -> bool {
        self.engine
            .containers
            .get(key)
            .is_some_and(|size| condition.evaluate(size))
    }

    fn variable(&self, name: &str) -> Option<String> {
        let tree = &self.engine.tree;
        tree.get(self.id)
            .and_then(|data| data.inline_variables.get(name))
            .map(String::as_str)
            .or_else(|| inherited_variable(tree, self.id, &self.engine.root_variables, name))
            .map(str::to_string)
    }

    fn color_scheme(&self) -> ColorScheme {
        self.engine.config.color_scheme
    }

    fn parent_font_size(&self) -> f32 {
        self.engine.parent_font_size(self.id)
    }
}

fn is_container_property(name: &str) -> bool {
    matches!(name, "container" | "container-name" | "container-type")
}

/// Resolved pairs into `style`; individual transform properties are held
/// back so they append to `transform` rather than replace it.
fn insert_resolved(
    style: &mut ComputedStyle,
    individual: &mut Vec<ResolvedValue>,
    property: &str,
    resolved: Vec<(String, ResolvedValue)>,
) {
    let individual_transform = matches!(property, "translate" | "rotate" | "scale");
    for (name, value) in resolved {
        match value {
            ResolvedValue::List(operations) if individual_transform => individual.extend(operations),
            value => style.insert(name, value),
        }
    }
}

/// Whether a `font-size` value is relative to the parent's font size.
fn reads_font_size(components: &[ComponentValue]) -> bool {
    components.iter().any(|component| match component {
        ComponentValue::Unit(_, UnitKind::Em) | ComponentValue::Percentage(_) | ComponentValue::Reference { .. } => {
            true
        }
        ComponentValue::FunctionCall { args, .. } | ComponentValue::Block(args) => reads_font_size(args),
        _ => false,
    })
}

/// Container role from the winning `container`, `container-name` and
/// `container-type` declarations.
///
/// A size `container-type` makes an element a container; so does a name,
/// unless the type is explicitly `normal`.
fn derive_container(set: &DeclarationSet<'_>) -> Option<ContainerRole> {
    let mut name = None;
    let mut size_type = None;
    for winner in set.in_cascade_order() {
        let components = winner.declaration.value.components.as_slice();
        match winner.declaration.name.as_str() {
            "container-name" => name = container_name(components),
            "container-type" => size_type = Some(is_size_type(components)),
            "container" => {
                let mut parts = components.split(|c| matches!(c, ComponentValue::Slash));
                name = parts.next().and_then(container_name);
                size_type = parts.next().map(is_size_type);
            }
            _ => {}
        }
    }
    match (name, size_type) {
        (_, Some(false)) => None,
        (Some(name), _) => Some(ContainerRole::named(name)),
        (None, Some(true)) => Some(ContainerRole::anonymous()),
        (None, None) => None,
    }
}

fn container_name(components: &[ComponentValue]) -> Option<String> {
    let name = components.first()?.as_ident()?;
    (!name.eq_ignore_ascii_case("none")).then(|| name.to_string())
}

fn is_size_type(components: &[ComponentValue]) -> bool {
    matches!(components, [ComponentValue::Ident(kind)]
        if kind.eq_ignore_ascii_case("size") || kind.eq_ignore_ascii_case("inline-size"))
}

/// Names whose values differ between two variable maps.
fn changed_keys(before: &BTreeMap<String, String>, after: &BTreeMap<String, String>) -> Vec<String> {
    before
        .keys()
        .chain(after.keys())
        .filter(|name| before.get(*name) != after.get(*name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}
