//! Computed style output.

use std::collections::BTreeMap;

use crate::resolve::Dependencies;
use crate::types::ResolvedValue;

/// Final, resolved style for one element.
///
/// Properties use native (camelCase) names. The dependency set records every
/// input consulted to produce it, including rules that did not win.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComputedStyle {
    properties: BTreeMap<String, ResolvedValue>,
    dependencies: Dependencies,
}

impl ComputedStyle {
    /// Create an empty style.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_dependencies(dependencies: Dependencies) -> Self {
        Self {
            properties: BTreeMap::new(),
            dependencies,
        }
    }

    pub(crate) fn set_dependencies(&mut self, dependencies: Dependencies) {
        self.dependencies = dependencies;
    }

    /// Get a property by its native name.
    pub fn get(&self, name: &str) -> Option<&ResolvedValue> {
        self.properties.get(name)
    }

    /// Set a property, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: ResolvedValue) {
        self.properties.insert(name.into(), value);
    }

    /// Append transform operations to the `transform` list.
    pub(crate) fn extend_transform(&mut self, operations: Vec<ResolvedValue>) {
        match self.properties.get_mut("transform") {
            Some(ResolvedValue::List(existing)) => existing.extend(operations),
            _ => {
                self.properties
                    .insert("transform".to_string(), ResolvedValue::List(operations));
            }
        }
    }

    /// Iterate properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The property map.
    pub fn properties(&self) -> &BTreeMap<String, ResolvedValue> {
        &self.properties
    }

    /// The inputs this style was computed from.
    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    /// Compare property values only, ignoring dependencies.
    pub fn same_values(&self, other: &ComputedStyle) -> bool {
        self.properties == other.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
