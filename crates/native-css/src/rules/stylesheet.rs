//! Parsed stylesheet.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::parser::{ParseOptions, ParseOutput, parse_stylesheet};
use crate::rules::{Declaration, StyleRule};
use crate::selector::Selector;
use crate::{Error, Result};

/// One `from` / `to` / percentage block of a keyframes rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    /// Offsets in the 0.0-1.0 range (`from, 50%` gives `[0.0, 0.5]`).
    pub offsets: Vec<f32>,
    pub declarations: Vec<Declaration>,
}

/// A named `@keyframes` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframes {
    pub name: String,
    pub frames: Vec<Keyframe>,
}

/// A stylesheet: ordered rules plus the named blocks they reference.
///
/// Immutable once parsed; registering new text replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    /// Rules in source order. Rules split from one selector list share an order.
    pub rules: Vec<StyleRule>,
    pub keyframes: BTreeMap<String, Keyframes>,
    /// Names declared through `container-name` / `container`.
    pub container_names: BTreeSet<String>,
    /// Source file path, when loaded from disk.
    pub source_path: Option<PathBuf>,
}

impl StyleSheet {
    /// Create an empty stylesheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stylesheet from CSS text.
    pub fn from_css(css: &str, options: &ParseOptions) -> ParseOutput {
        parse_stylesheet(css, options)
    }

    /// Load a stylesheet from a CSS file.
    pub fn from_file(path: impl AsRef<Path>, options: &ParseOptions) -> Result<ParseOutput> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        let mut output = Self::from_css(&content, options);
        output.stylesheet.source_path = Some(path.to_path_buf());
        Ok(output)
    }

    /// Add a rule after all existing ones.
    pub fn add_rule(&mut self, selector: Selector, declarations: Vec<Declaration>) {
        let order = self.next_order();
        self.rules.push(StyleRule::new(selector, declarations, order));
    }

    /// Add a pre-built rule after all existing ones.
    pub fn add_style_rule(&mut self, mut rule: StyleRule) {
        rule.order = self.next_order();
        self.rules.push(rule);
    }

    fn next_order(&self) -> u32 {
        self.rules.last().map_or(0, |rule| rule.order + 1)
    }

    /// Look up a keyframes block by name.
    pub fn keyframes(&self, name: &str) -> Option<&Keyframes> {
        self.keyframes.get(name)
    }

    /// Get the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the stylesheet is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over rules.
    pub fn iter(&self) -> impl Iterator<Item = &StyleRule> {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn stylesheet_add_rules() {
        let mut sheet = StyleSheet::new();
        assert!(sheet.is_empty());

        sheet.add_rule(Selector::type_selector("View"), vec![]);
        sheet.add_rule(Selector::class("primary"), vec![]);

        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.rules[0].order, 0);
        assert_eq!(sheet.rules[1].order, 1);
    }

    #[test]
    fn stylesheet_from_css() {
        let output = StyleSheet::from_css(
            ".a, .b { color: red; } @keyframes spin { from { opacity: 0 } to { opacity: 1 } }",
            &ParseOptions::default(),
        );
        assert!(output.diagnostics.is_empty());
        assert_eq!(output.stylesheet.len(), 2);
        assert_eq!(output.stylesheet.rules[0].order, output.stylesheet.rules[1].order);
        assert_eq!(output.stylesheet.keyframes("spin").map(|k| k.frames.len()), Some(2));
    }

    #[test]
    fn stylesheet_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ".title {{ font-size: 20px; }}").unwrap();

        let output = StyleSheet::from_file(file.path(), &ParseOptions::default()).unwrap();
        assert_eq!(output.stylesheet.len(), 1);
        assert_eq!(output.stylesheet.source_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn stylesheet_missing_file() {
        let err = StyleSheet::from_file("/nonexistent/styles.css", &ParseOptions::default());
        assert!(matches!(err, Err(Error::Io { .. })));
    }
}
