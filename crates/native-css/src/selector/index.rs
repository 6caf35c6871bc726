//! Candidate rule index keyed by the subject compound.

use std::collections::HashMap;

use super::{SelectorPart, TypeSelector};
use crate::rules::StyleSheet;
use crate::tree::ElementNode;

/// Buckets rule indices by the most selective key of their subject:
/// id, else first class, else type name, else universal.
///
/// Read-only after compilation and shared by every node.
#[derive(Debug, Clone, Default)]
pub struct SelectorIndex {
    by_id: HashMap<String, Vec<usize>>,
    by_class: HashMap<String, Vec<usize>>,
    by_type: HashMap<String, Vec<usize>>,
    universal: Vec<usize>,
}

/// Bucket sizes, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexStats {
    pub ids: usize,
    pub classes: usize,
    pub types: usize,
    pub universal: usize,
}

impl SelectorIndex {
    /// Build the index for a stylesheet.
    pub fn compile(stylesheet: &StyleSheet) -> Self {
        let mut index = Self::default();
        for (i, rule) in stylesheet.rules.iter().enumerate() {
            match rule.selector.subject() {
                Some(subject) => index.add(i, subject),
                None => index.universal.push(i),
            }
        }
        tracing::debug!(
            target: "native_css::parser",
            rules = stylesheet.rules.len(),
            stats = ?index.stats(),
            "compiled selector index"
        );
        index
    }

    fn add(&mut self, rule: usize, subject: &SelectorPart) {
        if let Some(id) = &subject.id {
            self.by_id.entry(id.clone()).or_default().push(rule);
        } else if let Some(class) = subject.classes.first() {
            self.by_class.entry(class.clone()).or_default().push(rule);
        } else if let Some(TypeSelector::Type(name)) = &subject.type_selector {
            self.by_type.entry(name.clone()).or_default().push(rule);
        } else {
            self.universal.push(rule);
        }
    }

    /// Rule indices that may match `element`, in ascending source order.
    ///
    /// Candidates still need full matching; the index only rules out
    /// subjects whose key the element lacks.
    pub fn candidates(&self, element: &ElementNode) -> Vec<usize> {
        let mut candidates = self.universal.clone();

        if let Some(indices) = element.id.as_ref().and_then(|id| self.by_id.get(id)) {
            candidates.extend_from_slice(indices);
        }
        if let Some(indices) = element.type_name.as_ref().and_then(|t| self.by_type.get(t)) {
            candidates.extend_from_slice(indices);
        }
        for class in &element.classes {
            if let Some(indices) = self.by_class.get(class) {
                candidates.extend_from_slice(indices);
            }
        }

        candidates.sort_unstable();
        candidates.dedup();
        candidates
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            ids: self.by_id.len(),
            classes: self.by_class.len(),
            types: self.by_type.len(),
            universal: self.universal.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, parse_stylesheet};

    #[test]
    fn candidates_by_key() {
        let css = "* { opacity: 1 } .card { opacity: 1 } View { opacity: 1 } #main.card { opacity: 1 } \
                   .title { opacity: 1 } .card .title { opacity: 1 }";
        let sheet = parse_stylesheet(css, &ParseOptions::default()).stylesheet;
        let index = SelectorIndex::compile(&sheet);

        assert_eq!(
            index.stats(),
            IndexStats {
                ids: 1,
                classes: 2,
                types: 1,
                universal: 1
            }
        );

        let card = ElementNode::new("View").with_class("card");
        assert_eq!(index.candidates(&card), vec![0, 1, 2]);

        let main = ElementNode::new("Text").with_id("main").with_class("title");
        assert_eq!(index.candidates(&main), vec![0, 3, 4, 5]);
    }

    #[test]
    fn duplicate_classes_do_not_duplicate_candidates() {
        let sheet = parse_stylesheet(".a { opacity: 1 }", &ParseOptions::default()).stylesheet;
        let index = SelectorIndex::compile(&sheet);
        let node = ElementNode::new("View").with_class("a").with_class("a");
        assert_eq!(index.candidates(&node), vec![0]);
    }
}
