// SPDX-License-Identifier: Apache-2.0
//! Keyed lookup tables over network documents.
//!
//! Two index flavors exist, matching the two document roles:
//!
//! - [`DocumentIndex`] over the mutable working document. It stores top-level
//!   positions, so it is valid only until the next mutation: callers must
//!   discard and rebuild after any change rather than patch incrementally —
//!   deletion cascades make incremental maintenance error-prone, and an O(n)
//!   rebuild per pass is the deliberate choice.
//! - [`ReferenceIndex`] over the frozen reference document, built once,
//!   resolving straight to `&Element`. Never mutated.

use rustc_hash::FxHashMap;

use crate::model::{Category, Element, ElementKey, NetworkDocument};

/// Per-category `ElementKey -> top-level position` lookup over the working
/// document. A pure function of current content.
#[derive(Debug, Default)]
pub struct DocumentIndex {
    by_category: [FxHashMap<ElementKey, usize>; 4],
}

impl DocumentIndex {
    /// Builds the index from scratch over `doc`'s top-level children.
    ///
    /// If duplicate keys exist (a violated input invariant), the later
    /// element wins, mirroring last-write lookup semantics.
    #[must_use]
    pub fn build(doc: &NetworkDocument) -> Self {
        let mut by_category: [FxHashMap<ElementKey, usize>; 4] = Default::default();
        for (position, element) in doc.children.iter().enumerate() {
            let Some(category) = element.category() else {
                continue;
            };
            let Some(key) = ElementKey::of(category, element) else {
                continue;
            };
            by_category[category.slot()].insert(key, position);
        }
        Self { by_category }
    }

    /// Returns the top-level position of the element with `key`, if present.
    /// Node lookups cover both `node` and `junction` tags.
    #[must_use]
    pub fn position(&self, category: Category, key: &ElementKey) -> Option<usize> {
        self.by_category[category.slot()].get(key).copied()
    }

    /// Whether an element with `key` exists in the indexed category.
    #[must_use]
    pub fn contains(&self, category: Category, key: &ElementKey) -> bool {
        self.by_category[category.slot()].contains_key(key)
    }
}

/// Read-only keyed lookup over the frozen reference document, supplying
/// authoritative content for bare-key upserts.
#[derive(Debug)]
pub struct ReferenceIndex<'a> {
    doc: &'a NetworkDocument,
    by_category: [FxHashMap<ElementKey, usize>; 4],
}

impl<'a> ReferenceIndex<'a> {
    /// Builds the index once over the reference document.
    #[must_use]
    pub fn build(doc: &'a NetworkDocument) -> Self {
        let mut by_category: [FxHashMap<ElementKey, usize>; 4] = Default::default();
        for (position, element) in doc.children.iter().enumerate() {
            let Some(category) = element.category() else {
                continue;
            };
            let Some(key) = ElementKey::of(category, element) else {
                continue;
            };
            by_category[category.slot()].insert(key, position);
        }
        Self { doc, by_category }
    }

    /// Resolves `key` to the reference element, if present.
    #[must_use]
    pub fn get(&self, category: Category, key: &ElementKey) -> Option<&'a Element> {
        let position = *self.by_category[category.slot()].get(key)?;
        self.doc.children.get(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Element;

    fn sample() -> NetworkDocument {
        let mut doc = NetworkDocument::new("net");
        doc.children = vec![
            Element::new("edge").with_attr("id", "E1"),
            Element::new("junction").with_attr("id", "J1"),
            Element::new("connection")
                .with_attr("from", "E1")
                .with_attr("to", "E2")
                .with_attr("fromLane", "0")
                .with_attr("toLane", "0"),
        ];
        doc
    }

    #[test]
    fn junction_found_under_node_category() {
        let doc = sample();
        let index = DocumentIndex::build(&doc);
        let key = ElementKey::Id("J1".to_owned());
        assert_eq!(index.position(Category::Node, &key), Some(1));
        assert!(!index.contains(Category::Edge, &key));
    }

    #[test]
    fn connection_resolved_by_four_tuple() {
        let doc = sample();
        let index = DocumentIndex::build(&doc);
        let key = ElementKey::Connection {
            from: "E1".to_owned(),
            to: "E2".to_owned(),
            from_lane: "0".to_owned(),
            to_lane: "0".to_owned(),
        };
        assert_eq!(index.position(Category::Connection, &key), Some(2));
    }

    #[test]
    fn reference_index_resolves_to_elements() {
        let doc = sample();
        let reference = ReferenceIndex::build(&doc);
        let key = ElementKey::Id("E1".to_owned());
        let element = reference.get(Category::Edge, &key);
        assert_eq!(element.map(|e| e.name.as_str()), Some("edge"));
    }
}
