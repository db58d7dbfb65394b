// SPDX-License-Identifier: Apache-2.0
//! Lane table: per-edge view of currently defined lane indices.

use crate::index::DocumentIndex;
use crate::model::{Category, ElementKey, NetworkDocument};

/// Derived view giving, per edge id, the ordered set of currently defined
/// lane indices. Used to validate connection endpoints.
///
/// Always constructed over the *current* [`DocumentIndex`], so an edge
/// committed in an earlier category pass is visible to later connection
/// validation. Like the index it borrows, it is valid only until the next
/// document mutation.
#[derive(Debug)]
pub struct LaneTable<'a> {
    doc: &'a NetworkDocument,
    index: &'a DocumentIndex,
}

impl<'a> LaneTable<'a> {
    /// Creates the view over `doc` and its freshly built `index`.
    #[must_use]
    pub fn new(doc: &'a NetworkDocument, index: &'a DocumentIndex) -> Self {
        Self { doc, index }
    }

    /// Ordered lane `index` attributes of the edge's `lane` children; empty
    /// if the edge is unknown. Indices are compared as the document spells
    /// them, not numerically.
    #[must_use]
    pub fn lanes_of(&self, edge_id: &str) -> Vec<&'a str> {
        let key = ElementKey::Id(edge_id.to_owned());
        let Some(position) = self.index.position(Category::Edge, &key) else {
            return Vec::new();
        };
        let Some(edge) = self.doc.children.get(position) else {
            return Vec::new();
        };
        edge.children
            .iter()
            .filter(|child| child.name == "lane")
            .filter_map(|lane| lane.attr("index"))
            .collect()
    }

    /// Whether `lane` is a currently defined lane index of `edge_id`.
    #[must_use]
    pub fn has_lane(&self, edge_id: &str, lane: &str) -> bool {
        self.lanes_of(edge_id).iter().any(|index| *index == lane)
    }
}
