// SPDX-License-Identifier: Apache-2.0
//! Ordered insertion of top-level elements by category precedence.

use crate::model::{tag_rank, Element, NetworkDocument};

/// Inserts `element` at the position matching the canonical category
/// ordering (location < type < edge < junction/node < connection < tlLogic),
/// regardless of production order.
///
/// Scans existing top-level children once and inserts immediately before the
/// first child whose tag sorts after the new element's tag; appends if none
/// is found or the tag is outside the precedence list. Never reorders
/// existing siblings, so placement is deterministic and independent of
/// enqueue order.
pub fn insert_ordered(doc: &mut NetworkDocument, element: Element) {
    let Some(rank) = tag_rank(&element.name) else {
        doc.children.push(element);
        return;
    };
    let position = doc
        .children
        .iter()
        .position(|child| tag_rank(&child.name).is_some_and(|child_rank| child_rank > rank));
    match position {
        Some(position) => doc.children.insert(position, element),
        None => doc.children.push(element),
    }
}
