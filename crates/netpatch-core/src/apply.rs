// SPDX-License-Identifier: Apache-2.0
//! Per-category diff application: deletion phase, then upsert resolution.
//!
//! Each category pass runs against a freshly built [`DocumentIndex`] and
//! mutates the working document in two batches (deletions, then committed
//! upserts), rebuilding the index between them. Upserts are first resolved
//! into a keyed pending queue so that a later upsert of the same key replaces
//! the earlier one — exactly one element per key survives a pass.

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::index::{DocumentIndex, ReferenceIndex};
use crate::insert::insert_ordered;
use crate::lanes::LaneTable;
use crate::model::{
    internal_lane_owner, Category, DeferredConnection, DiffDocument, DiffOp, Element, ElementKey,
    NetworkDocument,
};
use crate::report::PatchReport;

/// Applies one category's diff to the working document: deletions first,
/// then upserts. Lane-invalid connection upserts are pushed onto `deferred`
/// for the orchestrator's single retry.
pub(crate) fn apply_category(
    doc: &mut NetworkDocument,
    reference: &ReferenceIndex<'_>,
    diff: &DiffDocument,
    deferred: &mut Vec<DeferredConnection>,
    report: &mut PatchReport,
) {
    apply_deletes(doc, diff, report);
    apply_upserts(doc, reference, diff, deferred, report);
}

/// Deletion phase. Missing targets are silently ignored (idempotent);
/// malformed entries are skipped with a diagnostic.
///
/// Node-deletion side effect: every connection whose `from` endpoint denotes
/// an internal lane owned by a deleted node id is removed as well — those
/// become dangling once the owning junction disappears.
fn apply_deletes(doc: &mut NetworkDocument, diff: &DiffDocument, report: &mut PatchReport) {
    let index = DocumentIndex::build(doc);
    let mut doomed: BTreeSet<usize> = BTreeSet::new();
    let mut deleted_nodes: FxHashSet<&str> = FxHashSet::default();

    for op in &diff.ops {
        let DiffOp::Delete(entry) = op else {
            continue;
        };
        // In the traffic-light diff, `delete` entries carrying a `tl`
        // attribute (and no id) mark connection-level deletions for the
        // cascade resolver; they do not address program elements.
        if diff.category == Category::TlLogic
            && entry.attr("id").is_none()
            && entry.attr("tl").is_some()
        {
            continue;
        }
        let Some(key) = ElementKey::of(diff.category, entry) else {
            report.malformed(diff.category);
            continue;
        };
        if diff.category == Category::Node {
            if let Some(id) = entry.attr("id") {
                deleted_nodes.insert(id);
            }
        }
        if let Some(position) = index.position(diff.category, &key) {
            doomed.insert(position);
        }
    }

    if !deleted_nodes.is_empty() {
        for (position, child) in doc.children.iter().enumerate() {
            if child.name != "connection" {
                continue;
            }
            let Some(owner) = child.attr("from").and_then(internal_lane_owner) else {
                continue;
            };
            if deleted_nodes.contains(owner) {
                doomed.insert(position);
            }
        }
    }

    report.deleted += doomed.len();
    for position in doomed.iter().rev() {
        doc.children.remove(*position);
    }
}

/// Upsert phase. Resolves each entry against the current index and the
/// reference index, collecting replacements and enqueued clones without
/// touching the document, then commits the batch through the ordered
/// inserter.
fn apply_upserts(
    doc: &mut NetworkDocument,
    reference: &ReferenceIndex<'_>,
    diff: &DiffDocument,
    deferred: &mut Vec<DeferredConnection>,
    report: &mut PatchReport,
) {
    let index = DocumentIndex::build(doc);
    let lanes = LaneTable::new(doc, &index);
    let mut queue: PendingQueue = PendingQueue::default();
    let mut replaced: BTreeSet<usize> = BTreeSet::new();

    for op in &diff.ops {
        let DiffOp::Upsert(entry) = op else {
            continue;
        };
        let Some(category) = entry.category() else {
            continue;
        };
        // The traffic-light diff interleaves connection upserts with program
        // upserts; any other cross-category entry is not for this pass.
        let accepted = category == diff.category
            || (diff.category == Category::TlLogic && category == Category::Connection);
        if !accepted {
            continue;
        }

        match category {
            Category::Connection => {
                let (Some(from), Some(to), Some(from_lane), Some(to_lane)) = (
                    entry.attr("from"),
                    entry.attr("to"),
                    entry.attr("fromLane"),
                    entry.attr("toLane"),
                ) else {
                    report.malformed(diff.category);
                    continue;
                };
                let key = ElementKey::Connection {
                    from: from.to_owned(),
                    to: to.to_owned(),
                    from_lane: from_lane.to_owned(),
                    to_lane: to_lane.to_owned(),
                };
                let valid = lanes.has_lane(from, from_lane) && lanes.has_lane(to, to_lane);
                // Reference content is authoritative when the key matches; a
                // connection absent from the reference network is a literal
                // new element, validated against its own attributes.
                let content = reference
                    .get(Category::Connection, &key)
                    .cloned()
                    .unwrap_or_else(|| entry.clone());
                if valid {
                    if let Some(position) = index.position(Category::Connection, &key) {
                        replaced.insert(position);
                    }
                    queue.enqueue(key, content);
                } else {
                    defer(deferred, key, content);
                }
            }
            Category::Node | Category::Edge => {
                let Some(key) = ElementKey::of(category, entry) else {
                    report.malformed(diff.category);
                    continue;
                };
                match reference.get(category, &key) {
                    Some(source) => {
                        if let Some(position) = index.position(category, &key) {
                            replaced.insert(position);
                        }
                        queue.enqueue(key, source.clone());
                    }
                    None => report.unresolved(category, key),
                }
            }
            Category::TlLogic => {
                let Some(key) = ElementKey::of(category, entry) else {
                    report.malformed(diff.category);
                    continue;
                };
                if let Some(source) = reference.get(category, &key) {
                    if let Some(position) = index.position(category, &key) {
                        replaced.insert(position);
                    }
                    queue.enqueue(key, source.clone());
                } else if is_literal_program(entry) {
                    // Literal additions support programs absent from the
                    // reference network, but never silently replace an
                    // existing or already-queued program.
                    if !index.contains(category, &key) && !queue.contains(&key) {
                        queue.enqueue(key, entry.clone());
                    }
                } else {
                    report.unresolved(category, key);
                }
            }
        }
    }

    report.upserted += queue.elements.len();
    for position in replaced.iter().rev() {
        doc.children.remove(*position);
    }
    for (_, element) in queue.elements {
        insert_ordered(doc, element);
    }
}

/// A bare-key program upsert carries nothing beyond `id`; anything more is
/// literal content eligible for direct addition.
fn is_literal_program(entry: &Element) -> bool {
    !entry.children.is_empty() || entry.attributes.iter().any(|a| a.name != "id")
}

/// Records a deferred connection, replacing any earlier deferral of the same
/// key so the retry sees exactly one candidate per key.
fn defer(deferred: &mut Vec<DeferredConnection>, key: ElementKey, element: Element) {
    match deferred.iter_mut().find(|d| d.key == key) {
        Some(existing) => existing.element = element,
        None => deferred.push(DeferredConnection { key, element }),
    }
}

/// Order-preserving keyed queue of elements awaiting commit. A later upsert
/// of a key already queued replaces the element in place, keeping the first
/// occurrence's position.
#[derive(Debug, Default)]
struct PendingQueue {
    elements: Vec<(ElementKey, Element)>,
    slots: FxHashMap<ElementKey, usize>,
}

impl PendingQueue {
    fn enqueue(&mut self, key: ElementKey, element: Element) {
        match self.slots.get(&key) {
            Some(&slot) => self.elements[slot].1 = element,
            None => {
                self.slots.insert(key.clone(), self.elements.len());
                self.elements.push((key, element));
            }
        }
    }

    fn contains(&self, key: &ElementKey) -> bool {
        self.slots.contains_key(key)
    }
}
