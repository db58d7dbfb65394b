// SPDX-License-Identifier: Apache-2.0
//! Orchestrator: fixed-order category passes, single deferred retry, cascade.

use crate::apply::apply_category;
use crate::cascade::CascadePlan;
use crate::index::{DocumentIndex, ReferenceIndex};
use crate::insert::insert_ordered;
use crate::lanes::LaneTable;
use crate::model::{Category, DeferredConnection, DiffSet, Element, ElementKey, NetworkDocument};
use crate::report::PatchReport;

/// Result of one patch run: the merged document and its diagnostics.
#[derive(Debug)]
pub struct PatchOutcome {
    /// The patched network, category-grouped per the precedence invariant.
    pub document: NetworkDocument,
    /// Non-fatal diagnostics and counters accumulated during the run.
    pub report: PatchReport,
}

/// Merges the per-category diffs into `patch`, resolving bare-key upserts
/// against the frozen `reference` network.
///
/// Categories are processed in fixed dependency order (node, edge,
/// traffic-light program, connection), deletions before upserts within each,
/// with the keyed index fully rebuilt between mutation batches. After all
/// passes, deferred connections get exactly one retry against a fresh lane
/// table; a connection unresolved after that is a diff-authoring defect, not
/// a timing artifact, and is excluded and reported. Finally the traffic-light
/// cascade executes and the document is normalized.
///
/// The run is a pure function of its inputs: re-running with identical
/// inputs yields identical output.
#[must_use]
pub fn apply_patch(
    patch: NetworkDocument,
    reference: &NetworkDocument,
    diffs: &DiffSet,
) -> PatchOutcome {
    let mut document = patch;
    let reference_index = ReferenceIndex::build(reference);
    // Cascade qualification is judged against pre-patch state, captured
    // before any category pass mutates the document.
    let cascade = CascadePlan::mark(&document, &diffs.tls);

    let mut report = PatchReport::default();
    let mut deferred: Vec<DeferredConnection> = Vec::new();
    for category in Category::PROCESSING_ORDER {
        apply_category(
            &mut document,
            &reference_index,
            diffs.get(category),
            &mut deferred,
            &mut report,
        );
    }

    retry_deferred(&mut document, deferred, &mut report);
    cascade.execute(&mut document, &mut report);
    document.normalize();

    PatchOutcome { document, report }
}

/// The single deferred-connection retry, run after all edge upserts have
/// settled. Now-valid connections are inserted (skipped if the key is
/// already present); still-invalid ones are permanently excluded and
/// reported. No further retry rounds.
fn retry_deferred(
    doc: &mut NetworkDocument,
    deferred: Vec<DeferredConnection>,
    report: &mut PatchReport,
) {
    if deferred.is_empty() {
        return;
    }
    let mut accepted: Vec<Element> = Vec::new();
    {
        let index = DocumentIndex::build(doc);
        let lanes = LaneTable::new(doc, &index);
        for connection in deferred {
            let ElementKey::Connection {
                from,
                to,
                from_lane,
                to_lane,
            } = &connection.key
            else {
                continue;
            };
            if index.contains(Category::Connection, &connection.key) {
                continue;
            }
            if lanes.has_lane(from, from_lane) && lanes.has_lane(to, to_lane) {
                report.deferred_resolved += 1;
                accepted.push(connection.element);
            } else {
                report.invalid_connection(connection.key);
            }
        }
    }
    report.upserted += accepted.len();
    for element in accepted {
        insert_ordered(doc, element);
    }
}
