// SPDX-License-Identifier: Apache-2.0
//! Engine semantics: deletion idempotence, key uniqueness, reference
//! resolution, lane validation, deferral, and the ordering invariant.
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{connection, connections, edge, ids_of, junction, network};
use netpatch_core::{
    apply_patch, Category, DiffDocument, DiffOp, DiffSet, Element, PatchDiagnostic,
};

fn edge_diff(ops: Vec<DiffOp>) -> DiffSet {
    DiffSet {
        edge: DiffDocument {
            category: Category::Edge,
            ops,
        },
        ..DiffSet::empty()
    }
}

fn connection_diff(ops: Vec<DiffOp>) -> DiffSet {
    DiffSet {
        connection: DiffDocument {
            category: Category::Connection,
            ops,
        },
        ..DiffSet::empty()
    }
}

#[test]
fn deleting_an_absent_key_changes_nothing() {
    let patch = network(vec![edge("E1", 1), junction("J1", "priority")]);
    let reference = network(vec![]);
    let diffs = edge_diff(vec![DiffOp::Delete(Element::new("delete").with_attr("id", "E9"))]);

    let before = patch.clone();
    let outcome = apply_patch(patch, &reference, &diffs);

    assert_eq!(outcome.document.children, before.children);
    assert!(outcome.report.is_clean());
    assert_eq!(outcome.report.deleted, 0);
}

#[test]
fn delete_removes_the_keyed_element() {
    let patch = network(vec![edge("E1", 1), edge("E2", 1)]);
    let reference = network(vec![]);
    let diffs = edge_diff(vec![DiffOp::Delete(Element::new("delete").with_attr("id", "E1"))]);

    let outcome = apply_patch(patch, &reference, &diffs);

    assert_eq!(ids_of(&outcome.document, "edge"), vec!["E2"]);
    assert_eq!(outcome.report.deleted, 1);
}

#[test]
fn node_delete_finds_junction_sub_kind() {
    let patch = network(vec![junction("J1", "priority"), junction("J2", "priority")]);
    let reference = network(vec![]);
    let diffs = DiffSet {
        node: DiffDocument {
            category: Category::Node,
            ops: vec![DiffOp::Delete(Element::new("delete").with_attr("id", "J1"))],
        },
        ..DiffSet::empty()
    };

    let outcome = apply_patch(patch, &reference, &diffs);

    assert_eq!(ids_of(&outcome.document, "junction"), vec!["J2"]);
}

#[test]
fn deleting_a_node_sweeps_its_internal_connections() {
    let patch = network(vec![
        junction("J1", "priority"),
        edge("E1", 1),
        edge("E2", 1),
        connection(":J1_0", "E2", "0", "0"),
        connection("E1", "E2", "0", "0"),
    ]);
    let reference = network(vec![]);
    let diffs = DiffSet {
        node: DiffDocument {
            category: Category::Node,
            ops: vec![DiffOp::Delete(Element::new("delete").with_attr("id", "J1"))],
        },
        ..DiffSet::empty()
    };

    let outcome = apply_patch(patch, &reference, &diffs);

    assert!(ids_of(&outcome.document, "junction").is_empty());
    let remaining = connections(&outcome.document);
    assert_eq!(remaining.len(), 1, "only the ordinary connection survives");
    assert_eq!(remaining[0].attr("from"), Some("E1"));
}

#[test]
fn bare_key_upsert_clones_reference_content() {
    let patch = network(vec![edge("E1", 1)]);
    let reference = network(vec![edge("E1", 3).with_attr("speed", "13.89")]);
    let diffs = edge_diff(vec![DiffOp::Upsert(Element::new("edge").with_attr("id", "E1"))]);

    let outcome = apply_patch(patch, &reference, &diffs);

    assert_eq!(ids_of(&outcome.document, "edge"), vec!["E1"]);
    let patched = &outcome.document.children[0];
    assert_eq!(patched.children.len(), 3, "reference lane set replaces the old one");
    assert_eq!(patched.attr("speed"), Some("13.89"));
}

#[test]
fn duplicate_upserts_leave_exactly_one_survivor() {
    let patch = network(vec![]);
    let reference = network(vec![edge("E1", 2)]);
    let diffs = edge_diff(vec![
        DiffOp::Upsert(Element::new("edge").with_attr("id", "E1")),
        DiffOp::Upsert(Element::new("edge").with_attr("id", "E1")),
    ]);

    let outcome = apply_patch(patch, &reference, &diffs);

    assert_eq!(ids_of(&outcome.document, "edge"), vec!["E1"]);
}

#[test]
fn unresolved_upsert_is_skipped_and_reported() {
    let patch = network(vec![]);
    let reference = network(vec![]);
    let diffs = edge_diff(vec![DiffOp::Upsert(Element::new("edge").with_attr("id", "E9"))]);

    let outcome = apply_patch(patch, &reference, &diffs);

    assert!(ids_of(&outcome.document, "edge").is_empty());
    assert!(matches!(
        outcome.report.diagnostics.as_slice(),
        [PatchDiagnostic::UnresolvedReference { .. }]
    ));
}

#[test]
fn malformed_operations_are_skipped_and_reported() {
    let patch = network(vec![edge("E1", 1), edge("E2", 1)]);
    let reference = network(vec![]);
    // missing toLane on the upsert, missing id on the delete
    let diffs = connection_diff(vec![
        DiffOp::Upsert(
            Element::new("connection")
                .with_attr("from", "E1")
                .with_attr("to", "E2")
                .with_attr("fromLane", "0"),
        ),
        DiffOp::Delete(Element::new("delete")),
    ]);

    let outcome = apply_patch(patch, &reference, &diffs);

    assert!(connections(&outcome.document).is_empty());
    assert_eq!(outcome.report.diagnostics.len(), 2);
    assert!(outcome
        .report
        .diagnostics
        .iter()
        .all(|d| matches!(d, PatchDiagnostic::MalformedEntry { .. })));
}

#[test]
fn connection_resolves_reference_content_when_lanes_are_valid() {
    let patch = network(vec![edge("E1", 2), edge("E2", 1)]);
    let reference = network(vec![connection("E1", "E2", "1", "0").with_attr("state", "M")]);
    let diffs = connection_diff(vec![DiffOp::Upsert(connection("E1", "E2", "1", "0"))]);

    let outcome = apply_patch(patch, &reference, &diffs);

    let added = connections(&outcome.document);
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].attr("state"), Some("M"), "reference content wins");
}

#[test]
fn connection_without_reference_match_is_added_literally() {
    let patch = network(vec![edge("E1", 1), edge("E2", 1)]);
    let reference = network(vec![]);
    let diffs = connection_diff(vec![DiffOp::Upsert(
        connection("E1", "E2", "0", "0").with_attr("keepClear", "true"),
    )]);

    let outcome = apply_patch(patch, &reference, &diffs);

    let added = connections(&outcome.document);
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].attr("keepClear"), Some("true"));
}

#[test]
fn edge_upsert_settles_before_connection_validation() {
    // The connection references lane 2, which only exists in the reference
    // version of E1 that the edge diff brings in. Category ordering (edges
    // before connections) must make it valid regardless of diff-file order.
    let patch = network(vec![edge("E1", 2), edge("E2", 1)]);
    let reference = network(vec![edge("E1", 3), connection("E1", "E2", "2", "0")]);
    let diffs = DiffSet {
        edge: DiffDocument {
            category: Category::Edge,
            ops: vec![DiffOp::Upsert(Element::new("edge").with_attr("id", "E1"))],
        },
        connection: DiffDocument {
            category: Category::Connection,
            ops: vec![DiffOp::Upsert(connection("E1", "E2", "2", "0"))],
        },
        ..DiffSet::empty()
    };

    let outcome = apply_patch(patch, &reference, &diffs);

    let added = connections(&outcome.document);
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].attr("fromLane"), Some("2"));
    assert!(outcome.report.is_clean());
}

#[test]
fn lane_invalid_connection_is_excluded_after_retry() {
    let patch = network(vec![edge("E1", 2), edge("E2", 1)]);
    let reference = network(vec![]);
    let diffs = connection_diff(vec![DiffOp::Upsert(connection("E1", "E2", "5", "0"))]);

    let outcome = apply_patch(patch, &reference, &diffs);

    assert!(connections(&outcome.document).is_empty());
    assert!(matches!(
        outcome.report.diagnostics.as_slice(),
        [PatchDiagnostic::InvalidConnection { .. }]
    ));
}

#[test]
fn lane_validity_closure_holds_for_every_output_connection() {
    let patch = network(vec![edge("E1", 2), edge("E2", 2)]);
    let reference = network(vec![edge("E3", 1), connection("E3", "E1", "0", "1")]);
    let diffs = DiffSet {
        edge: DiffDocument {
            category: Category::Edge,
            ops: vec![DiffOp::Upsert(Element::new("edge").with_attr("id", "E3"))],
        },
        connection: DiffDocument {
            category: Category::Connection,
            ops: vec![
                DiffOp::Upsert(connection("E1", "E2", "0", "0")),
                DiffOp::Upsert(connection("E3", "E1", "0", "1")),
                DiffOp::Upsert(connection("E1", "E2", "3", "0")),
            ],
        },
        ..DiffSet::empty()
    };

    let outcome = apply_patch(patch, &reference, &diffs);

    let lanes_of = |edge_id: &str| -> Vec<String> {
        outcome
            .document
            .children
            .iter()
            .find(|c| c.name == "edge" && c.attr("id") == Some(edge_id))
            .map(|e| {
                e.children
                    .iter()
                    .filter_map(|l| l.attr("index"))
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    };
    for conn in connections(&outcome.document) {
        let from_lanes = lanes_of(conn.attr("from").unwrap());
        let to_lanes = lanes_of(conn.attr("to").unwrap());
        assert!(from_lanes.iter().any(|l| l == conn.attr("fromLane").unwrap()));
        assert!(to_lanes.iter().any(|l| l == conn.attr("toLane").unwrap()));
    }
    assert_eq!(connections(&outcome.document).len(), 2);
}

#[test]
fn output_is_grouped_by_category_precedence() {
    // Deliberately scrambled input: the grouping invariant is violated on
    // read and must be repaired by the run.
    let patch = network(vec![
        connection("E1", "E2", "0", "0"),
        junction("J1", "priority"),
        edge("E1", 1),
        Element::new("location").with_attr("netOffset", "0.00,0.00"),
        edge("E2", 1),
    ]);
    let reference = network(vec![]);

    let outcome = apply_patch(patch, &reference, &DiffSet::empty());

    let names: Vec<&str> = outcome
        .document
        .children
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["location", "edge", "edge", "junction", "connection"]
    );
}

#[test]
fn empty_diffs_preserve_element_content() {
    let mut patch = network(vec![
        Element::new("location").with_attr("netOffset", "0.00,0.00"),
        edge("E1", 2).with_attr("speed", "13.89"),
        junction("J1", "traffic_light"),
        connection("E1", "E1", "0", "0"),
    ]);
    patch.normalize();
    let before = patch.clone();
    let reference = network(vec![edge("E9", 1)]);

    let outcome = apply_patch(patch, &reference, &DiffSet::empty());

    assert_eq!(outcome.document.children, before.children);
    assert!(outcome.report.is_clean());
    assert_eq!(outcome.report.upserted, 0);
}
