// SPDX-License-Identifier: Apache-2.0
//! Traffic-light cascade: full removal of programs whose connections are all
//! being deleted.
//!
//! Marking runs against the original pre-patch document state, captured once
//! before any category pass; execution runs against the final document state,
//! after the deferred-connection retry. Splitting the two avoids false
//! cascades from connections only transiently absent mid-pass.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Category, DiffDocument, DiffOp, ElementKey, NetworkDocument};
use crate::report::PatchReport;

/// The set of traffic-light programs qualified for full removal, computed
/// up front and executed once at the end of the run.
#[derive(Debug)]
pub(crate) struct CascadePlan {
    /// Qualified program ids in sorted order.
    doomed: Vec<String>,
}

impl CascadePlan {
    /// Mark phase: a program qualifies when the set of connection keys its
    /// diff marks for deletion (`delete` entries carrying a `tl` attribute)
    /// equals the set of connection keys referencing the program in the
    /// pre-patch document. A strict subset leaves the program alive.
    pub(crate) fn mark(original: &NetworkDocument, tls_diff: &DiffDocument) -> Self {
        let mut marked: BTreeMap<&str, BTreeSet<ElementKey>> = BTreeMap::new();
        for op in &tls_diff.ops {
            let DiffOp::Delete(entry) = op else {
                continue;
            };
            let Some(tl) = entry.attr("tl") else {
                continue;
            };
            let Some(key) = ElementKey::of(Category::Connection, entry) else {
                continue;
            };
            marked.entry(tl).or_default().insert(key);
        }

        let mut existing: BTreeMap<&str, BTreeSet<ElementKey>> = BTreeMap::new();
        for child in &original.children {
            if child.name != "connection" {
                continue;
            }
            let Some(tl) = child.attr("tl") else {
                continue;
            };
            let Some(key) = ElementKey::of(Category::Connection, child) else {
                continue;
            };
            existing.entry(tl).or_default().insert(key);
        }

        let doomed = marked
            .iter()
            .filter(|&(tl, keys)| existing.get(tl) == Some(keys))
            .map(|(tl, _)| (*tl).to_owned())
            .collect();
        Self { doomed }
    }

    /// Execute phase: remove each qualified program element, sweep every
    /// remaining connection referencing it, and demote a same-id junction
    /// typed `traffic_light` to the default uncontrolled type `priority`.
    pub(crate) fn execute(&self, doc: &mut NetworkDocument, report: &mut PatchReport) {
        for tl in &self.doomed {
            doc.children.retain(|child| {
                !(child.name == "tlLogic" && child.attr("id") == Some(tl.as_str()))
            });
            doc.children.retain(|child| {
                !(child.name == "connection" && child.attr("tl") == Some(tl.as_str()))
            });
            for child in &mut doc.children {
                if matches!(child.name.as_str(), "junction" | "node")
                    && child.attr("id") == Some(tl.as_str())
                    && child.attr("type") == Some("traffic_light")
                {
                    child.set_attr("type", "priority");
                }
            }
            report.cascaded_programs.push(tl.clone());
        }
    }
}
