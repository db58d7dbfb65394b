// SPDX-License-Identifier: Apache-2.0
//! Structured outcome report for one patch run.

use thiserror::Error;

use crate::model::{Category, ElementKey};

/// A non-fatal diagnostic recorded while applying diffs.
///
/// Every variant is recovered locally by skipping the offending operation;
/// none aborts the run. The caller decides how to surface them (the CLI logs
/// each as a warning).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchDiagnostic {
    /// A diff operation was missing one or more key components and was
    /// skipped without being applied or enqueued.
    #[error("malformed {category} diff entry skipped: missing key component")]
    MalformedEntry {
        /// Category of the diff the operation came from.
        category: Category,
    },
    /// An upsert key resolved in neither the working document nor the
    /// reference network.
    #[error("{category} upsert `{key}` resolves in neither document; skipped")]
    UnresolvedReference {
        /// Category of the upsert.
        category: Category,
        /// The unresolvable key.
        key: ElementKey,
    },
    /// A connection's lane endpoints were still out of range after the
    /// deferred retry; the connection is excluded from the output.
    #[error("connection `{key}` has no valid lane endpoints after retry; excluded")]
    InvalidConnection {
        /// The permanently invalid connection key.
        key: ElementKey,
    },
}

/// Accumulated diagnostics and counters for one patch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    /// Non-fatal diagnostics in the order they were recorded.
    pub diagnostics: Vec<PatchDiagnostic>,
    /// Elements removed by delete operations (including the internal
    /// connections swept by node deletion).
    pub deleted: usize,
    /// Elements committed by upsert operations, including retried deferred
    /// connections.
    pub upserted: usize,
    /// Deferred connections that validated on the retry.
    pub deferred_resolved: usize,
    /// Traffic-light program ids removed by the cascade resolver, in the
    /// order they were executed.
    pub cascaded_programs: Vec<String>,
}

impl PatchReport {
    /// Whether the run produced no diagnostics.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub(crate) fn malformed(&mut self, category: Category) {
        self.diagnostics
            .push(PatchDiagnostic::MalformedEntry { category });
    }

    pub(crate) fn unresolved(&mut self, category: Category, key: ElementKey) {
        self.diagnostics
            .push(PatchDiagnostic::UnresolvedReference { category, key });
    }

    pub(crate) fn invalid_connection(&mut self, key: ElementKey) {
        self.diagnostics
            .push(PatchDiagnostic::InvalidConnection { key });
    }
}
