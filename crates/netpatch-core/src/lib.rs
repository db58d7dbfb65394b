// SPDX-License-Identifier: Apache-2.0
//! Deterministic patch engine for road-network description documents.
//!
//! A network document is a single tree of mixed-category elements —
//! nodes/junctions, edges (each owning an ordered set of lanes), connections
//! between lane pairs, and traffic-light programs — each identified by a
//! semantic key. Per-category diff documents record deletions and
//! additions/updates derived from comparing a reference network against an
//! edited counterpart. This crate merges those diffs into a different target
//! network, resolving identity, lane-range validity, and structural cascades,
//! producing one consistent network tree.
//!
//! The engine is a pure function of its inputs: single-threaded, synchronous,
//! with a total deterministic ordering (fixed category order, deletions
//! before upserts, full index rebuild between steps). Serialization lives in
//! `netpatch-xml`; this crate performs no I/O.

mod apply;
mod cascade;
mod engine;
mod index;
mod insert;
mod lanes;
mod model;
mod report;

pub use engine::{apply_patch, PatchOutcome};
pub use index::{DocumentIndex, ReferenceIndex};
pub use insert::insert_ordered;
pub use lanes::LaneTable;
pub use model::{
    Attribute, Category, DeferredConnection, DiffDocument, DiffOp, DiffSet, Element, ElementKey,
    NetworkDocument,
};
pub use report::{PatchDiagnostic, PatchReport};
