// SPDX-License-Identifier: Apache-2.0
//! XML codec for netpatch network and diff documents.
//!
//! Serialization is deliberately separated from the engine: `netpatch-core`
//! stays pure and dependency-light, while this crate owns the concrete
//! markup format (SUMO-style network XML) on both sides.
//!
//! Reading is lossy in exactly one respect: comments and processing
//! instructions are dropped — the patched output is a generated artifact,
//! not an edited copy. Writing normalizes top-level category grouping, so a
//! document violating the grouping invariant on read is repaired on write.

mod error;
mod read;
mod write;

pub use error::XmlError;
pub use read::{read_diff, read_diff_file, read_network, read_network_file};
pub use write::{write_network, write_network_file};
