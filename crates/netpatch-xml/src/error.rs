// SPDX-License-Identifier: Apache-2.0
//! Codec error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing network and diff documents.
///
/// Parse failures are fatal to a patch run: the engine must not start
/// mutating with a partial input set.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The input is not well-formed XML or contains an undecodable value.
    #[error("malformed XML: {0}")]
    Parse(#[from] quick_xml::Error),
    /// An attribute list could not be parsed.
    #[error("malformed attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    /// A tag or attribute name is not valid UTF-8.
    #[error("invalid UTF-8 in document: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// The document ended without a root element.
    #[error("document has no root element")]
    MissingRoot,
    /// Serialization to the output buffer failed.
    #[error("failed to serialize document: {0}")]
    Write(#[from] std::io::Error),
    /// A filesystem operation on `path` failed.
    #[error("failed to access `{path}`: {source}")]
    File {
        /// The offending path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
