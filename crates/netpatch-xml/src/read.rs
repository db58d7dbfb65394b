// SPDX-License-Identifier: Apache-2.0
//! Event-driven readers for network and diff documents.

use std::path::Path;
use std::str;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use netpatch_core::{Attribute, Category, DiffDocument, DiffOp, Element, NetworkDocument};

use crate::error::XmlError;

/// Parses a network document from an XML string.
///
/// The first element becomes the document root; every nested element is
/// preserved with its attribute order. Text, comments, and processing
/// instructions are dropped.
pub fn read_network(xml: &str) -> Result<NetworkDocument, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut document: Option<NetworkDocument> = None;
    let mut stack: Vec<Element> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if document.is_none() {
                    document = Some(document_from(&start)?);
                } else {
                    stack.push(element_from(&start)?);
                }
            }
            Event::Empty(start) => {
                if document.is_none() {
                    document = Some(document_from(&start)?);
                } else {
                    let element = element_from(&start)?;
                    attach(document.as_mut(), &mut stack, element);
                }
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(document.as_mut(), &mut stack, element);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    document.ok_or(XmlError::MissingRoot)
}

/// Reads and parses a network document from `path`.
pub fn read_network_file(path: &Path) -> Result<NetworkDocument, XmlError> {
    let xml = std::fs::read_to_string(path).map_err(|source| XmlError::File {
        path: path.to_path_buf(),
        source,
    })?;
    read_network(&xml)
}

/// Parses a per-category diff document from an XML string.
///
/// Top-level children tagged `delete` become [`DiffOp::Delete`]; every other
/// child becomes [`DiffOp::Upsert`] — the traffic-light diff legitimately
/// carries `connection` upserts alongside `tlLogic` ones.
pub fn read_diff(xml: &str, category: Category) -> Result<DiffDocument, XmlError> {
    let document = read_network(xml)?;
    let ops = document
        .children
        .into_iter()
        .map(|child| {
            if child.name == "delete" {
                DiffOp::Delete(child)
            } else {
                DiffOp::Upsert(child)
            }
        })
        .collect();
    Ok(DiffDocument { category, ops })
}

/// Reads and parses a diff document from `path`.
pub fn read_diff_file(path: &Path, category: Category) -> Result<DiffDocument, XmlError> {
    let xml = std::fs::read_to_string(path).map_err(|source| XmlError::File {
        path: path.to_path_buf(),
        source,
    })?;
    read_diff(&xml, category)
}

fn attach(document: Option<&mut NetworkDocument>, stack: &mut [Element], element: Element) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if let Some(document) = document {
        document.children.push(element);
    }
}

fn document_from(start: &BytesStart<'_>) -> Result<NetworkDocument, XmlError> {
    let element = element_from(start)?;
    Ok(NetworkDocument {
        root_name: element.name,
        root_attributes: element.attributes,
        children: element.children,
    })
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, XmlError> {
    let name = str::from_utf8(start.name().as_ref())?.to_owned();
    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute = attribute?;
        let name = str::from_utf8(attribute.key.as_ref())?.to_owned();
        let value = attribute.unescape_value()?.into_owned();
        element.attributes.push(Attribute { name, value });
    }
    Ok(element)
}
