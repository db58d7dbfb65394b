// SPDX-License-Identifier: Apache-2.0
//! Indented writer for network documents.

use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use netpatch_core::{Element, NetworkDocument};

use crate::error::XmlError;

/// Serializes a network document to an XML string.
///
/// Emits an XML declaration, 4-space indentation, and self-closing tags for
/// childless elements. Top-level children are normalized into category
/// groups first, repairing the grouping invariant for documents that
/// violated it on read. The input document is not modified.
pub fn write_network(doc: &NetworkDocument) -> Result<String, XmlError> {
    let mut normalized = doc.clone();
    normalized.normalize();

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new(normalized.root_name.as_str());
    for attribute in &normalized.root_attributes {
        root.push_attribute((attribute.name.as_str(), attribute.value.as_str()));
    }
    if normalized.children.is_empty() {
        writer.write_event(Event::Empty(root))?;
    } else {
        writer.write_event(Event::Start(root))?;
        for child in &normalized.children {
            write_element(&mut writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(normalized.root_name.as_str())))?;
    }

    let bytes = writer.into_inner();
    let mut xml = String::from_utf8(bytes).map_err(|e| XmlError::Utf8(e.utf8_error()))?;
    xml.push('\n');
    Ok(xml)
}

/// Serializes `doc` and writes it to `path`.
pub fn write_network_file(path: &Path, doc: &NetworkDocument) -> Result<(), XmlError> {
    let xml = write_network(doc)?;
    std::fs::write(path, xml).map_err(|source| XmlError::File {
        path: path.to_path_buf(),
        source,
    })
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for attribute in &element.attributes {
        start.push_attribute((attribute.name.as_str(), attribute.value.as_str()));
    }
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        for child in &element.children {
            write_element(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    }
    Ok(())
}
