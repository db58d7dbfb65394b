// SPDX-License-Identifier: Apache-2.0
//! Shared builders for patch-engine tests.
#![allow(dead_code)]

use netpatch_core::{Element, NetworkDocument};

/// An edge with `lanes` lane children indexed `0..lanes`.
pub fn edge(id: &str, lanes: usize) -> Element {
    let mut element = Element::new("edge").with_attr("id", id);
    for index in 0..lanes {
        element = element.with_child(Element::new("lane").with_attr("index", index.to_string()));
    }
    element
}

/// A junction with the given control type.
pub fn junction(id: &str, junction_type: &str) -> Element {
    Element::new("junction")
        .with_attr("id", id)
        .with_attr("type", junction_type)
}

/// A connection between two edge lanes.
pub fn connection(from: &str, to: &str, from_lane: &str, to_lane: &str) -> Element {
    Element::new("connection")
        .with_attr("from", from)
        .with_attr("to", to)
        .with_attr("fromLane", from_lane)
        .with_attr("toLane", to_lane)
}

/// A connection controlled by a traffic-light program.
pub fn tl_connection(from: &str, to: &str, from_lane: &str, to_lane: &str, tl: &str) -> Element {
    connection(from, to, from_lane, to_lane).with_attr("tl", tl)
}

/// A traffic-light program with one all-green phase.
pub fn tl_program(id: &str) -> Element {
    Element::new("tlLogic")
        .with_attr("id", id)
        .with_attr("type", "static")
        .with_attr("programID", "0")
        .with_child(
            Element::new("phase")
                .with_attr("duration", "42")
                .with_attr("state", "GG"),
        )
}

/// A network document over the given top-level children.
pub fn network(children: Vec<Element>) -> NetworkDocument {
    let mut doc = NetworkDocument::new("net");
    doc.children = children;
    doc
}

/// Ids of all elements with the given tag, in document order.
pub fn ids_of<'a>(doc: &'a NetworkDocument, tag: &str) -> Vec<&'a str> {
    doc.children
        .iter()
        .filter(|child| child.name == tag)
        .filter_map(|child| child.attr("id"))
        .collect()
}

/// All connection elements in document order.
pub fn connections(doc: &NetworkDocument) -> Vec<&Element> {
    doc.children
        .iter()
        .filter(|child| child.name == "connection")
        .collect()
}
