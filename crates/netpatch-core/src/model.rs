// SPDX-License-Identifier: Apache-2.0
//! Data model: elements, categories, semantic keys, documents, diffs.

use std::fmt;

/// One named attribute of an [`Element`]. Attribute order is preserved
/// verbatim through parse, patch, and write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name as it appears in the document.
    pub name: String,
    /// Unescaped attribute value.
    pub value: String,
}

/// A tagged record in a network or diff document.
///
/// An element carries an ordered attribute mapping and an ordered sequence of
/// children: an edge owns its `lane` children, a traffic-light program owns
/// its `phase` children. The tree is generic — elements of categories the
/// engine does not process (`location`, `type`, …) pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name (`node`, `junction`, `edge`, `connection`, `tlLogic`, …).
    pub name: String,
    /// Ordered attributes.
    pub attributes: Vec<Attribute>,
    /// Ordered child elements.
    pub children: Vec<Element>,
}

impl Element {
    /// Creates an element with no attributes or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute append.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Builder-style child append.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the value of the named attribute, if present.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Replaces the named attribute's value, appending it if absent.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value.into(),
            None => self.attributes.push(Attribute {
                name: name.to_owned(),
                value: value.into(),
            }),
        }
    }

    /// The diffable category this element belongs to, if any.
    #[must_use]
    pub fn category(&self) -> Option<Category> {
        Category::of(&self.name)
    }

    /// The element's semantic key within its category, if well-formed.
    #[must_use]
    pub fn key(&self) -> Option<ElementKey> {
        ElementKey::of(self.category()?, self)
    }
}

/// The element categories the patch engine processes.
///
/// `junction` is a node sub-kind: both tags resolve to [`Category::Node`] so
/// a node diff can address elements in either plain (`node`) or compiled
/// (`junction`) form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Nodes and junctions, keyed by `id`.
    Node,
    /// Edges (owning lanes), keyed by `id`.
    Edge,
    /// Lane-to-lane connections, keyed by the endpoint 4-tuple.
    Connection,
    /// Traffic-light programs, keyed by `id`.
    TlLogic,
}

impl Category {
    /// Fixed processing order: node and edge upserts must settle before
    /// connection validation reads the lane table, and the traffic-light
    /// pass may enqueue connections of its own.
    pub const PROCESSING_ORDER: [Self; 4] = [Self::Node, Self::Edge, Self::TlLogic, Self::Connection];

    /// Maps a tag name to its category.
    #[must_use]
    pub fn of(tag: &str) -> Option<Self> {
        match tag {
            "node" | "junction" => Some(Self::Node),
            "edge" => Some(Self::Edge),
            "connection" => Some(Self::Connection),
            "tlLogic" => Some(Self::TlLogic),
            _ => None,
        }
    }

    /// Canonical tag name for the category (`node` for the node sub-kinds).
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Edge => "edge",
            Self::Connection => "connection",
            Self::TlLogic => "tlLogic",
        }
    }

    pub(crate) const fn slot(self) -> usize {
        match self {
            Self::Node => 0,
            Self::Edge => 1,
            Self::Connection => 2,
            Self::TlLogic => 3,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Semantic identity of an element within its category.
///
/// Invariant: within one document, no two elements of the same category share
/// a key. The engine enforces this through replace semantics and a keyed
/// pending queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKey {
    /// String id for nodes/junctions, edges, and traffic-light programs.
    Id(String),
    /// Endpoint 4-tuple for connections. Lane indices are kept as the
    /// document spells them; validity is membership in the owning edge's
    /// lane sequence, not numeric range.
    Connection {
        /// Source edge id.
        from: String,
        /// Destination edge id.
        to: String,
        /// Lane index on the source edge.
        from_lane: String,
        /// Lane index on the destination edge.
        to_lane: String,
    },
}

impl ElementKey {
    /// Extracts the key of `element` under `category`.
    ///
    /// Returns `None` when any key component is absent — such operations are
    /// malformed and must be skipped, never enqueued.
    #[must_use]
    pub fn of(category: Category, element: &Element) -> Option<Self> {
        match category {
            Category::Node | Category::Edge | Category::TlLogic => {
                element.attr("id").map(|id| Self::Id(id.to_owned()))
            }
            Category::Connection => Some(Self::Connection {
                from: element.attr("from")?.to_owned(),
                to: element.attr("to")?.to_owned(),
                from_lane: element.attr("fromLane")?.to_owned(),
                to_lane: element.attr("toLane")?.to_owned(),
            }),
        }
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => f.write_str(id),
            Self::Connection {
                from,
                to,
                from_lane,
                to_lane,
            } => write!(f, "{from}:{from_lane} -> {to}:{to_lane}"),
        }
    }
}

/// Top-level tag precedence for category grouping.
///
/// Unknown tags have no rank: the inserter appends them and
/// [`NetworkDocument::normalize`] keeps them after all ranked groups.
pub(crate) fn tag_rank(tag: &str) -> Option<u8> {
    match tag {
        "location" => Some(0),
        "type" => Some(1),
        "edge" => Some(2),
        "junction" | "node" => Some(3),
        "connection" => Some(4),
        "tlLogic" => Some(5),
        _ => None,
    }
}

/// For a connection whose `from` endpoint denotes an internal lane
/// (`:<node>_<index>`), returns the owning node id.
pub(crate) fn internal_lane_owner(from_edge: &str) -> Option<&str> {
    let local = from_edge.strip_prefix(':')?;
    let (owner, _) = local.rsplit_once('_')?;
    Some(owner)
}

/// An ordered top-level sequence of mixed-category elements.
///
/// Non-participating categories (`location`, `type`) are preserved verbatim.
/// Invariant: elements are grouped by category following the precedence
/// location < type < edge < junction/node < connection < tlLogic. A document
/// that violates the invariant on read is repaired on write via
/// [`NetworkDocument::normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDocument {
    /// Root tag name (`net` for compiled networks).
    pub root_name: String,
    /// Attributes on the root element, preserved verbatim.
    pub root_attributes: Vec<Attribute>,
    /// Ordered top-level elements.
    pub children: Vec<Element>,
}

impl NetworkDocument {
    /// Creates an empty document with the given root tag.
    #[must_use]
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
            root_attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Repairs the category-grouping invariant: stable sort of the top-level
    /// children by precedence rank. Relative order within a category is
    /// preserved; unranked tags sort after all ranked groups.
    pub fn normalize(&mut self) {
        self.children
            .sort_by_key(|child| tag_rank(&child.name).map_or(u8::MAX, |rank| rank));
    }
}

/// One operation of a diff document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOp {
    /// Remove the element identified by the carried key attributes. Missing
    /// targets are ignored (idempotent).
    Delete(Element),
    /// Add or replace an element. For node/edge/program a bare key means
    /// "bring this element unmodified from the reference network"; for
    /// connections the full key is always carried and reference content is
    /// preferred when present.
    Upsert(Element),
}

/// An ordered list of delete/upsert operations for one element category.
///
/// The traffic-light diff legitimately interleaves `connection` upserts with
/// `tlLogic` upserts, and its `delete` entries carrying a `tl` attribute mark
/// connection-level deletions consumed by the cascade resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffDocument {
    /// Category this diff addresses.
    pub category: Category,
    /// Operations in document order.
    pub ops: Vec<DiffOp>,
}

impl DiffDocument {
    /// Creates an empty diff for `category`.
    #[must_use]
    pub fn empty(category: Category) -> Self {
        Self {
            category,
            ops: Vec::new(),
        }
    }
}

/// The four per-category diff documents of one patch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSet {
    /// Node diff.
    pub node: DiffDocument,
    /// Edge diff.
    pub edge: DiffDocument,
    /// Connection diff.
    pub connection: DiffDocument,
    /// Traffic-light program diff.
    pub tls: DiffDocument,
}

impl DiffSet {
    /// A diff set with no operations; applying it is a no-op modulo
    /// category-grouping normalization.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            node: DiffDocument::empty(Category::Node),
            edge: DiffDocument::empty(Category::Edge),
            connection: DiffDocument::empty(Category::Connection),
            tls: DiffDocument::empty(Category::TlLogic),
        }
    }

    /// The diff addressing `category`.
    #[must_use]
    pub fn get(&self, category: Category) -> &DiffDocument {
        match category {
            Category::Node => &self.node,
            Category::Edge => &self.edge,
            Category::Connection => &self.connection,
            Category::TlLogic => &self.tls,
        }
    }
}

/// A connection upsert whose lane endpoints were not yet valid when its
/// category was processed. Retried exactly once, after all edge upserts have
/// settled; still-invalid connections are excluded and reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredConnection {
    /// Endpoint 4-tuple key.
    pub key: ElementKey,
    /// The element to insert if the retry validates.
    pub element: Element,
}
