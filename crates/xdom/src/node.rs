//! The facade node: one handle usable as a path-query root and as a tree node
//!
//! [`Node`] wraps a [`RawNode`] and adds the simple view (path queries, named
//! children, attribute indexing, string values). Everything structural is
//! reached either through [`TreeView::raw`] or through the operation table in
//! [`crate::dispatch`].

use std::fmt;

use xdom_traits::{CollectMode, Error, ErrorRecord, NodeType, PathItem, Result};

use crate::dispatch::Value;
use crate::document::Document;
use crate::insert::InsertMode;
use crate::raw::{RawNode, TreeView};

/// Path queries and named access over a node
pub trait SimpleView: Sized {
    /// Nodes selected by `expr` with this node as context, in document order
    fn xpath(&self, expr: &str) -> Result<Vec<Self>>;

    /// Qualified name; `#text`, `#comment` etc. for leaves
    fn name(&self) -> String;

    /// Attribute value by qualified name
    fn attr(&self, name: &str) -> Option<String>;

    /// Set an attribute, returning self for chaining
    fn set_attr(&self, name: &str, value: &str) -> Result<&Self>;

    /// Direct text of the node: its own text children, or the value of a leaf
    fn text(&self) -> String;

    /// First element child named `name`
    fn child(&self, name: &str) -> Option<Self>;

    /// Element children named `name`
    fn children_named(&self, name: &str) -> Vec<Self>;

    /// All element children
    fn element_children(&self) -> Vec<Self>;

    /// Append a new element `name`, optionally holding `text`
    fn add_child(&self, name: &str, text: Option<&str>) -> Result<Self>;
}

/// A facade node
#[derive(Clone, PartialEq, Eq)]
pub struct Node {
    raw: RawNode,
}

impl Node {
    /// Wrap an existing tree-view node
    pub fn from_raw(raw: RawNode) -> Self {
        Self { raw }
    }

    pub(crate) fn raw_ref(&self) -> &RawNode {
        &self.raw
    }

    pub fn document(&self) -> &Document {
        self.raw.document()
    }

    pub fn node_type(&self) -> NodeType {
        self.raw.node_type()
    }

    /// Whether this is the document's root element
    pub fn is_root(&self) -> bool {
        self.raw.is_root()
    }

    /// The document's root element
    pub fn root_element(&self) -> Node {
        self.document().root()
    }

    /// Full result of `expr`: nodes wrapped, atomic values as strings
    pub fn evaluate(&self, expr: &str) -> Result<Vec<Value>> {
        let items = self.document().evaluate(self.raw.id(), expr)?;
        Ok(items
            .into_iter()
            .map(|item| match item {
                PathItem::Node(id) => Value::Node(self.wrap(id)),
                PathItem::Value(text) => Value::String(text),
            })
            .collect())
    }

    /// First node selected by `expr`
    pub fn first_of(&self, expr: &str) -> Result<Option<Node>> {
        Ok(self.xpath(expr)?.into_iter().next())
    }

    pub(crate) fn wrap(&self, id: xdom_xot::Node) -> Node {
        Node::from_raw(self.document().raw(id))
    }

    // ==================== Error log ====================

    /// Records appended to the document's log at or after `offset`
    pub fn errors_since(&self, offset: usize) -> Vec<ErrorRecord> {
        self.document().errors().since(offset)
    }

    pub fn last_error(&self) -> Option<ErrorRecord> {
        self.document().errors().last()
    }

    pub fn clear_errors(&self) {
        self.document().errors().clear();
    }

    /// Switch the log mode, returning `(previous mode, current record count)`
    pub fn use_errors(&self, mode: CollectMode) -> (CollectMode, usize) {
        self.document().errors().use_errors(mode)
    }
}

impl TreeView for Node {
    fn raw(&self) -> RawNode {
        self.raw.clone()
    }
}

impl SimpleView for Node {
    fn xpath(&self, expr: &str) -> Result<Vec<Node>> {
        let items = self.document().evaluate(self.raw.id(), expr)?;
        Ok(items
            .into_iter()
            .filter_map(|item| item.as_node().map(|id| self.wrap(*id)))
            .collect())
    }

    fn name(&self) -> String {
        self.raw.node_name()
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.raw.get_attribute(name)
    }

    fn set_attr(&self, name: &str, value: &str) -> Result<&Self> {
        self.raw.set_attribute(name, value)?;
        Ok(self)
    }

    fn text(&self) -> String {
        match self.node_type() {
            NodeType::Element | NodeType::Document => self
                .raw
                .child_nodes()
                .into_iter()
                .filter(|c| c.node_type().is_textual())
                .filter_map(|c| c.node_value())
                .collect(),
            _ => self.raw.node_value().unwrap_or_default(),
        }
    }

    fn child(&self, name: &str) -> Option<Node> {
        self.children_named(name).into_iter().next()
    }

    fn children_named(&self, name: &str) -> Vec<Node> {
        self.element_children()
            .into_iter()
            .filter(|c| c.name() == name)
            .collect()
    }

    fn element_children(&self) -> Vec<Node> {
        self.raw
            .child_nodes()
            .into_iter()
            .filter(|c| c.node_type() == NodeType::Element)
            .map(Node::from_raw)
            .collect()
    }

    fn add_child(&self, name: &str, text: Option<&str>) -> Result<Node> {
        let namespace = match name.split_once(':') {
            Some((prefix, _)) => self.raw.lookup_namespace_uri(Some(prefix)),
            None => self.raw.lookup_namespace_uri(None),
        };
        let element = self.document().create_element(name, namespace.as_deref())?;
        let child = self
            .insert(element, InsertMode::Append)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("<{name}> after insertion")))?;
        if let Some(text) = text {
            child.insert_text(text, None)?;
        }
        Ok(child)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&self.raw).finish()
    }
}

impl fmt::Display for Node {
    /// Outer markup, or the empty string when serialization fails
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.outer_markup().unwrap_or_default())
    }
}
