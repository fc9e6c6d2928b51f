//! XML tree abstraction traits

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Type of XML node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// Document node
    Document,
    /// Element node
    Element,
    /// Attribute node
    Attribute,
    /// Text node
    Text,
    /// CDATA section
    CData,
    /// Comment node
    Comment,
    /// Processing instruction node
    ProcessingInstruction,
    /// Namespace node
    Namespace,
}

impl NodeType {
    /// The numeric `nodeType` code used by DOM
    pub fn dom_code(self) -> u16 {
        match self {
            NodeType::Element => 1,
            NodeType::Attribute => 2,
            NodeType::Text => 3,
            NodeType::CData => 4,
            NodeType::ProcessingInstruction => 7,
            NodeType::Comment => 8,
            NodeType::Document => 9,
            // DOM has no namespace nodes; XPath namespace nodes are reported as attributes
            NodeType::Namespace => 2,
        }
    }

    /// Text or CDATA
    pub fn is_textual(self) -> bool {
        matches!(self, NodeType::Text | NodeType::CData)
    }

    /// Nodes that carry content but never children
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            NodeType::Text | NodeType::CData | NodeType::Comment | NodeType::ProcessingInstruction
        )
    }
}

/// One attribute of an element, with its arena handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeEntry<N> {
    pub node: N,
    pub namespace: String,
    pub local_name: String,
    pub prefix: Option<String>,
    pub value: String,
}

impl<N> AttributeEntry<N> {
    /// Prefixed name when the attribute is namespaced, local name otherwise
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, self.local_name),
            _ => self.local_name.clone(),
        }
    }
}

/// Read access to an XML tree.
///
/// Node handles are cheap copyable indices into an arena owned by the tree;
/// a handle is only meaningful together with the tree that issued it.
pub trait XmlTree {
    /// Type representing a node handle in this tree
    type Node: Copy + Eq + Hash + Debug;

    /// Parse XML from a string and return the document node
    fn parse_xml(&mut self, xml: &str) -> Result<Self::Node>;

    /// Get the document element (root element) of a document node
    fn document_element(&self, doc: &Self::Node) -> Result<Self::Node>;

    /// Get the parent of a node, if it has one. The parent of an attribute is its element.
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Get all children of a node (attributes and namespace nodes excluded)
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Get the attributes of an element node, in document order
    fn attributes(&self, node: &Self::Node) -> Vec<AttributeEntry<Self::Node>>;

    /// Get the qualified name of a node (if applicable)
    fn node_name(&self, node: &Self::Node) -> Option<String>;

    /// Get the local name of a node (without namespace prefix)
    fn node_local_name(&self, node: &Self::Node) -> Option<String>;

    /// Get the namespace URI of a node
    fn node_namespace_uri(&self, node: &Self::Node) -> Option<String>;

    /// Get the namespace prefix of a node's name
    fn node_prefix(&self, node: &Self::Node) -> Option<String>;

    /// Get the value of a leaf or attribute node
    fn node_value(&self, node: &Self::Node) -> Option<String>;

    /// Get the type of a node
    fn node_type(&self, node: &Self::Node) -> NodeType;

    /// Concatenated text of all descendant text nodes
    fn string_value(&self, node: &Self::Node) -> String;

    /// Source line the node was parsed from, 0 for constructed nodes
    fn line_number(&self, node: &Self::Node) -> usize;

    /// Resolve a prefix (`None` for the default namespace) in scope at `node`
    fn lookup_namespace_uri(&self, node: &Self::Node, prefix: Option<&str>) -> Option<String>;

    /// Find a prefix bound to `uri` in scope at `node`
    fn lookup_prefix(&self, node: &Self::Node, uri: &str) -> Option<String>;

    /// Serialize a node to an XML string, without prolog
    fn serialize(&self, node: &Self::Node) -> Result<String>;

    /// Serialize a node with indentation
    fn serialize_pretty(&self, node: &Self::Node) -> Result<String>;
}

/// Mutation primitives on an XML tree.
///
/// Constructed nodes start out detached. Insertion primitives return the
/// placed node; adjacent text is not merged.
pub trait MutableXmlTree: XmlTree {
    /// Create a new element node; `name` may carry a `prefix:`
    fn create_element(&mut self, name: &str, namespace: Option<&str>) -> Result<Self::Node>;

    /// Create a new text node
    fn create_text(&mut self, text: &str) -> Result<Self::Node>;

    /// Create a new comment node
    fn create_comment(&mut self, text: &str) -> Result<Self::Node>;

    /// Create a new processing instruction node
    fn create_processing_instruction(
        &mut self,
        target: &str,
        data: Option<&str>,
    ) -> Result<Self::Node>;

    /// Parse markup as a forest of detached sibling nodes
    fn parse_fragment(&mut self, markup: &str) -> Result<Vec<Self::Node>>;

    /// Append a child to a node
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<Self::Node>;

    /// Insert `new` as the preceding sibling of `reference`
    fn insert_before(&mut self, reference: &Self::Node, new: &Self::Node) -> Result<Self::Node>;

    /// Insert `new` as the following sibling of `reference`
    fn insert_after(&mut self, reference: &Self::Node, new: &Self::Node) -> Result<Self::Node>;

    /// Detach a node (and its subtree) from its parent, keeping it alive
    fn detach(&mut self, node: &Self::Node) -> Result<()>;

    /// Remove a node and its subtree from the arena
    fn remove(&mut self, node: &Self::Node) -> Result<()>;

    /// Set an attribute on an element, returning the attribute node
    fn set_attribute(
        &mut self,
        element: &Self::Node,
        name: &str,
        value: &str,
        namespace: Option<&str>,
    ) -> Result<Self::Node>;

    /// Remove an attribute; returns whether it existed
    fn remove_attribute(
        &mut self,
        element: &Self::Node,
        local_name: &str,
        namespace: Option<&str>,
    ) -> Result<bool>;

    /// Replace the content of a text node
    fn set_text(&mut self, node: &Self::Node, text: &str) -> Result<()>;

    /// Clone a node with its whole subtree; the clone is detached
    fn deep_clone(&mut self, node: &Self::Node) -> Result<Self::Node>;

    /// Clone a node with its attributes but without children
    fn shallow_clone(&mut self, node: &Self::Node) -> Result<Self::Node>;
}
