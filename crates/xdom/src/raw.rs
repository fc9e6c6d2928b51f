//! The tree view: structural node primitives over arena handles
//!
//! A [`RawNode`] is a `(document, arena index)` pair. Its methods are the
//! DOM-like primitives the facade forwards to. The document root is reported
//! with no parent and no siblings, so no primitive reachable from here can
//! detach it or put a sibling next to it.

use std::collections::HashSet;
use std::fmt;

use xdom_traits::{Error, MutableXmlTree, NodeType, Result, XmlTree};
use xdom_xot::Node as XNode;

use crate::document::Document;

/// Structural tree capability, shared by raw nodes and facade nodes
pub trait TreeView {
    /// The tree-view handle for this position
    fn raw(&self) -> RawNode;
}

/// A node seen through the tree view only
#[derive(Clone)]
pub struct RawNode {
    doc: Document,
    id: XNode,
}

impl RawNode {
    pub(crate) fn new(doc: Document, id: XNode) -> Self {
        Self { doc, id }
    }

    pub(crate) fn id(&self) -> XNode {
        self.id
    }

    /// The document owning this node
    pub fn document(&self) -> &Document {
        &self.doc
    }

    fn wrap(&self, id: XNode) -> RawNode {
        RawNode::new(self.doc.clone(), id)
    }

    /// Whether this is the document's root element
    pub fn is_root(&self) -> bool {
        self.id == self.doc.root_id()
    }

    // ==================== Node state ====================

    pub fn node_type(&self) -> NodeType {
        self.doc.store().node_type(&self.id)
    }

    pub fn node_name(&self) -> String {
        self.doc.store().node_name(&self.id).unwrap_or_default()
    }

    pub fn node_value(&self) -> Option<String> {
        self.doc.store().node_value(&self.id)
    }

    pub fn local_name(&self) -> Option<String> {
        self.doc.store().node_local_name(&self.id)
    }

    pub fn namespace_uri(&self) -> Option<String> {
        self.doc.store().node_namespace_uri(&self.id)
    }

    pub fn prefix(&self) -> Option<String> {
        self.doc.store().node_prefix(&self.id)
    }

    /// Text of every descendant text node, in document order
    pub fn text_content(&self) -> String {
        self.doc.store().string_value(&self.id)
    }

    /// Source line of the element, 0 for nodes built after parsing
    pub fn line_no(&self) -> usize {
        self.doc.store().line_number(&self.id)
    }

    // ==================== Navigation ====================

    pub fn parent(&self) -> Option<RawNode> {
        if self.is_root() {
            return None;
        }
        let parent = self.doc.store().parent(&self.id)?;
        (parent != self.doc.document_node()).then(|| self.wrap(parent))
    }

    pub fn child_nodes(&self) -> Vec<RawNode> {
        let children = self.doc.store().children(&self.id);
        children.into_iter().map(|id| self.wrap(id)).collect()
    }

    pub fn first_child(&self) -> Option<RawNode> {
        self.child_nodes().into_iter().next()
    }

    pub fn last_child(&self) -> Option<RawNode> {
        self.child_nodes().into_iter().last()
    }

    fn sibling(&self, offset: isize) -> Option<RawNode> {
        if self.is_root() || self.node_type() == NodeType::Attribute {
            return None;
        }
        let parent = self.doc.store().parent(&self.id)?;
        let siblings = self.doc.store().children(&parent);
        let index = siblings.iter().position(|n| *n == self.id)?;
        let target = index.checked_add_signed(offset)?;
        siblings.get(target).map(|id| self.wrap(*id))
    }

    pub fn previous_sibling(&self) -> Option<RawNode> {
        self.sibling(-1)
    }

    pub fn next_sibling(&self) -> Option<RawNode> {
        self.sibling(1)
    }

    pub fn has_child_nodes(&self) -> bool {
        !self.doc.store().children(&self.id).is_empty()
    }

    pub fn is_same_node(&self, other: &RawNode) -> bool {
        self == other
    }

    /// Whether `self` is `other` or one of its ancestors
    pub fn contains(&self, other: &RawNode) -> bool {
        if !self.doc.same(&other.doc) {
            return false;
        }
        let store = self.doc.store();
        let mut current = Some(other.id);
        while let Some(node) = current {
            if node == self.id {
                return true;
            }
            current = store.parent(&node);
        }
        false
    }

    /// Elements below this node whose qualified name matches; `*` matches all
    pub fn get_elements_by_tag_name(&self, name: &str) -> Vec<RawNode> {
        self.descendant_elements()
            .into_iter()
            .filter(|el| name == "*" || el.node_name() == name)
            .collect()
    }

    /// Elements below this node matching namespace and local name; `*` is a wildcard for either
    pub fn get_elements_by_tag_name_ns(&self, namespace: Option<&str>, local: &str) -> Vec<RawNode> {
        let namespace = namespace.unwrap_or("");
        self.descendant_elements()
            .into_iter()
            .filter(|el| {
                let ns_ok = namespace == "*" || el.namespace_uri().unwrap_or_default() == namespace;
                let local_ok = local == "*" || el.local_name().as_deref() == Some(local);
                ns_ok && local_ok
            })
            .collect()
    }

    fn descendant_elements(&self) -> Vec<RawNode> {
        let mut out = Vec::new();
        let mut stack: Vec<RawNode> = self.child_nodes().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if node.node_type() == NodeType::Element {
                stack.extend(node.child_nodes().into_iter().rev());
                out.push(node);
            }
        }
        out
    }

    // ==================== Attributes ====================

    pub fn has_attributes(&self) -> bool {
        !self.doc.store().attributes(&self.id).is_empty()
    }

    /// Attribute value by qualified name
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.doc
            .store()
            .attributes(&self.id)
            .into_iter()
            .find(|a| a.qualified_name() == name)
            .map(|a| a.value)
    }

    /// Attribute value by namespace and local name
    pub fn get_attribute_ns(&self, namespace: Option<&str>, local: &str) -> Option<String> {
        let namespace = namespace.unwrap_or("");
        self.doc
            .store()
            .attributes(&self.id)
            .into_iter()
            .find(|a| a.namespace == namespace && a.local_name == local)
            .map(|a| a.value)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    pub fn has_attribute_ns(&self, namespace: Option<&str>, local: &str) -> bool {
        self.get_attribute_ns(namespace, local).is_some()
    }

    /// Set an attribute, returning the attribute node
    pub fn set_attribute(&self, name: &str, value: &str) -> Result<RawNode> {
        let existing = self
            .doc
            .store()
            .attributes(&self.id)
            .into_iter()
            .find(|a| a.qualified_name() == name);
        let id = match existing {
            Some(attr) => {
                let namespace = (!attr.namespace.is_empty()).then_some(attr.namespace.as_str());
                self.doc
                    .store_mut()
                    .set_attribute(&self.id, name, value, namespace)?
            }
            None => {
                // A prefixed name without a namespace binds to the in-scope declaration
                let namespace = name
                    .split_once(':')
                    .and_then(|(prefix, _)| self.lookup_namespace_uri(Some(prefix)));
                self.doc
                    .store_mut()
                    .set_attribute(&self.id, name, value, namespace.as_deref())?
            }
        };
        Ok(self.wrap(id))
    }

    /// Set a namespaced attribute; `qualified_name` may carry a prefix
    pub fn set_attribute_ns(
        &self,
        namespace: Option<&str>,
        qualified_name: &str,
        value: &str,
    ) -> Result<RawNode> {
        let id = self
            .doc
            .store_mut()
            .set_attribute(&self.id, qualified_name, value, namespace)?;
        Ok(self.wrap(id))
    }

    pub fn remove_attribute(&self, name: &str) -> Result<bool> {
        let existing = self
            .doc
            .store()
            .attributes(&self.id)
            .into_iter()
            .find(|a| a.qualified_name() == name);
        match existing {
            Some(attr) => {
                let namespace = (!attr.namespace.is_empty()).then_some(attr.namespace.as_str());
                self.doc
                    .store_mut()
                    .remove_attribute(&self.id, &attr.local_name, namespace)
            }
            None => Ok(false),
        }
    }

    pub fn remove_attribute_ns(&self, namespace: Option<&str>, local: &str) -> Result<bool> {
        self.doc
            .store_mut()
            .remove_attribute(&self.id, local, namespace)
    }

    // ==================== Namespaces ====================

    pub fn lookup_namespace_uri(&self, prefix: Option<&str>) -> Option<String> {
        self.doc.store().lookup_namespace_uri(&self.id, prefix)
    }

    pub fn lookup_prefix(&self, uri: &str) -> Option<String> {
        self.doc.store().lookup_prefix(&self.id, uri)
    }

    pub fn is_default_namespace(&self, uri: &str) -> bool {
        self.lookup_namespace_uri(None).as_deref() == Some(uri)
    }

    // ==================== Mutation ====================

    fn check_insertable(&self, child: &RawNode) -> Result<()> {
        if !self.doc.same(&child.doc) {
            return Err(Error::structural("node belongs to a different document"));
        }
        if !matches!(self.node_type(), NodeType::Element) {
            return Err(Error::structural(format!(
                "{:?} nodes cannot have children",
                self.node_type()
            )));
        }
        if matches!(
            child.node_type(),
            NodeType::Attribute | NodeType::Document | NodeType::Namespace
        ) {
            return Err(Error::structural(format!(
                "{:?} nodes cannot be inserted as children",
                child.node_type()
            )));
        }
        if child.is_root() {
            return Err(Error::structural("the document root cannot be moved"));
        }
        if child.contains(self) {
            return Err(Error::structural("a node cannot be inserted into itself"));
        }
        Ok(())
    }

    fn ensure_child(&self, child: &RawNode) -> Result<()> {
        if child.parent().as_ref() != Some(self) {
            return Err(Error::not_found(format!(
                "<{}> is not a child of <{}>",
                child.node_name(),
                self.node_name()
            )));
        }
        Ok(())
    }

    /// Append `child` as the last child, returning the node now holding it
    pub fn append_child(&self, child: &RawNode) -> Result<RawNode> {
        self.check_insertable(child)?;
        let id = self.doc.store_mut().append_child(&self.id, &child.id)?;
        Ok(self.wrap(id))
    }

    /// Insert `new` before `reference`, or append when there is none
    pub fn insert_before(&self, new: &RawNode, reference: Option<&RawNode>) -> Result<RawNode> {
        let Some(reference) = reference else {
            return self.append_child(new);
        };
        self.check_insertable(new)?;
        self.ensure_child(reference)?;
        let id = self.doc.store_mut().insert_before(&reference.id, &new.id)?;
        Ok(self.wrap(id))
    }

    /// Replace child `old` by `new`, returning `old` (now detached)
    pub fn replace_child(&self, new: &RawNode, old: &RawNode) -> Result<RawNode> {
        self.check_insertable(new)?;
        self.ensure_child(old)?;
        if new == old {
            return Ok(old.clone());
        }
        let mut store = self.doc.store_mut();
        store.insert_before(&old.id, &new.id)?;
        store.detach(&old.id)?;
        Ok(old.clone())
    }

    /// Detach child `old`, returning it
    pub fn remove_child(&self, old: &RawNode) -> Result<RawNode> {
        self.ensure_child(old)?;
        self.doc.store_mut().detach(&old.id)?;
        Ok(old.clone())
    }

    /// Copy this node; `deep` includes descendants
    pub fn clone_node(&self, deep: bool) -> Result<RawNode> {
        let id = if deep {
            self.doc.store_mut().deep_clone(&self.id)?
        } else {
            self.doc.store_mut().shallow_clone(&self.id)?
        };
        Ok(self.wrap(id))
    }

    /// Merge adjacent text nodes and drop empty ones in this subtree
    pub fn normalize(&self) -> Result<()> {
        for child in self.child_nodes() {
            match child.node_type() {
                NodeType::Element => child.normalize()?,
                NodeType::Text | NodeType::CData => {
                    let text = child.node_value().unwrap_or_default();
                    if text.is_empty() {
                        self.doc.store_mut().detach(&child.id)?;
                        continue;
                    }
                    if let Some(prev) = child.previous_sibling() {
                        if prev.node_type().is_textual() {
                            let merged = prev.node_value().unwrap_or_default() + &text;
                            let mut store = self.doc.store_mut();
                            store.set_text(&prev.id, &merged)?;
                            store.detach(&child.id)?;
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    // ==================== Outside the facade's table ====================

    /// XPath locating this node from the document, like `/root/item[2]/@id`
    pub fn node_path(&self) -> String {
        let mut steps = Vec::new();
        let mut current = Some(self.clone());
        while let Some(node) = current {
            let step = match node.node_type() {
                NodeType::Attribute => format!("@{}", node.node_name()),
                NodeType::Text | NodeType::CData => format!("text(){}", node.position_suffix()),
                NodeType::Comment => format!("comment(){}", node.position_suffix()),
                NodeType::ProcessingInstruction => {
                    format!("processing-instruction(){}", node.position_suffix())
                }
                _ => format!("{}{}", node.node_name(), node.position_suffix()),
            };
            steps.push(step);
            current = match node.node_type() {
                NodeType::Attribute => self.doc.store().parent(&node.id).map(|p| self.wrap(p)),
                _ => node.parent(),
            };
        }
        steps.reverse();
        format!("/{}", steps.join("/"))
    }

    /// `[n]` when a same-named sibling of the same kind exists
    fn position_suffix(&self) -> String {
        let Some(parent) = self.parent() else {
            return String::new();
        };
        let kind = self.node_type();
        let name = self.node_name();
        let peers: Vec<RawNode> = parent
            .child_nodes()
            .into_iter()
            .filter(|n| n.node_type() == kind && n.node_name() == name)
            .collect();
        if peers.len() < 2 {
            return String::new();
        }
        let index = peers.iter().position(|n| n == self).unwrap_or(0);
        format!("[{}]", index + 1)
    }

    /// DOM position bitmask of `other` relative to `self`
    pub fn compare_document_position(&self, other: &RawNode) -> u16 {
        const DISCONNECTED: u16 = 0x01;
        const PRECEDING: u16 = 0x02;
        const FOLLOWING: u16 = 0x04;
        const CONTAINS: u16 = 0x08;
        const CONTAINED_BY: u16 = 0x10;

        if self == other {
            return 0;
        }
        if !self.doc.same(&other.doc) {
            return DISCONNECTED;
        }
        let mine = self.ancestry();
        let theirs = other.ancestry();
        if mine.first() != theirs.first() {
            return DISCONNECTED;
        }
        if mine.contains(&other.id) {
            return CONTAINS | PRECEDING;
        }
        if theirs.contains(&self.id) {
            return CONTAINED_BY | FOLLOWING;
        }
        let common = mine.iter().zip(&theirs).take_while(|(a, b)| a == b).count();
        let store = self.doc.store();
        let order = store.children(&mine[common - 1]);
        let a = order.iter().position(|n| *n == mine[common]);
        let b = order.iter().position(|n| *n == theirs[common]);
        if b < a {
            PRECEDING
        } else {
            FOLLOWING
        }
    }

    /// Arena path from the top of this node's tree down to the node
    fn ancestry(&self) -> Vec<XNode> {
        let store = self.doc.store();
        let mut chain = vec![self.id];
        let mut current = self.id;
        while let Some(parent) = store.parent(&current) {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// Append `data` to a text node
    pub fn append_data(&self, data: &str) -> Result<()> {
        if !self.node_type().is_textual() {
            return Err(Error::invalid_argument(format!(
                "{:?} nodes carry no character data",
                self.node_type()
            )));
        }
        let value = self.node_value().unwrap_or_default() + data;
        self.doc.store_mut().set_text(&self.id, &value)
    }

    /// Structural equality: same kind, name, attributes and content
    pub fn is_equal_node(&self, other: &RawNode) -> bool {
        if self.node_type() != other.node_type() {
            return false;
        }
        let attributes = |n: &RawNode| -> HashSet<(String, String, String)> {
            n.doc
                .store()
                .attributes(&n.id)
                .into_iter()
                .map(|a| (a.namespace, a.local_name, a.value))
                .collect()
        };
        if self.node_name() != other.node_name()
            || self.namespace_uri() != other.namespace_uri()
            || self.node_value() != other.node_value()
            || attributes(self) != attributes(other)
        {
            return false;
        }
        let mine = self.child_nodes();
        let theirs = other.child_nodes();
        mine.len() == theirs.len() && mine.iter().zip(&theirs).all(|(a, b)| a.is_equal_node(b))
    }
}

impl TreeView for RawNode {
    fn raw(&self) -> RawNode {
        self.clone()
    }
}

impl PartialEq for RawNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.doc.same(&other.doc)
    }
}

impl Eq for RawNode {}

impl fmt::Debug for RawNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawNode")
            .field("type", &self.node_type())
            .field("name", &self.node_name())
            .finish()
    }
}
