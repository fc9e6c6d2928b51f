//! Insertion and removal relative to a subject node
//!
//! This module is the only place nodes are attached next to or removed from
//! the document root. Before/After insertions of elements, text or fragments
//! next to the root, and every attempt to delete, remove or replace the root,
//! fail with `InvalidStructuralOperation`. Comments and processing
//! instructions may still be placed around the root.

use strum::{Display, EnumString};
use xdom_traits::{Error, MutableXmlTree, NodeType, Result, XmlTree};

use crate::fragment::Fragment;
use crate::node::{Node, SimpleView};
use crate::raw::RawNode;

/// Where a new node goes relative to the subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum InsertMode {
    /// Last child of the subject
    #[default]
    Append,
    /// Immediately preceding sibling
    Before,
    /// Immediately following sibling
    After,
}

/// Shape of the nodes handed back by an insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnAs {
    Raw,
    #[default]
    Wrapped,
}

/// Nodes placed by one insertion, in document order
#[derive(Debug, Clone)]
pub enum Inserted {
    Raw(Vec<RawNode>),
    Wrapped(Vec<Node>),
}

impl Inserted {
    pub fn len(&self) -> usize {
        match self {
            Inserted::Raw(nodes) => nodes.len(),
            Inserted::Wrapped(nodes) => nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Facade handles for the placed nodes
    pub fn into_nodes(self) -> Vec<Node> {
        match self {
            Inserted::Raw(nodes) => nodes.into_iter().map(Node::from_raw).collect(),
            Inserted::Wrapped(nodes) => nodes,
        }
    }
}

/// Anything that can be inserted
#[derive(Debug, Clone)]
pub enum Insertable {
    Node(Node),
    Raw(RawNode),
    Fragment(Fragment),
}

impl Insertable {
    /// Kinds that may not become siblings of the document root
    fn forbidden_beside_root(&self) -> bool {
        let kind = match self {
            Insertable::Node(node) => node.node_type(),
            Insertable::Raw(raw) => raw.node_type(),
            Insertable::Fragment(_) => return true,
        };
        matches!(kind, NodeType::Element | NodeType::Text | NodeType::CData)
    }

    /// The nodes to place, moved or imported into `target`'s document
    fn adopted_by(&self, target: &Node) -> Result<Vec<RawNode>> {
        let doc = target.document();
        match self {
            Insertable::Node(node) => Ok(vec![doc.raw(doc.adopt(node.raw_ref())?)]),
            Insertable::Raw(raw) => Ok(vec![doc.raw(doc.adopt(raw)?)]),
            Insertable::Fragment(fragment) => fragment.adopted_by(doc),
        }
    }

    /// Fresh copies of the nodes for `target`'s document
    fn copied_for(&self, target: &Node) -> Result<Vec<RawNode>> {
        let doc = target.document();
        let sources = match self {
            Insertable::Node(node) => vec![node.raw_ref().clone()],
            Insertable::Raw(raw) => vec![raw.clone()],
            Insertable::Fragment(fragment) => fragment.nodes(),
        };
        sources
            .iter()
            .map(|source| Ok(doc.raw(doc.import(source)?)))
            .collect()
    }
}

impl From<Node> for Insertable {
    fn from(value: Node) -> Self {
        Insertable::Node(value)
    }
}

impl From<&Node> for Insertable {
    fn from(value: &Node) -> Self {
        Insertable::Node(value.clone())
    }
}

impl From<RawNode> for Insertable {
    fn from(value: RawNode) -> Self {
        Insertable::Raw(value)
    }
}

impl From<Fragment> for Insertable {
    fn from(value: Fragment) -> Self {
        Insertable::Fragment(value)
    }
}

impl Node {
    pub(crate) fn root_guard(&self, action: &str) -> Result<()> {
        if self.is_root() {
            return Err(Error::structural(format!("cannot {action} the document root")));
        }
        Ok(())
    }

    /// Insert `new` relative to this node, returning the placed nodes wrapped
    pub fn insert<I: Into<Insertable>>(&self, new: I, mode: InsertMode) -> Result<Vec<Node>> {
        Ok(self.insert_as(new, mode, ReturnAs::Wrapped)?.into_nodes())
    }

    /// Insert `new` relative to this node.
    ///
    /// A node from the same document is moved; a node from another document is
    /// deep-copied in. A fragment places all its nodes in order.
    pub fn insert_as<I: Into<Insertable>>(
        &self,
        new: I,
        mode: InsertMode,
        ret: ReturnAs,
    ) -> Result<Inserted> {
        let new = new.into();
        if mode != InsertMode::Append && self.is_root() && new.forbidden_beside_root() {
            return Err(Error::structural(format!(
                "cannot insert a sibling {mode} the document root"
            )));
        }
        let items = new.adopted_by(self)?;
        let placed = self.place(&items, mode)?;
        tracing::debug!(%mode, count = placed.len(), subject = %self.raw_ref().node_name(), "inserted");
        Ok(match ret {
            ReturnAs::Raw => Inserted::Raw(placed),
            ReturnAs::Wrapped => Inserted::Wrapped(placed.into_iter().map(Node::from_raw).collect()),
        })
    }

    fn place(&self, items: &[RawNode], mode: InsertMode) -> Result<Vec<RawNode>> {
        let subject = self.raw_ref();
        if mode != InsertMode::Append {
            self.check_siblings(items)?;
        }
        let mut placed = Vec::with_capacity(items.len());
        match mode {
            InsertMode::Append => {
                for item in items {
                    placed.push(subject.append_child(item)?);
                }
            }
            InsertMode::Before => {
                let doc = self.document();
                for item in items {
                    let id = doc.store_mut().insert_before(&subject.id(), &item.id())?;
                    placed.push(doc.raw(id));
                }
            }
            InsertMode::After => {
                let doc = self.document();
                // Items go in front of the first following sibling that is not itself being placed
                let (parent, anchor) = {
                    let store = doc.store();
                    let parent = store
                        .parent(&subject.id())
                        .ok_or_else(|| Error::structural("a detached node has no siblings"))?;
                    let anchor = store
                        .children(&parent)
                        .into_iter()
                        .skip_while(|id| *id != subject.id())
                        .skip(1)
                        .find(|id| items.iter().all(|item| item.id() != *id));
                    (parent, anchor)
                };
                for item in items {
                    let id = match &anchor {
                        Some(next) => doc.store_mut().insert_before(next, &item.id())?,
                        None => doc.store_mut().append_child(&parent, &item.id())?,
                    };
                    placed.push(doc.raw(id));
                }
            }
        }
        Ok(placed)
    }

    /// Sibling placement checks the tree view does not make for us
    fn check_siblings(&self, items: &[RawNode]) -> Result<()> {
        let subject = self.raw_ref();
        if subject.node_type() == NodeType::Attribute {
            return Err(Error::structural("attribute nodes have no siblings"));
        }
        if self.document().store().parent(&subject.id()).is_none() {
            return Err(Error::structural("a detached node has no siblings"));
        }
        for item in items {
            if matches!(item.node_type(), NodeType::Attribute | NodeType::Document) {
                return Err(Error::structural(format!(
                    "{:?} nodes cannot be inserted as siblings",
                    item.node_type()
                )));
            }
            if item.is_root() {
                return Err(Error::structural("the document root cannot be moved"));
            }
            if item.contains(subject) {
                return Err(Error::structural("a node cannot be inserted next to itself"));
            }
        }
        Ok(())
    }

    /// Insert `new` as the preceding sibling
    pub fn insert_before_self<I: Into<Insertable>>(&self, new: I) -> Result<Vec<Node>> {
        self.insert(new, InsertMode::Before)
    }

    /// Insert `new` as the following sibling
    pub fn insert_after_self<I: Into<Insertable>>(&self, new: I) -> Result<Vec<Node>> {
        self.insert(new, InsertMode::After)
    }

    // ==================== Removal ====================

    /// Remove this node and its subtree from the document.
    ///
    /// The subtree stays readable through handles the caller still holds.
    pub fn delete_self(&self) -> Result<()> {
        self.root_guard("delete")?;
        let subject = self.raw_ref();
        if subject.node_type() == NodeType::Attribute {
            let local = subject.local_name().unwrap_or_default();
            let namespace = subject.namespace_uri();
            let element = self.document().store().parent(&subject.id());
            if let Some(element) = element {
                let element = self.document().raw(element);
                element.remove_attribute_ns(namespace.as_deref(), &local)?;
            }
            return Ok(());
        }
        tracing::debug!(node = %subject.node_name(), "delete");
        self.document().store_mut().detach(&subject.id())
    }

    /// Detach this node, returning it for reuse
    pub fn remove_self(&self) -> Result<Node> {
        self.root_guard("remove")?;
        let subject = self.raw_ref();
        if subject.node_type() == NodeType::Attribute {
            return Err(Error::invalid_argument(
                "attribute nodes cannot be detached, delete them instead",
            ));
        }
        tracing::debug!(node = %subject.node_name(), "remove");
        self.document().store_mut().detach(&subject.id())?;
        Ok(self.clone())
    }

    /// Put a copy of `new` in this node's place, returning this node detached
    pub fn replace_self<I: Into<Insertable>>(&self, new: I) -> Result<Node> {
        self.replace_with(&new.into())
    }

    fn replace_with(&self, new: &Insertable) -> Result<Node> {
        self.root_guard("replace")?;
        let items = new.copied_for(self)?;
        self.place(&items, InsertMode::Before)?;
        self.remove_self()
    }

    // ==================== Bulk ====================

    /// Matches of `expr` other than the root, in reverse document order so a
    /// match is handled before any match containing it
    fn removable_matches(&self, expr: &str) -> Result<Vec<Node>> {
        let doc = self.document();
        let mut matches: Vec<Node> = self
            .xpath(expr)?
            .into_iter()
            .filter(|n| !n.is_root() && n.raw_ref().id() != doc.document_node())
            .collect();
        matches.reverse();
        Ok(matches)
    }

    /// Delete every node matched by `expr`, nested matches included, returning
    /// how many were deleted
    pub fn delete_nodes(&self, expr: &str) -> Result<usize> {
        let targets = self.removable_matches(expr)?;
        for node in &targets {
            node.delete_self()?;
        }
        tracing::debug!(expr, count = targets.len(), "bulk delete");
        Ok(targets.len())
    }

    /// Detach every node matched by `expr`, returned in document order. A match
    /// nested in another match is detached from it too. Matched attributes are
    /// deleted and left out of the returned list.
    pub fn remove_nodes(&self, expr: &str) -> Result<Vec<Node>> {
        let mut removed = Vec::new();
        for node in self.removable_matches(expr)? {
            if node.node_type() == NodeType::Attribute {
                node.delete_self()?;
            } else {
                removed.push(node.remove_self()?);
            }
        }
        removed.reverse();
        tracing::debug!(expr, count = removed.len(), "bulk remove");
        Ok(removed)
    }

    /// Replace every node matched by `expr` with its own copy of `new`,
    /// returning the replaced nodes in document order
    pub fn replace_nodes<I: Into<Insertable>>(&self, expr: &str, new: I) -> Result<Vec<Node>> {
        let new = new.into();
        let mut replaced = Vec::new();
        for node in self.removable_matches(expr)? {
            replaced.push(node.replace_with(&new)?);
        }
        replaced.reverse();
        tracing::debug!(expr, count = replaced.len(), "bulk replace");
        Ok(replaced)
    }
}
