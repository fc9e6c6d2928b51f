//! Fragments: detached sibling forests parsed from markup
//!
//! Markup handed to [`Node::insert_fragment`] may be plain text, one element,
//! or several top-level nodes. Parsing happens inside a capture scope so a
//! malformed fragment reports `MalformedFragment` without surfacing parser
//! records, and leaves the target tree untouched.

use xdom_traits::{Error, ErrorRecord, MutableXmlTree, Origin, Result, Severity, XmlTree};
use xdom_xot::Node as XNode;

use crate::capture::run_captured;
use crate::document::Document;
use crate::insert::InsertMode;
use crate::node::Node;
use crate::raw::RawNode;

const FALLBACK_MESSAGE: &str = "fragment markup could not be parsed";

/// An unattached forest of sibling nodes owned by one document
#[derive(Debug, Clone)]
pub struct Fragment {
    doc: Document,
    nodes: Vec<XNode>,
}

impl Fragment {
    /// An empty fragment for `doc`
    pub fn new(doc: &Document) -> Self {
        Self {
            doc: doc.clone(),
            nodes: Vec::new(),
        }
    }

    /// Parse `markup` into a fragment of `doc`
    pub fn parse(doc: &Document, markup: &str) -> Result<Self> {
        let mut fragment = Self::new(doc);
        fragment.nodes = if doc.options().trap_fragment_errors {
            let (result, errors) = run_captured(doc.errors(), || parse_reporting(doc, markup));
            result.map_err(|_| {
                let message = errors
                    .first()
                    .map(|record| record.message.clone())
                    .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
                Error::MalformedFragment(message)
            })?
        } else {
            parse_reporting(doc, markup)?
        };
        Ok(fragment)
    }

    /// Append a detached node of the same document
    pub fn push(&mut self, node: &RawNode) -> Result<()> {
        if !self.doc.same(node.document()) {
            return Err(Error::structural("fragment nodes must belong to the fragment's document"));
        }
        let attached = self.doc.store().parent(&node.id()).is_some();
        if attached {
            return Err(Error::structural("only detached nodes can join a fragment"));
        }
        self.nodes.push(node.id());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The fragment's nodes, in order
    pub fn nodes(&self) -> Vec<RawNode> {
        self.nodes.iter().map(|id| self.doc.raw(*id)).collect()
    }

    /// The nodes as members of `target`, importing them when the fragment belongs elsewhere
    pub(crate) fn adopted_by(&self, target: &Document) -> Result<Vec<RawNode>> {
        if target.same(&self.doc) {
            return Ok(self.nodes());
        }
        self.nodes()
            .iter()
            .map(|node| Ok(target.raw(target.import(node)?)))
            .collect()
    }

    /// Free the nodes that are still detached
    fn discard(self) {
        let mut store = self.doc.store_mut();
        for id in &self.nodes {
            if store.is_removed(id) || store.parent(id).is_some() {
                continue;
            }
            if let Err(err) = store.remove(id) {
                tracing::trace!(%err, "could not free fragment node");
            }
        }
    }
}

/// Parse into the document's arena, recording a failure in its error log
fn parse_reporting(doc: &Document, markup: &str) -> Result<Vec<XNode>> {
    let result = doc.store_mut().parse_fragment(markup);
    if let Err(err) = &result {
        let message = match err {
            Error::XmlParse(message) => message.clone(),
            other => other.to_string(),
        };
        doc.errors()
            .push(ErrorRecord::new(Severity::Error, Origin::Fragment, message));
    }
    result
}

impl Node {
    /// Parse `markup` and insert the resulting nodes relative to this node.
    ///
    /// Returns this node for chaining. A malformed fragment fails with
    /// `MalformedFragment` carrying the first captured parser message.
    pub fn insert_fragment(&self, markup: &str, mode: InsertMode) -> Result<&Self> {
        let fragment = Fragment::parse(self.document(), markup)?;
        tracing::debug!(%mode, nodes = fragment.len(), "fragment parsed");
        if let Err(err) = self.insert(fragment.clone(), mode) {
            fragment.discard();
            return Err(err);
        }
        Ok(self)
    }
}
