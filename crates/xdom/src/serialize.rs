//! Markup output for facade nodes

use std::path::Path;

use xdom_traits::{Result, XmlTree};

use crate::node::Node;

/// Prolog written before whole-document output
pub const XML_PROLOG: &str = "<?xml version=\"1.0\"?>\n";

impl Node {
    /// Markup of this node including its own tags
    pub fn outer_markup(&self) -> Result<String> {
        self.document().store().serialize(&self.raw_ref().id())
    }

    /// Content of this node with text children unescaped
    pub fn inner_markup(&self) -> Result<String> {
        self.inner_with(|child| {
            if child.node_type().is_textual() {
                Ok(child.raw_ref().node_value().unwrap_or_default())
            } else {
                child.outer_markup()
            }
        })
    }

    /// Content of this node as serialized XML
    pub fn inner_xml(&self) -> Result<String> {
        self.inner_with(Node::outer_markup)
    }

    fn inner_with<F>(&self, render: F) -> Result<String>
    where
        F: Fn(&Node) -> Result<String>,
    {
        let mut out = String::new();
        for child in self.raw_ref().child_nodes() {
            out.push_str(&render(&Node::from_raw(child))?);
        }
        Ok(out)
    }

    /// The whole document with a prolog when called on the root, otherwise the outer markup
    pub fn as_xml(&self) -> Result<String> {
        if !self.is_root() {
            return self.outer_markup();
        }
        let doc = self.document();
        let body = doc.store().serialize(&doc.document_node())?;
        Ok(format!("{XML_PROLOG}{body}"))
    }

    /// Like [`Node::as_xml`], indented when the document's options ask for it
    pub fn pretty_xml(&self) -> Result<String> {
        let doc = self.document();
        let target = if self.is_root() {
            doc.document_node()
        } else {
            self.raw_ref().id()
        };
        let body = if doc.options().pretty_indent {
            doc.store().serialize_pretty(&target)?
        } else {
            doc.store().serialize(&target)?
        };
        if self.is_root() {
            Ok(format!("{XML_PROLOG}{}", body.trim_start()))
        } else {
            Ok(body)
        }
    }

    /// Write the pretty-printed document to `path`, reporting success
    pub fn save_pretty<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        let written = self
            .root_element()
            .pretty_xml()
            .and_then(|xml| std::fs::write(path, xml).map_err(Into::into));
        match written {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "saved document");
                true
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to save document");
                false
            }
        }
    }
}
