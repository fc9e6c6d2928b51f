//! Stylesheet transformation of facade nodes

use std::path::Path;

use xdom_traits::{Result, XmlTree, XsltProcessor};
use xdom_xot::XeeXsltProcessor;

use crate::node::Node;

impl Node {
    /// Transform this node with the stylesheet at `path`
    pub fn xslt<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let stylesheet = std::fs::read_to_string(path.as_ref())?;
        self.xslt_str(&stylesheet)
    }

    /// Transform this node with `stylesheet` markup, returning the serialized result.
    ///
    /// The root transforms the whole document; any other node is transformed as
    /// a document of its own.
    pub fn xslt_str(&self, stylesheet: &str) -> Result<String> {
        let source = if self.is_root() {
            let doc = self.document();
            let store = doc.store();
            store.serialize(&doc.document_node())?
        } else {
            self.outer_markup()?
        };
        XeeXsltProcessor::new().transform(&source, stylesheet)
    }
}
