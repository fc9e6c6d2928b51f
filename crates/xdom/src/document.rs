//! Documents: the owner of one arena, its path engine and its error sink

use serde::{Deserialize, Serialize};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use xdom_traits::{
    Error, ErrorRecord, MutableXmlTree, NodeType, Origin, PathEngine, PathItem, Result, Severity,
    XmlTree,
};
use xdom_xot::{Node as XNode, XeePathEngine, XotStore};

use crate::capture::{run_captured, ErrorSink};
use crate::node::Node;
use crate::raw::RawNode;

/// Per-document behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Parse fragment markup inside a capture scope and report `MalformedFragment`
    pub trap_fragment_errors: bool,
    /// Run path queries of bulk operations inside a capture scope
    pub trap_path_errors: bool,
    /// Indent output of `pretty_xml`
    pub pretty_indent: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            trap_fragment_errors: true,
            trap_path_errors: true,
            pretty_indent: true,
        }
    }
}

struct DocumentData {
    store: RefCell<XotStore>,
    document_node: XNode,
    root: XNode,
    engine: XeePathEngine,
    sink: ErrorSink,
    options: Cell<Options>,
}

/// An XML document with exactly one root element.
///
/// Cloning a `Document` clones the handle, not the tree.
#[derive(Clone)]
pub struct Document {
    data: Rc<DocumentData>,
}

impl Document {
    /// Parse a document from markup with a fresh error sink
    pub fn parse(xml: &str) -> Result<Self> {
        Self::parse_with_sink(xml, ErrorSink::new())
    }

    /// Parse a document, reporting parser diagnostics to `sink`
    pub fn parse_with_sink(xml: &str, sink: ErrorSink) -> Result<Self> {
        let mut store = XotStore::new();
        let document_node = match store.parse_xml(xml) {
            Ok(node) => node,
            Err(err) => {
                sink.push(ErrorRecord::new(Severity::Fatal, Origin::Parser, err.to_string()));
                return Err(err);
            }
        };
        let root = store.document_element(&document_node)?;
        tracing::debug!(bytes = xml.len(), "parsed document");
        Ok(Self {
            data: Rc::new(DocumentData {
                store: RefCell::new(store),
                document_node,
                root,
                engine: XeePathEngine::new(),
                sink,
                options: Cell::new(Options::default()),
            }),
        })
    }

    /// Parse a document from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load from markup when `input` contains a `<`, otherwise from the file it names
    pub fn load(input: &str) -> Result<Self> {
        if input.contains('<') {
            Self::parse(input)
        } else if Path::new(input).is_file() {
            Self::from_file(input)
        } else {
            Err(Error::not_found(format!(
                "{input:?} is neither markup nor an existing file"
            )))
        }
    }

    /// Replace the options, returning self for chaining
    pub fn with_options(self, options: Options) -> Self {
        self.set_options(options);
        self
    }

    pub fn options(&self) -> Options {
        self.data.options.get()
    }

    pub fn set_options(&self, options: Options) {
        self.data.options.set(options);
    }

    /// The error sink shared by this document's operations
    pub fn errors(&self) -> &ErrorSink {
        &self.data.sink
    }

    /// The root element
    pub fn root(&self) -> Node {
        Node::from_raw(self.raw(self.data.root))
    }

    /// Whether two handles refer to the same document
    pub fn same(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    pub(crate) fn raw(&self, id: XNode) -> RawNode {
        RawNode::new(self.clone(), id)
    }

    pub(crate) fn root_id(&self) -> XNode {
        self.data.root
    }

    pub(crate) fn document_node(&self) -> XNode {
        self.data.document_node
    }

    pub(crate) fn store(&self) -> Ref<'_, XotStore> {
        self.data.store.borrow()
    }

    pub(crate) fn store_mut(&self) -> RefMut<'_, XotStore> {
        self.data.store.borrow_mut()
    }

    /// Evaluate a path expression against `context`, recording engine errors.
    ///
    /// With `trap_path_errors` on, the evaluation runs inside a capture scope so
    /// the record is collected without being surfaced.
    pub(crate) fn evaluate(&self, context: XNode, expression: &str) -> Result<Vec<PathItem<XNode>>> {
        let evaluate = || {
            let result = {
                let store = self.store();
                self.data.engine.evaluate(&store, &context, expression)
            };
            if let Err(err) = &result {
                self.data.sink.push(ErrorRecord::new(
                    Severity::Error,
                    Origin::PathEngine,
                    err.to_string(),
                ));
            }
            result
        };
        if self.options().trap_path_errors {
            run_captured(&self.data.sink, evaluate).0
        } else {
            evaluate()
        }
    }

    // ==================== Detached node construction ====================

    pub(crate) fn create_element(&self, name: &str, namespace: Option<&str>) -> Result<RawNode> {
        let id = self.store_mut().create_element(name, namespace)?;
        Ok(self.raw(id))
    }

    pub(crate) fn create_text(&self, text: &str) -> Result<RawNode> {
        let id = self.store_mut().create_text(text)?;
        Ok(self.raw(id))
    }

    pub(crate) fn create_comment(&self, text: &str) -> Result<RawNode> {
        let id = self.store_mut().create_comment(text)?;
        Ok(self.raw(id))
    }

    pub(crate) fn create_processing_instruction(
        &self,
        target: &str,
        data: Option<&str>,
    ) -> Result<RawNode> {
        let id = self
            .store_mut()
            .create_processing_instruction(target, data)?;
        Ok(self.raw(id))
    }

    /// Copy `source` into this document. The copy is detached.
    pub(crate) fn import(&self, source: &RawNode) -> Result<XNode> {
        if source.node_type() == NodeType::Attribute {
            return Err(Error::invalid_argument("attribute nodes cannot be imported"));
        }
        if self.same(source.document()) {
            return self.store_mut().deep_clone(&source.id());
        }
        let markup = source.document().store().serialize(&source.id())?;
        let mut store = self.store_mut();
        let nodes = store.parse_fragment(&markup)?;
        match nodes.as_slice() {
            [single] => Ok(*single),
            [] => store.create_text(""),
            _ => Err(Error::invalid_argument(
                "imported markup did not produce a single node",
            )),
        }
    }

    /// `source` itself when it lives here, otherwise an imported copy
    pub(crate) fn adopt(&self, source: &RawNode) -> Result<XNode> {
        if self.same(source.document()) {
            Ok(source.id())
        } else {
            self.import(source)
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.data.root)
            .field("options", &self.options())
            .finish()
    }
}
