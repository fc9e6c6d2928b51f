//! Path query engine abstraction trait

use crate::error::Result;
use crate::tree::XmlTree;

/// One item of a path query result
#[derive(Debug, Clone, PartialEq)]
pub enum PathItem<N> {
    /// A node of the queried tree
    Node(N),
    /// An atomic value, in its string form
    Value(String),
}

impl<N> PathItem<N> {
    pub fn as_node(&self) -> Option<&N> {
        match self {
            PathItem::Node(node) => Some(node),
            PathItem::Value(_) => None,
        }
    }
}

/// Trait for path query engines.
///
/// Engines evaluate against a tree they do not own. Malformed expressions
/// must be reported as [`crate::Error::InvalidExpression`], distinct from
/// evaluation failures on valid expressions.
pub trait PathEngine {
    /// The XML tree implementation this engine works with
    type Tree: XmlTree;

    /// Evaluate `expression` with `context` as the context item
    fn evaluate(
        &self,
        tree: &Self::Tree,
        context: &<Self::Tree as XmlTree>::Node,
        expression: &str,
    ) -> Result<Vec<PathItem<<Self::Tree as XmlTree>::Node>>>;

    /// Evaluate and keep only node results
    fn select_nodes(
        &self,
        tree: &Self::Tree,
        context: &<Self::Tree as XmlTree>::Node,
        expression: &str,
    ) -> Result<Vec<<Self::Tree as XmlTree>::Node>> {
        Ok(self
            .evaluate(tree, context, expression)?
            .into_iter()
            .filter_map(|item| match item {
                PathItem::Node(node) => Some(node),
                PathItem::Value(_) => None,
            })
            .collect())
    }

    /// Get the XPath version supported by this engine
    fn xpath_version(&self) -> &'static str;
}
