//! PathEngine implementation for xee
//!
//! xee evaluates against a `Documents` collection that owns its own Xot, so a
//! query runs against a serialized copy of the context node's tree. Result
//! nodes are mapped back onto the caller's arena by their structural position:
//! the chain of child indexes (and a final attribute name) from the tree's top.
//!
//! Child indexes count children as they read back once serialized. The arena
//! may hold empty text nodes, which vanish, and adjacent text nodes, which
//! parse back as one; a text result maps to the first node of its run.

use xdom_traits::{
    error::{Error, Result},
    xpath::{PathEngine, PathItem},
};
use xee_xpath::{Documents, Queries, Query};
use xot::{Axis, Node, ValueType, Xot};

use crate::store::XotStore;

/// One step from a tree's top down to a node
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Child(usize),
    Attribute { local: String, namespace: String },
}

/// xee XPath 3.1 path engine adapter
#[derive(Debug, Clone, Copy, Default)]
pub struct XeePathEngine;

impl XeePathEngine {
    /// Create a new xee path engine
    pub fn new() -> Self {
        Self
    }
}

impl PathEngine for XeePathEngine {
    type Tree = XotStore;

    fn evaluate(
        &self,
        tree: &XotStore,
        context: &Node,
        expression: &str,
    ) -> Result<Vec<PathItem<Node>>> {
        let queries = Queries::default();
        let query = queries
            .sequence(expression)
            .map_err(|e| Error::invalid_expression(expression, format!("{:?}", e)))?;

        let xot = tree.xot();
        let top = top_of(xot, *context);
        let top_is_document = match xot.value_type(top) {
            ValueType::Document => true,
            ValueType::Element => false,
            _ => {
                return Err(Error::invalid_argument(
                    "path queries need a context inside an element tree",
                ))
            }
        };
        let context_steps = steps_from(xot, top, *context)
            .ok_or_else(|| Error::not_found("context node has no serialized form"))?;

        let xml = xot
            .to_string(top)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        let mut documents = Documents::new();
        let handle = documents
            .add_string_without_uri(&xml)
            .map_err(|e| Error::invalid_argument(format!("{:?}", e)))?;

        // The copy's document node, reached through a query so no extra API is needed
        let root_query = queries
            .sequence("/")
            .map_err(|e| Error::invalid_expression("/", format!("{:?}", e)))?;
        let copy_document = root_query
            .execute(&mut documents, handle)
            .map_err(|e| Error::invalid_expression("/", format!("{:?}", e)))?
            .iter()
            .find_map(|item| match item {
                xee_xpath::Item::Node(node) => Some(node),
                _ => None,
            })
            .ok_or_else(|| Error::not_found("copied document has no document node"))?;

        let copy_top = if top_is_document {
            copy_document
        } else {
            documents
                .xot()
                .children(copy_document)
                .find(|n| documents.xot().value_type(*n) == ValueType::Element)
                .ok_or_else(|| Error::not_found("copied tree has no element"))?
        };
        let copy_context = resolve(documents.xot(), copy_top, &context_steps)
            .ok_or_else(|| Error::not_found("context node not present in copied tree"))?;

        let sequence = query
            .execute(&mut documents, &xee_xpath::Item::Node(copy_context))
            .map_err(|e| Error::invalid_expression(expression, format!("{:?}", e)))?;

        let copy = documents.xot();
        let mut items = Vec::new();
        for item in sequence.iter() {
            match item {
                xee_xpath::Item::Node(node) => {
                    if copy.value_type(node) == ValueType::Namespace {
                        continue;
                    }
                    // Nodes outside the copied tree (constructed by the query) have no counterpart
                    if top_of(copy, node) != copy_document {
                        continue;
                    }
                    if node == copy_document && !top_is_document {
                        continue;
                    }
                    let steps = steps_from(copy, copy_top, node);
                    match steps.and_then(|steps| resolve(xot, top, &steps)) {
                        Some(ours) => items.push(PathItem::Node(ours)),
                        None => tracing::debug!(expression, "dropping unmapped result node"),
                    }
                }
                xee_xpath::Item::Atomic(atomic) => {
                    items.push(PathItem::Value(atomic_to_string(&atomic)))
                }
                _ => items.push(PathItem::Value(String::new())),
            }
        }
        tracing::debug!(expression, results = items.len(), "evaluated path expression");
        Ok(items)
    }

    fn xpath_version(&self) -> &'static str {
        "3.1"
    }
}

fn top_of(xot: &Xot, node: Node) -> Node {
    let mut top = node;
    while let Some(parent) = xot.parent(top) {
        top = parent;
    }
    top
}

/// Children of `parent` paired with their index once serialized; empty text
/// has no index and a run of adjacent text shares one
fn serialized_children(
    xot: &Xot,
    parent: Node,
) -> impl Iterator<Item = (Node, Option<usize>)> + '_ {
    let mut next = 0;
    let mut in_text = false;
    xot.children(parent).map(move |child| {
        let is_text = xot.value_type(child) == ValueType::Text;
        if is_text && xot.text_str(child).is_some_and(str::is_empty) {
            return (child, None);
        }
        if !(is_text && in_text) {
            next += 1;
        }
        in_text = is_text;
        (child, Some(next - 1))
    })
}

/// Steps leading from `top` down to `node`; `None` when `node` is empty text
fn steps_from(xot: &Xot, top: Node, node: Node) -> Option<Vec<Step>> {
    let mut steps = Vec::new();
    let mut current = node;
    while current != top {
        let Some(parent) = xot.parent(current) else {
            break;
        };
        if xot.value_type(current) == ValueType::Attribute {
            if let Some(name) = xot.node_name(current) {
                let (local, namespace) = xot.name_ns_str(name);
                steps.push(Step::Attribute {
                    local: local.to_string(),
                    namespace: namespace.to_string(),
                });
            }
        } else {
            let index = serialized_children(xot, parent)
                .find(|(child, _)| *child == current)
                .and_then(|(_, index)| index)?;
            steps.push(Step::Child(index));
        }
        current = parent;
    }
    steps.reverse();
    Some(steps)
}

/// Follow `steps` from `top`
fn resolve(xot: &Xot, top: Node, steps: &[Step]) -> Option<Node> {
    let mut current = top;
    for step in steps {
        current = match step {
            Step::Child(index) => serialized_children(xot, current)
                .find(|(_, at)| *at == Some(*index))
                .map(|(child, _)| child)?,
            Step::Attribute { local, namespace } => xot.axis(Axis::Attribute, current).find(|a| {
                xot.node_name(*a)
                    .is_some_and(|n| xot.name_ns_str(n) == (local.as_str(), namespace.as_str()))
            })?,
        };
    }
    Some(current)
}

fn atomic_to_string(atomic: &xee_xpath::Atomic) -> String {
    use xee_xpath::Atomic;
    match atomic {
        Atomic::String(_, s) => s.to_string(),
        Atomic::Untyped(s) => s.to_string(),
        Atomic::Boolean(b) => b.to_string(),
        Atomic::Integer(_, i) => i.to_string(),
        Atomic::Decimal(d) => d.to_string(),
        Atomic::Float(f) => f.into_inner().to_string(),
        Atomic::Double(d) => d.into_inner().to_string(),
        _ => format!("{:?}", atomic),
    }
}
