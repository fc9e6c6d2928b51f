//! The operation table: DOM names forwarded from the facade to the tree view
//!
//! Each [`Operation`] is classified by [`OpKind`]. Property reads take no
//! arguments; methods unwrap facade arguments to raw nodes; insert operations
//! additionally import a facade argument that lives in another document.
//! Raw results are converted back before they reach the caller: text leaves
//! become strings, attribute nodes become the subject itself, other nodes are
//! wrapped.

use std::str::FromStr;

use strum::{EnumIter, EnumString, IntoStaticStr, IntoEnumIterator};
use xdom_traits::{Error, NodeType, Result};

use crate::node::Node;
use crate::raw::RawNode;

/// How an operation reaches the tree view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Read-only node state
    Property,
    /// Forwarded call with facade arguments unwrapped
    Method,
    /// Forwarded call whose first argument is imported when it belongs elsewhere
    Insert,
}

/// Every DOM operation the facade forwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
pub enum Operation {
    // Properties
    #[strum(serialize = "nodeName")]
    NodeName,
    #[strum(serialize = "nodeValue")]
    NodeValue,
    #[strum(serialize = "nodeType")]
    NodeType,
    #[strum(serialize = "parentNode")]
    ParentNode,
    #[strum(serialize = "childNodes")]
    ChildNodes,
    #[strum(serialize = "firstChild")]
    FirstChild,
    #[strum(serialize = "lastChild")]
    LastChild,
    #[strum(serialize = "previousSibling")]
    PreviousSibling,
    #[strum(serialize = "nextSibling")]
    NextSibling,
    #[strum(serialize = "namespaceURI")]
    NamespaceUri,
    #[strum(serialize = "prefix")]
    Prefix,
    #[strum(serialize = "localName")]
    LocalName,
    #[strum(serialize = "textContent")]
    TextContent,

    // Methods
    #[strum(serialize = "getAttribute")]
    GetAttribute,
    #[strum(serialize = "getAttributeNS")]
    GetAttributeNs,
    #[strum(serialize = "getElementsByTagName")]
    GetElementsByTagName,
    #[strum(serialize = "getElementsByTagNameNS")]
    GetElementsByTagNameNs,
    #[strum(serialize = "hasAttribute")]
    HasAttribute,
    #[strum(serialize = "hasAttributeNS")]
    HasAttributeNs,
    #[strum(serialize = "removeAttribute")]
    RemoveAttribute,
    #[strum(serialize = "removeAttributeNS")]
    RemoveAttributeNs,
    #[strum(serialize = "setAttribute")]
    SetAttribute,
    #[strum(serialize = "setAttributeNS")]
    SetAttributeNs,
    #[strum(serialize = "cloneNode")]
    CloneNode,
    #[strum(serialize = "getLineNo")]
    GetLineNo,
    #[strum(serialize = "hasAttributes")]
    HasAttributes,
    #[strum(serialize = "hasChildNodes")]
    HasChildNodes,
    #[strum(serialize = "isSameNode")]
    IsSameNode,
    #[strum(serialize = "lookupNamespaceURI")]
    LookupNamespaceUri,
    #[strum(serialize = "lookupPrefix")]
    LookupPrefix,
    #[strum(serialize = "normalize")]
    Normalize,
    #[strum(serialize = "removeChild")]
    RemoveChild,

    // Insertions
    #[strum(serialize = "appendChild")]
    AppendChild,
    #[strum(serialize = "insertBefore")]
    InsertBefore,
    #[strum(serialize = "replaceChild")]
    ReplaceChild,
}

/// Tree-view operations deliberately left out of the table
pub const TREE_VIEW_ONLY: &[&str] = &[
    "getNodePath",
    "isEqualNode",
    "compareDocumentPosition",
    "isDefaultNamespace",
    "appendData",
];

impl Operation {
    pub fn kind(self) -> OpKind {
        match self {
            Operation::NodeName
            | Operation::NodeValue
            | Operation::NodeType
            | Operation::ParentNode
            | Operation::ChildNodes
            | Operation::FirstChild
            | Operation::LastChild
            | Operation::PreviousSibling
            | Operation::NextSibling
            | Operation::NamespaceUri
            | Operation::Prefix
            | Operation::LocalName
            | Operation::TextContent => OpKind::Property,
            Operation::AppendChild | Operation::InsertBefore | Operation::ReplaceChild => {
                OpKind::Insert
            }
            _ => OpKind::Method,
        }
    }

    /// The DOM name of the operation
    pub fn dom_name(self) -> &'static str {
        self.into()
    }

    /// All operations of one kind, in table order
    pub fn of_kind(kind: OpKind) -> Vec<Operation> {
        Operation::iter().filter(|op| op.kind() == kind).collect()
    }
}

// ==================== Arguments and results ====================

/// An argument passed through the table
#[derive(Debug, Clone)]
pub enum Arg {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Node(Node),
    Raw(RawNode),
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Arg::Int(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Str(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Str(value)
    }
}

impl From<Node> for Arg {
    fn from(value: Node) -> Self {
        Arg::Node(value)
    }
}

impl From<&Node> for Arg {
    fn from(value: &Node) -> Self {
        Arg::Node(value.clone())
    }
}

impl From<RawNode> for Arg {
    fn from(value: RawNode) -> Self {
        Arg::Raw(value)
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Arg::Null, Into::into)
    }
}

/// A converted result
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    String(String),
    Node(Node),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn into_node(self) -> Option<Node> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

/// What the tree view hands back before conversion
enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Node(RawNode),
    List(Vec<RawNode>),
}

impl From<Option<String>> for RawValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(RawValue::Null, RawValue::Str)
    }
}

impl From<Option<RawNode>> for RawValue {
    fn from(value: Option<RawNode>) -> Self {
        value.map_or(RawValue::Null, RawValue::Node)
    }
}

// ==================== Invocation ====================

impl Node {
    /// Invoke an operation by its DOM name.
    ///
    /// Names outside the table fail with `UnsupportedOperation` when the tree
    /// view offers them, otherwise with `UndefinedOperation`.
    pub fn call(&self, name: &str, args: &[Arg]) -> Result<Value> {
        match Operation::from_str(name) {
            Ok(op) => self.invoke(op, args),
            Err(_) if TREE_VIEW_ONLY.contains(&name) => {
                Err(Error::UnsupportedOperation(name.to_string()))
            }
            Err(_) => Err(Error::UndefinedOperation(name.to_string())),
        }
    }

    /// Invoke one operation of the table
    pub fn invoke(&self, op: Operation, args: &[Arg]) -> Result<Value> {
        tracing::trace!(operation = op.dom_name(), args = args.len(), "dispatch");
        let raw = match op.kind() {
            OpKind::Property => self.read_property(op),
            OpKind::Method => self.forward_method(op, &Args::new(op, args))?,
            OpKind::Insert => self.forward_insert(op, &Args::new(op, args))?,
        };
        Ok(self.convert(raw))
    }

    fn read_property(&self, op: Operation) -> RawValue {
        let subject = self.raw_ref();
        match op {
            Operation::NodeName => RawValue::Str(subject.node_name()),
            Operation::NodeValue => subject.node_value().into(),
            Operation::NodeType => RawValue::Int(i64::from(subject.node_type().dom_code())),
            Operation::ParentNode => subject.parent().into(),
            Operation::ChildNodes => RawValue::List(subject.child_nodes()),
            Operation::FirstChild => subject.first_child().into(),
            Operation::LastChild => subject.last_child().into(),
            Operation::PreviousSibling => subject.previous_sibling().into(),
            Operation::NextSibling => subject.next_sibling().into(),
            Operation::NamespaceUri => subject.namespace_uri().into(),
            Operation::Prefix => subject.prefix().into(),
            Operation::LocalName => subject.local_name().into(),
            Operation::TextContent => RawValue::Str(subject.text_content()),
            _ => RawValue::Null,
        }
    }

    fn forward_method(&self, op: Operation, args: &Args<'_>) -> Result<RawValue> {
        let subject = self.raw_ref();
        let value = match op {
            Operation::GetAttribute => subject.get_attribute(args.str(0)?).into(),
            Operation::GetAttributeNs => {
                subject.get_attribute_ns(args.opt_str(0)?, args.str(1)?).into()
            }
            Operation::GetElementsByTagName => {
                RawValue::List(subject.get_elements_by_tag_name(args.str(0)?))
            }
            Operation::GetElementsByTagNameNs => RawValue::List(
                subject.get_elements_by_tag_name_ns(args.opt_str(0)?, args.str(1)?),
            ),
            Operation::HasAttribute => RawValue::Bool(subject.has_attribute(args.str(0)?)),
            Operation::HasAttributeNs => {
                RawValue::Bool(subject.has_attribute_ns(args.opt_str(0)?, args.str(1)?))
            }
            Operation::RemoveAttribute => {
                subject.remove_attribute(args.str(0)?)?;
                RawValue::Null
            }
            Operation::RemoveAttributeNs => {
                subject.remove_attribute_ns(args.opt_str(0)?, args.str(1)?)?;
                RawValue::Null
            }
            Operation::SetAttribute => {
                RawValue::Node(subject.set_attribute(args.str(0)?, args.str(1)?)?)
            }
            Operation::SetAttributeNs => RawValue::Node(subject.set_attribute_ns(
                args.opt_str(0)?,
                args.str(1)?,
                args.str(2)?,
            )?),
            Operation::CloneNode => RawValue::Node(subject.clone_node(args.opt_bool(0)?)?),
            Operation::GetLineNo => RawValue::Int(i64::try_from(subject.line_no()).unwrap_or(0)),
            Operation::HasAttributes => RawValue::Bool(subject.has_attributes()),
            Operation::HasChildNodes => RawValue::Bool(subject.has_child_nodes()),
            Operation::IsSameNode => RawValue::Bool(subject.is_same_node(&args.node(0)?)),
            Operation::LookupNamespaceUri => subject.lookup_namespace_uri(args.opt_str(0)?).into(),
            Operation::LookupPrefix => subject.lookup_prefix(args.str(0)?).into(),
            Operation::Normalize => {
                subject.normalize()?;
                RawValue::Null
            }
            Operation::RemoveChild => RawValue::Node(subject.remove_child(&args.node(0)?)?),
            _ => RawValue::Null,
        };
        Ok(value)
    }

    fn forward_insert(&self, op: Operation, args: &Args<'_>) -> Result<RawValue> {
        let subject = self.raw_ref();
        let new = args.imported(0, subject)?;
        let value = match op {
            Operation::AppendChild => RawValue::Node(subject.append_child(&new)?),
            Operation::InsertBefore => {
                let reference = args.opt_node(1)?;
                RawValue::Node(subject.insert_before(&new, reference.as_ref())?)
            }
            Operation::ReplaceChild => {
                RawValue::Node(subject.replace_child(&new, &args.node(1)?)?)
            }
            _ => RawValue::Null,
        };
        Ok(value)
    }

    fn convert(&self, value: RawValue) -> Value {
        match value {
            RawValue::Null => Value::Null,
            RawValue::Bool(b) => Value::Bool(b),
            RawValue::Int(i) => Value::Int(i),
            RawValue::Str(s) => Value::String(s),
            RawValue::Node(raw) => match raw.node_type() {
                t if t.is_textual() => Value::String(raw.node_value().unwrap_or_default()),
                NodeType::Attribute => Value::Node(self.clone()),
                _ => Value::Node(Node::from_raw(raw)),
            },
            RawValue::List(nodes) => Value::List(
                nodes
                    .into_iter()
                    .map(|raw| {
                        if raw.node_type().is_textual() {
                            Value::String(raw.node_value().unwrap_or_default())
                        } else {
                            Value::Node(Node::from_raw(raw))
                        }
                    })
                    .collect(),
            ),
        }
    }
}

/// Positional argument access with operation-aware errors
struct Args<'a> {
    op: Operation,
    args: &'a [Arg],
}

impl<'a> Args<'a> {
    fn new(op: Operation, args: &'a [Arg]) -> Self {
        Self { op, args }
    }

    fn missing(&self, index: usize, expected: &str) -> Error {
        Error::invalid_argument(format!(
            "{}() argument {} must be {expected}",
            self.op.dom_name(),
            index + 1
        ))
    }

    fn str(&self, index: usize) -> Result<&'a str> {
        match self.args.get(index) {
            Some(Arg::Str(s)) => Ok(s),
            _ => Err(self.missing(index, "a string")),
        }
    }

    fn opt_str(&self, index: usize) -> Result<Option<&'a str>> {
        match self.args.get(index) {
            None | Some(Arg::Null) => Ok(None),
            Some(Arg::Str(s)) => Ok(Some(s)),
            _ => Err(self.missing(index, "a string or null")),
        }
    }

    fn opt_bool(&self, index: usize) -> Result<bool> {
        match self.args.get(index) {
            None | Some(Arg::Null) => Ok(false),
            Some(Arg::Bool(b)) => Ok(*b),
            Some(Arg::Int(i)) => Ok(*i != 0),
            _ => Err(self.missing(index, "a boolean")),
        }
    }

    fn node(&self, index: usize) -> Result<RawNode> {
        self.opt_node(index)?
            .ok_or_else(|| self.missing(index, "a node"))
    }

    fn opt_node(&self, index: usize) -> Result<Option<RawNode>> {
        match self.args.get(index) {
            None | Some(Arg::Null) => Ok(None),
            Some(Arg::Node(node)) => Ok(Some(node.raw_ref().clone())),
            Some(Arg::Raw(raw)) => Ok(Some(raw.clone())),
            _ => Err(self.missing(index, "a node")),
        }
    }

    /// The node argument, deep-imported when it is a facade node of another document
    fn imported(&self, index: usize, subject: &RawNode) -> Result<RawNode> {
        match self.args.get(index) {
            Some(Arg::Node(node)) if !node.document().same(subject.document()) => {
                let doc = subject.document();
                let id = doc.import(node.raw_ref())?;
                Ok(doc.raw(id))
            }
            _ => self.node(index),
        }
    }
}
