//! XmlTree / MutableXmlTree implementation for xot

use ahash::AHashMap;
use xdom_traits::{
    error::{Error, Result},
    tree::{AttributeEntry, MutableXmlTree, NodeType, XmlTree},
};
use xot::{Axis, NameId, NamespaceId, Node, SpanInfoKey, ValueType, Xot};

/// Element that wraps fragment markup so it parses as a single document
const FRAGMENT_WRAPPER: &str = "xdom-fragment";

/// Stem of the prefixes generated when a namespaced attribute has no prefix in scope
const GENERATED_PREFIX: &str = "ns";

/// A document arena backed by xot.
///
/// Text consolidation is off: adjacent text nodes stay separate until
/// normalized, so inserting or detaching a node never frees a neighbour
/// that a caller may still hold.
#[derive(Debug)]
pub struct XotStore {
    pub(crate) xot: Xot,
    lines: AHashMap<Node, usize>,
}

impl XotStore {
    /// Create an empty store
    pub fn new() -> Self {
        let mut xot = Xot::new();
        xot.set_text_consolidation(false);
        Self {
            xot,
            lines: AHashMap::new(),
        }
    }

    /// Whether `node` has been freed from the arena
    pub fn is_removed(&self, node: &Node) -> bool {
        self.xot.is_removed(*node)
    }

    /// Get a reference to the underlying Xot
    pub fn xot(&self) -> &Xot {
        &self.xot
    }

    /// Get a mutable reference to the underlying Xot
    pub fn xot_mut(&mut self) -> &mut Xot {
        &mut self.xot
    }

    fn record_lines(&mut self, xml: &str, doc: Node, spans: &xot::SpanInfo) {
        let newlines: Vec<usize> = xml
            .char_indices()
            .filter(|(_, c)| *c == '\n')
            .map(|(i, _)| i)
            .collect();
        let elements: Vec<Node> = self
            .xot
            .descendants(doc)
            .filter(|n| self.xot.value_type(*n) == ValueType::Element)
            .collect();
        for element in elements {
            if let Some(span) = spans.get(SpanInfoKey::ElementStart(element)) {
                let line = newlines.partition_point(|&nl| nl < span.start) + 1;
                self.lines.insert(element, line);
            }
        }
    }

    fn name_id(&self, node: Node) -> Option<NameId> {
        self.xot.node_name(node)
    }

    fn namespace_id(&self, name: NameId) -> Option<NamespaceId> {
        let (_, uri) = self.xot.name_ns_str(name);
        if uri.is_empty() {
            None
        } else {
            self.xot.namespace(uri)
        }
    }

    /// Nearest element at or above `node`, used as the scope for namespace lookups
    fn scope_element(&self, node: Node) -> Option<Node> {
        let mut current = Some(node);
        while let Some(n) = current {
            if self.xot.value_type(n) == ValueType::Element {
                return Some(n);
            }
            current = self.xot.parent(n);
        }
        None
    }

    fn prefix_for(&self, node: Node, name: NameId) -> Option<String> {
        let ns = self.namespace_id(name)?;
        let scope = self.scope_element(node)?;
        let prefix = self.xot.prefix_for_namespace(scope, ns)?;
        let prefix = self.xot.prefix_str(prefix);
        if prefix.is_empty() {
            None
        } else {
            Some(prefix.to_string())
        }
    }

    /// Target and data of a processing instruction, read back from its serialized form
    fn processing_instruction_parts(&self, node: Node) -> Option<(String, String)> {
        let text = self.xot.to_string(node).ok()?;
        let inner = text.strip_prefix("<?")?.strip_suffix("?>")?;
        match inner.split_once(char::is_whitespace) {
            Some((target, data)) => Some((target.to_string(), data.trim_start().to_string())),
            None => Some((inner.to_string(), String::new())),
        }
    }

    /// Bind `prefix` to `ns` on `element` unless it is already bound there
    fn declare_prefix(&mut self, element: Node, prefix: &str, ns: NamespaceId) {
        let prefix_id = if prefix.is_empty() {
            self.xot.empty_prefix()
        } else {
            self.xot.add_prefix(prefix)
        };
        if self.xot.namespace_for_prefix(element, prefix_id) != Some(ns) {
            self.xot.namespaces_mut(element).insert(prefix_id, ns);
        }
    }

    /// A prefix for `ns` on `element`: `ns`, then `ns1`, `ns2`, ... skipping
    /// any already bound in scope to another namespace
    fn generated_prefix(&self, element: Node, ns: NamespaceId) -> String {
        let mut candidate = GENERATED_PREFIX.to_string();
        let mut counter = 0;
        loop {
            let taken = self
                .xot
                .prefix(&candidate)
                .and_then(|p| self.xot.namespace_for_prefix(element, p))
                .is_some_and(|bound| bound != ns);
            if !taken {
                return candidate;
            }
            counter += 1;
            candidate = format!("{GENERATED_PREFIX}{counter}");
        }
    }

    fn ensure_detached(&mut self, node: Node) -> Result<()> {
        if self.xot.parent(node).is_some() {
            self.detach(&node)?;
        }
        Ok(())
    }

    fn map_xot_error<E: std::fmt::Display>(op: &str, e: E) -> Error {
        Error::structural(format!("{op}: {e}"))
    }
}

impl Default for XotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlTree for XotStore {
    type Node = Node;

    fn parse_xml(&mut self, xml: &str) -> Result<Self::Node> {
        let (doc, spans) = self
            .xot
            .parse_with_span_info(xml)
            .map_err(|e| Error::XmlParse(e.to_string()))?;
        self.record_lines(xml, doc, &spans);
        Ok(doc)
    }

    fn document_element(&self, doc: &Self::Node) -> Result<Self::Node> {
        self.xot
            .children(*doc)
            .find(|n| self.xot.value_type(*n) == ValueType::Element)
            .ok_or_else(|| Error::not_found("document has no root element"))
    }

    fn parent(&self, node: &Self::Node) -> Option<Self::Node> {
        self.xot.parent(*node)
    }

    fn children(&self, node: &Self::Node) -> Vec<Self::Node> {
        self.xot.children(*node).collect()
    }

    fn attributes(&self, node: &Self::Node) -> Vec<AttributeEntry<Self::Node>> {
        if self.xot.value_type(*node) != ValueType::Element {
            return Vec::new();
        }
        self.xot
            .axis(Axis::Attribute, *node)
            .filter_map(|attr| {
                let name = self.name_id(attr)?;
                let (local, uri) = self.xot.name_ns_str(name);
                let value = self.xot.attributes(*node).get(name)?.to_string();
                Some(AttributeEntry {
                    node: attr,
                    namespace: uri.to_string(),
                    local_name: local.to_string(),
                    prefix: self.prefix_for(*node, name),
                    value,
                })
            })
            .collect()
    }

    fn node_name(&self, node: &Self::Node) -> Option<String> {
        match self.xot.value_type(*node) {
            ValueType::Element | ValueType::Attribute => {
                let name = self.name_id(*node)?;
                let local = self.xot.name_ns_str(name).0;
                Some(match self.prefix_for(*node, name) {
                    Some(prefix) => format!("{prefix}:{local}"),
                    None => local.to_string(),
                })
            }
            ValueType::ProcessingInstruction => {
                self.processing_instruction_parts(*node).map(|(target, _)| target)
            }
            ValueType::Text => Some("#text".to_string()),
            ValueType::Comment => Some("#comment".to_string()),
            ValueType::Document => Some("#document".to_string()),
            ValueType::Namespace => None,
        }
    }

    fn node_local_name(&self, node: &Self::Node) -> Option<String> {
        match self.xot.value_type(*node) {
            ValueType::Element | ValueType::Attribute => {
                let name = self.name_id(*node)?;
                Some(self.xot.name_ns_str(name).0.to_string())
            }
            _ => None,
        }
    }

    fn node_namespace_uri(&self, node: &Self::Node) -> Option<String> {
        match self.xot.value_type(*node) {
            ValueType::Element | ValueType::Attribute => {
                let name = self.name_id(*node)?;
                let uri = self.xot.name_ns_str(name).1;
                (!uri.is_empty()).then(|| uri.to_string())
            }
            _ => None,
        }
    }

    fn node_prefix(&self, node: &Self::Node) -> Option<String> {
        match self.xot.value_type(*node) {
            ValueType::Element | ValueType::Attribute => {
                let name = self.name_id(*node)?;
                self.prefix_for(*node, name)
            }
            _ => None,
        }
    }

    fn node_value(&self, node: &Self::Node) -> Option<String> {
        match self.xot.value_type(*node) {
            ValueType::Text => self.xot.text_str(*node).map(str::to_string),
            ValueType::Comment => self.xot.comment_str(*node).map(str::to_string),
            ValueType::ProcessingInstruction => {
                self.processing_instruction_parts(*node).map(|(_, data)| data)
            }
            ValueType::Attribute => {
                let element = self.xot.parent(*node)?;
                let name = self.name_id(*node)?;
                self.xot.attributes(element).get(name).map(|v| v.to_string())
            }
            _ => None,
        }
    }

    fn node_type(&self, node: &Self::Node) -> NodeType {
        match self.xot.value_type(*node) {
            ValueType::Document => NodeType::Document,
            ValueType::Element => NodeType::Element,
            ValueType::Text => NodeType::Text,
            ValueType::Comment => NodeType::Comment,
            ValueType::ProcessingInstruction => NodeType::ProcessingInstruction,
            ValueType::Attribute => NodeType::Attribute,
            ValueType::Namespace => NodeType::Namespace,
        }
    }

    fn string_value(&self, node: &Self::Node) -> String {
        match self.xot.value_type(*node) {
            ValueType::Element | ValueType::Document => self
                .xot
                .descendants(*node)
                .filter_map(|n| self.xot.text_str(n))
                .collect(),
            _ => self.node_value(node).unwrap_or_default(),
        }
    }

    fn line_number(&self, node: &Self::Node) -> usize {
        self.lines.get(node).copied().unwrap_or(0)
    }

    fn lookup_namespace_uri(&self, node: &Self::Node, prefix: Option<&str>) -> Option<String> {
        let scope = self.scope_element(*node)?;
        let prefix_id = match prefix {
            None | Some("") => self.xot.empty_prefix(),
            Some(p) => self.xot.prefix(p)?,
        };
        let ns = self.xot.namespace_for_prefix(scope, prefix_id)?;
        let uri = self.xot.namespace_str(ns);
        (!uri.is_empty()).then(|| uri.to_string())
    }

    fn lookup_prefix(&self, node: &Self::Node, uri: &str) -> Option<String> {
        let scope = self.scope_element(*node)?;
        let ns = self.xot.namespace(uri)?;
        let prefix = self.xot.prefix_for_namespace(scope, ns)?;
        let prefix = self.xot.prefix_str(prefix);
        (!prefix.is_empty()).then(|| prefix.to_string())
    }

    fn serialize(&self, node: &Self::Node) -> Result<String> {
        self.xot
            .to_string(*node)
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    fn serialize_pretty(&self, node: &Self::Node) -> Result<String> {
        let parameters = xot::output::xml::Parameters {
            indentation: Some(Default::default()),
            ..Default::default()
        };
        self.xot
            .serialize_xml_string(parameters, *node)
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}

impl MutableXmlTree for XotStore {
    fn create_element(&mut self, name: &str, namespace: Option<&str>) -> Result<Self::Node> {
        let (prefix, local) = split_qualified(name)?;
        match namespace.filter(|ns| !ns.is_empty()) {
            Some(uri) => {
                let ns = self.xot.add_namespace(uri);
                let name = self.xot.add_name_ns(local, ns);
                let element = self.xot.new_element(name);
                self.declare_prefix(element, prefix.unwrap_or(""), ns);
                Ok(element)
            }
            None => {
                let name = self.xot.add_name(local);
                Ok(self.xot.new_element(name))
            }
        }
    }

    fn create_text(&mut self, text: &str) -> Result<Self::Node> {
        Ok(self.xot.new_text(text))
    }

    fn create_comment(&mut self, text: &str) -> Result<Self::Node> {
        if text.contains("--") || text.ends_with('-') {
            return Err(Error::invalid_argument(format!(
                "comment text may not contain '--' or end with '-': {text:?}"
            )));
        }
        Ok(self.xot.new_comment(text))
    }

    fn create_processing_instruction(
        &mut self,
        target: &str,
        data: Option<&str>,
    ) -> Result<Self::Node> {
        if target.is_empty()
            || target.eq_ignore_ascii_case("xml")
            || data.is_some_and(|d| d.contains("?>"))
        {
            return Err(Error::invalid_argument(format!(
                "invalid processing instruction target {target:?}"
            )));
        }
        let markup = match data {
            Some(data) if !data.is_empty() => format!("<?{target} {data}?>"),
            _ => format!("<?{target}?>"),
        };
        self.parse_fragment(&markup)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::invalid_argument("processing instruction produced no node"))
    }

    fn parse_fragment(&mut self, markup: &str) -> Result<Vec<Self::Node>> {
        let wrapped = format!("<{FRAGMENT_WRAPPER}>{markup}</{FRAGMENT_WRAPPER}>");
        let doc = self
            .xot
            .parse(&wrapped)
            .map_err(|e| Error::XmlParse(e.to_string()))?;
        let wrapper = self.document_element(&doc)?;
        let nodes: Vec<Node> = self.xot.children(wrapper).collect();
        for node in &nodes {
            self.xot
                .detach(*node)
                .map_err(|e| Self::map_xot_error("detach", e))?;
        }
        self.xot
            .remove(doc)
            .map_err(|e| Self::map_xot_error("remove", e))?;
        tracing::trace!(count = nodes.len(), "parsed fragment");
        Ok(nodes)
    }

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<Self::Node> {
        self.ensure_detached(*child)?;
        self.xot
            .append(*parent, *child)
            .map_err(|e| Self::map_xot_error("append", e))?;
        Ok(*child)
    }

    fn insert_before(&mut self, reference: &Self::Node, new: &Self::Node) -> Result<Self::Node> {
        if self.xot.parent(*reference).is_none() {
            return Err(Error::structural("reference node has no parent"));
        }
        self.ensure_detached(*new)?;
        self.xot
            .insert_before(*reference, *new)
            .map_err(|e| Self::map_xot_error("insert before", e))?;
        Ok(*new)
    }

    fn insert_after(&mut self, reference: &Self::Node, new: &Self::Node) -> Result<Self::Node> {
        if self.xot.parent(*reference).is_none() {
            return Err(Error::structural("reference node has no parent"));
        }
        self.ensure_detached(*new)?;
        self.xot
            .insert_after(*reference, *new)
            .map_err(|e| Self::map_xot_error("insert after", e))?;
        Ok(*new)
    }

    fn detach(&mut self, node: &Self::Node) -> Result<()> {
        self.xot
            .detach(*node)
            .map_err(|e| Self::map_xot_error("detach", e))
    }

    fn remove(&mut self, node: &Self::Node) -> Result<()> {
        self.lines.remove(node);
        self.xot
            .remove(*node)
            .map_err(|e| Self::map_xot_error("remove", e))
    }

    fn set_attribute(
        &mut self,
        element: &Self::Node,
        name: &str,
        value: &str,
        namespace: Option<&str>,
    ) -> Result<Self::Node> {
        if self.xot.value_type(*element) != ValueType::Element {
            return Err(Error::invalid_argument("attributes can only be set on elements"));
        }
        let (prefix, local) = split_qualified(name)?;
        let name_id = match namespace.filter(|ns| !ns.is_empty()) {
            Some(uri) => {
                let ns = self.xot.add_namespace(uri);
                match prefix {
                    Some(p) => self.declare_prefix(*element, p, ns),
                    None => {
                        let bound = self
                            .xot
                            .prefix_for_namespace(*element, ns)
                            .is_some_and(|p| !self.xot.prefix_str(p).is_empty());
                        if !bound {
                            let generated = self.generated_prefix(*element, ns);
                            self.declare_prefix(*element, &generated, ns);
                        }
                    }
                }
                self.xot.add_name_ns(local, ns)
            }
            None => self.xot.add_name(local),
        };
        self.xot
            .attributes_mut(*element)
            .insert(name_id, value.to_string());
        self.xot
            .axis(Axis::Attribute, *element)
            .find(|attr| self.name_id(*attr) == Some(name_id))
            .ok_or_else(|| Error::not_found(format!("attribute {name} after insertion")))
    }

    fn remove_attribute(
        &mut self,
        element: &Self::Node,
        local_name: &str,
        namespace: Option<&str>,
    ) -> Result<bool> {
        let namespace = namespace.unwrap_or("");
        let target = self
            .xot
            .axis(Axis::Attribute, *element)
            .filter_map(|attr| self.name_id(attr))
            .find(|name| self.xot.name_ns_str(*name) == (local_name, namespace));
        match target {
            Some(name) => Ok(self.xot.attributes_mut(*element).remove(name).is_some()),
            None => Ok(false),
        }
    }

    fn set_text(&mut self, node: &Self::Node, text: &str) -> Result<()> {
        let slot = self
            .xot
            .text_mut(*node)
            .ok_or_else(|| Error::invalid_argument("node is not a text node"))?;
        slot.set(text);
        Ok(())
    }

    fn deep_clone(&mut self, node: &Self::Node) -> Result<Self::Node> {
        Ok(self.xot.clone_node(*node))
    }

    fn shallow_clone(&mut self, node: &Self::Node) -> Result<Self::Node> {
        let copy = self.xot.clone_node(*node);
        let children: Vec<Node> = self.xot.children(copy).collect();
        for child in children {
            self.xot
                .remove(child)
                .map_err(|e| Self::map_xot_error("remove", e))?;
        }
        Ok(copy)
    }
}

/// Split `prefix:local`, rejecting empty parts
fn split_qualified(name: &str) -> Result<(Option<&str>, &str)> {
    let (prefix, local) = match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    };
    if local.is_empty() || prefix.is_some_and(str::is_empty) {
        return Err(Error::invalid_argument(format!("invalid XML name {name:?}")));
    }
    Ok((prefix, local))
}
