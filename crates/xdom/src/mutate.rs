//! Convenience mutators on the facade: attributes, classes, typed leaves

use xdom_traits::{Error, MutableXmlTree, Result, XmlTree};

use crate::fragment::Fragment;
use crate::insert::{InsertMode, Insertable};
use crate::node::{Node, SimpleView};

const CLASS: &str = "class";

/// Data of a processing instruction: raw text, or pseudo-attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PiData {
    Text(String),
    Pairs(Vec<(String, String)>),
}

impl PiData {
    /// The data as it appears between the target and `?>`
    pub fn render(&self) -> String {
        match self {
            PiData::Text(text) => text.clone(),
            PiData::Pairs(pairs) => pairs
                .iter()
                .map(|(key, value)| format!("{key}=\"{}\"", escape_attribute(value)))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl From<&str> for PiData {
    fn from(value: &str) -> Self {
        PiData::Text(value.to_string())
    }
}

impl From<String> for PiData {
    fn from(value: String) -> Self {
        PiData::Text(value)
    }
}

impl From<&[(&str, &str)]> for PiData {
    fn from(pairs: &[(&str, &str)]) -> Self {
        PiData::Pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl<const N: usize> From<[(&str, &str); N]> for PiData {
    fn from(pairs: [(&str, &str); N]) -> Self {
        PiData::from(&pairs[..])
    }
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

impl Node {
    // ==================== Attributes ====================

    /// Copy every attribute of `source`; existing ones are kept unless `overwrite`
    pub fn copy_attributes_from(&self, source: &Node, overwrite: bool) -> Result<&Self> {
        let attributes = source.document().store().attributes(&source.raw_ref().id());
        let subject = self.raw_ref();
        for attr in attributes {
            let namespace = (!attr.namespace.is_empty()).then_some(attr.namespace.as_str());
            if !overwrite && subject.has_attribute_ns(namespace, &attr.local_name) {
                continue;
            }
            subject.set_attribute_ns(namespace, &attr.qualified_name(), &attr.value)?;
        }
        Ok(self)
    }

    /// Set several attributes, all in `namespace` when given
    pub fn set_attributes(&self, pairs: &[(&str, &str)], namespace: Option<&str>) -> Result<&Self> {
        let subject = self.raw_ref();
        for (name, value) in pairs {
            match namespace {
                Some(_) => subject.set_attribute_ns(namespace, name, value)?,
                None => subject.set_attribute(name, value)?,
            };
        }
        Ok(self)
    }

    // ==================== Children ====================

    /// Append copies of the children of `source`; shallow copies drop grandchildren
    pub fn clone_children_from(&self, source: &Node, deep: bool) -> Result<&Self> {
        let doc = self.document();
        let snapshot = source.raw_ref().child_nodes();
        let mut fragment = Fragment::new(doc);
        for child in &snapshot {
            let copy = doc.raw(doc.import(child)?);
            if !deep {
                for grandchild in copy.child_nodes() {
                    doc.store_mut().remove(&grandchild.id())?;
                }
            }
            fragment.push(&copy)?;
        }
        tracing::debug!(count = fragment.len(), deep, "cloning children");
        self.insert(fragment, InsertMode::Append)?;
        Ok(self)
    }

    /// Append this node to `new_parent`, returning it in its new place.
    ///
    /// Nothing changes when the move is rejected. A move into another document
    /// places a copy there and then detaches this node.
    pub fn move_to(&self, new_parent: &Node) -> Result<Node> {
        self.root_guard("move")?;
        let moved = new_parent
            .insert(self, InsertMode::Append)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found("moved node after insertion"))?;
        if !moved.document().same(self.document()) {
            self.remove_self()?;
        }
        Ok(moved)
    }

    // ==================== Classes ====================

    fn classes(&self) -> Vec<String> {
        self.attr(CLASS)
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes().iter().any(|c| c == name)
    }

    /// Add `name` to the class list unless present
    pub fn add_class(&self, name: &str) -> Result<&Self> {
        let mut classes = self.classes();
        if !classes.iter().any(|c| c == name) {
            classes.push(name.to_string());
            self.set_attr(CLASS, &classes.join(" "))?;
        }
        Ok(self)
    }

    /// Remove `name` from the class list, dropping the attribute when it empties
    pub fn remove_class(&self, name: &str) -> Result<&Self> {
        let classes = self.classes();
        if !classes.iter().any(|c| c == name) {
            return Ok(self);
        }
        let remaining: Vec<String> = classes.into_iter().filter(|c| c != name).collect();
        if remaining.is_empty() {
            self.raw_ref().remove_attribute(CLASS)?;
        } else {
            self.set_attr(CLASS, &remaining.join(" "))?;
        }
        Ok(self)
    }

    /// Descendant elements whose class list contains `name`
    pub fn elements_by_class_name(&self, name: &str) -> Result<Vec<Node>> {
        if name.contains(['"', '\'']) || name.trim().is_empty() {
            return Ok(Vec::new());
        }
        let expr = format!(
            ".//*[contains(concat(' ', normalize-space(@class), ' '), ' {} ')]",
            name.trim()
        );
        self.xpath(&expr)
    }

    // ==================== Typed leaves ====================

    /// Insert a text node; appends unless a mode is given
    pub fn insert_text(&self, text: &str, mode: Option<InsertMode>) -> Result<Node> {
        let node = self.document().create_text(text)?;
        self.insert_leaf(node.into(), mode.unwrap_or(InsertMode::Append))
    }

    /// Insert character data. The arena keeps no CDATA sections, so this is
    /// stored as text and serialized escaped.
    pub fn insert_cdata(&self, text: &str, mode: Option<InsertMode>) -> Result<Node> {
        self.insert_text(text, mode)
    }

    /// Insert a comment; appends unless a mode is given
    pub fn insert_comment(&self, text: &str, mode: Option<InsertMode>) -> Result<Node> {
        let node = self.document().create_comment(text)?;
        self.insert_leaf(node.into(), mode.unwrap_or(InsertMode::Append))
    }

    /// Insert a processing instruction; goes before this node unless a mode is given
    pub fn insert_pi<D: Into<PiData>>(
        &self,
        target: &str,
        data: D,
        mode: Option<InsertMode>,
    ) -> Result<Node> {
        let data = data.into().render();
        let data = (!data.is_empty()).then_some(data.as_str());
        let node = self.document().create_processing_instruction(target, data)?;
        self.insert_leaf(node.into(), mode.unwrap_or(InsertMode::Before))
    }

    fn insert_leaf(&self, leaf: Insertable, mode: InsertMode) -> Result<Node> {
        self.insert(leaf, mode)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found("inserted node"))
    }
}
