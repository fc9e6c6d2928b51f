//! Multi-key stable sorting of node sequences
//!
//! Each key yields one string column per node. The sort is a single stable
//! pass comparing columns left to right, so later keys only break ties and
//! equal rows keep their input order.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use strum::{Display, EnumString};
use xdom_traits::{Error, PathItem, Result, XmlTree};

use crate::node::{Node, SimpleView};

fn attribute_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^@([A-Za-z_][\w.\-]*(?::[A-Za-z_][\w.\-]*)?)$").unwrap())
}

/// What a sort column is computed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    /// Value of the named attribute, or the empty string
    Attribute(String),
    /// Text content of the node itself
    SelfText,
    /// Text of the first result of a path expression relative to the node
    Path(String),
}

impl FromStr for SortKey {
    type Err = Error;

    /// `@name` selects an attribute, `.`, `text()` and `current()` the node's
    /// own text; anything else is a path expression.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::invalid_argument("empty sort key"));
        }
        if let Some(captures) = attribute_key_regex().captures(s) {
            return Ok(SortKey::Attribute(captures[1].to_string()));
        }
        Ok(match s {
            "." | "text()" | "current()" => SortKey::SelfText,
            path => SortKey::Path(path.to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Order {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Comparison {
    /// Numeric when both values parse as numbers, otherwise by string
    #[default]
    Regular,
    /// Numeric order; values that do not parse as numbers count as zero
    Numeric,
    String,
}

impl Comparison {
    fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            Comparison::String => a.cmp(b),
            Comparison::Numeric => {
                let x = parse_number(a).unwrap_or(0.0);
                let y = parse_number(b).unwrap_or(0.0);
                x.total_cmp(&y)
            }
            Comparison::Regular => match (parse_number(a), parse_number(b)) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.cmp(b),
            },
        }
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// One sort column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpec {
    pub key: SortKey,
    pub order: Order,
    pub comparison: Comparison,
}

impl KeySpec {
    /// Ascending, regular comparison
    pub fn new(key: SortKey) -> Self {
        Self {
            key,
            order: Order::default(),
            comparison: Comparison::default(),
        }
    }

    pub fn descending(mut self) -> Self {
        self.order = Order::Descending;
        self
    }

    pub fn numeric(mut self) -> Self {
        self.comparison = Comparison::Numeric;
        self
    }

    pub fn string(mut self) -> Self {
        self.comparison = Comparison::String;
        self
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }

    fn column(&self, node: &Node) -> Result<String> {
        match &self.key {
            SortKey::Attribute(name) => Ok(node.attr(name).unwrap_or_default()),
            SortKey::SelfText => Ok(node.raw_ref().text_content()),
            SortKey::Path(expr) => {
                let doc = node.document();
                let first = doc.evaluate(node.raw_ref().id(), expr)?.into_iter().next();
                Ok(match first {
                    Some(PathItem::Node(id)) => doc.store().string_value(&id),
                    Some(PathItem::Value(text)) => text,
                    None => String::new(),
                })
            }
        }
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        let ordering = self.comparison.compare(a, b);
        match self.order {
            Order::Ascending => ordering,
            Order::Descending => ordering.reverse(),
        }
    }
}

impl From<SortKey> for KeySpec {
    fn from(key: SortKey) -> Self {
        KeySpec::new(key)
    }
}

impl FromStr for KeySpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(KeySpec::new(s.parse()?))
    }
}

/// Sort `nodes` in place by `keys`; stable, so ties keep their input order
pub fn sort(nodes: &mut Vec<Node>, keys: &[KeySpec]) -> Result<()> {
    if keys.is_empty() || nodes.len() < 2 {
        return Ok(());
    }
    let rows = nodes
        .iter()
        .map(|node| keys.iter().map(|key| key.column(node)).collect::<Result<Vec<_>>>())
        .collect::<Result<Vec<_>>>()?;

    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| {
        keys.iter()
            .enumerate()
            .map(|(column, key)| key.compare(&rows[a][column], &rows[b][column]))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });

    let mut slots: Vec<Option<Node>> = std::mem::take(nodes).into_iter().map(Some).collect();
    nodes.extend(order.into_iter().filter_map(|index| slots[index].take()));
    tracing::debug!(count = nodes.len(), keys = keys.len(), "sorted nodes");
    Ok(())
}

impl Node {
    /// Run `expr` and sort the selected nodes by `keys`
    pub fn sorted_xpath(&self, expr: &str, keys: &[KeySpec]) -> Result<Vec<Node>> {
        let mut nodes = self.xpath(expr)?;
        sort(&mut nodes, keys)?;
        Ok(nodes)
    }

    /// Reorder the element children by `keys`.
    ///
    /// Element children are detached, sorted and re-appended after any
    /// remaining children, so text and comments between them end up first.
    pub fn sort_children(&self, keys: &[KeySpec]) -> Result<&Self> {
        let mut children = self.element_children();
        sort(&mut children, keys)?;
        for child in &children {
            child.remove_self()?;
        }
        let subject = self.raw_ref();
        for child in &children {
            subject.append_child(child.raw_ref())?;
        }
        Ok(self)
    }
}
