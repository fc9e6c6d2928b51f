//! Core trait abstractions for the xdom facade.
//!
//! This crate defines the boundary between the facade and its collaborators:
//! the tree store (parse, navigate, mutate, serialize), the path query
//! engine and the stylesheet processor, plus the error taxonomy and the
//! diagnostic log they share.

pub mod diagnostics;
pub mod error;
pub mod tree;
pub mod xpath;
pub mod xslt;

pub use diagnostics::{CollectMode, ErrorLog, ErrorRecord, Location, Origin, Severity};
pub use error::{Error, Result};
pub use tree::{AttributeEntry, MutableXmlTree, NodeType, XmlTree};
pub use xpath::{PathEngine, PathItem};
pub use xslt::XsltProcessor;
