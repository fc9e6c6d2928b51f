//! A unified facade over a mutable XML tree.
//!
//! A [`Node`] is usable both as the root of path queries (the simple view,
//! [`SimpleView`]) and as a structural DOM node (the tree view, [`RawNode`]).
//! Both are handles into one arena owned by a [`Document`]; nothing is
//! duplicated between the views.
//!
//! ```no_run
//! use xdom::{Document, InsertMode, SimpleView};
//!
//! let doc = Document::parse("<root><child/></root>")?;
//! let root = doc.root();
//! root.insert_fragment("<new/>", InsertMode::Append)?;
//! assert_eq!(root.xpath("*")?.len(), 2);
//! # Ok::<(), xdom::Error>(())
//! ```
//!
//! The document root is protected: it cannot be deleted, removed or replaced,
//! and elements or text cannot be placed beside it.

pub mod capture;
pub mod dispatch;
pub mod document;
pub mod fragment;
pub mod insert;
pub mod mutate;
pub mod node;
pub mod raw;
pub mod serialize;
pub mod sort;
pub mod xslt;

// Re-export main types
pub use capture::{run_captured, ErrorSink};
pub use dispatch::{Arg, OpKind, Operation, Value, TREE_VIEW_ONLY};
pub use document::{Document, Options};
pub use fragment::Fragment;
pub use insert::{InsertMode, Insertable, Inserted, ReturnAs};
pub use mutate::PiData;
pub use node::{Node, SimpleView};
pub use raw::{RawNode, TreeView};
pub use serialize::XML_PROLOG;
pub use sort::{sort, Comparison, KeySpec, Order, SortKey};

// Re-export key types for convenience
pub use xdom_traits::{
    CollectMode, Error, ErrorLog, ErrorRecord, Location, NodeType, Origin, Result, Severity,
};
