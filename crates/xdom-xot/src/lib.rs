//! xot/xee adapters for the xdom facade
//!
//! [`XotStore`] wraps a xot arena as the parser, serializer and mutable tree
//! collaborator; [`XeePathEngine`] wraps the xee XPath 3.1 engine as the path
//! query collaborator; [`XeeXsltProcessor`] runs stylesheets with the xee
//! XSLT 3.0 compiler.

pub mod path;
pub mod store;
pub mod xslt;

// Re-export main types
pub use path::XeePathEngine;
pub use store::XotStore;
pub use xslt::XeeXsltProcessor;

// Re-export key types for convenience
pub use xot::Node;
