//! Error types for xdom operations

/// Result type for xdom operations
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for all facade and collaborator operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A whole document failed to parse
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Markup handed to a fragment insertion failed to parse
    #[error("Malformed fragment: {0}")]
    MalformedFragment(String),

    /// A mutation would break a tree invariant (root siblings, root removal)
    #[error("Invalid structural operation: {0}")]
    InvalidStructuralOperation(String),

    /// The path engine rejected an expression
    #[error("Invalid path expression '{expression}': {message}")]
    InvalidExpression { expression: String, message: String },

    /// The tree view has this operation but the facade does not expose it
    #[error("DOM operation {0}() is not supported")]
    UnsupportedOperation(String),

    /// Neither the facade nor the tree view knows this operation
    #[error("Undefined operation {0}()")]
    UndefinedOperation(String),

    /// A referenced node is not where the caller said it is
    #[error("Node not found: {0}")]
    NotFound(String),

    /// Arguments did not match what the operation expects
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Serializing a node failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A stylesheet failed to compile or to apply
    #[error("XSLT error: {0}")]
    Xslt(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new structural-invariant error
    pub fn structural<S: Into<String>>(msg: S) -> Self {
        Error::InvalidStructuralOperation(msg.into())
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Error::NotFound(msg.into())
    }

    /// Create a new invalid-argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create a new XSLT error
    pub fn xslt<S: Into<String>>(msg: S) -> Self {
        Error::Xslt(msg.into())
    }

    /// Create a new invalid-expression error
    pub fn invalid_expression<E: Into<String>, M: Into<String>>(expression: E, message: M) -> Self {
        Error::InvalidExpression {
            expression: expression.into(),
            message: message.into(),
        }
    }
}
