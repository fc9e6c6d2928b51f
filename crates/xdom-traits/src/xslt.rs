//! Stylesheet processor abstraction trait

use crate::error::Result;

/// Trait for XSLT processors.
///
/// Processors work on serialized markup and never touch the caller's tree.
/// Compile and transformation failures are reported as [`crate::Error::Xslt`].
pub trait XsltProcessor {
    /// Apply `stylesheet` to the `source` document, returning the serialized result
    fn transform(&self, source: &str, stylesheet: &str) -> Result<String>;

    /// Get the XSLT version supported by this processor
    fn xslt_version(&self) -> &'static str;
}
