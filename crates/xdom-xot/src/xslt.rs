//! XsltProcessor implementation for xee

use xdom_traits::{
    error::{Error, Result},
    xslt::XsltProcessor,
};
use xot::Xot;

/// xee XSLT 3.0 processor adapter
#[derive(Debug, Clone, Copy, Default)]
pub struct XeeXsltProcessor;

impl XeeXsltProcessor {
    /// Create a new xee stylesheet processor
    pub fn new() -> Self {
        Self
    }
}

impl XsltProcessor for XeeXsltProcessor {
    fn transform(&self, source: &str, stylesheet: &str) -> Result<String> {
        // The result tree lives in its own arena
        let mut xot = Xot::new();
        let sequence = xee_xslt_compiler::evaluate(&mut xot, source, stylesheet)
            .map_err(|e| Error::xslt(format!("{:?}", e)))?;

        let mut result = String::new();
        for item in sequence.iter() {
            if let Ok(node) = item.to_node() {
                let markup = xot
                    .to_string(node)
                    .map_err(|e| Error::Serialization(e.to_string()))?;
                result.push_str(&markup);
            }
        }
        tracing::debug!(len = result.len(), "applied stylesheet");
        Ok(result)
    }

    fn xslt_version(&self) -> &'static str {
        "3.0"
    }
}
