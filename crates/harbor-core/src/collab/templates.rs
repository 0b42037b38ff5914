//! Template collaborator: render named templates from the resource store

use crate::Result;
use async_trait::async_trait;

/// Opaque template rendering collaborator.
///
/// Template names are resolved without an extension against the deployed
/// resource store; template-language semantics are out of scope.
#[async_trait]
pub trait Templates: Send + Sync {
    /// Compile and run a template against a scope, returning the output
    async fn render(&self, name: &str, scope: &serde_json::Value) -> Result<String>;
}
