//! The contract a deployed script implements

use async_trait::async_trait;
use harbor_core::{Context, Result};
use harbor_router::Router;

/// A deployed script.
///
/// `main` runs once at load time and registers every route; a registration
/// error there is fatal to the deployment, never deferred to request time.
/// `fallback` runs for requests nothing in the router claimed.
#[async_trait]
pub trait Script: Send + Sync {
    /// Register routes against a fresh router
    fn main(&self, router: &mut Router) -> Result<()>;

    /// Answer a request no route or static asset claimed.
    ///
    /// Defaults to a plain 404.
    async fn fallback(&self, ctx: &mut Context) {
        ctx.response.not_found("Not Found");
    }
}
