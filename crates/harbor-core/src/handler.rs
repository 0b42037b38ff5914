//! Handler trait and per-dispatch context

use crate::collab::{Collaborators, Connection, Crypto, Mail, Money, Templates};
use crate::{Error, Request, Response, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Everything one dispatch sees: the request facade, the write-once
/// response, and the collaborator handles.
///
/// This is the scripting surface's global "namespace" reframed as explicit
/// dependency injection: constructed per dispatch, passed by reference into
/// every middleware and handler, never global state.
#[derive(Debug)]
pub struct Context {
    /// Read-only view of the inbound request
    pub request: Request,
    /// Write-once response builder
    pub response: Response,
    /// External collaborator handles
    pub collab: Arc<Collaborators>,
}

impl Context {
    /// Create a context for one dispatch
    pub fn new(request: Request, collab: Arc<Collaborators>) -> Self {
        Self {
            request,
            response: Response::new(),
            collab,
        }
    }

    /// Open a database connection handle
    pub fn db(&self, conn_str: impl Into<String>) -> Result<Connection> {
        let driver = self
            .collab
            .database
            .as_ref()
            .ok_or_else(|| Error::collaborator("database", "no driver configured"))?;
        Ok(Connection::new(Arc::clone(driver), conn_str))
    }

    /// The crypto collaborator
    pub fn crypto(&self) -> Result<&Arc<dyn Crypto>> {
        self.collab
            .crypto
            .as_ref()
            .ok_or_else(|| Error::collaborator("crypto", "not configured"))
    }

    /// The mail collaborator
    pub fn mail(&self) -> Result<&Arc<dyn Mail>> {
        self.collab
            .mail
            .as_ref()
            .ok_or_else(|| Error::collaborator("mail", "not configured"))
    }

    /// The money collaborator
    pub fn money(&self) -> Result<&Arc<dyn Money>> {
        self.collab
            .money
            .as_ref()
            .ok_or_else(|| Error::collaborator("money", "not configured"))
    }

    /// The template collaborator
    pub fn templates(&self) -> Result<&Arc<dyn Templates>> {
        self.collab
            .templates
            .as_ref()
            .ok_or_else(|| Error::collaborator("templates", "not configured"))
    }

    /// Render a named template and finish the response with it as HTML
    pub async fn render_html(&mut self, name: &str, scope: &serde_json::Value) -> Result<()> {
        let templates = Arc::clone(self.templates()?);
        let html = templates.render(name, scope).await?;
        self.response.ok_html(html);
        Ok(())
    }
}

/// A middleware or route handler.
///
/// Middleware and handlers share this trait: a middleware is simply a
/// handler the dispatcher runs earlier in the chain, with the chain cut
/// short once the response is finished.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Service one request
    async fn call(&self, ctx: &mut Context) -> Result<()>;
}

/// Adapter turning a closure into a [`Handler`].
///
/// The closure receives the context and returns a boxed future borrowing
/// it, e.g. `handler_fn(|ctx| async move { ctx.response.ok("hi"); Ok(()) }.boxed())`.
pub struct HandlerFn<F>(F);

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Result<()>> + Send + Sync,
{
    async fn call(&self, ctx: &mut Context) -> Result<()> {
        (self.0)(ctx).await
    }
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFn").finish()
    }
}

/// Wrap a closure as a [`Handler`]
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Result<()>> + Send + Sync,
{
    HandlerFn(f)
}
