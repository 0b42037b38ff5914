//! # Harbor Router
//!
//! Ordered route table and dispatcher for the Harbor script host:
//! - Path patterns with named parameters (`/users/:id`), parsed at
//!   registration time
//! - Registration-order precedence, first structural match wins
//! - Per-route middleware chains with termination short-circuit
//! - Static-asset fallback for unmatched GETs under a configured prefix
//! - Fault isolation: a handler error or panic becomes a 500, never a
//!   crashed serving loop
//!
//! The table is built during script load and never mutated afterwards, so
//! steady-state dispatch is lock-free concurrent reads behind an `Arc`.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod dispatch;
pub mod pattern;
pub mod table;
pub mod verb;

pub use pattern::{PathPattern, Segment};
pub use table::{MatchResult, Route, RouteTable};
pub use verb::Verb;

use harbor_core::collab::StaticAssets;
use harbor_core::{Handler, Result};
use std::sync::Arc;

/// Default prefix for the static-asset fallback, matching the deployed
/// `static/` directory layout.
pub const DEFAULT_STATIC_PREFIX: &str = "/static";

/// The script-facing router.
///
/// Routes are registered during script load; the host then wraps the
/// router in an `Arc` and dispatches against it read-only.
pub struct Router {
    table: RouteTable,
    static_enabled: bool,
    static_prefix: String,
    static_assets: Option<Arc<dyn StaticAssets>>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.table.total_route_count())
            .field("static_enabled", &self.static_enabled)
            .field("static_prefix", &self.static_prefix)
            .finish()
    }
}

impl Router {
    /// Create an empty router
    pub fn new() -> Self {
        Self {
            table: RouteTable::new(),
            static_enabled: false,
            static_prefix: DEFAULT_STATIC_PREFIX.to_string(),
            static_assets: None,
        }
    }

    /// Register a GET route
    pub fn get(&mut self, pattern: &str, handler: impl Handler + 'static) -> Result<&mut Self> {
        self.register(Verb::Get, pattern, Vec::new(), handler)
    }

    /// Register a GET route with middleware
    pub fn get_with(
        &mut self,
        pattern: &str,
        middleware: Vec<Arc<dyn Handler>>,
        handler: impl Handler + 'static,
    ) -> Result<&mut Self> {
        self.register(Verb::Get, pattern, middleware, handler)
    }

    /// Register a POST route
    pub fn post(&mut self, pattern: &str, handler: impl Handler + 'static) -> Result<&mut Self> {
        self.register(Verb::Post, pattern, Vec::new(), handler)
    }

    /// Register a POST route with middleware
    pub fn post_with(
        &mut self,
        pattern: &str,
        middleware: Vec<Arc<dyn Handler>>,
        handler: impl Handler + 'static,
    ) -> Result<&mut Self> {
        self.register(Verb::Post, pattern, middleware, handler)
    }

    /// Register a PUT route
    pub fn put(&mut self, pattern: &str, handler: impl Handler + 'static) -> Result<&mut Self> {
        self.register(Verb::Put, pattern, Vec::new(), handler)
    }

    /// Register a PUT route with middleware
    pub fn put_with(
        &mut self,
        pattern: &str,
        middleware: Vec<Arc<dyn Handler>>,
        handler: impl Handler + 'static,
    ) -> Result<&mut Self> {
        self.register(Verb::Put, pattern, middleware, handler)
    }

    /// Register a PATCH route
    pub fn patch(&mut self, pattern: &str, handler: impl Handler + 'static) -> Result<&mut Self> {
        self.register(Verb::Patch, pattern, Vec::new(), handler)
    }

    /// Register a PATCH route with middleware
    pub fn patch_with(
        &mut self,
        pattern: &str,
        middleware: Vec<Arc<dyn Handler>>,
        handler: impl Handler + 'static,
    ) -> Result<&mut Self> {
        self.register(Verb::Patch, pattern, middleware, handler)
    }

    /// Register a DELETE route
    pub fn delete(&mut self, pattern: &str, handler: impl Handler + 'static) -> Result<&mut Self> {
        self.register(Verb::Delete, pattern, Vec::new(), handler)
    }

    /// Register a DELETE route with middleware
    pub fn delete_with(
        &mut self,
        pattern: &str,
        middleware: Vec<Arc<dyn Handler>>,
        handler: impl Handler + 'static,
    ) -> Result<&mut Self> {
        self.register(Verb::Delete, pattern, middleware, handler)
    }

    /// Register an OPTIONS route
    pub fn options(&mut self, pattern: &str, handler: impl Handler + 'static) -> Result<&mut Self> {
        self.register(Verb::Options, pattern, Vec::new(), handler)
    }

    /// Register an OPTIONS route with middleware
    pub fn options_with(
        &mut self,
        pattern: &str,
        middleware: Vec<Arc<dyn Handler>>,
        handler: impl Handler + 'static,
    ) -> Result<&mut Self> {
        self.register(Verb::Options, pattern, middleware, handler)
    }

    /// Enable the static-asset fallback under the default prefix
    pub fn use_static(&mut self) -> &mut Self {
        self.static_enabled = true;
        self
    }

    /// Enable the static-asset fallback under a custom prefix
    pub fn use_static_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.static_enabled = true;
        self.static_prefix = prefix.into();
        self
    }

    /// Wire the static-asset store the fallback serves from
    pub fn set_static_assets(&mut self, assets: Arc<dyn StaticAssets>) -> &mut Self {
        self.static_assets = Some(assets);
        self
    }

    /// Set the fallback prefix without enabling the fallback.
    ///
    /// The host applies the configured prefix here before the script runs;
    /// whether the fallback is active stays the script's call via
    /// [`Router::use_static`].
    pub fn set_static_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.static_prefix = prefix.into();
        self
    }

    /// Register a route under an explicit verb
    pub fn register(
        &mut self,
        verb: Verb,
        pattern: &str,
        middleware: Vec<Arc<dyn Handler>>,
        handler: impl Handler + 'static,
    ) -> Result<&mut Self> {
        self.table
            .register(verb, pattern, middleware, Arc::new(handler))?;
        Ok(self)
    }

    /// The underlying route table
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub(crate) fn static_enabled(&self) -> bool {
        self.static_enabled
    }

    pub(crate) fn static_prefix(&self) -> &str {
        &self.static_prefix
    }

    pub(crate) fn static_assets(&self) -> Option<&Arc<dyn StaticAssets>> {
        self.static_assets.as_ref()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
