//! Route storage with registration-order precedence

use crate::pattern::PathPattern;
use crate::verb::Verb;
use harbor_core::{Error, Handler, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A registered route: verb, pattern, middleware chain, handler.
///
/// Created during script load and immutable afterwards; owned exclusively
/// by the table.
pub struct Route {
    verb: Verb,
    pattern: PathPattern,
    middleware: Vec<Arc<dyn Handler>>,
    handler: Arc<dyn Handler>,
}

impl Route {
    /// The verb this route answers
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// The registered pattern
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Middleware in registration order
    pub fn middleware(&self) -> &[Arc<dyn Handler>] {
        &self.middleware
    }

    /// The terminal handler
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("verb", &self.verb)
            .field("pattern", &self.pattern.raw())
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

/// Outcome of a table lookup
#[derive(Debug)]
pub enum MatchResult<'a> {
    /// A route matched; parameters are bound from the path
    Matched {
        /// The matched route
        route: &'a Route,
        /// Bound path parameters
        params: HashMap<String, String>,
    },
    /// No route matched; the caller must produce a response
    Unmatched,
}

/// Ordered collection of routes, grouped by verb.
///
/// Registration order is preserved per verb and the first structural match
/// wins, so more specific literal routes must be registered before more
/// general parameterized ones. That ordering dependency is the documented
/// contract.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<Verb, Vec<Route>>,
}

impl RouteTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route.
    ///
    /// Fails with [`Error::InvalidPattern`] on a malformed pattern and with
    /// [`Error::DuplicateRoute`] when the identical (verb, pattern) pair is
    /// already registered; shadowing is rejected, not allowed.
    pub fn register(
        &mut self,
        verb: Verb,
        pattern: &str,
        middleware: Vec<Arc<dyn Handler>>,
        handler: Arc<dyn Handler>,
    ) -> Result<()> {
        let pattern = PathPattern::parse(pattern)?;

        let routes = self.routes.entry(verb).or_default();
        if routes.iter().any(|r| r.pattern.raw() == pattern.raw()) {
            return Err(Error::DuplicateRoute {
                verb: verb.to_string(),
                pattern: pattern.raw().to_string(),
            });
        }

        tracing::debug!(verb = %verb, pattern = %pattern, "route registered");

        routes.push(Route {
            verb,
            pattern,
            middleware,
            handler,
        });

        Ok(())
    }

    /// Find the first route matching a verb and path, in registration order
    pub fn lookup(&self, verb: Verb, path: &str) -> MatchResult<'_> {
        let Some(routes) = self.routes.get(&verb) else {
            return MatchResult::Unmatched;
        };

        for route in routes {
            if let Some(params) = route.pattern.match_path(path) {
                return MatchResult::Matched { route, params };
            }
        }

        MatchResult::Unmatched
    }

    /// Number of routes registered for a verb
    pub fn route_count(&self, verb: Verb) -> usize {
        self.routes.get(&verb).map(|r| r.len()).unwrap_or(0)
    }

    /// Number of routes across all verbs
    pub fn total_route_count(&self) -> usize {
        self.routes.values().map(|r| r.len()).sum()
    }
}
