//! Request dispatch: match, middleware chain, fault isolation

use crate::table::MatchResult;
use crate::verb::Verb;
use crate::Router;
use futures::FutureExt;
use harbor_core::{Context, Handler};
use std::panic::AssertUnwindSafe;
use tracing::{debug, error, warn};

impl Router {
    /// Dispatch one request.
    ///
    /// Returns `true` when the request was handled (a route ran, a static
    /// asset was served, or a fault was converted into a 500) and `false`
    /// when nothing matched — the caller must then produce a response,
    /// typically a 404.
    pub async fn dispatch(&self, ctx: &mut Context) -> bool {
        let Some(verb) = Verb::from_method(ctx.request.method()) else {
            debug!(method = %ctx.request.method(), "method is not routable");
            return false;
        };

        let path = ctx.request.path().to_string();

        match self.table().lookup(verb, &path) {
            MatchResult::Matched { route, params } => {
                debug!(
                    verb = %verb,
                    pattern = %route.pattern(),
                    request_id = %ctx.request.request_id(),
                    "route matched"
                );

                ctx.request.bind_params(params);

                for middleware in route.middleware() {
                    if !self.run_step(middleware.as_ref(), ctx, route.pattern().raw()).await {
                        return true;
                    }
                    if ctx.response.is_finished() {
                        debug!(
                            pattern = %route.pattern(),
                            "middleware finished the response, chain short-circuited"
                        );
                        return true;
                    }
                }

                self.run_step(route.handler().as_ref(), ctx, route.pattern().raw())
                    .await;
                true
            }
            MatchResult::Unmatched => {
                if verb == Verb::Get {
                    if let Some(handled) = self.try_static(ctx, &path).await {
                        return handled;
                    }
                }
                debug!(verb = %verb, path = %path, "no route matched");
                false
            }
        }
    }

    /// Run one middleware or handler step with fault isolation.
    ///
    /// Returns `false` when the step faulted (error or panic); the fault is
    /// converted into a 500 here and must stop the chain, never propagate
    /// past the request boundary.
    async fn run_step(&self, step: &dyn Handler, ctx: &mut Context, pattern: &str) -> bool {
        let outcome = AssertUnwindSafe(step.call(ctx)).catch_unwind().await;

        match outcome {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!(
                    pattern = %pattern,
                    request_id = %ctx.request.request_id(),
                    error = %e,
                    "handler fault"
                );
                if !ctx.response.is_finished() {
                    ctx.response.internal_server_error("Internal Server Error");
                }
                false
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                error!(
                    pattern = %pattern,
                    request_id = %ctx.request.request_id(),
                    panic = %message,
                    "handler panicked"
                );
                if !ctx.response.is_finished() {
                    ctx.response.internal_server_error("Internal Server Error");
                }
                false
            }
        }
    }

    /// Attempt the static-asset fallback for an unmatched GET.
    ///
    /// `Some(true)` when an asset was served (or the store faulted and a
    /// 500 was produced); `None` when the fallback does not apply or the
    /// store reported a miss, leaving the request unmatched.
    async fn try_static(&self, ctx: &mut Context, path: &str) -> Option<bool> {
        if !self.static_enabled() || !path.starts_with(self.static_prefix()) {
            return None;
        }
        let assets = self.static_assets()?;

        match assets.fetch(path).await {
            Ok(Some(asset)) => {
                debug!(path = %path, content_type = %asset.content_type, "static asset served");
                ctx.response.ok_bytes(asset.bytes, asset.content_type);
                Some(true)
            }
            Ok(None) => {
                debug!(path = %path, "static asset miss");
                None
            }
            Err(e) => {
                warn!(path = %path, error = %e, "static asset store failed");
                if !ctx.response.is_finished() {
                    ctx.response.internal_server_error("Internal Server Error");
                }
                Some(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::FutureExt;
    use harbor_core::collab::{StaticAsset, StaticAssets};
    use harbor_core::{handler_fn, Collaborators, Error, Request, Result, StatusCode};
    use http::Method;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn ctx_for(method: Method, url: &str) -> Context {
        let request = Request::new(method, url, "", None).unwrap();
        Context::new(request, Arc::new(Collaborators::default()))
    }

    fn counting_handler(hits: Arc<AtomicUsize>) -> impl Handler {
        handler_fn(move |ctx| {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                ctx.response.ok("handled");
                Ok(())
            }
            .boxed()
        })
    }

    #[tokio::test]
    async fn test_exact_match_invokes_handler_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut router = Router::new();
        router.get("/ping", counting_handler(Arc::clone(&hits))).unwrap();

        let mut ctx = ctx_for(Method::GET, "/ping");
        assert!(router.dispatch(&mut ctx).await);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.response.body_text(), "handled");
    }

    #[tokio::test]
    async fn test_unmatched_returns_false_and_runs_nothing() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut router = Router::new();
        router.get("/ping", counting_handler(Arc::clone(&hits))).unwrap();

        let mut ctx = ctx_for(Method::GET, "/pong");
        assert!(!router.dispatch(&mut ctx).await);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(!ctx.response.is_finished());
    }

    #[tokio::test]
    async fn test_params_bound_before_handler() {
        let mut router = Router::new();
        router
            .get(
                "/users/:id",
                handler_fn(|ctx| {
                    async move {
                        let id = ctx.request.param("id").unwrap_or("?").to_string();
                        ctx.response.ok(id);
                        Ok(())
                    }
                    .boxed()
                }),
            )
            .unwrap();

        let mut ctx = ctx_for(Method::GET, "/users/42");
        assert!(router.dispatch(&mut ctx).await);
        assert_eq!(ctx.response.body_text(), "42");
    }

    #[tokio::test]
    async fn test_middleware_short_circuit_blocks_handler() {
        let hits = Arc::new(AtomicUsize::new(0));
        let blocker: Arc<dyn Handler> = Arc::new(handler_fn(|ctx| {
            async move {
                ctx.response.not_found("blocked");
                Ok(())
            }
            .boxed()
        }));

        let mut router = Router::new();
        router
            .get_with("/secure", vec![blocker], counting_handler(Arc::clone(&hits)))
            .unwrap();

        let mut ctx = ctx_for(Method::GET, "/secure");
        assert!(router.dispatch(&mut ctx).await);
        assert_eq!(ctx.response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ctx.response.body_text(), "blocked");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_middleware_runs_in_order_then_handler() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let tag = |name: &'static str, order: &Arc<std::sync::Mutex<Vec<&'static str>>>| {
            let order = Arc::clone(order);
            Arc::new(handler_fn(move |_ctx| {
                let order = Arc::clone(&order);
                async move {
                    order.lock().unwrap().push(name);
                    Ok(())
                }
                .boxed()
            })) as Arc<dyn Handler>
        };

        let final_order = Arc::clone(&order);
        let mut router = Router::new();
        router
            .get_with(
                "/chain",
                vec![tag("first", &order), tag("second", &order)],
                handler_fn(move |ctx| {
                    let order = Arc::clone(&final_order);
                    async move {
                        order.lock().unwrap().push("handler");
                        ctx.response.ok("done");
                        Ok(())
                    }
                    .boxed()
                }),
            )
            .unwrap();

        let mut ctx = ctx_for(Method::GET, "/chain");
        assert!(router.dispatch(&mut ctx).await);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "handler"]);
    }

    #[tokio::test]
    async fn test_handler_error_becomes_500_and_loop_survives() {
        let mut router = Router::new();
        router
            .get(
                "/broken",
                handler_fn(|_ctx| {
                    async move { Err(Error::handler("database exploded")) }.boxed()
                }),
            )
            .unwrap();
        router
            .get(
                "/healthy",
                handler_fn(|ctx| {
                    async move {
                        ctx.response.ok("fine");
                        Ok(())
                    }
                    .boxed()
                }),
            )
            .unwrap();

        let mut ctx = ctx_for(Method::GET, "/broken");
        assert!(router.dispatch(&mut ctx).await);
        assert_eq!(ctx.response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        // The next, unrelated request dispatches normally
        let mut ctx = ctx_for(Method::GET, "/healthy");
        assert!(router.dispatch(&mut ctx).await);
        assert_eq!(ctx.response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_500() {
        let mut router = Router::new();
        router
            .get(
                "/panics",
                handler_fn(|_ctx| async move { panic!("unexpected") }.boxed()),
            )
            .unwrap();

        let mut ctx = ctx_for(Method::GET, "/panics");
        assert!(router.dispatch(&mut ctx).await);
        assert_eq!(ctx.response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_faulting_middleware_stops_chain() {
        let hits = Arc::new(AtomicUsize::new(0));
        let faulty: Arc<dyn Handler> = Arc::new(handler_fn(|_ctx| {
            async move { Err(Error::handler("middleware fault")) }.boxed()
        }));

        let mut router = Router::new();
        router
            .get_with("/guarded", vec![faulty], counting_handler(Arc::clone(&hits)))
            .unwrap();

        let mut ctx = ctx_for(Method::GET, "/guarded");
        assert!(router.dispatch(&mut ctx).await);
        assert_eq!(ctx.response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[derive(Debug)]
    struct MapAssets {
        files: HashMap<String, &'static [u8]>,
    }

    #[async_trait]
    impl StaticAssets for MapAssets {
        async fn fetch(&self, path: &str) -> Result<Option<StaticAsset>> {
            Ok(self.files.get(path).map(|bytes| StaticAsset {
                bytes: Bytes::from_static(bytes),
                content_type: "text/css".to_string(),
            }))
        }
    }

    fn css_assets() -> Arc<dyn StaticAssets> {
        let mut files = HashMap::new();
        files.insert(
            "/static/main.css".to_string(),
            b"body { margin: 0 }".as_slice(),
        );
        Arc::new(MapAssets { files })
    }

    #[tokio::test]
    async fn test_static_fallback_serves_asset() {
        let mut router = Router::new();
        router.use_static().set_static_assets(css_assets());

        let mut ctx = ctx_for(Method::GET, "/static/main.css");
        assert!(router.dispatch(&mut ctx).await);
        assert_eq!(ctx.response.status_code(), StatusCode::OK);
        assert_eq!(ctx.response.body_text(), "body { margin: 0 }");
    }

    #[tokio::test]
    async fn test_static_miss_stays_unmatched() {
        let mut router = Router::new();
        router.use_static().set_static_assets(css_assets());

        let mut ctx = ctx_for(Method::GET, "/static/missing.css");
        assert!(!router.dispatch(&mut ctx).await);
        assert!(!ctx.response.is_finished());
    }

    #[tokio::test]
    async fn test_static_fallback_disabled_by_default() {
        let mut router = Router::new();
        router.set_static_assets(css_assets());

        let mut ctx = ctx_for(Method::GET, "/static/main.css");
        assert!(!router.dispatch(&mut ctx).await);
    }

    #[tokio::test]
    async fn test_static_fallback_is_get_only() {
        let mut router = Router::new();
        router.use_static().set_static_assets(css_assets());

        let mut ctx = ctx_for(Method::POST, "/static/main.css");
        assert!(!router.dispatch(&mut ctx).await);
    }

    #[tokio::test]
    async fn test_registered_route_beats_static_fallback() {
        let mut router = Router::new();
        router.use_static().set_static_assets(css_assets());
        router
            .get(
                "/static/main.css",
                handler_fn(|ctx| {
                    async move {
                        ctx.response.ok("from route");
                        Ok(())
                    }
                    .boxed()
                }),
            )
            .unwrap();

        let mut ctx = ctx_for(Method::GET, "/static/main.css");
        assert!(router.dispatch(&mut ctx).await);
        assert_eq!(ctx.response.body_text(), "from route");
    }

    #[tokio::test]
    async fn test_unroutable_method_is_unmatched() {
        let mut router = Router::new();
        router
            .get(
                "/ping",
                handler_fn(|ctx| {
                    async move {
                        ctx.response.ok("pong");
                        Ok(())
                    }
                    .boxed()
                }),
            )
            .unwrap();

        let mut ctx = ctx_for(Method::HEAD, "/ping");
        assert!(!router.dispatch(&mut ctx).await);
    }
}
