//! Script lifecycle and per-request serving

use crate::config::HostConfig;
use crate::script::Script;
use crate::static_fs::FsStaticAssets;
use bytes::Bytes;
use futures::FutureExt;
use harbor_core::{Body, Collaborators, Context, Request, Result, StatusCode};
use harbor_router::Router;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Owns a loaded script and serves requests against its sealed router.
///
/// Loading runs the script's `main` exactly once; afterwards the router is
/// immutable behind an `Arc` and `handle` may be called from any number of
/// tasks concurrently.
pub struct ScriptHost {
    router: Arc<Router>,
    script: Arc<dyn Script>,
    collab: Arc<Collaborators>,
    deadline: Duration,
}

impl fmt::Debug for ScriptHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptHost")
            .field("routes", &self.router.table().total_route_count())
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl ScriptHost {
    /// Load a script.
    ///
    /// Fails when route registration fails; a script with a malformed or
    /// duplicate pattern never starts serving.
    pub fn load(
        script: Arc<dyn Script>,
        collab: Arc<Collaborators>,
        config: &HostConfig,
    ) -> Result<Self> {
        let mut router = Router::new();
        router
            .set_static_prefix(config.static_files.prefix.as_str())
            .set_static_assets(Arc::new(FsStaticAssets::new(
                &config.static_files.dir,
                &config.static_files.prefix,
            )));

        script.main(&mut router)?;

        info!(
            routes = router.table().total_route_count(),
            "script loaded"
        );

        Ok(Self {
            router: Arc::new(router),
            script,
            collab,
            deadline: config.limits.request_deadline,
        })
    }

    /// Serve one request to completion.
    ///
    /// This is total: dispatch faults become 500s inside the router, an
    /// exceeded deadline becomes a 500 here, and an unclaimed request goes
    /// through the script's fallback. The caller always gets a response.
    pub async fn handle(&self, request: Request) -> http::Response<Body> {
        let request_id = request.request_id().to_string();
        let mut ctx = Context::new(request, Arc::clone(&self.collab));

        if tokio::time::timeout(self.deadline, self.serve(&mut ctx))
            .await
            .is_err()
        {
            warn!(
                request_id = %request_id,
                deadline = ?self.deadline,
                "request deadline exceeded"
            );
            if !ctx.response.is_finished() {
                ctx.response.internal_server_error("Internal Server Error");
            }
        }

        if !ctx.response.is_finished() {
            warn!(request_id = %request_id, "request completed without a response");
            ctx.response.internal_server_error("Internal Server Error");
        }

        match ctx.response.into_http() {
            Ok(response) => response,
            Err(e) => {
                error!(request_id = %request_id, error = %e, "response conversion failed");
                let mut response =
                    http::Response::new(Body::new(Bytes::from_static(b"Internal Server Error")));
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                response
            }
        }
    }

    async fn serve(&self, ctx: &mut Context) {
        if self.router.dispatch(ctx).await {
            return;
        }

        // Unclaimed: the script's fallback owns the response, with the same
        // fault isolation a handler gets.
        let outcome = AssertUnwindSafe(self.script.fallback(ctx)).catch_unwind().await;
        if outcome.is_err() {
            error!(
                request_id = %ctx.request.request_id(),
                "script fallback panicked"
            );
            if !ctx.response.is_finished() {
                ctx.response.internal_server_error("Internal Server Error");
            }
        }
    }

    /// The sealed router
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use harbor_core::{handler_fn, Error, Method};

    struct PingScript;

    impl Script for PingScript {
        fn main(&self, router: &mut Router) -> Result<()> {
            router.get(
                "/ping",
                handler_fn(|ctx| {
                    async move {
                        ctx.response.ok("pong");
                        Ok(())
                    }
                    .boxed()
                }),
            )?;
            Ok(())
        }
    }

    fn host(script: impl Script + 'static) -> Result<ScriptHost> {
        ScriptHost::load(
            Arc::new(script),
            Arc::new(Collaborators::default()),
            &HostConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_handle_matched_route() {
        let host = host(PingScript).unwrap();

        let request = Request::new(Method::GET, "/ping", "", None).unwrap();
        let response = host.handle(request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_default_fallback_is_404() {
        let host = host(PingScript).unwrap();

        let request = Request::new(Method::GET, "/nope", "", None).unwrap();
        let response = host.handle(request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_registration_error_is_fatal_at_load() {
        struct BadScript;

        impl Script for BadScript {
            fn main(&self, router: &mut Router) -> Result<()> {
                router.get("no-leading-slash", handler_fn(|_ctx| async move { Ok(()) }.boxed()))?;
                Ok(())
            }
        }

        assert!(matches!(
            host(BadScript).unwrap_err(),
            Error::InvalidPattern { .. }
        ));
    }

    #[tokio::test]
    async fn test_deadline_exceeded_becomes_500() {
        struct SlowScript;

        impl Script for SlowScript {
            fn main(&self, router: &mut Router) -> Result<()> {
                router.get(
                    "/slow",
                    handler_fn(|ctx| {
                        async move {
                            tokio::time::sleep(Duration::from_secs(5)).await;
                            ctx.response.ok("too late");
                            Ok(())
                        }
                        .boxed()
                    }),
                )?;
                Ok(())
            }
        }

        let mut config = HostConfig::default();
        config.limits.request_deadline = Duration::from_millis(20);

        let host = ScriptHost::load(
            Arc::new(SlowScript),
            Arc::new(Collaborators::default()),
            &config,
        )
        .unwrap();

        let request = Request::new(Method::GET, "/slow", "", None).unwrap();
        let response = host.handle(request).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_handler_without_terminal_becomes_500() {
        struct SilentScript;

        impl Script for SilentScript {
            fn main(&self, router: &mut Router) -> Result<()> {
                router.get("/silent", handler_fn(|_ctx| async move { Ok(()) }.boxed()))?;
                Ok(())
            }
        }

        let host = host(SilentScript).unwrap();

        let request = Request::new(Method::GET, "/silent", "", None).unwrap();
        let response = host.handle(request).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_custom_fallback_overrides_404() {
        struct SpaScript;

        #[async_trait::async_trait]
        impl Script for SpaScript {
            fn main(&self, _router: &mut Router) -> Result<()> {
                Ok(())
            }

            async fn fallback(&self, ctx: &mut Context) {
                ctx.response.ok_html("<h1>app shell</h1>");
            }
        }

        let host = host(SpaScript).unwrap();

        let request = Request::new(Method::GET, "/anywhere", "", None).unwrap();
        let response = host.handle(request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_panicking_fallback_becomes_500() {
        struct PanickyScript;

        #[async_trait::async_trait]
        impl Script for PanickyScript {
            fn main(&self, _router: &mut Router) -> Result<()> {
                Ok(())
            }

            async fn fallback(&self, _ctx: &mut Context) {
                panic!("fallback bug");
            }
        }

        let host = host(PanickyScript).unwrap();

        let request = Request::new(Method::GET, "/anywhere", "", None).unwrap();
        let response = host.handle(request).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
