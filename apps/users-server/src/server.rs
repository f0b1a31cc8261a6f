//! HTTP assembly: middleware stack and serve loop.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::{HeaderName, StatusCode},
    middleware::from_fn_with_state,
    routing::get,
};
use tg_bootstrap::ServerConfig;
use tg_errors::{
    ErrorClassifier, Failure, classify_failures, method_not_allowed, panic_to_failure,
    route_not_found,
};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub const HEALTH_PATH: &str = "/healthz";

#[allow(clippy::unused_async)] // axum handler
async fn health() -> &'static str {
    "ok"
}

#[allow(clippy::unused_async)] // HandleErrorLayer requires an async fn
async fn handle_middleware_error(err: BoxError) -> Failure {
    if err.is::<tower::timeout::error::Elapsed>() {
        Failure::client(StatusCode::REQUEST_TIMEOUT, "Request timed out")
    } else {
        Failure::unknown(anyhow::anyhow!(err))
    }
}

fn request_id_header() -> HeaderName {
    HeaderName::from_static(tg_errors::axum_ext::REQUEST_ID_HEADER)
}

/// Wrap module routes with the health probe, fallbacks and the middleware stack.
///
/// Outermost first: `SetRequestId` → `PropagateRequestId` → Trace →
/// failure classifier → Timeout → body limit → `CatchPanic` → routes.
/// Everything inside the classifier reaches clients as the uniform error body.
#[must_use]
pub fn build_router(api: Router, classifier: ErrorClassifier, cfg: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route(HEALTH_PATH, get(health))
        .merge(api)
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed);

    // 7) Panics become unclassified failures
    router = router.layer(CatchPanicLayer::custom(panic_to_failure));

    // 6) Body limit, enforced by the body extractors
    router = router.layer(DefaultBodyLimit::max(cfg.body_limit_bytes));

    // 5) Timeout
    router = router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_middleware_error))
            .timeout(Duration::from_secs(cfg.request_timeout_secs)),
    );

    // 4) Failure classifier
    router = router.layer(from_fn_with_state(classifier, classify_failures));

    // 3) Trace; failures are reported by the classifier only
    router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &axum::http::Request<axum::body::Body>| {
                let rid = req
                    .headers()
                    .get(tg_errors::axum_ext::REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    request_id = %rid,
                )
            })
            .on_failure(()),
    );

    // 2) PropagateRequestId
    router = router.layer(PropagateRequestIdLayer::new(request_id_header()));

    // 1) SetRequestId (registered last, runs first)
    router.layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
}

/// Bind `addr` and serve until `cancel` fires.
///
/// # Errors
/// Returns an error if the socket cannot be bound or the server fails.
pub async fn serve(router: Router, addr: SocketAddr, cancel: CancellationToken) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server bound on {}", listener.local_addr()?);

    let shutdown = async move {
        cancel.cancelled().await;
        tracing::info!("HTTP server shutting down gracefully (cancellation)");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
