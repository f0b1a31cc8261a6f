//! Axum glue: a single interception point for every failure.
//!
//! Handlers return `Result<_, Failure>`. [`Failure::into_response`] parks the
//! failure in the response extensions and [`classify_failures`] turns it into
//! the uniform JSON body, using the request metadata it captured on the way in.

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{
        Request, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderValue, Method, Uri, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use http::StatusCode;

use crate::classify::{ClassifierPolicy, classify};
use crate::failure::Failure;
use crate::response::{ErrorClassifier, RequestMeta};

/// Header carrying the request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Failure waiting in the response extensions for [`classify_failures`].
#[derive(Debug, Clone)]
pub struct PendingFailure(pub Arc<Failure>);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        // Provisional status; the middleware replaces the whole response.
        let status = classify(&self, &ClassifierPolicy::default()).status;
        let mut response = status.into_response();
        response
            .extensions_mut()
            .insert(PendingFailure(Arc::new(self)));
        response
    }
}

impl RequestMeta {
    #[must_use]
    pub fn from_request<B>(request: &http::Request<B>) -> Self {
        let uri = request.uri();
        Self {
            method: request.method().to_string(),
            path: uri
                .path_and_query()
                .map_or_else(|| uri.path().to_owned(), |pq| pq.as_str().to_owned()),
            request_id: request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(ToOwned::to_owned),
        }
    }
}

impl ErrorClassifier {
    /// Classify, report and build the final HTTP response.
    #[must_use]
    pub fn respond(&self, failure: &Failure, meta: &RequestMeta, now: DateTime<Utc>) -> Response {
        let rendered = self.render(failure, meta, now);
        let mut response = (rendered.status, rendered.body).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }
}

/// Middleware turning parked failures into uniform error responses.
///
/// Install with `axum::middleware::from_fn_with_state(classifier, classify_failures)`.
pub async fn classify_failures(
    State(classifier): State<ErrorClassifier>,
    request: Request,
    next: Next,
) -> Response {
    let meta = RequestMeta::from_request(&request);
    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<PendingFailure>() {
        Some(PendingFailure(failure)) => classifier.respond(&failure, &meta, Utc::now()),
        None => response,
    }
}

impl From<JsonRejection> for Failure {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // Well-formed JSON of the wrong shape is a validation failure.
            JsonRejection::JsonDataError(_) => Self::bad_request(rejection.body_text()),
            _ => Self::client(rejection.status(), rejection.body_text()),
        }
    }
}

impl From<PathRejection> for Failure {
    fn from(rejection: PathRejection) -> Self {
        Self::client(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<QueryRejection> for Failure {
    fn from(rejection: QueryRejection) -> Self {
        Self::client(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

/// Panic handler for `tower_http::catch_panic::CatchPanicLayer::custom`.
#[allow(clippy::needless_pass_by_value)] // signature imposed by CatchPanicLayer
#[must_use]
pub fn panic_to_failure(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else {
        "non-string panic payload".to_owned()
    };
    Failure::unknown(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}

/// Router fallback for unmatched paths.
#[allow(clippy::unused_async)] // axum handler
pub async fn route_not_found(method: Method, uri: Uri) -> Failure {
    Failure::not_found(format!("Cannot {method} {}", uri.path()))
}

/// Router fallback for matched paths with an unsupported method.
#[allow(clippy::unused_async)] // axum handler
pub async fn method_not_allowed(method: Method, uri: Uri) -> Failure {
    Failure::client(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Cannot {method} {}", uri.path()),
    )
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::testing::RecordingReporter;
    use axum::{
        Json, Router,
        body::Body,
        middleware,
        routing::{get, post},
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Counter {
        #[allow(dead_code)]
        n: i64,
    }

    #[allow(clippy::unused_async)]
    async fn count(body: Result<Json<Counter>, JsonRejection>) -> Result<(), Failure> {
        body?;
        Ok(())
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn app(reporter: Arc<RecordingReporter>) -> Router {
        let classifier = ErrorClassifier::new(ClassifierPolicy::default(), reporter);
        Router::new()
            .route("/ok", get(|| async { "fine" }))
            .route(
                "/teapot",
                get(|| async { Err::<(), _>(Failure::client(StatusCode::IM_A_TEAPOT, "short and stout")) }),
            )
            .route(
                "/boom",
                get(|| async { Err::<(), _>(Failure::unknown(anyhow::anyhow!("pool exhausted"))) }),
            )
            .route("/count", post(count))
            .fallback(route_not_found)
            .method_not_allowed_fallback(method_not_allowed)
            .layer(middleware::from_fn_with_state(classifier, classify_failures))
    }

    #[tokio::test]
    async fn success_passes_through_untouched() {
        let reporter = Arc::new(RecordingReporter::default());
        let resp = app(reporter.clone())
            .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(reporter.take().is_empty());
    }

    #[tokio::test]
    async fn client_failure_is_normalized() {
        let reporter = Arc::new(RecordingReporter::default());
        let resp = app(reporter.clone())
            .oneshot(
                Request::builder()
                    .uri("/teapot?x=1")
                    .header(REQUEST_ID_HEADER, "rid-7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let v = body_json(resp).await;
        assert_eq!(v["statusCode"], 418);
        assert_eq!(v["message"], "short and stout");
        assert_eq!(v["error"], "I'm a teapot");
        assert_eq!(v["path"], "/teapot?x=1");
        assert_eq!(v["method"], "GET");
        assert!(v["timestamp"].as_str().unwrap().ends_with('Z'));

        let reports = reporter.take();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].request_id.as_deref(), Some("rid-7"));
    }

    #[tokio::test]
    async fn unknown_failure_becomes_generic_500() {
        let reporter = Arc::new(RecordingReporter::default());
        let resp = app(reporter.clone())
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let v = body_json(resp).await;
        assert_eq!(v["message"], "Internal server error");
        assert_eq!(v["error"], "Internal Server Error");

        let reports = reporter.take();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].diagnostic.contains("pool exhausted"));
    }

    #[tokio::test]
    async fn unmatched_route_reports_method_and_path() {
        let reporter = Arc::new(RecordingReporter::default());
        let resp = app(reporter)
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let v = body_json(resp).await;
        assert_eq!(v["message"], "Cannot GET /nope");
        assert_eq!(v["error"], "Not Found");
    }

    #[tokio::test]
    async fn wrong_method_is_405() {
        let reporter = Arc::new(RecordingReporter::default());
        let resp = app(reporter)
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/ok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        let v = body_json(resp).await;
        assert_eq!(v["message"], "Cannot DELETE /ok");
    }

    async fn post_count(content_type: Option<&str>, body: &'static str) -> Response {
        let mut builder = Request::builder().method(Method::POST).uri("/count");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        app(Arc::new(RecordingReporter::default()))
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn json_rejections_keep_their_status_except_data_errors() {
        let resp = post_count(Some("application/json"), r#"{"n":"seven"}"#).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let v = body_json(resp).await;
        assert_eq!(v["statusCode"], 400);
        assert!(v["message"].as_str().unwrap().contains("invalid type"));

        let resp = post_count(Some("application/json"), r#"{"n":"#).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = post_count(None, r#"{"n":7}"#).await;
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body_json(resp).await["statusCode"], 415);

        let resp = post_count(Some("application/json"), r#"{"n":7}"#).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn panic_payload_becomes_unknown_failure() {
        let resp = panic_to_failure(Box::new("kaboom"));
        let pending = resp.extensions().get::<PendingFailure>().unwrap();
        assert!(matches!(*pending.0, Failure::Unknown(_)));
        assert!(pending.0.diagnostic().contains("kaboom"));
    }
}
