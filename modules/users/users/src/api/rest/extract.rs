//! Request extractors whose rejections are routed through the classifier.

use axum::extract::{FromRequest, FromRequestParts, Path, Query};
use axum::http::request::Parts;
use tg_errors::Failure;
use uuid::Uuid;

const UUID_EXPECTED: &str = "Validation failed (uuid is expected)";

/// JSON body; malformed input becomes a client failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Failure))]
pub struct JsonBody<T>(pub T);

/// Query string; undecodable input becomes a 400 failure.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(Failure))]
pub struct QueryParams<T>(pub T);

/// The `{uuid}` path segment.
#[derive(Debug, Clone, Copy)]
pub struct UuidParam(pub Uuid);

impl<S> FromRequestParts<S> for UuidParam
where
    S: Send + Sync,
{
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;
        Uuid::parse_str(&raw)
            .map(Self)
            .map_err(|_| Failure::bad_request(UUID_EXPECTED))
    }
}
