//! Closed set of failures a request handler can raise.
//!
//! Every failure is tagged where it originates: application code raises
//! [`Failure::Client`], the storage layer raises [`Failure::Persistence`],
//! and everything else is carried as [`Failure::Unknown`].

use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Payload of a client-facing message: plain text or a structured value
/// (e.g. a list of validation violations).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Text(String),
    Details(serde_json::Value),
}

impl Message {
    /// Build a structured message from a list of human-readable lines.
    #[must_use]
    pub fn list<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Details(serde_json::Value::Array(
            lines
                .into_iter()
                .map(|l| serde_json::Value::String(l.into()))
                .collect(),
        ))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Details(value) => write!(f, "{value}"),
        }
    }
}

impl From<String> for Message {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Message {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// A failure deliberately raised as a client-facing HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFailure {
    pub status: StatusCode,
    pub message: Option<Message>,
    pub error: Option<String>,
}

/// Storage-layer error codes the classifier knows how to translate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceCode {
    /// A uniqueness constraint rejected the write.
    UniqueViolation,
    /// The addressed record does not exist.
    RecordNotFound,
    /// Any other driver-reported code, kept verbatim.
    Vendor(String),
}

impl PersistenceCode {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::UniqueViolation => "unique_violation",
            Self::RecordNotFound => "record_not_found",
            Self::Vendor(code) => code,
        }
    }
}

impl fmt::Display for PersistenceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra context attached by the storage layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistenceMeta {
    /// Public field names involved in the failure (e.g. the colliding columns).
    pub target: Vec<String>,
}

/// A failure raised by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceFailure {
    pub code: PersistenceCode,
    pub meta: PersistenceMeta,
}

impl PersistenceFailure {
    #[must_use]
    pub fn unique_violation<I, S>(target: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            code: PersistenceCode::UniqueViolation,
            meta: PersistenceMeta {
                target: target.into_iter().map(Into::into).collect(),
            },
        }
    }

    #[must_use]
    pub fn record_not_found() -> Self {
        Self {
            code: PersistenceCode::RecordNotFound,
            meta: PersistenceMeta::default(),
        }
    }

    #[must_use]
    pub fn vendor(code: impl Into<String>) -> Self {
        Self {
            code: PersistenceCode::Vendor(code.into()),
            meta: PersistenceMeta::default(),
        }
    }
}

/// Any failure raised while handling a request.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    #[error("client failure ({})", .0.status)]
    Client(ClientFailure),

    #[error("persistence failure ({})", .0.code)]
    Persistence(PersistenceFailure),

    #[error("unexpected failure: {0:#}")]
    Unknown(anyhow::Error),
}

impl Failure {
    /// Structured HTTP failure with an explicit message.
    #[must_use]
    pub fn client(status: StatusCode, message: impl Into<Message>) -> Self {
        Self::Client(ClientFailure {
            status,
            message: Some(message.into()),
            error: None,
        })
    }

    /// Structured HTTP failure carrying only a status.
    #[must_use]
    pub fn status(status: StatusCode) -> Self {
        Self::Client(ClientFailure {
            status,
            message: None,
            error: None,
        })
    }

    #[must_use]
    pub fn bad_request(message: impl Into<Message>) -> Self {
        Self::client(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<Message>) -> Self {
        Self::client(StatusCode::NOT_FOUND, message)
    }

    /// Wrap an unexpected error; it will surface as a generic 500.
    #[must_use]
    pub fn unknown(err: impl Into<anyhow::Error>) -> Self {
        Self::Unknown(err.into())
    }

    /// Override the error label of a client failure. No-op for other kinds.
    #[must_use]
    pub fn with_error_label(mut self, label: impl Into<String>) -> Self {
        if let Self::Client(ref mut client) = self {
            client.error = Some(label.into());
        }
        self
    }

    /// Full diagnostic form used for internal logs, never for responses.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Unknown(err) => format!("{err:?}"),
            other => format!("{other:?}"),
        }
    }
}

impl From<ClientFailure> for Failure {
    fn from(value: ClientFailure) -> Self {
        Self::Client(value)
    }
}

impl From<PersistenceFailure> for Failure {
    fn from(value: PersistenceFailure) -> Self {
        Self::Persistence(value)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(value: anyhow::Error) -> Self {
        Self::Unknown(value)
    }
}
