//! Uniform error body and the classifier that renders it.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use http::StatusCode;
use serde::Serialize;

use crate::classify::{ClassifierPolicy, classify};
use crate::failure::{Failure, Message};
use crate::report::{FailureReport, FailureReporter, TracingReporter};

/// Emitted verbatim when the regular body cannot be serialized.
pub const FALLBACK_BODY: &str =
    r#"{"statusCode":500,"message":"Internal server error","error":"Internal Server Error"}"#;

/// Request data the error body and the reports refer to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub method: String,
    /// Request target: path plus query string.
    pub path: String,
    pub request_id: Option<String>,
}

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: Message,
    pub error: String,
    pub timestamp: String,
    pub path: String,
    pub method: String,
}

/// Rendered error response, independent of the HTTP framework.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Classifies failures, reports them once, and renders the uniform body.
#[derive(Clone)]
pub struct ErrorClassifier {
    policy: ClassifierPolicy,
    reporter: Arc<dyn FailureReporter>,
}

impl std::fmt::Debug for ErrorClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorClassifier")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(ClassifierPolicy::default(), Arc::new(TracingReporter))
    }
}

impl ErrorClassifier {
    #[must_use]
    pub fn new(policy: ClassifierPolicy, reporter: Arc<dyn FailureReporter>) -> Self {
        Self { policy, reporter }
    }

    #[must_use]
    pub fn policy(&self) -> &ClassifierPolicy {
        &self.policy
    }

    /// Classify `failure`, hand one report to the reporter and render the body.
    #[must_use]
    pub fn render(&self, failure: &Failure, meta: &RequestMeta, now: DateTime<Utc>) -> Rendered {
        let classification = classify(failure, &self.policy);

        self.reporter.report(&FailureReport {
            method: &meta.method,
            url: &meta.path,
            request_id: meta.request_id.as_deref(),
            status: classification.status,
            message: classification.message.to_string(),
            diagnostic: failure.diagnostic(),
        });

        let body = ErrorBody {
            status_code: classification.status.as_u16(),
            message: classification.message,
            error: classification.error,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            path: meta.path.clone(),
            method: meta.method.clone(),
        };

        match serde_json::to_vec(&body) {
            Ok(bytes) => Rendered {
                status: classification.status,
                body: bytes,
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize error body");
                Rendered {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: FALLBACK_BODY.as_bytes().to_vec(),
                }
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::failure::PersistenceFailure;
    use crate::testing::RecordingReporter;
    use chrono::TimeZone;

    fn meta() -> RequestMeta {
        RequestMeta {
            method: "POST".to_owned(),
            path: "/users?page=2".to_owned(),
            request_id: Some("abc".to_owned()),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn body_carries_all_fields() {
        let classifier = ErrorClassifier::default();
        let failure = Failure::from(PersistenceFailure::unique_violation(["tgId"]));
        let rendered = classifier.render(&failure, &meta(), fixed_now());

        assert_eq!(rendered.status, StatusCode::CONFLICT);
        let v: serde_json::Value = serde_json::from_slice(&rendered.body).unwrap();
        assert_eq!(v["statusCode"], 409);
        assert_eq!(v["message"], "Unique constraint failed on: tgId");
        assert_eq!(v["error"], "Database Error");
        assert_eq!(v["timestamp"], "2026-10-16T12:00:00.000Z");
        assert_eq!(v["path"], "/users?page=2");
        assert_eq!(v["method"], "POST");
    }

    #[test]
    fn exactly_one_report_per_failure() {
        let reporter = Arc::new(RecordingReporter::default());
        let classifier = ErrorClassifier::new(ClassifierPolicy::default(), reporter.clone());

        let _ = classifier.render(&Failure::not_found("gone"), &meta(), fixed_now());
        let _ = classifier.render(
            &Failure::unknown(anyhow::anyhow!("disk on fire")),
            &meta(),
            fixed_now(),
        );

        let reports = reporter.take();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].status, StatusCode::NOT_FOUND);
        assert_eq!(reports[0].message, "gone");
        assert_eq!(reports[1].status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(reports[1].diagnostic.contains("disk on fire"));
        assert_eq!(reports[1].request_id.as_deref(), Some("abc"));
    }

    #[test]
    fn unknown_failure_does_not_leak_detail_in_body() {
        let classifier = ErrorClassifier::default();
        let failure = Failure::unknown(anyhow::anyhow!("secret dsn"));
        let rendered = classifier.render(&failure, &meta(), fixed_now());
        let body = String::from_utf8(rendered.body).unwrap();
        assert!(!body.contains("secret dsn"));
        assert!(body.contains("Internal server error"));
    }

    #[test]
    fn fallback_body_is_valid_json() {
        let v: serde_json::Value = serde_json::from_str(FALLBACK_BODY).unwrap();
        assert_eq!(v["statusCode"], 500);
    }
}
