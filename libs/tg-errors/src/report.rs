//! Observability side of the classifier.

use http::StatusCode;

/// Everything a reporter needs to log one classified failure.
#[derive(Debug, Clone)]
pub struct FailureReport<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub request_id: Option<&'a str>,
    pub status: StatusCode,
    pub message: String,
    /// Full `{:?}` rendering of the failure, including the error chain.
    pub diagnostic: String,
}

impl FailureReport<'_> {
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status == StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Sink receiving exactly one report per classified failure.
pub trait FailureReporter: Send + Sync {
    fn report(&self, report: &FailureReport<'_>);
}

/// Default reporter backed by `tracing`.
///
/// 500 responses are logged at `error` with the full diagnostic. Everything
/// else is logged at `warn` with the client-facing message only.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, report: &FailureReport<'_>) {
        if report.is_server_error() {
            tracing::error!(
                method = report.method,
                url = report.url,
                request_id = report.request_id.unwrap_or("-"),
                diagnostic = %report.diagnostic,
                "unhandled failure while serving request"
            );
        } else {
            tracing::warn!(
                url = report.url,
                status = report.status.as_u16(),
                message = %report.message,
                "request failed"
            );
        }
    }
}
