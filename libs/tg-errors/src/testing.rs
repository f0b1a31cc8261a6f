//! Test helpers shared by crates that exercise the classifier.

use std::sync::Mutex;

use http::StatusCode;

use crate::report::{FailureReport, FailureReporter};

/// Owned copy of a [`FailureReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedReport {
    pub method: String,
    pub url: String,
    pub request_id: Option<String>,
    pub status: StatusCode,
    pub message: String,
    pub diagnostic: String,
}

/// Reporter that keeps every report in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<RecordedReport>>,
}

impl RecordingReporter {
    /// Drain the recorded reports.
    #[must_use]
    pub fn take(&self) -> Vec<RecordedReport> {
        match self.reports.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl FailureReporter for RecordingReporter {
    fn report(&self, report: &FailureReport<'_>) {
        let owned = RecordedReport {
            method: report.method.to_owned(),
            url: report.url.to_owned(),
            request_id: report.request_id.map(ToOwned::to_owned),
            status: report.status,
            message: report.message.clone(),
            diagnostic: report.diagnostic.clone(),
        };
        match self.reports.lock() {
            Ok(mut guard) => guard.push(owned),
            Err(poisoned) => poisoned.into_inner().push(owned),
        }
    }
}
