//! Failure classification and response normalization.
//!
//! Every failure raised while handling a request ends up as one uniform JSON
//! body `{statusCode, message, error, timestamp, path, method}`:
//! - [`Failure`] is the closed set of failure kinds
//! - [`classify`] maps a failure to `{status, message, error}`
//! - [`ErrorClassifier`] reports the failure once and renders the body
//! - with the `axum` feature, [`classify_failures`] is the middleware that
//!   intercepts failures returned by handlers
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod classify;
pub mod failure;
pub mod report;
pub mod response;

#[cfg(feature = "axum")]
pub mod axum_ext;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use classify::{Classification, ClassifierPolicy, classify};
pub use failure::{
    ClientFailure, Failure, Message, PersistenceCode, PersistenceFailure, PersistenceMeta,
};
pub use report::{FailureReport, FailureReporter, TracingReporter};
pub use response::{ErrorBody, ErrorClassifier, RequestMeta};

#[cfg(feature = "axum")]
pub use axum_ext::{
    PendingFailure, classify_failures, method_not_allowed, panic_to_failure, route_not_found,
};
