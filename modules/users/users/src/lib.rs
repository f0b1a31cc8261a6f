//! Users module
//!
//! CRUD over the `users` table (Telegram account registry):
//! - `domain`: service, validation rules and the repository port
//! - `infra::storage`: sea-orm entity, repository, schema migration and
//!   storage error mapping
//! - `api::rest`: axum handlers and the per-endpoint public views
//!
//! Handlers return [`tg_errors::Failure`]; the uniform error body is produced
//! by the classifier middleware installed by the server.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod domain;
pub mod infra;
pub mod module;

pub use domain::service::{Service, ServiceConfig};
pub use module::{MODULE_NAME, UsersModule};
