//! Users server: wires configuration, logging, the database and the users
//! module into one HTTP service.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod server;

pub use server::{build_router, serve};
