//! Users SDK
//!
//! Transport-agnostic models shared by the `users` module and its consumers:
//! - [`User`], the stored record
//! - [`NewUser`] and [`UserPatch`], the write inputs
//! - [`PageRequest`], offset pagination for listing
#![forbid(unsafe_code)]

pub mod models;

pub use models::{NewUser, PageRequest, User, UserPatch};
