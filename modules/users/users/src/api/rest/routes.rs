use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use crate::domain::service::Service;

use super::handlers;

pub const USERS_PATH: &str = "/users";
pub const USER_PATH: &str = "/users/{uuid}";

/// Routes of the users module. Failures are left for the classifier middleware.
#[must_use]
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route(
            USERS_PATH,
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            USER_PATH,
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .layer(Extension(service))
}
