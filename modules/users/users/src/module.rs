use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::api::rest::routes;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::storage::SeaOrmUsersRepository;
use crate::infra::storage::migrations::Migrator;

/// Name of the module's section under `modules` in the application config.
pub const MODULE_NAME: &str = "users";

/// The users module: schema, service and REST routes.
pub struct UsersModule {
    service: Arc<Service>,
}

impl UsersModule {
    /// Apply pending migrations and wire the service to the database.
    ///
    /// # Errors
    /// Returns an error if the schema migration fails.
    pub async fn init(db: DatabaseConnection, config: ServiceConfig) -> anyhow::Result<Self> {
        Migrator::up(&db, None)
            .await
            .context("failed to apply users schema migrations")?;

        info!(
            min_name_length = config.min_name_length,
            max_page_size = config.max_page_size,
            "Users module initialized"
        );

        let repo = Arc::new(SeaOrmUsersRepository::new(db));
        Ok(Self {
            service: Arc::new(Service::new(repo, config)),
        })
    }

    #[must_use]
    pub fn service(&self) -> Arc<Service> {
        Arc::clone(&self.service)
    }

    #[must_use]
    pub fn router(&self) -> Router {
        routes::router(self.service())
    }
}
