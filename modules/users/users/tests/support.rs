#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Test support for `users` integration tests: in-memory database, seeding
//! and a router wired to the failure classifier.

#![allow(dead_code)] // not every test binary uses every helper

use std::sync::Arc;

use axum::{Router, body::Body, middleware};
use http::{Method, Request, Response};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tg_errors::testing::RecordingReporter;
use tg_errors::{ClassifierPolicy, ErrorClassifier, classify_failures, route_not_found};
use tower::ServiceExt;
use users::{ServiceConfig, UsersModule};
use users_sdk::{NewUser, User};

/// Single-connection in-memory SQLite with the schema applied.
pub async fn inmem_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1);
    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to in-memory database");

    users::infra::storage::migrations::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub fn new_user(tg_id: i64) -> NewUser {
    NewUser {
        tg_id,
        first_name: format!("First{tg_id:04}"),
        last_name: None,
        user_name: format!("user_{tg_id:04}"),
    }
}

pub struct TestApp {
    pub router: Router,
    pub reporter: Arc<RecordingReporter>,
    pub module: UsersModule,
    pub db: DatabaseConnection,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = inmem_db().await;
        let module = UsersModule::init(db.clone(), ServiceConfig::default())
            .await
            .unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let classifier = ErrorClassifier::new(ClassifierPolicy::default(), reporter.clone());
        let router = module
            .router()
            .fallback(route_not_found)
            .layer(middleware::from_fn_with_state(classifier, classify_failures));
        Self {
            router,
            reporter,
            module,
            db,
        }
    }

    pub async fn seed(&self, tg_id: i64) -> User {
        self.module.service().create_user(new_user(tg_id)).await.unwrap()
    }

    pub async fn call(&self, method: Method, uri: &str, body: Option<serde_json::Value>) -> (u16, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let resp = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        split(resp).await
    }

    /// Send a body verbatim with an optional content type.
    pub async fn call_raw(
        &self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> (u16, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        let resp = self
            .router
            .clone()
            .oneshot(builder.body(Body::from(body.to_owned())).unwrap())
            .await
            .unwrap();
        split(resp).await
    }
}

pub async fn split(resp: Response<Body>) -> (u16, serde_json::Value) {
    let status = resp.status().as_u16();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
