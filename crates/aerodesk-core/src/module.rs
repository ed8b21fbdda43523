//! The [`Module`] trait: a self-contained feature that brings its own routes,
//! migrations and OpenAPI document, composed at startup by [`App`](crate::App).
//!
//! ```rust,ignore
//! let app = App::new().await?.mount_module(FleetModule::new());
//! ```

use async_trait::async_trait;
use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use utoipa::OpenApi;

use crate::controllers::AppState;
use crate::error::AerodeskError;
use crate::migrations::Migrator;
use crate::openapi::ApiDoc;
use crate::routes::{AUTH_ROUTES, build_routes};

#[async_trait]
pub trait Module: Send + Sync {
    /// A unique name identifying this module, used for logging.
    fn name(&self) -> &str;

    /// The module's routes. `state` is available for route layers.
    fn routes(&self, state: &AppState) -> Router<AppState>;

    /// Run module-specific database migrations.
    async fn migrate(&self, _db: &DatabaseConnection) -> Result<(), AerodeskError> {
        Ok(())
    }

    /// OpenAPI document merged into the application's.
    fn openapi_spec(&self) -> Option<utoipa::openapi::OpenApi> {
        None
    }
}

/// Registration, login and token lifecycle, mounted under a prefix.
pub struct AuthModule {
    prefix: String,
}

impl AuthModule {
    /// Mount under the default `/api` prefix.
    pub fn new() -> Self {
        Self::with_prefix("/api")
    }

    /// Mount under `prefix`; an empty prefix mounts at the root.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for AuthModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self, state: &AppState) -> Router<AppState> {
        let routes = build_routes(&AUTH_ROUTES, state.clone());
        if self.prefix.is_empty() {
            routes
        } else {
            Router::new().nest(&self.prefix, routes)
        }
    }

    async fn migrate(&self, db: &DatabaseConnection) -> Result<(), AerodeskError> {
        Migrator::up(db, None)
            .await
            .map_err(|e| AerodeskError::Internal(format!("Auth migration failed: {e}")))
    }

    fn openapi_spec(&self) -> Option<utoipa::openapi::OpenApi> {
        Some(ApiDoc::openapi())
    }
}
