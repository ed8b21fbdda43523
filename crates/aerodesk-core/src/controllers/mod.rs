use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::rbac::RbacService;

/// Shared application state available in all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub rbac: RbacService,
}

pub mod auth;
