pub mod app;
pub mod auth;
pub mod config;
pub mod controllers;
pub mod db;
pub mod error;
pub mod extractors;
pub mod logging;
pub mod migrations;
pub mod models;
pub mod module;
pub mod openapi;
pub mod rbac;
pub mod response;
pub mod routes;
pub mod seeders;
pub mod testing;

pub use app::App;
pub use config::Config;
pub use error::AerodeskError;
pub use module::{AuthModule, Module};
pub use rbac::RbacService;
pub use response::ApiResponse;
pub use testing::{TestApp, TestClient, TestResponse};
