use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection};
use std::time::Duration;

use crate::config::Config;

/// Initialize the database connection from config.
pub async fn connect(config: &Config) -> Result<DatabaseConnection, sea_orm::DbErr> {
    let mut opts = ConnectOptions::new(&config.database_url);
    if config.database_url.starts_with("sqlite::memory:") {
        // The in-memory database lives as long as its single connection.
        opts.max_connections(1).min_connections(1);
    } else {
        opts.max_connections(20)
            .min_connections(2)
            .idle_timeout(Duration::from_secs(60));
    }
    opts.connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(config.is_dev());

    SeaDatabase::connect(opts).await
}
