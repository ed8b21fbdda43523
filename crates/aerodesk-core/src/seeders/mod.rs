//! One-shot database seeders.
//!
//! ```rust,ignore
//! let app = App::new().await?;
//! app.seed().await?;
//! ```

use std::time::Instant;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::error::AerodeskError;
use crate::rbac::RbacService;

pub mod role_permission;

pub use role_permission::RolePermissionSeeder;

/// A batch job that populates reference data.
#[async_trait]
pub trait Seeder: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Run to completion or fail; no partial output may persist on failure.
    async fn run(&self, db: &DatabaseConnection, rbac: &RbacService) -> Result<(), AerodeskError>;
}

/// Runs a list of seeders in order, stopping at the first failure.
pub struct DatabaseSeeder {
    seeders: Vec<Box<dyn Seeder>>,
}

impl DatabaseSeeder {
    /// An empty seeder list.
    pub fn new() -> Self {
        Self {
            seeders: Vec::new(),
        }
    }

    /// Append a seeder.
    pub fn with(mut self, seeder: impl Seeder + 'static) -> Self {
        self.seeders.push(Box::new(seeder));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.seeders.iter().map(|s| s.name()).collect()
    }

    pub async fn run(
        &self,
        db: &DatabaseConnection,
        rbac: &RbacService,
    ) -> Result<(), AerodeskError> {
        for seeder in &self.seeders {
            let started = Instant::now();
            tracing::info!(seeder = seeder.name(), "seeding");
            seeder.run(db, rbac).await?;
            tracing::info!(
                seeder = seeder.name(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "seeded"
            );
        }
        Ok(())
    }
}

impl Default for DatabaseSeeder {
    fn default() -> Self {
        Self::new().with(RolePermissionSeeder::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl Seeder for Noop {
        fn name(&self) -> &str {
            "noop"
        }

        async fn run(&self, _: &DatabaseConnection, _: &RbacService) -> Result<(), AerodeskError> {
            Ok(())
        }
    }

    #[test]
    fn test_default_runs_role_permission_seeder() {
        assert_eq!(DatabaseSeeder::default().names(), vec!["role_permission"]);
    }

    #[test]
    fn test_with_keeps_order() {
        let seeder = DatabaseSeeder::default().with(Noop);
        assert_eq!(seeder.names(), vec!["role_permission", "noop"]);
    }
}
