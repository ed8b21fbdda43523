use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};

use crate::error::AerodeskError;
use crate::rbac::{PermissionCatalog, ProvisionedRole, RbacService, RbacStore, RoleProvisioner};
use crate::seeders::Seeder;

/// Seeds the permission catalog and the role hierarchy.
///
/// The whole run happens in one transaction; the permission cache is cleared
/// before it starts and again once it commits. Running it against a store that
/// already holds any catalog name fails with
/// [`AerodeskError::UniquenessViolation`] and leaves the store unchanged.
#[derive(Debug, Clone)]
pub struct RolePermissionSeeder {
    catalog: PermissionCatalog,
    provisioner: RoleProvisioner,
}

impl RolePermissionSeeder {
    pub fn new(catalog: PermissionCatalog, provisioner: RoleProvisioner) -> Self {
        Self {
            catalog,
            provisioner,
        }
    }

    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    async fn seed_into<C: ConnectionTrait>(
        &self,
        conn: &C,
    ) -> Result<Vec<ProvisionedRole>, AerodeskError> {
        let store = RbacStore::new(conn);
        self.catalog.load(&store).await?;
        self.provisioner.provision(&store).await
    }
}

impl Default for RolePermissionSeeder {
    fn default() -> Self {
        Self::new(PermissionCatalog::flight_desk(), RoleProvisioner::flight_desk())
    }
}

#[async_trait]
impl Seeder for RolePermissionSeeder {
    fn name(&self) -> &str {
        "role_permission"
    }

    async fn run(&self, db: &DatabaseConnection, rbac: &RbacService) -> Result<(), AerodeskError> {
        rbac.forget_cached_permissions().await;

        let txn = db.begin().await?;
        match self.seed_into(&txn).await {
            Ok(roles) => {
                txn.commit().await?;
                // Lookups made while the transaction was open saw pre-seed grants.
                rbac.forget_cached_permissions().await;
                for role in &roles {
                    tracing::debug!(role = %role.name, permissions = role.permissions, "role seeded");
                }
                tracing::info!(
                    permissions = self.catalog.len(),
                    roles = roles.len(),
                    "Roles and permissions created successfully!"
                );
                Ok(())
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback after failed seed failed");
                }
                tracing::error!(error = %err, "role/permission seed aborted");
                Err(err)
            }
        }
    }
}
