use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::error::AerodeskError;
use crate::models::permission;
use crate::rbac::store::RbacStore;

/// Which permissions a role receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// Every permission stored in the catalog at provisioning time.
    All,
    /// Exactly these permission names.
    Only(&'static [&'static str]),
}

/// A role name and its grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleDefinition {
    pub name: &'static str,
    pub grant: Grant,
}

/// Roles of the flight-booking back office, highest privilege first.
pub const FLIGHT_DESK_ROLES: &[RoleDefinition] = &[
    RoleDefinition {
        name: "admin",
        grant: Grant::All,
    },
    RoleDefinition {
        name: "manager",
        grant: Grant::Only(&[
            "view users",
            "view flights",
            "create flights",
            "edit flights",
            "view bookings",
            "create bookings",
            "edit bookings",
            "cancel bookings",
            "view tickets",
            "create tickets",
            "edit tickets",
            "print tickets",
            "view reports",
            "export reports",
        ]),
    },
    RoleDefinition {
        name: "agent",
        grant: Grant::Only(&[
            "view flights",
            "view bookings",
            "create bookings",
            "edit bookings",
            "view tickets",
            "create tickets",
            "print tickets",
        ]),
    },
    RoleDefinition {
        name: "user",
        grant: Grant::Only(&[
            "view flights",
            "view bookings",
            "create bookings",
            "view tickets",
        ]),
    },
];

/// Outcome of provisioning one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionedRole {
    pub name: String,
    pub permissions: usize,
}

/// Creates roles and grants their permissions from a definition table.
#[derive(Debug, Clone)]
pub struct RoleProvisioner {
    roles: Vec<RoleDefinition>,
}

impl RoleProvisioner {
    pub fn new(roles: Vec<RoleDefinition>) -> Self {
        Self { roles }
    }

    /// The provisioner for [`FLIGHT_DESK_ROLES`].
    pub fn flight_desk() -> Self {
        Self::new(FLIGHT_DESK_ROLES.to_vec())
    }

    pub fn roles(&self) -> &[RoleDefinition] {
        &self.roles
    }

    /// Create every role and grant its permissions.
    ///
    /// All grants are resolved against the stored catalog before the first
    /// role is written; an unknown name fails with
    /// [`AerodeskError::ReferenceNotFound`].
    pub async fn provision<C: ConnectionTrait>(
        &self,
        store: &RbacStore<'_, C>,
    ) -> Result<Vec<ProvisionedRole>, AerodeskError> {
        let catalog = store.all_permissions().await?;

        let plan = self
            .roles
            .iter()
            .map(|def| resolve(def, &catalog).map(|permissions| (def.name, permissions)))
            .collect::<Result<Vec<_>, AerodeskError>>()?;

        let mut provisioned = Vec::with_capacity(plan.len());
        for (name, permissions) in plan {
            let role = store.create_role(name).await?;
            store.grant(&role, &permissions).await?;
            tracing::debug!(role = name, permissions = permissions.len(), "role provisioned");
            provisioned.push(ProvisionedRole {
                name: name.to_string(),
                permissions: permissions.len(),
            });
        }
        Ok(provisioned)
    }
}

impl Default for RoleProvisioner {
    fn default() -> Self {
        Self::flight_desk()
    }
}

fn resolve(
    def: &RoleDefinition,
    catalog: &[permission::Model],
) -> Result<Vec<permission::Model>, AerodeskError> {
    match def.grant {
        Grant::All => Ok(catalog.to_vec()),
        Grant::Only(names) => names
            .iter()
            .map(|name| {
                catalog
                    .iter()
                    .find(|p| p.name == *name)
                    .cloned()
                    .ok_or_else(|| {
                        AerodeskError::ReferenceNotFound(format!(
                            "permission '{}' granted to role '{}' is not in the catalog",
                            name, def.name
                        ))
                    })
            })
            .collect(),
    }
}
