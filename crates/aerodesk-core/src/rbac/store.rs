use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::error::AerodeskError;
use crate::models::permission::{self, Entity as Permission};
use crate::models::role::{self, Entity as Role};
use crate::models::role_permission::{self, Entity as RolePermission};
use crate::models::user_role::{self, Entity as UserRole};

/// Persistence for permissions, roles and their associations.
///
/// Works over any connection, including an open transaction, so a whole seed
/// run can be committed or rolled back as one unit.
pub struct RbacStore<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> RbacStore<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Create a permission. Names are unique.
    pub async fn create_permission(&self, name: &str) -> Result<permission::Model, AerodeskError> {
        if self.find_permission(name).await?.is_some() {
            return Err(AerodeskError::UniquenessViolation(format!(
                "permission '{name}' already exists"
            )));
        }

        permission::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .map_err(|e| AerodeskError::from_insert(e, &format!("permission '{name}'")))
    }

    /// Create a role. Names are unique.
    pub async fn create_role(&self, name: &str) -> Result<role::Model, AerodeskError> {
        if self.find_role(name).await?.is_some() {
            return Err(AerodeskError::UniquenessViolation(format!(
                "role '{name}' already exists"
            )));
        }

        role::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .map_err(|e| AerodeskError::from_insert(e, &format!("role '{name}'")))
    }

    /// Grant permissions to a role. Permissions the role already holds are skipped.
    pub async fn grant(
        &self,
        role: &role::Model,
        permissions: &[permission::Model],
    ) -> Result<(), AerodeskError> {
        let held: HashSet<i32> = RolePermission::find()
            .filter(role_permission::Column::RoleId.eq(role.id))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|rp| rp.permission_id)
            .collect();

        let mut seen = held;
        let rows: Vec<role_permission::ActiveModel> = permissions
            .iter()
            .filter(|p| seen.insert(p.id))
            .map(|p| role_permission::ActiveModel {
                role_id: Set(role.id),
                permission_id: Set(p.id),
                ..Default::default()
            })
            .collect();

        if rows.is_empty() {
            return Ok(());
        }

        RolePermission::insert_many(rows).exec(self.conn).await?;
        Ok(())
    }

    /// Every stored permission, in creation order.
    pub async fn all_permissions(&self) -> Result<Vec<permission::Model>, AerodeskError> {
        Ok(Permission::find()
            .order_by_asc(permission::Column::Id)
            .all(self.conn)
            .await?)
    }

    pub async fn all_roles(&self) -> Result<Vec<role::Model>, AerodeskError> {
        Ok(Role::find()
            .order_by_asc(role::Column::Id)
            .all(self.conn)
            .await?)
    }

    pub async fn find_permission(
        &self,
        name: &str,
    ) -> Result<Option<permission::Model>, AerodeskError> {
        Ok(Permission::find()
            .filter(permission::Column::Name.eq(name))
            .one(self.conn)
            .await?)
    }

    pub async fn find_role(&self, name: &str) -> Result<Option<role::Model>, AerodeskError> {
        Ok(Role::find()
            .filter(role::Column::Name.eq(name))
            .one(self.conn)
            .await?)
    }

    /// Permission names granted to a role, sorted. Unknown roles hold nothing.
    pub async fn role_permission_names(&self, role_name: &str) -> Result<Vec<String>, AerodeskError> {
        let Some(role) = self.find_role(role_name).await? else {
            return Ok(Vec::new());
        };

        let mut names: Vec<String> = RolePermission::find()
            .filter(role_permission::Column::RoleId.eq(role.id))
            .find_also_related(Permission)
            .all(self.conn)
            .await?
            .into_iter()
            .filter_map(|(_, perm)| perm.map(|p| p.name))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Assign a role to a user. Assigning a held role is a no-op.
    pub async fn assign_role(&self, user_id: i32, role: &role::Model) -> Result<(), AerodeskError> {
        let existing = UserRole::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .filter(user_role::Column::RoleId.eq(role.id))
            .one(self.conn)
            .await?;
        if existing.is_some() {
            return Ok(());
        }

        user_role::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role.id),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;
        Ok(())
    }

    /// Role names assigned to a user, sorted.
    pub async fn role_names_for_user(&self, user_id: i32) -> Result<Vec<String>, AerodeskError> {
        let mut names: Vec<String> = UserRole::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .find_also_related(Role)
            .all(self.conn)
            .await?
            .into_iter()
            .filter_map(|(_, role)| role.map(|r| r.name))
            .collect();
        names.sort();
        Ok(names)
    }

    pub async fn count_permissions(&self) -> Result<u64, AerodeskError> {
        Ok(Permission::find().count(self.conn).await?)
    }

    pub async fn count_roles(&self) -> Result<u64, AerodeskError> {
        Ok(Role::find().count(self.conn).await?)
    }

    pub async fn count_grants(&self) -> Result<u64, AerodeskError> {
        Ok(RolePermission::find().count(self.conn).await?)
    }
}
