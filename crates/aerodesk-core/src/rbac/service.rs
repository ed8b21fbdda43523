//! Authorization service with an in-memory permission cache.
//!
//! ```text
//! ┌──────────┐    ┌────────────────┐    ┌────────────────────────┐
//! │ /auth/me │───→│  RbacService   │───→│ roles, permissions,    │
//! │ checks   │    │ (cached check) │    │ role_has_permissions   │
//! └──────────┘    └────────────────┘    └────────────────────────┘
//! ```
//!
//! Lookups are memoized per role. The seeder calls
//! [`RbacService::forget_cached_permissions`] before it writes anything; the
//! next lookup repopulates the cache from the database.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use sea_orm::DatabaseConnection;
use tokio::sync::RwLock;

use crate::error::AerodeskError;
use crate::rbac::store::RbacStore;

/// Default cache TTL: 5 minutes.
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Cached permission set for a role.
#[derive(Clone, Debug)]
struct CachedPermissions {
    permissions: Vec<String>,
    cached_at: Instant,
}

/// RBAC service; clones share one cache.
#[derive(Clone)]
pub struct RbacService {
    inner: Arc<RbacInner>,
}

struct RbacInner {
    /// Cache: role name → permission names
    cache: RwLock<HashMap<String, CachedPermissions>>,
    cache_ttl: Duration,
}

impl RbacService {
    /// Create a new RBAC service with default cache TTL (5 minutes).
    pub fn new() -> Self {
        Self::with_cache_ttl(DEFAULT_CACHE_TTL)
    }

    /// Create a new RBAC service with a custom cache TTL.
    pub fn with_cache_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RbacInner {
                cache: RwLock::new(HashMap::new()),
                cache_ttl: ttl,
            }),
        }
    }

    /// Permission names held by a role (cached).
    pub async fn get_permissions_for_role(
        &self,
        db: &DatabaseConnection,
        role: &str,
    ) -> Result<Vec<String>, AerodeskError> {
        {
            let cache = self.inner.cache.read().await;
            if let Some(cached) = cache.get(role) {
                if cached.cached_at.elapsed() < self.inner.cache_ttl {
                    return Ok(cached.permissions.clone());
                }
            }
        }

        let permissions = RbacStore::new(db).role_permission_names(role).await?;

        {
            let mut cache = self.inner.cache.write().await;
            cache.insert(
                role.to_string(),
                CachedPermissions {
                    permissions: permissions.clone(),
                    cached_at: Instant::now(),
                },
            );
        }

        Ok(permissions)
    }

    /// Role names assigned to a user (read through, not cached).
    pub async fn roles_for_user(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<String>, AerodeskError> {
        RbacStore::new(db).role_names_for_user(user_id).await
    }

    /// Union of the permissions of every role a user holds, sorted.
    pub async fn permissions_for_user(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<String>, AerodeskError> {
        let mut permissions = BTreeSet::new();
        for role in self.roles_for_user(db, user_id).await? {
            permissions.extend(self.get_permissions_for_role(db, &role).await?);
        }
        Ok(permissions.into_iter().collect())
    }

    /// Check whether any of a user's roles grants `permission`.
    pub async fn user_has_permission(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
        permission: &str,
    ) -> Result<bool, AerodeskError> {
        for role in self.roles_for_user(db, user_id).await? {
            let held = self.get_permissions_for_role(db, &role).await?;
            if held.iter().any(|p| p == permission) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether a role currently has a live cache entry.
    pub async fn is_cached(&self, role: &str) -> bool {
        let cache = self.inner.cache.read().await;
        cache
            .get(role)
            .is_some_and(|c| c.cached_at.elapsed() < self.inner.cache_ttl)
    }

    /// Invalidate cached permissions for a specific role.
    pub async fn invalidate_role(&self, role: &str) {
        let mut cache = self.inner.cache.write().await;
        cache.remove(role);
    }

    /// Drop every cached role/permission resolution.
    ///
    /// Must be called before roles or grants are (re)written.
    pub async fn forget_cached_permissions(&self) {
        let mut cache = self.inner.cache.write().await;
        let dropped = cache.len();
        cache.clear();
        tracing::debug!(dropped, "permission cache cleared");
    }
}

impl Default for RbacService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rbac_service_clone_shares_cache() {
        let svc = RbacService::new();
        let svc2 = svc.clone();
        assert_eq!(Arc::strong_count(&svc.inner), 2);
        assert_eq!(Arc::strong_count(&svc2.inner), 2);
    }

    #[test]
    fn test_rbac_service_with_custom_ttl() {
        let svc = RbacService::with_cache_ttl(Duration::from_secs(60));
        assert_eq!(svc.inner.cache_ttl, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_forget_clears_entries() {
        let svc = RbacService::new();
        svc.inner.cache.write().await.insert(
            "agent".to_string(),
            CachedPermissions {
                permissions: vec!["view flights".to_string()],
                cached_at: Instant::now(),
            },
        );
        assert!(svc.is_cached("agent").await);

        svc.forget_cached_permissions().await;
        assert!(!svc.is_cached("agent").await);
    }
}
