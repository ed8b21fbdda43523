use std::collections::HashSet;

use sea_orm::ConnectionTrait;

use crate::error::AerodeskError;
use crate::models::permission;
use crate::rbac::store::RbacStore;

/// Every permission of the back office, grouped by the resource it guards.
///
/// Names are referenced verbatim by role definitions and permission checks.
pub const FLIGHT_DESK_PERMISSIONS: &[(&str, &[&str])] = &[
    (
        "users",
        &["view users", "create users", "edit users", "delete users"],
    ),
    (
        "flights",
        &["view flights", "create flights", "edit flights", "delete flights"],
    ),
    (
        "bookings",
        &[
            "view bookings",
            "create bookings",
            "edit bookings",
            "delete bookings",
            "cancel bookings",
        ],
    ),
    (
        "tickets",
        &[
            "view tickets",
            "create tickets",
            "edit tickets",
            "delete tickets",
            "print tickets",
        ],
    ),
    ("reports", &["view reports", "export reports"]),
];

/// One permission name and the domain it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub domain: String,
    pub name: String,
}

/// The ordered universe of permission names to seed.
#[derive(Debug, Clone, Default)]
pub struct PermissionCatalog {
    entries: Vec<CatalogEntry>,
}

impl PermissionCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The flight-booking catalog from [`FLIGHT_DESK_PERMISSIONS`].
    pub fn flight_desk() -> Self {
        FLIGHT_DESK_PERMISSIONS
            .iter()
            .flat_map(|(domain, names)| names.iter().map(move |name| (*domain, *name)))
            .fold(Self::new(), |catalog, (domain, name)| {
                catalog.with_permission(domain, name)
            })
    }

    /// Append a permission to the catalog.
    pub fn with_permission(mut self, domain: impl Into<String>, name: impl Into<String>) -> Self {
        self.entries.push(CatalogEntry {
            domain: domain.into(),
            name: name.into(),
        });
        self
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Names belonging to one domain, in catalog order.
    pub fn domain(&self, domain: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.domain == domain)
            .map(|e| e.name.as_str())
            .collect()
    }

    /// Reject a catalog that lists the same name twice.
    pub fn validate(&self) -> Result<(), AerodeskError> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(AerodeskError::UniquenessViolation(format!(
                    "permission '{}' is listed twice in the catalog",
                    entry.name
                )));
            }
        }
        Ok(())
    }

    /// Insert one permission record per catalog entry.
    ///
    /// Fails with [`AerodeskError::UniquenessViolation`] on the first name that
    /// is duplicated in the catalog or already stored.
    pub async fn load<C: ConnectionTrait>(
        &self,
        store: &RbacStore<'_, C>,
    ) -> Result<Vec<permission::Model>, AerodeskError> {
        self.validate()?;

        let mut created = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            created.push(store.create_permission(&entry.name).await?);
        }
        tracing::debug!(count = created.len(), "permission catalog loaded");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_desk_catalog_has_twenty_unique_names() {
        let catalog = PermissionCatalog::flight_desk();
        assert_eq!(catalog.len(), 20);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_domains_keep_declaration_order() {
        let catalog = PermissionCatalog::flight_desk();
        assert_eq!(
            catalog.domain("bookings"),
            vec![
                "view bookings",
                "create bookings",
                "edit bookings",
                "delete bookings",
                "cancel bookings"
            ]
        );
        assert_eq!(catalog.domain("reports"), vec!["view reports", "export reports"]);
        assert!(catalog.domain("aircraft").is_empty());
    }

    #[test]
    fn test_duplicate_name_is_a_uniqueness_violation() {
        let catalog = PermissionCatalog::flight_desk().with_permission("flights", "view flights");
        let err = catalog.validate().unwrap_err();
        assert!(matches!(err, AerodeskError::UniquenessViolation(_)));
        assert!(err.to_string().contains("view flights"));
    }

    #[test]
    fn test_extended_catalog_contains_new_name() {
        let catalog = PermissionCatalog::flight_desk().with_permission("refunds", "approve refunds");
        assert_eq!(catalog.len(), 21);
        assert!(catalog.contains("approve refunds"));
    }
}
