//! Role-based access control for the flight-booking back office.
//!
//! ```text
//! PermissionCatalog ──load──→ permissions
//!         │
//! RoleProvisioner ──validate, create, grant──→ roles, role_has_permissions
//!         │
//! RbacService ──cached lookups──→ /auth/me, permission checks
//! ```
//!
//! The catalog and role tables are plain data so the privilege hierarchy can
//! be audited in one place.

pub mod catalog;
pub mod roles;
pub mod service;
pub mod store;

pub use catalog::{CatalogEntry, FLIGHT_DESK_PERMISSIONS, PermissionCatalog};
pub use roles::{FLIGHT_DESK_ROLES, Grant, ProvisionedRole, RoleDefinition, RoleProvisioner};
pub use service::RbacService;
pub use store::RbacStore;
