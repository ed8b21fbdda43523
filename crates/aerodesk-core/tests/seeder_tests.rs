use aerodesk_core::rbac::{
    FLIGHT_DESK_ROLES, Grant, PermissionCatalog, RbacStore, RoleDefinition, RoleProvisioner,
};
use aerodesk_core::seeders::{DatabaseSeeder, RolePermissionSeeder, Seeder};
use aerodesk_core::{AerodeskError, App, Config};

async fn fresh_app() -> App {
    App::with_config(Config::for_tests())
        .await
        .expect("Failed to create app")
}

fn sorted(names: &[&str]) -> Vec<String> {
    let mut names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    names.sort();
    names
}

// ═══ Catalog ═══

#[tokio::test]
async fn test_seed_creates_each_permission_once() {
    let app = fresh_app().await;
    app.seed().await.expect("seed");

    let store = RbacStore::new(&app.db);
    let catalog = PermissionCatalog::flight_desk();
    assert_eq!(store.count_permissions().await.unwrap(), catalog.len() as u64);
    for name in catalog.names() {
        let found = store.find_permission(name).await.unwrap();
        assert_eq!(found.map(|p| p.name).as_deref(), Some(name));
    }
}

// ═══ Roles ═══

#[tokio::test]
async fn test_seed_creates_exact_role_sets() {
    let app = fresh_app().await;
    app.seed().await.expect("seed");

    let store = RbacStore::new(&app.db);
    let roles: Vec<_> = store
        .all_roles()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(roles, vec!["admin", "manager", "agent", "user"]);

    for def in FLIGHT_DESK_ROLES {
        let held = store.role_permission_names(def.name).await.unwrap();
        let expected = match def.grant {
            Grant::All => sorted(&PermissionCatalog::flight_desk().names().collect::<Vec<_>>()),
            Grant::Only(names) => sorted(names),
        };
        assert_eq!(held, expected, "role {}", def.name);
    }
}

#[tokio::test]
async fn test_agent_permissions() {
    let app = fresh_app().await;
    app.seed().await.expect("seed");

    let agent = app.rbac.get_permissions_for_role(&app.db, "agent").await.unwrap();
    assert_eq!(
        agent,
        sorted(&[
            "view flights",
            "view bookings",
            "create bookings",
            "edit bookings",
            "view tickets",
            "create tickets",
            "print tickets",
        ])
    );
}

#[tokio::test]
async fn test_admin_follows_extended_catalog() {
    let app = fresh_app().await;
    let catalog = PermissionCatalog::flight_desk().with_permission("refunds", "approve refunds");
    let seeder = RolePermissionSeeder::new(catalog.clone(), RoleProvisioner::flight_desk());
    seeder.run(&app.db, &app.rbac).await.expect("seed");

    let store = RbacStore::new(&app.db);
    let admin = store.role_permission_names("admin").await.unwrap();
    assert_eq!(admin.len(), 21);
    assert_eq!(admin, sorted(&catalog.names().collect::<Vec<_>>()));

    // Enumerated roles are unaffected by catalog growth.
    let manager = store.role_permission_names("manager").await.unwrap();
    assert!(!manager.contains(&"approve refunds".to_string()));
}

// ═══ Failure modes ═══

#[tokio::test]
async fn test_reseed_fails_and_leaves_store_unchanged() {
    let app = fresh_app().await;
    app.seed().await.expect("first seed");

    let store = RbacStore::new(&app.db);
    let before = (
        store.count_permissions().await.unwrap(),
        store.count_roles().await.unwrap(),
        store.count_grants().await.unwrap(),
    );
    assert_eq!(before, (20, 4, 45));

    let err = app.seed().await.unwrap_err();
    assert!(matches!(err, AerodeskError::UniquenessViolation(_)), "{err:?}");

    let after = (
        store.count_permissions().await.unwrap(),
        store.count_roles().await.unwrap(),
        store.count_grants().await.unwrap(),
    );
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_unknown_granted_permission_rolls_back_everything() {
    let app = fresh_app().await;
    let provisioner = RoleProvisioner::new(vec![
        RoleDefinition {
            name: "admin",
            grant: Grant::All,
        },
        RoleDefinition {
            name: "pilot",
            grant: Grant::Only(&["view flights", "fly planes"]),
        },
    ]);
    let seeder = RolePermissionSeeder::new(PermissionCatalog::flight_desk(), provisioner);

    let err = seeder.run(&app.db, &app.rbac).await.unwrap_err();
    assert!(matches!(err, AerodeskError::ReferenceNotFound(_)), "{err:?}");
    assert!(err.to_string().contains("fly planes"));

    let store = RbacStore::new(&app.db);
    assert_eq!(store.count_permissions().await.unwrap(), 0);
    assert_eq!(store.count_roles().await.unwrap(), 0);
    assert_eq!(store.count_grants().await.unwrap(), 0);
}

#[tokio::test]
async fn test_seed_clears_permission_cache() {
    let app = fresh_app().await;
    app.seed().await.expect("seed");

    app.rbac.get_permissions_for_role(&app.db, "agent").await.unwrap();
    assert!(app.rbac.is_cached("agent").await);

    // The cache is cleared before any write, even when the run then fails.
    assert!(app.seed().await.is_err());
    assert!(!app.rbac.is_cached("agent").await);
}

#[tokio::test]
async fn test_database_seeder_after_fresh_migration() {
    let app = fresh_app().await;
    DatabaseSeeder::default()
        .run(&app.db, &app.rbac)
        .await
        .expect("seed");

    let store = RbacStore::new(&app.db);
    assert_eq!(store.count_roles().await.unwrap(), 4);
}

#[tokio::test]
async fn test_cache_is_empty_after_successful_seed() {
    let app = fresh_app().await;

    // Resolved against the empty store, so it holds no grants.
    let before = app.rbac.get_permissions_for_role(&app.db, "agent").await.unwrap();
    assert!(before.is_empty());
    assert!(app.rbac.is_cached("agent").await);

    app.seed().await.expect("seed");
    assert!(!app.rbac.is_cached("agent").await);

    let after = app.rbac.get_permissions_for_role(&app.db, "agent").await.unwrap();
    assert_eq!(after.len(), 7);
}

#[tokio::test]
async fn test_invalidate_role_drops_only_that_role() {
    let app = fresh_app().await;
    app.seed().await.expect("seed");

    app.rbac.get_permissions_for_role(&app.db, "agent").await.unwrap();
    app.rbac.get_permissions_for_role(&app.db, "manager").await.unwrap();

    app.rbac.invalidate_role("agent").await;
    assert!(!app.rbac.is_cached("agent").await);
    assert!(app.rbac.is_cached("manager").await);
}
