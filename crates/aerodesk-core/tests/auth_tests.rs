use aerodesk_core::models::user::Entity as User;
use aerodesk_core::{Config, TestApp};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};

const PASSWORD: &str = "boarding-pass-42";

// ═══ Public routes ═══

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::new().await;
    let body = serde_json::json!({
        "name": "Ada Lovelace",
        "email": "ada@aerodesk.test",
        "password": PASSWORD,
    });

    let res = app
        .client
        .post(&app.api("/auth/register"), &body.to_string())
        .await;
    assert_eq!(res.status, 200, "{}", res.body);
    assert!(res.is_success());

    let data = res.data();
    assert_eq!(data["token_type"], "bearer");
    assert_eq!(data["expires_in"], 24 * 3600);
    assert_eq!(data["user"]["email"], "ada@aerodesk.test");
    assert!(data["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = TestApp::new().await;
    app.register_user("Ada", "ada@aerodesk.test", PASSWORD).await;

    let body = serde_json::json!({
        "name": "Ada Again",
        "email": "ada@aerodesk.test",
        "password": PASSWORD,
    });
    let res = app
        .client
        .post(&app.api("/auth/register"), &body.to_string())
        .await;
    assert_eq!(res.status, 409);
    assert_eq!(res.error()["code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_reports_field_errors() {
    let app = TestApp::new().await;
    let body = serde_json::json!({
        "name": "",
        "email": "not-an-email",
        "password": "short",
    });

    let res = app
        .client
        .post(&app.api("/auth/register"), &body.to_string())
        .await;
    assert_eq!(res.status, 422);
    let error = res.error();
    assert_eq!(error["code"], "VALIDATION_ERROR");
    let fields: Vec<_> = error["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["email", "name", "password"]);
}

#[tokio::test]
async fn test_failed_registration_leaves_no_user_behind() {
    let app = TestApp::seeded().await;
    // Default-role assignment fails after the user row was written.
    app.db
        .execute_unprepared("DROP TABLE user_roles")
        .await
        .unwrap();

    let body = serde_json::json!({
        "name": "Ada",
        "email": "ada@aerodesk.test",
        "password": PASSWORD,
    });
    for _ in 0..2 {
        let res = app
            .client
            .post(&app.api("/auth/register"), &body.to_string())
            .await;
        assert_eq!(res.status, 500, "{}", res.body);
        assert_eq!(res.error()["code"], "DATABASE_ERROR");
        assert_eq!(User::find().count(&app.db).await.unwrap(), 0);
    }
}

#[tokio::test]
async fn test_user_has_permission_follows_default_role() {
    let app = TestApp::seeded().await;
    let (_, user) = app.register_user("Ada", "ada@aerodesk.test", PASSWORD).await;
    let user_id = user["id"].as_i64().unwrap() as i32;

    for (permission, expected) in [
        ("create bookings", true),
        ("view tickets", true),
        ("edit bookings", false),
        ("delete users", false),
    ] {
        let held = app
            .rbac
            .user_has_permission(&app.db, user_id, permission)
            .await
            .unwrap();
        assert_eq!(held, expected, "{permission}");
    }
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new().await;
    app.register_user("Ada", "ada@aerodesk.test", PASSWORD).await;

    let token = app.login("ada@aerodesk.test", PASSWORD).await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = TestApp::new().await;
    app.register_user("Ada", "ada@aerodesk.test", PASSWORD).await;

    for (email, password) in [
        ("ada@aerodesk.test", "wrong-password"),
        ("nobody@aerodesk.test", PASSWORD),
    ] {
        let body = serde_json::json!({ "email": email, "password": password });
        let res = app
            .client
            .post(&app.api("/auth/login"), &body.to_string())
            .await;
        assert_eq!(res.status, 401);
        assert_eq!(res.error()["code"], "UNAUTHORIZED");
        assert!(
            res.error()["message"]
                .as_str()
                .unwrap()
                .ends_with("Invalid email or password")
        );
    }
}

// ═══ Protected routes ═══

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new().await;

    for path in ["/auth/logout", "/auth/refresh"] {
        let res = app.client.post(&app.api(path), "").await;
        assert_eq!(res.status, 401, "POST {path}");
    }
    for path in ["/auth/me", "/user"] {
        let res = app.client.get(&app.api(path)).await;
        assert_eq!(res.status, 401, "GET {path}");
        assert_eq!(res.error()["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn test_protected_routes_reject_garbage_token() {
    let app = TestApp::new().await;
    let res = app
        .client
        .get_with_auth(&app.api("/auth/me"), "not.a.jwt")
        .await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = TestApp::new().await;
    let (token, _) = app.register_user("Ada", "ada@aerodesk.test", PASSWORD).await;

    let res = app
        .client
        .post_with_auth(&app.api("/auth/logout"), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.body);

    let res = app.client.get_with_auth(&app.api("/auth/me"), &token).await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn test_refresh_replaces_token() {
    let app = TestApp::new().await;
    let (old_token, _) = app.register_user("Ada", "ada@aerodesk.test", PASSWORD).await;

    let res = app
        .client
        .post_with_auth(&app.api("/auth/refresh"), &old_token)
        .await;
    assert_eq!(res.status, 200, "{}", res.body);
    let new_token = res.data()["access_token"].as_str().unwrap().to_string();
    assert_ne!(new_token, old_token);

    let res = app
        .client
        .get_with_auth(&app.api("/auth/me"), &old_token)
        .await;
    assert_eq!(res.status, 401);

    let res = app
        .client
        .get_with_auth(&app.api("/auth/me"), &new_token)
        .await;
    assert_eq!(res.status, 200);
}

#[tokio::test]
async fn test_me_includes_default_role_permissions() {
    let app = TestApp::seeded().await;
    let (token, _) = app.register_user("Ada", "ada@aerodesk.test", PASSWORD).await;

    let res = app.client.get_with_auth(&app.api("/auth/me"), &token).await;
    assert_eq!(res.status, 200, "{}", res.body);

    let data = res.data();
    assert_eq!(data["user"]["name"], "Ada");
    assert_eq!(data["roles"], serde_json::json!(["user"]));
    assert_eq!(
        data["permissions"],
        serde_json::json!([
            "create bookings",
            "view bookings",
            "view flights",
            "view tickets"
        ])
    );
}

#[tokio::test]
async fn test_me_without_seeded_roles_is_empty() {
    let app = TestApp::new().await;
    let (token, _) = app.register_user("Ada", "ada@aerodesk.test", PASSWORD).await;

    let res = app.client.get_with_auth(&app.api("/auth/me"), &token).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["roles"], serde_json::json!([]));
    assert_eq!(res.data()["permissions"], serde_json::json!([]));
}

#[tokio::test]
async fn test_user_route_returns_bare_object() {
    let app = TestApp::new().await;
    let (token, user) = app.register_user("Ada", "ada@aerodesk.test", PASSWORD).await;

    let res = app.client.get_with_auth(&app.api("/user"), &token).await;
    assert_eq!(res.status, 200);

    let json = res.json();
    assert!(json.get("success").is_none());
    assert_eq!(json["id"], user["id"]);
    assert_eq!(json["email"], "ada@aerodesk.test");
}

// ═══ Mounting ═══

#[tokio::test]
async fn test_custom_api_prefix() {
    let app = TestApp::with_config(Config {
        api_prefix: "/v1".to_string(),
        ..Config::for_tests()
    })
    .await;
    app.register_user("Ada", "ada@aerodesk.test", PASSWORD).await;

    let res = app.client.get(&app.url("/api/auth/me")).await;
    assert_eq!(res.status, 404);
    let res = app.client.get(&app.url("/v1/auth/me")).await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn test_openapi_json_endpoint() {
    let app = TestApp::new().await;
    let res = app.client.get(&app.url("/api-docs/openapi.json")).await;
    assert_eq!(res.status, 200);
    let json = res.json();
    assert!(json.get("openapi").is_some());
    assert!(json["paths"].get("/api/auth/register").is_some());
}
