//! The authentication route table.
//!
//! Routes are declared as data and turned into an axum [`Router`] by
//! [`build_routes`]. Protected descriptors sit behind
//! [`require_token`], so a request without a valid token gets `401`.

use std::fmt;

use axum::{
    Router, middleware,
    routing::{MethodFilter, MethodRouter, on},
};

use crate::auth::middleware::require_token;
use crate::controllers::{AppState, auth};

/// Whether a route requires a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGroup {
    Public,
    Protected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    fn filter(self) -> MethodFilter {
        match self {
            HttpMethod::Get => MethodFilter::GET,
            HttpMethod::Post => MethodFilter::POST,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Controller action bound to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Register,
    Login,
    Logout,
    Refresh,
    Me,
    CurrentUser,
}

/// One row of the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub group: RouteGroup,
    pub method: HttpMethod,
    /// Path relative to the API prefix
    pub path: &'static str,
    pub action: AuthAction,
}

impl Endpoint {
    pub fn requires_token(&self) -> bool {
        self.group == RouteGroup::Protected
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let auth = if self.requires_token() { "bearer" } else { "-" };
        write!(
            f,
            "{:<5} {:<16} {:<7} {:?}",
            self.method.as_str(),
            self.path,
            auth,
            self.action
        )
    }
}

pub const AUTH_ROUTES: [Endpoint; 6] = [
    Endpoint {
        group: RouteGroup::Public,
        method: HttpMethod::Post,
        path: "/auth/register",
        action: AuthAction::Register,
    },
    Endpoint {
        group: RouteGroup::Public,
        method: HttpMethod::Post,
        path: "/auth/login",
        action: AuthAction::Login,
    },
    Endpoint {
        group: RouteGroup::Protected,
        method: HttpMethod::Post,
        path: "/auth/logout",
        action: AuthAction::Logout,
    },
    Endpoint {
        group: RouteGroup::Protected,
        method: HttpMethod::Post,
        path: "/auth/refresh",
        action: AuthAction::Refresh,
    },
    Endpoint {
        group: RouteGroup::Protected,
        method: HttpMethod::Get,
        path: "/auth/me",
        action: AuthAction::Me,
    },
    // Bare user object for clients that expect the conventional `/user` route.
    Endpoint {
        group: RouteGroup::Protected,
        method: HttpMethod::Get,
        path: "/user",
        action: AuthAction::CurrentUser,
    },
];

fn method_router(endpoint: &Endpoint) -> MethodRouter<AppState> {
    let filter = endpoint.method.filter();
    match endpoint.action {
        AuthAction::Register => on(filter, auth::register),
        AuthAction::Login => on(filter, auth::login),
        AuthAction::Logout => on(filter, auth::logout),
        AuthAction::Refresh => on(filter, auth::refresh),
        AuthAction::Me => on(filter, auth::me),
        AuthAction::CurrentUser => on(filter, auth::current_user),
    }
}

/// Build the router for a route table, unprefixed.
pub fn build_routes(endpoints: &[Endpoint], state: AppState) -> Router<AppState> {
    let mut public = Router::new();
    let mut protected = Router::new();

    for endpoint in endpoints {
        match endpoint.group {
            RouteGroup::Public => public = public.route(endpoint.path, method_router(endpoint)),
            RouteGroup::Protected => {
                protected = protected.route(endpoint.path, method_router(endpoint))
            }
        }
    }

    public.merge(protected.route_layer(middleware::from_fn_with_state(state, require_token)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use sea_orm::DatabaseConnection;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::rbac::RbacService;

    fn offline_router() -> Router {
        let state = AppState {
            db: DatabaseConnection::Disconnected,
            config: Arc::new(Config::for_tests()),
            rbac: RbacService::new(),
        };
        build_routes(&AUTH_ROUTES, state.clone()).with_state(state)
    }

    #[test]
    fn test_only_register_and_login_are_public() {
        let public: Vec<_> = AUTH_ROUTES
            .iter()
            .filter(|e| !e.requires_token())
            .map(|e| e.path)
            .collect();
        assert_eq!(public, vec!["/auth/register", "/auth/login"]);
    }

    #[test]
    fn test_paths_are_unique() {
        let mut paths: Vec<_> = AUTH_ROUTES.iter().map(|e| e.path).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), AUTH_ROUTES.len());
    }

    #[test]
    fn test_display_marks_protected_rows() {
        let row = AUTH_ROUTES[4].to_string();
        assert!(row.starts_with("GET"));
        assert!(row.contains("/auth/me"));
        assert!(row.contains("bearer"));
    }

    #[tokio::test]
    async fn test_protected_routes_answer_401_before_touching_the_database() {
        for endpoint in AUTH_ROUTES.iter().filter(|e| e.requires_token()) {
            let req = Request::builder()
                .method(endpoint.method.as_str())
                .uri(endpoint.path)
                .body(Body::empty())
                .unwrap();
            let res = offline_router().oneshot(req).await.unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{endpoint}");
        }
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let req = Request::builder()
            .uri("/auth/unknown")
            .body(Body::empty())
            .unwrap();
        let res = offline_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
