use utoipa::OpenApi;

use crate::controllers::auth::{
    AuthResponse, LoginRequest, MessageResponse, ProfileResponse, RegisterRequest,
};
use crate::error::{ErrorDetail, FieldError};
use crate::models::user::UserResponse;

/// OpenAPI documentation for the AeroDesk API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "AeroDesk API",
        description = "Authentication surface of the AeroDesk flight-booking back office."
    ),
    paths(
        crate::controllers::auth::register,
        crate::controllers::auth::login,
        crate::controllers::auth::logout,
        crate::controllers::auth::refresh,
        crate::controllers::auth::me,
        crate::controllers::auth::current_user,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            ProfileResponse,
            MessageResponse,
            UserResponse,
            ErrorDetail,
            FieldError,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add JWT Bearer security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_every_auth_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/register",
            "/api/auth/login",
            "/api/auth/logout",
            "/api/auth/refresh",
            "/api/auth/me",
            "/api/user",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
