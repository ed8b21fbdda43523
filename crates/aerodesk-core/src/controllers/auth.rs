use axum::extract::State;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{create_token, hash_password, session, verify_password};
use crate::error::{AerodeskError, FieldError};
use crate::extractors::{AuthUser, Json};
use crate::models::user::{self, Entity as User, UserResponse};
use crate::rbac::RbacStore;
use crate::response::ApiResponse;

use super::AppState;

// ── Request / Response types ──

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    /// Always `bearer`
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn validate_registration(
    payload: &RegisterRequest,
    min_password_length: usize,
) -> Result<(), AerodeskError> {
    let mut fields = match payload.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => match AerodeskError::from(errors) {
            AerodeskError::ValidationErrors(fields) => fields,
            other => return Err(other),
        },
    };

    if payload.password.chars().count() < min_password_length {
        fields.push(FieldError::with_code(
            "password",
            format!("must be at least {min_password_length} characters"),
            "length",
        ));
        fields.sort_by(|a, b| a.field.cmp(&b.field));
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(AerodeskError::ValidationErrors(fields))
    }
}

/// Sign a token for `user` and open a session for it on `conn`.
async fn issue_token<C: ConnectionTrait>(
    state: &AppState,
    conn: &C,
    user: user::Model,
) -> Result<AuthResponse, AerodeskError> {
    let issued = create_token(user.id, &state.config.jwt_secret, state.config.jwt_expiry_hours)?;
    session::create_session(conn, user.id, &issued.token, state.config.jwt_expiry_hours).await?;

    Ok(AuthResponse {
        access_token: issued.token,
        token_type: "bearer".to_string(),
        expires_in: issued.expires_in,
        user: UserResponse::from(user),
    })
}

async fn find_active_user(state: &AppState, user_id: i32) -> Result<user::Model, AerodeskError> {
    let user_model = User::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AerodeskError::Unauthorized("User no longer exists".to_string()))?;

    if !user_model.is_active {
        return Err(AerodeskError::Unauthorized(
            "Account is deactivated".to_string(),
        ));
    }
    Ok(user_model)
}

// ── Handlers ──

/// Register a new back-office user.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User created", body = ApiResponse<AuthResponse>),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Invalid input")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<ApiResponse<AuthResponse>, AerodeskError> {
    let security = &state.config.security;
    validate_registration(&payload, security.min_password_length)?;

    let existing = User::find()
        .filter(user::Column::Email.eq(&payload.email))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AerodeskError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;

    // User row, default role and session commit together or not at all.
    let txn = state.db.begin().await?;
    match create_account(&state, &txn, payload, password_hash).await {
        Ok(response) => {
            txn.commit().await?;
            tracing::info!(user_id = response.user.id, "user registered");
            Ok(ApiResponse::success(response))
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback after failed registration failed");
            }
            Err(err)
        }
    }
}

async fn create_account(
    state: &AppState,
    txn: &DatabaseTransaction,
    payload: RegisterRequest,
    password_hash: String,
) -> Result<AuthResponse, AerodeskError> {
    let security = &state.config.security;
    let now = Utc::now().naive_utc();

    let user_model = user::ActiveModel {
        name: Set(payload.name),
        email: Set(payload.email),
        password_hash: Set(password_hash),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await
    .map_err(|e| match AerodeskError::from_insert(e, "user") {
        AerodeskError::UniquenessViolation(msg) => AerodeskError::Conflict(msg),
        other => other,
    })?;

    if let Some(role_name) = security.default_role.as_deref() {
        let store = RbacStore::new(txn);
        match store.find_role(role_name).await? {
            Some(role) => store.assign_role(user_model.id, &role).await?,
            None => tracing::warn!(role = role_name, "default role not seeded; user has no role"),
        }
    }

    issue_token(state, txn, user_model).await
}

/// Log in with existing credentials.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ApiResponse<AuthResponse>, AerodeskError> {
    let user_model = User::find()
        .filter(user::Column::Email.eq(&payload.email))
        .one(&state.db)
        .await?
        .ok_or_else(|| AerodeskError::Unauthorized("Invalid email or password".to_string()))?;

    if !user_model.is_active {
        return Err(AerodeskError::Unauthorized(
            "Account is deactivated".to_string(),
        ));
    }

    if !verify_password(&payload.password, &user_model.password_hash)? {
        return Err(AerodeskError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    Ok(ApiResponse::success(issue_token(&state, &state.db, user_model).await?))
}

/// Revoke the presented token.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<MessageResponse>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<MessageResponse>, AerodeskError> {
    session::revoke_session(&state.db, &auth.token).await?;
    tracing::debug!(user_id = auth.user_id, "session revoked");

    Ok(ApiResponse::success(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// Exchange the presented token for a new one.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Token refreshed", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<AuthResponse>, AerodeskError> {
    let user_model = find_active_user(&state, auth.user_id).await?;
    session::revoke_session(&state.db, &auth.token).await?;

    Ok(ApiResponse::success(issue_token(&state, &state.db, user_model).await?))
}

/// Profile of the caller, with roles and resolved permissions.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user profile", body = ApiResponse<ProfileResponse>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<ProfileResponse>, AerodeskError> {
    let user_model = find_active_user(&state, auth.user_id).await?;
    let roles = state.rbac.roles_for_user(&state.db, user_model.id).await?;
    let permissions = state.rbac.permissions_for_user(&state.db, user_model.id).await?;

    Ok(ApiResponse::success(ProfileResponse {
        user: UserResponse::from(user_model),
        roles,
        permissions,
    }))
}

/// The caller as a bare user object.
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<axum::Json<UserResponse>, AerodeskError> {
    let user_model = find_active_user(&state, auth.user_id).await?;
    Ok(axum::Json(UserResponse::from(user_model)))
}
