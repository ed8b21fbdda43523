use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Server-side record of an issued access token; revoking it logs the token out.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// The user who owns this session
    pub user_id: i32,

    /// SHA-256 hash of the JWT access token
    #[sea_orm(unique)]
    pub token_hash: String,

    /// When the session expires
    pub expires_at: NaiveDateTime,

    /// Whether the session has been revoked (logout / refresh)
    #[sea_orm(default_value = false)]
    pub revoked: bool,

    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
