pub mod auth_user;
pub mod json;

pub use auth_user::AuthUser;
pub use json::Json;
