pub mod jwt;
pub mod middleware;
pub mod password;
pub mod session;

pub use jwt::{Claims, IssuedToken, create_token, validate_token};
pub use password::{hash_password, verify_password};
pub use session::hash_token;
