//! Authentication: password hashing, token service and request gate

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtService, TokenError};
pub use middleware::{extract_token, jwt_auth_middleware, AuthenticatedIdentity};
pub use password::PasswordHasher;
