//! Authentication module
//!
//! Password hashing, JWT session tokens, refresh tokens, `Authorization`
//! header parsing and the ownership guard that composes them.

mod error;
mod guard;
mod header;
mod identity;
pub mod jwt;
mod middleware;
mod password;
mod refresh;

pub use error::{AuthError, AuthResult};
pub use guard::{AuthGuard, OwnedResource};
pub use header::{api_key, bearer_token};
pub use identity::Identity;
pub use jwt::{Claims, JwtKeys, JwtService, ISSUER};
pub use middleware::AuthUser;
pub use password::PasswordService;
pub use refresh::{generate_token, RefreshTokenService, REFRESH_TOKEN_BYTES};
