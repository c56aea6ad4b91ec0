//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the auth core and the repositories.

pub mod auth;
pub mod chirp;
pub mod user;

pub use auth::AuthService;
pub use chirp::ChirpService;
pub use user::UserService;
