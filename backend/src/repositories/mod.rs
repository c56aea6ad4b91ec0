//! Database repositories
//!
//! Each store is a trait with a PostgreSQL implementation and an
//! in-memory one.

pub mod chirp;
pub mod memory;
pub mod refresh_token;
pub mod user;

pub use chirp::{ChirpRecord, ChirpRepository, PgChirpRepository};
pub use memory::{MemoryChirpRepository, MemoryRefreshTokenStore, MemoryUserRepository};
pub use refresh_token::{PgRefreshTokenRepository, RefreshTokenRecord, RefreshTokenRepository};
pub use user::{DuplicateEmail, PgUserRepository, UserRecord, UserRepository};
