//! Chirpy Shared Library
//!
//! Request/response types and input validation shared between the
//! backend and any client crates.

pub mod types;
pub mod validation;

// Re-export commonly used items
pub use types::*;
pub use validation::{censor_profanity, validate_chirp_body, BANNED_WORDS};
