//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Webhook event that upgrades a user to Chirpy Red
pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

// ============================================================================
// User and Authentication Types
// ============================================================================

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Credential update request (the target is always the authenticated caller)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public user profile. Never carries the credential hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
}

/// Login response: public profile plus both tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    /// Short-lived session token (JWT)
    pub token: String,
    /// Long-lived opaque refresh token
    pub refresh_token: String,
}

/// Refresh response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub token: String,
}

// ============================================================================
// Chirp Types
// ============================================================================

/// Chirp creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

/// Chirp response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChirpResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

/// Sort direction for chirp listings (by creation time)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Chirp listing query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChirpListQuery {
    /// Restrict the listing to one author
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub sort: Option<SortOrder>,
}

// ============================================================================
// Webhook Types
// ============================================================================

/// Payment provider webhook payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookRequest {
    pub event: String,
    pub data: WebhookData,
}

/// Webhook payload data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookData {
    pub user_id: String,
}
