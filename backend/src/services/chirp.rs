//! Chirp service
//!
//! Creation validates and censors the body; deletion runs the
//! protected-write check (authenticate, load, compare owner, mutate).

use crate::auth::Identity;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::http::HeaderMap;
use chirpy_shared::types::{ChirpListQuery, ChirpResponse, CreateChirpRequest};
use chirpy_shared::validation::{censor_profanity, validate_chirp_body};
use tracing::info;
use uuid::Uuid;

/// Chirp service
pub struct ChirpService;

impl ChirpService {
    /// Post a chirp as `author`
    pub async fn create(
        state: &AppState,
        author: Identity,
        req: CreateChirpRequest,
    ) -> ApiResult<ChirpResponse> {
        validate_chirp_body(&req.body, state.config().chirps.max_length)
            .map_err(ApiError::Validation)?;

        let body = censor_profanity(&req.body);
        let chirp = state.chirps().create(author, &body).await?;

        info!(user_id = %author, chirp_id = %chirp.id, "Chirp created");
        Ok(chirp.to_response())
    }

    /// List chirps, optionally for one author, ordered by creation time
    pub async fn list(state: &AppState, query: ChirpListQuery) -> ApiResult<Vec<ChirpResponse>> {
        let order = query.sort.unwrap_or_default();

        let chirps = match query.author_id.as_deref() {
            Some(author_id) => {
                let author: Identity = author_id
                    .parse()
                    .map_err(|_| ApiError::BadRequest("Invalid author ID".to_string()))?;
                state.chirps().list_by_author(author, order).await?
            }
            None => state.chirps().list_all(order).await?,
        };

        Ok(chirps.iter().map(|c| c.to_response()).collect())
    }

    /// Get one chirp. A malformed id is reported as not found.
    pub async fn get(state: &AppState, chirp_id: &str) -> ApiResult<ChirpResponse> {
        let id = parse_chirp_id(chirp_id)?;
        let chirp = state
            .chirps()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Chirp not found".to_string()))?;

        Ok(chirp.to_response())
    }

    /// Delete a chirp owned by the caller identified in `headers`
    pub async fn delete(state: &AppState, headers: &HeaderMap, chirp_id: &str) -> ApiResult<()> {
        let caller = state.guard().authenticate(headers)?;

        let id = parse_chirp_id(chirp_id)?;
        let chirp = state
            .chirps()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Chirp not found".to_string()))?;

        state.guard().ensure_owner(&caller, &chirp)?;

        if !state.chirps().delete(id).await? {
            return Err(ApiError::NotFound("Chirp not found".to_string()));
        }

        info!(user_id = %caller, chirp_id = %id, "Chirp deleted");
        Ok(())
    }
}

fn parse_chirp_id(chirp_id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(chirp_id).map_err(|_| ApiError::NotFound("Chirp not found".to_string()))
}
