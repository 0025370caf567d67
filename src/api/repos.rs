//! Repository card endpoints

use axum::{
    extract::{Path, State},
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use super::state::AppState;
use super::types::ApiError;

/// Reports whether a listing came from the cache
pub const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache-status");

/// GET /api/repos/{username}
pub async fn list_repo_cards(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let listing = state.repo_card_service.list_cards(&username).await?;

    tracing::debug!(
        username = %username,
        cards = listing.cards.len(),
        cache_status = %listing.cache_status,
        "Card listing ready"
    );

    Ok((
        [(
            CACHE_STATUS_HEADER,
            HeaderValue::from_static(listing.cache_status.as_str()),
        )],
        Json(listing.cards),
    )
        .into_response())
}

/// GET /api/repos with no username segment
pub async fn missing_username() -> ApiError {
    ApiError::bad_request("Username is required")
}

/// Fallback for unknown paths and unsupported methods
pub async fn endpoint_not_found() -> ApiError {
    ApiError::endpoint_not_found()
}
