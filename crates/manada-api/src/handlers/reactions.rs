//! Reaction handlers
//!
//! Likes and palette reactions on any registered target.

use axum::{
    extract::{Path, State},
    Json,
};
use manada_service::{ApiResponse, ReactionRequest, ReactionResponse, ReactionService};

use crate::extractors::{AuthUser, OptionalAuthUser, OptionalValidatedJson, ReactionPath};
use crate::response::ApiResult;
use crate::state::AppState;

fn requested_kind(body: &OptionalValidatedJson<ReactionRequest>) -> Option<&str> {
    body.0.as_ref().and_then(|r| r.kind.as_deref())
}

/// Counter and the caller's own reaction
///
/// GET /api/reactions/{target}/{parent_id}
pub async fn get_reactions(
    State(state): State<AppState>,
    auth: OptionalAuthUser,
    Path(path): Path<ReactionPath>,
) -> ApiResult<Json<ApiResponse<ReactionResponse>>> {
    let parent_id = path.parent_id()?;

    let service = ReactionService::new(state.service_context());
    let snapshot = service
        .snapshot(&path.target, &parent_id, auth.user_id())
        .await?;
    Ok(Json(ApiResponse::new(snapshot)))
}

/// Set own reaction
///
/// PUT /api/reactions/{target}/{parent_id}/@me
pub async fn set_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ReactionPath>,
    body: OptionalValidatedJson<ReactionRequest>,
) -> ApiResult<Json<ApiResponse<ReactionResponse>>> {
    let parent_id = path.parent_id()?;

    let service = ReactionService::new(state.service_context());
    let response = service
        .set(&path.target, &parent_id, &auth.user_id, requested_kind(&body))
        .await?;
    Ok(Json(ApiResponse::new(response)))
}

/// Toggle own reaction
///
/// POST /api/reactions/{target}/{parent_id}/@me/toggle
pub async fn toggle_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ReactionPath>,
    body: OptionalValidatedJson<ReactionRequest>,
) -> ApiResult<Json<ApiResponse<ReactionResponse>>> {
    let parent_id = path.parent_id()?;

    let service = ReactionService::new(state.service_context());
    let response = service
        .toggle(&path.target, &parent_id, &auth.user_id, requested_kind(&body))
        .await?;
    Ok(Json(ApiResponse::new(response)))
}

/// Remove own reaction
///
/// DELETE /api/reactions/{target}/{parent_id}/@me
pub async fn clear_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ReactionPath>,
) -> ApiResult<Json<ApiResponse<ReactionResponse>>> {
    let parent_id = path.parent_id()?;

    let service = ReactionService::new(state.service_context());
    let response = service
        .clear(&path.target, &parent_id, &auth.user_id)
        .await?;
    Ok(Json(ApiResponse::new(response)))
}
