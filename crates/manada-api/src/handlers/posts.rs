//! Post feed handlers

use axum::{extract::State, Json};
use manada_service::{ApiResponse, CreatePostRequest, FeedItemResponse, FeedPageResponse, FeedService};

use crate::extractors::{AuthUser, Pagination, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Newest posts, with the sponsored entry spliced into the first page
///
/// GET /api/posts?limit=&after_id=
pub async fn list_posts(
    State(state): State<AppState>,
    pagination: Pagination,
) -> ApiResult<Json<ApiResponse<FeedPageResponse>>> {
    let service = FeedService::new(state.service_context());
    let page = service
        .posts(pagination.limit, pagination.after_id.as_ref())
        .await?;
    Ok(Json(ApiResponse::new(page)))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreatePostRequest>,
) -> ApiResult<Created<Json<ApiResponse<FeedItemResponse>>>> {
    let service = FeedService::new(state.service_context());
    let post = service.create_post(&auth.user_id, request).await?;
    Ok(Created(Json(ApiResponse::new(post))))
}
