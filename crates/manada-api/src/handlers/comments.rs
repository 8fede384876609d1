//! Comment handlers
//!
//! A comment, the post's `commentsCount` and the author notification are
//! written in one batch.

use axum::{
    extract::{Path, State},
    Json,
};
use manada_service::{ApiResponse, CommentResponse, CommentService, CreateCommentRequest};

use crate::extractors::{parse_doc_id, AuthUser, Pagination, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

const DEFAULT_COMMENT_PAGE: usize = 50;

/// Comments of a post, oldest first
///
/// GET /api/posts/{post_id}/comments?limit=
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    pagination: Pagination,
) -> ApiResult<Json<ApiResponse<Vec<CommentResponse>>>> {
    let post_id = parse_doc_id(&post_id, "post_id")?;

    let service = CommentService::new(state.service_context());
    let comments = service
        .list(&post_id, pagination.limit.unwrap_or(DEFAULT_COMMENT_PAGE))
        .await?;
    Ok(Json(ApiResponse::new(comments)))
}

/// POST /api/posts/{post_id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<String>,
    ValidatedJson(request): ValidatedJson<CreateCommentRequest>,
) -> ApiResult<Created<Json<ApiResponse<CommentResponse>>>> {
    let post_id = parse_doc_id(&post_id, "post_id")?;

    let service = CommentService::new(state.service_context());
    let comment = service
        .create(&post_id, &auth.user_id, &request.content)
        .await?;
    Ok(Created(Json(ApiResponse::new(comment))))
}

/// Delete own comment
///
/// DELETE /api/comments/{comment_id}
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(comment_id): Path<String>,
) -> ApiResult<NoContent> {
    let comment_id = parse_doc_id(&comment_id, "comment_id")?;

    let service = CommentService::new(state.service_context());
    service.delete(&comment_id, &auth.user_id).await?;
    Ok(NoContent)
}
