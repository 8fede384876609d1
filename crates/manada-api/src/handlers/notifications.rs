//! Notification handlers

use axum::{
    extract::{Path, State},
    Json,
};
use manada_service::{ApiResponse, NotificationResponse, NotificationService};
use serde::Deserialize;

use crate::extractors::{parse_doc_id, AuthUser, QueryParams};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NotificationListParams {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
}

/// The caller's notifications, newest first
///
/// GET /api/notifications?unread_only=&limit=
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<NotificationListParams>,
) -> ApiResult<Json<ApiResponse<Vec<NotificationResponse>>>> {
    let service = NotificationService::new(state.service_context());
    let items = service
        .list(&auth.user_id, params.unread_only, params.limit)
        .await?;
    Ok(Json(ApiResponse::new(items)))
}

/// POST /api/notifications/{notification_id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<String>,
) -> ApiResult<NoContent> {
    let notification_id = parse_doc_id(&notification_id, "notification_id")?;

    let service = NotificationService::new(state.service_context());
    service.mark_read(&notification_id, &auth.user_id).await?;
    Ok(NoContent)
}
