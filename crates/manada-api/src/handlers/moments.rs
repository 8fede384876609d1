//! Moment handlers
//!
//! Moments expire 24 hours after creation; expired ones never appear here.

use axum::{
    extract::{Path, State},
    Json,
};
use manada_service::{ApiResponse, CreateMomentRequest, MomentResponse, MomentService};
use serde::Deserialize;

use crate::extractors::{parse_doc_id, AuthUser, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MomentListParams {
    pub author_id: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/moments?author_id=&limit=
pub async fn list_moments(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<MomentListParams>,
) -> ApiResult<Json<ApiResponse<Vec<MomentResponse>>>> {
    let author_id = params
        .author_id
        .as_deref()
        .map(|raw| parse_doc_id(raw, "author_id"))
        .transpose()?;

    let service = MomentService::new(state.service_context());
    let moments = service.list_active(author_id.as_ref(), params.limit).await?;
    Ok(Json(ApiResponse::new(moments)))
}

/// POST /api/moments
pub async fn create_moment(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateMomentRequest>,
) -> ApiResult<Created<Json<ApiResponse<MomentResponse>>>> {
    let service = MomentService::new(state.service_context());
    let moment = service.create(&auth.user_id, request).await?;
    Ok(Created(Json(ApiResponse::new(moment))))
}

/// GET /api/moments/{moment_id}
pub async fn get_moment(
    State(state): State<AppState>,
    Path(moment_id): Path<String>,
) -> ApiResult<Json<ApiResponse<MomentResponse>>> {
    let moment_id = parse_doc_id(&moment_id, "moment_id")?;

    let service = MomentService::new(state.service_context());
    Ok(Json(ApiResponse::new(service.get(&moment_id).await?)))
}
