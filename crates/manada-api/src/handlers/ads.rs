//! Ad handlers
//!
//! Advertiser campaigns and their review/payment lifecycle.

use axum::{
    extract::{Path, State},
    Json,
};
use manada_service::{
    AdActionRequest, AdResponse, AdService, ApiResponse, CreateAdRequest, UpdateAdRequest,
};
use serde::Deserialize;

use crate::extractors::{parse_doc_id, AuthUser, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AdListParams {
    pub status: Option<String>,
    pub advertiser_id: Option<String>,
    pub limit: Option<i64>,
}

/// List ads
///
/// GET /api/ads?status=&advertiser_id=&limit=
pub async fn list_ads(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<AdListParams>,
) -> ApiResult<Json<ApiResponse<Vec<AdResponse>>>> {
    let advertiser_id = params
        .advertiser_id
        .as_deref()
        .map(|raw| parse_doc_id(raw, "advertiser_id"))
        .transpose()?;

    let service = AdService::new(state.service_context());
    let ads = service
        .list(params.status.as_deref(), advertiser_id, params.limit)
        .await?;
    Ok(Json(ApiResponse::new(ads)))
}

/// Create an ad; it starts pending review
///
/// POST /api/ads
pub async fn create_ad(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateAdRequest>,
) -> ApiResult<Created<Json<ApiResponse<AdResponse>>>> {
    let service = AdService::new(state.service_context());
    let ad = service.create(&auth.user_id, request).await?;
    Ok(Created(Json(ApiResponse::new(ad))))
}

/// GET /api/ads/{ad_id}
pub async fn get_ad(
    State(state): State<AppState>,
    Path(ad_id): Path<String>,
) -> ApiResult<Json<ApiResponse<AdResponse>>> {
    let ad_id = parse_doc_id(&ad_id, "ad_id")?;

    let service = AdService::new(state.service_context());
    let ad = service.get(&ad_id).await?;
    Ok(Json(ApiResponse::new(ad)))
}

/// Edit an ad's content
///
/// PUT /api/ads/{ad_id}
pub async fn update_ad(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(ad_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateAdRequest>,
) -> ApiResult<Json<ApiResponse<AdResponse>>> {
    let ad_id = parse_doc_id(&ad_id, "ad_id")?;

    let service = AdService::new(state.service_context());
    let ad = service.update(&ad_id, &auth.user_id, request).await?;
    Ok(Json(ApiResponse::new(ad)))
}

/// DELETE /api/ads/{ad_id}
pub async fn delete_ad(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(ad_id): Path<String>,
) -> ApiResult<NoContent> {
    let ad_id = parse_doc_id(&ad_id, "ad_id")?;

    let service = AdService::new(state.service_context());
    service.delete(&ad_id, &auth.user_id).await?;
    Ok(NoContent)
}

/// Apply a lifecycle action
///
/// PATCH /api/ads/{ad_id} with `{"action": "approve" | "reject" | "process_payment" | "pause" | "resume", "reason"?}`
///
/// An action the current status does not allow is a 400 and leaves the ad untouched.
pub async fn apply_ad_action(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(ad_id): Path<String>,
    ValidatedJson(request): ValidatedJson<AdActionRequest>,
) -> ApiResult<Json<ApiResponse<AdResponse>>> {
    let ad_id = parse_doc_id(&ad_id, "ad_id")?;

    let service = AdService::new(state.service_context());
    let ad = service
        .apply_action(&ad_id, &auth.user_id, &request.action, request.reason)
        .await?;
    Ok(Json(ApiResponse::new(ad)))
}
