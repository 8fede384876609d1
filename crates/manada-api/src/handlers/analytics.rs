//! Analytics handlers
//!
//! A mock event sink kept in process memory.

use axum::{
    extract::State,
    Json,
};
use manada_service::{
    AnalyticsEventResponse, AnalyticsService, AnalyticsSummaryResponse, ApiResponse,
    TrackEventRequest,
};
use serde::Deserialize;

use crate::extractors::{OptionalAuthUser, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EventListParams {
    pub event_type: Option<String>,
    pub limit: Option<usize>,
}

/// Record an event; anonymous callers are allowed
///
/// POST /api/analytics/events
pub async fn track_event(
    State(state): State<AppState>,
    auth: OptionalAuthUser,
    ValidatedJson(request): ValidatedJson<TrackEventRequest>,
) -> ApiResult<Created<Json<ApiResponse<AnalyticsEventResponse>>>> {
    let service = AnalyticsService::new(state.service_context());
    let event = service.record(auth.user_id().cloned(), request)?;
    Ok(Created(Json(ApiResponse::new(event))))
}

/// GET /api/analytics/events?event_type=&limit=
pub async fn list_events(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<EventListParams>,
) -> Json<ApiResponse<Vec<AnalyticsEventResponse>>> {
    let service = AnalyticsService::new(state.service_context());
    Json(ApiResponse::new(
        service.list(params.event_type.as_deref(), params.limit),
    ))
}

/// GET /api/analytics/summary
pub async fn summary(State(state): State<AppState>) -> Json<ApiResponse<AnalyticsSummaryResponse>> {
    let service = AnalyticsService::new(state.service_context());
    Json(ApiResponse::new(service.summary()))
}
