//! Slot availability handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{error_response, ApiError, AppState};
use crate::api::dto::{ApiResponse, SlotDto, SlotsQuery};

/// Free slots for a venue on a date
///
/// Returns the slots that are available and not held by any pending or
/// confirmed booking, ascending by start time. Advisory for display;
/// the booking create call re-checks atomically.
#[utoipa::path(
    get,
    path = "/api/v1/venues/{venue_id}/slots",
    tag = "Slots",
    params(
        ("venue_id" = String, Path, description = "Venue ID"),
        SlotsQuery
    ),
    responses(
        (status = 200, description = "Free slots ordered by start time", body = ApiResponse<Vec<SlotDto>>),
        (status = 404, description = "Venue not found")
    )
)]
pub async fn list_free_slots(
    State(state): State<AppState>,
    Path(venue_id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<ApiResponse<Vec<SlotDto>>>, ApiError> {
    let slots = state
        .availability
        .free_slots(&venue_id, query.date)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(
        slots.into_iter().map(SlotDto::from).collect(),
    )))
}
