use axum::{extract::rejection::JsonRejection, extract::State, Json};

use sahaya_reconcile::meetings::{self, MeetingReport, MeetingRoster};

use crate::{ApiError, AppState};

/// Save a meeting roster.
pub async fn record(
    State(state): State<AppState>,
    payload: Result<Json<MeetingRoster>, JsonRejection>,
) -> Result<Json<MeetingReport>, ApiError> {
    let Json(roster) = payload?;
    Ok(Json(meetings::record_meeting(&state.db, roster).await?))
}
