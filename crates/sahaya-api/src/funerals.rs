use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use sahaya_data::Funeral;
use sahaya_reconcile::funerals::{
    self, AttendanceReport, ExtraDue, ExtraDueReport, FuneralAttendance, FuneralWorkRoster,
    NewFuneral, WorkReport,
};

use crate::{ApiError, AppState};

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewFuneral>, JsonRejection>,
) -> Result<(StatusCode, Json<Funeral>), ApiError> {
    let Json(funeral) = payload?;
    let funeral = funerals::create_funeral(&state.db, funeral).await?;
    Ok((StatusCode::CREATED, Json(funeral)))
}

pub async fn attendance(
    State(state): State<AppState>,
    payload: Result<Json<FuneralAttendance>, JsonRejection>,
) -> Result<Json<AttendanceReport>, ApiError> {
    let Json(attendance) = payload?;
    let report = funerals::record_attendance(&state.db, &state.settings, attendance).await?;
    Ok(Json(report))
}

pub async fn work(
    State(state): State<AppState>,
    payload: Result<Json<FuneralWorkRoster>, JsonRejection>,
) -> Result<Json<WorkReport>, ApiError> {
    let Json(work) = payload?;
    let report = funerals::record_work(&state.db, &state.settings, work).await?;
    Ok(Json(report))
}

pub async fn extra_due(
    State(state): State<AppState>,
    payload: Result<Json<ExtraDue>, JsonRejection>,
) -> Result<Json<ExtraDueReport>, ApiError> {
    let Json(levy) = payload?;
    Ok(Json(funerals::levy_extra_due(&state.db, levy).await?))
}
