use axum::{extract::rejection::JsonRejection, extract::State, Json};

use sahaya_reconcile::common_works::{self, CommonWorkReport, CommonWorkRoster};

use crate::{ApiError, AppState};

pub async fn record(
    State(state): State<AppState>,
    payload: Result<Json<CommonWorkRoster>, JsonRejection>,
) -> Result<Json<CommonWorkReport>, ApiError> {
    let Json(roster) = payload?;
    let report = common_works::record_common_work(&state.db, &state.settings, roster).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::testing::{app, send};

    #[tokio::test]
    async fn test_record_common_work() {
        let (app, _) = app().await;
        let (status, report) = send(&app, "POST", "/common-works", Some(json!({
            "date": "2024-06-01",
            "title": "Road clearing",
            "absentArray": [2, 3],
        }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["created"], json!(true));
        assert_eq!(report["finesAdded"], json!(2));
        assert_eq!(report["stats"], json!({
            "totalMembers": 5,
            "absentCount": 2,
            "presentCount": 3,
        }));

        let (_, report) = send(&app, "POST", "/common-works", Some(json!({
            "date": "2024-06-01",
            "absentArray": [3],
        }))).await;
        assert_eq!(report["created"], json!(false));
        assert_eq!(report["finesAdded"], json!(0));
        assert_eq!(report["finesRemoved"], json!(1));
    }
}
