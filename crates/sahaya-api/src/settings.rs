use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::info;

use sahaya_data::{Settings, Update};

use crate::{ApiError, AppState};

pub async fn show(State(state): State<AppState>) -> Result<Json<Settings>, ApiError> {
    Ok(Json(state.settings.get(&state.db).await?))
}

/// Replace the fine amounts. Cached amounts are dropped.
pub async fn update(
    State(state): State<AppState>,
    payload: Result<Json<Settings>, JsonRejection>,
) -> Result<Json<Settings>, ApiError> {
    let Json(settings) = payload?;
    let amounts = [
        settings.funeral_fine,
        settings.funeral_work_fine,
        settings.cemetery_work_fine,
        settings.common_work_fine,
    ];
    if amounts.iter().any(|amount| *amount < 0) {
        return Err(ApiError::BadRequest("fine amounts must not be negative".to_string()));
    }

    let settings = state.db.update(settings).await?;
    state.settings.invalidate().await;
    info!(?settings, "updated fine settings");
    Ok(Json(settings))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::testing::{app, send};

    #[tokio::test]
    async fn test_update_settings_invalidates_cache() {
        let (app, _) = app().await;
        let (status, settings) = send(&app, "GET", "/settings", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(settings, json!({
            "funeralFine": 100,
            "funeralWorkFine": 200,
            "cemeteryWorkFine": 200,
            "commonWorkFine": 300,
        }));

        let update = json!({
            "funeralFine": 120,
            "funeralWorkFine": 220,
            "cemeteryWorkFine": 240,
            "commonWorkFine": 330,
        });
        let (status, _) = send(&app, "PUT", "/settings", Some(update.clone())).await;
        assert_eq!(status, StatusCode::OK);
        let (_, settings) = send(&app, "GET", "/settings", None).await;
        assert_eq!(settings, update);

        let (status, _) = send(&app, "PUT", "/settings", Some(json!({
            "funeralFine": -1,
            "funeralWorkFine": 220,
            "cemeteryWorkFine": 240,
            "commonWorkFine": 330,
        }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
