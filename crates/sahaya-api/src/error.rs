use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error as ThisError;
use tracing::error;

use sahaya_reconcile::ReconcileError;

#[derive(ThisError, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::MissingField(_) | ReconcileError::Invalid(_) => {
                ApiError::BadRequest(err.to_string())
            }
            ReconcileError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            ReconcileError::Store(err) => ApiError::Internal(err),
            ReconcileError::OutOfOrder { .. } => ApiError::Internal(err.into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(err) => {
                error!("request failed: {:#}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    use super::*;

    async fn respond(err: ReconcileError) -> (StatusCode, Value) {
        let response = ApiError::from(err).into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_error() {
        let (status, body) = respond(ReconcileError::Store(anyhow!("database is locked"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "database is locked" }));
    }

    #[tokio::test]
    async fn test_request_errors() {
        let (status, body) = respond(ReconcileError::MissingField("date")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "missing required field `date`" }));

        let (status, body) = respond(ReconcileError::not_found("funeral", 9)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "funeral 9 not found" }));
    }
}
