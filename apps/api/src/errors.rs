use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::analysis::{AnalysisError, DocumentFailure};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Job description is empty")]
    EmptyInput,

    #[error("No document could be ingested")]
    NoDocuments(Vec<DocumentFailure>),

    #[error("Superseded by a newer analysis")]
    Superseded,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AnalysisError> for AppError {
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::EmptyInput => AppError::EmptyInput,
            AnalysisError::NoFiles | AnalysisError::TooManyFiles { .. } => {
                AppError::Validation(error.to_string())
            }
            AnalysisError::NoDocuments { failures } => AppError::NoDocuments(failures),
            AnalysisError::Superseded => AppError::Superseded,
            AnalysisError::Task(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, failures) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::EmptyInput => (
                StatusCode::BAD_REQUEST,
                "EMPTY_INPUT",
                "Job description must not be empty".to_string(),
                None,
            ),
            AppError::NoDocuments(failures) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NO_DOCUMENTS",
                format!("None of the {} uploaded files could be ingested", failures.len()),
                Some(failures),
            ),
            AppError::Superseded => (
                StatusCode::CONFLICT,
                "SUPERSEDED",
                "A newer analysis was submitted for this session".to_string(),
                None,
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error: Value = json!({
            "code": code,
            "message": message
        });
        if let Some(failures) = failures {
            error["failures"] = json!(failures);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_empty_input_maps_to_400() {
        let (status, body) = body_json(AnalysisError::EmptyInput.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "EMPTY_INPUT");
    }

    #[tokio::test]
    async fn test_no_documents_carries_failures() {
        let failures = vec![DocumentFailure {
            position: 0,
            filename: "cv.png".to_string(),
            code: "UNSUPPORTED_FORMAT".to_string(),
            message: "unsupported format: .png".to_string(),
        }];
        let (status, body) = body_json(AnalysisError::NoDocuments { failures }.into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "NO_DOCUMENTS");
        assert_eq!(body["error"]["failures"][0]["filename"], "cv.png");
    }

    #[tokio::test]
    async fn test_too_many_files_is_validation_error() {
        let error: AppError = AnalysisError::TooManyFiles { limit: 2, actual: 3 }.into();
        let (status, body) = body_json(error).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("limit is 2"));
    }

    #[tokio::test]
    async fn test_superseded_is_conflict() {
        let (status, _) = body_json(AppError::Superseded).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_internal_hides_details() {
        let (status, body) = body_json(AppError::Internal(anyhow::anyhow!("secret"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"]["message"].as_str().unwrap().contains("secret"));
    }
}
