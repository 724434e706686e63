//! Maps `TreeError` onto the HTTP status codes in the error handling design.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tree_core::TreeError;

pub struct ApiError(pub TreeError);

impl From<TreeError> for ApiError {
    fn from(err: TreeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self.0 {
            TreeError::ParentNotFound(_) => (StatusCode::BAD_REQUEST, "ParentNotFound"),
            TreeError::SourceNotFound(_) => (StatusCode::BAD_REQUEST, "SourceNotFound"),
            TreeError::TargetNotFound(_) => (StatusCode::BAD_REQUEST, "TargetNotFound"),
            TreeError::CycleRejected => (StatusCode::BAD_REQUEST, "CycleRejected"),
            TreeError::DepthExceeded(_) => (StatusCode::BAD_REQUEST, "DepthExceeded"),
            TreeError::LabelEncoding(_) => (StatusCode::BAD_REQUEST, "LabelEncoding"),
            TreeError::LabelTooLarge => (StatusCode::BAD_REQUEST, "LabelTooLarge"),
            TreeError::BulkLoadInvalidOrder(_) => (StatusCode::BAD_REQUEST, "BulkLoadInvalidOrder"),
            TreeError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "InvalidRequest"),
            TreeError::ForbiddenInProduction => (StatusCode::FORBIDDEN, "ForbiddenInProduction"),
            TreeError::ConflictRetry => (StatusCode::CONFLICT, "ConflictRetry"),
            TreeError::Internal(_) | TreeError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal"),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "internal error handling request");
        }

        (status, Json(json!({ "error": kind, "message": self.0.to_string() }))).into_response()
    }
}
