use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Metadata storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Asset upload failed: {0}")]
    AssetUploadFailed(String),

    #[error("Asset delete failed: {0}")]
    AssetDeleteFailed(String),

    #[error("Suggestion request failed: {0}")]
    SuggestionRequestFailed(String),

    #[error("Unparseable AI response: {reason}")]
    SuggestionUnparseable { reason: String, raw: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn success_message(message: &str) -> ApiResponse<()> {
        ApiResponse {
            code: 0,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn error(code: i32, message: &str) -> ApiResponse<()> {
        ApiResponse {
            code,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn error_with_data(code: i32, message: &str, data: T) -> Self {
        Self {
            code,
            message: message.to_string(),
            data: Some(data),
        }
    }
}

/// Diagnostic payload returned alongside an unparseable suggestion
#[derive(Serialize)]
struct UnparseableDetail {
    raw: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::StorageUnavailable(msg) => {
                tracing::error!("Metadata storage unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, 503, self.to_string())
            }
            AppError::AssetUploadFailed(msg) => {
                tracing::error!("Asset upload failed: {}", msg);
                (StatusCode::BAD_GATEWAY, 502, self.to_string())
            }
            AppError::AssetDeleteFailed(msg) => {
                tracing::warn!("Asset delete failed: {}", msg);
                (StatusCode::BAD_GATEWAY, 502, self.to_string())
            }
            AppError::SuggestionRequestFailed(msg) => {
                tracing::error!("Suggestion request failed: {}", msg);
                (StatusCode::BAD_GATEWAY, 502, self.to_string())
            }
            AppError::SuggestionUnparseable { reason, raw } => {
                tracing::warn!("Unparseable AI response ({}): {}", reason, raw);
                let body = Json(ApiResponse::error_with_data(
                    422,
                    &self.to_string(),
                    UnparseableDetail { raw: raw.clone() },
                ));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, 400, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, 409, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, 500, msg.clone())
            }
        };

        let body = Json(ApiResponse::<()>::error(code, &message));
        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
