use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API returned status {status}: {body}")]
    ExternalApi { status: u16, body: String },

    #[error("{0} not configured")]
    NotConfigured(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self {
            AppError::ExternalApi { status, body } => json!({
                "error": "Upstream request failed",
                "status": status,
                "details": serde_json::from_str::<serde_json::Value>(body)
                    .unwrap_or_else(|_| json!(body)),
            }),
            _ => json!({ "error": self.to_string() }),
        };

        let status = match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalApi { .. } | AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            // 499 Client Closed Request; nobody is listening anyway
            AppError::Cancelled => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            AppError::NotConfigured(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::InvalidInput("x".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ExternalApi {
                status: 403,
                body: "{}".to_string()
            }
            .into_response()
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::NotConfigured("Bot token".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_cancelled_and_internal_status() {
        assert_eq!(AppError::Cancelled.into_response().status().as_u16(), 499);
        assert_eq!(
            AppError::Internal("search response is not an array".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_configured_message() {
        assert_eq!(
            AppError::NotConfigured("Bot token".to_string()).to_string(),
            "Bot token not configured"
        );
    }
}
