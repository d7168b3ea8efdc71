//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::{ApplicationError, RepositoryError};

/// 统一错误响应格式
///
/// 流水线失败额外带 `success: false`；写库失败时 data 中带已生成但未保存的 URL
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub data: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            success: None,
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const CONFLICT: i32 = 409;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const GENERATION_FAILED: i32 = 502;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
    pub const PERSISTENCE_FAILED: i32 = 507;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
    Conflict(String),
    ServiceUnavailable(String),
    /// 插图运行失败
    PipelineFailed {
        errno: i32,
        message: String,
        unsaved_urls: Vec<String>,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let response = match self {
            ApiError::NotFound(msg) => {
                tracing::warn!(errno = errno::NOT_FOUND, error = %msg, "Resource not found");
                ErrorResponse::new(errno::NOT_FOUND, msg)
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(errno = errno::BAD_REQUEST, error = %msg, "Bad request");
                ErrorResponse::new(errno::BAD_REQUEST, msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!(errno = errno::INTERNAL_ERROR, error = %msg, "Internal server error");
                ErrorResponse::new(errno::INTERNAL_ERROR, msg)
            }
            ApiError::Conflict(msg) => {
                tracing::warn!(errno = errno::CONFLICT, error = %msg, "Resource conflict");
                ErrorResponse::new(errno::CONFLICT, msg)
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::error!(errno = errno::SERVICE_UNAVAILABLE, error = %msg, "Service unavailable");
                ErrorResponse::new(errno::SERVICE_UNAVAILABLE, msg)
            }
            ApiError::PipelineFailed {
                errno,
                message,
                unsaved_urls,
            } => {
                tracing::error!(errno, error = %message, "Illustration failed");
                let data = (!unsaved_urls.is_empty())
                    .then(|| serde_json::json!({ "unsaved_image_urls": unsaved_urls }));
                ErrorResponse {
                    errno,
                    error: message,
                    success: Some(false),
                    data,
                }
            }
        };

        (StatusCode::OK, Json(response)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(msg) => ApiError::NotFound(msg),
            RepositoryError::Duplicate(msg) => ApiError::Conflict(msg),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        let message = e.to_string();
        match e {
            ApplicationError::NotFound { .. } => ApiError::NotFound(message),
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::RepositoryError(msg) => ApiError::Internal(msg),
            ApplicationError::InternalError(msg) => ApiError::Internal(msg),
            ApplicationError::ProviderUnavailable(_) => ApiError::PipelineFailed {
                errno: errno::SERVICE_UNAVAILABLE,
                message,
                unsaved_urls: Vec::new(),
            },
            ApplicationError::ZeroResults { .. } => ApiError::PipelineFailed {
                errno: errno::GENERATION_FAILED,
                message,
                unsaved_urls: Vec::new(),
            },
            ApplicationError::PersistenceFailed { image_urls, .. } => ApiError::PipelineFailed {
                errno: errno::PERSISTENCE_FAILED,
                message,
                unsaved_urls: image_urls,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use uuid::Uuid;

    async fn body_json(error: ApiError) -> serde_json::Value {
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_zero_results_envelope() {
        let json = body_json(ApiError::from(ApplicationError::ZeroResults { attempted: 5 })).await;
        assert_eq!(json["errno"], errno::GENERATION_FAILED);
        assert_eq!(json["success"], false);
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to generate any images"));
        assert!(json["data"].is_null());
    }

    #[tokio::test]
    async fn test_persistence_failure_carries_urls() {
        let json = body_json(ApiError::from(ApplicationError::PersistenceFailed {
            story_id: Uuid::nil(),
            attempts: 3,
            image_urls: vec!["https://cdn.test/a.png".to_string()],
            reason: "database is locked".to_string(),
        }))
        .await;
        assert_eq!(json["errno"], errno::PERSISTENCE_FAILED);
        assert_eq!(json["success"], false);
        assert_eq!(json["data"]["unsaved_image_urls"][0], "https://cdn.test/a.png");
    }

    #[tokio::test]
    async fn test_plain_errors_have_no_success_flag() {
        let json = body_json(ApiError::from(ApplicationError::validation("bad"))).await;
        assert_eq!(json["errno"], errno::BAD_REQUEST);
        assert!(json.get("success").is_none());
    }
}
