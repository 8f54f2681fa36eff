use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(false);

/// Include internal error detail in response bodies. Only enabled for
/// development deployments.
pub fn expose_error_details(enabled: bool) {
    EXPOSE_DETAILS.store(enabled, Ordering::Relaxed);
}

fn details_exposed() -> bool {
    EXPOSE_DETAILS.load(Ordering::Relaxed)
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error("Too many requests. Please try again later.")]
    RateLimited { retry_after: u64 },

    #[error("{0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal => {
                "Internal server error. Please try again later.".to_string()
            }
            other => other.to_string(),
        }
    }

    fn detail(&self) -> Option<&str> {
        match self {
            AppError::Database(detail) => Some(detail),
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({ "error": self.public_message() });

        if let AppError::RateLimited { retry_after } = self {
            body["retry_after_seconds"] = json!(retry_after);
        }

        if details_exposed() {
            if let Some(detail) = self.detail() {
                body["details"] = json!(detail);
            }
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(error: AppError) -> serde_json::Value {
        let response = error.error_response();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(AppError::validation("bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Conflict("dup".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::RateLimited { retry_after: 3 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Database("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn database_errors_hide_detail_by_default() {
        let body = body_json(AppError::Database("relation missing".into())).await;
        assert_eq!(body["error"], "Internal server error. Please try again later.");
        assert!(body.get("details").is_none());
    }

    #[actix_web::test]
    async fn validation_message_is_returned_verbatim() {
        let body = body_json(AppError::validation("Invalid email format")).await;
        assert_eq!(body["error"], "Invalid email format");
    }

    #[actix_web::test]
    async fn rate_limited_reports_retry_after() {
        let body = body_json(AppError::RateLimited { retry_after: 7 }).await;
        assert_eq!(body["retry_after_seconds"], 7);
    }
}
