use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// Malformed or incomplete inbound request, one message per offending field.
    Validation(Vec<String>),
    /// Admin action refused before anything was sent upstream.
    ActionRejected(String),
    Unauthorized,
    RateLimited,
    Session(String),
    Hash(String),
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(errors) => write!(f, "Validation failed: {}", errors.join("; ")),
            AppError::ActionRejected(reason) => write!(f, "Action rejected: {reason}"),
            AppError::Unauthorized => write!(f, "Authentication required"),
            AppError::RateLimited => write!(f, "Too many requests, please try again later"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::ActionRejected(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Session(_) | AppError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            AppError::Validation(errors) => HttpResponse::build(status).json(json!({
                "success": false,
                "message": "Please correct the highlighted fields",
                "errors": errors,
            })),
            AppError::Session(_) | AppError::Hash(_) => {
                log::error!("{self}");
                HttpResponse::build(status).json(json!({
                    "success": false,
                    "message": "Internal Server Error",
                }))
            }
            _ => HttpResponse::build(status).json(json!({
                "success": false,
                "message": self.to_string(),
            })),
        }
    }
}

impl From<actix_session::SessionInsertError> for AppError {
    fn from(e: actix_session::SessionInsertError) -> Self {
        AppError::Session(e.to_string())
    }
}
