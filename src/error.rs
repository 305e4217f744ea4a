//! Typed errors and HTTP mapping onto the response envelope.

use crate::response::ApiResponse;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Route not found.")]
    RouteNotFound,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("invalid schema: {0}")]
    Schema(String),
    #[error("config: {0}")]
    Config(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// (HTTP status code, envelope status tag) for this error.
    pub fn status_parts(&self) -> (u16, &'static str) {
        match self {
            AppError::RouteNotFound => (404, "not_found"),
            AppError::NotFound(_) => (404, "not_found"),
            AppError::BadRequest(_) => (400, "bad_request"),
            AppError::Validation(_) => (400, "bad_request"),
            AppError::Schema(_) => (500, "internal_server_error"),
            AppError::Config(_) => (500, "internal_server_error"),
            AppError::Io(_) => (500, "internal_server_error"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (404, "not_found")
                } else {
                    (500, "internal_server_error")
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, status) = self.status_parts();
        let message = match &self {
            // Database details stay in the log, not in the reply.
            AppError::Db(e) if !matches!(e, sqlx::Error::RowNotFound) => {
                tracing::error!(error = %e, "database error");
                "Error connecting to the database".to_string()
            }
            other => other.to_string(),
        };
        ApiResponse::fail(status_code, status, message).into_response()
    }
}
