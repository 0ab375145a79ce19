//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::services::BookingError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Malformed request input (path or query values)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Domain error from the service layer
    Booking(BookingError),
}

fn booking_status(err: &BookingError) -> StatusCode {
    match err {
        BookingError::NotFound { .. } => StatusCode::NOT_FOUND,
        BookingError::SlotUnavailable { .. } | BookingError::SlugTaken(_) => StatusCode::CONFLICT,
        BookingError::AlreadyCancelled(_)
        | BookingError::Inactive(_)
        | BookingError::Validation(_) => StatusCode::BAD_REQUEST,
        BookingError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Booking(err) => {
                let status = booking_status(&err);
                if status.is_server_error() {
                    log::error!("Request failed: {}", err);
                }
                let mut body = ApiError::new(err.code(), err.to_string());
                if let BookingError::SlotUnavailable {
                    conflicting: Some(id),
                } = &err
                {
                    body = body.with_details(format!("conflicts with booking {}", id));
                }
                (status, body)
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError::Booking(err)
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Booking(err.into())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
