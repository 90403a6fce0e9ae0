//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Coupon API                         │
//! │                                                                         │
//! │  Handler ──► CouponService ──► Result<T, ApiError>                      │
//! │                  │                                                      │
//! │                  ├── CoreError  (validation, business rules) ──┐        │
//! │                  ├── DbError    (storage)                  ────┤        │
//! │                  └── bad input  (ApiJson/ApiQuery/ApiPath) ────┤        │
//! │                                                                ▼        │
//! │                                                  ApiError::into_response│
//! │                                                  ├── log (warn / error) │
//! │                                                  └── envelope + status  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Mapping
//! | Source                                  | Status |
//! |-----------------------------------------|--------|
//! | `CoreError::CouponNotFound`, `DbError::NotFound` | 404 |
//! | any other `CoreError`                   | 400    |
//! | `DbError::UniqueViolation` / `ConstraintViolation` | 400 |
//! | malformed body, query string or path    | 400    |
//! | body over the configured limit          | 413    |
//! | any other `DbError`                     | 500    |
//!
//! 5xx responses never expose database details; the real error goes to the log.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coupon_core::CoreError;
use coupon_db::DbError;
use tracing::{error, warn};

use crate::response::ApiResponse;

/// Message shown for every 5xx.
const INTERNAL_MESSAGE: &str = "Internal server error";

/// API error returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Business rule or validation rejection.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failure.
    #[error(transparent)]
    Db(#[from] DbError),

    /// The body, query string or path does not have the expected shape.
    #[error("{0}")]
    InvalidRequest(String),

    /// The request body exceeds the configured limit.
    #[error("{0}")]
    PayloadTooLarge(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Core(_) => StatusCode::BAD_REQUEST,
            ApiError::Db(DbError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Db(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Message safe to send to the client.
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Db(DbError::NotFound { entity, .. }) => format!("{entity} not found"),
            err if err.status().is_server_error() => INTERNAL_MESSAGE.to_string(),
            err => err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::InvalidRequest(format!("Invalid input: {}", rejection.body_text()))
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest(format!("Invalid input: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidRequest(format!("Invalid input: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), message = %self, "Request rejected");
        }

        ApiResponse::empty(status, self.client_message()).into_response()
    }
}

/// Result type for handlers and services.
pub type ApiResult<T> = Result<T, ApiError>;
