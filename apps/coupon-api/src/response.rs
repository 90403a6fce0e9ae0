//! # Response Envelope
//!
//! Every JSON response, success or failure, has the same shape:
//! ```json
//! {
//!   "statusCode": 200,
//!   "data": [ ... ],
//!   "message": "Coupons retrieved successfully",
//!   "success": true
//! }
//! ```
//! `success` is `statusCode < 400`. Errors carry `"data": null`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// JSON envelope around a payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: Option<T>,
    pub message: String,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    /// Envelope with a payload.
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            status_code: status.as_u16(),
            data: Some(data),
            message: message.into(),
            success: status.as_u16() < 400,
        }
    }

    /// 200 with a payload.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, data, message)
    }
}

impl ApiResponse<()> {
    /// Envelope without a payload.
    pub fn empty(status: StatusCode, message: impl Into<String>) -> Self {
        ApiResponse {
            status_code: status.as_u16(),
            data: None,
            message: message.into(),
            success: status.as_u16() < 400,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::new(
            StatusCode::CREATED,
            vec![1, 2],
            "Created",
        ))
        .unwrap();
        assert_eq!(json["statusCode"], 201);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["message"], "Created");
        assert_eq!(json["success"], true);
    }

    #[test]
    fn test_error_envelope() {
        let json =
            serde_json::to_value(ApiResponse::empty(StatusCode::NOT_FOUND, "Coupon not found"))
                .unwrap();
        assert_eq!(json["statusCode"], 404);
        assert!(json["data"].is_null());
        assert_eq!(json["success"], false);
    }
}
