//! Cart endpoints: discovery and redemption.

use std::sync::Arc;

use axum::extract::State;
use chrono::Utc;

use coupon_core::{ApplicableCoupon, CouponKey, DiscountedItem};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath};
use crate::response::ApiResponse;
use crate::services::{ApplicableCouponsRequest, ApplyCouponRequest};
use crate::AppState;

/// `POST /applicable-coupons`
pub async fn applicable_coupons(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ApplicableCouponsRequest>,
) -> ApiResult<ApiResponse<Vec<ApplicableCoupon>>> {
    let coupons = state.coupons.applicable(request, Utc::now()).await?;
    Ok(ApiResponse::ok(
        coupons,
        "Applicable coupons retrieved successfully",
    ))
}

/// `POST /apply-coupon/{key}`
pub async fn apply_coupon(
    State(state): State<Arc<AppState>>,
    ApiPath(key): ApiPath<String>,
    ApiJson(request): ApiJson<ApplyCouponRequest>,
) -> ApiResult<ApiResponse<Vec<DiscountedItem>>> {
    let items = state
        .coupons
        .apply(&CouponKey::parse(&key), request, Utc::now())
        .await?;
    Ok(ApiResponse::ok(items, "Coupon applied successfully"))
}
