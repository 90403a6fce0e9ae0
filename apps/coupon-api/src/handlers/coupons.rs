//! Coupon record lifecycle endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use coupon_core::{Coupon, CouponDefinition, CouponKey, Page};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::response::ApiResponse;
use crate::AppState;

/// `?page=&limit=` as raw strings; junk falls back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// `POST /coupons`
pub async fn create_coupon(
    State(state): State<Arc<AppState>>,
    ApiJson(definition): ApiJson<CouponDefinition>,
) -> ApiResult<ApiResponse<Coupon>> {
    let coupon = state.coupons.create(definition).await?;
    Ok(ApiResponse::new(
        StatusCode::CREATED,
        coupon,
        "Coupon created successfully",
    ))
}

/// `GET /coupons`
pub async fn list_coupons(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<ApiResponse<Vec<Coupon>>> {
    let page = Page::parse(query.page.as_deref(), query.limit.as_deref());
    let coupons = state.coupons.list(page).await?;
    Ok(ApiResponse::ok(coupons, "Coupons retrieved successfully"))
}

/// `GET /coupons/{key}`
pub async fn get_coupon(
    State(state): State<Arc<AppState>>,
    ApiPath(key): ApiPath<String>,
) -> ApiResult<ApiResponse<Coupon>> {
    let coupon = state.coupons.get(&CouponKey::parse(&key)).await?;
    Ok(ApiResponse::ok(coupon, "Coupon retrieved successfully"))
}

/// `PUT /coupons/{key}`
pub async fn update_coupon(
    State(state): State<Arc<AppState>>,
    ApiPath(key): ApiPath<String>,
    ApiJson(definition): ApiJson<CouponDefinition>,
) -> ApiResult<ApiResponse<Coupon>> {
    let coupon = state
        .coupons
        .update(&CouponKey::parse(&key), definition)
        .await?;
    Ok(ApiResponse::ok(coupon, "Coupon updated successfully"))
}

/// `DELETE /coupons/{key}` answers 204 with no body.
pub async fn delete_coupon(
    State(state): State<Arc<AppState>>,
    ApiPath(key): ApiPath<String>,
) -> ApiResult<StatusCode> {
    state.coupons.delete(&CouponKey::parse(&key)).await?;
    Ok(StatusCode::NO_CONTENT)
}
