//! # Coupon Service
//!
//! Request-level coupon operations: the record lifecycle, discovery and
//! redemption. Handlers stay thin and delegate here.
//!
//! ## Apply Flow
//! ```text
//! POST /apply-coupon/{idOrCode}  { cartItems: [...] }
//!      │
//!      ▼
//! validate_cart          ── missing price / productId → 400
//!      │
//!      ▼
//! store.find(key)        ── CouponKey::parse: UUID → id, else code
//!      │
//!      ▼
//! validate_usable(now)   ── None → 404, expired / out of season → 400
//!      │
//!      ▼
//! apply_coupon(policy)   ── below minimum / BxGy → 400
//!      │
//!      ▼
//! [DiscountedItem]
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use coupon_core::validation::{validate_cart, validate_definition, validate_usable};
use coupon_core::{
    apply_coupon, build_applicability_filter, generate_coupon_code, ApplicableCoupon,
    CartItemPayload, Coupon, CouponDefinition, CouponKey, CoreError, CustomerType,
    DiscountPolicy, DiscountedItem, Page,
};
use coupon_db::{generate_coupon_id, CouponStore, DbError};

use crate::error::{ApiError, ApiResult};

// =============================================================================
// Request Schemas
// =============================================================================

/// Body of `POST /applicable-coupons`.
///
/// Both `cartValue` and `applicableProducts` are required; they are optional
/// here so their absence gets a precise message instead of a serde error.
/// `customerType` is free text: a value outside `new`/`existing`/`all` is
/// treated as unknown and only matches coupons open to everyone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicableCouponsRequest {
    #[serde(default)]
    pub cart_value: Option<f64>,
    #[serde(default)]
    pub applicable_products: Option<Vec<String>>,
    #[serde(default)]
    pub customer_type: Option<String>,
}

/// Body of `POST /apply-coupon/{idOrCode}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCouponRequest {
    #[serde(default)]
    pub cart_items: Option<Vec<CartItemPayload>>,
}

// =============================================================================
// Service
// =============================================================================

/// Coupon operations over an injected store.
#[derive(Clone)]
pub struct CouponService {
    store: Arc<dyn CouponStore>,
    policy: DiscountPolicy,
}

impl CouponService {
    /// Create a new coupon service.
    pub fn new(store: Arc<dyn CouponStore>, policy: DiscountPolicy) -> Self {
        CouponService { store, policy }
    }

    /// Validates and stores a new coupon, generating a code when none is given.
    pub async fn create(&self, definition: CouponDefinition) -> ApiResult<Coupon> {
        validate_definition(&definition)?;

        let code = match definition.supplied_code() {
            Some(code) => code.to_string(),
            None => generate_coupon_code(),
        };
        let coupon = Coupon::from_definition(generate_coupon_id(), code, definition, Utc::now());

        Ok(self.store.insert(&coupon).await?)
    }

    /// One page of coupons in creation order.
    pub async fn list(&self, page: Page) -> ApiResult<Vec<Coupon>> {
        Ok(self.store.list(page).await?)
    }

    /// A single coupon by identifier or code.
    pub async fn get(&self, key: &CouponKey) -> ApiResult<Coupon> {
        self.store
            .find(key)
            .await?
            .ok_or(ApiError::Core(CoreError::CouponNotFound))
    }

    /// Re-validates and replaces every field of an existing coupon.
    pub async fn update(&self, key: &CouponKey, definition: CouponDefinition) -> ApiResult<Coupon> {
        validate_definition(&definition)?;

        self.store
            .update(key, &definition)
            .await
            .map_err(not_found_as_core)
    }

    /// Deletes a coupon by identifier or code.
    pub async fn delete(&self, key: &CouponKey) -> ApiResult<()> {
        self.store.delete(key).await.map_err(not_found_as_core)
    }

    /// Coupons worth showing for a cart at `now`.
    pub async fn applicable(
        &self,
        request: ApplicableCouponsRequest,
        now: DateTime<Utc>,
    ) -> ApiResult<Vec<ApplicableCoupon>> {
        let (Some(cart_value), Some(products)) =
            (request.cart_value, request.applicable_products)
        else {
            return Err(ApiError::InvalidRequest(
                "Invalid input: cartValue must be a number and applicableProducts must be an array"
                    .to_string(),
            ));
        };

        let customer_type = request
            .customer_type
            .as_deref()
            .and_then(|raw| raw.parse::<CustomerType>().ok());

        let filter = build_applicability_filter(cart_value, products, customer_type, now);
        let coupons = self.store.find_applicable(&filter).await?;

        debug!(count = coupons.len(), cart_value, "Applicable coupons found");
        Ok(coupons)
    }

    /// Applies a coupon to a cart at `now`.
    pub async fn apply(
        &self,
        key: &CouponKey,
        request: ApplyCouponRequest,
        now: DateTime<Utc>,
    ) -> ApiResult<Vec<DiscountedItem>> {
        let items = validate_cart(request.cart_items)?;

        let coupon = self.store.find(key).await?;
        let coupon = validate_usable(coupon.as_ref(), now)?;

        let discounted = apply_coupon(coupon, &items, self.policy)?;

        info!(
            code = %coupon.code,
            coupon_type = %coupon.coupon_type,
            items = discounted.len(),
            "Coupon applied"
        );
        Ok(discounted)
    }
}

/// A store miss on update/delete reads the same as a lookup miss.
fn not_found_as_core(err: DbError) -> ApiError {
    match err {
        DbError::NotFound { .. } => ApiError::Core(CoreError::CouponNotFound),
        other => ApiError::Db(other),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
