//! # Discount Engine
//!
//! Turns a usable coupon and a validated cart into per-item discounted prices.
//!
//! ## Algorithms
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cart-wise                                                              │
//! │    cartValue = Σ price                                                  │
//! │    cartValue < minCartValue           → InsufficientCartValue           │
//! │    discount  = value                    (fixed)                         │
//! │              = min(cartValue·value/100, maxValue)   (percentage)        │
//! │    each item: price − discount / N                                      │
//! │                                                                         │
//! │  product-wise                                                           │
//! │    item not in applicableProducts     → price unchanged                 │
//! │    otherwise: max(0, price − amount)                                    │
//! │      amount = value (fixed) | price·value/100 (percentage)              │
//! │                                                                         │
//! │  BxGy                                 → Unsupported                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Negative Prices
//! The even cart-wise split can push a cheap item below zero (a fixed 30 off
//! a cart of 5 + 95 gives -10 and 80). That is the default because it keeps
//! `Σ discountedPrice == cartValue − discount`. [`DiscountPolicy`] can floor
//! each line at zero instead, at the cost of granting less than the full
//! discount on such carts.
//!
//! The engine is synchronous and never touches its inputs; every result is a
//! fresh [`DiscountedItem`].

use crate::error::{CoreError, CoreResult};
use crate::types::{CartItem, Coupon, CouponType, DiscountDetails, DiscountKind, DiscountedItem};

/// Knobs for the discount engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiscountPolicy {
    /// Clamp cart-wise per-item prices at zero.
    pub floor_cart_wise_prices: bool,
}

/// Applies `coupon` to `items`, one result per item in input order.
///
/// The caller is expected to have run
/// [`validate_usable`](crate::validation::validate_usable) and
/// [`validate_cart`](crate::validation::validate_cart) first.
///
/// ## Example
/// ```rust
/// use chrono::{Duration, Utc};
/// use coupon_core::discount::{apply_coupon, DiscountPolicy};
/// use coupon_core::{CartItem, Coupon, CouponConditions, CouponType, DiscountDetails};
///
/// let now = Utc::now();
/// let coupon = Coupon {
///     id: "c1".to_string(),
///     code: "TENOFF".to_string(),
///     coupon_type: CouponType::CartWise,
///     discount_details: DiscountDetails::fixed(10.0),
///     conditions: CouponConditions { min_cart_value: Some(50.0), ..Default::default() },
///     expiry_date: now + Duration::days(1),
///     created_at: now,
///     updated_at: now,
/// };
/// let cart = vec![CartItem::new("P1", 40.0), CartItem::new("P2", 60.0)];
///
/// let result = apply_coupon(&coupon, &cart, DiscountPolicy::default()).unwrap();
/// assert_eq!(result[0].discounted_price, 35.0);
/// assert_eq!(result[1].discounted_price, 55.0);
/// ```
pub fn apply_coupon(
    coupon: &Coupon,
    items: &[CartItem],
    policy: DiscountPolicy,
) -> CoreResult<Vec<DiscountedItem>> {
    match coupon.coupon_type {
        CouponType::CartWise => apply_cart_wise(coupon, items, policy),
        CouponType::ProductWise => Ok(apply_product_wise(coupon, items)),
        CouponType::BxGy => Err(CoreError::Unsupported(CouponType::BxGy)),
    }
}

// =============================================================================
// Cart-wise
// =============================================================================

fn apply_cart_wise(
    coupon: &Coupon,
    items: &[CartItem],
    policy: DiscountPolicy,
) -> CoreResult<Vec<DiscountedItem>> {
    let cart_value: f64 = items.iter().map(|item| item.price).sum();

    if let Some(min_cart_value) = coupon.conditions.min_cart_value {
        if cart_value < min_cart_value {
            return Err(CoreError::InsufficientCartValue {
                cart_value,
                min_cart_value,
            });
        }
    }

    if items.is_empty() {
        return Ok(Vec::new());
    }

    let discount = cart_discount(&coupon.discount_details, cart_value);
    let share = discount / items.len() as f64;

    Ok(items
        .iter()
        .map(|item| {
            let price = item.price - share;
            let price = if policy.floor_cart_wise_prices {
                price.max(0.0)
            } else {
                price
            };
            discounted(item, price)
        })
        .collect())
}

/// Whole-cart discount amount.
pub fn cart_discount(details: &DiscountDetails, cart_value: f64) -> f64 {
    match details.kind {
        DiscountKind::Fixed => details.value,
        DiscountKind::Percentage => {
            let amount = cart_value * details.value / 100.0;
            match details.max_value {
                Some(cap) => amount.min(cap),
                None => amount,
            }
        }
    }
}

// =============================================================================
// Product-wise
// =============================================================================

fn apply_product_wise(coupon: &Coupon, items: &[CartItem]) -> Vec<DiscountedItem> {
    let details = &coupon.discount_details;
    let products = &coupon.conditions.applicable_products;

    items
        .iter()
        .map(|item| {
            if !products.contains(&item.product_id) {
                return discounted(item, item.price);
            }
            let amount = match details.kind {
                DiscountKind::Fixed => details.value,
                DiscountKind::Percentage => item.price * details.value / 100.0,
            };
            discounted(item, (item.price - amount).max(0.0))
        })
        .collect()
}

fn discounted(item: &CartItem, discounted_price: f64) -> DiscountedItem {
    DiscountedItem {
        item: item.clone(),
        discounted_price,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
