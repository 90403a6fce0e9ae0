//! # Validation Module
//!
//! Business-rule validation for coupon definitions, coupons at use time and
//! cart payloads.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request schema (serde)                                       │
//! │  ├── Types, enum spellings, required keys                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── validate_definition  - create / update                            │
//! │  ├── validate_usable      - apply (expiry, season)                     │
//! │  └── validate_cart        - apply (every line priced and identified)   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE(code)                                                      │
//! │  └── CHECK constraints on amounts                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use chrono::Utc;
//! use coupon_core::validation::{validate_cart, validate_usable};
//! # fn demo(coupon: Option<coupon_core::Coupon>) -> coupon_core::CoreResult<()> {
//! validate_usable(coupon.as_ref(), Utc::now())?;
//! let cart = validate_cart(Some(vec![]))?;
//! # let _ = cart;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{
    CartItem, CartItemPayload, Coupon, CouponDefinition, CouponStatus, CouponType, DiscountKind,
};

/// Result type for field-level checks.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Definition
// =============================================================================

/// Validates a coupon definition before it is created or applied as an update.
///
/// ## Rules
/// - Percentage values are within 0..=100
/// - Amounts (`value`, `maxValue`, `minCartValue`) are not negative
/// - Cart-wise coupons carry `minCartValue`
/// - Product-wise coupons carry `applicableProducts`
/// - Product-wise percentage coupons carry no `maxValue`
/// - Seasonal coupons carry both dates, start no later than end
///
/// ## Example
/// ```rust
/// use coupon_core::validation::validate_definition;
/// use coupon_core::CouponDefinition;
///
/// let def: CouponDefinition = serde_json::from_str(r#"{
///     "type": "cart-wise",
///     "discountDetails": { "type": "percentage", "value": 150 },
///     "conditions": { "minCartValue": 100 },
///     "expiryDate": "2030-01-01T00:00:00Z"
/// }"#).unwrap();
///
/// assert!(validate_definition(&def).is_err());
/// ```
pub fn validate_definition(def: &CouponDefinition) -> CoreResult<()> {
    check_definition(def).map_err(CoreError::InvalidCoupon)
}

fn check_definition(def: &CouponDefinition) -> ValidationResult<()> {
    let details = &def.discount_details;
    let conditions = &def.conditions;

    if details.kind == DiscountKind::Percentage && !(0.0..=100.0).contains(&details.value) {
        return Err(ValidationError::OutOfRange {
            field: "discountDetails.value".to_string(),
            min: 0.0,
            max: 100.0,
            context: "for percentage discounts".to_string(),
        });
    }

    non_negative("discountDetails.value", Some(details.value))?;
    non_negative("discountDetails.maxValue", details.max_value)?;
    non_negative("conditions.minCartValue", conditions.min_cart_value)?;

    if def.coupon_type == CouponType::CartWise && conditions.min_cart_value.is_none() {
        return Err(ValidationError::Required {
            field: "minCartValue".to_string(),
            context: "for cart-wise coupons".to_string(),
        });
    }

    if def.coupon_type == CouponType::ProductWise && conditions.applicable_products.is_none() {
        return Err(ValidationError::Required {
            field: "applicableProducts (array of product ids)".to_string(),
            context: "for product-wise coupons".to_string(),
        });
    }

    if def.coupon_type == CouponType::ProductWise && details.kind == DiscountKind::Percentage {
        if let Some(max_value) = details.max_value {
            return Err(ValidationError::Unsupported(format!(
                "{}% upto {} feature not supported for product-wise coupon",
                details.value, max_value
            )));
        }
    }

    if conditions.seasonal {
        let (Some(start), Some(end)) = (conditions.start_date, conditions.end_date) else {
            return Err(ValidationError::Required {
                field: "startDate and endDate".to_string(),
                context: "for seasonal coupons".to_string(),
            });
        };
        if start > end {
            return Err(ValidationError::InvertedRange {
                start_field: "startDate".to_string(),
                end_field: "endDate".to_string(),
            });
        }
    }

    Ok(())
}

fn non_negative(field: &str, value: Option<f64>) -> ValidationResult<()> {
    match value {
        Some(v) if v < 0.0 || v.is_nan() => Err(ValidationError::Negative {
            field: field.to_string(),
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Use-Time Validity
// =============================================================================

/// Checks that a looked-up coupon can be redeemed at `now`.
///
/// ## User Workflow
/// ```text
/// POST /apply-coupon/SUMMER
///      │
///      ▼
/// store lookup ──► None?           → CouponNotFound
///      │
///      ▼
/// validate_usable ← THIS FUNCTION
///      │
///      ├── now > expiryDate?       → Expired
///      ├── seasonal, outside window → OutOfSeason
///      │
///      └── OK → Discount Engine
/// ```
pub fn validate_usable<'a>(
    coupon: Option<&'a Coupon>,
    now: DateTime<Utc>,
) -> CoreResult<&'a Coupon> {
    let Some(coupon) = coupon else {
        return Err(CoreError::CouponNotFound);
    };

    match coupon.status_at(now) {
        CouponStatus::Active => Ok(coupon),
        CouponStatus::Expired => Err(CoreError::Expired),
        CouponStatus::Pending | CouponStatus::OutOfSeason => Err(CoreError::OutOfSeason),
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Validates a cart payload and converts it into priced, identified items.
///
/// ## Rules
/// - The item list must be present
/// - Every item has a non-null `price` and `productId`
/// - An empty list is accepted
pub fn validate_cart(items: Option<Vec<CartItemPayload>>) -> CoreResult<Vec<CartItem>> {
    let Some(items) = items else {
        return Err(CoreError::InvalidCart(ValidationError::Required {
            field: "cartItems".to_string(),
            context: "as an array of items with productId and price".to_string(),
        }));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, payload)| {
            let missing = |field: &str| {
                CoreError::InvalidCart(ValidationError::MissingInItem {
                    collection: "cartItems".to_string(),
                    index,
                    field: field.to_string(),
                })
            };

            let price = payload.price.ok_or_else(|| missing("price"))?;
            let product_id = payload.product_id.ok_or_else(|| missing("productId"))?;

            let mut extra = payload.extra;
            extra.remove("discountedPrice");

            Ok(CartItem {
                product_id,
                price,
                extra,
            })
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CouponConditions, DefinitionConditions, DiscountDetails};
    use chrono::{Duration, TimeZone};

    fn expiry() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    fn definition(coupon_type: CouponType, details: DiscountDetails) -> CouponDefinition {
        CouponDefinition {
            code: None,
            coupon_type,
            discount_details: details,
            conditions: DefinitionConditions {
                min_cart_value: Some(100.0),
                applicable_products: Some(vec!["P1".to_string()]),
                ..Default::default()
            },
            expiry_date: expiry(),
        }
    }

    fn coupon(conditions: CouponConditions, expiry_date: DateTime<Utc>) -> Coupon {
        Coupon {
            id: "id".to_string(),
            code: "CODE".to_string(),
            coupon_type: CouponType::CartWise,
            discount_details: DiscountDetails::fixed(5.0),
            conditions,
            expiry_date,
            created_at: expiry() - Duration::days(365),
            updated_at: expiry() - Duration::days(365),
        }
    }

    fn reason(result: CoreResult<()>) -> ValidationError {
        match result {
            Err(CoreError::InvalidCoupon(reason)) => reason,
            other => panic!("expected InvalidCoupon, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_definitions() {
        let cart = definition(CouponType::CartWise, DiscountDetails::percentage(10.0, Some(50.0)));
        assert!(validate_definition(&cart).is_ok());

        let product = definition(CouponType::ProductWise, DiscountDetails::fixed(20.0));
        assert!(validate_definition(&product).is_ok());

        let bxgy = definition(CouponType::BxGy, DiscountDetails::fixed(1.0));
        assert!(validate_definition(&bxgy).is_ok());
    }

    #[test]
    fn test_percentage_must_be_within_bounds() {
        for value in [-0.5, 100.01, 250.0] {
            let def = definition(CouponType::CartWise, DiscountDetails::percentage(value, None));
            assert!(matches!(
                reason(validate_definition(&def)),
                ValidationError::OutOfRange { .. }
            ));
        }
        for value in [0.0, 100.0] {
            let def = definition(CouponType::CartWise, DiscountDetails::percentage(value, None));
            assert!(validate_definition(&def).is_ok());
        }
    }

    #[test]
    fn test_fixed_value_may_exceed_hundred() {
        let def = definition(CouponType::CartWise, DiscountDetails::fixed(500.0));
        assert!(validate_definition(&def).is_ok());
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let def = definition(CouponType::CartWise, DiscountDetails::fixed(-1.0));
        assert!(matches!(
            reason(validate_definition(&def)),
            ValidationError::Negative { .. }
        ));

        let mut def = definition(CouponType::CartWise, DiscountDetails::fixed(1.0));
        def.conditions.min_cart_value = Some(-10.0);
        assert!(matches!(
            reason(validate_definition(&def)),
            ValidationError::Negative { .. }
        ));
    }

    #[test]
    fn test_cart_wise_requires_min_cart_value() {
        let mut def = definition(CouponType::CartWise, DiscountDetails::fixed(10.0));
        def.conditions.min_cart_value = None;
        let err = reason(validate_definition(&def));
        assert_eq!(
            err.to_string(),
            "minCartValue is required for cart-wise coupons"
        );
    }

    #[test]
    fn test_product_wise_requires_products() {
        let mut def = definition(CouponType::ProductWise, DiscountDetails::fixed(10.0));
        def.conditions.applicable_products = None;
        assert!(matches!(
            reason(validate_definition(&def)),
            ValidationError::Required { .. }
        ));

        // An empty array is still an array.
        def.conditions.applicable_products = Some(vec![]);
        assert!(validate_definition(&def).is_ok());
    }

    #[test]
    fn test_product_wise_percentage_with_cap_rejected() {
        let def = definition(
            CouponType::ProductWise,
            DiscountDetails::percentage(10.0, Some(50.0)),
        );
        let err = reason(validate_definition(&def));
        assert_eq!(
            err.to_string(),
            "10% upto 50 feature not supported for product-wise coupon"
        );

        let fixed_with_cap = definition(
            CouponType::ProductWise,
            DiscountDetails {
                max_value: Some(50.0),
                ..DiscountDetails::fixed(10.0)
            },
        );
        assert!(validate_definition(&fixed_with_cap).is_ok());
    }

    #[test]
    fn test_seasonal_window_rules() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 8, 31, 0, 0, 0).unwrap();

        let mut def = definition(CouponType::CartWise, DiscountDetails::fixed(10.0));
        def.conditions.seasonal = true;
        def.conditions.start_date = Some(start);
        assert!(matches!(
            reason(validate_definition(&def)),
            ValidationError::Required { .. }
        ));

        def.conditions.end_date = Some(end);
        assert!(validate_definition(&def).is_ok());

        def.conditions.start_date = Some(end);
        def.conditions.end_date = Some(start);
        assert!(matches!(
            reason(validate_definition(&def)),
            ValidationError::InvertedRange { .. }
        ));

        // Dates without the seasonal flag are not checked.
        def.conditions.seasonal = false;
        assert!(validate_definition(&def).is_ok());
    }

    #[test]
    fn test_validate_usable_missing() {
        let err = validate_usable(None, expiry()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validate_usable_expiry() {
        let c = coupon(CouponConditions::default(), expiry());
        assert!(validate_usable(Some(&c), expiry() - Duration::seconds(1)).is_ok());
        // The expiry instant itself is still valid.
        assert!(validate_usable(Some(&c), expiry()).is_ok());
        assert!(matches!(
            validate_usable(Some(&c), expiry() + Duration::seconds(1)),
            Err(CoreError::Expired)
        ));
    }

    #[test]
    fn test_validate_usable_expired_wins_over_season() {
        let window_start = expiry() + Duration::days(1);
        let c = coupon(
            CouponConditions {
                seasonal: true,
                start_date: Some(window_start),
                end_date: Some(window_start + Duration::days(10)),
                ..Default::default()
            },
            expiry(),
        );
        assert!(matches!(
            validate_usable(Some(&c), window_start + Duration::days(2)),
            Err(CoreError::Expired)
        ));
    }

    #[test]
    fn test_validate_usable_seasonal_window() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 8, 31, 0, 0, 0).unwrap();
        let c = coupon(
            CouponConditions {
                seasonal: true,
                start_date: Some(start),
                end_date: Some(end),
                ..Default::default()
            },
            expiry(),
        );

        assert!(matches!(
            validate_usable(Some(&c), start - Duration::days(1)),
            Err(CoreError::OutOfSeason)
        ));
        assert!(validate_usable(Some(&c), start).is_ok());
        assert!(validate_usable(Some(&c), start + Duration::days(30)).is_ok());
        assert!(validate_usable(Some(&c), end).is_ok());
        assert!(matches!(
            validate_usable(Some(&c), end + Duration::days(1)),
            Err(CoreError::OutOfSeason)
        ));
    }

    #[test]
    fn test_validate_cart() {
        let items: Vec<CartItemPayload> = serde_json::from_str(
            r#"[{ "productId": "P1", "price": 10, "name": "Tea" },
                { "productId": "P2", "price": 0 }]"#,
        )
        .unwrap();
        let cart = validate_cart(Some(items)).unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart[0].product_id, "P1");
        assert_eq!(cart[0].extra["name"], "Tea");
        assert_eq!(cart[1].price, 0.0);

        assert!(validate_cart(Some(vec![])).unwrap().is_empty());
    }

    #[test]
    fn test_validate_cart_rejects_missing_fields() {
        assert!(matches!(validate_cart(None), Err(CoreError::InvalidCart(_))));

        let no_price: Vec<CartItemPayload> =
            serde_json::from_str(r#"[{ "productId": "P1", "price": 1 }, { "productId": "P2", "price": null }]"#)
                .unwrap();
        match validate_cart(Some(no_price)) {
            Err(CoreError::InvalidCart(ValidationError::MissingInItem { index, field, .. })) => {
                assert_eq!(index, 1);
                assert_eq!(field, "price");
            }
            other => panic!("expected InvalidCart, got {other:?}"),
        }

        let no_product: Vec<CartItemPayload> =
            serde_json::from_str(r#"[{ "price": 5 }]"#).unwrap();
        assert!(matches!(
            validate_cart(Some(no_product)),
            Err(CoreError::InvalidCart(_))
        ));
    }
}
