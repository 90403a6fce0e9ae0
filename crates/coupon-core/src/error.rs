//! # Error Types
//!
//! Domain-specific error types for coupon-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  coupon-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule rejections                       │
//! │  └── ValidationError  - Field-level reasons (wrapped by CoreError)     │
//! │                                                                         │
//! │  coupon-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  coupon-api errors (in app)                                            │
//! │  └── ApiError         - Status code + response envelope                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → HTTP client            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::CouponType;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant except [`CoreError::CouponNotFound`] is a client mistake or a
/// business-rule rejection (HTTP 400 at the boundary).
#[derive(Debug, Error)]
pub enum CoreError {
    /// The coupon definition is malformed.
    ///
    /// ## When This Occurs
    /// - Percentage outside 0..=100
    /// - Cart-wise coupon without `minCartValue`
    /// - Product-wise coupon without `applicableProducts`
    /// - Seasonal coupon with a missing or inverted window
    #[error("Invalid input: {0}")]
    InvalidCoupon(#[source] ValidationError),

    /// The cart payload is malformed.
    #[error("Invalid input: {0}")]
    InvalidCart(#[source] ValidationError),

    /// No coupon with this identifier or code.
    #[error("Coupon not found")]
    CouponNotFound,

    /// The coupon is past its expiry date.
    #[error("This coupon has expired")]
    Expired,

    /// A seasonal coupon used outside its window.
    #[error("This coupon is not valid during the current period")]
    OutOfSeason,

    /// Cart total is below the coupon's minimum.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart total: 80, coupon minCartValue: 100
    ///      │
    ///      ▼
    /// InsufficientCartValue { cart_value: 80, min_cart_value: 100 }
    ///      │
    ///      ▼
    /// Client shows: "Add 20 more to use this coupon"
    /// ```
    #[error("Insufficient cart value: {cart_value} is below the minimum of {min_cart_value}")]
    InsufficientCartValue { cart_value: f64, min_cart_value: f64 },

    /// The coupon type has no discount algorithm.
    #[error("{0} coupons cannot be applied: discount rules for this type are not supported")]
    Unsupported(CouponType),
}

impl CoreError {
    /// Returns true for the variant that should surface as "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::CouponNotFound)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These describe *why* a definition or cart was rejected. They are wrapped
/// by [`CoreError::InvalidCoupon`] or [`CoreError::InvalidCart`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing.
    #[error("{field} is required {context}")]
    Required { field: String, context: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max} {context}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        context: String,
    },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// A combination of fields the service does not support.
    #[error("{0}")]
    Unsupported(String),

    /// Start of a range is after its end.
    #[error("{start_field} should be earlier than {end_field}")]
    InvertedRange {
        start_field: String,
        end_field: String,
    },

    /// One element of a collection is invalid.
    #[error("{collection}[{index}]: {field} is required")]
    MissingInItem {
        collection: String,
        index: usize,
        field: String,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientCartValue {
            cart_value: 80.0,
            min_cart_value: 100.0,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient cart value: 80 is below the minimum of 100"
        );

        assert_eq!(CoreError::Expired.to_string(), "This coupon has expired");
        assert_eq!(
            CoreError::Unsupported(CouponType::BxGy).to_string(),
            "BxGy coupons cannot be applied: discount rules for this type are not supported"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "minCartValue".to_string(),
            context: "for cart-wise coupons".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "minCartValue is required for cart-wise coupons"
        );

        let err = ValidationError::InvertedRange {
            start_field: "startDate".to_string(),
            end_field: "endDate".to_string(),
        };
        assert_eq!(err.to_string(), "startDate should be earlier than endDate");
    }

    #[test]
    fn test_invalid_coupon_wraps_reason() {
        let err = CoreError::InvalidCoupon(ValidationError::Negative {
            field: "discountDetails.value".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Invalid input: discountDetails.value must not be negative"
        );
        assert!(!err.is_not_found());
        assert!(CoreError::CouponNotFound.is_not_found());
    }
}
