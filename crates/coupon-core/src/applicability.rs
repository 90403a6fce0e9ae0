//! # Applicability Discovery
//!
//! Builds the predicate that picks "coupons worth showing" for a cart.
//!
//! ## Predicate
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  expiryDate > now                                                       │
//! │  AND (NOT seasonal OR startDate <= now <= endDate)                      │
//! │  AND (    minCartValue <= cartValue                                     │
//! │        OR applicableProducts ∩ cartProducts ≠ ∅                         │
//! │        OR customerType ∈ {requested, all} )                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This is a preview. A coupon that matches only on customer type may still
//! fail its minimum cart value at apply time; redemption re-checks everything
//! through [`crate::validation::validate_usable`] and the discount engine.
//!
//! The store turns an [`ApplicabilityFilter`] into its own query language;
//! [`ApplicabilityFilter::matches`] is the reference semantics that query
//! must agree with.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::types::{Coupon, CustomerType};

/// Discovery predicate for one cart.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicabilityFilter {
    /// Evaluation instant.
    pub now: DateTime<Utc>,
    /// Cart total.
    pub cart_value: f64,
    /// Product ids in the cart, deduplicated, in first-seen order.
    pub products: Vec<String>,
    /// Customer type of the shopper, if known.
    pub customer_type: Option<CustomerType>,
}

/// Builds the discovery filter for a cart.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use coupon_core::applicability::build_applicability_filter;
///
/// let filter = build_applicability_filter(
///     250.0,
///     vec!["P1".to_string(), "P1".to_string(), "P2".to_string()],
///     None,
///     Utc::now(),
/// );
/// assert_eq!(filter.products, vec!["P1", "P2"]);
/// ```
pub fn build_applicability_filter(
    cart_value: f64,
    applicable_products: Vec<String>,
    customer_type: Option<CustomerType>,
    now: DateTime<Utc>,
) -> ApplicabilityFilter {
    let mut seen = HashSet::new();
    let products = applicable_products
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect();

    ApplicabilityFilter {
        now,
        cart_value,
        products,
        customer_type,
    }
}

impl ApplicabilityFilter {
    /// Evaluates the predicate against one coupon.
    pub fn matches(&self, coupon: &Coupon) -> bool {
        self.is_current(coupon) && self.is_relevant(coupon)
    }

    /// Unexpired and in season.
    fn is_current(&self, coupon: &Coupon) -> bool {
        coupon.expiry_date > self.now && coupon.conditions.in_season(self.now)
    }

    /// At least one of the three independent clauses.
    fn is_relevant(&self, coupon: &Coupon) -> bool {
        let conditions = &coupon.conditions;

        let meets_value = conditions
            .min_cart_value
            .is_some_and(|min| min <= self.cart_value);

        let shares_product = conditions
            .applicable_products
            .iter()
            .any(|p| self.products.contains(p));

        let targets_customer = conditions.customer_type == CustomerType::All
            || Some(conditions.customer_type) == self.customer_type;

        meets_value || shares_product || targets_customer
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
