//! # Domain Types
//!
//! Core domain types used throughout the coupon service.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Coupon      │   │ DiscountDetails │   │ CouponConditions│       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  kind           │   │  minCartValue   │       │
//! │  │  code (business)│   │  value          │   │  products       │       │
//! │  │  type           │   │  maxValue       │   │  customerType   │       │
//! │  │  expiryDate     │   └─────────────────┘   │  seasonal window│       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CartItemPayload │──►│    CartItem     │──►│ DiscountedItem  │       │
//! │  │ (as received)   │   │ (validated)     │   │ (+discounted)   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every coupon has:
//! - `id`: UUID v4 - immutable, assigned by the store
//! - `code`: human-readable, unique, what shoppers type in
//!
//! Lookups accept either one, see [`CouponKey`].
//!
//! ## Wire Format
//! Field names are camelCase on the wire. The discount kind travels as
//! `discountDetails.type` (`kind` is accepted too).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{DEFAULT_PAGE, DEFAULT_PAGE_LIMIT};

// =============================================================================
// Coupon Type
// =============================================================================

/// Which discount algorithm a coupon uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum CouponType {
    /// Discount on the cart total, spread across items.
    #[serde(rename = "cart-wise")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "cart-wise"))]
    CartWise,
    /// Discount on matching products only.
    #[serde(rename = "product-wise")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "product-wise"))]
    ProductWise,
    /// Buy X get Y. Can be stored, cannot be applied.
    #[serde(rename = "BxGy")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "BxGy"))]
    BxGy,
}

impl CouponType {
    /// Wire spelling of the type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CouponType::CartWise => "cart-wise",
            CouponType::ProductWise => "product-wise",
            CouponType::BxGy => "BxGy",
        }
    }
}

impl fmt::Display for CouponType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Discount Details
// =============================================================================

/// How the discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// `value` is a percentage in 0..=100.
    Percentage,
    /// `value` is an absolute amount.
    Fixed,
}

/// The discount a coupon grants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountDetails {
    /// Percentage or fixed amount.
    #[serde(rename = "type", alias = "kind")]
    pub kind: DiscountKind,

    /// Percentage (0..=100) or absolute amount, never negative.
    pub value: f64,

    /// Cap for percentage discounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
}

impl DiscountDetails {
    /// Fixed-amount discount.
    pub fn fixed(value: f64) -> Self {
        DiscountDetails {
            kind: DiscountKind::Fixed,
            value,
            max_value: None,
        }
    }

    /// Percentage discount with an optional cap.
    pub fn percentage(value: f64, max_value: Option<f64>) -> Self {
        DiscountDetails {
            kind: DiscountKind::Percentage,
            value,
            max_value,
        }
    }
}

// =============================================================================
// Customer Type
// =============================================================================

/// Which customers a coupon targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    New,
    Existing,
    #[default]
    All,
}

impl CustomerType {
    /// Wire spelling of the type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CustomerType::New => "new",
            CustomerType::Existing => "existing",
            CustomerType::All => "all",
        }
    }
}

impl FromStr for CustomerType {
    type Err = ();

    /// Exact wire spellings only; anything else is not a known segment.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        [CustomerType::New, CustomerType::Existing, CustomerType::All]
            .into_iter()
            .find(|t| t.as_str() == raw)
            .ok_or(())
    }
}

// =============================================================================
// Conditions
// =============================================================================

/// Conditions of a stored coupon.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_cart_value: Option<f64>,
    #[serde(default)]
    pub applicable_products: Vec<String>,
    #[serde(default)]
    pub customer_type: CustomerType,
    #[serde(default)]
    pub seasonal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl CouponConditions {
    /// Checks the seasonal window. Non-seasonal coupons are always in season.
    ///
    /// A seasonal coupon with an incomplete window is never in season.
    pub fn in_season(&self, now: DateTime<Utc>) -> bool {
        if !self.seasonal {
            return true;
        }
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= now && now <= end,
            _ => false,
        }
    }
}

/// Conditions as they arrive in a create/update request.
///
/// Differs from [`CouponConditions`] only in that `applicableProducts` may be
/// absent, which product-wise coupons must reject.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionConditions {
    #[serde(default)]
    pub min_cart_value: Option<f64>,
    #[serde(default)]
    pub applicable_products: Option<Vec<String>>,
    #[serde(default)]
    pub customer_type: CustomerType,
    #[serde(default)]
    pub seasonal: bool,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

impl From<DefinitionConditions> for CouponConditions {
    fn from(c: DefinitionConditions) -> Self {
        CouponConditions {
            min_cart_value: c.min_cart_value,
            applicable_products: c.applicable_products.unwrap_or_default(),
            customer_type: c.customer_type,
            seasonal: c.seasonal,
            start_date: c.start_date,
            end_date: c.end_date,
        }
    }
}

// =============================================================================
// Coupon Definition (create / update body)
// =============================================================================

/// A coupon definition as submitted by a client.
///
/// Used for both create (code optional, generated if missing) and full-field
/// update (code optional, kept if missing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponDefinition {
    #[serde(default)]
    pub code: Option<String>,

    #[serde(rename = "type")]
    pub coupon_type: CouponType,

    pub discount_details: DiscountDetails,

    #[serde(default)]
    pub conditions: DefinitionConditions,

    pub expiry_date: DateTime<Utc>,
}

impl CouponDefinition {
    /// The supplied code, trimmed, or `None` when absent or blank.
    pub fn supplied_code(&self) -> Option<&str> {
        self.code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// A stored coupon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Unique business code.
    pub code: String,

    #[serde(rename = "type")]
    pub coupon_type: CouponType,

    pub discount_details: DiscountDetails,

    pub conditions: CouponConditions,

    /// The coupon stops working once now is past this instant.
    pub expiry_date: DateTime<Utc>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Builds a new coupon record from a validated definition.
    pub fn from_definition(
        id: String,
        code: String,
        definition: CouponDefinition,
        now: DateTime<Utc>,
    ) -> Self {
        Coupon {
            id,
            code,
            coupon_type: definition.coupon_type,
            discount_details: definition.discount_details,
            conditions: definition.conditions.into(),
            expiry_date: definition.expiry_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Derives the lifecycle status at `now`.
    ///
    /// ## State Machine
    /// ```text
    /// Pending ──(startDate)──► Active ──(endDate)──► OutOfSeason
    ///    │                       │                        │
    ///    └───────────────────────┴─────(expiryDate)──────►└──► Expired
    /// ```
    /// Expiry wins over every seasonal state. Nothing here is persisted.
    pub fn status_at(&self, now: DateTime<Utc>) -> CouponStatus {
        if now > self.expiry_date {
            return CouponStatus::Expired;
        }
        if !self.conditions.seasonal {
            return CouponStatus::Active;
        }
        match (self.conditions.start_date, self.conditions.end_date) {
            (Some(start), _) if now < start => CouponStatus::Pending,
            (Some(_), Some(end)) if now <= end => CouponStatus::Active,
            _ => CouponStatus::OutOfSeason,
        }
    }
}

/// Lifecycle status of a coupon, computed from its timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponStatus {
    /// Seasonal, window not started yet.
    Pending,
    /// Usable.
    Active,
    /// Seasonal, window over (or never complete) but not expired.
    OutOfSeason,
    /// Past expiry. Terminal.
    Expired,
}

/// Projection returned by applicability discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicableCoupon {
    pub coupon_id: String,
    pub coupon_code: String,
    pub discount_details: DiscountDetails,
}

impl From<&Coupon> for ApplicableCoupon {
    fn from(coupon: &Coupon) -> Self {
        ApplicableCoupon {
            coupon_id: coupon.id.clone(),
            coupon_code: coupon.code.clone(),
            discount_details: coupon.discount_details.clone(),
        }
    }
}

// =============================================================================
// Coupon Key
// =============================================================================

/// Identifier-or-code lookup key.
///
/// Anything that parses as a UUID is an identifier; everything else is a code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponKey {
    Id(String),
    Code(String),
}

impl CouponKey {
    /// Classifies a raw path segment.
    ///
    /// ## Example
    /// ```rust
    /// use coupon_core::CouponKey;
    ///
    /// assert!(matches!(
    ///     CouponKey::parse("550e8400-e29b-41d4-a716-446655440000"),
    ///     CouponKey::Id(_)
    /// ));
    /// assert_eq!(CouponKey::parse("SAVE10"), CouponKey::Code("SAVE10".to_string()));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match Uuid::parse_str(raw) {
            Ok(id) => CouponKey::Id(id.to_string()),
            Err(_) => CouponKey::Code(raw.to_string()),
        }
    }
}

impl fmt::Display for CouponKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CouponKey::Id(id) => f.write_str(id),
            CouponKey::Code(code) => f.write_str(code),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A cart line as received. `productId` and `price` may be missing here;
/// [`crate::validation::validate_cart`] rejects such carts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemPayload {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    /// Any other fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A validated cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub price: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CartItem {
    pub fn new(product_id: impl Into<String>, price: f64) -> Self {
        CartItem {
            product_id: product_id.into(),
            price,
            extra: Map::new(),
        }
    }
}

/// A cart line with its discounted price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountedItem {
    #[serde(flatten)]
    pub item: CartItem,
    pub discounted_price: f64,
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of a listing. Pages start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    /// Parses raw query values, falling back to defaults for anything that
    /// is missing, non-numeric or zero.
    ///
    /// Only the leading integer counts, so `2.5` and `2abc` both mean 2.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        fn positive(raw: Option<&str>) -> Option<u32> {
            let raw = raw?.trim_start();
            let raw = raw.strip_prefix('+').unwrap_or(raw);
            let end = raw
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(raw.len());
            raw[..end].parse::<u32>().ok().filter(|v| *v > 0)
        }

        Page {
            page: positive(page).unwrap_or(DEFAULT_PAGE),
            limit: positive(limit).unwrap_or(DEFAULT_PAGE_LIMIT),
        }
    }

    /// Number of records to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.limit) * u64::from(self.page.saturating_sub(1))
    }
}

impl Default for Page {
    fn default() -> Self {
        Page {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
