//! # coupon-core: Pure Business Logic for the Coupon Service
//!
//! Everything the service decides about coupons lives here, as pure functions
//! with no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Coupon Service Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    coupon-api (axum)                            │   │
//! │  │   /coupons  ──  /applicable-coupons  ──  /apply-coupon/{key}   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ coupon-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌─────────────┐  ┌───────────┐  ┌─────────┐  │   │
//! │  │   │ validation│  │applicability│  │ discount  │  │  code   │  │   │
//! │  │   │ definition│  │   filter    │  │ cart-wise │  │ A-Z0-9  │  │   │
//! │  │   │ usable    │  │  predicate  │  │ product-  │  │         │  │   │
//! │  │   │ cart      │  │             │  │   wise    │  │         │  │   │
//! │  │   └───────────┘  └─────────────┘  └───────────┘  └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  coupon-db (Database Layer)                     │   │
//! │  │           SQLite queries, migrations, CouponStore               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Coupon, CartItem, CouponKey, Page)
//! - [`validation`] - Definition, use-time and cart checks
//! - [`applicability`] - Discovery predicate for a cart
//! - [`discount`] - Per-item discounted prices
//! - [`code`] - Coupon code generation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: "now" is always a parameter, never read inside
//! 2. **No I/O**: storage is behind `coupon-db`'s `CouponStore`
//! 3. **Explicit Errors**: every rejection is a typed [`CoreError`]
//!
//! ## Example Usage
//!
//! ```rust
//! use coupon_core::discount::cart_discount;
//! use coupon_core::DiscountDetails;
//!
//! // 10% of 600, capped at 50
//! let details = DiscountDetails::percentage(10.0, Some(50.0));
//! assert_eq!(cart_discount(&details, 600.0), 50.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod applicability;
pub mod code;
pub mod discount;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use applicability::{build_applicability_filter, ApplicabilityFilter};
pub use code::generate_coupon_code;
pub use discount::{apply_coupon, DiscountPolicy};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Length of generated coupon codes.
pub const COUPON_CODE_LENGTH: usize = 12;

/// Characters generated codes are drawn from.
pub const COUPON_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// First page of a listing.
pub const DEFAULT_PAGE: u32 = 1;

/// Listing page size when the client does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;
