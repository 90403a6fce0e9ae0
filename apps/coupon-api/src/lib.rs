//! # Coupon API
//!
//! REST server for coupon management, discovery and redemption.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Coupon API Routes                               │
//! │                                                                         │
//! │  ┌──────────────────────┐  ┌──────────────────────┐  ┌──────────────┐  │
//! │  │  /api/v1/coupons     │  │  /api/v1 cart ops    │  │  /health     │  │
//! │  │                      │  │                      │  │              │  │
//! │  │ • POST   create      │  │ • POST /applicable-  │  │ • GET        │  │
//! │  │ • GET    list        │  │        coupons       │  │   DB ping    │  │
//! │  │ • GET    /{key}      │  │ • POST /apply-coupon │  │              │  │
//! │  │ • PUT    /{key}      │  │        /{key}        │  │              │  │
//! │  │ • DELETE /{key}      │  │                      │  │              │  │
//! │  └──────────┬───────────┘  └──────────┬───────────┘  └──────┬───────┘  │
//! │             └──────────────┬──────────┘                     │          │
//! │                            ▼                                ▼          │
//! │                     CouponService ──► CouponStore ──► SQLite           │
//! │                            │                                           │
//! │                            ▼                                           │
//! │                   coupon-core (validation, discounts)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `{key}` is a coupon id (UUID) or a coupon code.
//!
//! ## Configuration
//! See [`config::ApiConfig`]. Environment variables:
//! - `COUPON_HTTP_PORT` - HTTP port (default: 8080)
//! - `COUPON_DATABASE_PATH` - SQLite file (default: coupons.db)
//! - `COUPON_MAX_BODY_BYTES` - request body limit (default: 16384)
//! - `COUPON_FLOOR_CART_WISE_PRICES` - clamp cart-wise prices at zero

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;
pub mod services;

use std::sync::Arc;

use coupon_core::DiscountPolicy;
use coupon_db::Database;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use handlers::build_router;
pub use services::CouponService;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub coupons: CouponService,
    pub config: ApiConfig,
}

impl AppState {
    /// Wires the coupon service to the database and the configured policy.
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let policy = DiscountPolicy {
            floor_cart_wise_prices: config.floor_cart_wise_prices,
        };
        let coupons = CouponService::new(Arc::new(db.coupons()), policy);

        AppState {
            db,
            coupons,
            config,
        }
    }
}
