//! # coupon-db: Database Layer for the Coupon Service
//!
//! SQLite storage for coupons, through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Coupon Data Flow                                 │
//! │                                                                         │
//! │  CouponService (POST /apply-coupon/SAVE10)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     coupon-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  CouponStore  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (trait)      │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CouponRepo    │    │ 001_create_  │  │   │
//! │  │   │ WAL, pragmas  │    │ (SQLite impl) │    │   coupons    │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (coupons.db)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Opening the store, health reporting
//! - [`migrations`] - Embedded migrations and pending-migration check
//! - [`error`] - Database error types
//! - [`repository`] - `CouponStore` and its SQLite implementation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use coupon_db::{CouponStore, Database, DbConfig};
//!
//! let db = Database::open(DbConfig::new("coupons.db", 5)).await?;
//! let coupon = db.coupons().find_by_code("SAVE10").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DbHealth, Storage};

pub use repository::coupon::{generate_coupon_id, CouponRepository};
pub use repository::CouponStore;
