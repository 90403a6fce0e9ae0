//! # Repository Module
//!
//! Storage interface for coupons and its SQLite implementation.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CouponService (coupon-api)                                            │
//! │       │                                                                 │
//! │       │  store.find(&CouponKey::parse("SAVE10"))                       │
//! │       ▼                                                                 │
//! │  Arc<dyn CouponStore>                                                  │
//! │  ├── find_by_id / find_by_code / find                                  │
//! │  ├── find_applicable(&ApplicabilityFilter)                             │
//! │  ├── list(Page)                                                        │
//! │  └── insert / update / delete                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CouponRepository ──► SQLite                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CouponRepository`](coupon::CouponRepository) - SQLite-backed [`CouponStore`]

use async_trait::async_trait;

use coupon_core::{ApplicabilityFilter, ApplicableCoupon, Coupon, CouponDefinition, CouponKey, Page};

use crate::error::DbResult;

pub mod coupon;

/// Persistence contract for coupons.
///
/// Code uniqueness is the store's job: inserting or renaming to a taken code
/// fails with [`DbError::UniqueViolation`](crate::DbError::UniqueViolation).
#[async_trait]
pub trait CouponStore: Send + Sync {
    /// Looks a coupon up by its identifier.
    async fn find_by_id(&self, id: &str) -> DbResult<Option<Coupon>>;

    /// Looks a coupon up by its code.
    async fn find_by_code(&self, code: &str) -> DbResult<Option<Coupon>>;

    /// Looks a coupon up by identifier or code.
    async fn find(&self, key: &CouponKey) -> DbResult<Option<Coupon>> {
        match key {
            CouponKey::Id(id) => self.find_by_id(id).await,
            CouponKey::Code(code) => self.find_by_code(code).await,
        }
    }

    /// Coupons selected by the discovery filter, projected.
    async fn find_applicable(&self, filter: &ApplicabilityFilter)
        -> DbResult<Vec<ApplicableCoupon>>;

    /// One page of coupons in creation order.
    async fn list(&self, page: Page) -> DbResult<Vec<Coupon>>;

    /// Stores a new coupon and returns it as persisted.
    async fn insert(&self, coupon: &Coupon) -> DbResult<Coupon>;

    /// Replaces every field of an existing coupon.
    ///
    /// An absent code keeps the current one. Fails with `NotFound` when
    /// nothing matches `key`.
    async fn update(&self, key: &CouponKey, definition: &CouponDefinition) -> DbResult<Coupon>;

    /// Deletes a coupon. Fails with `NotFound` when nothing matches `key`.
    async fn delete(&self, key: &CouponKey) -> DbResult<()>;
}
