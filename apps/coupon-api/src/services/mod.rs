//! Service layer: request-level operations over the store and the core rules.

pub mod coupon_service;

pub use coupon_service::{ApplicableCouponsRequest, ApplyCouponRequest, CouponService};
