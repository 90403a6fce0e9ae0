//! # Coupon Repository
//!
//! SQLite implementation of [`CouponStore`].
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  coupons                                                                │
//! │  ─────────────────────────────────────────────────────────────────────  │
//! │  id, code (UNIQUE), coupon_type                                         │
//! │  discount_kind, discount_value, discount_max_value                      │
//! │  min_cart_value, applicable_products (JSON array), customer_type        │
//! │  seasonal, start_date, end_date                                         │
//! │  expiry_date, created_at, updated_at      (Unix millis, UTC)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Discovery Query
//! The applicability filter runs entirely in SQL. Product overlap is a join
//! of two `json_each` tables, so the product list never leaves SQLite:
//! ```text
//! expiry_date > :now
//! AND (seasonal = 0 OR start_date <= :now AND end_date >= :now)
//! AND (   min_cart_value <= :cart_value
//!      OR json_each(applicable_products) ∩ json_each(:products)
//!      OR customer_type IN ('all', :customer_type))
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use coupon_core::{
    ApplicabilityFilter, ApplicableCoupon, Coupon, CouponConditions, CouponDefinition, CouponKey,
    CouponType, CustomerType, DiscountDetails, DiscountKind, Page,
};

use super::CouponStore;
use crate::error::{DbError, DbResult};

/// Every column of `coupons`, in [`CouponRow`] order.
macro_rules! coupon_columns {
    () => {
        "id, code, coupon_type, \
         discount_kind, discount_value, discount_max_value, \
         min_cart_value, applicable_products, customer_type, \
         seasonal, start_date, end_date, \
         expiry_date, created_at, updated_at"
    };
}

/// Full-field update keyed on one column; the key is always `?1`.
macro_rules! update_coupon_where {
    ($column:literal) => {
        concat!(
            "UPDATE coupons SET \
                code = COALESCE(?2, code), \
                coupon_type = ?3, \
                discount_kind = ?4, \
                discount_value = ?5, \
                discount_max_value = ?6, \
                min_cart_value = ?7, \
                applicable_products = ?8, \
                customer_type = ?9, \
                seasonal = ?10, \
                start_date = ?11, \
                end_date = ?12, \
                expiry_date = ?13, \
                updated_at = ?14 \
             WHERE ",
            $column,
            " = ?1 RETURNING ",
            coupon_columns!()
        )
    };
}

// =============================================================================
// Statements
// =============================================================================

const SELECT_BY_ID: &str = concat!("SELECT ", coupon_columns!(), " FROM coupons WHERE id = ?1");

const SELECT_BY_CODE: &str =
    concat!("SELECT ", coupon_columns!(), " FROM coupons WHERE code = ?1");

const SELECT_PAGE: &str = concat!(
    "SELECT ",
    coupon_columns!(),
    " FROM coupons ORDER BY created_at, rowid LIMIT ?1 OFFSET ?2"
);

const INSERT_COUPON: &str = concat!(
    "INSERT INTO coupons (",
    coupon_columns!(),
    ") VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15) RETURNING ",
    coupon_columns!()
);

const UPDATE_BY_ID: &str = update_coupon_where!("id");
const UPDATE_BY_CODE: &str = update_coupon_where!("code");

const DELETE_BY_ID: &str = "DELETE FROM coupons WHERE id = ?1";
const DELETE_BY_CODE: &str = "DELETE FROM coupons WHERE code = ?1";

// =============================================================================
// Rows
// =============================================================================

/// A `coupons` row as stored.
#[derive(Debug, FromRow)]
struct CouponRow {
    id: String,
    code: String,
    coupon_type: CouponType,
    discount_kind: DiscountKind,
    discount_value: f64,
    discount_max_value: Option<f64>,
    min_cart_value: Option<f64>,
    applicable_products: String,
    customer_type: CustomerType,
    seasonal: bool,
    start_date: Option<i64>,
    end_date: Option<i64>,
    expiry_date: i64,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = DbError;

    fn try_from(row: CouponRow) -> DbResult<Self> {
        let applicable_products: Vec<String> = serde_json::from_str(&row.applicable_products)
            .map_err(|e| {
                DbError::Internal(format!(
                    "coupon {}: unreadable applicable_products: {e}",
                    row.id
                ))
            })?;

        Ok(Coupon {
            discount_details: DiscountDetails {
                kind: row.discount_kind,
                value: row.discount_value,
                max_value: row.discount_max_value,
            },
            conditions: CouponConditions {
                min_cart_value: row.min_cart_value,
                applicable_products,
                customer_type: row.customer_type,
                seasonal: row.seasonal,
                start_date: row.start_date.map(from_millis).transpose()?,
                end_date: row.end_date.map(from_millis).transpose()?,
            },
            expiry_date: from_millis(row.expiry_date)?,
            created_at: from_millis(row.created_at)?,
            updated_at: from_millis(row.updated_at)?,
            id: row.id,
            code: row.code,
            coupon_type: row.coupon_type,
        })
    }
}

/// The discovery projection.
#[derive(Debug, FromRow)]
struct ApplicableRow {
    id: String,
    code: String,
    discount_kind: DiscountKind,
    discount_value: f64,
    discount_max_value: Option<f64>,
}

impl From<ApplicableRow> for ApplicableCoupon {
    fn from(row: ApplicableRow) -> Self {
        ApplicableCoupon {
            coupon_id: row.id,
            coupon_code: row.code,
            discount_details: DiscountDetails {
                kind: row.discount_kind,
                value: row.discount_value,
                max_value: row.discount_max_value,
            },
        }
    }
}

fn from_millis(millis: i64) -> DbResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| DbError::Internal(format!("timestamp out of range: {millis}")))
}

fn products_json(products: &[String]) -> DbResult<String> {
    serde_json::to_string(products).map_err(|e| DbError::Internal(e.to_string()))
}

/// The statement matching a key's column, and the value to bind as `?1`.
fn keyed<'k>(
    key: &'k CouponKey,
    by_id: &'static str,
    by_code: &'static str,
) -> (&'static str, &'k str) {
    match key {
        CouponKey::Id(id) => (by_id, id.as_str()),
        CouponKey::Code(code) => (by_code, code.as_str()),
    }
}

/// Reports a taken code with the code itself rather than "unknown".
fn code_conflict(code: &str) -> impl FnOnce(sqlx::Error) -> DbError + '_ {
    move |err| match DbError::from(err) {
        DbError::UniqueViolation { field, .. } if field.ends_with("code") => {
            DbError::duplicate("code", code)
        }
        other => other,
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for coupon database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = CouponRepository::new(pool);
///
/// let coupon = repo.find(&CouponKey::parse("SAVE10")).await?;
/// let page = repo.list(Page::default()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    /// Creates a new CouponRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    async fn find_one(&self, sql: &'static str, value: &str) -> DbResult<Option<Coupon>> {
        let row = sqlx::query_as::<_, CouponRow>(sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Coupon::try_from).transpose()
    }

    /// Counts stored coupons (for diagnostics and the seed tool).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupons")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl CouponStore for CouponRepository {
    async fn find_by_id(&self, id: &str) -> DbResult<Option<Coupon>> {
        debug!(id = %id, "Finding coupon by id");
        self.find_one(SELECT_BY_ID, id).await
    }

    async fn find_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        debug!(code = %code, "Finding coupon by code");
        self.find_one(SELECT_BY_CODE, code).await
    }

    async fn find_applicable(
        &self,
        filter: &ApplicabilityFilter,
    ) -> DbResult<Vec<ApplicableCoupon>> {
        debug!(
            cart_value = filter.cart_value,
            products = filter.products.len(),
            customer_type = ?filter.customer_type,
            "Finding applicable coupons"
        );

        let rows = sqlx::query_as::<_, ApplicableRow>(
            r#"
            SELECT id, code, discount_kind, discount_value, discount_max_value
            FROM coupons
            WHERE expiry_date > ?1
            AND (seasonal = 0 OR (start_date <= ?1 AND end_date >= ?1))
            AND (
                (min_cart_value IS NOT NULL AND min_cart_value <= ?2)
                OR EXISTS (
                    SELECT 1 FROM json_each(coupons.applicable_products) AS p
                    WHERE p.value IN (SELECT value FROM json_each(?3))
                )
                OR customer_type = 'all'
                OR customer_type = ?4
            )
            ORDER BY created_at, rowid
            "#,
        )
        .bind(filter.now.timestamp_millis())
        .bind(filter.cart_value)
        .bind(products_json(&filter.products)?)
        .bind(filter.customer_type)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Discovery returned coupons");
        Ok(rows.into_iter().map(ApplicableCoupon::from).collect())
    }

    async fn list(&self, page: Page) -> DbResult<Vec<Coupon>> {
        debug!(page = page.page, limit = page.limit, "Listing coupons");

        // SQLite integers are i64; a page past i64::MAX is simply empty.
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, CouponRow>(SELECT_PAGE)
            .bind(i64::from(page.limit))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Coupon::try_from).collect()
    }

    async fn insert(&self, coupon: &Coupon) -> DbResult<Coupon> {
        debug!(code = %coupon.code, "Inserting coupon");

        let conditions = &coupon.conditions;

        let row = sqlx::query_as::<_, CouponRow>(INSERT_COUPON)
            .bind(&coupon.id)
            .bind(&coupon.code)
            .bind(coupon.coupon_type)
            .bind(coupon.discount_details.kind)
            .bind(coupon.discount_details.value)
            .bind(coupon.discount_details.max_value)
            .bind(conditions.min_cart_value)
            .bind(products_json(&conditions.applicable_products)?)
            .bind(conditions.customer_type)
            .bind(conditions.seasonal)
            .bind(conditions.start_date.map(|d| d.timestamp_millis()))
            .bind(conditions.end_date.map(|d| d.timestamp_millis()))
            .bind(coupon.expiry_date.timestamp_millis())
            .bind(coupon.created_at.timestamp_millis())
            .bind(coupon.updated_at.timestamp_millis())
            .fetch_one(&self.pool)
            .await
            .map_err(code_conflict(&coupon.code))?;

        info!(id = %coupon.id, code = %coupon.code, "Coupon created");
        Coupon::try_from(row)
    }

    async fn update(&self, key: &CouponKey, definition: &CouponDefinition) -> DbResult<Coupon> {
        debug!(key = %key, "Updating coupon");

        let (sql, value) = keyed(key, UPDATE_BY_ID, UPDATE_BY_CODE);

        let code = definition.supplied_code();
        let details = &definition.discount_details;
        let conditions = &definition.conditions;
        let products = conditions.applicable_products.as_deref().unwrap_or_default();

        let row = sqlx::query_as::<_, CouponRow>(sql)
            .bind(value)
            .bind(code)
            .bind(definition.coupon_type)
            .bind(details.kind)
            .bind(details.value)
            .bind(details.max_value)
            .bind(conditions.min_cart_value)
            .bind(products_json(products)?)
            .bind(conditions.customer_type)
            .bind(conditions.seasonal)
            .bind(conditions.start_date.map(|d| d.timestamp_millis()))
            .bind(conditions.end_date.map(|d| d.timestamp_millis()))
            .bind(definition.expiry_date.timestamp_millis())
            .bind(Utc::now().timestamp_millis())
            .fetch_optional(&self.pool)
            .await
            .map_err(code_conflict(code.unwrap_or(value)))?;

        let Some(row) = row else {
            return Err(DbError::not_found("Coupon", value));
        };

        info!(id = %row.id, code = %row.code, "Coupon updated");
        Coupon::try_from(row)
    }

    async fn delete(&self, key: &CouponKey) -> DbResult<()> {
        debug!(key = %key, "Deleting coupon");

        let (sql, value) = keyed(key, DELETE_BY_ID, DELETE_BY_CODE);

        let result = sqlx::query(sql).bind(value).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", value));
        }

        info!(key = %key, "Coupon deleted");
        Ok(())
    }
}

/// Helper to generate a new coupon ID.
pub fn generate_coupon_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
