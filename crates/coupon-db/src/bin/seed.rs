//! # Seed Data Generator
//!
//! Populates the database with sample coupons for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./coupons_dev.db
//! cargo run -p coupon-db --bin seed
//!
//! # Specify database path
//! cargo run -p coupon-db --bin seed -- --db ./data/coupons.db
//! ```
//!
//! ## Generated Coupons
//! One of each kind the service knows about:
//! - cart-wise percentage with a cap, and cart-wise fixed
//! - product-wise fixed and product-wise percentage
//! - a seasonal cart-wise coupon running around today
//! - a new-customer welcome coupon
//! - a BxGy coupon (stored only, cannot be applied)

use chrono::{DateTime, Duration, Utc};
use coupon_core::validation::validate_definition;
use coupon_core::{
    Coupon, CouponDefinition, CouponType, CustomerType, DefinitionConditions, DiscountDetails,
};
use coupon_db::{generate_coupon_id, CouponStore, Database, DbConfig};
use std::env;

/// Builds the sample definitions relative to `now`.
fn sample_definitions(now: DateTime<Utc>) -> Vec<CouponDefinition> {
    let in_days = |days: i64| now + Duration::days(days);
    let products = |ids: &[&str]| Some(ids.iter().map(|id| id.to_string()).collect());

    vec![
        CouponDefinition {
            code: Some("SAVE10".to_string()),
            coupon_type: CouponType::CartWise,
            discount_details: DiscountDetails::percentage(10.0, Some(50.0)),
            conditions: DefinitionConditions {
                min_cart_value: Some(100.0),
                ..Default::default()
            },
            expiry_date: in_days(90),
        },
        CouponDefinition {
            code: Some("FLAT25".to_string()),
            coupon_type: CouponType::CartWise,
            discount_details: DiscountDetails::fixed(25.0),
            conditions: DefinitionConditions {
                min_cart_value: Some(250.0),
                customer_type: CustomerType::Existing,
                ..Default::default()
            },
            expiry_date: in_days(60),
        },
        CouponDefinition {
            code: Some("TEA20".to_string()),
            coupon_type: CouponType::ProductWise,
            discount_details: DiscountDetails::fixed(20.0),
            conditions: DefinitionConditions {
                applicable_products: products(&["P1", "P2"]),
                ..Default::default()
            },
            expiry_date: in_days(30),
        },
        CouponDefinition {
            code: Some("SNACKS15".to_string()),
            coupon_type: CouponType::ProductWise,
            discount_details: DiscountDetails::percentage(15.0, None),
            conditions: DefinitionConditions {
                applicable_products: products(&["P3", "P4", "P5"]),
                customer_type: CustomerType::Existing,
                ..Default::default()
            },
            expiry_date: in_days(45),
        },
        CouponDefinition {
            code: Some("SEASON30".to_string()),
            coupon_type: CouponType::CartWise,
            discount_details: DiscountDetails::percentage(30.0, Some(100.0)),
            conditions: DefinitionConditions {
                min_cart_value: Some(200.0),
                seasonal: true,
                start_date: Some(in_days(-7)),
                end_date: Some(in_days(7)),
                ..Default::default()
            },
            expiry_date: in_days(14),
        },
        CouponDefinition {
            code: Some("WELCOME".to_string()),
            coupon_type: CouponType::CartWise,
            discount_details: DiscountDetails::fixed(10.0),
            conditions: DefinitionConditions {
                min_cart_value: Some(0.0),
                customer_type: CustomerType::New,
                ..Default::default()
            },
            expiry_date: in_days(365),
        },
        CouponDefinition {
            // No code: one is generated.
            code: None,
            coupon_type: CouponType::BxGy,
            discount_details: DiscountDetails::fixed(0.0),
            conditions: DefinitionConditions {
                applicable_products: products(&["P1"]),
                ..Default::default()
            },
            expiry_date: in_days(30),
        },
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./coupons_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Coupon Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./coupons_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Coupon Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::open(DbConfig::new(&db_path, 1)).await?;
    let coupons = db.coupons();

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = coupons.count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} coupons", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Inserting coupons...");

    let now = Utc::now();
    let mut generated = 0;

    for definition in sample_definitions(now) {
        validate_definition(&definition)?;

        let code = definition
            .supplied_code()
            .map(str::to_string)
            .unwrap_or_else(coupon_core::generate_coupon_code);
        let coupon = Coupon::from_definition(generate_coupon_id(), code, definition, now);

        match coupons.insert(&coupon).await {
            Ok(stored) => {
                println!("  {:<14} {}", stored.code, stored.coupon_type);
                generated += 1;
            }
            Err(e) => eprintln!("Failed to insert {}: {}", coupon.code, e),
        }
    }

    println!();
    println!("✓ Seed complete! {} coupons inserted", generated);

    db.close().await;
    Ok(())
}
