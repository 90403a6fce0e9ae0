//! # HTTP Handlers
//!
//! Route table and the axum handlers behind it.
//!
//! ## Routes
//! ```text
//! /health                            GET     → health::health
//! /api/v1/coupons[/]                 GET     → coupons::list_coupons
//!                                    POST    → coupons::create_coupon
//! /api/v1/coupons/{key}              GET     → coupons::get_coupon
//!                                    PUT     → coupons::update_coupon
//!                                    DELETE  → coupons::delete_coupon
//! /api/v1/applicable-coupons         POST    → cart::applicable_coupons
//! /api/v1/apply-coupon/{key}         POST    → cart::apply_coupon
//! ```
//!
//! Layers, outermost first: CORS, request tracing, body limit.

pub mod cart;
pub mod coupons;
pub mod health;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Builds the application router over shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route(
            "/coupons",
            get(coupons::list_coupons).post(coupons::create_coupon),
        )
        .route(
            "/coupons/",
            get(coupons::list_coupons).post(coupons::create_coupon),
        )
        .route(
            "/coupons/{key}",
            get(coupons::get_coupon)
                .put(coupons::update_coupon)
                .delete(coupons::delete_coupon),
        )
        .route("/applicable-coupons", post(cart::applicable_coupons))
        .route("/apply-coupon/{key}", post(cart::apply_coupon));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/v1", api)
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Router Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use chrono::{Duration, Utc};
    use coupon_db::{Database, DbConfig};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::ApiConfig;

    async fn app() -> Router {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        build_router(Arc::new(AppState::new(db, ApiConfig::default())))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn expiry() -> String {
        (Utc::now() + Duration::days(30)).to_rfc3339()
    }

    fn ten_percent_capped() -> Value {
        json!({
            "code": "TEN",
            "type": "cart-wise",
            "discountDetails": { "type": "percentage", "value": 10, "maxValue": 50 },
            "conditions": { "minCartValue": 100 },
            "expiryDate": expiry(),
        })
    }

    #[tokio::test]
    async fn test_create_without_code() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/coupons",
            Some(json!({
                "type": "cart-wise",
                "discountDetails": { "type": "fixed", "value": 25 },
                "conditions": { "minCartValue": 200 },
                "expiryDate": expiry(),
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["statusCode"], 201);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Coupon created successfully");
        assert_eq!(body["data"]["code"].as_str().unwrap().len(), 12);
        assert_eq!(body["data"]["conditions"]["customerType"], "all");

        let id = body["data"]["id"].as_str().unwrap().to_string();
        let (status, body) = send(&app, Method::GET, &format!("/api/v1/coupons/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], id.as_str());
    }

    #[tokio::test]
    async fn test_list_with_and_without_trailing_slash() {
        let app = app().await;
        send(&app, Method::POST, "/api/v1/coupons/", Some(ten_percent_capped())).await;

        for uri in ["/api/v1/coupons", "/api/v1/coupons/?page=abc&limit=0"] {
            let (status, body) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["message"], "Coupons retrieved successfully");
            assert_eq!(body["data"].as_array().unwrap().len(), 1);
        }

        let (_, body) = send(&app, Method::GET, "/api/v1/coupons?page=2", None).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_coupon_is_404() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/api/v1/coupons/NOPE", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Coupon not found");
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/apply-coupon/NOPE",
            Some(json!({ "cartItems": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let app = app().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/coupons")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/coupons",
            Some(json!({
                "type": "bogo",
                "discountDetails": { "type": "fixed", "value": 1 },
                "expiryDate": expiry(),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().starts_with("Invalid input"));
    }

    #[tokio::test]
    async fn test_duplicate_code_is_400() {
        let app = app().await;
        let (status, _) =
            send(&app, Method::POST, "/api/v1/coupons", Some(ten_percent_capped())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) =
            send(&app, Method::POST, "/api/v1/coupons", Some(ten_percent_capped())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_apply_cart_wise() {
        let app = app().await;
        send(&app, Method::POST, "/api/v1/coupons", Some(ten_percent_capped())).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/apply-coupon/TEN",
            Some(json!({
                "cartItems": [
                    { "productId": "P1", "price": 200, "quantity": 1 },
                    { "productId": "P2", "price": 400 }
                ]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Coupon applied successfully");
        assert_eq!(body["data"][0]["discountedPrice"], 175.0);
        assert_eq!(body["data"][0]["quantity"], 1);
        assert_eq!(body["data"][1]["discountedPrice"], 375.0);
    }

    #[tokio::test]
    async fn test_apply_rejects_bad_cart_and_bxgy() {
        let app = app().await;
        send(
            &app,
            Method::POST,
            "/api/v1/coupons",
            Some(json!({
                "code": "B2G1",
                "type": "BxGy",
                "discountDetails": { "type": "fixed", "value": 0 },
                "expiryDate": expiry(),
            })),
        )
        .await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/apply-coupon/B2G1",
            Some(json!({ "cartItems": [{ "productId": "P1", "price": 10 }] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/apply-coupon/B2G1",
            Some(json!({ "cartItems": [{ "productId": "P1" }] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_applicable_coupons() {
        let app = app().await;
        send(&app, Method::POST, "/api/v1/coupons", Some(ten_percent_capped())).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/applicable-coupons",
            Some(json!({ "cartValue": 600, "applicableProducts": ["P1"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["couponCode"], "TEN");
        assert_eq!(body["data"][0]["discountDetails"]["maxValue"], 50.0);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/applicable-coupons",
            Some(json!({ "cartValue": 600 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Invalid input: cartValue must be a number and applicableProducts must be an array"
        );
    }

    #[tokio::test]
    async fn test_update_then_delete() {
        let app = app().await;
        send(&app, Method::POST, "/api/v1/coupons", Some(ten_percent_capped())).await;

        let mut update = ten_percent_capped();
        update["discountDetails"]["value"] = json!(20);
        update.as_object_mut().unwrap().remove("code");
        let (status, body) = send(&app, Method::PUT, "/api/v1/coupons/TEN", Some(update)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Coupon updated successfully");
        assert_eq!(body["data"]["code"], "TEN");
        assert_eq!(body["data"]["discountDetails"]["value"], 20.0);

        let (status, body) = send(&app, Method::DELETE, "/api/v1/coupons/TEN", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());

        let (status, _) = send(&app, Method::DELETE, "/api/v1/coupons/TEN", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let app = app().await;
        let padding = "x".repeat(ApiConfig::default().max_body_bytes + 1);
        let mut body = ten_percent_capped();
        body["padding"] = json!(padding);

        let (status, body) = send(&app, Method::POST, "/api/v1/coupons", Some(body)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["statusCode"], 413);
    }

    #[tokio::test]
    async fn test_health() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "serving");
        assert_eq!(body["data"]["database"], true);
        assert_eq!(body["data"]["schemaCurrent"], true);
    }

    #[tokio::test]
    async fn test_health_unavailable_when_store_closed() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let app = build_router(Arc::new(AppState::new(db.clone(), ApiConfig::default())));
        db.close().await;

        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["statusCode"], 503);
        assert_eq!(body["success"], false);
        assert_eq!(body["data"]["status"], "not_serving");
        assert_eq!(body["data"]["database"], false);
    }

    #[tokio::test]
    async fn test_unknown_customer_type_sees_open_coupons() {
        let app = app().await;
        send(&app, Method::POST, "/api/v1/coupons", Some(ten_percent_capped())).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/applicable-coupons",
            Some(json!({ "cartValue": 10, "applicableProducts": ["P1"], "customerType": "vip" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["couponCode"], "TEN");
    }

    #[tokio::test]
    async fn test_bad_query_and_path_use_envelope() {
        let app = app().await;

        let (status, body) = send(&app, Method::GET, "/api/v1/coupons?page=1&page=2", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());
        assert!(body["message"].as_str().unwrap().starts_with("Invalid input"));

        // %FF is not UTF-8, so the key cannot become a String.
        let (status, body) = send(&app, Method::GET, "/api/v1/coupons/%FF", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], 400);
        assert!(body["message"].as_str().unwrap().starts_with("Invalid input"));
    }

    #[tokio::test]
    async fn test_fractional_page_uses_integer_part() {
        let app = app().await;
        send(&app, Method::POST, "/api/v1/coupons", Some(ten_percent_capped())).await;

        let (_, body) = send(&app, Method::GET, "/api/v1/coupons?page=1.9&limit=5", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (_, body) = send(&app, Method::GET, "/api/v1/coupons?page=2.5", None).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }
}
