//! End-to-end API tests: real router, in-memory SQLite, no socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use stockbook_db::{Database, DbConfig};
use stockbook_server::config::ServerConfig;
use stockbook_server::{app, AppState};

async fn test_app() -> Router {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");
    app(Arc::new(AppState {
        db,
        config: ServerConfig::default(),
    }))
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_product(router: &Router, name: &str, quantity: i64, cost: i64, sell: i64) -> String {
    let (status, body) = send(
        router,
        "POST",
        "/products",
        Some(json!({
            "name": name,
            "quantity": quantity,
            "costPriceCents": cost,
            "sellingPriceCents": sell,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let router = test_app().await;
    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn product_crud_roundtrip() {
    let router = test_app().await;

    let id = create_product(&router, "Widget", 3, 3000, 5000).await;

    let (status, listed) = send(&router, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    // quantity 3 <= default threshold 5
    assert_eq!(listed[0]["lowStock"], true);
    assert_eq!(listed[0]["categoryName"], Value::Null);

    let (status, fetched) = send(&router, "GET", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Widget");

    let (status, _) = send(
        &router,
        "PUT",
        &format!("/products/{id}"),
        Some(json!({
            "name": "Widget Pro",
            "quantity": 30,
            "costPriceCents": 3200,
            "sellingPriceCents": 5500,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, "DELETE", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&router, "GET", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_product_payload_rejected() {
    let router = test_app().await;

    let (status, body) = send(
        &router,
        "POST",
        "/products",
        Some(json!({
            "name": "",
            "costPriceCents": 100,
            "sellingPriceCents": 200,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn duplicate_category_name_rejected() {
    let router = test_app().await;

    let payload = json!({"name": "Tools"});
    let (status, _) = send(&router, "POST", "/categories", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&router, "POST", "/categories", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE");
}

#[tokio::test]
async fn sale_applies_and_decrements_stock() {
    let router = test_app().await;
    let product_id = create_product(&router, "Widget", 10, 3000, 5000).await;

    let (status, body) = send(
        &router,
        "POST",
        "/transactions",
        Some(json!({
            "kind": "sale",
            "items": [{"productId": product_id, "quantity": 3, "unitPriceCents": 5000}],
            "partyName": "Alice",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["totalCents"], 15000);
    assert_eq!(body["items"][0]["unitCostCents"], 3000);
    assert_eq!(body["items"][0]["productName"], "Widget");

    let (_, product) = send(&router, "GET", &format!("/products/{product_id}"), None).await;
    assert_eq!(product["quantity"], 7);
}

#[tokio::test]
async fn oversell_returns_400_with_code() {
    let router = test_app().await;
    let product_id = create_product(&router, "Widget", 2, 3000, 5000).await;

    let (status, body) = send(
        &router,
        "POST",
        "/transactions",
        Some(json!({
            "kind": "sale",
            "items": [{"productId": product_id, "quantity": 5, "unitPriceCents": 5000}],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");

    // Nothing was applied.
    let (_, product) = send(&router, "GET", &format!("/products/{product_id}"), None).await;
    assert_eq!(product["quantity"], 2);
    let (_, listed) = send(&router, "GET", "/transactions", None).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_product_returns_404() {
    let router = test_app().await;

    let (status, body) = send(
        &router,
        "POST",
        "/transactions",
        Some(json!({
            "kind": "sale",
            "items": [{"productId": "no-such-id", "quantity": 1, "unitPriceCents": 100}],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn dashboard_summary_with_explicit_range() {
    let router = test_app().await;
    let product_id = create_product(&router, "Widget", 100, 3000, 5000).await;

    let (status, _) = send(
        &router,
        "POST",
        "/transactions",
        Some(json!({
            "kind": "sale",
            "items": [{"productId": product_id, "quantity": 2, "unitPriceCents": 5000}],
            "discountCents": 500,
            "date": "2024-06-15T12:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &router,
        "POST",
        "/expenses",
        Some(json!({
            "title": "Rent",
            "amountCents": 3000,
            "date": "2024-06-01T09:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &router,
        "GET",
        "/dashboard/summary?startDate=2024-06-01&endDate=2024-06-30",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currency"], "USD");
    assert_eq!(body["revenueCents"], 9500);
    // (5000-3000)*2 - 500
    assert_eq!(body["profitCents"], 3500);
    assert_eq!(body["expensesCents"], 3000);
    assert_eq!(body["lossCents"], 0);
    assert_eq!(body["stockByCategory"][0]["categoryName"], "Uncategorized");
}

#[tokio::test]
async fn dashboard_defaults_to_current_month() {
    let router = test_app().await;
    let (status, body) = send(&router, "GET", "/dashboard/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revenueCents"], 0);
    assert!(body["period"]["startDate"].is_string());
}

#[tokio::test]
async fn dashboard_rejects_half_supplied_range() {
    let router = test_app().await;
    let (status, body) = send(
        &router,
        "GET",
        "/dashboard/summary?startDate=2024-06-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_DATE");
}

#[tokio::test]
async fn logs_drilldown_and_search() {
    let router = test_app().await;
    let product_id = create_product(&router, "Widget", 100, 3000, 5000).await;

    let (status, _) = send(
        &router,
        "POST",
        "/transactions",
        Some(json!({
            "kind": "sale",
            "items": [{"productId": product_id, "quantity": 1, "unitPriceCents": 5000}],
            "partyName": "Alice",
            "date": "2024-02-14T09:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, years) = send(&router, "GET", "/logs/years", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(years, json!([2024]));

    let (status, months) = send(&router, "GET", "/logs/2024", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(months[0]["month"], 2);
    assert_eq!(months[0]["transactionCount"], 1);

    let (status, days) = send(&router, "GET", "/logs/2024/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(days[0]["day"], 14);

    let (status, detail) = send(&router, "GET", "/logs/2024/2/14", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail.as_array().unwrap().len(), 1);

    // Search with no filter returns nothing by contract.
    let (status, empty) = send(&router, "GET", "/logs/search", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(empty.as_array().unwrap().is_empty());

    let (status, found) = send(&router, "GET", "/logs/search?q=alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["partyName"], "Alice");
}

#[tokio::test]
async fn invalid_month_rejected() {
    let router = test_app().await;
    let (status, body) = send(&router, "GET", "/logs/2024/13", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_DATE");
}
