//! End-to-end tests for the /products API, driving the router in-process
//! against the in-memory repository.

#![cfg(feature = "http-server")]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use product_service::db::{services, LocalRepository, ProductRepository};
use product_service::http::{create_router, AppState};

async fn setup_with_pool(max_size: u32) -> (Router, Arc<LocalRepository>) {
    let repo = Arc::new(LocalRepository::with_pool_size(max_size));
    services::bootstrap(repo.as_ref()).await.unwrap();
    let router = create_router(AppState::new(repo.clone()));
    (router, repo)
}

async fn setup() -> (Router, Arc<LocalRepository>) {
    setup_with_pool(10).await
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    read_response(app.clone().oneshot(request).await.unwrap()).await
}

async fn read_response(response: axum::response::Response) -> (StatusCode, Value) {
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

async fn create(app: &Router, name: &str, price: f64, stock: i64) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/products",
        Some(json!({"productName": name, "price": price, "stock": stock})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", body);
    body["data"].clone()
}

#[tokio::test]
async fn test_list_empty() {
    let (app, _) = setup().await;
    let (status, body) = send(&app, Method::GET, "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "data": [], "count": 0}));
}

#[tokio::test]
async fn test_create_widget() {
    let (app, _) = setup().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({"productName": "Widget", "price": 9.99, "stock": 5})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Product created successfully"));
    assert_eq!(body["data"]["name"], json!("Widget"));
    assert_eq!(body["data"]["price"], json!(9.99));
    assert_eq!(body["data"]["stock"], json!(5));
    assert!(body["data"]["id"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_created_product_reads_back_identically() {
    let (app, _) = setup().await;
    let created = create(&app, "Gizmo", 12.5, 3).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::GET, &format!("/products/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "data": created}));
}

#[tokio::test]
async fn test_created_ids_are_fresh() {
    let (app, _) = setup().await;
    let first = create(&app, "A", 1.0, 1).await["id"].as_i64().unwrap();
    let second = create(&app, "B", 1.0, 1).await["id"].as_i64().unwrap();
    assert!(first > 0);
    assert!(second > first);
}

#[tokio::test]
async fn test_create_with_negative_price_persists_nothing() {
    let (app, _) = setup().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({"productName": "Bad", "price": -1, "stock": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "message": "Price must be positive and stock cannot be negative"})
    );

    let (_, list) = send(&app, Method::GET, "/products", None).await;
    assert_eq!(list["count"], json!(0));
}

#[tokio::test]
async fn test_create_range_checks() {
    let (app, _) = setup().await;
    for body in [
        json!({"productName": "Zero", "price": 0, "stock": 5}),
        json!({"productName": "Neg", "price": 1.0, "stock": -1}),
    ] {
        let (status, response) = send(&app, Method::POST, "/products", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response["message"],
            json!("Price must be positive and stock cannot be negative")
        );
    }

    // Zero stock is present and in range.
    let created = create(&app, "Empty shelf", 4.0, 0).await;
    assert_eq!(created["stock"], json!(0));
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let (app, _) = setup().await;
    for body in [
        json!({"price": 1.0, "stock": 1}),
        json!({"productName": "A", "stock": 1}),
        json!({"productName": "A", "price": 1.0}),
        json!({"productName": "A", "price": null, "stock": 1}),
        json!({}),
    ] {
        let (status, response) = send(&app, Method::POST, "/products", Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(
            response,
            json!({"success": false, "message": "All fields are required"})
        );
    }

    let (_, list) = send(&app, Method::GET, "/products", None).await;
    assert_eq!(list["count"], json!(0));
}

#[tokio::test]
async fn test_get_nonexistent() {
    let (app, _) = setup().await;
    let (status, body) = send(&app, Method::GET, "/products/99999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "message": "Product not found"}));
}

#[tokio::test]
async fn test_update_then_delete_lifecycle() {
    let (app, _) = setup().await;
    let created = create(&app, "Widget", 9.99, 5).await;
    let uri = format!("/products/{}", created["id"]);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"productName": "Widget Pro", "price": 19.5, "stock": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Product updated successfully"));
    assert_eq!(
        body["data"],
        json!({"id": created["id"], "name": "Widget Pro", "price": 19.5, "stock": 2})
    );

    let (_, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched["data"], body["data"]);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Product deleted successfully"})
    );

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_nonexistent_leaves_store_unchanged() {
    let (app, _) = setup().await;
    let created = create(&app, "Keep", 3.0, 3).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/products/424242",
        Some(json!({"productName": "Other", "price": 1.0, "stock": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Product not found"));

    let (_, list) = send(&app, Method::GET, "/products", None).await;
    assert_eq!(list["data"], json!([created]));
}

#[tokio::test]
async fn test_update_validates_body() {
    let (app, _) = setup().await;
    let created = create(&app, "Keep", 3.0, 3).await;
    let uri = format!("/products/{}", created["id"]);

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({"productName": "X"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("All fields are required"));

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"productName": "X", "price": -2, "stock": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched["data"], created);
}

#[tokio::test]
async fn test_delete_removes_exactly_one_row() {
    let (app, _) = setup().await;
    let a = create(&app, "A", 1.0, 1).await;
    let b = create(&app, "B", 2.0, 2).await;

    let (status, _) = send(&app, Method::DELETE, &format!("/products/{}", a["id"]), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = send(&app, Method::GET, "/products", None).await;
    assert_eq!(list, json!({"success": true, "data": [b], "count": 1}));

    let (status, body) =
        send(&app, Method::DELETE, &format!("/products/{}", a["id"]), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "message": "Product not found"}));
}

#[tokio::test]
async fn test_list_is_ordered_and_counted() {
    let (app, _) = setup().await;
    for (i, name) in ["c", "a", "b", "d"].iter().enumerate() {
        create(&app, name, 1.0 + i as f64, i as i64).await;
    }
    let (_, second) = send(&app, Method::GET, "/products/2", None).await;
    assert_eq!(second["data"]["name"], json!("a"));
    send(&app, Method::DELETE, "/products/2", None).await;

    let (status, body) = send(&app, Method::GET, "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3, 4]);
    assert_eq!(body["count"], json!(ids.len()));
}

#[tokio::test]
async fn test_price_is_stored_with_two_decimals() {
    let (app, _) = setup().await;
    let created = create(&app, "Rounded", 2.345, 1).await;
    assert_eq!(created["price"], json!(2.35));
}

#[tokio::test]
async fn test_non_integer_ids_are_rejected() {
    let (app, _) = setup().await;
    for uri in ["/products/abc", "/products/1.5", "/products/1e3"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {}", uri);
        assert_eq!(body, json!({"success": false, "message": "Invalid product id"}));
    }

    let (status, _) = send(&app, Method::DELETE, "/products/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_body() {
    let (app, _) = setup().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/products")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"productName\": \"Widget\","))
        .unwrap();
    let (status, body) = read_response(app.clone().oneshot(request).await.unwrap()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "message": "Invalid JSON body"}));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/products")
        .body(Body::from(
            json!({"productName": "Widget", "price": 1, "stock": 1}).to_string(),
        ))
        .unwrap();
    let (status, body) = read_response(app.oneshot(request).await.unwrap()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _) = setup().await;
    let (status, body) = send(&app, Method::GET, "/orders", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "message": "Route not found"}));

    // Known paths with an unsupported method answer the same way.
    for (method, uri) in [
        (Method::PATCH, "/products"),
        (Method::DELETE, "/products"),
        (Method::POST, "/products/1"),
    ] {
        let (status, body) = send(&app, method.clone(), uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
        assert_eq!(body, json!({"success": false, "message": "Route not found"}));
    }
}

#[tokio::test]
async fn test_prices_beyond_decimal_range() {
    let (app, _) = setup().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({"productName": "Huge", "price": 1e300, "stock": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], json!("Error creating product"));

    let (status, body) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({"productName": "Negative", "price": -1e300, "stock": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!("Price must be positive and stock cannot be negative")
    );

    let (_, list) = send(&app, Method::GET, "/products", None).await;
    assert_eq!(list["count"], json!(0));
}

#[tokio::test]
async fn test_integral_float_stock_is_accepted() {
    let (app, _) = setup().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({"productName": "Crate", "price": 3.5, "stock": 5.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["stock"], json!(5));
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin() {
    let (app, _) = setup().await;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/products")
        .header(header::ORIGIN, "http://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_store_errors_are_generic() {
    let (app, repo) = setup().await;
    repo.shutdown().await;

    let cases = [
        (Method::GET, "/products", None, "Error fetching products"),
        (Method::GET, "/products/1", None, "Error fetching product"),
        (
            Method::POST,
            "/products",
            Some(json!({"productName": "A", "price": 1, "stock": 1})),
            "Error creating product",
        ),
        (
            Method::PUT,
            "/products/1",
            Some(json!({"productName": "A", "price": 1, "stock": 1})),
            "Error updating product",
        ),
        (Method::DELETE, "/products/1", None, "Error deleting product"),
    ];

    for (method, uri, body, message) in cases {
        let (status, response) = send(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response, json!({"success": false, "message": message}));
    }
}

#[tokio::test]
async fn test_validation_runs_before_store_access() {
    let (app, repo) = setup().await;
    repo.shutdown().await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({"productName": "Bad", "price": -1, "stock": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/products/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_table_is_a_store_error() {
    let repo = Arc::new(LocalRepository::new());
    let app = create_router(AppState::new(repo.clone()));

    let (status, body) = send(&app, Method::GET, "/products", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], json!("Error fetching products"));
    assert_eq!(repo.pool_stats().connections_in_use, 0);
}

#[tokio::test]
async fn test_connection_released_after_store_error() {
    let (app, repo) = setup_with_pool(1).await;
    let too_long = "n".repeat(101);

    let (status, body) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({"productName": too_long, "price": 1, "stock": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], json!("Error creating product"));
    assert_eq!(repo.pool_stats().connections_in_use, 0);

    // With a single connection, the next request only succeeds if it was returned.
    let (status, _) = send(&app, Method::GET, "/products", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_requests_wait_for_a_free_connection() {
    let (app, repo) = setup_with_pool(1).await;
    let held = repo.pool().acquire().await.unwrap();

    let pending = {
        let app = app.clone();
        tokio::spawn(async move { send(&app, Method::GET, "/products", None).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!pending.is_finished());

    drop(held);
    let (status, body) = pending.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(0));
}

#[tokio::test]
async fn test_concurrent_creates_share_a_small_pool() {
    let (app, repo) = setup_with_pool(2).await;

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..20 {
        let app = app.clone();
        tasks.spawn(async move {
            send(
                &app,
                Method::POST,
                "/products",
                Some(json!({"productName": format!("item-{}", i), "price": 1.25, "stock": i})),
            )
            .await
        });
    }
    while let Some(result) = tasks.join_next().await {
        let (status, _) = result.unwrap();
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, list) = send(&app, Method::GET, "/products", None).await;
    let ids: Vec<i64> = list["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, (1..=20).collect::<Vec<_>>());
    assert_eq!(repo.pool_stats().connections_in_use, 0);
}
