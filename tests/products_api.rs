mod support;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};

use storefront::cache::memory_cache::MemoryCache;
use storefront::http::products::{LISTING_CACHE_CONTROL, NEW_ARRIVALS_CACHE_KEY};
use storefront::state::AppState;
use support::{
    ADMIN_TOKEN, BrokenCache, BrokenCatalog, EventReader, get, json_body, send, state,
    state_with, test_config,
};

fn ids(products: &Value) -> Vec<&str> {
    products
        .as_array()
        .unwrap()
        .iter()
        .map(|product| product["id"].as_str().unwrap())
        .collect()
}

fn admin_state() -> AppState {
    state_with(
        Arc::new(MemoryCache::new()),
        test_config().with_admin_token(ADMIN_TOKEN),
    )
}

fn stock_request(id: &str, token: Option<&str>, in_stock: bool) -> Request<Body> {
    let mut builder = Request::builder()
        .method("PATCH")
        .uri(format!("/api/admin/products/{id}/stock"))
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header("x-admin-token", token);
    }

    builder
        .body(Body::from(json!({ "inStock": in_stock }).to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_ok() {
    let response = get(&state(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn new_arrivals_lists_in_stock_products_newest_first() {
    let state = state();
    let response = get(&state, "/api/products/new-arrivals").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], LISTING_CACHE_CONTROL);

    let body = json_body(response).await;
    assert_eq!(ids(&body), vec!["hoodie", "tee"]);

    let hoodie = &body[0];
    assert_eq!(hoodie["image"], "/images/hoodie-front.jpg");
    assert_eq!(hoodie["sizes"], json!(["L", "M"]));
    assert_eq!(hoodie["minPrice"], 85.0);
    assert_eq!(hoodie["maxPrice"], 90.0);
    assert_eq!(hoodie["inStock"], true);
}

#[tokio::test]
async fn new_arrivals_are_served_from_cache_until_invalidated() {
    let state = state();
    let first = json_body(get(&state, "/api/products/new-arrivals").await).await;

    state.catalog.set_stock("cap", true).await.unwrap();

    let cached = json_body(get(&state, "/api/products/new-arrivals").await).await;
    assert_eq!(cached, first);

    state.cache.delete(NEW_ARRIVALS_CACHE_KEY).await.unwrap();

    let fresh = json_body(get(&state, "/api/products/new-arrivals").await).await;
    assert_eq!(ids(&fresh), vec!["cap", "hoodie", "tee"]);
}

#[tokio::test]
async fn new_arrivals_survive_a_broken_cache() {
    let state = state_with(Arc::new(BrokenCache), test_config());

    let response = get(&state, "/api/products/new-arrivals").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(ids(&json_body(response).await), vec!["hoodie", "tee"]);
}

#[tokio::test]
async fn catalog_failure_is_a_500_with_error_body() {
    let state = AppState::new(
        Arc::new(MemoryCache::new()),
        Arc::new(BrokenCatalog),
        test_config(),
    );

    let response = get(&state, "/api/products/new-arrivals").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Failed to fetch new arrivals"})
    );
}

#[tokio::test]
async fn listing_filters_sorts_and_paginates() {
    let state = state();

    let page = json_body(get(&state, "/api/products?category=tops&sort=price-asc").await).await;
    assert_eq!(ids(&page["products"]), vec!["tee", "hoodie"]);
    assert_eq!(page["total"], 2);
    assert_eq!(page["totalPages"], 1);

    let second = json_body(get(&state, "/api/products?perPage=2&page=2").await).await;
    assert_eq!(ids(&second["products"]), vec!["tee"]);
    assert_eq!(second["currentPage"], 2);
    assert_eq!(second["totalPages"], 2);

    let accessories = second["categories"]
        .as_array()
        .unwrap()
        .iter()
        .find(|facet| facet["id"] == "accessories")
        .unwrap();
    assert_eq!(accessories["productCount"], 1);
}

#[tokio::test]
async fn listing_rejects_unknown_sort() {
    let response = get(&state(), "/api/products?sort=cheapest").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn product_detail_by_slug() {
    let state = state();

    let found = get(&state, "/api/products/boxy-tee").await;
    assert_eq!(found.status(), StatusCode::OK);
    assert_eq!(json_body(found).await["id"], "tee");

    let archived = get(&state, "/api/products/canvas-tote").await;
    assert_eq!(archived.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(archived).await,
        json!({"error": "Product not found"})
    );
}

#[tokio::test]
async fn admin_routes_absent_without_token() {
    let response = send(&state(), stock_request("tee", Some(ADMIN_TOKEN), false)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stock_change_requires_the_admin_token() {
    let state = admin_state();

    let missing = send(&state, stock_request("tee", None, false)).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = send(&state, stock_request("tee", Some("guess"), false)).await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let unknown = send(&state, stock_request("ghost", Some(ADMIN_TOKEN), false)).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stock_change_broadcasts_and_invalidates_new_arrivals() {
    let state = admin_state();
    json_body(get(&state, "/api/products/new-arrivals").await).await;

    let mut events = EventReader::new(get(&state, "/api/sse/product-updates").await);
    events.next().await;

    let response = send(&state, stock_request("tee", Some(ADMIN_TOKEN), false)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["product"]["inStock"], false);
    assert_eq!(body["publish"]["delivered"], 1);
    assert_eq!(body["publish"]["persisted"], true);

    let mut update = events.next().await;
    update.as_object_mut().unwrap().remove("timestamp");
    assert_eq!(
        update,
        json!({"type": "stock_change", "productId": "tee", "inStock": false})
    );

    let arrivals = json_body(get(&state, "/api/products/new-arrivals").await).await;
    assert_eq!(ids(&arrivals), vec!["hoodie"]);
}
