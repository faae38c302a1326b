use std::time::Duration;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::catalog::product::{Product, ProductSummary};
use crate::catalog::query::{ProductPage, ProductQuery};
use crate::http::error::ApiError;
use crate::state::AppState;

pub const NEW_ARRIVALS_CACHE_KEY: &str = "new-arrivals:latest:5";
pub const NEW_ARRIVALS_LIMIT: usize = 5;
pub const NEW_ARRIVALS_TTL: Duration = Duration::from_secs(300);

pub const LISTING_CACHE_CONTROL: &str = "public, s-maxage=300, stale-while-revalidate=600";

const NEW_ARRIVALS_FAILED: &str = "Failed to fetch new arrivals";

/// `GET /api/products/new-arrivals`, cache-aside over the catalog.
pub async fn new_arrivals(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    match state.cache.get(NEW_ARRIVALS_CACHE_KEY).await {
        Ok(Some(cached)) => {
            debug!("new arrivals served from cache");
            return Ok(listing(cached));
        }
        Ok(None) => {}
        Err(error) => warn!(%error, "new arrivals cache read failed, querying catalog"),
    }

    let products = state
        .catalog
        .new_arrivals(NEW_ARRIVALS_LIMIT)
        .await
        .map_err(|error| ApiError::internal(NEW_ARRIVALS_FAILED, error))?;

    let summaries: Vec<ProductSummary> = products.iter().map(Product::summary).collect();
    let body = serde_json::to_value(&summaries)
        .map_err(|error| ApiError::internal(NEW_ARRIVALS_FAILED, error.into()))?;

    if let Err(error) = state
        .cache
        .set(NEW_ARRIVALS_CACHE_KEY, &body, NEW_ARRIVALS_TTL)
        .await
    {
        warn!(%error, "failed to cache new arrivals");
    }

    Ok(listing(body))
}

fn listing(body: Value) -> impl IntoResponse {
    ([(header::CACHE_CONTROL, LISTING_CACHE_CONTROL)], Json(body))
}

/// `GET /api/products`
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductPage>, ApiError> {
    let page = state
        .catalog
        .list(&query)
        .await
        .map_err(|error| ApiError::internal("Failed to fetch products", error))?;

    Ok(Json(page))
}

/// `GET /api/products/{slug}`
pub async fn product_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Product>, ApiError> {
    state
        .catalog
        .find_by_slug(&slug)
        .await
        .map_err(|error| ApiError::internal("Failed to fetch product", error))?
        .map(Json)
        .ok_or(ApiError::NotFound("Product not found"))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "subscribers": state.registry.len(),
    }))
}
