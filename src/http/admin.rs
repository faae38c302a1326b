use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::catalog::product::ProductSummary;
use crate::http::error::ApiError;
use crate::http::products::NEW_ARRIVALS_CACHE_KEY;
use crate::state::AppState;
use crate::updates::broadcaster::PublishReport;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub in_stock: bool,
}

#[derive(Debug, Serialize)]
pub struct StockChangeResponse {
    pub product: ProductSummary,
    pub publish: PublishReport,
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = state
        .config
        .admin_token
        .as_deref()
        .ok_or(ApiError::Unauthorized)?;

    let provided = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(token) if token == expected => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

/// `PATCH /api/admin/products/{id}/stock`
///
/// Updates the catalog, drops the cached new-arrivals strip and tells every
/// connected storefront about the change.
pub async fn update_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(change): Json<StockChange>,
) -> Result<Json<StockChangeResponse>, ApiError> {
    authorize(&state, &headers)?;

    let product = state
        .catalog
        .set_stock(&id, change.in_stock)
        .await
        .map_err(|error| ApiError::internal("Failed to update stock", error))?
        .ok_or(ApiError::NotFound("Product not found"))?;

    if let Err(error) = state.cache.delete(NEW_ARRIVALS_CACHE_KEY).await {
        warn!(%error, "failed to invalidate new arrivals cache");
    }

    let publish = state
        .publish(json!({
            "type": "stock_change",
            "productId": product.id,
            "inStock": product.in_stock,
        }))
        .await;

    info!(product = %product.id, in_stock = product.in_stock, ?publish, "stock changed");

    Ok(Json(StockChangeResponse {
        product: product.summary(),
        publish,
    }))
}
