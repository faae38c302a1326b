pub mod admin;
pub mod error;
pub mod product_updates;
pub mod products;

use axum::Router;
use axum::routing::{get, patch};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(products::health))
        .route("/api/products", get(products::list_products))
        .route("/api/products/new-arrivals", get(products::new_arrivals))
        .route("/api/products/{slug}", get(products::product_detail))
        .route(
            "/api/sse/product-updates",
            get(product_updates::product_updates),
        );

    if state.config.admin_token.is_some() {
        router = router.route(
            "/api/admin/products/{id}/stock",
            patch(admin::update_stock),
        );
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
