pub mod backends;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod events;
pub mod http;
pub mod state;
pub mod updates;

use axum::Router;
use state::AppState;

pub fn app(state: AppState) -> Router {
    http::router(state)
}
