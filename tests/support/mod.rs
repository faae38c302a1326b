#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::body::{Body, BodyDataStream};
use axum::http::{Request, Response};
use futures_util::StreamExt;
use serde_json::Value;
use tower::ServiceExt;

use storefront::cache::memory_cache::MemoryCache;
use storefront::cache::{CacheError, CacheStore};
use storefront::catalog::ProductRepository;
use storefront::catalog::memory_catalog::InMemoryCatalog;
use storefront::catalog::product::Product;
use storefront::catalog::query::{ProductPage, ProductQuery};
use storefront::config::server_config::ServerConfig;
use storefront::state::AppState;

pub const ADMIN_TOKEN: &str = "let-me-in";

pub const CATALOG: &str = r#"
categories:
  - { id: tops, name: Tops }
  - { id: accessories, name: Accessories }
collections:
  - { id: midnight, name: Midnight }
products:
  - id: hoodie
    name: Midnight Hoodie
    slug: midnight-hoodie
    price: 85
    categoryId: tops
    collectionId: midnight
    createdAt: 2024-10-02T09:00:00Z
    images:
      - { url: /images/hoodie-back.jpg, order: 1 }
      - { url: /images/hoodie-front.jpg, order: 0 }
    sizes:
      - { size: M, price: 85 }
      - { size: L, price: 90 }
  - id: tee
    name: Boxy Tee
    slug: boxy-tee
    price: 35
    categoryId: tops
    createdAt: 2024-09-18T09:00:00Z
  - id: cap
    name: Logo Cap
    slug: logo-cap
    price: 28
    categoryId: accessories
    inStock: false
    createdAt: 2024-10-05T09:00:00Z
  - id: tote
    name: Canvas Tote
    slug: canvas-tote
    price: 22
    categoryId: accessories
    isArchived: true
    createdAt: 2024-10-06T09:00:00Z
"#;

pub fn test_config() -> ServerConfig {
    ServerConfig {
        keep_alive: None,
        ..ServerConfig::default()
    }
}

pub fn catalog() -> Arc<InMemoryCatalog> {
    Arc::new(InMemoryCatalog::from_yaml_str(CATALOG).unwrap())
}

pub fn state_with(cache: Arc<dyn CacheStore>, config: ServerConfig) -> AppState {
    AppState::new(cache, catalog(), config)
}

pub fn state() -> AppState {
    state_with(Arc::new(MemoryCache::new()), test_config())
}

pub async fn send(state: &AppState, request: Request<Body>) -> Response<Body> {
    storefront::app(state.clone()).oneshot(request).await.unwrap()
}

pub async fn get(state: &AppState, uri: &str) -> Response<Body> {
    send(state, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Reads `data:` events off an SSE response body.
pub struct EventReader {
    body: BodyDataStream,
    buffer: String,
}

impl EventReader {
    pub fn new(response: Response<Body>) -> Self {
        Self {
            body: response.into_body().into_data_stream(),
            buffer: String::new(),
        }
    }

    /// Next raw frame, comments included, or `None` once the server has closed the stream.
    pub async fn next_frame(&mut self) -> Option<String> {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                return Some(self.buffer.drain(..end + 2).collect());
            }

            let chunk = tokio::time::timeout(Duration::from_secs(5), self.body.next())
                .await
                .expect("timed out waiting for an sse frame")?
                .unwrap();
            self.buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    }

    /// Next event, or `None` once the server has closed the stream.
    pub async fn try_next(&mut self) -> Option<Value> {
        loop {
            let frame = self.next_frame().await?;
            if let Some(event) = frame_data(&frame) {
                return Some(event);
            }
        }
    }

    pub async fn next(&mut self) -> Value {
        self.try_next().await.expect("sse stream ended")
    }
}

/// The JSON carried by a frame's `data:` lines, if it has any.
pub fn frame_data(frame: &str) -> Option<Value> {
    let data: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim_start)
        .collect();

    if data.is_empty() {
        return None;
    }

    Some(serde_json::from_str(&data.join("\n")).unwrap())
}

pub struct BrokenCache;

#[async_trait]
impl CacheStore for BrokenCache {
    async fn get(&self, _key: &str) -> Result<Option<Value>, CacheError> {
        Err(CacheError::Backend("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: &Value, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Backend("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Backend("connection refused".to_string()))
    }
}

pub struct BrokenCatalog;

#[async_trait]
impl ProductRepository for BrokenCatalog {
    async fn new_arrivals(&self, _limit: usize) -> Result<Vec<Product>> {
        Err(anyhow!("database is down"))
    }

    async fn list(&self, _query: &ProductQuery) -> Result<ProductPage> {
        Err(anyhow!("database is down"))
    }

    async fn find_by_slug(&self, _slug: &str) -> Result<Option<Product>> {
        Err(anyhow!("database is down"))
    }

    async fn set_stock(&self, _id: &str, _in_stock: bool) -> Result<Option<Product>> {
        Err(anyhow!("database is down"))
    }
}
