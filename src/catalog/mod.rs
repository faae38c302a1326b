pub mod memory_catalog;
pub mod product;
pub mod query;

use anyhow::Result;
use async_trait::async_trait;

use crate::catalog::product::Product;
use crate::catalog::query::{ProductPage, ProductQuery};

/// Read/write access to product records. Archived products are never returned.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// In-stock products, newest first.
    async fn new_arrivals(&self, limit: usize) -> Result<Vec<Product>>;
    async fn list(&self, query: &ProductQuery) -> Result<ProductPage>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>>;
    /// Returns the updated product, or `None` when `id` is unknown.
    async fn set_stock(&self, id: &str, in_stock: bool) -> Result<Option<Product>>;
}
