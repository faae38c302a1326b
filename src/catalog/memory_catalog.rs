use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::catalog::ProductRepository;
use crate::catalog::product::{Category, Product};
use crate::catalog::query::{Facet, ProductPage, ProductQuery, total_pages};

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    collections: Vec<Category>,
    #[serde(default)]
    products: Vec<Product>,
}

impl CatalogFile {
    fn validate(&self) -> Result<()> {
        let category_ids: HashSet<&str> = self.categories.iter().map(|c| c.id.as_str()).collect();
        let collection_ids: HashSet<&str> =
            self.collections.iter().map(|c| c.id.as_str()).collect();

        let mut ids = HashSet::new();
        let mut slugs = HashSet::new();

        for product in &self.products {
            if !ids.insert(product.id.as_str()) {
                bail!("duplicate product id {}", product.id);
            }
            if !slugs.insert(product.slug.as_str()) {
                bail!("duplicate product slug {}", product.slug);
            }
            if !product.price.is_finite() || product.price < 0.0 {
                bail!("product {} has an invalid price", product.id);
            }
            if let Some(size) = product
                .sizes
                .iter()
                .find(|size| !size.price.is_finite() || size.price < 0.0)
            {
                bail!("product {} size {} has an invalid price", product.id, size.size);
            }
            if let Some(category) = &product.category_id {
                if !category_ids.contains(category.as_str()) {
                    bail!("product {} references unknown category {category}", product.id);
                }
            }
            if let Some(collection) = &product.collection_id {
                if !collection_ids.contains(collection.as_str()) {
                    bail!("product {} references unknown collection {collection}", product.id);
                }
            }
        }

        Ok(())
    }
}

/// Product catalog held in memory, seeded from a YAML file.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    categories: Vec<Category>,
    collections: Vec<Category>,
    products: RwLock<Vec<Product>>,
}

impl InMemoryCatalog {
    pub fn new(
        categories: Vec<Category>,
        collections: Vec<Category>,
        products: Vec<Product>,
    ) -> Self {
        Self {
            categories,
            collections,
            products: RwLock::new(products),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;

        let catalog = Self::from_yaml_str(&raw)
            .with_context(|| format!("failed to load catalog {}", path.display()))?;

        info!(
            path = %path.display(),
            categories = catalog.categories.len(),
            collections = catalog.collections.len(),
            "catalog loaded"
        );

        Ok(catalog)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(raw).context("failed to parse catalog")?;
        file.validate().context("catalog validation failed")?;

        Ok(Self::new(file.categories, file.collections, file.products))
    }

    fn facets(
        groups: &[Category],
        products: &[Product],
        key: fn(&Product) -> Option<&str>,
    ) -> Vec<Facet> {
        groups
            .iter()
            .map(|group| Facet {
                id: group.id.clone(),
                name: group.name.clone(),
                product_count: products
                    .iter()
                    .filter(|product| {
                        !product.is_archived && key(product) == Some(group.id.as_str())
                    })
                    .count(),
            })
            .collect()
    }
}

#[async_trait]
impl ProductRepository for InMemoryCatalog {
    async fn new_arrivals(&self, limit: usize) -> Result<Vec<Product>> {
        let products = self.products.read().await;

        let mut arrivals: Vec<&Product> = products
            .iter()
            .filter(|product| !product.is_archived && product.in_stock)
            .collect();
        arrivals.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(arrivals.into_iter().take(limit).cloned().collect())
    }

    async fn list(&self, query: &ProductQuery) -> Result<ProductPage> {
        let products = self.products.read().await;

        let (page, total) = query.apply(products.iter());

        Ok(ProductPage {
            products: page,
            total,
            total_pages: total_pages(total, query.per_page()),
            current_page: query.page(),
            categories: Self::facets(&self.categories, &products, |product| {
                product.category_id.as_deref()
            }),
            collections: Self::facets(&self.collections, &products, |product| {
                product.collection_id.as_deref()
            }),
        })
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        let products = self.products.read().await;

        Ok(products
            .iter()
            .find(|product| product.slug == slug && !product.is_archived)
            .cloned())
    }

    async fn set_stock(&self, id: &str, in_stock: bool) -> Result<Option<Product>> {
        let mut products = self.products.write().await;

        let Some(product) = products.iter_mut().find(|product| product.id == id) else {
            return Ok(None);
        };

        product.in_stock = in_stock;

        Ok(Some(product.clone()))
    }
}
