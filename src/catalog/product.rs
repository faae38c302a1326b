use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub sizes: Vec<ProductSize>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub collection_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub discount: Option<Discount>,
}

fn default_in_stock() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSize {
    pub size: String,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub percentage: f64,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Listing card shape shared by the new-arrivals strip and the products page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub price: f64,
    pub image: Option<String>,
    pub in_stock: bool,
    pub sizes: Vec<String>,
    pub min_price: f64,
    pub max_price: f64,
    pub discount: Option<Discount>,
}

impl Product {
    pub fn primary_image(&self) -> Option<&str> {
        self.images
            .iter()
            .min_by_key(|image| image.order)
            .map(|image| image.url.as_str())
    }

    /// Lowest and highest size price, or the list price when there are no sizes.
    pub fn price_range(&self) -> (f64, f64) {
        let mut prices = self.sizes.iter().map(|size| size.price);

        match prices.next() {
            None => (self.price, self.price),
            Some(first) => prices.fold((first, first), |(min, max), price| {
                (min.min(price), max.max(price))
            }),
        }
    }

    pub fn summary(&self) -> ProductSummary {
        let mut sizes: Vec<&ProductSize> = self.sizes.iter().collect();
        sizes.sort_by(|a, b| a.size.cmp(&b.size));

        let (min_price, max_price) = self.price_range();

        ProductSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            slug: self.slug.clone(),
            price: self.price,
            image: self.primary_image().map(str::to_string),
            in_stock: self.in_stock,
            sizes: sizes.into_iter().map(|size| size.size.clone()).collect(),
            min_price,
            max_price,
            discount: self.discount,
        }
    }
}
