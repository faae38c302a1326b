use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::product::{Product, ProductSummary};

pub const DEFAULT_PER_PAGE: usize = 12;
pub const MAX_PER_PAGE: usize = 48;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    pub fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Newest => b.created_at.cmp(&a.created_at),
            Self::PriceAsc => a.price.total_cmp(&b.price),
            Self::PriceDesc => b.price.total_cmp(&a.price),
            Self::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::NameDesc => b.name.to_lowercase().cmp(&a.name.to_lowercase()),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Newest => write!(f, "newest"),
            Self::PriceAsc => write!(f, "price-asc"),
            Self::PriceDesc => write!(f, "price-desc"),
            Self::NameAsc => write!(f, "name-asc"),
            Self::NameDesc => write!(f, "name-desc"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

impl ProductQuery {
    /// 1-based, never zero.
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> usize {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    pub fn matches(&self, product: &Product) -> bool {
        if product.is_archived {
            return false;
        }

        let category_ok = match &self.category {
            Some(category) => product.category_id.as_deref() == Some(category.as_str()),
            None => true,
        };

        let collection_ok = match &self.collection {
            Some(collection) => product.collection_id.as_deref() == Some(collection.as_str()),
            None => true,
        };

        category_ok && collection_ok
    }

    /// Filters, sorts and cuts one page out of `products`.
    pub fn apply<'a, I>(&self, products: I) -> (Vec<ProductSummary>, usize)
    where
        I: IntoIterator<Item = &'a Product>,
    {
        let mut matching: Vec<&Product> = products
            .into_iter()
            .filter(|product| self.matches(product))
            .collect();

        matching.sort_by(|a, b| self.sort.compare(a, b));

        let total = matching.len();
        let per_page = self.per_page();
        let skip = (self.page() - 1).saturating_mul(per_page);

        let page = matching
            .into_iter()
            .skip(skip)
            .take(per_page)
            .map(Product::summary)
            .collect();

        (page, total)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facet {
    pub id: String,
    pub name: String,
    pub product_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<ProductSummary>,
    pub total: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub categories: Vec<Facet>,
    pub collections: Vec<Facet>,
}

pub fn total_pages(total: usize, per_page: usize) -> usize {
    total.div_ceil(per_page.max(1)).max(1)
}
