//! Catalog filtering and sorting
//!
//! Pure ranking utilities the category and search screens apply to
//! product lists. Filtering drops products outside the requested bounds;
//! sorting is stable, so ties keep their catalog order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use app_state::Product;

/// Sort orders for product lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortBy {
    /// Rating weighted by review count, highest first
    #[default]
    #[serde(rename = "popular")]
    Popular,
    /// Cheapest first
    #[serde(rename = "price-low")]
    PriceLowToHigh,
    /// Most expensive first
    #[serde(rename = "price-high")]
    PriceHighToLow,
    /// Newest first; newer products carry higher ids
    #[serde(rename = "newest")]
    Newest,
    /// Highest rated first
    #[serde(rename = "rating")]
    Rating,
}

impl SortBy {
    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortBy::Popular => b.popularity().total_cmp(&a.popularity()),
            SortBy::PriceLowToHigh => a.price.total_cmp(&b.price),
            SortBy::PriceHighToLow => b.price.total_cmp(&a.price),
            SortBy::Newest => b.id.cmp(&a.id),
            SortBy::Rating => b.rating.total_cmp(&a.rating),
        }
    }
}

/// Inclusive price bounds; `max` of `None` means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    /// Lower bound
    #[serde(default)]
    pub min: f64,
    /// Upper bound, unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self { min: 0.0, max: None }
    }
}

impl PriceRange {
    /// Bounds covering the given span
    pub fn between(min: f64, max: f64) -> Self {
        Self { min, max: Some(max) }
    }

    /// Whether the range excludes anything at all
    pub fn is_bounded(&self) -> bool {
        self.min > 0.0 || self.max.is_some()
    }

    /// Whether a price falls within the bounds
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && self.max.map_or(true, |max| price <= max)
    }
}

/// Filter and sort criteria for a product list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFilter {
    /// Sort order
    #[serde(default)]
    pub sort_by: SortBy,
    /// Price bounds
    #[serde(default)]
    pub price_range: PriceRange,
    /// Minimum average rating; 0 disables the filter
    #[serde(default)]
    pub min_rating: f64,
}

impl CatalogFilter {
    /// Whether any non-default criterion is set
    ///
    /// Drives the indicator dot on the filter button.
    pub fn is_active(&self) -> bool {
        self.sort_by != SortBy::Popular
            || self.min_rating > 0.0
            || self.price_range.is_bounded()
    }

    /// Apply the filter: drop products outside the bounds, then sort
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut matched: Vec<Product> = products
            .iter()
            .filter(|p| self.price_range.contains(p.price) && p.rating >= self.min_rating)
            .cloned()
            .collect();

        matched.sort_by(|a, b| self.sort_by.compare(a, b));
        matched
    }
}
