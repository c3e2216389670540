//! Domain model for the catalog and cart
//!
//! Field names serialize camelCase to stay compatible with the snapshot
//! format the mobile clients already write.

use serde::{Deserialize, Serialize};

/// Theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light appearance
    #[default]
    Light,
    /// Dark appearance
    Dark,
}

impl Theme {
    /// The opposite theme
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product id
    pub id: String,
    /// Display name
    pub name: String,
    /// Unit price, non-negative
    pub price: f64,
    /// Image URI
    pub image: String,
    /// Long-form description
    pub description: String,
    /// Id of the category this product belongs to
    pub category: String,
    /// Average rating, 0 to 5
    pub rating: f64,
    /// Number of reviews
    pub reviews: u32,
    /// Price before discount, if discounted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    /// Discount percentage, if discounted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<u32>,
}

impl Product {
    /// Whether the product is currently on sale
    pub fn is_on_sale(&self) -> bool {
        self.discount.is_some()
    }

    /// Popularity score used for default catalog ordering
    pub fn popularity(&self) -> f64 {
        self.rating * f64::from(self.reviews)
    }
}

/// A product in the cart together with its quantity
///
/// On the wire a cart item is a product plus a `quantity` field, so the
/// product is flattened into the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product being purchased
    #[serde(flatten)]
    pub product: Product,
    /// Number of units, always at least 1
    pub quantity: u32,
}

impl CartItem {
    /// Price of this line: unit price times quantity
    pub fn line_total(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

/// A product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique category id
    pub id: String,
    /// Display name
    pub name: String,
    /// Image URI
    pub image: String,
    /// Number of products in the category
    pub product_count: u32,
}
