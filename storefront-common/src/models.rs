// storefront-common/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::record_store::RecordId;

// --- Reviews ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "Id")]
    pub id: RecordId,
    pub product_id: RecordId,
    pub user_name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub product_id: RecordId,
    pub user_name: String,
    pub rating: i64, // validated to 1-5 before it reaches the store
    #[serde(default)]
    pub comment: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdate {
    pub user_name: String,
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

// --- Products ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "Id")]
    pub id: RecordId,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub in_stock: bool,
    pub description: String,
}

/// Fields accepted when creating or replacing a product.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub brand: String,
    pub price: f64,
    #[serde(default)]
    pub discount_price: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilters {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub brands: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    #[default]
    Featured,
    PriceLow,
    PriceHigh,
    Newest,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Featured => "featured",
            SortBy::PriceLow => "price-low",
            SortBy::PriceHigh => "price-high",
            SortBy::Newest => "newest",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured" => Ok(SortBy::Featured),
            "price-low" => Ok(SortBy::PriceLow),
            "price-high" => Ok(SortBy::PriceHigh),
            "newest" => Ok(SortBy::Newest),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

// --- Cart and wishlist ---

/// The slice of a product shown next to a cart line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    #[serde(rename = "Id")]
    pub id: RecordId,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub images: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "Id")]
    pub id: RecordId,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    pub added_at: DateTime<Utc>,
    pub product: CartProduct,
}

/// A cart record as written, with the product still as an id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(rename = "Id")]
    pub id: RecordId,
    pub product_id: RecordId,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub product_id: RecordId,
    pub quantity: u32,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItemUpdate {
    pub quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WishlistProduct {
    #[serde(rename = "Id")]
    pub id: RecordId,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub category: String,
    pub in_stock: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    #[serde(rename = "Id")]
    pub id: RecordId,
    pub product_id: RecordId,
    pub added_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_by_parses_ui_names() {
        assert_eq!("price-high".parse::<SortBy>(), Ok(SortBy::PriceHigh));
        assert_eq!("newest".parse::<SortBy>(), Ok(SortBy::Newest));
        assert!("cheapest".parse::<SortBy>().is_err());
        assert_eq!(serde_json::from_value::<SortBy>(json!("price-low")).unwrap(), SortBy::PriceLow);
        assert_eq!(SortBy::default().to_string(), "featured");
    }

    #[test]
    fn test_product_input_defaults() {
        let input: ProductInput = serde_json::from_value(json!({"name": "Tote", "price": 25.0})).unwrap();
        assert_eq!(input.name, "Tote");
        assert!(input.images.is_empty());
        assert!(!input.in_stock);
        assert_eq!(input.discount_price, None);
    }

    #[test]
    fn test_new_review_reads_camel_case() {
        let review: NewReview = serde_json::from_value(json!({
            "operation": "ADD_REVIEW",
            "productId": 3,
            "userName": "ana",
            "rating": 4
        }))
        .unwrap();
        assert_eq!(review.product_id, 3);
        assert_eq!(review.comment, "");
    }
}
