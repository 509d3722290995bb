use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Largest accepted catalog price
pub const MAX_PRICE: i64 = 100_000_000;

/// Fixed set of catalog categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash, Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Clothing,
    Shoes,
    Accessories,
    Addons,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Clothing => "clothing",
            ProductCategory::Shoes => "shoes",
            ProductCategory::Accessories => "accessories",
            ProductCategory::Addons => "addons",
        }
    }
}

/// Catalog item that can be picked into an outfit
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    /// Whole currency units, never negative
    pub price: i64,
    pub image: String,
    pub category: ProductCategory,
    pub subcategory: String,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub tags: Vec<String>,
    /// Themes this item is offered under
    pub themes: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for adding a catalog item
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "name": "Linen Wrap Dress",
    "brand": "Aurelia",
    "price": 2499,
    "category": "clothing",
    "subcategory": "Dresses",
    "colors": ["white", "sage"],
    "sizes": ["S", "M", "L"],
    "tags": ["summer", "breathable"],
    "themes": ["summer-vibes"]
}))]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "Brand must be between 1 and 100 characters"))]
    pub brand: String,

    #[validate(range(
        min = 0,
        max = 100000000,
        message = "Price must be between 0 and 100000000"
    ))]
    #[schema(minimum = 0, maximum = 100000000, example = 2499)]
    pub price: i64,

    #[serde(default)]
    pub image: String,

    pub category: ProductCategory,

    #[validate(length(min = 1, message = "Subcategory is required"))]
    pub subcategory: String,

    #[serde(default)]
    pub colors: Vec<String>,

    #[serde(default)]
    pub sizes: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub themes: Vec<String>,
}

/// Catalog query parameters, all optional and combined with AND
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductFilters {
    pub theme_id: Option<String>,
    pub category: Option<ProductCategory>,
    pub subcategory: Option<String>,
}

impl ProductFilters {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(theme_id) = &self.theme_id {
            if !product.themes.iter().any(|t| t == theme_id) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if product.category != category {
                return false;
            }
        }
        if let Some(subcategory) = &self.subcategory {
            if !product.subcategory.eq_ignore_ascii_case(subcategory) {
                return false;
            }
        }
        true
    }
}
