//! Catalog domain types.

use chrono::{DateTime, Utc};

use merch_core::{CategoryId, Price, ProductId, Slug};

/// A product category.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
}

/// A product listed in exactly one category.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    /// Path of the product image under the media root, if any.
    pub image: Option<String>,
    pub price: Price,
    pub stock: u32,
    pub is_active: bool,
    /// Set once on insert.
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub price: Price,
    pub stock: u32,
    pub is_active: bool,
}
