// core/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub id: i64,
  pub name: String,
  pub description: Option<String>,
  /// Smallest currency unit.
  pub price: i64,
  pub stock: i32,
  pub image_url: Option<String>,
  pub category: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
  pub name: String,
  pub description: Option<String>,
  pub price: i64,
  pub stock: i32,
  pub image_url: Option<String>,
  pub category: Option<String>,
}

/// Partial product update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductChanges {
  pub name: Option<String>,
  pub description: Option<String>,
  pub price: Option<i64>,
  pub stock: Option<i32>,
  pub image_url: Option<String>,
  pub category: Option<String>,
}

/// Store-level listing window. Built by the catalog service, never by handlers.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
  pub offset: i64,
  pub limit: i64,
  /// Case-insensitive substring matched against the product name.
  pub search: Option<String>,
  pub in_stock_only: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
  pub items: Vec<Product>,
  pub total: i64,
  pub page: i64,
  pub page_size: i64,
}
