// core/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status written for every order the workflow persists.
pub const ORDER_STATUS_PAID: &str = "paid";

#[derive(Debug, Clone, Serialize)]
pub struct Order {
  pub id: i64,
  /// Owning user's id rendered as a string; not a foreign key.
  pub user_id: String,
  pub total_amount: i64,
  pub status: String,
  pub created_at: DateTime<Utc>,
  pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
  pub id: i64,
  #[serde(skip_serializing)]
  pub order_id: i64,
  pub product_id: i64,
  pub quantity: i32,
  /// Price snapshot taken when the order was placed.
  pub unit_price: i64,
}

/// One requested line of an order, as sent by the client.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OrderLine {
  pub product_id: i64,
  pub quantity: i32,
}

/// A priced line ready to be written.
#[derive(Debug, Clone, Copy)]
pub struct NewOrderItem {
  pub product_id: i64,
  pub quantity: i32,
  pub unit_price: i64,
}

/// Everything `OrderStore::insert_order` writes in one atomic unit.
#[derive(Debug, Clone)]
pub struct OrderDraft {
  pub user_id: String,
  pub total_amount: i64,
  pub status: String,
  pub items: Vec<NewOrderItem>,
}
