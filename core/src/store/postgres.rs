// core/src/store/postgres.rs

//! PostgreSQL backend built on runtime `sqlx` queries.
//!
//! Every method checks a connection out of the pool for its own duration only.
//! `insert_order` runs inside one transaction; returning early drops the
//! transaction, which rolls it back.

use crate::error::{ShopError, ShopResult};
use crate::models::{
  NewProduct, NewUser, Order, OrderDraft, OrderItem, Product, ProductChanges, ProductQuery, User,
};
use crate::policy::StockPolicy;
use crate::store::{OrderStore, ProductStore, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use tracing::{debug, error, info, instrument, warn};

const SCHEMA_SQL: &str = include_str!("../../migrations/schema.sql");

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, image_url, category, created_at, updated_at";
const USER_COLUMNS: &str = "id, email, username, full_name, hashed_password, is_active, is_superuser";

#[derive(Debug, Clone)]
pub struct PgStore {
  pool: PgPool,
}

#[derive(Debug, FromRow)]
struct OrderRow {
  id: i64,
  user_id: String,
  total_amount: i64,
  status: String,
  created_at: DateTime<Utc>,
}

impl OrderRow {
  fn into_order(self, items: Vec<OrderItem>) -> Order {
    Order {
      id: self.id,
      user_id: self.user_id,
      total_amount: self.total_amount,
      status: self.status,
      created_at: self.created_at,
      items,
    }
  }
}

/// Escapes LIKE metacharacters so the search text matches literally.
fn contains_pattern(search: &str) -> String {
  let escaped = search.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
  format!("%{}%", escaped)
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
  err.as_database_error().is_some_and(|db_err| db_err.is_foreign_key_violation())
}

/// Turns unique-constraint violations on `users` into the same `Conflict`
/// messages the memory backend produces.
fn map_user_write_error(err: sqlx::Error) -> ShopError {
  let conflict = err.as_database_error().and_then(|db_err| {
    if !db_err.is_unique_violation() {
      return None;
    }
    match db_err.constraint() {
      Some(c) if c.contains("username") => Some("Username already taken"),
      _ => Some("Email already registered"),
    }
  });
  match conflict {
    Some(message) => ShopError::Conflict(message.to_string()),
    None => ShopError::Storage(err),
  }
}

impl PgStore {
  /// Opens a pool against `database_url`.
  #[instrument(name = "pg_store::connect", skip(database_url))]
  pub async fn connect(database_url: &str, max_connections: u32) -> ShopResult<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect(database_url)
      .await
      .map_err(|e| {
        error!(error = %e, "Failed to connect to the database.");
        ShopError::Storage(e)
      })?;
    info!("Successfully connected to the database.");
    Ok(Self { pool })
  }

  /// Creates any missing tables. Safe to run on every start.
  pub async fn ensure_schema(&self) -> ShopResult<()> {
    sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
    debug!("Database schema ensured.");
    Ok(())
  }

  async fn items_for_orders(&self, order_ids: &[i64]) -> ShopResult<HashMap<i64, Vec<OrderItem>>> {
    let items: Vec<OrderItem> = sqlx::query_as(
      "SELECT id, order_id, product_id, quantity, unit_price FROM order_items WHERE order_id = ANY($1) ORDER BY id ASC",
    )
    .bind(order_ids)
    .fetch_all(&self.pool)
    .await?;

    let mut grouped: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for item in items {
      grouped.entry(item.order_id).or_default().push(item);
    }
    Ok(grouped)
  }
}

#[async_trait]
impl ProductStore for PgStore {
  async fn list(&self, query: &ProductQuery) -> ShopResult<(Vec<Product>, i64)> {
    let pattern = query.search.as_deref().map(contains_pattern);
    let filter = "WHERE ($1::TEXT IS NULL OR name ILIKE $1) AND ($2 = FALSE OR stock > 0)";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM products {}", filter))
      .bind(&pattern)
      .bind(query.in_stock_only)
      .fetch_one(&self.pool)
      .await?;

    let products: Vec<Product> = sqlx::query_as(&format!(
      "SELECT {} FROM products {} ORDER BY id ASC OFFSET $3 LIMIT $4",
      PRODUCT_COLUMNS, filter
    ))
    .bind(&pattern)
    .bind(query.in_stock_only)
    .bind(query.offset)
    .bind(query.limit)
    .fetch_all(&self.pool)
    .await?;

    Ok((products, total))
  }

  async fn get(&self, id: i64) -> ShopResult<Option<Product>> {
    let product = sqlx::query_as(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(product)
  }

  async fn create(&self, new_product: NewProduct) -> ShopResult<Product> {
    let product = sqlx::query_as(&format!(
      "INSERT INTO products (name, description, price, stock, image_url, category) \
       VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(new_product.name)
    .bind(new_product.description)
    .bind(new_product.price)
    .bind(new_product.stock)
    .bind(new_product.image_url)
    .bind(new_product.category)
    .fetch_one(&self.pool)
    .await?;
    Ok(product)
  }

  async fn update(&self, id: i64, changes: ProductChanges) -> ShopResult<Option<Product>> {
    let product = sqlx::query_as(&format!(
      "UPDATE products SET \
         name = COALESCE($2, name), \
         description = COALESCE($3, description), \
         price = COALESCE($4, price), \
         stock = COALESCE($5, stock), \
         image_url = COALESCE($6, image_url), \
         category = COALESCE($7, category), \
         updated_at = now() \
       WHERE id = $1 RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(id)
    .bind(changes.name)
    .bind(changes.description)
    .bind(changes.price)
    .bind(changes.stock)
    .bind(changes.image_url)
    .bind(changes.category)
    .fetch_optional(&self.pool)
    .await?;
    Ok(product)
  }

  async fn delete(&self, id: i64) -> ShopResult<bool> {
    match sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.pool).await {
      Ok(result) => Ok(result.rows_affected() > 0),
      Err(err) if is_foreign_key_violation(&err) => {
        warn!(product_id = id, "Refusing to delete a product referenced by order items.");
        Err(ShopError::Conflict(format!(
          "Product with ID {} is referenced by existing orders",
          id
        )))
      }
      Err(err) => Err(ShopError::Storage(err)),
    }
  }
}

#[async_trait]
impl UserStore for PgStore {
  async fn find_by_id(&self, id: i64) -> ShopResult<Option<User>> {
    let user = sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn find_by_username(&self, username: &str) -> ShopResult<Option<User>> {
    let user = sqlx::query_as(&format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS))
      .bind(username)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn find_by_email(&self, email: &str) -> ShopResult<Option<User>> {
    let user = sqlx::query_as(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
      .bind(email)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn insert(&self, new_user: NewUser) -> ShopResult<User> {
    sqlx::query_as(&format!(
      "INSERT INTO users (email, username, full_name, hashed_password, is_active, is_superuser) \
       VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
      USER_COLUMNS
    ))
    .bind(new_user.email)
    .bind(new_user.username)
    .bind(new_user.full_name)
    .bind(new_user.hashed_password)
    .bind(new_user.is_active)
    .bind(new_user.is_superuser)
    .fetch_one(&self.pool)
    .await
    .map_err(map_user_write_error)
  }

  async fn save(&self, user: &User) -> ShopResult<User> {
    let saved: Option<User> = sqlx::query_as(&format!(
      "UPDATE users SET email = $2, username = $3, full_name = $4, hashed_password = $5, \
       is_active = $6, is_superuser = $7 WHERE id = $1 RETURNING {}",
      USER_COLUMNS
    ))
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.full_name)
    .bind(&user.hashed_password)
    .bind(user.is_active)
    .bind(user.is_superuser)
    .fetch_optional(&self.pool)
    .await
    .map_err(map_user_write_error)?;

    saved.ok_or_else(|| ShopError::NotFound(format!("User with ID {} not found", user.id)))
  }
}

#[async_trait]
impl OrderStore for PgStore {
  #[instrument(name = "pg_store::insert_order", skip(self, draft), fields(user_id = %draft.user_id, items = draft.items.len()))]
  async fn insert_order(&self, draft: OrderDraft, stock_policy: StockPolicy) -> ShopResult<Order> {
    let mut tx = self.pool.begin().await?;

    if stock_policy.enforces() {
      for item in &draft.items {
        // Compare-and-set: the row lock taken by UPDATE serialises concurrent orders.
        let updated = sqlx::query(
          "UPDATE products SET stock = stock - $1, updated_at = now() WHERE id = $2 AND stock >= $1",
        )
        .bind(item.quantity)
        .bind(item.product_id)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
          warn!(product_id = item.product_id, "Stock reservation failed; rolling back order.");
          return Err(ShopError::Validation(format!(
            "Insufficient stock for product ID {}",
            item.product_id
          )));
        }
      }
    }

    let order_row: OrderRow = sqlx::query_as(
      "INSERT INTO orders (user_id, total_amount, status) VALUES ($1, $2, $3) \
       RETURNING id, user_id, total_amount, status, created_at",
    )
    .bind(&draft.user_id)
    .bind(draft.total_amount)
    .bind(&draft.status)
    .fetch_one(&mut *tx)
    .await?;

    let mut items = Vec::with_capacity(draft.items.len());
    for item in &draft.items {
      let saved: OrderItem = sqlx::query_as(
        "INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES ($1, $2, $3, $4) \
         RETURNING id, order_id, product_id, quantity, unit_price",
      )
      .bind(order_row.id)
      .bind(item.product_id)
      .bind(item.quantity)
      .bind(item.unit_price)
      .fetch_one(&mut *tx)
      .await
      .map_err(|e| {
        if is_foreign_key_violation(&e) {
          ShopError::product_not_found(item.product_id)
        } else {
          ShopError::Storage(e)
        }
      })?;
      items.push(saved);
    }

    tx.commit().await?;
    debug!(order_id = order_row.id, "Order committed.");
    Ok(order_row.into_order(items))
  }

  async fn orders_for_user(&self, user_id: &str) -> ShopResult<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(
      "SELECT id, user_id, total_amount, status, created_at FROM orders WHERE user_id = $1 \
       ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut items = self.items_for_orders(&ids).await?;
    Ok(
      rows
        .into_iter()
        .map(|row| {
          let order_items = items.remove(&row.id).unwrap_or_default();
          row.into_order(order_items)
        })
        .collect(),
    )
  }

  async fn get_order(&self, id: i64) -> ShopResult<Option<Order>> {
    let row: Option<OrderRow> =
      sqlx::query_as("SELECT id, user_id, total_amount, status, created_at FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
    let Some(row) = row else {
      return Ok(None);
    };
    let mut items = self.items_for_orders(&[row.id]).await?;
    let order_items = items.remove(&row.id).unwrap_or_default();
    Ok(Some(row.into_order(order_items)))
  }
}

#[cfg(test)]
mod tests {
  use super::contains_pattern;

  #[test]
  fn search_pattern_escapes_like_metacharacters() {
    assert_eq!(contains_pattern("lamp"), "%lamp%");
    assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
  }
}
