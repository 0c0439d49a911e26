// core/src/store/mod.rs

//! Storage seams. Services only ever talk to these traits; `PgStore` and
//! `MemoryStore` are the two backends.

use crate::error::ShopResult;
use crate::models::{NewProduct, NewUser, Order, OrderDraft, Product, ProductChanges, ProductQuery, User};
use crate::policy::StockPolicy;
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait ProductStore: Send + Sync {
  /// Returns one window of products ordered by id ascending, plus the total
  /// number of rows matching the query's filters.
  async fn list(&self, query: &ProductQuery) -> ShopResult<(Vec<Product>, i64)>;

  async fn get(&self, id: i64) -> ShopResult<Option<Product>>;

  async fn create(&self, new_product: NewProduct) -> ShopResult<Product>;

  /// Applies only the supplied fields and refreshes `updated_at`.
  /// `Ok(None)` when no product has this id.
  async fn update(&self, id: i64, changes: ProductChanges) -> ShopResult<Option<Product>>;

  /// Hard delete. `Ok(false)` when no product has this id.
  async fn delete(&self, id: i64) -> ShopResult<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
  async fn find_by_id(&self, id: i64) -> ShopResult<Option<User>>;

  async fn find_by_username(&self, username: &str) -> ShopResult<Option<User>>;

  async fn find_by_email(&self, email: &str) -> ShopResult<Option<User>>;

  /// Fails with `Conflict` when the email or username is already taken.
  async fn insert(&self, new_user: NewUser) -> ShopResult<User>;

  /// Writes every mutable column of `user` back. Fails with `Conflict` when
  /// the new email or username collides with another user.
  async fn save(&self, user: &User) -> ShopResult<User>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Writes the order, every item and, under `StockPolicy::Enforce`, every
  /// stock decrement as one atomic unit.
  async fn insert_order(&self, draft: OrderDraft, stock_policy: StockPolicy) -> ShopResult<Order>;

  /// All orders of one user with their items, newest first.
  async fn orders_for_user(&self, user_id: &str) -> ShopResult<Vec<Order>>;

  async fn get_order(&self, id: i64) -> ShopResult<Option<Order>>;
}

/// The three stores a running shop needs, usually backed by one object.
#[derive(Clone)]
pub struct Repositories {
  pub products: Arc<dyn ProductStore>,
  pub users: Arc<dyn UserStore>,
  pub orders: Arc<dyn OrderStore>,
}

impl Repositories {
  pub fn in_memory(store: Arc<MemoryStore>) -> Self {
    Self {
      products: store.clone(),
      users: store.clone(),
      orders: store,
    }
  }

  pub fn postgres(store: PgStore) -> Self {
    let store = Arc::new(store);
    Self {
      products: store.clone(),
      users: store.clone(),
      orders: store,
    }
  }
}
