// core/src/store/memory.rs

//! In-process backend used by the test-suite and by `DATABASE_URL=memory`.
//!
//! All tables sit behind one `parking_lot::Mutex`, so every trait method is
//! atomic with respect to every other. The guard is never held across an
//! `.await`: no method awaits while it holds the lock.

use crate::error::{ShopError, ShopResult};
use crate::models::{
  NewProduct, NewUser, Order, OrderDraft, OrderItem, Product, ProductChanges, ProductQuery, User,
};
use crate::policy::StockPolicy;
use crate::store::{OrderStore, ProductStore, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct Tables {
  products: BTreeMap<i64, Product>,
  users: BTreeMap<i64, User>,
  orders: BTreeMap<i64, Order>,
  next_product_id: i64,
  next_user_id: i64,
  next_order_id: i64,
  next_order_item_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
  *counter += 1;
  *counter
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of persisted orders across all users.
  pub fn order_count(&self) -> usize {
    self.tables.lock().orders.len()
  }

  /// Number of persisted order items across all orders.
  pub fn order_item_count(&self) -> usize {
    self.tables.lock().orders.values().map(|o| o.items.len()).sum()
  }

  /// Flips a user's active flag. There is no API for this; it exists for
  /// fixtures and operators.
  pub fn set_user_active(&self, user_id: i64, is_active: bool) -> bool {
    match self.tables.lock().users.get_mut(&user_id) {
      Some(user) => {
        user.is_active = is_active;
        true
      }
      None => false,
    }
  }
}

fn matches_query(product: &Product, query: &ProductQuery) -> bool {
  if query.in_stock_only && product.stock <= 0 {
    return false;
  }
  match &query.search {
    Some(needle) => product.name.to_lowercase().contains(&needle.to_lowercase()),
    None => true,
  }
}

#[async_trait]
impl ProductStore for MemoryStore {
  async fn list(&self, query: &ProductQuery) -> ShopResult<(Vec<Product>, i64)> {
    let tables = self.tables.lock();
    let matching: Vec<&Product> = tables.products.values().filter(|p| matches_query(p, query)).collect();
    let total = matching.len() as i64;
    let page = matching
      .into_iter()
      .skip(query.offset.max(0) as usize)
      .take(query.limit.max(0) as usize)
      .cloned()
      .collect();
    Ok((page, total))
  }

  async fn get(&self, id: i64) -> ShopResult<Option<Product>> {
    Ok(self.tables.lock().products.get(&id).cloned())
  }

  async fn create(&self, new_product: NewProduct) -> ShopResult<Product> {
    let mut tables = self.tables.lock();
    let now = Utc::now();
    let product = Product {
      id: next_id(&mut tables.next_product_id),
      name: new_product.name,
      description: new_product.description,
      price: new_product.price,
      stock: new_product.stock,
      image_url: new_product.image_url,
      category: new_product.category,
      created_at: now,
      updated_at: now,
    };
    tables.products.insert(product.id, product.clone());
    Ok(product)
  }

  async fn update(&self, id: i64, changes: ProductChanges) -> ShopResult<Option<Product>> {
    let mut tables = self.tables.lock();
    let Some(product) = tables.products.get_mut(&id) else {
      return Ok(None);
    };
    if let Some(name) = changes.name {
      product.name = name;
    }
    if let Some(description) = changes.description {
      product.description = Some(description);
    }
    if let Some(price) = changes.price {
      product.price = price;
    }
    if let Some(stock) = changes.stock {
      product.stock = stock;
    }
    if let Some(image_url) = changes.image_url {
      product.image_url = Some(image_url);
    }
    if let Some(category) = changes.category {
      product.category = Some(category);
    }
    product.updated_at = Utc::now();
    Ok(Some(product.clone()))
  }

  async fn delete(&self, id: i64) -> ShopResult<bool> {
    let mut tables = self.tables.lock();
    if !tables.products.contains_key(&id) {
      return Ok(false);
    }
    let referenced = tables
      .orders
      .values()
      .any(|order| order.items.iter().any(|item| item.product_id == id));
    if referenced {
      return Err(ShopError::Conflict(format!(
        "Product with ID {} is referenced by existing orders",
        id
      )));
    }
    tables.products.remove(&id);
    Ok(true)
  }
}

fn ensure_unique(tables: &Tables, email: &str, username: &str, except_id: Option<i64>) -> ShopResult<()> {
  for other in tables.users.values().filter(|u| Some(u.id) != except_id) {
    if other.email == email {
      return Err(ShopError::Conflict("Email already registered".to_string()));
    }
    if other.username == username {
      return Err(ShopError::Conflict("Username already taken".to_string()));
    }
  }
  Ok(())
}

#[async_trait]
impl UserStore for MemoryStore {
  async fn find_by_id(&self, id: i64) -> ShopResult<Option<User>> {
    Ok(self.tables.lock().users.get(&id).cloned())
  }

  async fn find_by_username(&self, username: &str) -> ShopResult<Option<User>> {
    let tables = self.tables.lock();
    Ok(tables.users.values().find(|u| u.username == username).cloned())
  }

  async fn find_by_email(&self, email: &str) -> ShopResult<Option<User>> {
    let tables = self.tables.lock();
    Ok(tables.users.values().find(|u| u.email == email).cloned())
  }

  async fn insert(&self, new_user: NewUser) -> ShopResult<User> {
    let mut tables = self.tables.lock();
    ensure_unique(&tables, &new_user.email, &new_user.username, None)?;
    let user = User {
      id: next_id(&mut tables.next_user_id),
      email: new_user.email,
      username: new_user.username,
      full_name: new_user.full_name,
      hashed_password: new_user.hashed_password,
      is_active: new_user.is_active,
      is_superuser: new_user.is_superuser,
    };
    tables.users.insert(user.id, user.clone());
    Ok(user)
  }

  async fn save(&self, user: &User) -> ShopResult<User> {
    let mut tables = self.tables.lock();
    if !tables.users.contains_key(&user.id) {
      return Err(ShopError::NotFound(format!("User with ID {} not found", user.id)));
    }
    ensure_unique(&tables, &user.email, &user.username, Some(user.id))?;
    tables.users.insert(user.id, user.clone());
    Ok(user.clone())
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn insert_order(&self, draft: OrderDraft, stock_policy: StockPolicy) -> ShopResult<Order> {
    let mut tables = self.tables.lock();

    // Check every line before touching anything so a failure leaves no trace.
    for item in &draft.items {
      if !tables.products.contains_key(&item.product_id) {
        return Err(ShopError::product_not_found(item.product_id));
      }
    }
    if stock_policy.enforces() {
      let mut remaining: BTreeMap<i64, i32> = BTreeMap::new();
      for item in &draft.items {
        let left = remaining
          .entry(item.product_id)
          .or_insert_with(|| tables.products[&item.product_id].stock);
        if *left < item.quantity {
          return Err(ShopError::Validation(format!(
            "Insufficient stock for product ID {}",
            item.product_id
          )));
        }
        *left -= item.quantity;
      }
      let now = Utc::now();
      for (product_id, left) in remaining {
        if let Some(product) = tables.products.get_mut(&product_id) {
          product.stock = left;
          product.updated_at = now;
        }
      }
    }

    let order_id = next_id(&mut tables.next_order_id);
    let mut items = Vec::with_capacity(draft.items.len());
    for item in &draft.items {
      items.push(OrderItem {
        id: next_id(&mut tables.next_order_item_id),
        order_id,
        product_id: item.product_id,
        quantity: item.quantity,
        unit_price: item.unit_price,
      });
    }
    let order = Order {
      id: order_id,
      user_id: draft.user_id,
      total_amount: draft.total_amount,
      status: draft.status,
      created_at: Utc::now(),
      items,
    };
    tables.orders.insert(order.id, order.clone());
    Ok(order)
  }

  async fn orders_for_user(&self, user_id: &str) -> ShopResult<Vec<Order>> {
    let tables = self.tables.lock();
    let mut orders: Vec<Order> = tables.orders.values().filter(|o| o.user_id == user_id).cloned().collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(orders)
  }

  async fn get_order(&self, id: i64) -> ShopResult<Option<Order>> {
    Ok(self.tables.lock().orders.get(&id).cloned())
  }
}
