// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use chrono::Duration;
use once_cell::sync::Lazy;
use shopmock::models::{NewProduct, Product};
use shopmock::services::Registration;
use shopmock::store::ProductStore;
use shopmock::{
  AuthService, CatalogService, MemoryStore, OrderWorkflow, Repositories, StockPolicy, StockVisibility,
  StubPaymentGateway, TokenIssuer,
};
use std::sync::Arc;
use tracing::Level;

pub const TEST_SECRET: &[u8] = b"test-signing-key";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

// --- Helper for Tracing Setup (call once per test run if needed) ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Every service wired over one fresh in-memory store.
pub struct TestShop {
  pub store: Arc<MemoryStore>,
  pub repos: Repositories,
  pub auth: AuthService,
  pub catalog: CatalogService,
  pub orders: OrderWorkflow,
}

pub fn shop() -> TestShop {
  shop_with(StockVisibility::IncludeOutOfStock, StockPolicy::Unchecked)
}

pub fn shop_with(visibility: StockVisibility, stock_policy: StockPolicy) -> TestShop {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let repos = Repositories::in_memory(store.clone());
  let auth = AuthService::new(
    repos.users.clone(),
    TokenIssuer::new(TEST_SECRET, Duration::minutes(30)),
  );
  let catalog = CatalogService::new(repos.products.clone(), visibility);
  let orders = OrderWorkflow::new(
    repos.products.clone(),
    repos.orders.clone(),
    Arc::new(StubPaymentGateway),
    stock_policy,
  );
  TestShop {
    store,
    repos,
    auth,
    catalog,
    orders,
  }
}

pub fn new_product(name: &str, price: i64, stock: i32) -> NewProduct {
  NewProduct {
    name: name.to_string(),
    description: None,
    price,
    stock,
    image_url: None,
    category: None,
  }
}

pub async fn seed_product(store: &MemoryStore, name: &str, price: i64, stock: i32) -> Product {
  store.create(new_product(name, price, stock)).await.expect("seed product")
}

/// Seeds `count` products named "Product 001", "Product 002", ...
pub async fn seed_products(store: &MemoryStore, count: usize) -> Vec<Product> {
  let mut products = Vec::with_capacity(count);
  for i in 1..=count {
    products.push(seed_product(store, &format!("Product {:03}", i), 100 * i as i64, 10).await);
  }
  products
}

pub fn registration(username: &str, email: &str) -> Registration {
  Registration {
    email: email.to_string(),
    username: username.to_string(),
    full_name: format!("{} Tester", username),
    password: TEST_PASSWORD.to_string(),
  }
}
