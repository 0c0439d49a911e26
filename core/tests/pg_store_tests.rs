// tests/pg_store_tests.rs
//! Runs against a real PostgreSQL when `DATABASE_URL` is set, and passes
//! trivially otherwise. Each test works on its own products and order owner,
//! and all of them are `#[serial]` because `ensure_schema` is not safe to run
//! concurrently on a fresh database.

mod common;

use common::*;
use serial_test::serial;
use shopmock::models::{NewOrderItem, OrderDraft, ORDER_STATUS_PAID};
use shopmock::store::{OrderStore, ProductStore};
use shopmock::{PgStore, ShopError, StockPolicy};
use std::env;
use uuid::Uuid;

async fn pg_store() -> Option<PgStore> {
  setup_tracing();
  let Ok(url) = env::var("DATABASE_URL") else {
    eprintln!("DATABASE_URL not set; skipping PostgreSQL store test.");
    return None;
  };
  let store = PgStore::connect(&url, 2).await.expect("connect to DATABASE_URL");
  store.ensure_schema().await.expect("apply schema");
  Some(store)
}

fn unique_owner() -> String {
  format!("pg-test-{}", Uuid::new_v4())
}

fn draft(user_id: &str, items: Vec<NewOrderItem>) -> OrderDraft {
  OrderDraft {
    user_id: user_id.to_string(),
    total_amount: items.iter().map(|i| i.unit_price * i64::from(i.quantity)).sum(),
    status: ORDER_STATUS_PAID.to_string(),
    items,
  }
}

fn item(product_id: i64, quantity: i32, unit_price: i64) -> NewOrderItem {
  NewOrderItem {
    product_id,
    quantity,
    unit_price,
  }
}

#[tokio::test]
#[serial]
async fn test_failed_item_insert_rolls_back_the_whole_order() {
  let Some(store) = pg_store().await else { return };
  let owner = unique_owner();
  let lamp = store.create(new_product("PG Lamp", 1500, 5)).await.unwrap();

  // The order row and first item insert fine; the second item hits the foreign key.
  let result = store
    .insert_order(draft(&owner, vec![item(lamp.id, 2, 1500), item(-1, 1, 100)]), StockPolicy::Unchecked)
    .await;

  match result {
    Err(ShopError::NotFound(message)) => assert_eq!(message, "Product with ID -1 not found"),
    other => panic!("Expected NotFound, got {:?}", other),
  }
  assert!(store.orders_for_user(&owner).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_failed_reservation_releases_earlier_reservations() {
  let Some(store) = pg_store().await else { return };
  let owner = unique_owner();
  let lamp = store.create(new_product("PG Desk Lamp", 1500, 5)).await.unwrap();

  let result = store
    .insert_order(draft(&owner, vec![item(lamp.id, 2, 1500), item(-1, 1, 100)]), StockPolicy::Enforce)
    .await;

  assert!(matches!(result, Err(ShopError::Validation(_))), "got {:?}", result);
  assert!(store.orders_for_user(&owner).await.unwrap().is_empty());
  assert_eq!(store.get(lamp.id).await.unwrap().unwrap().stock, 5);
}

#[tokio::test]
#[serial]
async fn test_enforced_stock_uses_compare_and_set() {
  let Some(store) = pg_store().await else { return };
  let owner = unique_owner();
  let mug = store.create(new_product("PG Mug", 800, 2)).await.unwrap();

  match store.insert_order(draft(&owner, vec![item(mug.id, 3, 800)]), StockPolicy::Enforce).await {
    Err(ShopError::Validation(message)) => assert_eq!(message, format!("Insufficient stock for product ID {}", mug.id)),
    other => panic!("Expected Validation, got {:?}", other),
  }
  assert_eq!(store.get(mug.id).await.unwrap().unwrap().stock, 2);
  assert!(store.orders_for_user(&owner).await.unwrap().is_empty());

  let order = store
    .insert_order(draft(&owner, vec![item(mug.id, 2, 800)]), StockPolicy::Enforce)
    .await
    .unwrap();
  assert_eq!(order.total_amount, 1600);
  assert_eq!(order.items.len(), 1);
  assert_eq!(store.get(mug.id).await.unwrap().unwrap().stock, 0);

  // Unchecked orders neither check nor touch stock.
  store
    .insert_order(draft(&owner, vec![item(mug.id, 4, 800)]), StockPolicy::Unchecked)
    .await
    .unwrap();
  assert_eq!(store.get(mug.id).await.unwrap().unwrap().stock, 0);
  assert_eq!(store.orders_for_user(&owner).await.unwrap().len(), 2);
}

#[tokio::test]
#[serial]
async fn test_committed_order_reads_back_with_items() {
  let Some(store) = pg_store().await else { return };
  let owner = unique_owner();
  let pen = store.create(new_product("PG Pen", 250, 10)).await.unwrap();
  let pad = store.create(new_product("PG Pad", 400, 10)).await.unwrap();

  let order = store
    .insert_order(
      draft(&owner, vec![item(pen.id, 3, 250), item(pad.id, 1, 400)]),
      StockPolicy::Unchecked,
    )
    .await
    .unwrap();

  let fetched = store.get_order(order.id).await.unwrap().expect("order exists");
  assert_eq!(fetched.user_id, owner);
  assert_eq!(fetched.total_amount, 1150);
  assert_eq!(fetched.status, ORDER_STATUS_PAID);
  let mut lines: Vec<(i64, i32, i64)> = fetched
    .items
    .iter()
    .map(|i| (i.product_id, i.quantity, i.unit_price))
    .collect();
  lines.sort();
  assert_eq!(lines, vec![(pen.id, 3, 250), (pad.id, 1, 400)]);
}

#[tokio::test]
#[serial]
async fn test_deleting_an_ordered_product_conflicts() {
  let Some(store) = pg_store().await else { return };
  let owner = unique_owner();
  let ordered = store.create(new_product("PG Ordered", 900, 3)).await.unwrap();
  let unordered = store.create(new_product("PG Unordered", 900, 3)).await.unwrap();
  store
    .insert_order(draft(&owner, vec![item(ordered.id, 1, 900)]), StockPolicy::Unchecked)
    .await
    .unwrap();

  match store.delete(ordered.id).await {
    Err(ShopError::Conflict(message)) => assert!(message.contains(&ordered.id.to_string())),
    other => panic!("Expected Conflict, got {:?}", other),
  }
  assert!(store.get(ordered.id).await.unwrap().is_some());

  assert!(store.delete(unordered.id).await.unwrap());
  assert!(!store.delete(unordered.id).await.unwrap());
}
