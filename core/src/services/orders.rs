// core/src/services/orders.rs

//! The order placement workflow: validate -> price -> authorize -> persist.
//!
//! Each step is its own instrumented function so the span tree of one order
//! reads like the step list. The workflow fails fast: the first failing step
//! ends the run, and nothing is written before the persist step.

use crate::error::{ShopError, ShopResult};
use crate::models::{NewOrderItem, Order, OrderDraft, OrderLine, ORDER_STATUS_PAID};
use crate::policy::StockPolicy;
use crate::services::payment::{PaymentGateway, PaymentReceipt, PaymentStatus};
use crate::store::{OrderStore, ProductStore};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Priced lines plus their total, produced by the pricing step.
#[derive(Debug, Clone)]
pub struct PricedOrder {
  pub items: Vec<NewOrderItem>,
  pub total_amount: i64,
}

pub struct OrderWorkflow {
  products: Arc<dyn ProductStore>,
  orders: Arc<dyn OrderStore>,
  payments: Arc<dyn PaymentGateway>,
  stock_policy: StockPolicy,
}

impl OrderWorkflow {
  pub fn new(
    products: Arc<dyn ProductStore>,
    orders: Arc<dyn OrderStore>,
    payments: Arc<dyn PaymentGateway>,
    stock_policy: StockPolicy,
  ) -> Self {
    Self {
      products,
      orders,
      payments,
      stock_policy,
    }
  }

  /// Checks every requested line. Returns the first violation.
  ///
  /// Per line: the product must exist, then the quantity must be positive.
  /// Under `StockPolicy::Enforce` the combined quantity per product must also
  /// fit the current stock.
  #[instrument(name = "order_workflow::validate", skip(self, lines), fields(lines = lines.len()))]
  pub async fn validate(&self, lines: &[OrderLine]) -> ShopResult<()> {
    if lines.is_empty() {
      return Err(ShopError::Validation("Order must contain at least one item".to_string()));
    }

    let mut requested: HashMap<i64, i64> = HashMap::new();
    for line in lines {
      let product = self
        .products
        .get(line.product_id)
        .await?
        .ok_or_else(|| ShopError::product_not_found(line.product_id))?;

      if line.quantity <= 0 {
        return Err(ShopError::Validation(format!(
          "Invalid quantity for product ID {}",
          line.product_id
        )));
      }

      if self.stock_policy.enforces() {
        let total_requested = requested.entry(line.product_id).or_insert(0);
        *total_requested += i64::from(line.quantity);
        if *total_requested > i64::from(product.stock) {
          return Err(ShopError::Validation(format!(
            "Insufficient stock for product ID {}",
            line.product_id
          )));
        }
      }
    }
    Ok(())
  }

  /// Re-reads each product's current price and snapshots it as the unit price.
  #[instrument(name = "order_workflow::price", skip(self, lines))]
  pub async fn price(&self, lines: &[OrderLine]) -> ShopResult<PricedOrder> {
    let mut items = Vec::with_capacity(lines.len());
    let mut total_amount: i64 = 0;

    for line in lines {
      let product = self
        .products
        .get(line.product_id)
        .await?
        .ok_or_else(|| ShopError::product_not_found(line.product_id))?;

      let new_total = product
        .price
        .checked_mul(i64::from(line.quantity))
        .and_then(|amount| total_amount.checked_add(amount))
        .ok_or_else(|| ShopError::Validation("Order total is too large".to_string()))?;
      total_amount = new_total;

      items.push(NewOrderItem {
        product_id: line.product_id,
        quantity: line.quantity,
        unit_price: product.price,
      });
    }

    Ok(PricedOrder { items, total_amount })
  }

  #[instrument(name = "order_workflow::authorize", skip(self))]
  pub fn authorize(&self, total_amount: i64) -> ShopResult<PaymentReceipt> {
    let receipt = self.payments.process(total_amount);
    if receipt.status != PaymentStatus::Authorized {
      warn!(transaction_id = %receipt.transaction_id, "Payment was not authorized.");
      return Err(ShopError::PaymentDeclined(format!(
        "transaction {} was not authorized",
        receipt.transaction_id
      )));
    }
    Ok(receipt)
  }

  /// Writes order and items as one unit. Business-rule failures raised by the
  /// store pass through unchanged; anything else is wrapped.
  #[instrument(
    name = "order_workflow::persist",
    skip(self, priced, receipt),
    fields(transaction_id = %receipt.transaction_id)
  )]
  pub async fn persist(&self, user_id: &str, priced: PricedOrder, receipt: &PaymentReceipt) -> ShopResult<Order> {
    let draft = OrderDraft {
      user_id: user_id.to_string(),
      total_amount: priced.total_amount,
      status: ORDER_STATUS_PAID.to_string(),
      items: priced.items,
    };

    match self.orders.insert_order(draft, self.stock_policy).await {
      Ok(order) => Ok(order),
      Err(err) => {
        // The payment was already authorized. Nothing refunds or retries it.
        error!(
          error = %err,
          transaction_id = %receipt.transaction_id,
          "Order persistence failed after payment authorization; transaction left unreconciled."
        );
        if err.is_business_rule() {
          Err(err)
        } else {
          Err(ShopError::OrderCreationFailed { source: err.into() })
        }
      }
    }
  }

  /// Runs the whole workflow for `user_id`.
  #[instrument(name = "order_workflow::create", skip(self, lines), fields(lines = lines.len()))]
  pub async fn create(&self, user_id: &str, lines: &[OrderLine]) -> ShopResult<Order> {
    self.validate(lines).await?;
    let priced = self.price(lines).await?;
    let receipt = self.authorize(priced.total_amount)?;
    let order = self.persist(user_id, priced, &receipt).await?;
    info!(
      order_id = order.id,
      total_amount = order.total_amount,
      transaction_id = %receipt.transaction_id,
      "Order placed."
    );
    Ok(order)
  }

  /// All of a user's orders with items, newest first.
  pub async fn history(&self, user_id: &str) -> ShopResult<Vec<Order>> {
    self.orders.orders_for_user(user_id).await
  }

  /// A single order, only if `user_id` owns it.
  pub async fn get_for_user(&self, user_id: &str, order_id: i64) -> ShopResult<Order> {
    match self.orders.get_order(order_id).await? {
      Some(order) if order.user_id == user_id => Ok(order),
      _ => Err(ShopError::NotFound(format!("Order with ID {} not found", order_id))),
    }
  }
}
