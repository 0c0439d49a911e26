// core/src/services/payment.rs

//! Placeholder payment authorization.

use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Authorized,
  Declined,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
  pub status: PaymentStatus,
  pub transaction_id: String,
}

/// The payment collaborator seen by the order workflow and the checkout
/// endpoint. Synchronous: an implementation must not block on I/O.
pub trait PaymentGateway: Send + Sync {
  fn process(&self, amount: i64) -> PaymentReceipt;
}

/// Always authorizes and fabricates a fresh transaction id. No external call.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubPaymentGateway;

impl PaymentGateway for StubPaymentGateway {
  #[instrument(name = "payment_stub::process", skip(self))]
  fn process(&self, amount: i64) -> PaymentReceipt {
    let transaction_id = format!("dummy-{}", Uuid::new_v4());
    info!(%transaction_id, "Simulated payment authorized.");
    PaymentReceipt {
      status: PaymentStatus::Authorized,
      transaction_id,
    }
  }
}
