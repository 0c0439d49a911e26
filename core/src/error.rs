// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Every failure a shop operation can surface to its caller.
///
/// Business-rule variants carry a human-readable message that is safe to show
/// to clients. `OrderCreationFailed`, `Storage` and `Internal` carry causes that
/// must be logged but never echoed back verbatim.
#[derive(Debug, Error)]
pub enum ShopError {
  /// Duplicate email or username, or a row that is still referenced.
  #[error("{0}")]
  Conflict(String),

  /// Bad credentials, or a missing/invalid/expired bearer token.
  #[error("{0}")]
  Unauthorized(String),

  /// Inactive account or insufficient privilege.
  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  /// Bad quantity, insufficient stock, malformed input, wrong current password.
  #[error("{0}")]
  Validation(String),

  /// The payment collaborator refused the amount. The stub never produces this.
  #[error("Payment processing failed: {0}")]
  PaymentDeclined(String),

  /// Persisting an already-authorized order failed and was rolled back.
  #[error("Failed to create order. Source: {source}")]
  OrderCreationFailed {
    #[source]
    source: AnyhowError,
  },

  #[error("Storage error: {0}")]
  Storage(#[from] sqlx::Error),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl ShopError {
  /// True for failures caused by the request itself rather than by the system.
  pub fn is_business_rule(&self) -> bool {
    matches!(
      self,
      ShopError::Conflict(_)
        | ShopError::Unauthorized(_)
        | ShopError::Forbidden(_)
        | ShopError::NotFound(_)
        | ShopError::Validation(_)
        | ShopError::PaymentDeclined(_)
    )
  }

  pub(crate) fn product_not_found(product_id: i64) -> Self {
    ShopError::NotFound(format!("Product with ID {} not found", product_id))
  }
}

pub type ShopResult<T, E = ShopError> = std::result::Result<T, E>;
