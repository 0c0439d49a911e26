// server/src/errors.rs

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use orka::OrkaError;
use serde_json::json;
use shopmock::ShopError;
use thiserror::Error;

const GENERIC_INTERNAL_DETAIL: &str = "Internal server error";
const ORDER_FAILED_DETAIL: &str = "Failed to create order";

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Shop(#[from] ShopError),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: OrkaError,
  },

  /// A request the framework could not decode (body, query string or path).
  #[error("{0}")]
  BadRequest(String),
}

impl AppError {
  /// The message sent to the client. Internal causes are replaced by a generic text.
  fn detail(&self) -> String {
    match self {
      AppError::Shop(ShopError::OrderCreationFailed { .. }) => ORDER_FAILED_DETAIL.to_string(),
      AppError::Shop(ShopError::Storage(_))
      | AppError::Shop(ShopError::Internal(_))
      | AppError::Config(_)
      | AppError::Workflow { .. } => GENERIC_INTERNAL_DETAIL.to_string(),
      AppError::Shop(shop_err) => shop_err.to_string(),
      AppError::BadRequest(message) => message.clone(),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Shop(shop_err) => match shop_err {
        ShopError::Validation(_) => StatusCode::BAD_REQUEST,
        ShopError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ShopError::Forbidden(_) => StatusCode::FORBIDDEN,
        ShopError::NotFound(_) => StatusCode::NOT_FOUND,
        ShopError::Conflict(_) => StatusCode::CONFLICT,
        ShopError::PaymentDeclined(_) => StatusCode::PAYMENT_REQUIRED,
        ShopError::OrderCreationFailed { .. } | ShopError::Storage(_) | ShopError::Internal(_) => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
      AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
      AppError::Config(_) | AppError::Workflow { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      // The full chain goes to the log, never to the client.
      tracing::error!(application_error = ?self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with error");
    }

    let mut response = HttpResponse::build(status);
    if status == StatusCode::UNAUTHORIZED {
      response.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
    }
    response.json(json!({ "detail": self.detail() }))
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
