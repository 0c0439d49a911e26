// server/src/web/handlers/payment_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct CheckoutPayload {
  pub amount: i64,
}

/// Runs the payment stub directly. Nothing is persisted.
#[instrument(name = "handler::checkout", skip(app_state))]
pub async fn checkout_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CheckoutPayload>,
) -> Result<HttpResponse, AppError> {
  let receipt = app_state.payments.process(req_payload.amount);
  Ok(HttpResponse::Ok().json(receipt))
}
