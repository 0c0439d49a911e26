// server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use orka::{ContextData, PipelineResult};
use serde::Deserialize;
use shopmock::models::OrderLine;
use tracing::instrument;

use crate::errors::AppError;
use crate::pipelines::contexts::{missing, stopped, OrderCtxData};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

// --- Request DTO ---
/// The order owner always comes from the token; a `user_id` in the body is ignored.
#[derive(Deserialize, Debug)]
pub struct CreateOrderPayload {
  pub items: Vec<OrderLine>,
}

#[instrument(
    name = "handler::create_order",
    skip(app_state, auth_user, req_payload),
    fields(user_id = auth_user.0.id, lines = req_payload.items.len())
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<CreateOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let owner = auth_user.0.id.to_string();
  let ctx_data = ContextData::new(OrderCtxData::new(
    app_state.get_ref().clone(),
    owner,
    req_payload.into_inner().items,
  ));

  match app_state.orka_instance.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let order = ctx_data.write().order.take().ok_or_else(|| missing("order"))?;
      Ok(HttpResponse::Ok().json(order))
    }
    PipelineResult::Stopped => Err(stopped("Order")),
  }
}

#[instrument(name = "handler::order_history", skip(app_state, auth_user), fields(user_id = auth_user.0.id))]
pub async fn order_history_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.orders.history(&auth_user.0.id.to_string()).await?;
  Ok(HttpResponse::Ok().json(orders))
}

pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .orders
    .get_for_user(&auth_user.0.id.to_string(), path.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(order))
}
