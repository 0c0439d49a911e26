// server/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use shopmock::models::{NewProduct, ProductChanges};
use shopmock::policy::DEFAULT_PAGE_SIZE;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::SuperUser;

#[derive(Deserialize, Debug)]
pub struct ListProductsQuery {
  pub page: Option<i64>,
  pub page_size: Option<i64>,
  pub q: Option<String>,
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let query = query_params.into_inner();
  let page = app_state
    .catalog
    .list(
      query.page.unwrap_or(1),
      query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
      query.q.as_deref(),
    )
    .await?;
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.catalog.get(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(
    name = "handler::create_product",
    skip(app_state, admin, req_payload),
    fields(admin_id = admin.0.id)
)]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  admin: SuperUser,
  req_payload: web::Json<NewProduct>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.catalog.create(req_payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(product))
}

#[instrument(
    name = "handler::update_product",
    skip(app_state, admin, path, req_payload),
    fields(admin_id = admin.0.id, product_id = %path.as_ref())
)]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  admin: SuperUser,
  path: web::Path<i64>,
  req_payload: web::Json<ProductChanges>,
) -> Result<HttpResponse, AppError> {
  let product = app_state
    .catalog
    .update(path.into_inner(), req_payload.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(
    name = "handler::delete_product",
    skip(app_state, admin, path),
    fields(admin_id = admin.0.id, product_id = %path.as_ref())
)]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  admin: SuperUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  app_state.catalog.delete(path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}
