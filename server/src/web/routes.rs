// server/src/web/routes.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::errors::AppError;
use crate::web::handlers::{auth_handlers, order_handlers, payment_handlers, product_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// JSON 404 for unknown routes. Register with `App::default_service`.
pub async fn not_found_handler(req: HttpRequest) -> HttpResponse {
  tracing::debug!(path = %req.path(), "No route matched.");
  HttpResponse::NotFound().json(json!({ "detail": "Not Found" }))
}

// Extraction failures become 400 with the usual `{"detail": ...}` body.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()))
    .app_data(web::PathConfig::default().error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()));
}

// Called from `main.rs` and the HTTP tests to configure the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  extractor_configs(cfg);

  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      // Identity
      .service(
        web::scope("/auth")
          .route("/register", web::post().to(auth_handlers::register_handler))
          .route("/login", web::post().to(auth_handlers::login_handler))
          .route("/logout", web::post().to(auth_handlers::logout_handler))
          .route("/me", web::get().to(auth_handlers::me_handler))
          .route("/change-password", web::post().to(auth_handlers::change_password_handler))
          .route("/profile", web::put().to(auth_handlers::update_profile_handler)),
      )
      // Catalog; mutation is superuser-only via the `SuperUser` extractor
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("", web::post().to(product_handlers::create_product_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
          .route("/{product_id}", web::put().to(product_handlers::update_product_handler))
          .route("/{product_id}", web::delete().to(product_handlers::delete_product_handler)),
      )
      // Orders; "/history" must be registered before "/{order_id}"
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("/history", web::get().to(order_handlers::order_history_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler)),
      )
      .service(web::scope("/payments").route("/checkout", web::post().to(payment_handlers::checkout_handler))),
  );
}
