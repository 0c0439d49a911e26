// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{web, App};
use once_cell::sync::Lazy;
use shopmock::models::{NewProduct, Product, User};
use shopmock::services::Registration;
use shopmock::{MemoryStore, Repositories};
use shopmock_server::config::AppConfig;
use shopmock_server::state::AppState;
use shopmock_server::web::{configure_app_routes, not_found_handler};
use std::sync::Arc;
use tracing::Level;

pub const TEST_SECRET: &str = "server-test-secret";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

// --- Helper for Tracing Setup (call once per test run if needed) ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub struct TestContext {
  pub state: AppState,
  pub store: Arc<MemoryStore>,
}

pub fn context() -> TestContext {
  context_with(AppConfig::in_memory(TEST_SECRET))
}

pub fn context_with(config: AppConfig) -> TestContext {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let state = AppState::new(Repositories::in_memory(store.clone()), Arc::new(config));
  TestContext { state, store }
}

/// The production route table over `state`, as `main` assembles it.
pub fn test_app(
  state: AppState,
) -> App<
  impl ServiceFactory<
    ServiceRequest,
    Config = (),
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
    InitError = (),
  >,
> {
  App::new()
    .app_data(web::Data::new(state))
    .wrap(tracing_actix_web::TracingLogger::default())
    .configure(configure_app_routes)
    .default_service(web::route().to(not_found_handler))
}

pub fn registration(username: &str) -> Registration {
  Registration {
    email: format!("{}@example.com", username),
    username: username.to_string(),
    full_name: format!("{} Tester", username),
    password: TEST_PASSWORD.to_string(),
  }
}

/// Registers a regular user and returns it with a fresh access token.
pub async fn user_with_token(state: &AppState, username: &str) -> (User, String) {
  let user = state.auth.register(registration(username)).await.expect("register user");
  let token = state.auth.login(username, TEST_PASSWORD).await.expect("login user");
  (user, token.access_token)
}

pub async fn superuser_token(state: &AppState) -> String {
  state
    .auth
    .create_superuser(registration("admin"))
    .await
    .expect("create superuser");
  state
    .auth
    .login("admin", TEST_PASSWORD)
    .await
    .expect("login superuser")
    .access_token
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
  (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn seed_product(state: &AppState, name: &str, price: i64, stock: i32) -> Product {
  state
    .catalog
    .create(NewProduct {
      name: name.to_string(),
      description: None,
      price,
      stock,
      image_url: None,
      category: None,
    })
    .await
    .expect("seed product")
}
