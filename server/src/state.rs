// server/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use orka::Orka;
use shopmock::{
  AuthService, CatalogService, OrderWorkflow, PaymentGateway, Repositories, StubPaymentGateway, TokenIssuer,
};
use std::sync::Arc;

/// Services shared by every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
  pub auth: Arc<AuthService>,
  pub catalog: Arc<CatalogService>,
  pub orders: Arc<OrderWorkflow>,
  pub payments: Arc<dyn PaymentGateway>,
  pub orka_instance: Arc<Orka<AppError>>,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  /// Wires the services over `repos` with the stub payment gateway and
  /// registers the application pipelines.
  pub fn new(repos: Repositories, config: Arc<AppConfig>) -> Self {
    Self::with_payments(repos, config, Arc::new(StubPaymentGateway))
  }

  pub fn with_payments(repos: Repositories, config: Arc<AppConfig>, payments: Arc<dyn PaymentGateway>) -> Self {
    let tokens = TokenIssuer::new(config.secret_key.as_bytes(), config.token_lifetime());
    let auth = AuthService::new(repos.users.clone(), tokens);
    let catalog = CatalogService::new(repos.products.clone(), config.stock_visibility());
    let orders = OrderWorkflow::new(
      repos.products.clone(),
      repos.orders.clone(),
      payments.clone(),
      config.stock_policy(),
    );

    let orka_instance = Arc::new(Orka::<AppError>::new());
    pipelines::register_all_pipelines(&orka_instance);

    Self {
      auth: Arc::new(auth),
      catalog: Arc::new(catalog),
      orders: Arc::new(orders),
      payments,
      orka_instance,
      config,
    }
  }
}
