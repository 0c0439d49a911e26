// server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use shopmock::{MemoryStore, PgStore, Repositories};
use shopmock_server::config::AppConfig;
use shopmock_server::state::AppState;
use shopmock_server::{seed, web};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

/// Picks the storage backend named by `DATABASE_URL`.
async fn open_repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
  if config.uses_memory_store() {
    tracing::warn!("Using the in-memory store; data is lost on shutdown.");
    return Ok(Repositories::in_memory(Arc::new(MemoryStore::new())));
  }

  let store = PgStore::connect(&config.database_url, config.database_max_connections)
    .await
    .context("Failed to connect to the database")?;
  store.ensure_schema().await.context("Failed to apply the database schema")?;
  Ok(Repositories::postgres(store))
}

async fn build_state() -> anyhow::Result<AppState> {
  let app_config = Arc::new(AppConfig::from_env().context("Configuration error")?);
  let repos = open_repositories(&app_config).await?;
  let app_state = AppState::new(repos, app_config.clone());

  if app_config.seed_db {
    seed::seed_catalog(&app_state.catalog).await.context("Failed to seed the catalog")?;
  }
  if let Some(admin) = &app_config.admin {
    seed::bootstrap_admin(&app_state.auth, admin)
      .await
      .context("Failed to create the bootstrap superuser")?;
  }
  Ok(app_state)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  // RUST_LOG overrides the default level.
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  tracing::info!("Starting shop server...");

  let app_state = build_state().await.map_err(|e| {
    tracing::error!(error = ?e, "Startup failed.");
    e
  })?;

  let server_address = format!("{}:{}", app_state.config.server_host, app_state.config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(web::configure_app_routes)
      .default_service(actix_data::route().to(web::not_found_handler))
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await?;

  Ok(())
}
