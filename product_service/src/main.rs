// product_service/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

use product_service::config::{AppConfig, StorageBackend};
use product_service::errors::{AppError, Result as AppResult};
use product_service::repository::{InMemoryProductRepository, PgProductRepository, ProductRepository};
use product_service::state::AppState;
use product_service::web::configure_app_routes;

async fn build_repository(config: &AppConfig) -> AppResult<Arc<dyn ProductRepository>> {
  match config.storage_backend {
    StorageBackend::Memory => {
      tracing::warn!("Using the in-memory product store; data is lost on shutdown.");
      Ok(Arc::new(InMemoryProductRepository::new()))
    }
    StorageBackend::Postgres => {
      let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::Config("Missing environment variable 'DATABASE_URL'".to_string()))?;
      let repository = PgProductRepository::connect(database_url).await?;
      if config.run_migrations {
        repository.run_migrations().await?;
      }
      Ok(Arc::new(repository))
    }
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  tracing::info!("Starting product catalog server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };

  let repository = match build_repository(&app_config).await {
    Ok(repository) => repository,
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialize product storage.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  };

  let app_state = AppState::new(repository, app_config.clone());

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
