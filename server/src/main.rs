// subvault_server/src/main.rs

use std::sync::Arc;

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use subvault::{RandomOrderIdGenerator, SystemClock};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use subvault_server::config::AppConfig;
use subvault_server::db::PgStore;
use subvault_server::services::evidence_disk::DiskEvidenceStore;
use subvault_server::state::{AppState, Backends};
use subvault_server::web::configure_app_routes;

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  // LOG_FORMAT=json switches to one JSON object per line for log shippers.
  if std::env::var("LOG_FORMAT").map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(false) {
    tracing_subscriber::fmt().json().with_env_filter(filter).init();
  } else {
    tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_span_events(FmtSpan::CLOSE)
      .init();
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  init_tracing();
  tracing::info!("Starting subvault storefront server...");

  let app_config = Arc::new(AppConfig::from_env().context("Failed to load application configuration")?);

  let db_pool = PgPoolOptions::new()
    .max_connections(10)
    .connect(&app_config.database_url)
    .await
    .context("Failed to connect to the database")?;
  tracing::info!("Successfully connected to the database.");

  if app_config.run_migrations {
    sqlx::migrate!("./migrations")
      .run(&db_pool)
      .await
      .context("Failed to apply database migrations")?;
    tracing::info!("Database migrations applied.");
  }

  let store = Arc::new(PgStore::new(db_pool));
  let evidence_files = Arc::new(
    DiskEvidenceStore::new(&app_config.evidence_dir, &app_config.app_base_url)
      .await
      .with_context(|| format!("Failed to prepare evidence directory {}", app_config.evidence_dir.display()))?,
  );

  let app_state = AppState::new(
    app_config.clone(),
    Backends {
      orders: store.clone(),
      products: store,
      evidence_files,
      ids: Arc::new(RandomOrderIdGenerator),
      clock: Arc::new(SystemClock),
    },
  );

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!(
    policy = ?app_config.transition_policy,
    "Binding server to {}...",
    server_address
  );

  let max_upload = app_config.evidence_max_bytes;
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .app_data(actix_data::PayloadConfig::new(max_upload))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await?;

  Ok(())
}
