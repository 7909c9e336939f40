// subvault_server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use subvault::TransitionPolicy;

pub const DEFAULT_EVIDENCE_MAX_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub app_base_url: String,

  // Payment evidence blobs
  pub evidence_dir: PathBuf,
  pub evidence_max_bytes: usize,

  // Staff sign-in
  pub staff_email: String,
  pub staff_password_hash: String,
  pub session_ttl_minutes: i64,

  pub transition_policy: TransitionPolicy,
  pub run_migrations: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_source(|name| env::var(name).ok())
  }

  /// Builds the configuration from any key lookup. `from_env` passes the process
  /// environment.
  pub fn from_source<F>(source: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get_env = |var_name: &str| {
      source(var_name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;
    let app_base_url = get_env("APP_BASE_URL")
      .unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port))
      .trim_end_matches('/')
      .to_string();

    let evidence_dir = PathBuf::from(get_env("EVIDENCE_DIR").unwrap_or_else(|_| "./evidence".to_string()));
    let evidence_max_bytes = match get_env("EVIDENCE_MAX_BYTES") {
      Ok(raw) => raw
        .parse::<usize>()
        .map_err(|e| AppError::Config(format!("Invalid EVIDENCE_MAX_BYTES: {}", e)))?,
      Err(_) => DEFAULT_EVIDENCE_MAX_BYTES,
    };

    let staff_email = get_env("STAFF_EMAIL")?.trim().to_lowercase();
    let staff_password_hash = get_env("STAFF_PASSWORD_HASH")?;
    if !staff_password_hash.starts_with("$argon2") {
      return Err(AppError::Config(
        "STAFF_PASSWORD_HASH must be an argon2 PHC string (see the hash_password binary)".to_string(),
      ));
    }
    let session_ttl_minutes = get_env("SESSION_TTL_MINUTES")
      .unwrap_or_else(|_| "480".to_string())
      .parse::<i64>()
      .ok()
      .filter(|m| *m > 0)
      .ok_or_else(|| AppError::Config("Invalid SESSION_TTL_MINUTES: expected a positive integer".to_string()))?;

    let transition_policy = get_env("TRANSITION_POLICY")
      .unwrap_or_else(|_| "permissive".to_string())
      .parse::<TransitionPolicy>()
      .map_err(|e| AppError::Config(format!("Invalid TRANSITION_POLICY: {}", e)))?;

    let run_migrations = get_env("RUN_MIGRATIONS")
      .unwrap_or_else(|_| "true".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid RUN_MIGRATIONS value: {}", e)))?;

    tracing::info!(
      %transition_policy,
      evidence_dir = %evidence_dir.display(),
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      app_base_url,
      evidence_dir,
      evidence_max_bytes,
      staff_email,
      staff_password_hash,
      session_ttl_minutes,
      transition_policy,
      run_migrations,
    })
  }
}
