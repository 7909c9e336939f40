// subvault_server/src/services/auth_service.rs

//! Staff authentication: argon2 password checks and the bearer-token session table.

use crate::errors::AppError;
use argon2::{
  password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rand_core::OsRng;
use std::collections::HashMap;
use std::sync::Arc;
use subvault::{Clock, StaffIdentity};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

const INVALID_CREDENTIALS: &str = "Invalid email or password.";

/// Hashes a plain-text password using Argon2 with a fresh random salt.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty for hashing.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  match Argon2::default().hash_password(password.as_bytes(), &salt) {
    Ok(hash) => Ok(hash.to_string()),
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!("Password hashing process failed: {}", argon_err)))
    }
  }
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// `Ok(false)` means the password is wrong. Errors mean the stored hash is unusable.
#[instrument(name = "auth_service::verify_password", skip_all, err(Display))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

/// The single staff account configured for this deployment.
#[derive(Debug, Clone)]
pub struct StaffCredentials {
  pub email: String,
  pub password_hash: String,
}

impl StaffCredentials {
  pub fn check(&self, email: &str, password: &str) -> Result<StaffIdentity, AppError> {
    let email = email.trim().to_lowercase();
    // Verify even on an unknown email so both failures cost the same.
    let password_ok = verify_password(&self.password_hash, password)?;
    if email != self.email || !password_ok {
      return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
    }
    Ok(StaffIdentity { email })
  }
}

#[derive(Debug, Clone)]
struct StaffSession {
  identity: StaffIdentity,
  expires_at: DateTime<Utc>,
}

/// Issued bearer tokens. Process-local: a restart signs everyone out.
pub struct SessionRegistry {
  ttl: Duration,
  clock: Arc<dyn Clock>,
  sessions: RwLock<HashMap<String, StaffSession>>,
}

#[derive(Debug, Clone)]
pub struct IssuedSession {
  pub token: String,
  pub expires_at: DateTime<Utc>,
}

impl SessionRegistry {
  pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
    Self {
      ttl,
      clock,
      sessions: RwLock::new(HashMap::new()),
    }
  }

  #[instrument(name = "sessions::issue", skip_all, fields(staff = %identity.email))]
  pub fn issue(&self, identity: StaffIdentity) -> IssuedSession {
    let now = self.clock.now();
    let token = Uuid::new_v4().simple().to_string();
    let expires_at = now + self.ttl;

    let mut sessions = self.sessions.write();
    sessions.retain(|_, s| s.expires_at > now);
    sessions.insert(token.clone(), StaffSession { identity, expires_at });
    info!(active_sessions = sessions.len(), "Staff session issued.");
    IssuedSession { token, expires_at }
  }

  /// The staff member behind `token`, if the session exists and has not expired.
  pub fn resolve(&self, token: &str) -> Option<StaffIdentity> {
    let now = self.clock.now();
    {
      let sessions = self.sessions.read();
      match sessions.get(token) {
        None => return None,
        Some(s) if s.expires_at > now => return Some(s.identity.clone()),
        Some(_) => {}
      }
    }
    debug!("Dropping expired staff session.");
    self.sessions.write().remove(token);
    None
  }

  pub fn revoke(&self, token: &str) -> bool {
    let removed = self.sessions.write().remove(token).is_some();
    if !removed {
      warn!("Sign-out for an unknown or expired session.");
    }
    removed
  }
}
