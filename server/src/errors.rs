// subvault_server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use subvault::SubvaultError;
use thiserror::Error;

pub const TRY_AGAIN: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Storefront Error: {source}")]
  Core {
    #[from]
    source: SubvaultError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// The body a client sees. Never carries storage details or internal identifiers.
  fn public_message(&self) -> String {
    match self {
      AppError::Validation(m) => m.clone(),
      AppError::Auth(m) => m.clone(),
      AppError::NotFound(m) => m.clone(),
      AppError::Config(_) | AppError::Internal(_) => "An internal error occurred.".to_string(),
      AppError::Sqlx(_) => TRY_AGAIN.to_string(),
      AppError::Core { source } => match source {
        SubvaultError::NotFound { entity, .. } => match *entity {
          "order" => "Order not found.".to_string(),
          "product" => "Product not found.".to_string(),
          _ => "Not found.".to_string(),
        },
        SubvaultError::Validation(m) => m.clone(),
        SubvaultError::Unauthorized => "Staff sign-in required.".to_string(),
        SubvaultError::InvalidTransition { from, to } => {
          format!("An order cannot move from '{}' to '{}'.", from, to)
        }
        SubvaultError::Conflict { .. } => {
          "This order was changed by someone else. Reload it and try again.".to_string()
        }
        SubvaultError::DuplicateOrderId { .. } | SubvaultError::Storage { .. } => TRY_AGAIN.to_string(),
        SubvaultError::Evidence { .. } => "Upload failed. Please try again.".to_string(),
      },
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
      AppError::Sqlx(_) => StatusCode::SERVICE_UNAVAILABLE,
      AppError::Core { source } => match source {
        SubvaultError::NotFound { .. } => StatusCode::NOT_FOUND,
        SubvaultError::Validation(_) => StatusCode::BAD_REQUEST,
        SubvaultError::Unauthorized => StatusCode::UNAUTHORIZED,
        SubvaultError::InvalidTransition { .. } | SubvaultError::Conflict { .. } => StatusCode::CONFLICT,
        SubvaultError::DuplicateOrderId { .. } | SubvaultError::Storage { .. } | SubvaultError::Evidence { .. } => {
          StatusCode::SERVICE_UNAVAILABLE
        }
      },
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    // Log the full error when it's turned into a response
    if status.is_server_error() {
      tracing::error!(application_error = %self, status = status.as_u16(), "Responding with error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with error");
    }
    HttpResponse::build(status).json(json!({ "error": self.public_message() }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
