// subvault/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::model::OrderStatus;
use crate::order_id::OrderId;

#[derive(Debug, Error)]
pub enum SubvaultError {
  #[error("{entity} not found: {key}")]
  NotFound { entity: &'static str, key: String },

  #[error("Validation failed: {0}")]
  Validation(String),

  #[error("A valid staff session is required")]
  Unauthorized,

  #[error("Transition from '{from}' to '{to}' is not allowed")]
  InvalidTransition { from: OrderStatus, to: OrderStatus },

  #[error("Order {order_id} changed concurrently (expected version {expected}, found {actual})")]
  Conflict {
    order_id: OrderId,
    expected: i64,
    actual: i64,
  },

  #[error("Order identifier {order_id} is already taken")]
  DuplicateOrderId { order_id: OrderId },

  #[error("Storage operation failed. Source: {source}")]
  Storage {
    #[source]
    source: AnyhowError,
  },

  #[error("Evidence upload failed. Source: {source}")]
  Evidence {
    #[source]
    source: AnyhowError,
  },
}

impl SubvaultError {
  pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
    SubvaultError::NotFound {
      entity,
      key: key.into(),
    }
  }

  pub fn validation(message: impl Into<String>) -> Self {
    SubvaultError::Validation(message.into())
  }

  /// Wraps a backend error (database driver, I/O) as a storage failure.
  pub fn storage<E>(err: E) -> Self
  where
    E: Into<AnyhowError>,
  {
    SubvaultError::Storage { source: err.into() }
  }

  /// Errors a caller may reasonably retry by submitting again.
  pub fn is_transient(&self) -> bool {
    matches!(
      self,
      SubvaultError::Storage { .. } | SubvaultError::DuplicateOrderId { .. } | SubvaultError::Evidence { .. }
    )
  }
}

// Backends that surface plain anyhow errors land in the storage bucket.
impl From<AnyhowError> for SubvaultError {
  fn from(err: AnyhowError) -> Self {
    SubvaultError::Storage { source: err }
  }
}

pub type SubvaultResult<T, E = SubvaultError> = std::result::Result<T, E>;
