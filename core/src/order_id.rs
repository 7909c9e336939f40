// subvault/src/order_id.rs

//! Public order identifiers: `OTT` followed by ten symbols from `A-Z0-9`.
//!
//! The identifier is the only credential a customer holds for the tracker, so its
//! random part comes from the OS CSPRNG. Uniqueness is not promised here; the order
//! store rejects duplicates and checkout retries with a fresh value.

use rand_core::{OsRng, RngCore};
use serde::Serialize;
use std::fmt;

/// Namespace tag that makes order identifiers recognizable in logs and support chats.
pub const ORDER_ID_PREFIX: &str = "OTT";
/// Number of random symbols after the prefix (36^10, about 51.7 bits).
pub const ORDER_ID_RANDOM_LEN: usize = 10;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
// Largest multiple of 36 that fits in a byte; bytes at or above it are redrawn.
const REJECTION_BOUND: u8 = 252;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
  /// Accepts customer or storage input. Surrounding whitespace and lowercase are tolerated.
  /// Returns `None` when the text cannot be an order identifier.
  pub fn parse(raw: &str) -> Option<OrderId> {
    let candidate = raw.trim().to_ascii_uppercase();
    let random_part = candidate.strip_prefix(ORDER_ID_PREFIX)?;
    if random_part.len() != ORDER_ID_RANDOM_LEN {
      return None;
    }
    if !random_part.bytes().all(|b| ALPHABET.contains(&b)) {
      return None;
    }
    Some(OrderId(candidate))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_string(self) -> String {
    self.0
  }
}

impl fmt::Display for OrderId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for OrderId {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

/// Source of fresh order identifiers.
pub trait OrderIdGenerator: Send + Sync {
  fn generate(&self) -> OrderId;
}

/// Draws identifiers from the operating system's random source.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomOrderIdGenerator;

impl OrderIdGenerator for RandomOrderIdGenerator {
  fn generate(&self) -> OrderId {
    let mut id = String::with_capacity(ORDER_ID_PREFIX.len() + ORDER_ID_RANDOM_LEN);
    id.push_str(ORDER_ID_PREFIX);

    let mut buf = [0u8; 16];
    while id.len() < ORDER_ID_PREFIX.len() + ORDER_ID_RANDOM_LEN {
      OsRng.fill_bytes(&mut buf);
      for byte in buf {
        if byte >= REJECTION_BOUND {
          continue;
        }
        id.push(ALPHABET[(byte % 36) as usize] as char);
        if id.len() == ORDER_ID_PREFIX.len() + ORDER_ID_RANDOM_LEN {
          break;
        }
      }
    }
    OrderId(id)
  }
}
