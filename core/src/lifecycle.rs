// subvault/src/lifecycle.rs

//! The order lifecycle engine.
//!
//! ```text
//! pending ──► processing ──► completed
//!    │             │
//!    └─────────────┴──────► rejected
//! ```
//!
//! Every status change goes through [`LifecycleEngine::transition`]. The engine parses
//! and validates the request, then hands a [`StatusChange`] to the store, which applies
//! it with [`StatusChange::apply_to`] inside its own atomic section. Doing the policy
//! and version checks inside that section means a concurrent writer can never slip in
//! between "read current status" and "write new status".

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::clock::Clock;
use crate::error::{SubvaultError, SubvaultResult};
use crate::model::{Order, OrderStatus, TransitionEvent};
use crate::order_id::OrderId;
use crate::store::OrderStore;

/// Which status changes the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
  /// Any status may move to any status, terminal ones included.
  #[default]
  Permissive,
  /// Only the edges of the lifecycle graph, plus same-status updates that just edit notes.
  Strict,
}

impl TransitionPolicy {
  pub fn allows(&self, from: OrderStatus, to: OrderStatus) -> bool {
    match self {
      TransitionPolicy::Permissive => true,
      TransitionPolicy::Strict => {
        from == to
          || matches!(
            (from, to),
            (OrderStatus::Pending, OrderStatus::Processing)
              | (OrderStatus::Pending, OrderStatus::Rejected)
              | (OrderStatus::Processing, OrderStatus::Completed)
              | (OrderStatus::Processing, OrderStatus::Rejected)
          )
      }
    }
  }
}

impl fmt::Display for TransitionPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TransitionPolicy::Permissive => f.write_str("permissive"),
      TransitionPolicy::Strict => f.write_str("strict"),
    }
  }
}

impl FromStr for TransitionPolicy {
  type Err = SubvaultError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "permissive" => Ok(TransitionPolicy::Permissive),
      "strict" => Ok(TransitionPolicy::Strict),
      other => Err(SubvaultError::validation(format!(
        "Unknown transition policy '{}'. Expected 'permissive' or 'strict'.",
        other
      ))),
    }
  }
}

/// A staff request to move an order, as it arrives from the outside.
///
/// `status` stays textual so malformed values surface as validation errors from the
/// engine rather than as deserialization failures somewhere upstream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
  pub status: String,
  /// Customer-visible note. `None` keeps the stored note; blank text clears it.
  #[serde(default)]
  pub operator_note: Option<String>,
  /// Credentials or instructions. `None` keeps the stored value; blank text clears it.
  #[serde(default)]
  pub delivery_details: Option<String>,
  /// When set, the transition only applies if the order is still at this version.
  #[serde(default)]
  pub expected_version: Option<i64>,
}

impl TransitionRequest {
  pub fn to(status: OrderStatus) -> Self {
    TransitionRequest {
      status: status.as_str().to_string(),
      ..Default::default()
    }
  }

  pub fn with_operator_note(mut self, note: impl Into<String>) -> Self {
    self.operator_note = Some(note.into());
    self
  }

  pub fn with_delivery_details(mut self, details: impl Into<String>) -> Self {
    self.delivery_details = Some(details.into());
    self
  }

  pub fn expecting_version(mut self, version: i64) -> Self {
    self.expected_version = Some(version);
    self
  }
}

/// A validated transition, ready for a store to apply atomically.
#[derive(Debug, Clone)]
pub struct StatusChange {
  pub target: OrderStatus,
  pub operator_note: Option<String>,
  pub delivery_details: Option<String>,
  pub expected_version: Option<i64>,
  pub policy: TransitionPolicy,
  pub actor: String,
  pub at: DateTime<Utc>,
}

impl StatusChange {
  /// Checks version and policy against `order`, then mutates it in place.
  ///
  /// Nothing is written to `order` unless every check passes, so stores can call this
  /// on their locked copy and discard it on error.
  pub fn apply_to(&self, order: &mut Order) -> SubvaultResult<TransitionEvent> {
    if let Some(expected) = self.expected_version {
      if expected != order.version {
        return Err(SubvaultError::Conflict {
          order_id: order.order_id.clone(),
          expected,
          actual: order.version,
        });
      }
    }

    let from = order.status;
    if !self.policy.allows(from, self.target) {
      return Err(SubvaultError::InvalidTransition { from, to: self.target });
    }

    order.status = self.target;
    apply_text_update(&mut order.operator_note, self.operator_note.as_deref());
    apply_text_update(&mut order.delivery_details, self.delivery_details.as_deref());
    order.version += 1;
    order.updated_at = self.at;

    Ok(TransitionEvent {
      order_id: order.order_id.clone(),
      from,
      to: self.target,
      actor: self.actor.clone(),
      at: self.at,
    })
  }
}

fn apply_text_update(slot: &mut Option<String>, update: Option<&str>) {
  match update {
    None => {}
    Some(text) if text.trim().is_empty() => *slot = None,
    Some(text) => *slot = Some(text.trim().to_string()),
  }
}

pub struct LifecycleEngine {
  orders: Arc<dyn OrderStore>,
  policy: TransitionPolicy,
  clock: Arc<dyn Clock>,
}

impl LifecycleEngine {
  pub fn new(orders: Arc<dyn OrderStore>, policy: TransitionPolicy, clock: Arc<dyn Clock>) -> Self {
    Self { orders, policy, clock }
  }

  pub fn policy(&self) -> TransitionPolicy {
    self.policy
  }

  /// Applies a staff-initiated transition and returns the updated order.
  ///
  /// Fails with `Validation` for an unknown target status (before any store access),
  /// `NotFound` for an unknown order, `InvalidTransition` when the policy refuses the
  /// edge and `Conflict` when `expected_version` is stale.
  #[instrument(
    name = "lifecycle::transition",
    skip_all,
    fields(order_id = %raw_order_id, to_status = %request.status, actor = %actor),
    err(Display)
  )]
  pub async fn transition(&self, raw_order_id: &str, request: TransitionRequest, actor: &str) -> SubvaultResult<Order> {
    let target: OrderStatus = request.status.parse()?;
    let order_id = OrderId::parse(raw_order_id).ok_or_else(|| SubvaultError::not_found("order", raw_order_id.trim()))?;

    let change = StatusChange {
      target,
      operator_note: request.operator_note,
      delivery_details: request.delivery_details,
      expected_version: request.expected_version,
      policy: self.policy,
      actor: actor.to_string(),
      at: self.clock.now(),
    };

    match self.orders.apply_transition(&order_id, &change).await {
      Ok((order, event)) => {
        info!(
          order_id = %event.order_id,
          from = %event.from,
          to = %event.to,
          actor = %event.actor,
          version = order.version,
          "Order transitioned."
        );
        Ok(order)
      }
      Err(e) => {
        warn!(order_id = %order_id, to_status = %target, "Order transition refused: {}", e);
        Err(e)
      }
    }
  }

  pub async fn history(&self, order_id: &OrderId) -> SubvaultResult<Vec<TransitionEvent>> {
    self.orders.transition_history(order_id).await
  }
}
