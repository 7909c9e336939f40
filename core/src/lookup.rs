// subvault/src/lookup.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::{SubvaultError, SubvaultResult};
use crate::model::{Order, OrderStatus, PaymentMethod};
use crate::order_id::OrderId;
use crate::store::OrderStore;

/// What the anonymous tracker shows. Internal storage keys and the version token stay
/// out of this view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedOrder {
  pub order_id: OrderId,
  pub customer_name: String,
  pub email: String,
  pub phone: String,
  pub product_name: String,
  pub amount_cents: i64,
  pub payment_method: PaymentMethod,
  pub transaction_id: String,
  pub payment_evidence_url: Option<String>,
  pub customer_note: Option<String>,
  pub status: OrderStatus,
  pub status_message: &'static str,
  pub operator_note: Option<String>,
  pub delivery_details: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<Order> for TrackedOrder {
  fn from(order: Order) -> Self {
    TrackedOrder {
      status_message: order.status.customer_message(),
      order_id: order.order_id,
      customer_name: order.customer_name,
      email: order.email,
      phone: order.phone,
      product_name: order.product_name,
      amount_cents: order.amount_cents,
      payment_method: order.payment_method,
      transaction_id: order.transaction_id,
      payment_evidence_url: order.payment_evidence_url,
      customer_note: order.customer_note,
      status: order.status,
      operator_note: order.operator_note,
      delivery_details: order.delivery_details,
      created_at: order.created_at,
      updated_at: order.updated_at,
    }
  }
}

/// Customer-facing read path. Holding the public identifier is the only credential.
pub struct OrderLookupService {
  orders: Arc<dyn OrderStore>,
}

impl OrderLookupService {
  pub fn new(orders: Arc<dyn OrderStore>) -> Self {
    Self { orders }
  }

  #[instrument(name = "lookup::track", skip(self), err(Display))]
  pub async fn track(&self, raw_order_id: &str) -> SubvaultResult<TrackedOrder> {
    if raw_order_id.trim().is_empty() {
      return Err(SubvaultError::validation("Please enter a valid Order ID."));
    }
    let order_id = match OrderId::parse(raw_order_id) {
      Some(id) => id,
      None => {
        debug!("Tracker input is not an order identifier.");
        return Err(SubvaultError::not_found("order", raw_order_id.trim()));
      }
    };

    self
      .orders
      .find_order(&order_id)
      .await?
      .map(TrackedOrder::from)
      .ok_or_else(|| SubvaultError::not_found("order", order_id.as_str()))
  }
}
