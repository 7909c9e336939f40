// subvault/src/model/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::SubvaultError;
use crate::order_id::OrderId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Processing,
  Completed,
  Rejected,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 4] = [
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::Completed,
    OrderStatus::Rejected,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Processing => "processing",
      OrderStatus::Completed => "completed",
      OrderStatus::Rejected => "rejected",
    }
  }

  /// `completed` and `rejected` have no outgoing edges in the lifecycle graph.
  pub fn is_terminal(&self) -> bool {
    matches!(self, OrderStatus::Completed | OrderStatus::Rejected)
  }

  /// Text shown to the customer on the order tracker.
  pub fn customer_message(&self) -> &'static str {
    match self {
      OrderStatus::Pending => {
        "Your payment has been received and is being verified. This usually takes 5-10 minutes."
      }
      OrderStatus::Processing => {
        "Payment verified! We are setting up your premium account. You will receive credentials soon."
      }
      OrderStatus::Completed => "Your order is complete! Check your email and WhatsApp for login credentials.",
      OrderStatus::Rejected => "There was an issue with your payment. Please contact support for assistance.",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = SubvaultError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pending" => Ok(OrderStatus::Pending),
      "processing" => Ok(OrderStatus::Processing),
      "completed" => Ok(OrderStatus::Completed),
      "rejected" => Ok(OrderStatus::Rejected),
      other => Err(SubvaultError::validation(format!(
        "Unknown order status '{}'. Expected one of: pending, processing, completed, rejected.",
        other
      ))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
  Upi,
  BankTransfer,
}

impl PaymentMethod {
  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentMethod::Upi => "upi",
      PaymentMethod::BankTransfer => "bank_transfer",
    }
  }
}

impl Default for PaymentMethod {
  fn default() -> Self {
    PaymentMethod::Upi
  }
}

impl fmt::Display for PaymentMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for PaymentMethod {
  type Err = SubvaultError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "upi" => Ok(PaymentMethod::Upi),
      "bank_transfer" | "bank-transfer" => Ok(PaymentMethod::BankTransfer),
      other => Err(SubvaultError::validation(format!(
        "Unknown payment method '{}'. Expected 'upi' or 'bank_transfer'.",
        other
      ))),
    }
  }
}

/// A single purchase attempt.
///
/// Values handed out by the stores are transient copies. The persisted record only
/// changes through `OrderStore::apply_transition` and `OrderStore::set_evidence`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub order_id: OrderId,
  pub customer_name: String,
  pub email: String,
  pub phone: String,
  pub product_id: Uuid,
  /// Snapshot of the product name at purchase time.
  pub product_name: String,
  /// Snapshot of the product price at purchase time, in minor units.
  pub amount_cents: i64,
  pub payment_method: PaymentMethod,
  pub transaction_id: String,
  pub payment_evidence_url: Option<String>,
  pub customer_note: Option<String>,
  pub status: OrderStatus,
  pub operator_note: Option<String>,
  pub delivery_details: Option<String>,
  /// Lifecycle revision, bumped by every applied transition.
  pub version: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Everything the checkout flow knows before the store assigns persistence.
#[derive(Debug, Clone)]
pub struct NewOrder {
  pub customer_name: String,
  pub email: String,
  pub phone: String,
  pub product_id: Uuid,
  pub product_name: String,
  pub amount_cents: i64,
  pub payment_method: PaymentMethod,
  pub transaction_id: String,
  pub customer_note: Option<String>,
}

impl NewOrder {
  pub fn into_pending(self, order_id: OrderId, at: DateTime<Utc>) -> Order {
    Order {
      id: Uuid::new_v4(),
      order_id,
      customer_name: self.customer_name,
      email: self.email,
      phone: self.phone,
      product_id: self.product_id,
      product_name: self.product_name,
      amount_cents: self.amount_cents,
      payment_method: self.payment_method,
      transaction_id: self.transaction_id,
      payment_evidence_url: None,
      customer_note: self.customer_note,
      status: OrderStatus::Pending,
      operator_note: None,
      delivery_details: None,
      version: 1,
      created_at: at,
      updated_at: at,
    }
  }
}

/// One applied status change. Appended by the store in the same unit as the write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEvent {
  pub order_id: OrderId,
  pub from: OrderStatus,
  pub to: OrderStatus,
  pub actor: String,
  pub at: DateTime<Utc>,
}
