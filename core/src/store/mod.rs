// subvault/src/store/mod.rs

//! Storage contracts. The stores own every persisted order and product; services only
//! ever see copies.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::SubvaultResult;
use crate::lifecycle::StatusChange;
use crate::model::{Order, Product, TransitionEvent};
use crate::order_id::OrderId;

pub use memory::MemoryStore;

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Persists a new order. Fails with `DuplicateOrderId` when the public identifier is
  /// already taken; nothing is written in that case.
  async fn insert_order(&self, order: Order) -> SubvaultResult<Order>;

  async fn find_order(&self, order_id: &OrderId) -> SubvaultResult<Option<Order>>;

  /// All orders, newest first.
  async fn list_orders(&self) -> SubvaultResult<Vec<Order>>;

  /// Applies `change` atomically: status, notes, version, timestamp and the audit event
  /// land together or not at all. Concurrent calls on one order serialize.
  async fn apply_transition(&self, order_id: &OrderId, change: &StatusChange) -> SubvaultResult<(Order, TransitionEvent)>;

  /// Records the payment evidence reference and refreshes `updated_at`.
  /// Status, notes and version are left alone.
  async fn set_evidence(&self, order_id: &OrderId, evidence_url: &str, at: DateTime<Utc>) -> SubvaultResult<Order>;

  /// Applied transitions for one order, oldest first.
  async fn transition_history(&self, order_id: &OrderId) -> SubvaultResult<Vec<TransitionEvent>>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
  async fn insert_product(&self, product: Product) -> SubvaultResult<Product>;

  async fn find_product(&self, id: Uuid) -> SubvaultResult<Option<Product>>;

  /// All products, available or not, newest first.
  async fn list_products(&self) -> SubvaultResult<Vec<Product>>;

  /// Replaces an existing product. `NotFound` if it does not exist.
  async fn update_product(&self, product: Product) -> SubvaultResult<Product>;

  /// Hard delete. Orders keep their snapshot of the product.
  async fn delete_product(&self, id: Uuid) -> SubvaultResult<()>;
}
