// subvault/src/store/memory.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{SubvaultError, SubvaultResult};
use crate::lifecycle::StatusChange;
use crate::model::{Order, Product, TransitionEvent};
use crate::order_id::OrderId;
use crate::store::{OrderStore, ProductStore};

#[derive(Debug, Default)]
struct Tables {
  orders: HashMap<OrderId, Order>,
  transitions: HashMap<OrderId, Vec<TransitionEvent>>,
  products: HashMap<Uuid, Product>,
}

/// Process-local store for tests, demos and single-node development.
///
/// Each operation takes the lock once and releases it before returning. Guards are
/// never held across an `.await`.
#[derive(Debug, Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn insert_order(&self, order: Order) -> SubvaultResult<Order> {
    let mut tables = self.tables.write();
    if tables.orders.contains_key(&order.order_id) {
      return Err(SubvaultError::DuplicateOrderId {
        order_id: order.order_id.clone(),
      });
    }
    debug!(order_id = %order.order_id, "Inserting order into memory store.");
    tables.orders.insert(order.order_id.clone(), order.clone());
    Ok(order)
  }

  async fn find_order(&self, order_id: &OrderId) -> SubvaultResult<Option<Order>> {
    Ok(self.tables.read().orders.get(order_id).cloned())
  }

  async fn list_orders(&self) -> SubvaultResult<Vec<Order>> {
    let mut orders: Vec<Order> = self.tables.read().orders.values().cloned().collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.order_id.cmp(&a.order_id)));
    Ok(orders)
  }

  async fn apply_transition(&self, order_id: &OrderId, change: &StatusChange) -> SubvaultResult<(Order, TransitionEvent)> {
    let mut tables = self.tables.write();
    let stored = tables
      .orders
      .get(order_id)
      .ok_or_else(|| SubvaultError::not_found("order", order_id.as_str()))?;

    // Work on a copy so a refused change never leaves a half-written record.
    let mut updated = stored.clone();
    let event = change.apply_to(&mut updated)?;

    tables.orders.insert(order_id.clone(), updated.clone());
    tables
      .transitions
      .entry(order_id.clone())
      .or_default()
      .push(event.clone());
    Ok((updated, event))
  }

  async fn set_evidence(&self, order_id: &OrderId, evidence_url: &str, at: DateTime<Utc>) -> SubvaultResult<Order> {
    let mut tables = self.tables.write();
    let order = tables
      .orders
      .get_mut(order_id)
      .ok_or_else(|| SubvaultError::not_found("order", order_id.as_str()))?;
    order.payment_evidence_url = Some(evidence_url.to_string());
    order.updated_at = at;
    Ok(order.clone())
  }

  async fn transition_history(&self, order_id: &OrderId) -> SubvaultResult<Vec<TransitionEvent>> {
    let tables = self.tables.read();
    if !tables.orders.contains_key(order_id) {
      return Err(SubvaultError::not_found("order", order_id.as_str()));
    }
    Ok(tables.transitions.get(order_id).cloned().unwrap_or_default())
  }
}

#[async_trait]
impl ProductStore for MemoryStore {
  async fn insert_product(&self, product: Product) -> SubvaultResult<Product> {
    self.tables.write().products.insert(product.id, product.clone());
    Ok(product)
  }

  async fn find_product(&self, id: Uuid) -> SubvaultResult<Option<Product>> {
    Ok(self.tables.read().products.get(&id).cloned())
  }

  async fn list_products(&self) -> SubvaultResult<Vec<Product>> {
    let mut products: Vec<Product> = self.tables.read().products.values().cloned().collect();
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.name.cmp(&b.name)));
    Ok(products)
  }

  async fn update_product(&self, product: Product) -> SubvaultResult<Product> {
    let mut tables = self.tables.write();
    match tables.products.get_mut(&product.id) {
      Some(slot) => {
        *slot = product.clone();
        Ok(product)
      }
      None => Err(SubvaultError::not_found("product", product.id.to_string())),
    }
  }

  async fn delete_product(&self, id: Uuid) -> SubvaultResult<()> {
    match self.tables.write().products.remove(&id) {
      Some(_) => Ok(()),
      None => Err(SubvaultError::not_found("product", id.to_string())),
    }
  }
}
