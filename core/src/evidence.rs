// subvault/src/evidence.rs

//! Payment evidence attachment. Uploads never touch status, notes or version, so an
//! attachment can land while staff are transitioning the same order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::clock::Clock;
use crate::error::{SubvaultError, SubvaultResult};
use crate::model::Order;
use crate::order_id::OrderId;
use crate::store::OrderStore;

/// Blob storage for uploaded payment proofs.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
  /// Stores `bytes` under `object_name` and returns a retrievable reference.
  async fn put(&self, object_name: &str, content_type: &str, bytes: Vec<u8>) -> anyhow::Result<String>;
}

#[derive(Debug, Clone)]
pub struct EvidenceUpload {
  pub content_type: String,
  pub bytes: Vec<u8>,
}

/// `{order_id}-{unix_millis}`
pub fn object_name_for(order_id: &OrderId, at: DateTime<Utc>) -> String {
  format!("{}-{}", order_id, at.timestamp_millis())
}

fn is_image(content_type: &str) -> bool {
  content_type
    .split(';')
    .next()
    .map(|essence| essence.trim().to_ascii_lowercase().starts_with("image/"))
    .unwrap_or(false)
}

pub struct EvidenceService {
  orders: Arc<dyn OrderStore>,
  blobs: Arc<dyn EvidenceStore>,
  clock: Arc<dyn Clock>,
}

impl EvidenceService {
  pub fn new(orders: Arc<dyn OrderStore>, blobs: Arc<dyn EvidenceStore>, clock: Arc<dyn Clock>) -> Self {
    Self { orders, blobs, clock }
  }

  /// Uploads the proof and records its reference on the order.
  ///
  /// Unknown orders are `NotFound` and nothing is uploaded. Non-image content and empty
  /// bodies are `Validation`. A failing blob store surfaces as `Evidence`.
  #[instrument(
    name = "evidence::attach",
    skip_all,
    fields(order_id = %raw_order_id, content_type = %upload.content_type, size = upload.bytes.len()),
    err(Display)
  )]
  pub async fn attach(&self, raw_order_id: &str, upload: EvidenceUpload) -> SubvaultResult<Order> {
    let order_id = OrderId::parse(raw_order_id).ok_or_else(|| SubvaultError::not_found("order", raw_order_id.trim()))?;
    if self.orders.find_order(&order_id).await?.is_none() {
      return Err(SubvaultError::not_found("order", order_id.as_str()));
    }
    if !is_image(&upload.content_type) {
      return Err(SubvaultError::validation("Payment evidence must be an image."));
    }
    if upload.bytes.is_empty() {
      return Err(SubvaultError::validation("Payment evidence file is empty."));
    }

    let at = self.clock.now();
    let object_name = object_name_for(&order_id, at);
    let url = self
      .blobs
      .put(&object_name, &upload.content_type, upload.bytes)
      .await
      .map_err(|source| SubvaultError::Evidence { source })?;

    let order = self.orders.set_evidence(&order_id, &url, at).await?;
    info!(order_id = %order.order_id, %object_name, "Payment evidence attached.");
    Ok(order)
  }
}
