// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different slice of these helpers.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::{
  atomic::{AtomicBool, AtomicUsize, Ordering},
  Arc,
};
use subvault::{
  AdminReviewService, CatalogService, CheckoutForm, CheckoutService, Clock, EvidenceService, EvidenceStore,
  LifecycleEngine, ManualClock, MemoryStore, Order, OrderId, OrderIdGenerator, OrderLookupService, OrderStore,
  Product, ProductStore, RandomOrderIdGenerator, StatusChange, SubvaultResult, TransitionEvent, TransitionPolicy,
};
use subvault::model::Category;
use tracing::Level;
use uuid::Uuid;

// --- Tracing ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Time ---
pub fn t0() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
}

// --- Identifier generators ---

/// Hands out queued identifiers first, then random ones.
pub struct SequenceIdGenerator {
  queued: Mutex<VecDeque<OrderId>>,
  fallback: RandomOrderIdGenerator,
}

impl SequenceIdGenerator {
  pub fn new(ids: &[&str]) -> Self {
    let queued = ids.iter().map(|raw| OrderId::parse(raw).expect("valid test order id")).collect();
    Self {
      queued: Mutex::new(queued),
      fallback: RandomOrderIdGenerator,
    }
  }
}

impl OrderIdGenerator for SequenceIdGenerator {
  fn generate(&self) -> OrderId {
    self.queued.lock().pop_front().unwrap_or_else(|| self.fallback.generate())
  }
}

// --- Evidence blobs ---

#[derive(Default)]
pub struct RecordingEvidenceStore {
  pub puts: Mutex<Vec<(String, String, usize)>>,
  pub fail: AtomicBool,
}

#[async_trait]
impl EvidenceStore for RecordingEvidenceStore {
  async fn put(&self, object_name: &str, content_type: &str, bytes: Vec<u8>) -> anyhow::Result<String> {
    if self.fail.load(Ordering::SeqCst) {
      anyhow::bail!("blob backend unavailable");
    }
    self
      .puts
      .lock()
      .push((object_name.to_string(), content_type.to_string(), bytes.len()));
    Ok(format!("https://blobs.test/evidence/{}", object_name))
  }
}

// --- Store wrapper that counts every call ---

#[derive(Default)]
pub struct CountingStore {
  pub inner: MemoryStore,
  pub calls: AtomicUsize,
}

impl CountingStore {
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  /// Reads straight from the wrapped store without counting.
  pub async fn inner_order(&self, raw_order_id: &str) -> Order {
    let id = OrderId::parse(raw_order_id).expect("valid order id");
    self.inner.find_order(&id).await.unwrap().expect("order exists")
  }

  fn hit(&self) {
    self.calls.fetch_add(1, Ordering::SeqCst);
  }
}

#[async_trait]
impl OrderStore for CountingStore {
  async fn insert_order(&self, order: Order) -> SubvaultResult<Order> {
    self.hit();
    self.inner.insert_order(order).await
  }

  async fn find_order(&self, order_id: &OrderId) -> SubvaultResult<Option<Order>> {
    self.hit();
    self.inner.find_order(order_id).await
  }

  async fn list_orders(&self) -> SubvaultResult<Vec<Order>> {
    self.hit();
    self.inner.list_orders().await
  }

  async fn apply_transition(&self, order_id: &OrderId, change: &StatusChange) -> SubvaultResult<(Order, TransitionEvent)> {
    self.hit();
    self.inner.apply_transition(order_id, change).await
  }

  async fn set_evidence(&self, order_id: &OrderId, evidence_url: &str, at: DateTime<Utc>) -> SubvaultResult<Order> {
    self.hit();
    self.inner.set_evidence(order_id, evidence_url, at).await
  }

  async fn transition_history(&self, order_id: &OrderId) -> SubvaultResult<Vec<TransitionEvent>> {
    self.hit();
    self.inner.transition_history(order_id).await
  }
}

#[async_trait]
impl ProductStore for CountingStore {
  async fn insert_product(&self, product: Product) -> SubvaultResult<Product> {
    self.hit();
    self.inner.insert_product(product).await
  }

  async fn find_product(&self, id: Uuid) -> SubvaultResult<Option<Product>> {
    self.hit();
    self.inner.find_product(id).await
  }

  async fn list_products(&self) -> SubvaultResult<Vec<Product>> {
    self.hit();
    self.inner.list_products().await
  }

  async fn update_product(&self, product: Product) -> SubvaultResult<Product> {
    self.hit();
    self.inner.update_product(product).await
  }

  async fn delete_product(&self, id: Uuid) -> SubvaultResult<()> {
    self.hit();
    self.inner.delete_product(id).await
  }
}

// --- Fixtures ---

pub fn product(name: &str, price_cents: i64, category: Category, available: bool, at: DateTime<Utc>) -> Product {
  Product {
    id: Uuid::new_v4(),
    name: name.to_string(),
    description: format!("{} subscription", name),
    price_cents,
    plan_type: "1 Month".to_string(),
    category,
    thumbnail_url: format!("https://cdn.test/{}.png", name.to_lowercase().replace(' ', "-")),
    benefits: vec!["Instant delivery".to_string()],
    stock_available: available,
    created_at: at,
    updated_at: at,
  }
}

pub fn checkout_form(product_id: Uuid) -> CheckoutForm {
  CheckoutForm {
    full_name: "Asha Rao".to_string(),
    email: "asha@example.com".to_string(),
    phone: "+91 98765 43210".to_string(),
    product_id: product_id.to_string(),
    payment_method: "upi".to_string(),
    transaction_id: "UPI-20250314-0001".to_string(),
    notes: None,
  }
}

// --- Harness ---

/// Every service wired over one shared store and a manual clock.
pub struct Harness {
  pub store: Arc<CountingStore>,
  pub clock: Arc<ManualClock>,
  pub blobs: Arc<RecordingEvidenceStore>,
  pub lifecycle: Arc<LifecycleEngine>,
  pub checkout: CheckoutService,
  pub lookup: OrderLookupService,
  pub admin: AdminReviewService,
  pub evidence: EvidenceService,
  pub catalog: CatalogService,
}

impl Harness {
  pub fn new() -> Self {
    Self::build(TransitionPolicy::Permissive, Arc::new(RandomOrderIdGenerator))
  }

  pub fn with_policy(policy: TransitionPolicy) -> Self {
    Self::build(policy, Arc::new(RandomOrderIdGenerator))
  }

  pub fn with_ids(ids: Arc<dyn OrderIdGenerator>) -> Self {
    Self::build(TransitionPolicy::Permissive, ids)
  }

  fn build(policy: TransitionPolicy, ids: Arc<dyn OrderIdGenerator>) -> Self {
    let store = Arc::new(CountingStore::default());
    let clock = Arc::new(ManualClock::new(t0()));
    let blobs = Arc::new(RecordingEvidenceStore::default());

    let orders: Arc<dyn OrderStore> = store.clone();
    let products: Arc<dyn ProductStore> = store.clone();
    let dyn_clock: Arc<dyn Clock> = clock.clone();

    let lifecycle = Arc::new(LifecycleEngine::new(orders.clone(), policy, dyn_clock.clone()));
    Self {
      checkout: CheckoutService::new(orders.clone(), products.clone(), ids, dyn_clock.clone()),
      lookup: OrderLookupService::new(orders.clone()),
      admin: AdminReviewService::new(orders.clone(), products.clone(), lifecycle.clone(), dyn_clock.clone()),
      evidence: EvidenceService::new(orders, blobs.clone(), dyn_clock),
      catalog: CatalogService::new(products),
      lifecycle,
      store,
      clock,
      blobs,
    }
  }

  pub fn now_millis(&self) -> i64 {
    self.clock.now().timestamp_millis()
  }

  pub async fn seed_product(&self, name: &str, price_cents: i64, available: bool) -> Product {
    let p = product(name, price_cents, Category::Streaming, available, self.clock.now());
    self.store.inner.insert_product(p).await.expect("seed product")
  }

  /// Places an order for a freshly seeded, available product.
  pub async fn place_order(&self) -> Order {
    let p = self.seed_product("Netflix Premium", 19900, true).await;
    self.checkout.place_order(checkout_form(p.id)).await.expect("place order")
  }
}
