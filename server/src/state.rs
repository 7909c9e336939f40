// subvault_server/src/state.rs
use crate::config::AppConfig;
use crate::services::auth_service::{SessionRegistry, StaffCredentials};
use crate::services::evidence_disk::DiskEvidenceStore;
use chrono::Duration;
use std::sync::Arc;
use subvault::{
  AdminReviewService, CatalogService, CheckoutService, Clock, EvidenceService, LifecycleEngine, OrderIdGenerator,
  OrderLookupService, OrderStore, ProductStore,
};

#[derive(Clone)]
pub struct AppState {
  pub config: Arc<AppConfig>,
  pub checkout: Arc<CheckoutService>,
  pub lookup: Arc<OrderLookupService>,
  pub admin: Arc<AdminReviewService>,
  pub evidence: Arc<EvidenceService>,
  pub evidence_files: Arc<DiskEvidenceStore>,
  pub catalog: Arc<CatalogService>,
  pub staff: Arc<StaffCredentials>,
  pub sessions: Arc<SessionRegistry>,
}

/// Storage and environment seams the services are wired over.
pub struct Backends {
  pub orders: Arc<dyn OrderStore>,
  pub products: Arc<dyn ProductStore>,
  pub evidence_files: Arc<DiskEvidenceStore>,
  pub ids: Arc<dyn OrderIdGenerator>,
  pub clock: Arc<dyn Clock>,
}

impl AppState {
  pub fn new(config: Arc<AppConfig>, backends: Backends) -> Self {
    let Backends {
      orders,
      products,
      evidence_files,
      ids,
      clock,
    } = backends;

    let lifecycle = Arc::new(LifecycleEngine::new(orders.clone(), config.transition_policy, clock.clone()));
    let staff = StaffCredentials {
      email: config.staff_email.clone(),
      password_hash: config.staff_password_hash.clone(),
    };

    Self {
      checkout: Arc::new(CheckoutService::new(orders.clone(), products.clone(), ids, clock.clone())),
      lookup: Arc::new(OrderLookupService::new(orders.clone())),
      admin: Arc::new(AdminReviewService::new(orders.clone(), products.clone(), lifecycle, clock.clone())),
      evidence: Arc::new(EvidenceService::new(orders, evidence_files.clone(), clock.clone())),
      catalog: Arc::new(CatalogService::new(products)),
      sessions: Arc::new(SessionRegistry::new(Duration::minutes(config.session_ttl_minutes), clock)),
      staff: Arc::new(staff),
      evidence_files,
      config,
    }
  }
}
