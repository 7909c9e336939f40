// subvault/src/admin.rs

//! Staff-facing review and catalog administration.
//!
//! Every operation takes the caller's [`SessionContext`] and checks it before the first
//! store access. There is no ambient "current admin" anywhere in the crate.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::catalog::ProductDraft;
use crate::clock::Clock;
use crate::error::{SubvaultError, SubvaultResult};
use crate::export::{export_file_name, orders_csv};
use crate::lifecycle::{LifecycleEngine, TransitionRequest};
use crate::model::{Order, OrderStatus, Product, TransitionEvent};
use crate::order_id::OrderId;
use crate::report::DashboardReport;
use crate::store::{OrderStore, ProductStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffIdentity {
  pub email: String,
}

/// Who is calling, as established by the session provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionContext {
  Anonymous,
  Staff(StaffIdentity),
}

impl SessionContext {
  pub fn staff(email: impl Into<String>) -> Self {
    SessionContext::Staff(StaffIdentity { email: email.into() })
  }

  pub fn require_staff(&self) -> SubvaultResult<&StaffIdentity> {
    match self {
      SessionContext::Staff(identity) => Ok(identity),
      SessionContext::Anonymous => Err(SubvaultError::Unauthorized),
    }
  }
}

/// Staff list filter. `status` of `all` or nothing means every status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
  #[serde(default)]
  pub search: Option<String>,
  #[serde(default)]
  pub status: Option<String>,
}

impl OrderFilter {
  fn status_filter(&self) -> SubvaultResult<Option<OrderStatus>> {
    match self.status.as_deref().map(str::trim) {
      None | Some("") => Ok(None),
      Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
      Some(s) => s.parse().map(Some),
    }
  }

  fn matches(&self, order: &Order, status: Option<OrderStatus>) -> bool {
    if status.is_some_and(|s| order.status != s) {
      return false;
    }
    match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
      None => true,
      Some(needle) => {
        let needle = needle.to_lowercase();
        order.order_id.as_str().to_lowercase().contains(&needle)
          || order.customer_name.to_lowercase().contains(&needle)
          || order.email.to_lowercase().contains(&needle)
      }
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderListing {
  pub orders: Vec<Order>,
  /// Size of the unfiltered order set.
  pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
  pub file_name: String,
  pub body: String,
}

pub struct AdminReviewService {
  orders: Arc<dyn OrderStore>,
  products: Arc<dyn ProductStore>,
  lifecycle: Arc<LifecycleEngine>,
  clock: Arc<dyn Clock>,
}

fn parse_order_id(raw: &str) -> SubvaultResult<OrderId> {
  OrderId::parse(raw).ok_or_else(|| SubvaultError::not_found("order", raw.trim()))
}

impl AdminReviewService {
  pub fn new(
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductStore>,
    lifecycle: Arc<LifecycleEngine>,
    clock: Arc<dyn Clock>,
  ) -> Self {
    Self {
      orders,
      products,
      lifecycle,
      clock,
    }
  }

  fn authorize<'a>(&self, session: &'a SessionContext, operation: &'static str) -> SubvaultResult<&'a StaffIdentity> {
    session.require_staff().map_err(|e| {
      warn!(operation, "Staff operation denied: no staff session.");
      e
    })
  }

  #[instrument(name = "admin::list_orders", skip(self, session), err(Display))]
  pub async fn list_orders(&self, session: &SessionContext, filter: &OrderFilter) -> SubvaultResult<OrderListing> {
    self.authorize(session, "list_orders")?;
    let status = filter.status_filter()?;
    let all = self.orders.list_orders().await?;
    let total = all.len();
    let orders = all.into_iter().filter(|o| filter.matches(o, status)).collect();
    Ok(OrderListing { orders, total })
  }

  #[instrument(name = "admin::get_order", skip(self, session), err(Display))]
  pub async fn get_order(&self, session: &SessionContext, raw_order_id: &str) -> SubvaultResult<Order> {
    self.authorize(session, "get_order")?;
    let order_id = parse_order_id(raw_order_id)?;
    self
      .orders
      .find_order(&order_id)
      .await?
      .ok_or_else(|| SubvaultError::not_found("order", order_id.as_str()))
  }

  /// Moves an order through the lifecycle on behalf of the signed-in staff member.
  pub async fn transition_order(
    &self,
    session: &SessionContext,
    raw_order_id: &str,
    request: TransitionRequest,
  ) -> SubvaultResult<Order> {
    let staff = self.authorize(session, "transition_order")?;
    self.lifecycle.transition(raw_order_id, request, &staff.email).await
  }

  #[instrument(name = "admin::order_history", skip(self, session), err(Display))]
  pub async fn order_history(&self, session: &SessionContext, raw_order_id: &str) -> SubvaultResult<Vec<TransitionEvent>> {
    self.authorize(session, "order_history")?;
    let order_id = parse_order_id(raw_order_id)?;
    self.lifecycle.history(&order_id).await
  }

  #[instrument(name = "admin::dashboard", skip(self, session), err(Display))]
  pub async fn dashboard(&self, session: &SessionContext) -> SubvaultResult<DashboardReport> {
    self.authorize(session, "dashboard")?;
    let orders = self.orders.list_orders().await?;
    Ok(DashboardReport::compute(&orders, self.clock.today()))
  }

  /// CSV of the orders matching `filter`, named for today's date.
  #[instrument(name = "admin::export_csv", skip(self, session), err(Display))]
  pub async fn export_csv(&self, session: &SessionContext, filter: &OrderFilter) -> SubvaultResult<CsvExport> {
    let listing = self.list_orders(session, filter).await?;
    info!(rows = listing.orders.len(), "Exporting orders.");
    Ok(CsvExport {
      file_name: export_file_name(self.clock.today()),
      body: orders_csv(&listing.orders),
    })
  }

  /// Every product, including unavailable ones, newest first.
  #[instrument(name = "admin::list_products", skip(self, session), err(Display))]
  pub async fn list_products(&self, session: &SessionContext) -> SubvaultResult<Vec<Product>> {
    self.authorize(session, "list_products")?;
    self.products.list_products().await
  }

  #[instrument(name = "admin::create_product", skip_all, fields(name = %draft.name), err(Display))]
  pub async fn create_product(&self, session: &SessionContext, draft: ProductDraft) -> SubvaultResult<Product> {
    self.authorize(session, "create_product")?;
    let valid = draft.validate()?;
    let product = self.products.insert_product(valid.into_new_product(self.clock.now())).await?;
    info!(product_id = %product.id, "Product created.");
    Ok(product)
  }

  #[instrument(name = "admin::update_product", skip(self, session, draft), err(Display))]
  pub async fn update_product(&self, session: &SessionContext, product_id: Uuid, draft: ProductDraft) -> SubvaultResult<Product> {
    self.authorize(session, "update_product")?;
    let valid = draft.validate()?;
    let existing = self
      .products
      .find_product(product_id)
      .await?
      .ok_or_else(|| SubvaultError::not_found("product", product_id.to_string()))?;
    let product = self.products.update_product(valid.apply_to(existing, self.clock.now())).await?;
    info!(product_id = %product.id, "Product updated.");
    Ok(product)
  }

  /// Hard delete. Existing orders keep their name and amount snapshot.
  #[instrument(name = "admin::delete_product", skip(self, session), err(Display))]
  pub async fn delete_product(&self, session: &SessionContext, product_id: Uuid) -> SubvaultResult<()> {
    self.authorize(session, "delete_product")?;
    self.products.delete_product(product_id).await?;
    info!(%product_id, "Product deleted.");
    Ok(())
  }
}
