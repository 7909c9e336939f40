// src/lib.rs

//! Subvault: the core of a manual-payment storefront for digital subscriptions.
//!
//! Customers place orders and attach a payment proof. Staff verify the payment by hand
//! and move the order through its lifecycle, ending with delivered credentials. The
//! crate provides:
//!  - Unguessable, human-shareable order identifiers.
//!  - Storage traits with an in-memory implementation.
//!  - The order lifecycle engine with a permissive or strict transition policy,
//!    optimistic versioning and an append-only transition log.
//!  - Checkout intake, evidence attachment and the anonymous order tracker.
//!  - Session-gated staff review, dashboard aggregates and CSV export.
//!  - Catalog validation and public browsing.

pub mod admin;
pub mod catalog;
pub mod checkout;
pub mod clock;
pub mod error;
pub mod evidence;
pub mod export;
pub mod lifecycle;
pub mod lookup;
pub mod model;
pub mod order_id;
pub mod report;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::admin::{AdminReviewService, CsvExport, OrderFilter, OrderListing, SessionContext, StaffIdentity};
pub use crate::catalog::{CatalogQuery, CatalogService, ProductDraft, ValidProduct};
pub use crate::checkout::{CheckoutForm, CheckoutService};
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::error::{SubvaultError, SubvaultResult};
pub use crate::evidence::{EvidenceService, EvidenceStore, EvidenceUpload};
pub use crate::lifecycle::{LifecycleEngine, StatusChange, TransitionPolicy, TransitionRequest};
pub use crate::lookup::{OrderLookupService, TrackedOrder};
pub use crate::model::{Category, NewOrder, Order, OrderStatus, PaymentMethod, Product, TransitionEvent};
pub use crate::order_id::{OrderId, OrderIdGenerator, RandomOrderIdGenerator};
pub use crate::report::DashboardReport;
pub use crate::store::{MemoryStore, OrderStore, ProductStore};
