// subvault/src/model/mod.rs

//! Records owned by the stores: orders, products and the transition log.

pub mod money;
pub mod order;
pub mod product;

pub use money::{format_cents, parse_price_cents};
pub use order::{NewOrder, Order, OrderStatus, PaymentMethod, TransitionEvent};
pub use product::{Category, Product};
