// subvault/src/checkout.rs

//! Order-creation intake: customer form data in, a pending order out.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{SubvaultError, SubvaultResult};
use crate::model::{NewOrder, Order, PaymentMethod};
use crate::order_id::OrderIdGenerator;
use crate::store::{OrderStore, ProductStore};

/// One fresh attempt plus one retry after an identifier collision.
pub const MAX_INSERT_ATTEMPTS: usize = 2;

/// The checkout form exactly as the customer submitted it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
  #[serde(default)]
  pub full_name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub product_id: String,
  #[serde(default)]
  pub payment_method: String,
  #[serde(default)]
  pub transaction_id: String,
  #[serde(default)]
  pub notes: Option<String>,
}

impl CheckoutForm {
  fn required(value: &str, label: &str) -> SubvaultResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(SubvaultError::validation(format!("{} is required.", label)));
    }
    Ok(trimmed.to_string())
  }
}

fn looks_like_email(email: &str) -> bool {
  match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty() && !domain.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
    }
    None => false,
  }
}

pub struct CheckoutService {
  orders: Arc<dyn OrderStore>,
  products: Arc<dyn ProductStore>,
  ids: Arc<dyn OrderIdGenerator>,
  clock: Arc<dyn Clock>,
}

impl CheckoutService {
  pub fn new(
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductStore>,
    ids: Arc<dyn OrderIdGenerator>,
    clock: Arc<dyn Clock>,
  ) -> Self {
    Self {
      orders,
      products,
      ids,
      clock,
    }
  }

  /// Validates the form, snapshots the product and persists a `pending` order.
  ///
  /// All validation happens before the store is touched. An identifier collision is
  /// retried once with a fresh identifier; a second collision is returned to the caller.
  #[instrument(name = "checkout::place_order", skip_all, fields(product_id = %form.product_id), err(Display))]
  pub async fn place_order(&self, form: CheckoutForm) -> SubvaultResult<Order> {
    let customer_name = CheckoutForm::required(&form.full_name, "Full name")?;
    let email = CheckoutForm::required(&form.email, "Email")?;
    if !looks_like_email(&email) {
      return Err(SubvaultError::validation("Please enter a valid email address."));
    }
    let phone = CheckoutForm::required(&form.phone, "Phone number")?;
    let transaction_id = CheckoutForm::required(&form.transaction_id, "Transaction ID")?;
    let payment_method = if form.payment_method.trim().is_empty() {
      PaymentMethod::default()
    } else {
      form.payment_method.parse::<PaymentMethod>()?
    };
    let raw_product_id = CheckoutForm::required(&form.product_id, "Product")?;
    let customer_note = form
      .notes
      .as_deref()
      .map(str::trim)
      .filter(|n| !n.is_empty())
      .map(str::to_string);

    // A malformed product id cannot name a stored product.
    let product_id =
      Uuid::parse_str(&raw_product_id).map_err(|_| SubvaultError::not_found("product", raw_product_id.clone()))?;
    let product = self
      .products
      .find_product(product_id)
      .await?
      .ok_or_else(|| SubvaultError::not_found("product", raw_product_id.clone()))?;
    if !product.stock_available {
      return Err(SubvaultError::validation(format!(
        "{} is currently unavailable.",
        product.name
      )));
    }

    let draft = NewOrder {
      customer_name,
      email,
      phone,
      product_id: product.id,
      product_name: product.name.clone(),
      amount_cents: product.price_cents,
      payment_method,
      transaction_id,
      customer_note,
    };

    let mut attempt = 0;
    loop {
      attempt += 1;
      let order = draft.clone().into_pending(self.ids.generate(), self.clock.now());
      match self.orders.insert_order(order).await {
        Ok(stored) => {
          info!(
            order_id = %stored.order_id,
            product = %stored.product_name,
            amount_cents = stored.amount_cents,
            "Order placed."
          );
          return Ok(stored);
        }
        Err(SubvaultError::DuplicateOrderId { order_id }) if attempt < MAX_INSERT_ATTEMPTS => {
          warn!(%order_id, attempt, "Order identifier collision, retrying with a fresh identifier.");
        }
        Err(e) => return Err(e),
      }
    }
  }
}
