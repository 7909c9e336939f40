// subvault_server/src/db/pg_store.rs

//! PostgreSQL implementation of the core store traits, using runtime-checked queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use subvault::lifecycle::StatusChange;
use subvault::model::Category;
use subvault::{
  Order, OrderId, OrderStatus, OrderStore, PaymentMethod, Product, ProductStore, SubvaultError, SubvaultResult,
  TransitionEvent,
};
use tracing::{debug, error, instrument};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct OrderRow {
  id: Uuid,
  order_id: String,
  customer_name: String,
  email: String,
  phone: String,
  product_id: Uuid,
  product_name: String,
  amount_cents: i64,
  payment_method: String,
  transaction_id: String,
  payment_evidence_url: Option<String>,
  customer_note: Option<String>,
  status: String,
  operator_note: Option<String>,
  delivery_details: Option<String>,
  version: i64,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

fn corrupt(what: &str, value: &str) -> SubvaultError {
  error!(column = what, value, "Stored row holds a value the storefront does not recognize.");
  SubvaultError::storage(anyhow::anyhow!("corrupt {} value '{}' in storage", what, value))
}

impl TryFrom<OrderRow> for Order {
  type Error = SubvaultError;

  fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
    let order_id = OrderId::parse(&row.order_id).ok_or_else(|| corrupt("order_id", &row.order_id))?;
    let status = row.status.parse::<OrderStatus>().map_err(|_| corrupt("status", &row.status))?;
    let payment_method = row
      .payment_method
      .parse::<PaymentMethod>()
      .map_err(|_| corrupt("payment_method", &row.payment_method))?;
    Ok(Order {
      id: row.id,
      order_id,
      customer_name: row.customer_name,
      email: row.email,
      phone: row.phone,
      product_id: row.product_id,
      product_name: row.product_name,
      amount_cents: row.amount_cents,
      payment_method,
      transaction_id: row.transaction_id,
      payment_evidence_url: row.payment_evidence_url,
      customer_note: row.customer_note,
      status,
      operator_note: row.operator_note,
      delivery_details: row.delivery_details,
      version: row.version,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(Debug, FromRow)]
struct ProductRow {
  id: Uuid,
  name: String,
  description: String,
  price_cents: i64,
  plan_type: String,
  category: String,
  thumbnail_url: String,
  benefits: Json<Vec<String>>,
  stock_available: bool,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
  type Error = SubvaultError;

  fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
    let category = row.category.parse::<Category>().map_err(|_| corrupt("category", &row.category))?;
    Ok(Product {
      id: row.id,
      name: row.name,
      description: row.description,
      price_cents: row.price_cents,
      plan_type: row.plan_type,
      category,
      thumbnail_url: row.thumbnail_url,
      benefits: row.benefits.0,
      stock_available: row.stock_available,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(Debug, FromRow)]
struct TransitionRow {
  order_id: String,
  from_status: String,
  to_status: String,
  actor: String,
  at: DateTime<Utc>,
}

impl TryFrom<TransitionRow> for TransitionEvent {
  type Error = SubvaultError;

  fn try_from(row: TransitionRow) -> Result<Self, Self::Error> {
    Ok(TransitionEvent {
      order_id: OrderId::parse(&row.order_id).ok_or_else(|| corrupt("order_id", &row.order_id))?,
      from: row.from_status.parse().map_err(|_| corrupt("from_status", &row.from_status))?,
      to: row.to_status.parse().map_err(|_| corrupt("to_status", &row.to_status))?,
      actor: row.actor,
      at: row.at,
    })
  }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
  err
    .as_database_error()
    .map(|db_err| db_err.is_unique_violation())
    .unwrap_or(false)
}

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> SubvaultError {
  move |e| {
    error!(error = %e, "Database error while {}.", context);
    SubvaultError::storage(e)
  }
}

pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl OrderStore for PgStore {
  #[instrument(name = "pg_store::insert_order", skip_all, fields(order_id = %order.order_id))]
  async fn insert_order(&self, order: Order) -> SubvaultResult<Order> {
    let result = sqlx::query(
      "INSERT INTO orders (id, order_id, customer_name, email, phone, product_id, product_name, amount_cents, \
       payment_method, transaction_id, payment_evidence_url, customer_note, status, operator_note, delivery_details, \
       version, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
    )
    .bind(order.id)
    .bind(order.order_id.as_str())
    .bind(&order.customer_name)
    .bind(&order.email)
    .bind(&order.phone)
    .bind(order.product_id)
    .bind(&order.product_name)
    .bind(order.amount_cents)
    .bind(order.payment_method.as_str())
    .bind(&order.transaction_id)
    .bind(&order.payment_evidence_url)
    .bind(&order.customer_note)
    .bind(order.status.as_str())
    .bind(&order.operator_note)
    .bind(&order.delivery_details)
    .bind(order.version)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&self.pool)
    .await;

    match result {
      Ok(_) => Ok(order),
      Err(e) if is_unique_violation(&e) => {
        debug!("Unique violation on insert.");
        Err(SubvaultError::DuplicateOrderId {
          order_id: order.order_id,
        })
      }
      Err(e) => Err(db_error("inserting an order")(e)),
    }
  }

  async fn find_order(&self, order_id: &OrderId) -> SubvaultResult<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE order_id = $1")
      .bind(order_id.as_str())
      .fetch_optional(&self.pool)
      .await
      .map_err(db_error("fetching an order"))?;
    row.map(Order::try_from).transpose()
  }

  async fn list_orders(&self) -> SubvaultResult<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as("SELECT * FROM orders ORDER BY created_at DESC, order_id DESC")
      .fetch_all(&self.pool)
      .await
      .map_err(db_error("listing orders"))?;
    rows.into_iter().map(Order::try_from).collect()
  }

  #[instrument(name = "pg_store::apply_transition", skip_all, fields(order_id = %order_id))]
  async fn apply_transition(&self, order_id: &OrderId, change: &StatusChange) -> SubvaultResult<(Order, TransitionEvent)> {
    let mut tx = self.pool.begin().await.map_err(db_error("opening a transaction"))?;

    // Row lock: concurrent transitions on this order queue up behind us.
    let row: Option<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE order_id = $1 FOR UPDATE")
      .bind(order_id.as_str())
      .fetch_optional(&mut *tx)
      .await
      .map_err(db_error("locking an order"))?;
    let mut order = match row {
      Some(row) => Order::try_from(row)?,
      None => return Err(SubvaultError::not_found("order", order_id.as_str())),
    };

    // A refused change returns here and the dropped transaction rolls back.
    let event = change.apply_to(&mut order)?;

    sqlx::query(
      "UPDATE orders SET status = $2, operator_note = $3, delivery_details = $4, version = $5, updated_at = $6 \
       WHERE order_id = $1",
    )
    .bind(order_id.as_str())
    .bind(order.status.as_str())
    .bind(&order.operator_note)
    .bind(&order.delivery_details)
    .bind(order.version)
    .bind(order.updated_at)
    .execute(&mut *tx)
    .await
    .map_err(db_error("updating order status"))?;

    sqlx::query("INSERT INTO order_transitions (order_id, from_status, to_status, actor, at) VALUES ($1, $2, $3, $4, $5)")
      .bind(order_id.as_str())
      .bind(event.from.as_str())
      .bind(event.to.as_str())
      .bind(&event.actor)
      .bind(event.at)
      .execute(&mut *tx)
      .await
      .map_err(db_error("recording a transition"))?;

    tx.commit().await.map_err(db_error("committing a transition"))?;
    Ok((order, event))
  }

  async fn set_evidence(&self, order_id: &OrderId, evidence_url: &str, at: DateTime<Utc>) -> SubvaultResult<Order> {
    let row: Option<OrderRow> = sqlx::query_as(
      "UPDATE orders SET payment_evidence_url = $2, updated_at = $3 WHERE order_id = $1 RETURNING *",
    )
    .bind(order_id.as_str())
    .bind(evidence_url)
    .bind(at)
    .fetch_optional(&self.pool)
    .await
    .map_err(db_error("attaching evidence"))?;
    match row {
      Some(row) => Order::try_from(row),
      None => Err(SubvaultError::not_found("order", order_id.as_str())),
    }
  }

  async fn transition_history(&self, order_id: &OrderId) -> SubvaultResult<Vec<TransitionEvent>> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE order_id = $1)")
      .bind(order_id.as_str())
      .fetch_one(&self.pool)
      .await
      .map_err(db_error("checking an order"))?;
    if !exists {
      return Err(SubvaultError::not_found("order", order_id.as_str()));
    }

    let rows: Vec<TransitionRow> = sqlx::query_as(
      "SELECT order_id, from_status, to_status, actor, at FROM order_transitions WHERE order_id = $1 ORDER BY id ASC",
    )
    .bind(order_id.as_str())
    .fetch_all(&self.pool)
    .await
    .map_err(db_error("reading transition history"))?;
    rows.into_iter().map(TransitionEvent::try_from).collect()
  }
}

#[async_trait]
impl ProductStore for PgStore {
  async fn insert_product(&self, product: Product) -> SubvaultResult<Product> {
    sqlx::query(
      "INSERT INTO products (id, name, description, price_cents, plan_type, category, thumbnail_url, benefits, \
       stock_available, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price_cents)
    .bind(&product.plan_type)
    .bind(product.category.as_str())
    .bind(&product.thumbnail_url)
    .bind(Json(&product.benefits))
    .bind(product.stock_available)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&self.pool)
    .await
    .map_err(db_error("inserting a product"))?;
    Ok(product)
  }

  async fn find_product(&self, id: Uuid) -> SubvaultResult<Option<Product>> {
    let row: Option<ProductRow> = sqlx::query_as("SELECT * FROM products WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(db_error("fetching a product"))?;
    row.map(Product::try_from).transpose()
  }

  async fn list_products(&self) -> SubvaultResult<Vec<Product>> {
    let rows: Vec<ProductRow> = sqlx::query_as("SELECT * FROM products ORDER BY created_at DESC, name ASC")
      .fetch_all(&self.pool)
      .await
      .map_err(db_error("listing products"))?;
    rows.into_iter().map(Product::try_from).collect()
  }

  async fn update_product(&self, product: Product) -> SubvaultResult<Product> {
    let row: Option<ProductRow> = sqlx::query_as(
      "UPDATE products SET name = $2, description = $3, price_cents = $4, plan_type = $5, category = $6, \
       thumbnail_url = $7, benefits = $8, stock_available = $9, updated_at = $10 WHERE id = $1 RETURNING *",
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price_cents)
    .bind(&product.plan_type)
    .bind(product.category.as_str())
    .bind(&product.thumbnail_url)
    .bind(Json(&product.benefits))
    .bind(product.stock_available)
    .bind(product.updated_at)
    .fetch_optional(&self.pool)
    .await
    .map_err(db_error("updating a product"))?;
    match row {
      Some(row) => Product::try_from(row),
      None => Err(SubvaultError::not_found("product", product.id.to_string())),
    }
  }

  async fn delete_product(&self, id: Uuid) -> SubvaultResult<()> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(db_error("deleting a product"))?;
    if result.rows_affected() == 0 {
      return Err(SubvaultError::not_found("product", id.to_string()));
    }
    Ok(())
  }
}
