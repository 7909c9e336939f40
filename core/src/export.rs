// subvault/src/export.rs

//! Flat CSV projection of orders for spreadsheet export. Pure: no I/O, no store access.

use chrono::{NaiveDate, SecondsFormat};

use crate::model::{format_cents, Order};

pub const CSV_HEADER: &str = "Order ID,Customer Name,Email,Phone,Product,Amount,Status,Created At";

/// Quotes a field when it holds a comma, quote, CR or LF. Inner quotes are doubled.
fn csv_field(value: &str) -> String {
  if value.contains([',', '"', '\r', '\n']) {
    format!("\"{}\"", value.replace('"', "\"\""))
  } else {
    value.to_string()
  }
}

/// Renders `orders` in the given order, header first, one CRLF-terminated line each.
pub fn orders_csv(orders: &[Order]) -> String {
  let mut out = String::with_capacity(CSV_HEADER.len() + 2 + orders.len() * 128);
  out.push_str(CSV_HEADER);
  out.push_str("\r\n");
  for order in orders {
    let row = [
      csv_field(order.order_id.as_str()),
      csv_field(&order.customer_name),
      csv_field(&order.email),
      csv_field(&order.phone),
      csv_field(&order.product_name),
      format_cents(order.amount_cents),
      order.status.as_str().to_string(),
      order.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    ];
    out.push_str(&row.join(","));
    out.push_str("\r\n");
  }
  out
}

/// `orders-YYYY-MM-DD.csv`
pub fn export_file_name(day: NaiveDate) -> String {
  format!("orders-{}.csv", day.format("%Y-%m-%d"))
}
