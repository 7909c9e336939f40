// subvault/src/report.rs

//! Dashboard aggregates, recomputed from a full scan on every call.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::model::{Order, OrderStatus};

pub const RECENT_ORDER_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
  pub total_orders: usize,
  pub pending_orders: usize,
  pub completed_orders: usize,
  /// Lifetime revenue: sum of completed order amounts.
  pub total_revenue_cents: i64,
  pub today_orders: usize,
  /// Revenue from completed orders created this calendar month.
  pub monthly_revenue_cents: i64,
  pub recent_orders: Vec<Order>,
}

impl DashboardReport {
  /// `today` is the UTC calendar date the caller considers current.
  pub fn compute(orders: &[Order], today: NaiveDate) -> DashboardReport {
    let mut report = DashboardReport {
      total_orders: orders.len(),
      pending_orders: 0,
      completed_orders: 0,
      total_revenue_cents: 0,
      today_orders: 0,
      monthly_revenue_cents: 0,
      recent_orders: Vec::new(),
    };

    for order in orders {
      let created = order.created_at.date_naive();
      let same_month = created.year() == today.year() && created.month() == today.month();
      if created == today {
        report.today_orders += 1;
      }
      match order.status {
        OrderStatus::Pending => report.pending_orders += 1,
        OrderStatus::Completed => {
          report.completed_orders += 1;
          report.total_revenue_cents += order.amount_cents;
          if same_month {
            report.monthly_revenue_cents += order.amount_cents;
          }
        }
        OrderStatus::Processing | OrderStatus::Rejected => {}
      }
    }

    let mut recent: Vec<&Order> = orders.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    report.recent_orders = recent.into_iter().take(RECENT_ORDER_COUNT).cloned().collect();
    report
  }
}
