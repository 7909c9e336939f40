// subvault/src/model/money.rs

//! Prices and order amounts are stored as integer minor units (two decimals).

use crate::error::{SubvaultError, SubvaultResult};

/// Parses a staff-entered price such as `"199"`, `"15.5"` or `"15.50"` into minor units.
///
/// Rejects blank or non-numeric text, negative values and more than two fractional digits.
pub fn parse_price_cents(raw: &str) -> SubvaultResult<i64> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(SubvaultError::validation("Price is required."));
  }
  if trimmed.starts_with('-') {
    return Err(SubvaultError::validation("Price cannot be negative."));
  }

  let (whole, fraction) = match trimmed.split_once('.') {
    Some((w, f)) => (w, f),
    None => (trimmed, ""),
  };
  let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
  if (whole.is_empty() && fraction.is_empty()) || !digits_only(whole) || !digits_only(fraction) {
    return Err(SubvaultError::validation(format!("Price '{}' is not a number.", trimmed)));
  }
  if fraction.len() > 2 {
    return Err(SubvaultError::validation(
      "Price can have at most two decimal places.",
    ));
  }

  let whole_units: i64 = if whole.is_empty() {
    0
  } else {
    whole
      .parse()
      .map_err(|_| SubvaultError::validation(format!("Price '{}' is out of range.", trimmed)))?
  };
  let fraction_cents: i64 = match fraction.len() {
    0 => 0,
    1 => fraction.parse::<i64>().unwrap_or(0) * 10,
    _ => fraction.parse::<i64>().unwrap_or(0),
  };

  whole_units
    .checked_mul(100)
    .and_then(|c| c.checked_add(fraction_cents))
    .ok_or_else(|| SubvaultError::validation(format!("Price '{}' is out of range.", trimmed)))
}

/// Renders minor units as a plain decimal, e.g. `19900` -> `"199.00"`.
pub fn format_cents(cents: i64) -> String {
  let sign = if cents < 0 { "-" } else { "" };
  let abs = cents.unsigned_abs();
  format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
