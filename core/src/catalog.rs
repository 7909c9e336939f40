// subvault/src/catalog.rs

//! Product catalog: staff-entered drafts and the public browse path.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{SubvaultError, SubvaultResult};
use crate::model::{parse_price_cents, Category, Product};
use crate::store::ProductStore;

/// Product form as staff fill it in. Prices and benefits are raw text.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub price: String,
  #[serde(default)]
  pub plan_type: String,
  #[serde(default)]
  pub thumbnail_url: String,
  #[serde(default)]
  pub category: String,
  /// One benefit per line.
  #[serde(default)]
  pub benefits: String,
  #[serde(default = "default_stock_available")]
  pub stock_available: bool,
}

fn default_stock_available() -> bool {
  true
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidProduct {
  pub name: String,
  pub description: String,
  pub price_cents: i64,
  pub plan_type: String,
  pub thumbnail_url: String,
  pub category: Category,
  pub benefits: Vec<String>,
  pub stock_available: bool,
}

impl ValidProduct {
  pub fn into_new_product(self, at: DateTime<Utc>) -> Product {
    Product {
      id: Uuid::new_v4(),
      name: self.name,
      description: self.description,
      price_cents: self.price_cents,
      plan_type: self.plan_type,
      category: self.category,
      thumbnail_url: self.thumbnail_url,
      benefits: self.benefits,
      stock_available: self.stock_available,
      created_at: at,
      updated_at: at,
    }
  }

  /// Overwrites the editable fields of `existing`; identity and `created_at` are kept.
  pub fn apply_to(self, existing: Product, at: DateTime<Utc>) -> Product {
    Product {
      id: existing.id,
      created_at: existing.created_at,
      updated_at: at,
      ..self.into_new_product(at)
    }
  }
}

/// Each non-blank line, trimmed, in input order.
pub fn split_benefits(text: &str) -> Vec<String> {
  text
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .map(str::to_string)
    .collect()
}

impl ProductDraft {
  pub fn validate(&self) -> SubvaultResult<ValidProduct> {
    let required = |value: &str, label: &str| -> SubvaultResult<String> {
      let trimmed = value.trim();
      if trimmed.is_empty() {
        Err(SubvaultError::validation(format!("{} is required.", label)))
      } else {
        Ok(trimmed.to_string())
      }
    };

    let name = required(&self.name, "Name")?;
    let description = required(&self.description, "Description")?;
    let price_cents = parse_price_cents(&self.price)?;
    let plan_type = required(&self.plan_type, "Plan type")?;
    let thumbnail_url = required(&self.thumbnail_url, "Thumbnail")?;
    let category = if self.category.trim().is_empty() {
      Category::default()
    } else {
      self.category.parse()?
    };

    Ok(ValidProduct {
      name,
      description,
      price_cents,
      plan_type,
      thumbnail_url,
      category,
      benefits: split_benefits(&self.benefits),
      stock_available: self.stock_available,
    })
  }
}

/// Public browse filter. `category` of `all` or nothing means every category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
  #[serde(default)]
  pub search: Option<String>,
  #[serde(default)]
  pub category: Option<String>,
}

impl CatalogQuery {
  fn category_filter(&self) -> SubvaultResult<Option<Category>> {
    match self.category.as_deref().map(str::trim) {
      None | Some("") => Ok(None),
      Some(c) if c.eq_ignore_ascii_case("all") => Ok(None),
      Some(c) => c.parse().map(Some),
    }
  }
}

/// Read-only catalog view for customers and marketing pages.
pub struct CatalogService {
  products: Arc<dyn ProductStore>,
}

impl CatalogService {
  pub fn new(products: Arc<dyn ProductStore>) -> Self {
    Self { products }
  }

  /// Available products matching the query, newest first.
  #[instrument(name = "catalog::browse", skip(self), err(Display))]
  pub async fn browse(&self, query: &CatalogQuery) -> SubvaultResult<Vec<Product>> {
    let category = query.category_filter()?;
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let products = self.products.list_products().await?;
    Ok(
      products
        .into_iter()
        .filter(|p| p.stock_available)
        .filter(|p| category.map_or(true, |c| p.category == c))
        .filter(|p| search.map_or(true, |s| p.matches_search(s)))
        .collect(),
    )
  }

  /// Any product by id, available or not.
  #[instrument(name = "catalog::product", skip(self), err(Display))]
  pub async fn product(&self, raw_id: &str) -> SubvaultResult<Product> {
    let id = Uuid::parse_str(raw_id.trim()).map_err(|_| SubvaultError::not_found("product", raw_id.trim()))?;
    self
      .products
      .find_product(id)
      .await?
      .ok_or_else(|| SubvaultError::not_found("product", id.to_string()))
  }
}
