// subvault/src/model/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::SubvaultError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Streaming,
  Music,
  Ai,
  Productivity,
  Gaming,
}

impl Category {
  pub const ALL: [Category; 5] = [
    Category::Streaming,
    Category::Music,
    Category::Ai,
    Category::Productivity,
    Category::Gaming,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Category::Streaming => "streaming",
      Category::Music => "music",
      Category::Ai => "ai",
      Category::Productivity => "productivity",
      Category::Gaming => "gaming",
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Category::Streaming => "Video Streaming",
      Category::Music => "Music",
      Category::Ai => "AI Tools",
      Category::Productivity => "Productivity",
      Category::Gaming => "Gaming",
    }
  }
}

impl Default for Category {
  fn default() -> Self {
    Category::Streaming
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Category {
  type Err = SubvaultError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim().to_ascii_lowercase();
    Category::ALL
      .into_iter()
      .find(|c| c.as_str() == wanted)
      .ok_or_else(|| SubvaultError::validation(format!("Unknown category '{}'.", s.trim())))
  }
}

/// Catalog item. `stock_available` gates ordering, never viewing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub description: String,
  pub price_cents: i64,
  pub plan_type: String,
  pub category: Category,
  pub thumbnail_url: String,
  pub benefits: Vec<String>,
  pub stock_available: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  /// Case-insensitive substring match over name and description.
  pub fn matches_search(&self, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    self.name.to_lowercase().contains(&needle) || self.description.to_lowercase().contains(&needle)
  }
}
