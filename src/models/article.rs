use chrono::{DateTime, Utc};

use serde::{Deserialize, Serialize};

/// A stored article.  Field names match the JSON snapshot and API responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
  pub id: u64,
  pub title: String,
  pub content: String,
  pub tags: Vec<String>,
  pub date: DateTime<Utc>,
}

/// Validated input for a new article.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
  pub title: String,
  pub content: String,
  pub tags: Vec<String>,
}

impl Article {
  pub fn has_tag(&self, tag: &str) -> bool {
    self.tags.iter().any(|t| t == tag)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn loads_reference_snapshot_record() {
    // Dates written by the reference service carry millisecond precision.
    let article: Article = serde_json::from_str(r#"{
      "id": 1,
      "title": "Go Basics",
      "content": "Go is great.",
      "tags": ["go", "tutorial"],
      "date": "2024-05-01T12:30:00.000Z"
    }"#).unwrap();
    assert_eq!(article.id, 1);
    assert!(article.has_tag("go"));
    assert!(!article.has_tag("g"));
    assert_eq!(article.date.to_rfc3339(), "2024-05-01T12:30:00+00:00");
  }
}
