use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::error::*;
use crate::models::NewArticle;
use crate::query::{ArticleQuery, SortBy};

pub const REQUIRED_FIELDS: &str = "Title, content, and tags are required.";

/// Raw create-article body.  Every field is optional here so that a missing
/// field is reported with the validation message instead of a parse error.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateArticle {
  pub title: Option<String>,
  pub content: Option<String>,
  pub tags: Option<Vec<String>>,
}

impl CreateArticle {
  /// Parse a create body.  Only json content types are read; any other body,
  /// an empty body, or a non-object json value reads as an empty form.
  /// Falsy values (`null`, `false`, `0`, `""`) read as missing fields.
  pub fn from_body(content_type: &str, body: &[u8]) -> Result<Self> {
    if !is_json_content_type(content_type) || body.iter().all(u8::is_ascii_whitespace) {
      return Ok(Self::default());
    }
    let value: JsonValue = serde_json::from_slice(body).map_err(|err| {
      Error::BadRequest(json!({
        "error": format!("Json deserialize error: {}", err),
      }))
    })?;
    let mut fields = match value {
      JsonValue::Object(fields) => fields,
      _ => return Ok(Self::default()),
    };
    fields.retain(|_, val| !is_falsy(val));
    serde_json::from_value(JsonValue::Object(fields)).map_err(|err| {
      Error::BadRequest(json!({
        "error": format!("Json deserialize error: {}", err),
      }))
    })
  }

  /// Presence checks: missing, null, empty strings and empty tag lists are rejected.
  pub fn validate(self) -> Result<NewArticle> {
    match (self.title, self.content, self.tags) {
      (Some(title), Some(content), Some(tags))
        if !title.is_empty() && !content.is_empty() && !tags.is_empty() => {
        Ok(NewArticle { title, content, tags })
      },
      _ => Err(Error::BadRequest(json!({
        "error": REQUIRED_FIELDS,
      }))),
    }
  }
}

fn is_json_content_type(content_type: &str) -> bool {
  let mime = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
  mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

fn is_falsy(val: &JsonValue) -> bool {
  match val {
    JsonValue::Null => true,
    JsonValue::Bool(b) => !b,
    JsonValue::Number(n) => n.as_f64() == Some(0.0),
    JsonValue::String(s) => s.is_empty(),
    _ => false,
  }
}

/// Query string for `/articles/search`.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchRequest {
  pub keyword: Option<String>,
  pub tag: Option<String>,
  #[serde(rename = "sortBy")]
  pub sort_by: Option<String>,
}

impl From<SearchRequest> for ArticleQuery {
  fn from(req: SearchRequest) -> Self {
    ArticleQuery {
      keyword: req.keyword,
      tag: req.tag,
      sort_by: req.sort_by.as_deref().and_then(SortBy::from_param),
    }
  }
}
