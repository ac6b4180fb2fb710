use log::*;

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::Value as JsonValue;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  // 404
  #[error("not found: {0}")]
  NotFound(JsonValue),

  // 400
  #[error("bad request: {0}")]
  BadRequest(JsonValue),

  // Snapshot exists but can't be parsed.
  #[error("corrupt snapshot '{path}': {source}")]
  PersistenceCorrupt {
    path: String,
    source: serde_json::Error,
  },

  #[error("article store lock poisoned")]
  LockPoisoned,

  // Json error
  #[error("Json error: {source}")]
  JsonError {
    #[from]
    source: serde_json::Error,
  },

  #[error("crossbeam recv error")]
  RecvError {
    #[from]
    source: crossbeam_channel::RecvError,
  },

  #[error("std io error: {source}")]
  IOError {
    #[from]
    source: std::io::Error,
  },

  #[error("config error: {source}")]
  ConfigError {
    #[from]
    source: config::ConfigError,
  },

  #[error(transparent)]
  Other(#[from] anyhow::Error),
}

impl<T> From<std::sync::PoisonError<T>> for Error {
  fn from(_: std::sync::PoisonError<T>) -> Self {
    Error::LockPoisoned
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// the ResponseError trait lets us convert errors to http responses with appropriate data
// https://actix.rs/docs/errors/
impl ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    match self {
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::BadRequest(_) => StatusCode::BAD_REQUEST,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    match self {
      Error::NotFound(ref message) => HttpResponse::NotFound().json(message),
      Error::BadRequest(ref message) => {
        HttpResponse::build(StatusCode::BAD_REQUEST).json(message)
      },
      ref err => {
        error!("InternalServerError: {:?}", err);
        HttpResponse::InternalServerError().json(serde_json::json!({
          "error": "Internal Server Error",
        }))
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn status_codes() {
    assert_eq!(Error::NotFound(json!({})).status_code(), StatusCode::NOT_FOUND);
    assert_eq!(Error::BadRequest(json!({})).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(Error::LockPoisoned.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn internal_errors_hide_details() {
    let err = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
    let resp = err.error_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
