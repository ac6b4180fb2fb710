use log::*;

use std::path::PathBuf;

use anyhow::anyhow;

use crate::app::AppConfig;
use crate::error::*;

use super::{ArticleStore, JsonFile, MemoryBackend, OnCorrupt, Persistence};

const DEFAULT_SNAPSHOT: &str = "articles.json";

/// Storage handles shared by every server and worker.
#[derive(Debug)]
pub struct DbService {
  pub article: ArticleStore,
}

impl DbService {
  pub fn new(article: ArticleStore) -> DbService {
    DbService {
      article,
    }
  }

  /// Open the article store configured under `store.*`.
  pub fn from_config(config: &AppConfig) -> Result<DbService> {
    let backend = config.get_str("store.backend")?.unwrap_or_else(|| "file".to_string());
    let backend: Box<dyn Persistence> = match backend.as_str() {
      "file" => {
        let path = config.get_path("store.path")?
          .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT));
        info!("DBService: json snapshot at {}", path.display());
        Box::new(JsonFile::new(path))
      },
      "memory" => {
        info!("DBService: in-memory store, nothing is persisted.");
        Box::new(MemoryBackend::new())
      },
      name => {
        return Err(anyhow!("unknown store.backend: {}", name).into());
      },
    };

    let on_corrupt = if config.get_bool("store.reset_on_corrupt")?.unwrap_or(false) {
      OnCorrupt::Reset
    } else {
      OnCorrupt::Fail
    };

    let article = ArticleStore::open(backend, on_corrupt)?;
    info!("DBService: {} articles loaded.", article.len()?);
    Ok(DbService::new(article))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use std::fs;
  use tempfile::tempdir;

  #[test]
  fn memory_backend_from_config() {
    let config = AppConfig::from_toml_str(r#"
[store]
backend = "memory"
"#).unwrap();
    let db = DbService::from_config(&config).unwrap();
    assert!(db.article.is_empty().unwrap());
  }

  #[test]
  fn unknown_backend_is_an_error() {
    let config = AppConfig::from_toml_str(r#"
[store]
backend = "sqlite"
"#).unwrap();
    assert!(DbService::from_config(&config).is_err());
  }

  #[test]
  fn corrupt_snapshot_respects_reset_flag() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("articles.json");
    fs::write(&path, "not json").unwrap();

    let config = AppConfig::from_toml_str(&format!(r#"
[store]
path = {:?}
"#, path.display().to_string())).unwrap();
    assert!(DbService::from_config(&config).is_err());

    let config = AppConfig::from_toml_str(&format!(r#"
[store]
path = {:?}
reset_on_corrupt = true
"#, path.display().to_string())).unwrap();
    let db = DbService::from_config(&config).unwrap();
    assert!(db.article.is_empty().unwrap());
  }
}
