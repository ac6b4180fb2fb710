use log::*;

use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::anyhow;

use crate::error::*;
use crate::models::Article;

/// Snapshot backend for the article catalog.
pub trait Persistence: fmt::Debug + Send + Sync {
  /// Read the full snapshot.  `None` when no snapshot has been written yet.
  fn load(&self) -> Result<Option<Vec<Article>>>;

  /// Replace the snapshot with `articles`.
  fn save(&self, articles: &[Article]) -> Result<()>;
}

/// Pretty-printed JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFile {
  path: PathBuf,
}

impl JsonFile {
  pub fn new<P: Into<PathBuf>>(path: P) -> Self {
    Self {
      path: path.into(),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn tmp_path(&self) -> Result<PathBuf> {
    let file_name = self.path.file_name()
      .and_then(|name| name.to_str())
      .ok_or_else(|| anyhow!("invalid snapshot filename: {}", self.path.display()))?;
    Ok(self.path.with_file_name(format!(".{}.tmp.{}", file_name, std::process::id())))
  }
}

impl Persistence for JsonFile {
  fn load(&self) -> Result<Option<Vec<Article>>> {
    let data = match fs::read(&self.path) {
      Ok(data) => data,
      Err(err) if err.kind() == ErrorKind::NotFound => {
        debug!("No snapshot at {}", self.path.display());
        return Ok(None);
      },
      Err(err) => return Err(err.into()),
    };
    let articles = serde_json::from_slice(&data).map_err(|source| {
      Error::PersistenceCorrupt {
        path: self.path.display().to_string(),
        source,
      }
    })?;
    Ok(Some(articles))
  }

  fn save(&self, articles: &[Article]) -> Result<()> {
    let data = serde_json::to_vec_pretty(articles)?;

    if let Some(parent) = self.path.parent() {
      if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)?;
      }
    }

    // Write the new snapshot next to the old one, then swap it in.
    let tmp_path = self.tmp_path()?;
    let res = fs::File::create(&tmp_path).and_then(|mut tmp| {
      tmp.write_all(&data)?;
      tmp.sync_all()
    });
    if let Err(err) = res.and_then(|_| fs::rename(&tmp_path, &self.path)) {
      let _ = fs::remove_file(&tmp_path);
      return Err(err.into());
    }
    debug!("Saved {} articles to {}", articles.len(), self.path.display());
    Ok(())
  }
}

/// Keeps the last saved snapshot in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
  snapshot: Mutex<Option<Vec<Article>>>,
}

impl MemoryBackend {
  pub fn new() -> Self {
    Default::default()
  }

  pub fn with_snapshot(articles: Vec<Article>) -> Self {
    Self {
      snapshot: Mutex::new(Some(articles)),
    }
  }
}

impl Persistence for MemoryBackend {
  fn load(&self) -> Result<Option<Vec<Article>>> {
    Ok(self.snapshot.lock()?.clone())
  }

  fn save(&self, articles: &[Article]) -> Result<()> {
    *self.snapshot.lock()? = Some(articles.to_vec());
    Ok(())
  }
}
