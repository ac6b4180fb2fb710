use log::*;

use std::collections::BTreeSet;
use std::sync::Mutex;

use crate::error::*;
use crate::models::*;
use crate::query::ArticleQuery;

use super::{Catalog, Persistence};

/// What to do when the stored snapshot can't be parsed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnCorrupt {
  /// Refuse to start.
  Fail,
  /// Log a warning and start with an empty catalog.
  Reset,
}

impl Default for OnCorrupt {
  fn default() -> Self {
    OnCorrupt::Fail
  }
}

/// Catalog shared between http workers.
///
/// Creating an article holds the lock across `add` and `save`, so ids are
/// never handed out twice and snapshots are written in creation order.
#[derive(Debug)]
pub struct ArticleStore {
  catalog: Mutex<Catalog>,
}

impl ArticleStore {
  pub fn new(catalog: Catalog) -> Self {
    Self {
      catalog: Mutex::new(catalog),
    }
  }

  /// Build a catalog over `backend` and load its snapshot.
  pub fn open(backend: Box<dyn Persistence>, on_corrupt: OnCorrupt) -> Result<Self> {
    let mut catalog = Catalog::new(backend);
    match catalog.load() {
      Ok(()) => (),
      Err(err @ Error::PersistenceCorrupt { .. }) => {
        if on_corrupt == OnCorrupt::Reset {
          warn!("Ignoring unreadable snapshot, starting empty: {}", err);
        } else {
          return Err(err);
        }
      },
      Err(err) => return Err(err),
    }
    Ok(Self::new(catalog))
  }

  /// Add and persist a new article.
  pub fn create(&self, article: NewArticle) -> Result<Article> {
    let mut catalog = self.catalog.lock()?;
    let article = catalog.add(article).clone();
    if let Err(err) = catalog.save() {
      error!("Failed to save article {}: {:?}", article.id, err);
      catalog.rollback_last();
      return Err(err);
    }
    info!("Created article {}", article.id);
    Ok(article)
  }

  pub fn get_by_id(&self, id: u64) -> Result<Article> {
    Ok(self.catalog.lock()?.get_by_id(id)?.clone())
  }

  pub fn all(&self) -> Result<Vec<Article>> {
    Ok(self.catalog.lock()?.all().to_vec())
  }

  pub fn search(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
    Ok(query.run(self.catalog.lock()?.all()))
  }

  /// Distinct tags across all articles, sorted.
  pub fn tags(&self) -> Result<Vec<String>> {
    let catalog = self.catalog.lock()?;
    let tags: BTreeSet<&str> = catalog.all().iter()
      .flat_map(|a| a.tags.iter().map(String::as_str))
      .collect();
    Ok(tags.into_iter().map(String::from).collect())
  }

  pub fn len(&self) -> Result<usize> {
    Ok(self.catalog.lock()?.all().len())
  }

  pub fn is_empty(&self) -> Result<bool> {
    Ok(self.len()? == 0)
  }
}
