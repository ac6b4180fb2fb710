use log::*;

use chrono::Utc;
use serde_json::json;

use crate::error::*;
use crate::models::*;

use super::Persistence;

pub fn article_not_found() -> Error {
  Error::NotFound(json!({
    "error": "Article not found.",
  }))
}

/// In-memory article collection mirrored to a persistence backend.
///
/// Not synchronized; see `ArticleStore` for the shared version.
#[derive(Debug)]
pub struct Catalog {
  articles: Vec<Article>,
  backend: Box<dyn Persistence>,
}

impl Catalog {
  pub fn new(backend: Box<dyn Persistence>) -> Self {
    Self {
      articles: Vec::new(),
      backend,
    }
  }

  /// Replace the collection with the stored snapshot, if there is one.
  pub fn load(&mut self) -> Result<()> {
    if let Some(articles) = self.backend.load()? {
      info!("Loaded {} articles from snapshot.", articles.len());
      self.articles = articles;
    }
    Ok(())
  }

  /// Append a new article.  Does not persist.
  pub fn add(&mut self, article: NewArticle) -> &Article {
    let id = self.articles.len() as u64 + 1;
    self.articles.push(Article {
      id,
      title: article.title,
      content: article.content,
      tags: article.tags,
      date: Utc::now(),
    });
    &self.articles[self.articles.len() - 1]
  }

  /// Overwrite the snapshot with the full collection.
  pub fn save(&self) -> Result<()> {
    self.backend.save(&self.articles)
  }

  pub fn get_by_id(&self, id: u64) -> Result<&Article> {
    self.articles.iter()
      .find(|a| a.id == id)
      .ok_or_else(article_not_found)
  }

  pub fn all(&self) -> &[Article] {
    &self.articles
  }

  /// Drop the most recent article.  Only used to undo an `add` whose `save` failed.
  pub(crate) fn rollback_last(&mut self) -> Option<Article> {
    self.articles.pop()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use crate::db::MemoryBackend;

  fn new_article(title: &str) -> NewArticle {
    NewArticle {
      title: title.to_string(),
      content: "content".to_string(),
      tags: vec!["tag".to_string()],
    }
  }

  #[test]
  fn ids_are_sequential() {
    let mut catalog = Catalog::new(Box::new(MemoryBackend::new()));
    let ids: Vec<u64> = (0..5).map(|n| catalog.add(new_article(&n.to_string())).id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
  }

  #[test]
  fn add_does_not_persist() {
    let mut catalog = Catalog::new(Box::new(MemoryBackend::new()));
    catalog.add(new_article("a"));
    assert!(catalog.backend.load().unwrap().is_none());
    catalog.save().unwrap();
    assert_eq!(catalog.backend.load().unwrap().unwrap().len(), 1);
  }

  #[test]
  fn load_replaces_contents() {
    let mut source = Catalog::new(Box::new(MemoryBackend::new()));
    source.add(new_article("a"));
    source.add(new_article("b"));
    let snapshot = source.all().to_vec();

    let mut catalog = Catalog::new(Box::new(MemoryBackend::with_snapshot(snapshot.clone())));
    catalog.add(new_article("discarded"));
    catalog.load().unwrap();
    assert_eq!(catalog.all(), &snapshot[..]);

    // ids continue after the loaded articles.
    assert_eq!(catalog.add(new_article("c")).id, 3);
  }

  #[test]
  fn load_without_snapshot_keeps_contents() {
    let mut catalog = Catalog::new(Box::new(MemoryBackend::new()));
    catalog.add(new_article("a"));
    catalog.load().unwrap();
    assert_eq!(catalog.all().len(), 1);
  }

  #[test]
  fn get_by_id() {
    let mut catalog = Catalog::new(Box::new(MemoryBackend::new()));
    catalog.add(new_article("a"));
    catalog.add(new_article("b"));
    assert_eq!(catalog.get_by_id(2).unwrap().title, "b");
    match catalog.get_by_id(999) {
      Err(Error::NotFound(body)) => assert_eq!(body, json!({"error": "Article not found."})),
      other => panic!("expected NotFound, got {:?}", other),
    }
  }
}
