//! Article filtering and ranking.
//!
//! Queries run over a borrowed slice of the catalog and return cloned
//! results; the collection itself is never reordered.

use std::cmp::Reverse;

use crate::models::Article;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
  /// Descending keyword frequency.  Ignored without a keyword.
  Relevance,
  /// Most recent first.
  Date,
}

impl SortBy {
  /// Parse the `sortBy` query parameter.  Unknown values mean no ordering.
  pub fn from_param(param: &str) -> Option<Self> {
    match param {
      "relevance" => Some(SortBy::Relevance),
      "date" => Some(SortBy::Date),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleQuery {
  pub keyword: Option<String>,
  pub tag: Option<String>,
  pub sort_by: Option<SortBy>,
}

impl ArticleQuery {
  pub fn matches(&self, article: &Article) -> bool {
    self.keyword_match(article) && self.tag_match(article)
  }

  fn keyword_match(&self, article: &Article) -> bool {
    match self.keyword {
      Some(ref keyword) => article.title.contains(keyword.as_str())
        || article.content.contains(keyword.as_str()),
      None => true,
    }
  }

  fn tag_match(&self, article: &Article) -> bool {
    match self.tag {
      Some(ref tag) => article.has_tag(tag),
      None => true,
    }
  }

  /// Filter then sort.  Both sorts are stable.
  pub fn run(&self, articles: &[Article]) -> Vec<Article> {
    let mut found: Vec<Article> = articles.iter()
      .filter(|a| self.matches(a))
      .cloned()
      .collect();

    match (self.sort_by, self.keyword.as_deref()) {
      (Some(SortBy::Relevance), Some(keyword)) => {
        found.sort_by_cached_key(|a| Reverse(keyword_frequency(a, keyword)));
      },
      (Some(SortBy::Date), _) => {
        found.sort_by(|a, b| b.date.cmp(&a.date));
      },
      _ => (),
    }
    found
  }
}

/// Case-insensitive count of non-overlapping `keyword` occurrences in the
/// title plus the content.  An empty keyword counts as 0.
pub fn keyword_frequency(article: &Article, keyword: &str) -> usize {
  if keyword.is_empty() {
    return 0;
  }
  let keyword = keyword.to_lowercase();
  count_occurrences(&article.title.to_lowercase(), &keyword)
    + count_occurrences(&article.content.to_lowercase(), &keyword)
}

fn count_occurrences(haystack: &str, needle: &str) -> usize {
  haystack.matches(needle).count()
}

#[cfg(test)]
mod tests {
  use super::*;

  use chrono::{TimeZone, Utc};

  fn article(id: u64, title: &str, content: &str, tags: &[&str], secs: i64) -> Article {
    Article {
      id,
      title: title.to_string(),
      content: content.to_string(),
      tags: tags.iter().map(|t| t.to_string()).collect(),
      date: Utc.timestamp_opt(secs, 0).unwrap(),
    }
  }

  fn ids(articles: &[Article]) -> Vec<u64> {
    articles.iter().map(|a| a.id).collect()
  }

  fn catalog() -> Vec<Article> {
    vec![
      article(1, "Go Basics", "Go is great. Go is fast.", &["go", "tutorial"], 100),
      article(2, "Rust", "Ownership and borrowing.", &["rust"], 300),
      article(3, "Going further", "go go go", &["golang"], 200),
      article(4, "Cooking", "Nothing to see.", &["food"], 300),
    ]
  }

  #[test]
  fn empty_query_returns_everything_in_order() {
    let found = ArticleQuery::default().run(&catalog());
    assert_eq!(ids(&found), vec![1, 2, 3, 4]);
  }

  #[test]
  fn keyword_is_case_sensitive_substring() {
    let query = ArticleQuery { keyword: Some("Go".into()), ..Default::default() };
    assert_eq!(ids(&query.run(&catalog())), vec![1, 3]);

    let query = ArticleQuery { keyword: Some("go".into()), ..Default::default() };
    assert_eq!(ids(&query.run(&catalog())), vec![3]);

    let query = ArticleQuery { keyword: Some("borrow".into()), ..Default::default() };
    assert_eq!(ids(&query.run(&catalog())), vec![2]);
  }

  #[test]
  fn keyword_is_literal() {
    let query = ArticleQuery { keyword: Some("G.".into()), ..Default::default() };
    assert!(query.run(&catalog()).is_empty());
  }

  #[test]
  fn tag_must_match_exactly() {
    let query = ArticleQuery { tag: Some("go".into()), ..Default::default() };
    assert_eq!(ids(&query.run(&catalog())), vec![1]);

    let query = ArticleQuery { tag: Some("lang".into()), ..Default::default() };
    assert!(query.run(&catalog()).is_empty());
  }

  #[test]
  fn keyword_and_tag_combine() {
    let query = ArticleQuery {
      keyword: Some("Go".into()),
      tag: Some("golang".into()),
      ..Default::default()
    };
    assert_eq!(ids(&query.run(&catalog())), vec![3]);
  }

  #[test]
  fn frequency_counts_title_and_content_ignoring_case() {
    let articles = catalog();
    assert_eq!(keyword_frequency(&articles[0], "Go"), 3);
    // "Going" + three "go"
    assert_eq!(keyword_frequency(&articles[2], "GO"), 4);
    assert_eq!(keyword_frequency(&articles[1], "go"), 0);
    assert_eq!(keyword_frequency(&articles[0], ""), 0);
  }

  #[test]
  fn frequency_is_non_overlapping() {
    let a = article(1, "aaaa", "", &["x"], 0);
    assert_eq!(keyword_frequency(&a, "aa"), 2);
  }

  #[test]
  fn relevance_sort_is_descending_and_stable() {
    let articles = vec![
      article(1, "one go", "", &["x"], 0),
      article(2, "go go go", "", &["x"], 0),
      article(3, "GO", "", &["x"], 0),
      article(4, "go", "go", &["x"], 0),
    ];
    let query = ArticleQuery {
      keyword: Some("go".into()),
      sort_by: Some(SortBy::Relevance),
      ..Default::default()
    };
    // article 3 only matches case-insensitively, so it is filtered out.
    let found = query.run(&articles);
    assert_eq!(ids(&found), vec![2, 4, 1]);
    let freqs: Vec<usize> = found.iter().map(|a| keyword_frequency(a, "go")).collect();
    assert!(freqs.windows(2).all(|w| w[0] >= w[1]));
  }

  #[test]
  fn relevance_without_keyword_keeps_order() {
    let query = ArticleQuery { sort_by: Some(SortBy::Relevance), ..Default::default() };
    assert_eq!(ids(&query.run(&catalog())), vec![1, 2, 3, 4]);
  }

  #[test]
  fn empty_keyword_matches_all_and_keeps_order_under_relevance() {
    let query = ArticleQuery {
      keyword: Some(String::new()),
      sort_by: Some(SortBy::Relevance),
      ..Default::default()
    };
    assert_eq!(ids(&query.run(&catalog())), vec![1, 2, 3, 4]);
  }

  #[test]
  fn date_sort_is_newest_first_and_stable() {
    let query = ArticleQuery { sort_by: Some(SortBy::Date), ..Default::default() };
    // 2 and 4 share a timestamp and keep their relative order.
    assert_eq!(ids(&query.run(&catalog())), vec![2, 4, 3, 1]);
  }

  #[test]
  fn run_does_not_mutate_input() {
    let articles = catalog();
    let query = ArticleQuery { sort_by: Some(SortBy::Date), ..Default::default() };
    let _ = query.run(&articles);
    assert_eq!(articles, catalog());
  }

  #[test]
  fn sort_by_param() {
    assert_eq!(SortBy::from_param("relevance"), Some(SortBy::Relevance));
    assert_eq!(SortBy::from_param("date"), Some(SortBy::Date));
    assert_eq!(SortBy::from_param("Date"), None);
  }
}
