use log::*;

use anyhow::anyhow;

use actix_web::{
  get, post, web, HttpMessage, HttpRequest, HttpResponse,
  Error
};

use crate::error::*;
use crate::app::*;
use crate::forms::article::*;
use crate::query::ArticleQuery;
use crate::db::{DbService, article_not_found};

const DEFAULT_MAX_BODY_SIZE: usize = 256 * 1024;

/// search articles by keyword/tag
#[get("/articles/search")]
async fn search(
  db: web::Data<DbService>,
  req: web::Query<SearchRequest>,
) -> Result<HttpResponse, Error> {
  let query = ArticleQuery::from(req.into_inner());
  let articles = db.article.search(&query)?;
  debug!("Article - search {:?}: {} found", query, articles.len());

  Ok(HttpResponse::Ok().json(articles))
}

/// get article by id
#[get("/articles/{id}")]
async fn get_article(
  db: web::Data<DbService>,
  id: web::Path<String>,
) -> Result<HttpResponse, Error> {
  let id = id.parse::<u64>().map_err(|_| article_not_found())?;
  let article = db.article.get_by_id(id)?;

  Ok(HttpResponse::Ok().json(article))
}

/// post new article
#[post("/articles")]
async fn store_article(
  db: web::Data<DbService>,
  req: HttpRequest,
  body: web::Bytes,
) -> Result<HttpResponse, Error> {
  let article = CreateArticle::from_body(req.content_type(), &body)?.validate()?;

  // lock + snapshot write, keep it off the async workers.
  let article = web::block(move || db.article.create(article)).await??;

  Ok(HttpResponse::Created().json(article))
}

#[derive(Debug, Clone)]
pub struct ArticleService {
  pub max_body_size: usize,
}

impl Default for ArticleService {
  fn default() -> Self {
    Self {
      max_body_size: DEFAULT_MAX_BODY_SIZE,
    }
  }
}

impl super::Service for ArticleService {
  fn load_app_config(&mut self, config: &AppConfig, _prefix: &str) -> Result<()> {
    match config.get_int("article.max_body_size")? {
      Some(size) if size > 0 => self.max_body_size = size as usize,
      Some(_) => return Err(anyhow!("article.max_body_size must be > 0").into()),
      None => (),
    }
    Ok(())
  }

  fn api_config(&self, web: &mut web::ServiceConfig) {
    // Create bodies are read raw and parsed by `CreateArticle::from_body`.
    let payload_cfg = web::PayloadConfig::new(self.max_body_size);

    web
      .app_data(payload_cfg)
      // must come before `/articles/{id}`
      .service(search)
      .service(get_article)
      .service(store_article);
  }
}

pub fn new_factory() -> ArticleService {
  Default::default()
}
