use log::*;

use std::collections::HashMap;

use actix_web::web;
use anyhow::anyhow;

use crate::error::*;
use crate::app::*;
use crate::db::DbService;

mod article;
mod tag;

type BoxService = Box<dyn Service>;

pub trait Service: ServiceClone + Send {
  /// Load Service config from AppConfig.
  fn load_app_config(&mut self, config: &AppConfig, prefix: &str) -> Result<()>;

  /// Setup Service endpoints.
  fn web_config(&self, _web: &mut web::ServiceConfig) {
  }

  fn api_config(&self, _web: &mut web::ServiceConfig) {
  }
}

pub trait ServiceClone {
  fn clone_box(&self) -> BoxService;
}

impl<T> ServiceClone for T
where
    T: 'static + Service + Clone,
{
  fn clone_box(&self) -> BoxService {
    Box::new(self.clone())
  }
}

impl Clone for BoxService {
  fn clone(&self) -> BoxService {
    self.clone_box()
  }
}

#[derive(Clone)]
pub struct Services {
  db: web::Data<DbService>,
  api_prefix: String,
  services: Vec<BoxService>,
}

impl Services {
  pub fn new(db: web::Data<DbService>) -> Services {
    Services {
      db,
      api_prefix: String::new(),
      services: Vec::new(),
    }
  }

  fn load_service(&mut self, name: &str, config: &AppConfig, prefix: &str) -> Result<BoxService> {
    let mut service: BoxService = match name {
      "Article" => Box::new(article::new_factory()),
      "Tag" => Box::new(tag::new_factory()),
      _ => {
        return Err(anyhow!("Unknown Service: {}", name).into());
      },
    };

    service.load_app_config(config, prefix)?;
    Ok(service)
  }

  /// Load Service config from AppConfig.
  pub fn load_app_config(&mut self, config: &AppConfig, prefix: &str) -> Result<()> {
    self.api_prefix = config.get_str(&format!("{}.api_prefix", prefix))?.unwrap_or_default();

    let mut loaded: HashMap<String, bool> = HashMap::new();
    let list = config.get_str_array(&format!("{}.services", prefix))?
      .ok_or_else(|| anyhow!("missing list of services: {}.services", prefix))?;
    for name in list {
      info!("Loading {}Service config", name);
      // check if it is loaded already.
      if loaded.contains_key(&name) {
        return Err(anyhow!("can't load service multiple times: {}", name).into());
      }
      loaded.insert(name.clone(), true);
      // load service
      let service = self.load_service(&name, config, prefix)?;
      self.services.push(service);
    }
    Ok(())
  }

  /// Setup Service endpoints.
  pub fn web_config(&self, web: &mut web::ServiceConfig) {
    // Store is shared by all workers.
    web.app_data(self.db.clone());

    for service in self.services.iter() {
      service.web_config(web);
    }
    web.service(
      web::scope(&self.api_prefix)
        .configure(|web| {
          for service in self.services.iter() {
            service.api_config(web);
          }
        })
    );
  }
}

pub fn config_services(config: &AppConfig, prefix: &str, db: web::Data<DbService>) -> Result<Services> {
  let mut services = Services::new(db);
  services.load_app_config(config, prefix)?;
  Ok(services)
}
