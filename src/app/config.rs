use serde::de::Deserialize;

use std::path::PathBuf;

use clap::ArgMatches;
use config::{
  builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, Value,
};

use crate::error::*;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub conf: Config
}

/// Built-in defaults, overridden by `conf/default` and everything after it.
fn defaults() -> Result<ConfigBuilder<DefaultState>> {
  Ok(Config::builder()
    .set_default("debug", false)?
    .set_default("servers", vec!["public"])?
    .set_default("public.listen", "127.0.0.1:3000")?
    .set_default("public.services", vec!["Article", "Tag"])?
    .set_default("store.backend", "file")?
    .set_default("store.path", "articles.json")?
    .set_default("store.reset_on_corrupt", false)?
    .set_default("article.max_body_size", 256_i64 * 1024)?)
}

impl AppConfig {
  pub fn new_clap(cli: &ArgMatches) -> Result<Self> {
    // Load defaults
    let mut builder = defaults()?
      .add_source(File::with_name("conf/default").required(false));

    if let Some(config_file) = cli.get_one::<String>("config") {
      builder = builder.add_source(File::with_name(config_file));
    } else {
      // Get RUN_MODE from environment
      let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
      builder = builder
        .add_source(File::with_name(&format!("conf/{}", env)).required(false))
        // Allow overrides from environment, e.g. APP_STORE__PATH
        .add_source(Environment::with_prefix("APP")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true));
    }

    Ok(AppConfig {
      conf: builder.build()?,
    })
  }

  /// Defaults plus a toml document.
  pub fn from_toml_str(toml: &str) -> Result<Self> {
    let conf = defaults()?
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()?;
    Ok(AppConfig {
      conf,
    })
  }

  pub fn get<'de, T: Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
    match self.conf.get::<T>(key) {
      Ok(val) => Ok(Some(val)),
      Err(ConfigError::NotFound(_)) => Ok(None),
      Err(err) => Err(err.into()),
    }
  }

  pub fn get_str(&self, key: &str) -> Result<Option<String>> {
    let val = if let Some(val) = self.get(key)? {
      Some(Value::into_string(val)?)
    } else {
      None
    };
    Ok(val)
  }

  pub fn get_path(&self, key: &str) -> Result<Option<PathBuf>> {
    let val = if let Some(val) = self.get(key)? {
      Some(PathBuf::from(Value::into_string(val)?))
    } else {
      None
    };
    Ok(val)
  }

  pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
    let val = if let Some(val) = self.get(key)? {
      Some(Value::into_int(val)?)
    } else {
      None
    };
    Ok(val)
  }

  pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
    let val = if let Some(val) = self.get(key)? {
      Some(Value::into_bool(val)?)
    } else {
      None
    };
    Ok(val)
  }

  pub fn get_array(&self, key: &str) -> Result<Option<Vec<Value>>> {
    let val = if let Some(val) = self.get(key)? {
      Some(Value::into_array(val)?)
    } else {
      None
    };
    Ok(val)
  }

  /// Array of strings, e.g. `servers` or `<server>.services`.
  pub fn get_str_array(&self, key: &str) -> Result<Option<Vec<String>>> {
    let val = if let Some(list) = self.get_array(key)? {
      Some(list.into_iter().map(Value::into_string).collect::<Result<_, _>>()?)
    } else {
      None
    };
    Ok(val)
  }
}
