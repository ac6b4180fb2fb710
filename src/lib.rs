pub mod error;
pub use error::Error;

pub mod app;

pub mod forms;

pub mod models;

pub mod query;

pub mod services;

pub mod db;
